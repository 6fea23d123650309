//! Data model for playlists and playlist entries.
//!
//! Field names follow the service's wire protocol (camelCase JSON). Creation
//! bodies carry sentinel timestamps that tell the server to assign its own.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Sentinel sent in create bodies: "let the server assign a creation time".
pub const CREATION_TIMESTAMP_SENTINEL: &str = "-1";

/// Sentinel sent in create bodies for the last-modified time.
pub const LAST_MODIFIED_TIMESTAMP_SENTINEL: &str = "0";

/// Track-id prefix marking a user-uploaded (locker) track.
const UPLOADED_TRACK_PREFIX: char = 'T';

/// Playlist visibility on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShareState {
    Private,
    Public,
}

/// Playlist provenance. Client-created playlists are always user generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaylistType {
    UserGenerated,
}

/// Where a track referenced by an entry comes from.
///
/// Serialized as the service's numeric codes: 1 = catalog, 2 = user upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSource {
    Catalog,
    UserUploaded,
}

impl TrackSource {
    /// Classify a track id by the service's prefix convention.
    pub fn from_track_id(track_id: &str) -> Self {
        if track_id.starts_with(UPLOADED_TRACK_PREFIX) {
            TrackSource::UserUploaded
        } else {
            TrackSource::Catalog
        }
    }

    pub fn as_code(&self) -> u8 {
        match self {
            TrackSource::Catalog => 1,
            TrackSource::UserUploaded => 2,
        }
    }
}

impl Serialize for TrackSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_code())
    }
}

impl<'de> Deserialize<'de> for TrackSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(TrackSource::Catalog),
            2 => Ok(TrackSource::UserUploaded),
            other => Err(serde::de::Error::custom(format!(
                "unknown track source code {}",
                other
            ))),
        }
    }
}

/// Full playlist body as sent in a create mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Remote-assigned identifier; absent until the create round-trips.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub creation_timestamp: String,
    pub last_modified_timestamp: String,
    #[serde(rename = "type")]
    pub playlist_type: PlaylistType,
    pub share_state: ShareState,
    pub deleted: bool,
}

/// Partial playlist update keyed by id; only present fields are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPatch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub share_state: Option<ShareState>,
}

impl PlaylistPatch {
    /// A patch with an id and nothing else would be rejected by the server.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.share_state.is_none()
    }
}

/// Entry body as sent in a create mutation.
///
/// `preceding_entry_id` / `following_entry_id` form the client-maintained
/// doubly-linked ordering over entries within a playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryCreate {
    /// Client-generated identifier (UUID v1, temporally ordered).
    pub client_id: String,
    pub creation_timestamp: String,
    pub deleted: bool,
    pub last_modified_timestamp: String,
    pub playlist_id: String,
    pub source: TrackSource,
    pub track_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preceding_entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub following_entry_id: Option<String>,
}

/// Reorder descriptor: an entry id plus its new neighbors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryReorder {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preceding_entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub following_entry_id: Option<String>,
}

/// A playlist as returned by the change feed.
///
/// Tolerant of missing fields: deleted items in particular come back
/// stripped down to an id and the deletion flag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePlaylist {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub share_state: Option<ShareState>,
    #[serde(default)]
    pub last_modified_timestamp: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

/// An entry as returned by the change feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEntry {
    pub id: String,
    #[serde(default)]
    pub playlist_id: Option<String>,
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub source: Option<TrackSource>,
    #[serde(default)]
    pub preceding_entry_id: Option<String>,
    #[serde(default)]
    pub following_entry_id: Option<String>,
    #[serde(default)]
    pub last_modified_timestamp: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

/// The user on whose behalf sync runs. The tier rides along as a query
/// parameter on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncUser {
    pub tier: String,
}

impl SyncUser {
    pub fn new(tier: impl Into<String>) -> Self {
        Self { tier: tier.into() }
    }
}

/// Opaque timestamp bounding an incremental change fetch.
///
/// Absent checkpoint (an `Option<&Checkpoint>` of `None`) means full fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint(String);

impl Checkpoint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a checkpoint from epoch microseconds, the service's unit.
    pub fn from_timestamp_micros(micros: i64) -> Self {
        Self(micros.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
