//! Mutation descriptors and the pure builder functions that produce them.
//!
//! A mutation batch is an ordered `Vec`; order is semantic because later
//! mutations may reference client ids minted by earlier ones in the same
//! batch.

use crate::error::{Result, SyncError};
use crate::model::{
    EntryCreate, EntryReorder, Playlist, PlaylistPatch, PlaylistType, ShareState, TrackSource,
    CREATION_TIMESTAMP_SENTINEL, LAST_MODIFIED_TIMESTAMP_SENTINEL,
};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

/// A single create/update/delete intent against one entity.
///
/// Serializes externally tagged, matching the wire protocol:
/// `{"create": {...}}`, `{"update": {...}}`, `{"delete": "<id>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutation<C, U> {
    Create(C),
    Update(U),
    Delete(String),
}

impl<C, U> Mutation<C, U> {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create(_) => MutationKind::Create,
            Mutation::Update(_) => MutationKind::Update,
            Mutation::Delete(_) => MutationKind::Delete,
        }
    }
}

/// The three mutation shapes, used for batch breakdown reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub const ALL: [MutationKind; 3] =
        [MutationKind::Create, MutationKind::Update, MutationKind::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

/// A mutation against a playlist.
pub type PlaylistMutation = Mutation<Playlist, PlaylistPatch>;

/// A mutation against a playlist entry.
pub type EntryMutation = Mutation<EntryCreate, EntryReorder>;

/// Build a create mutation for a new private playlist.
///
/// Timestamps are sentinels so the server assigns its own.
pub fn playlist_create(name: impl Into<String>, description: impl Into<String>) -> PlaylistMutation {
    Mutation::Create(Playlist {
        id: None,
        name: name.into(),
        description: description.into(),
        creation_timestamp: CREATION_TIMESTAMP_SENTINEL.to_string(),
        last_modified_timestamp: LAST_MODIFIED_TIMESTAMP_SENTINEL.to_string(),
        playlist_type: PlaylistType::UserGenerated,
        share_state: ShareState::Private,
        deleted: false,
    })
}

/// Build one update mutation per patch, in input order.
///
/// # Errors
///
/// Returns [`SyncError::EmptyPatch`] if a patch carries nothing besides its
/// id; the server would reject such an update anyway, and failing at build
/// time keeps the whole batch out of flight.
pub fn playlist_updates(patches: Vec<PlaylistPatch>) -> Result<Vec<PlaylistMutation>> {
    for patch in &patches {
        if patch.is_empty() {
            return Err(SyncError::EmptyPatch {
                id: patch.id.clone(),
            });
        }
    }

    Ok(patches.into_iter().map(Mutation::Update).collect())
}

/// Build one delete mutation per entry id, order-preserving.
pub fn entry_deletes(entry_ids: Vec<String>) -> Vec<EntryMutation> {
    entry_ids.into_iter().map(Mutation::Delete).collect()
}

/// Build one update mutation per reorder descriptor, order-preserving.
pub fn entry_reorders(reorders: Vec<EntryReorder>) -> Vec<EntryMutation> {
    reorders.into_iter().map(Mutation::Update).collect()
}

/// Build create mutations appending `track_ids` to a playlist, in order.
///
/// All client ids are minted up front, then each mutation links to its
/// neighbors by index: entry i carries entry i-1's id as `precedingEntryId`
/// (absent for the first) and entry i+1's id as `followingEntryId` (absent
/// for the last). Ids are UUID v1 so they are temporally ordered and
/// globally unique without server coordination.
pub fn entry_appends(playlist_id: &str, track_ids: &[String]) -> Vec<EntryMutation> {
    let client_ids: Vec<String> = track_ids.iter().map(|_| mint_client_id()).collect();

    track_ids
        .iter()
        .enumerate()
        .map(|(i, track_id)| {
            Mutation::Create(EntryCreate {
                client_id: client_ids[i].clone(),
                creation_timestamp: CREATION_TIMESTAMP_SENTINEL.to_string(),
                deleted: false,
                last_modified_timestamp: LAST_MODIFIED_TIMESTAMP_SENTINEL.to_string(),
                playlist_id: playlist_id.to_string(),
                source: TrackSource::from_track_id(track_id),
                track_id: track_id.clone(),
                preceding_entry_id: (i > 0).then(|| client_ids[i - 1].clone()),
                following_entry_id: (i + 1 < client_ids.len()).then(|| client_ids[i + 1].clone()),
            })
        })
        .collect()
}

/// Mint a fresh temporally-ordered client id.
fn mint_client_id() -> String {
    static NODE_ID: OnceLock<[u8; 6]> = OnceLock::new();
    let node_id = NODE_ID.get_or_init(rand::random);
    Uuid::now_v1(node_id).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn tracks(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_playlist_create_shape() {
        let mutation = playlist_create("x", "y");

        let Mutation::Create(playlist) = &mutation else {
            panic!("expected a create mutation");
        };
        assert_eq!(playlist.name, "x");
        assert_eq!(playlist.description, "y");
        assert!(!playlist.deleted);
        assert_eq!(playlist.share_state, ShareState::Private);
        assert_eq!(playlist.playlist_type, PlaylistType::UserGenerated);
        assert_eq!(playlist.creation_timestamp, "-1");
        assert_eq!(playlist.last_modified_timestamp, "0");

        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(json["create"]["shareState"], "PRIVATE");
        assert_eq!(json["create"]["type"], "USER_GENERATED");
        assert_eq!(json["create"]["deleted"], false);
    }

    #[test]
    fn test_playlist_updates_preserve_order() {
        let patches = vec![
            PlaylistPatch {
                id: "a".to_string(),
                name: Some("first".to_string()),
                description: None,
                share_state: None,
            },
            PlaylistPatch {
                id: "b".to_string(),
                name: None,
                description: None,
                share_state: Some(ShareState::Public),
            },
        ];

        let mutations = playlist_updates(patches).unwrap();
        assert_eq!(mutations.len(), 2);
        let Mutation::Update(first) = &mutations[0] else {
            panic!("expected update");
        };
        assert_eq!(first.id, "a");
    }

    #[test]
    fn test_playlist_updates_reject_empty_patch() {
        let patches = vec![PlaylistPatch {
            id: "lonely".to_string(),
            name: None,
            description: None,
            share_state: None,
        }];

        let result = playlist_updates(patches);
        assert!(matches!(
            result,
            Err(SyncError::EmptyPatch { id }) if id == "lonely"
        ));
    }

    #[test]
    fn test_entry_deletes_wire_shape() {
        let mutations = entry_deletes(tracks(&["e1", "e2"]));
        assert_eq!(mutations.len(), 2);

        let json = serde_json::to_value(&mutations).unwrap();
        assert_eq!(json, serde_json::json!([{"delete": "e1"}, {"delete": "e2"}]));
    }

    #[test]
    fn test_entry_reorders_order_preserving() {
        let reorders = vec![
            EntryReorder {
                id: "e2".to_string(),
                preceding_entry_id: Some("e1".to_string()),
                following_entry_id: Some("e3".to_string()),
            },
            EntryReorder {
                id: "e9".to_string(),
                preceding_entry_id: None,
                following_entry_id: Some("e1".to_string()),
            },
        ];

        let mutations = entry_reorders(reorders);
        assert_eq!(mutations[0].kind(), MutationKind::Update);
        let Mutation::Update(first) = &mutations[0] else {
            panic!("expected update");
        };
        assert_eq!(first.id, "e2");
        let Mutation::Update(second) = &mutations[1] else {
            panic!("expected update");
        };
        assert_eq!(second.id, "e9");
    }

    #[test]
    fn test_entry_appends_linked_chain() {
        let mutations = entry_appends("pl-1", &tracks(&["t0", "t1", "t2", "t3"]));
        assert_eq!(mutations.len(), 4);

        let entries: Vec<&EntryCreate> = mutations
            .iter()
            .map(|m| match m {
                Mutation::Create(e) => e,
                other => panic!("expected create, got {:?}", other.kind().as_str()),
            })
            .collect();

        // Every entry links to its neighbors' freshly minted ids.
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.playlist_id, "pl-1");
            assert_eq!(entry.track_id, format!("t{}", i));

            if i == 0 {
                assert!(entry.preceding_entry_id.is_none());
            } else {
                assert_eq!(
                    entry.preceding_entry_id.as_deref(),
                    Some(entries[i - 1].client_id.as_str())
                );
            }

            if i == entries.len() - 1 {
                assert!(entry.following_entry_id.is_none());
            } else {
                assert_eq!(
                    entry.following_entry_id.as_deref(),
                    Some(entries[i + 1].client_id.as_str())
                );
            }
        }

        let distinct: HashSet<&str> = entries.iter().map(|e| e.client_id.as_str()).collect();
        assert_eq!(distinct.len(), entries.len());
    }

    #[test]
    fn test_entry_appends_single_track_has_no_links() {
        let mutations = entry_appends("pl-1", &tracks(&["only"]));
        let Mutation::Create(entry) = &mutations[0] else {
            panic!("expected create");
        };
        assert!(entry.preceding_entry_id.is_none());
        assert!(entry.following_entry_id.is_none());
    }

    #[test]
    fn test_entry_appends_empty_input() {
        assert!(entry_appends("pl-1", &[]).is_empty());
    }

    #[test]
    fn test_entry_appends_source_classification() {
        let mutations = entry_appends("pl-1", &tracks(&["Tuploaded", "catalog"]));

        let Mutation::Create(uploaded) = &mutations[0] else {
            panic!("expected create");
        };
        let Mutation::Create(catalog) = &mutations[1] else {
            panic!("expected create");
        };
        assert_eq!(uploaded.source, TrackSource::UserUploaded);
        assert_eq!(catalog.source, TrackSource::Catalog);

        let json = serde_json::to_value(&mutations[0]).unwrap();
        assert_eq!(json["create"]["source"], 2);
    }

    #[test]
    fn test_mutation_kind_accessor() {
        assert_eq!(playlist_create("n", "d").kind(), MutationKind::Create);
        assert_eq!(
            entry_deletes(tracks(&["e"]))[0].kind(),
            MutationKind::Delete
        );
    }
}
