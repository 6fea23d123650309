//! # Playlist Sync Module
//!
//! Synchronizes playlist and playlist-entry state with the remote
//! music-library service.
//!
//! ## Overview
//!
//! This crate is the sync mutation engine:
//! - Building correctly-ordered mutation batches for playlists and entries,
//!   including the client-maintained doubly-linked entry ordering
//! - Driving paginated, checkpoint-bounded retrieval of remote changes
//! - Submitting batches through an authenticated request layer
//! - Classifying and reporting the outcome of every sync attempt
//!
//! ## Components
//!
//! - **Data Model** (`model`): playlist, entry, and patch types with their
//!   wire representations
//! - **Mutation Builder** (`mutation`): pure functions producing ordered
//!   create/update/delete batches
//! - **Wire Protocol** (`wire`): feed and mutate request/response shapes
//! - **Pagination Driver** (`pagination`): bounded continuation-token loop
//! - **Transport** (`transport`): single-attempt authenticated requests
//! - **Sync Orchestrator** (`orchestrator`): the two symmetric per-entity
//!   flows (fetch changes, submit mutations)
//! - **Outcome Reporter** (`reporting`): analytics event classification with
//!   a deferred queue until the reporting context arrives

pub mod error;
pub mod model;
pub mod mutation;
pub mod orchestrator;
pub mod pagination;
pub mod reporting;
pub mod transport;
pub mod wire;

pub use error::{Result, SyncError};
pub use model::{
    Checkpoint, EntryCreate, EntryReorder, Playlist, PlaylistPatch, PlaylistType, RemoteEntry,
    RemotePlaylist, ShareState, SyncUser, TrackSource,
};
pub use mutation::{
    entry_appends, entry_deletes, entry_reorders, playlist_create, playlist_updates,
    EntryMutation, Mutation, MutationKind, PlaylistMutation,
};
pub use orchestrator::{SyncConfig, SyncEngine, DEFAULT_BASE_URL};
pub use reporting::{
    AnalyticsEvent, AnalyticsSink, ActivationOutcome, AuthOutcome, Reporter, ReportingContext,
    ReportingTags, SyncAction, SyncOutcome,
};
pub use transport::ApiClient;
pub use wire::{FeedData, FeedResponse, MutateRequest, MutateResponse};

// Re-exported so callers do not need a core-runtime dependency for the
// common case.
pub use core_runtime::events::EntityKind;
