//! Sync orchestration: the paired per-entity flows of fetching remote
//! changes and submitting mutation batches.

use crate::error::Result;
use crate::model::{Checkpoint, RemoteEntry, RemotePlaylist, SyncUser};
use crate::mutation::{EntryMutation, Mutation, PlaylistMutation};
use crate::pagination::consume_pages;
use crate::reporting::{Reporter, SyncOutcome};
use crate::transport::ApiClient;
use crate::wire::{
    FeedResponse, MutateRequest, MutateResponse, ENTRIES_FEED, ENTRY_BATCH, PLAYLISTS_FEED,
    PLAYLIST_BATCH,
};
use core_runtime::events::{CoreEvent, EntityKind, EventBus, SyncEvent};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Default API base for [`ApiClient::new`], ending in a slash so endpoints
/// append directly.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/sj/v2.5/";

/// Tuning knobs for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Locale sent as `hl` on every request.
    pub locale: String,
    /// Data version sent as `dv` on every request.
    pub data_version: u32,
    /// Items requested per feed page.
    pub page_size: usize,
    /// Bound on continuation-token chains.
    pub max_pages: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            data_version: 0,
            page_size: 20_000,
            max_pages: 100,
        }
    }
}

/// Drives change retrieval and mutation submission against the service.
///
/// Playlists and entries get symmetric treatment: the same feed pagination,
/// the same batch endpoint shape, the same outcome reporting. Every
/// operation returns an explicit `Result`; nothing is fire-and-forget.
pub struct SyncEngine {
    api: ApiClient,
    reporter: Arc<Reporter>,
    event_bus: Option<EventBus>,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(api: ApiClient, reporter: Arc<Reporter>, config: SyncConfig) -> Self {
        Self {
            api,
            reporter,
            event_bus: None,
            config,
        }
    }

    /// Attach an event bus; sync lifecycle events will be emitted to it.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Fetch playlists changed since `since`, draining all pages.
    /// `None` fetches the full library.
    pub async fn get_playlist_changes(
        &self,
        user: &SyncUser,
        since: Option<&Checkpoint>,
    ) -> Result<Vec<RemotePlaylist>> {
        self.get_changes(PLAYLISTS_FEED, EntityKind::Playlist, user, since)
            .await
    }

    /// Fetch playlist entries changed since `since`, draining all pages.
    pub async fn get_entry_changes(
        &self,
        user: &SyncUser,
        since: Option<&Checkpoint>,
    ) -> Result<Vec<RemoteEntry>> {
        self.get_changes(ENTRIES_FEED, EntityKind::Entry, user, since)
            .await
    }

    /// Submit a playlist mutation batch. An empty batch succeeds without a
    /// network call.
    pub async fn run_playlist_mutations(
        &self,
        user: &SyncUser,
        mutations: &[PlaylistMutation],
    ) -> Result<MutateResponse> {
        self.run_mutations(PLAYLIST_BATCH, EntityKind::Playlist, user, mutations)
            .await
    }

    /// Submit an entry mutation batch. Order within the batch is preserved
    /// on the wire.
    pub async fn run_entry_mutations(
        &self,
        user: &SyncUser,
        mutations: &[EntryMutation],
    ) -> Result<MutateResponse> {
        self.run_mutations(ENTRY_BATCH, EntityKind::Entry, user, mutations)
            .await
    }

    fn base_params(&self, user: &SyncUser) -> Vec<(String, String)> {
        vec![
            ("dv".to_string(), self.config.data_version.to_string()),
            ("hl".to_string(), self.config.locale.clone()),
            ("tier".to_string(), user.tier.clone()),
        ]
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Sync(event)).ok();
        }
    }

    #[instrument(skip(self, user, since), fields(endpoint = %endpoint, kind = %kind))]
    async fn get_changes<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        kind: EntityKind,
        user: &SyncUser,
        since: Option<&Checkpoint>,
    ) -> Result<Vec<T>> {
        self.emit(SyncEvent::Started {
            kind,
            is_full_sync: since.is_none(),
        });

        let mut params = self.base_params(user);
        params.push((
            "max-results".to_string(),
            self.config.page_size.to_string(),
        ));
        if let Some(checkpoint) = since {
            params.push(("updated-min".to_string(), checkpoint.as_str().to_string()));
        }

        let result = consume_pages(
            |token| {
                let mut page_params = params.clone();
                if let Some(token) = token {
                    page_params.push(("start-token".to_string(), token));
                }
                async move {
                    let response = self.api.get(endpoint, &page_params).await?;
                    let page: FeedResponse<T> = response
                        .json()
                        .map_err(|e| crate::error::SyncError::Parse(e.to_string()))?;
                    Ok(page)
                }
            },
            self.config.max_pages,
        )
        .await;

        match result {
            Ok(items) => {
                info!(count = items.len(), "fetched remote changes");
                Ok(items)
            }
            Err(e) => {
                self.reporter
                    .report_error(format!("{}: {}", endpoint, e));
                self.emit(SyncEvent::Failed {
                    kind,
                    mutation_count: 0,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    #[instrument(skip(self, user, mutations), fields(endpoint = %endpoint, kind = %kind, count = mutations.len()))]
    async fn run_mutations<C: Serialize, U: Serialize>(
        &self,
        endpoint: &str,
        kind: EntityKind,
        user: &SyncUser,
        mutations: &[Mutation<C, U>],
    ) -> Result<MutateResponse> {
        self.reporter.report_mutation_batch(kind, mutations);

        if mutations.is_empty() {
            info!("empty mutation batch, nothing to submit");
            self.reporter
                .report_batch_outcome(kind, SyncOutcome::Success, 0);
            return Ok(MutateResponse::empty());
        }

        let body = MutateRequest { mutations };
        let result = async {
            let response = self
                .api
                .post_json(endpoint, &self.base_params(user), &body)
                .await?;
            response
                .json::<MutateResponse>()
                .map_err(|e| crate::error::SyncError::Parse(e.to_string()))
        }
        .await;

        match result {
            Ok(response) => {
                info!("mutation batch accepted");
                self.reporter
                    .report_batch_outcome(kind, SyncOutcome::Success, mutations.len());
                self.emit(SyncEvent::Completed {
                    kind,
                    mutation_count: mutations.len(),
                });
                Ok(response)
            }
            Err(e) => {
                self.reporter
                    .report_batch_outcome(kind, SyncOutcome::Failure, mutations.len());
                self.reporter
                    .report_error(format!("{}: {}", endpoint, e));
                self.emit(SyncEvent::Failed {
                    kind,
                    mutation_count: mutations.len(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
