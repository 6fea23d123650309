//! Outcome classification and analytics reporting.
//!
//! The reporter turns sync outcomes into [`AnalyticsEvent`]s and hands them
//! to an [`AnalyticsSink`]. Events produced before the reporting context is
//! known are queued (bounded) and flushed in order once [`Reporter::set_context`]
//! is called, so early startup activity is not lost.

use crate::mutation::{Mutation, MutationKind};
use core_runtime::events::EntityKind;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Events queued while the context is pending, before the oldest is dropped.
const DEFERRED_QUEUE_CAP: usize = 64;

/// Window within which a repeated error message is reported only once.
const ERROR_REPORT_WINDOW: Duration = Duration::from_secs(600);

/// A single analytics hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsEvent {
    pub category: String,
    pub action: String,
    pub label: Option<String>,
    pub value: Option<u64>,
}

impl AnalyticsEvent {
    fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            label: None,
            value: None,
        }
    }

    fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn with_value(mut self, value: u64) -> Self {
        self.value = Some(value);
        self
    }
}

/// Destination for analytics hits. Implementations must not block; delivery
/// is fire-and-forget.
pub trait AnalyticsSink: Send + Sync {
    fn send(&self, event: AnalyticsEvent);
}

/// Stable tags attached to every report once the context is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingTags {
    pub is_developer: bool,
    pub is_full_forced: bool,
    pub has_full_version: bool,
    pub install_type: String,
    pub is_background: bool,
}

/// Identity and environment for a reporting session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingContext {
    /// Random per-install identifier, distinct from the user id.
    pub reporting_uuid: Uuid,
    pub user: String,
    pub tags: ReportingTags,
}

impl ReportingContext {
    pub fn new(user: impl Into<String>, tags: ReportingTags) -> Self {
        Self {
            reporting_uuid: Uuid::new_v4(),
            user: user.into(),
            tags,
        }
    }
}

/// How a sync attempt concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Success,
    Retry,
    Failure,
}

impl SyncAction {
    fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Success => "success",
            SyncAction::Retry => "retry",
            SyncAction::Failure => "failure",
        }
    }
}

/// Whether a batch submission succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Success,
    Failure,
}

impl SyncOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Success => "success",
            SyncOutcome::Failure => "failure",
        }
    }
}

/// Outcome of a token acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Valid,
    Invalid,
}

impl AuthOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            AuthOutcome::Valid => "valid",
            AuthOutcome::Invalid => "invalid",
        }
    }
}

/// Install-lifecycle transitions worth counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    Installed,
    Updated,
    Activated,
}

impl ActivationOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            ActivationOutcome::Installed => "installed",
            ActivationOutcome::Updated => "updated",
            ActivationOutcome::Activated => "activated",
        }
    }
}

enum ReporterState {
    /// Context not yet known; events queue up to [`DEFERRED_QUEUE_CAP`].
    Pending { deferred: VecDeque<AnalyticsEvent> },
    Ready(ReportingContext),
}

/// Classifies sync outcomes into analytics events and dispatches them.
///
/// Thread-safe; methods never block on I/O and never fail. Reporting is
/// best-effort by design: a lost analytics hit must not affect sync.
pub struct Reporter {
    sink: Box<dyn AnalyticsSink>,
    state: Mutex<ReporterState>,
    error_seen: Mutex<HashMap<String, Instant>>,
}

impl Reporter {
    pub fn new(sink: Box<dyn AnalyticsSink>) -> Self {
        Self {
            sink,
            state: Mutex::new(ReporterState::Pending {
                deferred: VecDeque::new(),
            }),
            error_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Mark the reporter ready and flush queued events in arrival order.
    pub fn set_context(&self, context: ReportingContext) {
        let mut state = self.state.lock().unwrap();
        if let ReporterState::Pending { deferred } = &mut *state {
            let queued = std::mem::take(deferred);
            debug!(count = queued.len(), "flushing deferred analytics events");
            for event in queued {
                self.sink.send(event);
            }
        }
        *state = ReporterState::Ready(context);
    }

    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.lock().unwrap(), ReporterState::Ready(_))
    }

    pub fn context(&self) -> Option<ReportingContext> {
        match &*self.state.lock().unwrap() {
            ReporterState::Ready(context) => Some(context.clone()),
            ReporterState::Pending { .. } => None,
        }
    }

    fn dispatch(&self, event: AnalyticsEvent) {
        let mut state = self.state.lock().unwrap();
        match &mut *state {
            ReporterState::Ready(_) => {
                drop(state);
                self.sink.send(event);
            }
            ReporterState::Pending { deferred } => {
                if deferred.len() >= DEFERRED_QUEUE_CAP {
                    let dropped = deferred.pop_front();
                    warn!(
                        dropped = ?dropped.map(|e| e.category),
                        "deferred analytics queue full, dropping oldest"
                    );
                }
                deferred.push_back(event);
            }
        }
    }

    /// Report the overall conclusion of a sync attempt.
    pub fn report_sync(&self, action: SyncAction, label: impl Into<String>) {
        self.dispatch(AnalyticsEvent::new("sync", action.as_str()).with_label(label));
    }

    /// Report the outcome of one submitted batch, with its size.
    pub fn report_batch_outcome(&self, kind: EntityKind, outcome: SyncOutcome, count: usize) {
        self.dispatch(
            AnalyticsEvent::new(format!("newSync{}", kind.title()), outcome.as_str())
                .with_value(count as u64),
        );
    }

    /// Report the composition of a batch about to be submitted: one event per
    /// mutation shape present, valued with its count. Absent shapes are not
    /// reported at all.
    pub fn report_mutation_batch<C, U>(&self, kind: EntityKind, mutations: &[Mutation<C, U>]) {
        for shape in MutationKind::ALL {
            let count = mutations.iter().filter(|m| m.kind() == shape).count();
            if count > 0 {
                self.dispatch(
                    AnalyticsEvent::new(format!("{}MutationBatch", kind.as_str()), shape.as_str())
                        .with_value(count as u64),
                );
            }
        }
    }

    /// Report that a batch mixed reorders with other mutation shapes.
    /// A count of zero reports nothing.
    pub fn report_mixed_reorders(&self, count: usize) {
        if count > 0 {
            self.dispatch(
                AnalyticsEvent::new("mixedReorders", "present").with_value(count as u64),
            );
        }
    }

    /// Report a token acquisition outcome.
    pub fn report_auth(&self, outcome: AuthOutcome, label: impl Into<String>) {
        self.dispatch(AnalyticsEvent::new("oauth", outcome.as_str()).with_label(label));
    }

    /// Report an install-lifecycle transition.
    pub fn report_activation(&self, outcome: ActivationOutcome) {
        self.dispatch(AnalyticsEvent::new("activation", outcome.as_str()));
    }

    /// Report an unexpected error, deduplicated by message: a message seen
    /// within the last ten minutes is silently dropped.
    pub fn report_error(&self, message: impl Into<String>) {
        let message = message.into();
        let now = Instant::now();
        {
            let mut seen = self.error_seen.lock().unwrap();
            if let Some(last) = seen.get(&message) {
                if now.duration_since(*last) < ERROR_REPORT_WINDOW {
                    debug!(%message, "suppressing repeated error report");
                    return;
                }
            }
            seen.retain(|_, last| now.duration_since(*last) < ERROR_REPORT_WINDOW);
            seen.insert(message.clone(), now);
        }
        self.dispatch(AnalyticsEvent::new("error", "reported").with_label(message));
    }
}
