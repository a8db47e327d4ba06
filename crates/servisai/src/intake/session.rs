use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use super::catalog::{ActivityFeed, ActivityRecord, CategoryCatalog, CategoryId};
use super::draft::{DraftUpdate, LeadDraft, LeadDraftStore, LeadPayload};
use super::gateway::{ErrorSink, GatewayError, LeadGateway};
use super::selector::CategorySelector;
use super::submission::{SubmissionController, SubmissionState, SubmitRejection};
use super::ticker::ActivityTicker;
use crate::config::IntakeTiming;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared collaborators every session on this node is wired to.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub catalog: Arc<CategoryCatalog>,
    pub feed: Arc<ActivityFeed>,
    pub gateway: Arc<dyn LeadGateway>,
    pub sink: Arc<dyn ErrorSink>,
    pub timing: IntakeTiming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored(SubmitRejection),
    Succeeded,
    Failed(GatewayError),
}

impl SubmitOutcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ignored(_) => "ignored",
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// Point-in-time view of a session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub selected_category: CategoryId,
    pub draft: LeadDraft,
    pub draft_valid: bool,
    pub submission: SubmissionState,
    pub notice_visible: bool,
    pub activity_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityRecord>,
}

struct SessionState {
    selector: CategorySelector,
    drafts: LeadDraftStore,
    submission: SubmissionController,
    ticker: ActivityTicker,
    notice_timer: Option<JoinHandle<()>>,
    last_seen: Instant,
    closed: bool,
}

impl SessionState {
    fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    fn cancel_notice_timer(&mut self) {
        if let Some(timer) = self.notice_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SessionState {
    fn drop(&mut self) {
        self.cancel_notice_timer();
    }
}

/// One visitor's intake page: browsing selection, lead draft, submission
/// state, and the rotating activity display.
///
/// All state sits behind a single lock. The lock is released while the
/// gateway call is pending, so edits and snapshots stay responsive; the
/// `Submitting` state alone keeps a second submit out.
pub struct IntakeSession {
    id: SessionId,
    context: SessionContext,
    state: Mutex<SessionState>,
}

impl fmt::Debug for IntakeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntakeSession")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl IntakeSession {
    /// Starts the activity ticker, so this must run inside a Tokio runtime.
    pub fn open(id: SessionId, context: SessionContext) -> Arc<Self> {
        let default_category = context.catalog.default_category().id.clone();
        let state = SessionState {
            selector: CategorySelector::new(&context.catalog),
            drafts: LeadDraftStore::new(default_category),
            submission: SubmissionController::new(),
            ticker: ActivityTicker::start(&context.feed, context.timing.activity_interval),
            notice_timer: None,
            last_seen: Instant::now(),
            closed: false,
        };

        info!(session = %id, "intake session opened");
        Arc::new(Self {
            id,
            context,
            state: Mutex::new(state),
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let mut state = self.state.lock().await;
        state.touch();
        let activity_index = state.ticker.index();
        SessionSnapshot {
            session_id: self.id.clone(),
            selected_category: state.selector.current().clone(),
            draft: state.drafts.draft().clone(),
            draft_valid: state.drafts.is_valid(),
            submission: state.submission.state(),
            notice_visible: state.submission.notice_visible(),
            activity_index,
            activity: state.ticker.current(&self.context.feed).cloned(),
        }
    }

    /// Highlight a category while browsing. Returns `false` when ignored.
    pub async fn select_category(&self, id: &CategoryId) -> bool {
        let mut state = self.state.lock().await;
        if state.closed {
            return false;
        }
        state.touch();
        let changed = state.selector.select(&self.context.catalog, id);
        if !changed {
            debug!(session = %self.id, category = %id, "ignored selection of unavailable category");
        }
        changed
    }

    /// Returns `false` once the session is closed.
    pub async fn edit_draft(&self, update: DraftUpdate) -> bool {
        let mut state = self.state.lock().await;
        if state.closed {
            return false;
        }
        state.touch();
        state.drafts.apply(update);
        true
    }

    /// Runs one submit request to completion.
    ///
    /// The gateway call runs on its own task so the session always resolves
    /// out of `Submitting`, even if the caller stops waiting.
    pub async fn submit(self: &Arc<Self>) -> SubmitOutcome {
        let payload = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            if state.closed {
                debug!(session = %self.id, "submit on closed session ignored");
                return SubmitOutcome::Ignored(SubmitRejection::Closed);
            }
            state.touch();
            match state.submission.begin(&state.drafts) {
                Ok(payload) => payload,
                Err(reason) => {
                    debug!(session = %self.id, %reason, "submit request ignored");
                    return SubmitOutcome::Ignored(reason);
                }
            }
        };

        info!(session = %self.id, category = %payload.category, "submitting lead");
        let session = Arc::clone(self);
        let pending = payload.clone();
        let task = tokio::spawn(async move { session.finish_submit(pending).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                let err = GatewayError::Unavailable(join_error.to_string());
                let mut state = self.state.lock().await;
                if state.submission.resolve_failure() {
                    drop(state);
                    self.context.sink.report(&payload, &err);
                }
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn finish_submit(self: Arc<Self>, payload: LeadPayload) -> SubmitOutcome {
        let result = self.context.gateway.insert_lead(&payload).await;

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        match result {
            Ok(()) => {
                let generation = state.submission.resolve_success(&mut state.drafts);
                state.cancel_notice_timer();
                if let Some(generation) = generation {
                    if state.closed {
                        state.submission.dismiss_notice(generation);
                    } else {
                        state.notice_timer = Some(self.schedule_notice_dismiss(generation));
                    }
                }
                info!(session = %self.id, category = %payload.category, "lead stored");
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                state.submission.resolve_failure();
                drop(guard);
                self.context.sink.report(&payload, &err);
                SubmitOutcome::Failed(err)
            }
        }
    }

    fn schedule_notice_dismiss(self: &Arc<Self>, generation: u64) -> JoinHandle<()> {
        let session = Arc::downgrade(self);
        let delay = self.context.timing.notice_dismiss;

        tokio::spawn(async move {
            time::sleep(delay).await;
            let Some(session) = session.upgrade() else {
                return;
            };
            let mut state = session.state.lock().await;
            if state.submission.dismiss_notice(generation) {
                // The handle being cleared belongs to this task.
                state.notice_timer = None;
                debug!(session = %session.id, "success notice dismissed");
            }
        })
    }

    /// Stops every timer owned by the session. Safe to call more than once.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.closed = true;
        state.ticker.stop();
        state.cancel_notice_timer();
        let generation = state.submission.notice_generation();
        state.submission.dismiss_notice(generation);
        if state.submission.state() == SubmissionState::Submitting {
            warn!(session = %self.id, "session closed while a lead submission is pending");
        }
        info!(session = %self.id, "intake session closed");
    }

    /// Time since the last visitor action on this session.
    pub async fn idle_for(&self) -> Duration {
        self.state.lock().await.last_seen.elapsed()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    pub async fn ticker_running(&self) -> bool {
        self.state.lock().await.ticker.is_running()
    }
}
