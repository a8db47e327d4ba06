use serde::Serialize;

use super::draft::{LeadDraftStore, LeadPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// Why a submit request had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SubmitRejection {
    #[error("description and zip code are required")]
    ValidationGap,
    #[error("a submission is already in flight")]
    InFlight,
    #[error("the intake session is closed")]
    Closed,
}

/// Submission state machine for one intake session.
///
/// `begin` moves to `Submitting` and hands back the payload to persist; the
/// caller then reports the gateway outcome through `resolve_success` or
/// `resolve_failure`. `Failed` and `Succeeded` both accept a fresh submit.
#[derive(Debug, Clone)]
pub struct SubmissionController {
    state: SubmissionState,
    notice_generation: u64,
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionController {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
            notice_generation: 0,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn notice_visible(&self) -> bool {
        self.state == SubmissionState::Succeeded
    }

    /// Generation of the most recent success notice.
    pub fn notice_generation(&self) -> u64 {
        self.notice_generation
    }

    pub fn begin(&mut self, drafts: &LeadDraftStore) -> Result<LeadPayload, SubmitRejection> {
        if self.state == SubmissionState::Submitting {
            return Err(SubmitRejection::InFlight);
        }
        if !drafts.is_valid() {
            return Err(SubmitRejection::ValidationGap);
        }

        self.state = SubmissionState::Submitting;
        Ok(drafts.payload())
    }

    /// Resets the draft and shows the notice. Returns the notice generation
    /// that a later `dismiss_notice` must present.
    pub fn resolve_success(&mut self, drafts: &mut LeadDraftStore) -> Option<u64> {
        if self.state != SubmissionState::Submitting {
            return None;
        }
        drafts.reset();
        self.notice_generation += 1;
        self.state = SubmissionState::Succeeded;
        Some(self.notice_generation)
    }

    /// The draft is kept so the visitor can retry.
    pub fn resolve_failure(&mut self) -> bool {
        if self.state != SubmissionState::Submitting {
            return false;
        }
        self.state = SubmissionState::Failed;
        true
    }

    /// Returns `true` when the notice was cleared. Stale generations are ignored.
    pub fn dismiss_notice(&mut self, generation: u64) -> bool {
        if self.state != SubmissionState::Succeeded || generation != self.notice_generation {
            return false;
        }
        self.state = SubmissionState::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::catalog::CategoryId;

    fn valid_store() -> LeadDraftStore {
        let mut store = LeadDraftStore::new(CategoryId::new("a"));
        store.set_description("broken screen");
        store.set_zip_code("01001");
        store
    }

    #[test]
    fn begin_blocks_on_validation_gap() {
        let mut controller = SubmissionController::new();
        let mut store = LeadDraftStore::new(CategoryId::new("a"));
        store.set_zip_code("01001");

        assert_eq!(
            controller.begin(&store),
            Err(SubmitRejection::ValidationGap)
        );
        assert_eq!(controller.state(), SubmissionState::Idle);
    }

    #[test]
    fn begin_is_single_flight() {
        let mut controller = SubmissionController::new();
        let store = valid_store();

        let payload = controller.begin(&store).expect("first submit accepted");
        assert_eq!(payload.description, "broken screen");
        assert_eq!(controller.state(), SubmissionState::Submitting);
        assert_eq!(controller.begin(&store), Err(SubmitRejection::InFlight));
    }

    #[test]
    fn success_resets_draft_and_dismisses_by_generation() {
        let mut controller = SubmissionController::new();
        let mut store = valid_store();
        controller.begin(&store).expect("accepted");

        let generation = controller
            .resolve_success(&mut store)
            .expect("resolves from submitting");
        assert!(controller.notice_visible());
        assert!(store.draft().description.is_empty());
        assert!(store.draft().zip_code.is_empty());

        assert!(!controller.dismiss_notice(generation + 1));
        assert!(controller.dismiss_notice(generation));
        assert_eq!(controller.state(), SubmissionState::Idle);
    }

    #[test]
    fn failure_keeps_draft_and_accepts_retry() {
        let mut controller = SubmissionController::new();
        let store = valid_store();
        controller.begin(&store).expect("accepted");

        assert!(controller.resolve_failure());
        assert_eq!(controller.state(), SubmissionState::Failed);
        assert_eq!(store.draft().description, "broken screen");

        controller.begin(&store).expect("retry accepted from failed");
        assert_eq!(controller.state(), SubmissionState::Submitting);
    }

    #[test]
    fn resolution_outside_submitting_is_ignored() {
        let mut controller = SubmissionController::new();
        let mut store = valid_store();
        assert_eq!(controller.resolve_success(&mut store), None);
        assert!(!controller.resolve_failure());
        assert_eq!(store.draft().description, "broken screen");
        assert_eq!(controller.state(), SubmissionState::Idle);
    }

    #[test]
    fn resubmitting_from_succeeded_invalidates_old_notice() {
        let mut controller = SubmissionController::new();
        let mut store = valid_store();
        controller.begin(&store).expect("accepted");
        let first = controller.resolve_success(&mut store).expect("resolved");

        store.set_description("second issue");
        store.set_zip_code("02002");
        controller.begin(&store).expect("accepted from succeeded");
        let second = controller.resolve_success(&mut store).expect("resolved");

        assert!(!controller.dismiss_notice(first));
        assert!(controller.notice_visible());
        assert!(controller.dismiss_notice(second));
    }
}
