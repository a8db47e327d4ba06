//! Lead intake for the marketplace landing page.
//!
//! A visitor browses categories, composes a lead, and submits it once; the
//! page also rotates a recent-activity feed on a timer. Each visitor gets an
//! [`IntakeSession`] that owns this state, and [`IntakeService`] keeps the
//! live sessions for the HTTP router.

pub mod catalog;
pub mod draft;
pub mod gateway;
pub mod router;
pub mod selector;
pub mod service;
pub mod session;
pub mod submission;
pub mod supabase;
pub mod ticker;

#[cfg(test)]
mod tests;

pub use catalog::{
    ActivityFeed, ActivityRecord, CatalogError, Category, CategoryCatalog, CategoryId, PriceOffer,
};
pub use draft::{DraftUpdate, LeadDraft, LeadDraftStore, LeadPayload};
pub use gateway::{ErrorSink, GatewayError, LeadGateway, TracingErrorSink};
pub use router::intake_router;
pub use selector::CategorySelector;
pub use service::IntakeService;
pub use session::{IntakeSession, SessionContext, SessionId, SessionSnapshot, SubmitOutcome};
pub use submission::{SubmissionController, SubmissionState, SubmitRejection};
pub use supabase::SupabaseGateway;
pub use ticker::ActivityTicker;
