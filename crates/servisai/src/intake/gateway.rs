use std::fmt::Debug;

use async_trait::async_trait;
use tracing::error;

use super::draft::LeadPayload;

/// Failure while persisting a lead. Callers treat every variant the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("lead store unreachable: {0}")]
    Transport(String),
    #[error("lead store rejected the insert ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("lead store unavailable: {0}")]
    Unavailable(String),
}

/// Durable insert of one lead row. Implementations must not retry.
#[async_trait]
pub trait LeadGateway: Debug + Send + Sync {
    async fn insert_lead(&self, lead: &LeadPayload) -> Result<(), GatewayError>;
}

/// Receives one report per failed submission.
pub trait ErrorSink: Debug + Send + Sync {
    fn report(&self, lead: &LeadPayload, error: &GatewayError);
}

/// Routes submission failures into the service log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, lead: &LeadPayload, err: &GatewayError) {
        error!(
            category = %lead.category,
            zip_code = %lead.zip_code,
            error = %err,
            "error submitting lead"
        );
    }
}
