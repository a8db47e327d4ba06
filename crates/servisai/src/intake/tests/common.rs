use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use serde_json::Value;

use crate::config::IntakeTiming;
use crate::intake::draft::LeadPayload;
use crate::intake::gateway::{ErrorSink, GatewayError, LeadGateway};
use crate::intake::service::IntakeService;

pub(super) const ACTIVITY_PERIOD: Duration = Duration::from_millis(4_000);
pub(super) const NOTICE_DELAY: Duration = Duration::from_millis(5_000);
pub(super) const GATEWAY_LATENCY: Duration = Duration::from_millis(100);
pub(super) const SESSION_IDLE: Duration = Duration::from_secs(600);

pub(super) fn timing() -> IntakeTiming {
    IntakeTiming {
        activity_interval: ACTIVITY_PERIOD,
        notice_dismiss: NOTICE_DELAY,
        session_idle: SESSION_IDLE,
    }
}

/// Gateway that records every insert and answers after a fixed latency.
#[derive(Debug, Default)]
pub(super) struct RecordingGateway {
    calls: Mutex<Vec<LeadPayload>>,
    failure: Option<GatewayError>,
}

impl RecordingGateway {
    pub(super) fn failing(error: GatewayError) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub(super) fn calls(&self) -> Vec<LeadPayload> {
        self.calls.lock().expect("gateway mutex poisoned").clone()
    }
}

#[async_trait]
impl LeadGateway for RecordingGateway {
    async fn insert_lead(&self, lead: &LeadPayload) -> Result<(), GatewayError> {
        self.calls
            .lock()
            .expect("gateway mutex poisoned")
            .push(lead.clone());
        tokio::time::sleep(GATEWAY_LATENCY).await;
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct RecordingSink {
    reports: Mutex<Vec<(LeadPayload, GatewayError)>>,
}

impl RecordingSink {
    pub(super) fn reports(&self) -> Vec<(LeadPayload, GatewayError)> {
        self.reports.lock().expect("sink mutex poisoned").clone()
    }
}

impl ErrorSink for RecordingSink {
    fn report(&self, lead: &LeadPayload, error: &GatewayError) {
        self.reports
            .lock()
            .expect("sink mutex poisoned")
            .push((lead.clone(), error.clone()));
    }
}

pub(super) fn build_service(
    gateway: RecordingGateway,
) -> (Arc<IntakeService>, Arc<RecordingGateway>, Arc<RecordingSink>) {
    let gateway = Arc::new(gateway);
    let sink = Arc::new(RecordingSink::default());
    let service = IntakeService::standard(gateway.clone(), sink.clone(), timing());
    (Arc::new(service), gateway, sink)
}

pub(super) fn unavailable() -> GatewayError {
    GatewayError::Unavailable("database offline".to_string())
}

pub(super) fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
