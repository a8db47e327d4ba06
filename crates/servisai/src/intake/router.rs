use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::catalog::{ActivityRecord, Category, CategoryId, PriceOffer};
use super::draft::DraftUpdate;
use super::service::IntakeService;
use super::session::{IntakeSession, SessionId, SessionSnapshot, SubmitOutcome};
use super::submission::SubmitRejection;

/// Router builder exposing the intake page endpoints.
pub fn intake_router(service: Arc<IntakeService>) -> Router {
    Router::new()
        .route("/api/v1/catalog", get(catalog_handler))
        .route("/api/v1/sessions", post(open_session_handler))
        .route(
            "/api/v1/sessions/:session_id",
            get(snapshot_handler).delete(close_session_handler),
        )
        .route(
            "/api/v1/sessions/:session_id/selection",
            post(selection_handler),
        )
        .route("/api/v1/sessions/:session_id/draft", patch(draft_handler))
        .route("/api/v1/sessions/:session_id/submit", post(submit_handler))
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogView {
    pub(crate) categories: Vec<Category>,
    pub(crate) form_categories: Vec<CategoryId>,
    pub(crate) offers: Vec<PriceOffer>,
    pub(crate) activity: Vec<ActivityRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectionRequest {
    pub(crate) category: CategoryId,
}

#[derive(Debug, Serialize)]
pub(crate) struct SelectionResponse {
    pub(crate) changed: bool,
    pub(crate) session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<SubmitRejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    pub(crate) session: SessionSnapshot,
}

fn session_not_found(id: &SessionId) -> Response {
    let payload = json!({
        "error": format!("intake session '{id}' not found"),
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn lookup(service: &IntakeService, raw: String) -> Result<Arc<IntakeSession>, Response> {
    let id = SessionId(raw);
    service.session(&id).ok_or_else(|| session_not_found(&id))
}

pub(crate) async fn catalog_handler(State(service): State<Arc<IntakeService>>) -> Response {
    let catalog = service.catalog();
    let view = CatalogView {
        categories: catalog.all().to_vec(),
        form_categories: catalog.active().map(|category| category.id.clone()).collect(),
        offers: service.offers().to_vec(),
        activity: service.feed().records().to_vec(),
    };
    (StatusCode::OK, Json(view)).into_response()
}

pub(crate) async fn open_session_handler(State(service): State<Arc<IntakeService>>) -> Response {
    let session = service.open_session();
    let snapshot = session.snapshot().await;
    (StatusCode::CREATED, Json(snapshot)).into_response()
}

pub(crate) async fn snapshot_handler(
    State(service): State<Arc<IntakeService>>,
    Path(session_id): Path<String>,
) -> Response {
    match lookup(&service, session_id) {
        Ok(session) => (StatusCode::OK, Json(session.snapshot().await)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn close_session_handler(
    State(service): State<Arc<IntakeService>>,
    Path(session_id): Path<String>,
) -> Response {
    let id = SessionId(session_id);
    if service.close_session(&id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_not_found(&id)
    }
}

pub(crate) async fn selection_handler(
    State(service): State<Arc<IntakeService>>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectionRequest>,
) -> Response {
    let session = match lookup(&service, session_id) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let changed = session.select_category(&request.category).await;
    let response = SelectionResponse {
        changed,
        session: session.snapshot().await,
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) async fn draft_handler(
    State(service): State<Arc<IntakeService>>,
    Path(session_id): Path<String>,
    Json(update): Json<DraftUpdate>,
) -> Response {
    let session = match lookup(&service, session_id) {
        Ok(session) => session,
        Err(response) => return response,
    };

    session.edit_draft(update).await;
    (StatusCode::OK, Json(session.snapshot().await)).into_response()
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<IntakeService>>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match lookup(&service, session_id) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let outcome = session.submit().await;
    let (reason, error) = match &outcome {
        SubmitOutcome::Ignored(reason) => (Some(*reason), None),
        SubmitOutcome::Succeeded => (None, None),
        SubmitOutcome::Failed(err) => (None, Some(err.to_string())),
    };

    let response = SubmitResponse {
        outcome: outcome.label(),
        reason,
        error,
        session: session.snapshot().await,
    };
    (StatusCode::OK, Json(response)).into_response()
}
