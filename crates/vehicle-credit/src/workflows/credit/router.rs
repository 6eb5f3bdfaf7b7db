use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::json;

use super::amortization::QuoteRequest;
use super::contract::RenderError;
use super::domain::{
    ApplicationId, ApplicationInput, ApplicationStatus, ApplicationStatusView, Decision,
};
use super::ledger::{ApplicationLedger, LedgerError};
use super::service::{CreditApplicationService, CreditServiceError};

/// Router builder exposing HTTP endpoints for intake, decisions, and contracts.
pub fn application_router<L>(service: Arc<CreditApplicationService<L>>) -> Router
where
    L: ApplicationLedger + 'static,
{
    Router::new()
        .route("/api/v1/credit/vehicles", get(vehicles_handler::<L>))
        .route("/api/v1/credit/quote", post(quote_handler::<L>))
        .route("/api/v1/credit/summary", get(summary_handler::<L>))
        .route(
            "/api/v1/credit/applications",
            post(submit_handler::<L>).get(list_handler::<L>),
        )
        .route(
            "/api/v1/credit/applications/:application_id",
            get(status_handler::<L>),
        )
        .route(
            "/api/v1/credit/applications/:application_id/approve",
            post(approve_handler::<L>),
        )
        .route(
            "/api/v1/credit/applications/:application_id/reject",
            post(reject_handler::<L>),
        )
        .route(
            "/api/v1/credit/applications/:application_id/contract",
            get(contract_handler::<L>),
        )
        .with_state(service)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    status: Option<String>,
}

pub(crate) async fn vehicles_handler<L>(
    State(service): State<Arc<CreditApplicationService<L>>>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    let vehicles = service.catalog().vehicles().to_vec();
    (StatusCode::OK, axum::Json(json!({ "vehicles": vehicles }))).into_response()
}

pub(crate) async fn quote_handler<L>(
    State(service): State<Arc<CreditApplicationService<L>>>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    let quote = service.quote(&request);
    let payload = json!({
        "monthly_payment": quote.map(|quote| quote.monthly_payment),
        "quote": quote,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn summary_handler<L>(
    State(service): State<Arc<CreditApplicationService<L>>>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    match service.summary() {
        Ok(counts) => {
            let payload = json!({
                "total": counts.total(),
                "pending": counts.pending,
                "approved": counts.approved,
                "rejected": counts.rejected,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<L>(
    State(service): State<Arc<CreditApplicationService<L>>>,
    axum::Json(input): axum::Json<ApplicationInput>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    match service.submit(input, now()) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<L>(
    State(service): State<Arc<CreditApplicationService<L>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => match ApplicationStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                let payload = json!({
                    "error": format!("unknown status filter '{raw}'"),
                });
                return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
            }
        },
    };

    match service.list(status) {
        Ok(records) => {
            let views: Vec<ApplicationStatusView> =
                records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, axum::Json(json!({ "applications": views }))).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<L>(
    State(service): State<Arc<CreditApplicationService<L>>>,
    Path(application_id): Path<String>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn approve_handler<L>(
    State(service): State<Arc<CreditApplicationService<L>>>,
    Path(application_id): Path<String>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    decision_response(&service, application_id, Decision::Approved)
}

pub(crate) async fn reject_handler<L>(
    State(service): State<Arc<CreditApplicationService<L>>>,
    Path(application_id): Path<String>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    decision_response(&service, application_id, Decision::Rejected)
}

fn decision_response<L>(
    service: &CreditApplicationService<L>,
    application_id: String,
    decision: Decision,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    match service.decide(&ApplicationId(application_id), decision, now()) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn contract_handler<L>(
    State(service): State<Arc<CreditApplicationService<L>>>,
    Path(application_id): Path<String>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    match service.contract(&ApplicationId(application_id), now()) {
        Ok(document) => {
            let disposition = attachment_disposition(&document.filename);
            (
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("text/plain; charset=utf-8"),
                    ),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document.body,
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Quoted-string filename parameter; quotes, backslashes and control characters are dropped.
fn attachment_disposition(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .filter(|c| !matches!(c, '"' | '\\') && !c.is_control())
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn error_response(err: CreditServiceError) -> Response {
    match err {
        CreditServiceError::Validation(errors) => {
            let payload = json!({
                "error": errors.to_string(),
                "fields": errors.errors(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        CreditServiceError::Ledger(LedgerError::NotFound(id)) => {
            let payload = json!({
                "error": format!("application {id} not found"),
                "application_id": id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        CreditServiceError::Ledger(err @ LedgerError::InvalidRecord { .. }) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        CreditServiceError::Ledger(err @ LedgerError::InvalidTransition { .. })
        | CreditServiceError::Ledger(err @ LedgerError::DuplicateId(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        CreditServiceError::Render(err @ RenderError::NotApproved { .. }) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
