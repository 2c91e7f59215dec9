use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderName, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shipquote_core::domain::job::{BulkJob, BulkJobRequest, JobId};
use shipquote_core::domain::quote::{QuotePriceResult, QuoteRequest};
use shipquote_core::errors::{ApplicationError, InterfaceError};
use shipquote_core::jobs::BulkJobService;
use shipquote_core::pricing::PricingEngine;
use shipquote_core::rules::RuleProvider;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    pub jobs: BulkJobService,
    pub rules: Arc<dyn RuleProvider>,
    pub engine: Arc<dyn PricingEngine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAccepted {
    pub job_id: JobId,
}

type ApiRejection = (StatusCode, Json<ApiError>);

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/quotes/price", post(price_quote))
        .route("/quotes/bulk", post(submit_bulk))
        .route("/jobs/{job_id}", get(get_job))
        .with_state(state)
}

/// Prices one quote synchronously against a fresh rule fetch.
pub async fn price_quote(
    State(state): State<ApiState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<QuotePriceResult>, ApiRejection> {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(request) = payload.map_err(malformed_body)?;

    request.validate().map_err(|error| reject(error.into(), &correlation_id))?;
    let rules = state
        .rules
        .fetch_rules()
        .await
        .map_err(|error| reject(error.into(), &correlation_id))?;
    let result = state
        .engine
        .price(&request, &rules)
        .map_err(|error| reject(error.into(), &correlation_id))?;

    info!(
        event_name = "pricing.quote.priced",
        correlation_id = %correlation_id,
        rule_count = rules.len(),
        applied_count = result.applied_rules.len(),
        "single quote priced"
    );
    Ok(Json(result))
}

pub async fn submit_bulk(
    State(state): State<ApiState>,
    payload: Result<Json<BulkJobRequest>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<JobAccepted>), ApiRejection> {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(request) = payload.map_err(malformed_body)?;

    let job_id =
        state.jobs.submit(request.quotes).await.map_err(|error| reject(error, &correlation_id))?;

    let location = format!("/jobs/{job_id}");
    Ok((StatusCode::ACCEPTED, [(header::LOCATION, location)], Json(JobAccepted { job_id })))
}

pub async fn get_job(
    State(state): State<ApiState>,
    Path(job_id): Path<String>,
) -> Result<Json<BulkJob>, ApiRejection> {
    let correlation_id = Uuid::new_v4().to_string();

    let job =
        state.jobs.job(&JobId(job_id)).await.map_err(|error| reject(error, &correlation_id))?;
    Ok(Json(job))
}

fn malformed_body(rejection: JsonRejection) -> ApiRejection {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: rejection.body_text() }))
}

fn reject(error: ApplicationError, correlation_id: &str) -> ApiRejection {
    let interface = error.into_interface(correlation_id);
    let (status, message) = match &interface {
        InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
        InterfaceError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.clone()),
        InterfaceError::Unprocessable { message, .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, message.clone())
        }
        InterfaceError::ServiceUnavailable { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, interface.user_message().to_string())
        }
        InterfaceError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, interface.user_message().to_string())
        }
    };

    if status.is_server_error() {
        error!(
            event_name = "system.api.request_failed",
            correlation_id = %interface.correlation_id(),
            status = status.as_u16(),
            error = %interface,
            "request failed"
        );
    } else {
        warn!(
            event_name = "system.api.request_rejected",
            correlation_id = %interface.correlation_id(),
            status = status.as_u16(),
            error = %interface,
            "request rejected"
        );
    }

    (status, Json(ApiError { error: message }))
}
