//! HTTP routes for the batch check endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use domain_pulse_lib::{prepare_batch, BatchSummary, DomainChecker, DomainResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<DomainChecker>,
    pub max_domains: usize,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub domains: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/check-domains", post(check_domains))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/check-domains`
///
/// Other methods on this path get axum's default `405` with an empty body.
async fn check_domains(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected malformed check request");
            return client_error(rejection.body_text());
        }
    };

    let hostnames = prepare_batch(&request.domains);
    if hostnames.len() > state.max_domains {
        return client_error(format!(
            "Too many domains: {} (limit {})",
            hostnames.len(),
            state.max_domains
        ));
    }

    let checker = state.checker.clone();
    let batch = tokio::spawn(async move { checker.check_domains(&hostnames).await }).await;

    batch_response(batch)
}

/// Map a finished batch task to a response.
fn batch_response(batch: Result<Vec<DomainResult>, JoinError>) -> Response {
    match batch {
        Ok(results) => {
            let summary = BatchSummary::from_results(&results);
            tracing::info!(
                total = summary.total,
                available = summary.available,
                taken = summary.taken,
                errors = summary.errors,
                "Checked batch"
            );
            (StatusCode::OK, Json(results)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Batch evaluation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Vec::<DomainResult>::new()),
            )
                .into_response()
        }
    }
}

fn client_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}
