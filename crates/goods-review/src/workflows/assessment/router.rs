use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use serde_json::json;

use super::domain::{CaseId, ReviewerId};
use super::repository::{CaseDirectory, CatalogStore, RepositoryError, ReviewPermissions};
use super::request::AssessmentLine;
use super::service::{AssessmentError, AssessmentService};

/// Header carrying the authenticated caseworker id.
pub const REVIEWER_HEADER: &str = "x-reviewer-id";

/// Router builder exposing the batch assessment and precedent endpoints.
pub fn assessment_router<S, C, P>(service: Arc<AssessmentService<S, C, P>>) -> Router
where
    S: CatalogStore + 'static,
    C: CaseDirectory + 'static,
    P: ReviewPermissions + 'static,
{
    Router::new()
        .route(
            "/api/v1/cases/:case_id/assessments",
            put(assess_handler::<S, C, P>),
        )
        .route(
            "/api/v1/cases/:case_id/good-precedents",
            get(precedents_handler::<S, C, P>),
        )
        .with_state(service)
}

fn reviewer_from(headers: &HeaderMap) -> Option<ReviewerId> {
    headers
        .get(REVIEWER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| ReviewerId(value.to_string()))
}

fn forbidden(message: String) -> Response {
    (StatusCode::FORBIDDEN, axum::Json(json!({ "error": message }))).into_response()
}

pub(crate) async fn assess_handler<S, C, P>(
    State(service): State<Arc<AssessmentService<S, C, P>>>,
    Path(case_id): Path<String>,
    headers: HeaderMap,
    axum::Json(lines): axum::Json<Vec<AssessmentLine>>,
) -> Response
where
    S: CatalogStore + 'static,
    C: CaseDirectory + 'static,
    P: ReviewPermissions + 'static,
{
    let Some(reviewer) = reviewer_from(&headers) else {
        return forbidden(format!("missing {REVIEWER_HEADER} header"));
    };

    match service.assess(&CaseId(case_id), &reviewer, lines) {
        Ok(_) => StatusCode::OK.into_response(),
        Err(AssessmentError::Forbidden(reviewer)) => {
            forbidden(AssessmentError::Forbidden(reviewer).to_string())
        }
        Err(AssessmentError::CaseNotFound(case_id)) => {
            let payload = json!({
                "error": format!("case {case_id} not found"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error @ (AssessmentError::TerminalCase { .. } | AssessmentError::DuplicateIds(_))) => {
            let payload = json!({
                "errors": [error.to_string()],
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(AssessmentError::InvalidLines(errors)) => {
            let payload = json!({
                "errors": errors,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            tracing::error!(error = %other, "assessment batch failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn precedents_handler<S, C, P>(
    State(service): State<Arc<AssessmentService<S, C, P>>>,
    Path(case_id): Path<String>,
) -> Response
where
    S: CatalogStore + 'static,
    C: CaseDirectory + 'static,
    P: ReviewPermissions + 'static,
{
    match service.case_precedents(&CaseId(case_id)) {
        Ok(precedents) => (StatusCode::OK, axum::Json(precedents)).into_response(),
        Err(AssessmentError::CaseNotFound(case_id)) => {
            let payload = json!({
                "error": format!("case {case_id} not found"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(AssessmentError::Repository(RepositoryError::NotFound { entity, id })) => {
            let payload = json!({
                "error": format!("{entity} {id} not found"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
