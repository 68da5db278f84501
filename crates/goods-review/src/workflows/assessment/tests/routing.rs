use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::assessment::{AssessmentService, REQUIRED_REPORT_SUMMARY, REVIEWER_HEADER};

fn put_assessments(case: &str, reviewer: Option<&str>, body: Value) -> Request<Body> {
    let mut request = Request::put(format!("/api/v1/cases/{case}/assessments"))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(reviewer) = reviewer {
        request = request.header(REVIEWER_HEADER, reviewer);
    }
    request
        .body(Body::from(serde_json::to_vec(&body).expect("encode body")))
        .expect("request")
}

fn controlled_payload(id: &str) -> Value {
    json!({
        "id": id,
        "is_good_controlled": true,
        "control_list_entries": ["ML1"],
        "report_summary_prefix": 1,
        "report_summary_subject": 1,
        "comment": "some comment",
    })
}

#[tokio::test]
async fn assess_route_returns_empty_ok() {
    let (service, catalog) = build_service();
    let router = assessment_router_with_service(service);

    let response = router
        .oneshot(put_assessments(
            "case-1",
            Some("caseworker-1"),
            json!([controlled_payload("line-1")]),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .expect("read body");
    assert!(body.is_empty());
    assert_eq!(
        stored_line(&catalog, "line-1").report_summary().as_deref(),
        Some("training for arts and crafts")
    );
}

#[tokio::test]
async fn missing_reviewer_header_is_forbidden() {
    let (service, catalog) = build_service();
    let router = assessment_router_with_service(service);

    let response = router
        .oneshot(put_assessments(
            "case-1",
            None,
            json!([controlled_payload("line-1")]),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(stored_line(&catalog, "line-1").assessed_by.is_none());
}

#[tokio::test]
async fn reviewer_without_permission_is_forbidden() {
    let (service, _) = build_service();
    let router = assessment_router_with_service(service);

    let response = router
        .oneshot(put_assessments(
            "case-1",
            Some("exporter-1"),
            json!([controlled_payload("line-1")]),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_ids_return_case_level_error() {
    let (service, _) = build_service();
    let router = assessment_router_with_service(service);

    let response = router
        .oneshot(put_assessments(
            "case-1",
            Some("caseworker-1"),
            json!([controlled_payload("line-1"), controlled_payload("line-1")]),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(
        body,
        json!({
            "errors": [
                "Multiple updates to a single GoodOnApplication id found. Duplicated ids; line-1"
            ]
        })
    );
}

#[tokio::test]
async fn invalid_lines_return_aligned_field_errors() {
    let (service, _) = build_service();
    let router = assessment_router_with_service(service);

    let response = router
        .oneshot(put_assessments(
            "case-1",
            Some("caseworker-1"),
            json!([
                controlled_payload("line-1"),
                {
                    "id": "line-2",
                    "is_good_controlled": true,
                    "control_list_entries": ["ML1"],
                }
            ]),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(
        body,
        json!({
            "errors": [
                {},
                { "report_summary_subject": [REQUIRED_REPORT_SUMMARY] }
            ]
        })
    );
}

#[tokio::test]
async fn terminal_case_returns_bad_request() {
    let (service, catalog) = build_service();
    catalog
        .set_case_status(&case_id(), crate::workflows::assessment::CaseStatus::Withdrawn)
        .expect("status updated");
    let router = assessment_router_with_service(service);

    let response = router
        .oneshot(put_assessments(
            "case-1",
            Some("caseworker-1"),
            json!([controlled_payload("line-1")]),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn unknown_case_returns_not_found() {
    let (service, _) = build_service();
    let router = assessment_router_with_service(service);

    let response = router
        .oneshot(put_assessments("case-404", Some("caseworker-1"), json!([])))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assess_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(AssessmentService::new(
        Arc::new(UnavailableCatalog),
        Arc::new(UnavailableCatalog),
        Arc::new(UnavailableCatalog),
    ));
    let mut headers = HeaderMap::new();
    headers.insert(REVIEWER_HEADER, HeaderValue::from_static("caseworker-1"));

    let response = crate::workflows::assessment::router::assess_handler::<
        UnavailableCatalog,
        UnavailableCatalog,
        UnavailableCatalog,
    >(
        State(service),
        Path("case-1".to_string()),
        headers,
        axum::Json(vec![controlled_line("line-1")]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn precedents_route_groups_by_line() {
    let (service, _) = build_service();
    let router = assessment_router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/cases/case-1/good-precedents")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let groups = body.as_array().expect("array body");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[1]["line_item_id"], "line-2");
    assert_eq!(groups[1]["precedents"][0]["id"], "line-4");
}
