//! Tests for the inspection HTTP API

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cadence::calendar::StaticCalendar;
use cadence::config::{SchedulingConfig, ServerConfig};
use cadence::scheduler::CascadeEngine;
use cadence::server::InspectionServer;
use common::{ctx, fill_days};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn router_over(calendar: StaticCalendar) -> Router {
    let engine = CascadeEngine::new(Arc::new(calendar), &SchedulingConfig::default()).unwrap();
    InspectionServer::new(ServerConfig::default(), Arc::new(engine)).build_router()
}

async fn send(router: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_reports_calendar() {
    let router = router_over(StaticCalendar::new(vec![], ctx()));
    let (status, json) = send(router, "GET", "/api/health", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "healthy");
    assert_eq!(json["data"]["calendar"], "static");
    assert_eq!(json["data"]["timezone"], "America/New_York");
}

#[tokio::test]
async fn test_health_degraded_when_offline() {
    let router = router_over(StaticCalendar::new(vec![], ctx()).offline());
    let (status, json) = send(router, "GET", "/api/health", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "degraded");
    assert_eq!(json["data"]["calendar_reachable"], false);
}

#[tokio::test]
async fn test_next_action_on_empty_calendar() {
    let router = router_over(StaticCalendar::new(vec![], ctx()));
    let (status, json) = send(router, "GET", "/api/cascade/next", "").await;

    assert_eq!(status, StatusCode::OK);
    let report = &json["data"];
    assert_eq!(report["success"], true);
    assert_eq!(report["fallback_used"], false);
    assert_eq!(report["decision"]["day"], 0);
    assert_eq!(report["decision"]["new_level"], 1);
    let local = report["decision"]["optimal_time_local"].as_str().unwrap();
    assert!(local.ends_with("09:00"), "unexpected slot {local}");
}

#[tokio::test]
async fn test_next_action_falls_back_when_offline() {
    let router = router_over(StaticCalendar::new(vec![], ctx()).offline());
    let (status, json) = send(router, "GET", "/api/cascade/next", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["success"], false);
    assert_eq!(json["data"]["fallback_used"], true);
    assert_eq!(json["data"]["decision"]["conflict_analysis"]["used_fallback"], true);
}

#[tokio::test]
async fn test_pattern_lists_display_days() {
    let router = router_over(StaticCalendar::new(fill_days(0..3, 1), ctx()));
    let (status, json) = send(router, "GET", "/api/cascade/pattern", "").await;

    assert_eq!(status, StatusCode::OK);
    let pattern = &json["data"];
    assert_eq!(pattern["window_days"], 7);
    assert_eq!(pattern["days"].as_array().map(Vec::len), Some(28));
    assert_eq!(pattern["days"][0]["in_cascade_window"], true);
    assert_eq!(pattern["days"][7]["in_cascade_window"], false);
}

#[tokio::test]
async fn test_plan_staggers_requested_platforms() {
    let router = router_over(StaticCalendar::new(vec![], ctx()));
    let (status, json) = send(
        router,
        "POST",
        "/api/cascade/plan",
        r#"{"platforms": ["linkedin", "x"]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = json["data"]["plan"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["platform"], "linkedin");
    assert_eq!(entries[0]["offset_minutes"], 0);
    assert_eq!(entries[1]["platform"], "twitter");
    assert_eq!(entries[1]["offset_minutes"], 10);
}

#[tokio::test]
async fn test_plan_defaults_to_configured_platforms() {
    let router = router_over(StaticCalendar::new(vec![], ctx()));
    let (status, json) = send(router, "POST", "/api/cascade/plan", "{}").await;

    assert_eq!(status, StatusCode::OK);
    let entries = json["data"]["plan"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2]["offset_minutes"], 20);
}

#[tokio::test]
async fn test_plan_rejects_unknown_platform() {
    let router = router_over(StaticCalendar::new(vec![], ctx()));
    let (status, json) = send(
        router,
        "POST",
        "/api/cascade/plan",
        r#"{"platforms": ["myspace"]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("myspace"));
}
