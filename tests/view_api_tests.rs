// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View state API tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use station_map::models::Srid;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_health() {
    let (app, _state) = common::create_test_app();
    let (status, body) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_default_view() {
    let (app, _state) = common::create_test_app();
    let (status, body) = common::get_json(app, "/api/view").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["srid"], "3035");
    assert_eq!(body["state"]["fitView"], true);
    assert_eq!(body["state"]["baseMap"], "physical");
    assert!(body["state"]["visibleToggles"].is_null());
    assert_eq!(body["query"], "");
    assert_eq!(body["srid_name"], "LAEA Europe");
    assert_eq!(body["country_selector"], true);
    assert_eq!(
        body["toggles"],
        serde_json::json!(["os", "es", "as", "overlap", "ship", "bdr"])
    );
}

#[tokio::test]
async fn test_shared_url_round_trip() {
    let (app, _state) = common::create_test_app();
    let query = "srid=3857&center=468810,5860997&zoom=5.81&baseMap=ocean&visibleToggles=bdr,as&countryFilter=FR";
    let (status, body) = common::get_json(app, &format!("/api/view?{}", query)).await;

    assert_eq!(status, StatusCode::OK);
    let state = &body["state"];
    assert_eq!(state["srid"], "3857");
    assert_eq!(state["center"], serde_json::json!([468810.0, 5860997.0]));
    assert_eq!(state["zoom"], 5.81);
    assert_eq!(state["fitView"], false);
    assert_eq!(state["visibleToggles"], serde_json::json!(["bdr", "as"]));
    assert_eq!(state["countryFilter"], serde_json::json!(["FR"]));
    assert_eq!(body["query"], format!("?{}", query));
}

#[tokio::test]
async fn test_legacy_parameter_names() {
    let (app, _state) = common::create_test_app();
    let (status, body) = common::get_json(app, "/api/view?show=os&countries=SE").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["visibleToggles"], serde_json::json!(["os"]));
    assert_eq!(body["state"]["countryFilter"], serde_json::json!(["SE"]));
    assert_eq!(body["query"], "?visibleToggles=os&countryFilter=SE");
}

#[tokio::test]
async fn test_unknown_country_drops_filter() {
    let (app, _state) = common::create_test_app();
    let (status, body) = common::get_json(app, "/api/view?countryFilter=SE,ZZ").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["state"]["countryFilter"].is_null());
}

#[tokio::test]
async fn test_swedish_grid_settings() {
    let (app, _state) = common::create_test_app();
    let (status, body) = common::get_json(app, "/api/view?srid=3006").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["baseMap"], "lmTopoGray");
    assert_eq!(body["default_base_map"], "lmTopoGray");
    assert_eq!(body["country_selector"], false);
    let base_maps = body["base_maps"].as_array().unwrap();
    assert!(base_maps.iter().any(|bm| bm["id"] == "lmTopo"));
}

#[tokio::test]
async fn test_illegal_srid_lists_supported() {
    let (app, _state) = common::create_test_app();
    let (status, body) = common::get_json(app, "/api/view?srid=9999").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "illegal_srid");
    let supported = body["details"]["supported"].as_array().unwrap();
    assert_eq!(supported.len(), Srid::ALL.len());
    assert!(supported
        .iter()
        .any(|s| s["srid"] == "54030" && s["name"] == "World Robinson"));
    let examples = body["details"]["examples"].as_array().unwrap();
    assert!(examples.contains(&serde_json::json!("https://map.example/?srid=3857")));
}

#[tokio::test]
async fn test_illegal_srid_needs_no_lookup() {
    // Nothing is cached and every lookup fetch would fail with 502.
    let (app, _state) = common::create_test_app_without_lookups();
    let (status, body) = common::get_json(app, "/api/view?srid=1234").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "illegal_srid");
}

#[tokio::test]
async fn test_view_decodes_without_country_lookup() {
    let (app, _state) = common::create_test_app_without_lookups();
    let (status, body) =
        common::get_json(app, "/api/view?srid=3857&baseMap=ocean&countryFilter=FR").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["srid"], "3857");
    assert_eq!(body["state"]["baseMap"], "ocean");
    // No lookup to validate against, so the filter is dropped
    assert!(body["state"]["countryFilter"].is_null());
    assert_eq!(body["query"], "?srid=3857&baseMap=ocean");
}

#[tokio::test]
async fn test_help_text() {
    let (app, _state) = common::create_test_app();
    let response = app
        .oneshot(Request::builder().uri("/help").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("defaults to 3035 - LAEA Europe"));
    assert!(text.contains("https://map.example/?srid=54030"));
}
