use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

mod common;
use common::mock_app::{MockApp, REQUEST_TIMEOUT_MS, TOKEN, json_body};

async fn expect_command(app: &MockApp, route: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(route))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200))
        .expect(times)
        .mount(&app.device)
        .await;
}

#[tokio::test]
async fn test_set_fan_is_relayed() {
    let app = MockApp::new().await;
    Mock::given(method("POST"))
        .and(path("/set_fan"))
        .and(header("X-Auth-Token", TOKEN))
        .and(body_json(json!({ "fan_speed": 128 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.device)
        .await;

    let response = app.post("/set_fan", None, r#"{"fan_speed":128}"#).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body, json!({ "status": "success", "command": "set_fan" }));
}

#[tokio::test]
async fn test_set_fan_coerces_numeric_strings() {
    let app = MockApp::new().await;
    Mock::given(method("POST"))
        .and(path("/set_fan"))
        .and(body_json(json!({ "fan_speed": 128 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.device)
        .await;

    for body in [r#"{"fan_speed":"128"}"#, r#"{"fan_speed":128.9}"#] {
        let response = app.post("/set_fan", None, body).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.post("/set_fan", None, r#"{"fan_speed":"fast"}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_light_coerces_truthy_values() {
    let app = MockApp::new().await;
    Mock::given(method("POST"))
        .and(path("/toggle_light"))
        .and(body_json(json!({ "state": true })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.device)
        .await;

    let response = app.post("/toggle_light", None, r#"{"state":1}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_set_fan_out_of_range_never_reaches_device() {
    let app = MockApp::new().await;
    expect_command(&app, "/set_fan", 0).await;

    for body in [r#"{"fan_speed":300}"#, r#"{"fan_speed":-1}"#, r#"{"fan_speed":256}"#] {
        let response = app.post("/set_fan", None, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_malformed_json_is_invalid_argument() {
    let app = MockApp::new().await;
    expect_command(&app, "/set_fan", 0).await;

    let response = app.post("/set_fan", None, "{fan_speed:").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], json!(400));
}

#[tokio::test]
async fn test_toggle_light_forwards_state() {
    let app = MockApp::new().await;
    Mock::given(method("POST"))
        .and(path("/toggle_light"))
        .and(body_json(json!({ "state": false })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.device)
        .await;

    let response = app.post("/toggle_light", None, r#"{"state":false}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bodyless_commands() {
    let app = MockApp::new().await;
    expect_command(&app, "/toggle_ldr", 1).await;
    expect_command(&app, "/turn_on_pin6", 1).await;
    expect_command(&app, "/turn_off_pin6", 1).await;

    for route in ["/toggle_ldr", "/turn_on_pin6", "/turn_off_pin6"] {
        let response = app.post(route, None, "").await;
        assert_eq!(response.status(), StatusCode::OK, "{route}");

        let body = json_body(response).await;
        assert_eq!(body["command"], json!(route.trim_start_matches('/')));
    }
}

#[tokio::test]
async fn test_control_fan_requires_token() {
    let app = MockApp::new().await;
    Mock::given(method("POST"))
        .and(path("/set_fan"))
        .and(body_json(json!({ "fan_speed": 200 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.device)
        .await;

    let response = app.post("/control/fan", None, r#"{"speed":200}"#).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.post("/control/fan", Some("wrong"), r#"{"speed":200}"#).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.post("/control/fan", Some(TOKEN), r#"{"speed":200}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_control_checks_token_before_body() {
    let app = MockApp::new().await;
    expect_command(&app, "/set_fan", 0).await;

    let response = app.post("/control/fan", Some("wrong"), r#"{"speed":999}"#).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.post("/control/fan", None, "not json").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.post("/control/fan", Some(TOKEN), r#"{"speed":999}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_control_light_maps_on() {
    let app = MockApp::new().await;
    Mock::given(method("POST"))
        .and(path("/toggle_light"))
        .and(body_json(json!({ "state": true })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.device)
        .await;
    Mock::given(method("POST"))
        .and(path("/toggle_light"))
        .and(body_json(json!({ "state": false })))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.device)
        .await;

    for (body, status) in [
        (r#"{"state":"on"}"#, StatusCode::OK),
        (r#"{"state":"off"}"#, StatusCode::OK),
        (r#"{"state":1}"#, StatusCode::OK),
    ] {
        let response = app.post("/control/light", Some(TOKEN), body).await;
        assert_eq!(response.status(), status, "{body}");
    }

    let response = app.post("/control/light", None, r#"{"state":"on"}"#).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticate() {
    let app = MockApp::new().await;

    let response = app
        .post("/authenticate", None, &json!({ "token": TOKEN }).to_string())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    for body in [json!({ "token": "7654321" }), json!({})] {
        let response = app.post("/authenticate", None, &body.to_string()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_device_failures_are_reported() {
    let app = MockApp::new().await;
    Mock::given(method("POST"))
        .and(path("/toggle_ldr"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.device)
        .await;
    Mock::given(method("POST"))
        .and(path("/turn_on_pin6"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(Duration::from_millis(REQUEST_TIMEOUT_MS * 5)),
        )
        .expect(1)
        .mount(&app.device)
        .await;

    let response = app.post("/toggle_ldr", None, "").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let response = app.post("/turn_on_pin6", None, "").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
