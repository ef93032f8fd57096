use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, HeaderValue};
use axum::routing::post;
use axum::{Json, Router};
use axum_extra::TypedHeader;
use axum_extra::headers::{self, Header};
use roomlink_api::models::*;

use crate::errors::{ApiError, CommandError};
use crate::services::{CommandRelay, LIGHT_ON};

static X_AUTH_TOKEN: HeaderName = HeaderName::from_static("x-auth-token");

/// Shared secret presented by a dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XAuthToken(pub String);

impl Header for XAuthToken {
    fn name() -> &'static HeaderName {
        &X_AUTH_TOKEN
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let token = value.to_str().map_err(|_| headers::Error::invalid())?;

        Ok(XAuthToken(token.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

#[derive(Clone)]
pub struct ControlState {
    pub command_relay: Arc<CommandRelay>,
}

pub fn control_router(control_state: ControlState) -> Router {
    Router::new()
        .route("/set_fan", post(set_fan))
        .route("/toggle_light", post(toggle_light))
        .route("/toggle_ldr", post(toggle_ldr))
        .route("/turn_on_pin6", post(turn_on_pin6))
        .route("/turn_off_pin6", post(turn_off_pin6))
        .route("/control/fan", post(control_fan))
        .route("/control/light", post(control_light))
        .route("/authenticate", post(authenticate))
        .with_state(control_state)
}

fn token_of(header: &Option<TypedHeader<XAuthToken>>) -> Option<&str> {
    header.as_ref().map(|TypedHeader(XAuthToken(token))| token.as_str())
}

fn body_of<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, CommandError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| CommandError::InvalidArgument(rejection.body_text()))
}

#[utoipa::path(
    post,
    path = "/set_fan",
    tag = "control",
    request_body = SetFanRequest,
    responses(
        (status = 200, description = "Fan speed relayed", body = CommandResponse),
        (status = 400, description = "Speed outside 0-255 or malformed body"),
        (status = 502, description = "Device rejected the request"),
        (status = 503, description = "Device unreachable")
    )
)]
pub async fn set_fan(
    State(state): State<ControlState>,
    body: Result<Json<SetFanRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let body = body_of(body)?;

    state.command_relay.set_fan(body.fan_speed).await?;

    Ok(Json(CommandResponse::success("set_fan")))
}

#[utoipa::path(
    post,
    path = "/toggle_light",
    tag = "control",
    request_body = ToggleLightRequest,
    responses(
        (status = 200, description = "Light state relayed", body = CommandResponse),
        (status = 400, description = "Malformed body"),
        (status = 502, description = "Device rejected the request"),
        (status = 503, description = "Device unreachable")
    )
)]
pub async fn toggle_light(
    State(state): State<ControlState>,
    body: Result<Json<ToggleLightRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let body = body_of(body)?;

    state.command_relay.toggle_light(body.state).await?;

    Ok(Json(CommandResponse::success("toggle_light")))
}

#[utoipa::path(
    post,
    path = "/toggle_ldr",
    tag = "control",
    responses(
        (status = 200, description = "LDR toggle relayed", body = CommandResponse),
        (status = 502, description = "Device rejected the request"),
        (status = 503, description = "Device unreachable")
    )
)]
pub async fn toggle_ldr(State(state): State<ControlState>) -> Result<Json<CommandResponse>, ApiError> {
    state.command_relay.toggle_ldr().await?;

    Ok(Json(CommandResponse::success("toggle_ldr")))
}

#[utoipa::path(
    post,
    path = "/turn_on_pin6",
    tag = "control",
    responses(
        (status = 200, description = "Pin 6 switched on", body = CommandResponse),
        (status = 502, description = "Device rejected the request"),
        (status = 503, description = "Device unreachable")
    )
)]
pub async fn turn_on_pin6(State(state): State<ControlState>) -> Result<Json<CommandResponse>, ApiError> {
    state.command_relay.set_pin6(true).await?;

    Ok(Json(CommandResponse::success("turn_on_pin6")))
}

#[utoipa::path(
    post,
    path = "/turn_off_pin6",
    tag = "control",
    responses(
        (status = 200, description = "Pin 6 switched off", body = CommandResponse),
        (status = 502, description = "Device rejected the request"),
        (status = 503, description = "Device unreachable")
    )
)]
pub async fn turn_off_pin6(State(state): State<ControlState>) -> Result<Json<CommandResponse>, ApiError> {
    state.command_relay.set_pin6(false).await?;

    Ok(Json(CommandResponse::success("turn_off_pin6")))
}

#[utoipa::path(
    post,
    path = "/control/fan",
    tag = "control",
    request_body = ControlFanRequest,
    params(
        ("X-Auth-Token" = String, Header, description = "Shared secret")
    ),
    responses(
        (status = 200, description = "Fan speed relayed", body = CommandResponse),
        (status = 400, description = "Speed outside 0-255 or malformed body"),
        (status = 401, description = "Missing or wrong token"),
        (status = 502, description = "Device rejected the request"),
        (status = 503, description = "Device unreachable")
    )
)]
pub async fn control_fan(
    State(state): State<ControlState>,
    token: Option<TypedHeader<XAuthToken>>,
    body: Result<Json<ControlFanRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    state.command_relay.authenticate(token_of(&token))?;
    let body = body_of(body)?;

    state.command_relay.set_fan(body.speed).await?;

    Ok(Json(CommandResponse::success("set_fan")))
}

#[utoipa::path(
    post,
    path = "/control/light",
    tag = "control",
    request_body = ControlLightRequest,
    params(
        ("X-Auth-Token" = String, Header, description = "Shared secret")
    ),
    responses(
        (status = 200, description = "Light state relayed", body = CommandResponse),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Missing or wrong token"),
        (status = 502, description = "Device rejected the request"),
        (status = 503, description = "Device unreachable")
    )
)]
pub async fn control_light(
    State(state): State<ControlState>,
    token: Option<TypedHeader<XAuthToken>>,
    body: Result<Json<ControlLightRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    state.command_relay.authenticate(token_of(&token))?;
    let body = body_of(body)?;

    state.command_relay.toggle_light(body.state_str() == LIGHT_ON).await?;

    Ok(Json(CommandResponse::success("toggle_light")))
}

#[utoipa::path(
    post,
    path = "/authenticate",
    tag = "control",
    request_body = AuthenticateRequest,
    responses(
        (status = 200, description = "Token accepted", body = MessageResponse),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Token rejected")
    )
)]
pub async fn authenticate(
    State(state): State<ControlState>,
    body: Result<Json<AuthenticateRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let body = body_of(body)?;

    state.command_relay.authenticate(body.token.as_deref())?;

    Ok(Json(MessageResponse {
        message: String::from("Token successfully added"),
    }))
}
