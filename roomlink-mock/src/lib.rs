use std::error::Error;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use roomlink_api::AUTH_HEADER;
use roomlink_api::device::{LightStateBody, PIR_DETECTED, PIR_NOT_DETECTED, SensorPayload, SetFanBody, routes};
use serde_json::json;
use tokio::net::TcpListener;

use crate::settings::Settings;
use crate::simulate::{ANALOG_MAX, drift_potentiometer, simulated_ldr, simulated_presence};

pub mod settings;
mod simulate;

/// Below this LDR level the light switches on while the LDR mode is active.
const LDR_DARK_THRESHOLD: i64 = 300;

/// Actuator state of the simulated room controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub fan_pwm: u8,
    pub light_on: bool,
    /// Light follows the LDR instead of the last toggle
    pub ldr_mode: bool,
    pub pin6: bool,
    pub potentiometer: i64,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            fan_pwm: 0,
            light_on: false,
            ldr_mode: false,
            pin6: false,
            potentiometer: ANALOG_MAX / 2,
        }
    }
}

#[derive(Clone)]
pub struct MockState {
    pub token: Arc<str>,
    pub presence_probability: f64,
    pub device: Arc<Mutex<DeviceState>>,
}

impl MockState {
    pub fn new(token: &str, presence_probability: f64) -> Self {
        Self {
            token: Arc::from(token),
            presence_probability,
            device: Arc::new(Mutex::new(DeviceState::default())),
        }
    }

    pub fn snapshot(&self) -> DeviceState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        // A poisoned lock still holds a usable state.
        self.device.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn create_router(state: MockState) -> Router {
    let commands = Router::new()
        .route(routes::SET_FAN, post(set_fan))
        .route(routes::TOGGLE_LIGHT, post(toggle_light))
        .route(routes::TOGGLE_LDR, post(toggle_ldr))
        .route(routes::TURN_ON_PIN6, post(turn_on_pin6))
        .route(routes::TURN_OFF_PIN6, post(turn_off_pin6))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route(routes::SENSORS, get(read_sensors))
        .merge(commands)
        .with_state(state)
}

pub async fn run(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let state = MockState::new(&settings.mock.token, settings.mock.presence_probability);

    let ip_addr = settings.mock.host.parse::<IpAddr>()?;
    let address = SocketAddr::from((ip_addr, settings.mock.port));
    let listener = TcpListener::bind(&address).await?;

    tracing::info!("mock room controller listening on {:?}", address);

    axum::serve(listener, create_router(state)).await?;

    Ok(())
}

async fn require_token(State(state): State<MockState>, req: Request<Body>, next: Next) -> Response {
    let authorized = req
        .headers()
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|token| token == &*state.token);

    if !authorized {
        tracing::warn!("rejected {} without a valid token", req.uri().path());
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response();
    }

    next.run(req).await
}

fn day_fraction() -> f64 {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() % 86400)
        .unwrap_or_default();

    seconds as f64 / 86400.0
}

async fn read_sensors(State(state): State<MockState>) -> Json<SensorPayload> {
    let mut rng = rand::rng();
    let ldr = simulated_ldr(day_fraction(), &mut rng);
    let presence = simulated_presence(state.presence_probability, &mut rng);

    let mut device = state.lock();
    device.potentiometer = drift_potentiometer(device.potentiometer, &mut rng);
    if device.ldr_mode {
        device.light_on = ldr < LDR_DARK_THRESHOLD;
    }

    let payload = SensorPayload {
        ldr: Some(ldr),
        pir: Some(String::from(if presence { PIR_DETECTED } else { PIR_NOT_DETECTED })),
        pot: Some(device.potentiometer),
        fan_pwm: Some(i64::from(device.fan_pwm)),
        // Active low, as wired on the real board
        light_state: Some(if device.light_on { 0 } else { 1 }),
    };

    tracing::debug!("sensors: {:?}", payload);

    Json(payload)
}

fn ok() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn set_fan(State(state): State<MockState>, Json(body): Json<SetFanBody>) -> Json<serde_json::Value> {
    state.lock().fan_pwm = body.fan_speed;
    tracing::info!("fan set to {}", body.fan_speed);

    ok()
}

async fn toggle_light(State(state): State<MockState>, Json(body): Json<LightStateBody>) -> Json<serde_json::Value> {
    let mut device = state.lock();
    device.light_on = body.state;
    device.ldr_mode = false;
    tracing::info!("light switched {}", if body.state { "on" } else { "off" });

    ok()
}

async fn toggle_ldr(State(state): State<MockState>) -> Json<serde_json::Value> {
    let mut device = state.lock();
    device.ldr_mode = !device.ldr_mode;
    tracing::info!("ldr mode {}", if device.ldr_mode { "enabled" } else { "disabled" });

    ok()
}

async fn turn_on_pin6(State(state): State<MockState>) -> Json<serde_json::Value> {
    state.lock().pin6 = true;
    tracing::info!("pin 6 on");

    ok()
}

async fn turn_off_pin6(State(state): State<MockState>) -> Json<serde_json::Value> {
    state.lock().pin6 = false;
    tracing::info!("pin 6 off");

    ok()
}
