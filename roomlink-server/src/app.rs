use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use roomlink_api::models::*;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::configs::{Settings, Storage};
use crate::handles::*;
use crate::repositories::ReadingRepository;
use crate::services::{CommandRelay, Device, DeviceClient, Fanout, Poller, StateCache};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_current_reading,
        get_live_reading,
        get_reading_history,
        set_fan,
        toggle_light,
        toggle_ldr,
        turn_on_pin6,
        turn_off_pin6,
        control_fan,
        control_light,
        authenticate,
        sse_handler,
        ws_handler,
        get_health,
    ),
    components(schemas(
        Reading,
        StreamEvent,
        SetFanRequest,
        ToggleLightRequest,
        ControlFanRequest,
        ControlLightRequest,
        AuthenticateRequest,
        CommandResponse,
        MessageResponse,
        HealthResponse,
        PollerStatus,
        PollerState,
    )),
    tags(
        (name = "sensors", description = "Current, live and stored readings"),
        (name = "control", description = "Commands relayed to the room controller"),
        (name = "stream", description = "Push delivery of new readings"),
        (name = "health", description = "Gateway status")
    )
)]
pub struct ApiDoc;

/// Shared services of one gateway instance.
#[derive(Clone)]
pub struct AppContext {
    pub storage: Arc<Storage>,
    pub device: Arc<dyn Device>,
    pub cache: Arc<StateCache>,
    pub fanout: Arc<Fanout>,
    pub command_relay: Arc<CommandRelay>,
    pub reading_repository: Arc<ReadingRepository>,
    pub poller: Arc<Poller>,
}

impl AppContext {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::new(settings.database.clone()).await?);
        let device: Arc<dyn Device> = Arc::new(DeviceClient::new(&settings.device)?);

        Ok(Self::with_device(settings, storage, device))
    }

    /// Wires the services around an already constructed device and store.
    pub fn with_device(settings: &Settings, storage: Arc<Storage>, device: Arc<dyn Device>) -> Self {
        let cache = Arc::new(StateCache::new());
        let fanout = Arc::new(Fanout::new(settings.fanout.capacity));
        let reading_repository = Arc::new(ReadingRepository::new(storage.clone()));
        let command_relay = Arc::new(CommandRelay::new(device.clone(), settings.device.token.clone()));
        let poller = Arc::new(Poller::new(
            device.clone(),
            reading_repository.clone(),
            cache.clone(),
            fanout.clone(),
            settings.device.poll_interval(),
        ));

        Self {
            storage,
            device,
            cache,
            fanout,
            command_relay,
            reading_repository,
            poller,
        }
    }
}

pub fn create_router(context: &AppContext) -> Router {
    Router::new()
        .merge(reading_router(ReadingState {
            cache: context.cache.clone(),
            device: context.device.clone(),
            reading_repository: context.reading_repository.clone(),
        }))
        .merge(control_router(ControlState {
            command_relay: context.command_relay.clone(),
        }))
        .merge(stream_router(StreamState {
            fanout: context.fanout.clone(),
        }))
        .merge(health_router(HealthState {
            status: context.poller.status(),
            fanout: context.fanout.clone(),
            cache: context.cache.clone(),
        }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
