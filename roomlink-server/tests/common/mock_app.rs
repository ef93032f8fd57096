use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use roomlink_api::AUTH_HEADER;
use roomlink_api::models::Reading;
use roomlink_server::app::{AppContext, create_router};
use roomlink_server::configs::{Database, Device, Fanout, Logger, Server, Settings, Storage};
use roomlink_server::errors::DeviceError;
use roomlink_server::services::DeviceClient;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "1234567";
pub const REQUEST_TIMEOUT_MS: u64 = 200;

pub fn test_settings(base_url: &str) -> Settings {
    Settings {
        server: Server {
            host: String::from("127.0.0.1"),
            port: 0,
        },
        logger: Logger {
            level: String::from("debug"),
        },
        device: Device {
            base_url: base_url.to_string(),
            token: String::from(TOKEN),
            poll_interval_ms: 3000,
            request_timeout_ms: REQUEST_TIMEOUT_MS,
        },
        database: Database {
            clean_start: true,
            url: String::from("sqlite::memory:"),
        },
        fanout: Fanout { capacity: 8 },
    }
}

/// Gateway wired against a wiremock device and an in-memory database.
pub struct MockApp {
    pub device: MockServer,
    pub context: AppContext,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        let device = MockServer::start().await;
        let settings = test_settings(&device.uri());

        let storage = Arc::new(Storage::new(settings.database.clone()).await.unwrap());
        let client = Arc::new(DeviceClient::new(&settings.device).unwrap());
        let context = AppContext::with_device(&settings, storage, client);
        let router = create_router(&context);

        Self {
            device,
            context,
            router,
        }
    }

    pub async fn mount_sensors(&self, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/sensors"))
            .respond_with(response)
            .mount(&self.device)
            .await;
    }

    pub async fn mount_sensor_payload(&self, payload: Value) {
        self.mount_sensors(ResponseTemplate::new(200).set_body_json(payload))
            .await;
    }

    pub async fn poll(&self) -> Result<Reading, DeviceError> {
        self.context.poller.poll_once().await
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: &str) -> Response<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .method(Method::POST)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            builder = builder.header(AUTH_HEADER, token);
        }

        let request = builder.body(Body::from(body.to_string())).unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    serde_json::from_slice(&body).unwrap()
}
