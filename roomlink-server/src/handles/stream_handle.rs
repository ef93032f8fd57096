use std::convert::Infallible;
use std::sync::Arc;

use axum::Router;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::sse::{Event, KeepAlive};
use axum::response::{IntoResponse, Sse};
use axum::routing::get;
use futures::{SinkExt, StreamExt, future};
use roomlink_api::models::{SENSOR_UPDATE, StreamEvent};
use tokio_stream::Stream;

use crate::services::Fanout;

#[derive(Clone)]
pub struct StreamState {
    pub fanout: Arc<Fanout>,
}

pub fn stream_router(stream_state: StreamState) -> Router {
    Router::new()
        .route("/events", get(sse_handler))
        .route("/ws", get(ws_handler))
        .with_state(stream_state)
}

/// Pushes every published reading as a `sensor_update` event. The
/// subscription is released when the client goes away.
#[utoipa::path(
    get,
    path = "/events",
    tag = "stream",
    responses(
        (status = 200, description = "Server-sent `sensor_update` events", content_type = "text/event-stream")
    )
)]
pub async fn sse_handler(
    State(state): State<StreamState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.fanout.subscribe().await;
    tracing::debug!("sse client subscribed as {}", subscription.id());

    let stream = subscription.filter_map(|reading| {
        let event = match Event::default().event(SENSOR_UPDATE).json_data(&reading) {
            Ok(event) => Some(Ok::<_, Infallible>(event)),
            Err(e) => {
                tracing::warn!("failed to encode sse event: {}", e);
                None
            }
        };
        future::ready(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[utoipa::path(
    get,
    path = "/ws",
    tag = "stream",
    responses(
        (status = 101, description = "WebSocket upgrade, frames carry `StreamEvent` JSON")
    )
)]
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<StreamState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

async fn handle_websocket(socket: WebSocket, state: StreamState) {
    let mut subscription = state.fanout.subscribe().await;
    let subscription_id = subscription.id();
    let (mut sender, mut receiver) = socket.split();

    tracing::info!("websocket client {} connected", subscription_id);

    let send_task = tokio::spawn(async move {
        while let Some(reading) = subscription.recv().await {
            let frame = match serde_json::to_string(&StreamEvent::SensorUpdate(reading)) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!("failed to encode websocket frame: {}", e);
                    continue;
                }
            };

            if sender.send(WsMessage::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    // Inbound frames are ignored; the loop only watches for the close.
    while let Some(result) = receiver.next().await {
        match result {
            Ok(WsMessage::Close(_)) => break,
            Err(e) => {
                tracing::warn!("websocket error for client {}: {}", subscription_id, e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    state.fanout.unsubscribe(subscription_id).await;

    tracing::info!("websocket client {} disconnected", subscription_id);
}
