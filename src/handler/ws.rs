use crate::app::AppState;
use crate::event::EventReceiver;
use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use tracing::{error, info};

// The realtime channel: every connected client receives each inbound call
// notification published on the broadcast feed.
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let event_rx = state.events.subscribe();
    ws.on_upgrade(move |socket| handle_feed(socket, event_rx))
}

async fn handle_feed(mut socket: WebSocket, mut event_rx: EventReceiver) {
    let connected_msg = json!({
        "type": "connected",
        "timestamp": chrono::Utc::now().timestamp(),
    });

    if let Err(e) = socket
        .send(Message::Text(connected_msg.to_string().into()))
        .await
    {
        error!("failed to send initial connection message: {}", e);
        return;
    }

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        error!(skipped, "notification feed lagged");
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                let msg = json!({
                    "type": "inbound_call_notification",
                    "timestamp": chrono::Utc::now().timestamp(),
                    "data": event,
                });
                if let Err(e) = socket.send(Message::Text(msg.to_string().into())).await {
                    error!("failed to send notification: {}", e);
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        info!("notification client disconnected");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("websocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }
}
