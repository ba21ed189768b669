use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::features::appointments::workers::ReminderSweep;
use crate::modules::realtime::hub::RealtimeHub;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
}

#[derive(Clone)]
pub struct WsState {
    pub hub: Arc<RealtimeHub>,
    pub reminders: Arc<ReminderSweep>,
}

pub fn routes(hub: Arc<RealtimeHub>, reminders: Arc<ReminderSweep>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(WsState { hub, reminders })
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<WsState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, query.user_id, state))
}

async fn handle_socket(socket: WebSocket, user_id: Option<i64>, state: WsState) {
    let mut rx = state.hub.subscribe();
    tracing::info!(?user_id, "realtime client connected");

    if let Some(id) = user_id {
        state.hub.register_user(id);
        // Catch the client up on reminders it may have missed while offline
        state.reminders.sweep_user(id).await;
    }

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            envelope = rx.recv() => match envelope {
                Ok(envelope) if envelope.is_for(user_id) => {
                    if sink
                        .send(Message::Text(envelope.message.to_string().into()))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(?user_id, skipped, "realtime client lagged behind");
                }
                Err(RecvError::Closed) => break,
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Clients only listen; inbound frames are ignored
                Some(Ok(_)) => {}
            },
        }
    }

    if let Some(id) = user_id {
        state.hub.unregister_user(id);
    }
    tracing::info!(?user_id, "realtime client disconnected");
}
