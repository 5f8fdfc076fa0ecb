use axum::{
    extract::ws::{WebSocket, WebSocketUpgrade, Message},
    response::Response,
    extract::State,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use crate::api::AppState;
use crate::broadcast::{ChannelConnection, ClientMessage, PushConnection, ServerMessage};

const OUTBOUND_QUEUE: usize = 32;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (connection, mut outbound) = ChannelConnection::channel(OUTBOUND_QUEUE);
    let connection = Arc::new(connection);
    let connection_id = connection.id();

    // Register and replay under the cycle lock so no publish can overtake the replay
    let broadcast = Arc::clone(&state.broadcast);
    let joining = connection.clone();
    state.monitor
        .with_current(|current| async move { broadcast.connect(joining, &current).await })
        .await;

    // Drain queued pushes to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Handle control messages from the client
    let recv_state = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match ClientMessage::parse(&text) {
                    Some(ClientMessage::Subscribe) => {
                        if let Ok(reply) = ServerMessage::subscribed().to_json() {
                            if let Err(e) = connection.send_text(&reply).await {
                                tracing::warn!(connection = %connection_id, "Subscribe ack failed: {}", e);
                            }
                        }
                    }
                    Some(ClientMessage::ForceUpdate) => {
                        let outcome = recv_state.monitor.force_update().await;
                        tracing::info!(connection = %connection_id, ?outcome, "Forced update requested");
                    }
                    None => tracing::debug!("Ignoring unrecognised client message"),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    state.broadcast.remove_connection(connection_id);
}
