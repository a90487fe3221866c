use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::infra::app_state::AppState;

/// Handle WebSocket upgrade request
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serve one observer: initial snapshots first, then live traffic until the
/// client goes away. Anything the client sends is ignored.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let queue = state.config().relay.observer_queue;
    let (connection, mut rx) = match state.relay.attach_observer(queue).await {
        Ok(attached) => attached,
        Err(err) => {
            warn!(error = %err, "initial snapshots unavailable; closing observer");
            let _ = ws_sender.send(Message::Close(None)).await;
            return;
        }
    };
    let conn_id = connection.id;

    // Spawn task to handle outgoing messages
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Err(err) => {
                debug!(connection = %conn_id, error = %err, "observer socket error");
                break;
            }
            _ => {}
        }
    }

    state.websocket_manager.remove_connection(conn_id);
    writer.abort();
    debug!(connection = %conn_id, "observer disconnected");
}
