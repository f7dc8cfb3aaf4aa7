//! WebSocket upgrade and per-connection lifecycle.
//!
//! One handler task runs for each accepted connection, from the join
//! handshake to the departure announcement. The write half of the
//! socket is owned by a companion writer task fed through the
//! connection's registered outbound channel, so the broadcast worker
//! and the command dispatcher never touch the socket directly.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;

use crate::command::{self, Command};
use crate::protocol;
use crate::sanitize::strip_ansi;
use crate::state::{AppState, ConnId, Outbound};

/// WebSocket upgrade handler for `GET /ws`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Register a connection and announce it. Returns the post-registration
/// online count.
pub fn join(state: &AppState, id: ConnId, name: &str, outbound: Outbound) -> usize {
    let online = state.registry.register(id, name, outbound);
    state.queue_broadcast(protocol::join_announcement(name, online));
    online
}

/// Unregister a connection and announce its departure. Returns the
/// post-removal online count.
pub fn depart(state: &AppState, id: ConnId, name: &str) -> usize {
    let online = state.registry.unregister(id);
    state.queue_broadcast(protocol::leave_announcement(name, online));
    online
}

/// Route one inbound frame: sanitize it, then queue either a command or
/// a broadcast of the sanitized line.
pub fn route_frame(state: &AppState, sender: ConnId, raw: &str) {
    let line = strip_ansi(raw);
    match command::parse(&line) {
        Some((name, args)) => state.queue_command(Command {
            sender,
            name: name.to_string(),
            args: args.to_string(),
        }),
        None => state.queue_broadcast(line.into_owned()),
    }
}

/// Drive one connection from handshake to departure.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = tokio::sync::mpsc::unbounded_channel::<Message>();

    // Sole owner of the write half. Ends when the registry entry and
    // the handler's own clone of the channel are both gone, or when a
    // write fails (which the next fan-out pass turns into removal).
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    // The first frame is the display name, taken as an opaque string.
    // A connection that closes first is dropped without registering.
    let name = match stream.next().await {
        Some(Ok(Message::Text(text))) => text.to_string(),
        _ => {
            tracing::warn!("connection closed before sending a display name");
            writer.abort();
            return;
        }
    };

    let id = ConnId::new();
    let online = join(&state, id, &name, outbound_tx.clone());
    tracing::info!("{} has joined the chat ({} online)", name, online);

    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => route_frame(&state, id, &text),
            Some(Ok(Message::Ping(data))) => {
                if outbound_tx.send(Message::Pong(data)).is_err() {
                    break;
                }
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                tracing::warn!("read error from {}: {}", name, e);
                break;
            }
        }
    }

    let online = depart(&state, id, &name);
    tracing::info!("{} disconnected ({} online)", name, online);
}
