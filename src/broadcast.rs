//! Long-lived worker tasks that drain the two queues.
//!
//! Exactly one broadcast worker per chat room: draining a single queue
//! from a single task is what gives broadcasts their total order. The
//! command worker is equally singular so each command's registry reads
//! and its resulting broadcast enqueue stay in submission order.

use crate::command::{self, Command};
use crate::state::AppState;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Spawn the task that fans each queued payload out to every registered
/// connection. The worker ends when every producer handle is dropped.
pub fn spawn_broadcast_worker(state: Arc<AppState>, mut rx: mpsc::UnboundedReceiver<String>) {
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            let delivered = state.registry.fan_out(&payload);
            tracing::debug!("broadcast delivered to {} connections", delivered);
        }
        tracing::debug!("broadcast worker shutting down");
    });
}

/// Spawn the task that interprets queued commands against the registry.
pub fn spawn_command_worker(state: Arc<AppState>, mut rx: mpsc::UnboundedReceiver<Command>) {
    tokio::spawn(async move {
        while let Some(cmd) = rx.recv().await {
            command::dispatch(&state, cmd);
        }
        tracing::debug!("command worker shutting down");
    });
}
