mod registry;

pub use registry::{ConnId, DeliveryError, Outbound, Registry};

use crate::command::Command;
use tokio::sync::mpsc;

/// Shared application state: the registry plus the producer ends of the
/// two serialized queues. The receiver ends belong to the broadcast and
/// command workers (see `crate::broadcast`), so one chat room is one
/// `AppState` plus its two workers; nothing here is process-global.
pub struct AppState {
    pub registry: Registry,
    broadcast_tx: mpsc::UnboundedSender<String>,
    command_tx: mpsc::UnboundedSender<Command>,
}

impl AppState {
    pub fn new(
        broadcast_tx: mpsc::UnboundedSender<String>,
        command_tx: mpsc::UnboundedSender<Command>,
    ) -> Self {
        Self {
            registry: Registry::new(),
            broadcast_tx,
            command_tx,
        }
    }

    /// Queue a payload for delivery to every connection registered at
    /// the moment the broadcast worker dequeues it.
    pub fn queue_broadcast(&self, payload: String) {
        if self.broadcast_tx.send(payload).is_err() {
            tracing::error!("broadcast worker is gone, dropping payload");
        }
    }

    pub fn queue_command(&self, command: Command) {
        if self.command_tx.send(command).is_err() {
            tracing::error!("command worker is gone, dropping command");
        }
    }
}
