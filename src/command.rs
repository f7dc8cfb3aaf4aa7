//! Command grammar and one-shot command dispatch.
//!
//! A command is a sanitized inbound line that starts with `/`. It is
//! parsed into a name and an argument string, queued, and later
//! interpreted against registry state by the command worker. Each
//! command either produces one broadcast or one direct reply to its
//! sender; there is no persistent state beyond the registry.

use crate::protocol;
use crate::state::{AppState, ConnId};

/// One inbound command, consumed exactly once by the command worker.
#[derive(Debug, Clone)]
pub struct Command {
    pub sender: ConnId,
    pub name: String,
    pub args: String,
}

/// Detect a command in a sanitized line.
///
/// Returns the command name and its argument string, split at the
/// first whitespace run; the argument string is empty when the line
/// has no whitespace. `None` means the line is an ordinary chat
/// message to be broadcast verbatim.
pub fn parse(line: &str) -> Option<(&str, &str)> {
    if !line.starts_with('/') {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((name, rest)) => Some((name, rest.trim_start())),
        None => Some((line, "")),
    }
}

/// Interpret one command against current registry state.
///
/// A sender that has already departed is dropped silently: the command
/// races against its own disconnect and lost. Direct replies get a
/// single write attempt; a failure is logged and left for the sender's
/// lifecycle handler to clean up.
pub fn dispatch(state: &AppState, command: Command) {
    let Some(sender_name) = state.registry.lookup(command.sender) else {
        tracing::debug!(
            "dropping {} from departed connection {}",
            command.name,
            command.sender
        );
        return;
    };

    let reply = match command.name.as_str() {
        "/list" => Some(protocol::user_list(&state.registry.snapshot())),
        "/me" => {
            if command.args.is_empty() {
                Some(protocol::USAGE_ME.to_string())
            } else {
                state.queue_broadcast(protocol::emote(&sender_name, &command.args));
                None
            }
        }
        "/em" => {
            if command.args.is_empty() {
                Some(protocol::USAGE_EM.to_string())
            } else {
                state.queue_broadcast(protocol::anonymous_emote(&command.args));
                None
            }
        }
        other => Some(protocol::unknown_command(other)),
    };

    if let Some(reply) = reply {
        if let Err(e) = state.registry.direct_send(command.sender, &reply) {
            tracing::warn!("direct reply failed: {}", e);
        }
    }
}
