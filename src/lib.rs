// Public API for integration tests and potential library usage

pub mod broadcast;
pub mod command;
pub mod config;
pub mod protocol;
pub mod sanitize;
pub mod state;
pub mod ws;
