//! Terminal front end for a chat session.
//!
//! This module provides the pieces of an interactive REPL that drives a
//! [`ChatSession`](crate::session::ChatSession) against a running proxy:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`render`]: terminal output with a typing indicator
//! - [`commands`]: slash command parsing
//! - [`turn`]: one submitted line and its printed reply

mod commands;
mod config;
mod render;
mod turn;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_PROXY_URL};
pub use render::{PlainTextRenderer, Renderer};
pub use turn::run_turn;
