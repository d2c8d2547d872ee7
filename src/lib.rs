// Public modules
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod locale;
pub mod observability;
pub mod proxy;
pub mod render;
pub mod session;
pub mod types;

// Re-exports
pub use client::{CompletionApi, Completions};
pub use config::{ProxyArgs, ProxyConfig};
pub use error::{Error, Result};
pub use locale::Locale;
pub use observability::{emit_biometrics, register_biometrics, spawn_biometrics_emitter};
pub use proxy::{ProxyState, router, serve};
pub use session::{ChatSession, HttpTransport, PendingTurn, Rejection, SubmitOutcome, Transport};
pub use types::*;
