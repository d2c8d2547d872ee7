//! The chat proxy server.
//!
//! Relays `POST /api/chat` conversations to an OpenAI-compatible
//! chat-completion API.
//!
//! # Usage
//!
//! ```bash
//! # The credential is required; the server refuses to start without it.
//! export DEEPSEEK_API_KEY=sk-...
//!
//! # Defaults: deepseek-chat at https://api.deepseek.com/v1/ on 127.0.0.1:3000
//! chatrelay-server
//!
//! # Another provider, English error strings
//! chatrelay-server --base-url https://api.openai.com/v1/ --model gpt-4o-mini --locale en
//!
//! # Append biometrics readings to a file every 10 seconds
//! chatrelay-server --metrics-path /var/log/chatrelay.biometrics --metrics-interval-secs 10
//! ```

use std::sync::Arc;

use arrrg::CommandLine;
use biometrics::Collector;
use tracing_subscriber::{EnvFilter, fmt};

use chatrelay::{ProxyArgs, ProxyConfig, register_biometrics, spawn_biometrics_emitter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (args, free) = ProxyArgs::from_command_line_relaxed("chatrelay-server [OPTIONS]");
    if !free.is_empty() {
        eprintln!("unexpected arguments: {}", free.join(" "));
        std::process::exit(2);
    }

    let config = match ProxyConfig::from_args(args) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "resolved configuration");

    let emitter = match &config.metrics_path {
        Some(path) => {
            let collector = Arc::new(Collector::new());
            register_biometrics(&collector);
            let handle = spawn_biometrics_emitter(collector, path, config.metrics_interval)?;
            tracing::info!(
                path = %path.display(),
                interval = ?config.metrics_interval,
                "emitting biometrics"
            );
            Some(handle)
        }
        None => None,
    };

    chatrelay::serve(config).await?;
    if let Some(handle) = emitter {
        handle.abort();
    }
    Ok(())
}
