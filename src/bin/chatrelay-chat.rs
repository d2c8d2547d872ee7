//! Interactive terminal chat against a running chatrelay proxy.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a proxy on the default address
//! chatrelay-chat
//!
//! # Another proxy, English strings, no colors
//! chatrelay-chat --proxy-url https://chat.example.com/api/chat --locale en --no-color
//! ```
//!
//! Type `/help` for commands, `/quit` or Ctrl-D to exit.

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{EnvFilter, fmt};

use chatrelay::chat::{
    ChatArgs, ChatCommand, ChatConfig, PlainTextRenderer, Renderer, help_text, parse_command,
    run_turn,
};
use chatrelay::{ChatSession, HttpTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (args, _) = ChatArgs::from_command_line_relaxed("chatrelay-chat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;
    let locale = config.locale;

    let transport = HttpTransport::new(config.proxy_url.clone())?;
    let mut session = ChatSession::new(transport, locale);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    renderer.print_info(&format!(
        "{} ({})",
        locale.assistant_name(),
        session.transport().endpoint()
    ));
    renderer.print_info(locale.empty_state());
    renderer.print_info("");

    loop {
        let readline = rl.readline(&format!("{} ", locale.input_placeholder()));

        match readline {
            Ok(line) => {
                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::Quit => break,
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                renderer.print_info(&format!("    {line}"));
                            }
                        }
                        ChatCommand::Invalid(message) => renderer.print_error(&message),
                    }
                    continue;
                }

                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.trim());
                }
                run_turn(&mut session, &mut renderer, &line).await;
            }
            Err(ReadlineError::Interrupted) => {
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}
