//! Slash command parsing for the terminal chat client.
//!
//! Input starting with `/` controls the client and is never sent to the
//! proxy.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be submitted as a message.
///
/// # Examples
///
/// ```
/// # use chatrelay::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("Hello!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let command = input.strip_prefix('/')?;
    let command = command.split_whitespace().next().unwrap_or("").to_lowercase();

    let result = match command.as_str() {
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "" => ChatCommand::Invalid("empty command; try /help".to_string()),
        other => ChatCommand::Invalid(format!("unknown command /{other}; try /help")),
    };
    Some(result)
}

/// Returns help text for the available commands.
pub fn help_text() -> &'static str {
    "/help  Show this help\n/quit  Exit the chat"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_commands() {
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(parse_command("  /QUIT "), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit now"), Some(ChatCommand::Quit));
    }

    #[test]
    fn messages_are_not_commands() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("a/b"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn unknown_commands_are_invalid() {
        assert!(matches!(parse_command("/"), Some(ChatCommand::Invalid(_))));
        assert!(matches!(
            parse_command("/model x"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("/model")
        ));
    }
}
