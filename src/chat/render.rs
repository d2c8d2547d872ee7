//! Terminal output for the chat client.
//!
//! Replies are printed as their raw Markdown source; a transient typing
//! indicator is shown while a reply is outstanding and erased once it
//! arrives.

use std::io::{self, Stdout, Write};

/// ANSI escape code for dim text (used for the typing indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the assistant's name).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Carriage return plus erase-to-end-of-line.
const ERASE_LINE: &str = "\r\x1b[K";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print an assistant reply.
    fn print_assistant(&mut self, name: &str, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Show the typing indicator.
    fn start_typing(&mut self);

    /// Remove the typing indicator, if shown.
    fn finish_typing(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    typing: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer on stdout with the given color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            typing: false,
        }
    }

    /// Consumes the renderer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    // Terminal write failures are not actionable mid-conversation.
    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_assistant(&mut self, name: &str, text: &str) {
        self.finish_typing();
        if self.use_color {
            self.emit(&format!("{ANSI_CYAN}{name}:{ANSI_RESET}\n{text}\n\n"));
        } else {
            self.emit(&format!("{name}:\n{text}\n\n"));
        }
    }

    fn print_error(&mut self, error: &str) {
        self.finish_typing();
        if self.use_color {
            self.emit(&format!("{ANSI_RED}Error: {error}{ANSI_RESET}\n"));
        } else {
            self.emit(&format!("Error: {error}\n"));
        }
    }

    fn print_info(&mut self, info: &str) {
        self.finish_typing();
        self.emit(&format!("{info}\n"));
    }

    fn start_typing(&mut self) {
        if self.typing {
            return;
        }
        self.typing = true;
        if self.use_color {
            self.emit(&format!("{ANSI_DIM}...{ANSI_RESET}"));
        } else {
            self.emit("...");
        }
    }

    fn finish_typing(&mut self) {
        if !self.typing {
            return;
        }
        self.typing = false;
        if self.use_color {
            self.emit(ERASE_LINE);
        } else {
            self.emit("\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(renderer: PlainTextRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn typing_indicator_is_cleared_before_reply() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), true);
        renderer.start_typing();
        renderer.start_typing();
        renderer.print_assistant("AI 助手", "**hi**");
        let text = output(renderer);
        assert_eq!(text.matches("...").count(), 1);
        let erase = text.find(ERASE_LINE).unwrap();
        let reply = text.find("**hi**").unwrap();
        assert!(erase < reply);
    }

    #[test]
    fn plain_output_has_no_escapes() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        renderer.start_typing();
        renderer.finish_typing();
        renderer.finish_typing();
        renderer.print_assistant("AI Assistant", "hello");
        renderer.print_error("boom");
        let text = output(renderer);
        assert_eq!(text, "...\nAI Assistant:\nhello\n\nError: boom\n");
    }
}
