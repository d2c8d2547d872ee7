//! Configuration types for the terminal chat client.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration the client runs with.

use arrrg_derive::CommandLine;
use url::Url;

use crate::error::{Error, Result};
use crate::locale::Locale;

/// Default URL of the proxy's chat route.
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000/api/chat";

/// Command-line arguments for the chatrelay-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// URL of the proxy's chat route.
    #[arrrg(optional, "Proxy chat URL (default: http://127.0.0.1:3000/api/chat)", "URL")]
    pub proxy_url: Option<String>,

    /// Language of fixed strings.
    #[arrrg(optional, "Locale: zh-CN or en (default: zh-CN)", "LOCALE")]
    pub locale: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a terminal chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// URL of the proxy's chat route.
    pub proxy_url: Url,

    /// Language of fixed strings.
    pub locale: Locale,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    pub fn new() -> Result<Self> {
        Ok(Self {
            proxy_url: Url::parse(DEFAULT_PROXY_URL)?,
            locale: Locale::default(),
            use_color: true,
        })
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self> {
        let mut config = ChatConfig::new()?;
        if let Some(proxy_url) = args.proxy_url {
            let url = Url::parse(&proxy_url)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::validation(
                    format!("{proxy_url} is not an http(s) URL"),
                    Some("proxy-url".to_string()),
                ));
            }
            config.proxy_url = url;
        }
        if let Some(locale) = args.locale {
            config.locale = locale.parse()?;
        }
        config.use_color = !args.no_color;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert_eq!(config.proxy_url.as_str(), DEFAULT_PROXY_URL);
        assert_eq!(config.locale, Locale::ZhCn);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            proxy_url: Some("https://chat.example.com/api/chat".to_string()),
            locale: Some("en".to_string()),
            no_color: true,
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.proxy_url.as_str(), "https://chat.example.com/api/chat");
        assert_eq!(config.locale, Locale::En);
        assert!(!config.use_color);
    }

    #[test]
    fn config_rejects_bad_urls() {
        let args = ChatArgs {
            proxy_url: Some("file:///etc/passwd".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_validation());

        let args = ChatArgs {
            proxy_url: Some("::".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).is_err());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .unwrap()
            .without_color()
            .with_locale(Locale::En);
        assert!(!config.use_color);
        assert_eq!(config.locale, Locale::En);
    }
}
