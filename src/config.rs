//! Configuration for the proxy endpoint.
//!
//! [`ProxyArgs`] is what arrives on the command line; [`ProxyConfig`] is the
//! resolved, immutable configuration built once at start-up and handed to
//! everything that needs it.  The environment is read exactly once, while
//! building the config.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;
use url::Url;

use crate::error::{Error, Result};
use crate::locale::Locale;

/// Environment variable holding the upstream credential.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Default base URL of the chat-completion API.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1/";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Default upstream request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default period between biometrics readings.
pub const DEFAULT_METRICS_INTERVAL: Duration = Duration::from_secs(60);

/// Command-line arguments for the chatrelay-server tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ProxyArgs {
    /// Base URL of the chat-completion API.
    #[arrrg(optional, "Completion API base URL (default: https://api.deepseek.com/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Model to request completions from.
    #[arrrg(optional, "Model to use (default: deepseek-chat)", "MODEL")]
    pub model: Option<String>,

    /// Address to listen on.
    #[arrrg(optional, "Listen address (default: 127.0.0.1:3000)", "ADDR")]
    pub bind: Option<String>,

    /// Language of user-facing error strings.
    #[arrrg(optional, "Locale for error strings: zh-CN or en (default: zh-CN)", "LOCALE")]
    pub locale: Option<String>,

    /// Upstream request timeout in seconds.
    #[arrrg(optional, "Upstream request timeout in seconds (default: 60)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// File that periodic biometrics readings are appended to.
    #[arrrg(optional, "Append biometrics readings to this file (default: off)", "PATH")]
    pub metrics_path: Option<String>,

    /// Seconds between biometrics readings.
    #[arrrg(optional, "Seconds between biometrics readings (default: 60)", "SECS")]
    pub metrics_interval_secs: Option<u64>,
}

/// Process-wide proxy configuration.
#[derive(Clone)]
pub struct ProxyConfig {
    /// Bearer credential for the completion API.
    pub api_key: String,

    /// Base URL of the completion API; always ends in `/`.
    pub base_url: Url,

    /// The model identifier sent with every request.
    pub model: String,

    /// Address the proxy listens on.
    pub bind: String,

    /// Language of user-facing error strings.
    pub locale: Locale,

    /// Upstream request timeout.
    pub timeout: Duration,

    /// Where to append biometrics readings; `None` disables emission.
    pub metrics_path: Option<PathBuf>,

    /// Period between biometrics readings.
    pub metrics_interval: Duration,
}

impl ProxyConfig {
    /// Creates a config with default settings around an explicit credential.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if `api_key` is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = require_api_key(Some(api_key.into()))?;
        Ok(Self {
            api_key,
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            model: DEFAULT_MODEL.to_string(),
            bind: DEFAULT_BIND.to_string(),
            locale: Locale::default(),
            timeout: DEFAULT_TIMEOUT,
            metrics_path: None,
            metrics_interval: DEFAULT_METRICS_INTERVAL,
        })
    }

    /// Resolves the config from command-line arguments and the
    /// [`API_KEY_ENV`] environment variable.
    pub fn from_args(args: ProxyArgs) -> Result<Self> {
        Self::from_args_with_key(args, env::var(API_KEY_ENV).ok())
    }

    /// Resolves the config from command-line arguments and an already
    /// looked-up credential.
    ///
    /// # Errors
    ///
    /// Fails with an authentication error when the credential is missing or
    /// blank, and with a validation or URL error when an argument is invalid.
    pub fn from_args_with_key(args: ProxyArgs, api_key: Option<String>) -> Result<Self> {
        let api_key = require_api_key(api_key)?;
        let mut config = Self::new(api_key)?;
        if let Some(base_url) = args.base_url {
            config = config.with_base_url(&base_url)?;
        }
        if let Some(model) = args.model {
            config = config.with_model(model)?;
        }
        if let Some(bind) = args.bind {
            config.bind = bind;
        }
        if let Some(locale) = args.locale {
            config.locale = locale.parse()?;
        }
        if let Some(secs) = args.timeout_secs {
            if secs == 0 {
                return Err(Error::validation(
                    "timeout must be at least one second",
                    Some("timeout-secs".to_string()),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = args.metrics_path {
            config.metrics_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = args.metrics_interval_secs {
            if secs == 0 {
                return Err(Error::validation(
                    "metrics interval must be at least one second",
                    Some("metrics-interval-secs".to_string()),
                ));
            }
            config.metrics_interval = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Sets the base URL of the completion API.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(Error::validation(
                "model must not be empty",
                Some("model".to_string()),
            ));
        }
        self.model = model;
        Ok(self)
    }

    /// Sets the locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Sets the upstream request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the URL of the chat-completion endpoint.
    pub fn completions_url(&self) -> Result<Url> {
        Ok(self.base_url.join("chat/completions")?)
    }
}

// The credential stays out of Debug output so configs can be logged.
impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("bind", &self.bind)
            .field("locale", &self.locale)
            .field("timeout", &self.timeout)
            .field("metrics_path", &self.metrics_path)
            .field("metrics_interval", &self.metrics_interval)
            .finish()
    }
}

fn require_api_key(api_key: Option<String>) -> Result<String> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(Error::authentication(format!(
            "API key not provided and {API_KEY_ENV} environment variable not set"
        ))),
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url.trim())?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::validation(
            format!("{base_url} is not an http(s) base URL"),
            Some("base-url".to_string()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_fails_fast() {
        let err = ProxyConfig::from_args_with_key(ProxyArgs::default(), None).unwrap_err();
        assert!(err.is_authentication());

        let err =
            ProxyConfig::from_args_with_key(ProxyArgs::default(), Some("   ".to_string()))
                .unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn defaults() {
        let config =
            ProxyConfig::from_args_with_key(ProxyArgs::default(), Some("sk-test".to_string()))
                .unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.locale, Locale::ZhCn);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.metrics_path, None);
        assert_eq!(config.metrics_interval, DEFAULT_METRICS_INTERVAL);
        assert_eq!(
            config.completions_url().unwrap().as_str(),
            "https://api.deepseek.com/v1/chat/completions"
        );
    }

    #[test]
    fn args_override_defaults() {
        let args = ProxyArgs {
            base_url: Some("http://localhost:8080/openai".to_string()),
            model: Some("gpt-4o-mini".to_string()),
            bind: Some("0.0.0.0:8000".to_string()),
            locale: Some("en".to_string()),
            timeout_secs: Some(5),
            metrics_path: Some("/var/log/chatrelay.biometrics".to_string()),
            metrics_interval_secs: Some(10),
        };
        let config = ProxyConfig::from_args_with_key(args, Some("sk-test".to_string())).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/openai/");
        assert_eq!(
            config.completions_url().unwrap().as_str(),
            "http://localhost:8080/openai/chat/completions"
        );
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.bind, "0.0.0.0:8000");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.metrics_path,
            Some(PathBuf::from("/var/log/chatrelay.biometrics"))
        );
        assert_eq!(config.metrics_interval, Duration::from_secs(10));
    }

    #[test]
    fn invalid_args_are_rejected() {
        let key = || Some("sk-test".to_string());

        let args = ProxyArgs {
            base_url: Some("not a url".to_string()),
            ..ProxyArgs::default()
        };
        assert!(ProxyConfig::from_args_with_key(args, key()).is_err());

        let args = ProxyArgs {
            base_url: Some("ftp://example.com/".to_string()),
            ..ProxyArgs::default()
        };
        assert!(
            ProxyConfig::from_args_with_key(args, key())
                .unwrap_err()
                .is_validation()
        );

        let args = ProxyArgs {
            locale: Some("tlh".to_string()),
            ..ProxyArgs::default()
        };
        assert!(
            ProxyConfig::from_args_with_key(args, key())
                .unwrap_err()
                .is_validation()
        );

        let args = ProxyArgs {
            timeout_secs: Some(0),
            ..ProxyArgs::default()
        };
        assert!(
            ProxyConfig::from_args_with_key(args, key())
                .unwrap_err()
                .is_validation()
        );

        let args = ProxyArgs {
            metrics_interval_secs: Some(0),
            ..ProxyArgs::default()
        };
        assert!(
            ProxyConfig::from_args_with_key(args, key())
                .unwrap_err()
                .is_validation()
        );

        let args = ProxyArgs {
            model: Some(" ".to_string()),
            ..ProxyArgs::default()
        };
        assert!(ProxyConfig::from_args_with_key(args, key()).is_err());
    }

    #[test]
    fn debug_redacts_credential() {
        let config = ProxyConfig::new("sk-secret").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
