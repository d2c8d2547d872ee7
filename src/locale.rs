//! Fixed human-readable strings shown to people on the other side of the
//! proxy and the session.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The language used for every user-facing string.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    /// Simplified Chinese.
    #[default]
    ZhCn,

    /// English.
    En,
}

impl Locale {
    /// Body of the proxy's response when the upstream call fails.
    pub fn server_error(&self) -> &'static str {
        match self {
            Locale::ZhCn => "服务器处理请求时出错",
            Locale::En => "The server encountered an error while processing the request.",
        }
    }

    /// Body of the proxy's response when the request itself is unusable.
    pub fn bad_request(&self) -> &'static str {
        match self {
            Locale::ZhCn => "请求格式不正确",
            Locale::En => "The request was malformed.",
        }
    }

    /// Assistant message a session appends when a round trip fails.
    pub fn apology(&self) -> &'static str {
        match self {
            Locale::ZhCn => "抱歉，服务出现了一些问题，请稍后再试。",
            Locale::En => "Sorry, something went wrong with the service. Please try again later.",
        }
    }

    /// Shown in place of an empty transcript.
    pub fn empty_state(&self) -> &'static str {
        match self {
            Locale::ZhCn => "开始与 AI 助手对话吧！",
            Locale::En => "Start a conversation with the AI assistant!",
        }
    }

    /// Placeholder for the input box.
    pub fn input_placeholder(&self) -> &'static str {
        match self {
            Locale::ZhCn => "输入您的问题...",
            Locale::En => "Type your question...",
        }
    }

    /// Display name of the assistant.
    pub fn assistant_name(&self) -> &'static str {
        match self {
            Locale::ZhCn => "AI 助手",
            Locale::En => "AI Assistant",
        }
    }

    /// The BCP 47 tag of this locale.
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::ZhCn => "zh-CN",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "zh" | "zh-cn" | "zh-hans" => Ok(Locale::ZhCn),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            _ => Err(Error::validation(
                format!("unsupported locale {s:?}; valid options: zh-CN, en"),
                Some("locale".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_simplified_chinese() {
        let locale = Locale::default();
        assert_eq!(locale, Locale::ZhCn);
        assert_eq!(locale.apology(), "抱歉，服务出现了一些问题，请稍后再试。");
        assert_eq!(locale.server_error(), "服务器处理请求时出错");
    }

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!("zh-CN".parse::<Locale>().unwrap(), Locale::ZhCn);
        assert_eq!("zh_cn".parse::<Locale>().unwrap(), Locale::ZhCn);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().unwrap_err().is_validation());
    }

    #[test]
    fn display_round_trips() {
        for locale in [Locale::ZhCn, Locale::En] {
            assert_eq!(locale.to_string().parse::<Locale>().unwrap(), locale);
        }
    }
}
