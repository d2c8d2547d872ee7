//! HTML rendering of a conversation.
//!
//! Assistant replies are untrusted Markdown and go through two separate
//! stages:
//!
//! 1. [`markdown_to_html`] parses GitHub-flavored Markdown (tables,
//!    strikethrough, footnotes) into HTML.  Raw markup embedded in the reply
//!    is passed through untouched at this point.
//! 2. [`sanitize_html`] runs the result through an allow-list sanitizer that
//!    removes scripts, event handlers, `javascript:` URLs and unknown tags.
//!
//! User messages are plain text and are only escaped.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::locale::Locale;
use crate::session::{ChatSession, Transport};
use crate::types::{Message, MessageRole, Transcript};

/// Class of inline code spans.
pub const INLINE_CODE_CLASS: &str = "inline-code";

/// Class of fenced and indented code blocks.
pub const CODE_BLOCK_CLASS: &str = "code-block";

/// `rel` value set on every link.
pub const LINK_REL: &str = "noopener noreferrer";

/// Parses Markdown into HTML without sanitizing it.
///
/// Inline code becomes `<code class="inline-code">` and code blocks become
/// `<pre><code class="code-block">` so the two can be styled apart.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options).flat_map(|event| match event {
        Event::Code(code) => vec![
            Event::InlineHtml(CowStr::Borrowed(r#"<code class="inline-code">"#)),
            Event::Text(code),
            Event::InlineHtml(CowStr::Borrowed("</code>")),
        ],
        Event::Start(Tag::CodeBlock(_)) => vec![Event::Html(CowStr::Borrowed(
            r#"<pre><code class="code-block">"#,
        ))],
        Event::End(TagEnd::CodeBlock) => vec![Event::Html(CowStr::Borrowed("</code></pre>\n"))],
        other => vec![other],
    });

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Removes everything unsafe from an HTML fragment.
///
/// Links are forced to open in a new browsing context without an opener or
/// referrer.
pub fn sanitize_html(html: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder
        .add_allowed_classes("code", [INLINE_CODE_CLASS, CODE_BLOCK_CLASS])
        .link_rel(Some(LINK_REL))
        .set_tag_attribute_value("a", "target", "_blank");
    builder.clean(html).to_string()
}

/// Parses and sanitizes Markdown.
pub fn render_markdown(markdown: &str) -> String {
    sanitize_html(&markdown_to_html(markdown))
}

/// Escapes plain text for inclusion in HTML.
pub fn escape_text(text: &str) -> String {
    ammonia::clean_text(text)
}

/// Renders one message inside a role-tagged container.
pub fn render_message(message: &Message) -> String {
    match message.role {
        MessageRole::User => format!(
            r#"<div class="message user"><div class="bubble">{}</div></div>"#,
            escape_text(&message.content)
        ),
        MessageRole::Assistant => format!(
            r#"<div class="message assistant"><div class="bubble markdown-body">{}</div></div>"#,
            render_markdown(&message.content)
        ),
    }
}

/// The element shown while a reply is outstanding.
pub fn typing_indicator() -> &'static str {
    concat!(
        r#"<div class="typing" aria-live="polite">"#,
        r#"<span class="dot"></span><span class="dot"></span><span class="dot"></span>"#,
        "</div>"
    )
}

/// Renders a whole conversation.
///
/// An empty transcript renders the locale's empty-state prompt.  While
/// `loading`, the typing indicator follows the last message.
pub fn render_transcript(transcript: &Transcript, loading: bool, locale: Locale) -> String {
    let mut out = String::from(r#"<div class="transcript">"#);
    if transcript.is_empty() {
        out.push_str(r#"<div class="empty-state"><p>"#);
        out.push_str(&escape_text(locale.empty_state()));
        out.push_str("</p></div>");
    }
    for message in transcript {
        out.push_str(&render_message(message));
    }
    if loading {
        out.push_str(typing_indicator());
    }
    out.push_str("</div>");
    out
}

/// Renders the current state of a session.
pub fn render_session<T: Transport>(session: &ChatSession<T>) -> String {
    render_transcript(session.transcript(), session.is_loading(), session.locale())
}
