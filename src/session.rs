//! Core chat session management.
//!
//! A [`ChatSession`] owns the transcript of one conversation plus two pieces
//! of transient state: the pending input and the in-flight flag.  Each turn
//! sends the whole transcript to the proxy endpoint through a [`Transport`]
//! and appends exactly one assistant message afterwards.  When the round trip
//! fails that message is a fixed apology, so failures show up in the
//! conversation itself rather than as an error.
//!
//! A turn has two halves.  [`ChatSession::begin`] validates the input,
//! appends the user message and raises the in-flight flag;
//! [`ChatSession::finish`] appends the reply and lowers the flag.
//! [`ChatSession::submit`] runs both halves around one transport call.
//!
//! `submit` borrows the session for the whole round trip, so other tasks
//! watch the in-flight flag through [`ChatSession::loading`].

use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tokio::sync::watch;
use url::Url;

use crate::error::{Error, Result};
use crate::locale::Locale;
use crate::observability::{SESSION_FAILURES, SESSION_REJECTIONS, SESSION_SUBMITS};
use crate::types::{ChatRequest, ErrorBody, Message, Transcript};

/// Delivers a conversation to the proxy endpoint and returns its reply.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends the full conversation and returns the assistant's reply.
    async fn send(&self, request: &ChatRequest) -> Result<Message>;
}

/// A [`Transport`] that POSTs JSON to a proxy endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport targeting the given chat route URL.
    pub fn new(endpoint: Url) -> Result<Self> {
        let client = ReqwestClient::builder().build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(Self { client, endpoint })
    }

    /// The chat route this transport posts to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<Message> {
        #[derive(Deserialize)]
        struct Reply {
            content: String,
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| Error::from_send(e, None))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(Error::api(status.as_u16(), None, message));
        }

        let reply = response.json::<Reply>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse proxy reply: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(Message::assistant(reply.content))
    }
}

/// Why a submission was ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The input was empty or whitespace only.
    EmptyInput,

    /// Another submission is still waiting for its reply.
    InFlight,
}

/// What a submission did to the transcript.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing changed.
    Ignored(Rejection),

    /// The user message and the proxy's reply were appended.
    Replied,

    /// The user message and an apology were appended.
    Apologized,
}

/// A turn that has been started with [`ChatSession::begin`].
///
/// Holding one means the session is in flight; hand it back to
/// [`ChatSession::finish`] once the transport has answered.
#[derive(Debug)]
#[must_use = "a pending turn keeps the session in flight until it is finished"]
pub struct PendingTurn {
    request: ChatRequest,
}

impl PendingTurn {
    /// The conversation to send, ending with the new user message.
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

/// A chat session that manages conversation state and proxy interactions.
pub struct ChatSession<T: Transport> {
    transport: T,
    locale: Locale,
    transcript: Transcript,
    input: String,
    in_flight: watch::Sender<bool>,
}

impl<T: Transport> ChatSession<T> {
    /// Creates a new, empty chat session.
    pub fn new(transport: T, locale: Locale) -> Self {
        Self {
            transport,
            locale,
            transcript: Transcript::new(),
            input: String::new(),
            in_flight: watch::Sender::new(false),
        }
    }

    /// Returns the transcript so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns true while a submission is waiting for its reply.
    pub fn is_loading(&self) -> bool {
        *self.in_flight.borrow()
    }

    /// Returns a receiver that observes the in-flight flag.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.in_flight.subscribe()
    }

    /// Returns the pending input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the pending input.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Returns the session's locale.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Starts a turn.
    ///
    /// On success the trimmed text has been appended as a user message, the
    /// pending input is cleared and the session is in flight.  A rejection
    /// changes nothing.
    pub fn begin(&mut self, text: &str) -> std::result::Result<PendingTurn, Rejection> {
        let text = text.trim();
        if text.is_empty() {
            SESSION_REJECTIONS.click();
            return Err(Rejection::EmptyInput);
        }
        if self.is_loading() {
            SESSION_REJECTIONS.click();
            return Err(Rejection::InFlight);
        }

        SESSION_SUBMITS.click();
        self.transcript.push(Message::user(text));
        self.input.clear();
        self.in_flight.send_replace(true);
        Ok(PendingTurn {
            request: ChatRequest::from(&self.transcript),
        })
    }

    /// Completes a turn started with [`ChatSession::begin`].
    ///
    /// Appends the reply, or the locale's apology if `result` is an error,
    /// and clears the in-flight flag either way.
    pub fn finish(&mut self, pending: PendingTurn, result: Result<Message>) -> SubmitOutcome {
        drop(pending);
        self.in_flight.send_replace(false);
        match result {
            Ok(reply) => {
                self.transcript.push(Message::assistant(reply.content));
                SubmitOutcome::Replied
            }
            Err(err) => {
                SESSION_FAILURES.click();
                tracing::warn!(error = %err, "chat round trip failed");
                self.transcript.push(Message::assistant(self.locale.apology()));
                SubmitOutcome::Apologized
            }
        }
    }

    /// Submits `text` as the next user turn and waits for the reply.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        let pending = match self.begin(text) {
            Ok(pending) => pending,
            Err(rejection) => return SubmitOutcome::Ignored(rejection),
        };
        tracing::debug!(
            messages = pending.request().messages.len(),
            "sending transcript to proxy"
        );
        let result = self.transport.send(pending.request()).await;
        self.finish(pending, result)
    }

    /// Submits the pending input.
    pub async fn submit_input(&mut self) -> SubmitOutcome {
        let text = self.input.clone();
        self.submit(&text).await
    }
}
