//! Streaming chat session against an Ollama-compatible inference service
//!
//! [`LlmService::generate_response`] returns a lazy token stream. Nothing is
//! sent until the stream is first polled; the reachability probe, the chat
//! request and the body decoding all happen while the consumer drains it.
//! The stream never fails: an unreachable service produces one apology
//! token, and any failure after the request was accepted produces one final
//! error token.

use crate::chat::message::ChatMessage;
use crate::config::LlmConfig;
use crate::error::{Result, TicketAssistError};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sole token yielded when the inference service cannot be reached
pub const UNAVAILABLE_MESSAGE: &str = "I'm having trouble connecting to the language model service. Please try again in a few moments.";

/// Prefix of the final token yielded after a failed exchange
pub const ERROR_PREFIX: &str = "I encountered an error: ";

/// Running text of the assistant reply, shared between the token stream and
/// its caller
///
/// Only content tokens are appended; the apology and error tokens are not.
#[derive(Debug, Clone, Default)]
pub struct MessageAccumulator(Arc<Mutex<String>>);

impl MessageAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, token: &str) {
        match self.0.lock() {
            Ok(mut text) => text.push_str(token),
            Err(poisoned) => poisoned.into_inner().push_str(token),
        }
    }

    /// Copy of the text accumulated so far
    pub fn snapshot(&self) -> String {
        match self.0.lock() {
            Ok(text) => text.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Take the accumulated text, leaving the accumulator empty
    pub fn take(&self) -> String {
        match self.0.lock() {
            Ok(mut text) => std::mem::take(&mut *text),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

/// Request body for `POST /api/chat`
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

/// Sampling parameters
#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f64,
    top_p: f64,
    num_predict: u32,
}

/// One line of the streamed response
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

/// What a decoded line means for the stream
#[derive(Debug, PartialEq)]
enum StreamEvent {
    Token(String),
    Done,
    Failed(String),
}

/// Splits a chunked body into newline-delimited JSON records
#[derive(Debug, Default)]
struct NdjsonDecoder {
    buffer: BytesMut,
}

impl NdjsonDecoder {
    /// Feed a body chunk, returning events for every completed line
    fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(pos + 1);
            Self::decode_line(&line, &mut events);
        }
        events
    }

    /// Flush a trailing line that was not newline-terminated
    fn finish(&mut self) -> Vec<StreamEvent> {
        let rest = self.buffer.split();
        let mut events = Vec::new();
        Self::decode_line(&rest, &mut events);
        events
    }

    /// Decode one line; the final `done` chunk may still carry content,
    /// which is emitted before [`StreamEvent::Done`]
    fn decode_line(line: &[u8], events: &mut Vec<StreamEvent>) {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text.trim(),
            Err(e) => {
                events.push(StreamEvent::Failed(format!("invalid UTF-8 in stream: {}", e)));
                return;
            }
        };
        if text.is_empty() {
            return;
        }

        let chunk: ChatChunk = match serde_json::from_str(text) {
            Ok(chunk) => chunk,
            Err(e) => {
                events.push(StreamEvent::Failed(format!("malformed stream chunk: {}", e)));
                return;
            }
        };

        if let Some(error) = chunk.error {
            events.push(StreamEvent::Failed(error));
            return;
        }
        if let Some(message) = chunk.message {
            if !message.content.is_empty() {
                events.push(StreamEvent::Token(message.content));
            }
        }
        if chunk.done {
            events.push(StreamEvent::Done);
        }
    }
}

/// Item queued for delivery to the consumer
enum Pending {
    Token(String),
    Error(String),
}

/// Progress of one generation
enum StreamState {
    Connect {
        service: LlmService,
        messages: Vec<ChatMessage>,
        accumulator: Option<MessageAccumulator>,
    },
    Receiving {
        body: BoxStream<'static, reqwest::Result<Bytes>>,
        decoder: NdjsonDecoder,
        pending: VecDeque<Pending>,
        closing: bool,
        accumulator: Option<MessageAccumulator>,
    },
    Finished,
}

/// Client for an Ollama-compatible inference service
///
/// # Examples
///
/// ```
/// use ticketassist::chat::LlmService;
/// use ticketassist::config::LlmConfig;
///
/// let service = LlmService::new(LlmConfig::default()).unwrap();
/// assert_eq!(service.model(), "llama3.1:8b");
/// ```
#[derive(Debug, Clone)]
pub struct LlmService {
    client: Client,
    config: LlmConfig,
}

impl LlmService {
    /// Create a service client from the LLM configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.health_check.request_timeout_ms))
            .user_agent(concat!("ticketassist/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                TicketAssistError::Inference(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Model used for chat requests
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Base address of the inference service
    pub fn host(&self) -> &str {
        self.config.host.trim_end_matches('/')
    }

    /// Use a different model for subsequent requests
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
    }

    /// Probe `GET /api/version` once
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/version", self.host());
        let timeout = Duration::from_millis(self.config.health_check.request_timeout_ms);

        match self.client.get(&url).timeout(timeout).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!("Inference service returned {}", response.status());
                false
            }
            Err(e) => {
                tracing::debug!("Inference service probe failed: {}", e);
                false
            }
        }
    }

    /// Probe the service until it answers or the retry budget is spent
    ///
    /// Makes up to `max_retries` probes, sleeping `retry_interval_ms`
    /// between them.
    pub async fn wait_for_service(&self) -> bool {
        let health = &self.config.health_check;
        let interval = Duration::from_millis(health.retry_interval_ms);

        for attempt in 1..=health.max_retries {
            if self.is_available().await {
                tracing::debug!("Inference service reachable at {}", self.host());
                return true;
            }

            tracing::warn!(
                "Inference service not ready (attempt {}/{})",
                attempt,
                health.max_retries
            );
            if attempt < health.max_retries {
                tokio::time::sleep(interval).await;
            }
        }

        tracing::error!(
            "Inference service at {} unreachable after {} attempts",
            self.host(),
            health.max_retries
        );
        false
    }

    /// Stream the assistant's reply to `messages`
    ///
    /// Each content token is appended to `accumulator` (when given) as it is
    /// yielded. The stream is finite and meant to be drained once; start a
    /// new one for the next user turn.
    ///
    /// # Arguments
    ///
    /// * `messages` - Full transcript to send
    /// * `accumulator` - Optional running buffer for the reply text
    ///
    /// # Returns
    ///
    /// A stream of reply tokens, or a single apology/error token on failure
    pub fn generate_response(
        &self,
        messages: Vec<ChatMessage>,
        accumulator: Option<MessageAccumulator>,
    ) -> BoxStream<'static, String> {
        let state = StreamState::Connect {
            service: self.clone(),
            messages,
            accumulator,
        };
        stream::unfold(state, next_token).boxed()
    }

    async fn start_chat(
        &self,
        messages: &[ChatMessage],
    ) -> Result<BoxStream<'static, reqwest::Result<Bytes>>> {
        let url = format!("{}/api/chat", self.host());
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            stream: true,
            options: ChatOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                num_predict: self.config.max_tokens,
            },
        };

        tracing::debug!(
            "Sending chat request: model={}, {} messages",
            request.model,
            messages.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Chat request failed: {}", e);
                TicketAssistError::Inference(format!("Chat request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Inference service returned error {}: {}", status, error_text);
            return Err(TicketAssistError::Inference(format!(
                "Inference service returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        Ok(response.bytes_stream().boxed())
    }
}

fn error_token(description: impl std::fmt::Display) -> String {
    format!("{}{}", ERROR_PREFIX, description)
}

fn enqueue(events: Vec<StreamEvent>, pending: &mut VecDeque<Pending>, closing: &mut bool) {
    for event in events {
        if *closing {
            break;
        }
        match event {
            StreamEvent::Token(token) if token.is_empty() => {}
            StreamEvent::Token(token) => pending.push_back(Pending::Token(token)),
            StreamEvent::Done => *closing = true,
            StreamEvent::Failed(reason) => {
                tracing::error!("Error generating LLM response: {}", reason);
                pending.push_back(Pending::Error(error_token(reason)));
                *closing = true;
            }
        }
    }
}

async fn next_token(mut state: StreamState) -> Option<(String, StreamState)> {
    loop {
        state = match state {
            StreamState::Finished => return None,

            StreamState::Connect {
                service,
                messages,
                accumulator,
            } => {
                if !service.wait_for_service().await {
                    return Some((UNAVAILABLE_MESSAGE.to_string(), StreamState::Finished));
                }
                match service.start_chat(&messages).await {
                    Ok(body) => StreamState::Receiving {
                        body,
                        decoder: NdjsonDecoder::default(),
                        pending: VecDeque::new(),
                        closing: false,
                        accumulator,
                    },
                    Err(e) => return Some((error_token(e), StreamState::Finished)),
                }
            }

            StreamState::Receiving {
                mut body,
                mut decoder,
                mut pending,
                mut closing,
                accumulator,
            } => {
                match pending.pop_front() {
                    Some(Pending::Token(token)) => {
                        if let Some(acc) = &accumulator {
                            acc.push(&token);
                        }
                        let next = StreamState::Receiving {
                            body,
                            decoder,
                            pending,
                            closing,
                            accumulator,
                        };
                        return Some((token, next));
                    }
                    Some(Pending::Error(message)) => {
                        return Some((message, StreamState::Finished));
                    }
                    None if closing => return None,
                    None => {}
                }

                match body.next().await {
                    Some(Ok(chunk)) => {
                        let events = decoder.push(&chunk);
                        enqueue(events, &mut pending, &mut closing);
                    }
                    Some(Err(e)) => {
                        let events = vec![StreamEvent::Failed(e.to_string())];
                        enqueue(events, &mut pending, &mut closing);
                    }
                    None => {
                        let events = decoder.finish();
                        enqueue(events, &mut pending, &mut closing);
                        closing = true;
                    }
                }

                StreamState::Receiving {
                    body,
                    decoder,
                    pending,
                    closing,
                    accumulator,
                }
            }
        };
    }
}
