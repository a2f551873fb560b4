//! Per-session state and user-action handlers
//!
//! A [`SessionContext`] owns one slice per feature. Ticket actions are
//! [`TicketEvent`]s handled by [`TicketState::handle`]; chat actions are
//! methods on [`ChatController`]. Every handler returns a fresh view value
//! for the caller to render, and never touches another feature's slice.

use crate::auth::AuthState;
use crate::chat::{ChatHistory, ChatMessage, FeedbackKind, LlmService, MessageAccumulator};
use crate::config::Config;
use crate::error::Result;
use crate::tickets::manager::{
    apply_filters, apply_sorting, calculate_statistics, SortOrder, TicketFilters,
    TicketStatistics,
};
use crate::tickets::model::{TicketRecord, PROJECTS};
use crate::tickets::TicketGenerator;
use futures::StreamExt;

/// Longest prompt accepted from the user, in characters
pub const MAX_PROMPT_CHARS: usize = 150;

/// Everything one user session carries between actions
#[derive(Debug)]
pub struct SessionContext {
    pub auth: AuthState,
    pub tickets: TicketState,
    pub chat: ChatState,
}

impl SessionContext {
    /// Build a logged-out session from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            auth: AuthState::default(),
            tickets: TicketState::new(
                TicketGenerator::new(config.tickets.base_url.clone()),
                config.tickets.default_count,
            ),
            chat: ChatState::default(),
        }
    }
}

/// A user action on the ticket board
#[derive(Debug, Clone, PartialEq)]
pub enum TicketEvent {
    /// Replace the project/priority/status selection; the search text is kept
    ApplyFilters {
        projects: Vec<String>,
        priority: Vec<String>,
        status: Vec<String>,
    },
    /// Select an ordering by menu label
    ChangeSort(String),
    /// Replace the free-text search
    Search(String),
    /// Ask for a batch of a different size
    ChangeCount(usize),
    /// Drop every filter and the search text
    ClearFilters,
    /// Re-render without changing anything
    Refresh,
}

/// Immutable snapshot of the ticket board after an action
#[derive(Debug, Clone, PartialEq)]
pub struct TicketView {
    /// Filtered and sorted tickets
    pub tickets: Vec<TicketRecord>,
    /// Counters over [`TicketView::tickets`]
    pub statistics: TicketStatistics,
    pub filters: TicketFilters,
    pub sort_label: String,
    /// Size of the underlying batch before filtering
    pub batch_size: usize,
    /// Project keys the user can filter on
    pub project_options: Vec<String>,
}

/// Ticket board slice of the session
#[derive(Debug)]
pub struct TicketState {
    generator: TicketGenerator,
    count: usize,
    batch: Option<Vec<TicketRecord>>,
    filters: TicketFilters,
    sort_label: String,
}

impl TicketState {
    /// Create the slice; the first batch is generated lazily
    pub fn new(generator: TicketGenerator, count: usize) -> Self {
        Self {
            generator,
            count,
            batch: None,
            filters: TicketFilters::default(),
            sort_label: SortOrder::default().label().to_string(),
        }
    }

    /// Use an existing batch instead of generating one
    pub fn with_batch(mut self, batch: Vec<TicketRecord>) -> Self {
        self.count = batch.len();
        self.batch = Some(batch);
        self
    }

    pub fn filters(&self) -> &TicketFilters {
        &self.filters
    }

    pub fn sort_label(&self) -> &str {
        &self.sort_label
    }

    /// Apply one user action and render the board
    ///
    /// # Errors
    ///
    /// Returns an error only when a new batch has to be generated and the
    /// generator fails.
    pub fn handle(&mut self, event: TicketEvent) -> Result<TicketView> {
        tracing::debug!("Handling ticket event: {:?}", event);

        match event {
            TicketEvent::ApplyFilters {
                projects,
                priority,
                status,
            } => {
                self.filters.projects = projects.into_iter().collect();
                self.filters.priority = priority.into_iter().collect();
                self.filters.status = status.into_iter().collect();
            }
            TicketEvent::ChangeSort(label) => self.sort_label = label,
            TicketEvent::Search(text) => self.filters.search = text,
            TicketEvent::ChangeCount(count) => {
                if count != self.count {
                    self.count = count;
                    self.batch = None;
                }
            }
            TicketEvent::ClearFilters => self.filters = TicketFilters::default(),
            TicketEvent::Refresh => {}
        }

        self.render()
    }

    fn render(&mut self) -> Result<TicketView> {
        let batch = match self.batch.take() {
            Some(batch) => batch,
            None => {
                tracing::info!("Generating a batch of {} tickets", self.count);
                self.generator.generate(self.count)?.into_values().collect()
            }
        };

        let filtered = apply_filters(&batch, &self.filters, &self.filters.normalized_search());
        let tickets = apply_sorting(&filtered, &self.sort_label);
        let statistics = calculate_statistics(&tickets);

        let view = TicketView {
            tickets,
            statistics,
            filters: self.filters.clone(),
            sort_label: self.sort_label.clone(),
            batch_size: batch.len(),
            project_options: PROJECTS.iter().map(|p| p.key.to_string()).collect(),
        };
        self.batch = Some(batch);
        Ok(view)
    }
}

/// Chat slice of the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
}

impl ChatState {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

/// Immutable snapshot of the chat after an action
#[derive(Debug, Clone, PartialEq)]
pub struct ChatView {
    pub messages: Vec<ChatMessage>,
    /// Short status line for the user, if the action produced one
    pub notice: Option<String>,
}

/// Handles chat actions against the session's [`ChatState`]
#[derive(Debug)]
pub struct ChatController<'a> {
    history: &'a ChatHistory,
    llm: &'a LlmService,
    state: &'a mut ChatState,
}

impl<'a> ChatController<'a> {
    /// Attach to the chat slice, loading the stored transcript on first use
    ///
    /// An empty store starts the transcript with the seed greeting.
    pub fn new(history: &'a ChatHistory, llm: &'a LlmService, state: &'a mut ChatState) -> Self {
        if state.messages.is_empty() {
            state.messages = history.load();
            if state.messages.is_empty() {
                state.messages.push(ChatMessage::seed());
            }
        }
        Self {
            history,
            llm,
            state,
        }
    }

    /// Current transcript without changing anything
    pub fn view(&self) -> ChatView {
        self.view_with(None)
    }

    /// Send a user prompt and stream the reply
    ///
    /// `on_token` sees every streamed token, including an apology or error
    /// token. The transcript records the user prompt and the accumulated
    /// reply, then is saved in full. Prompts are trimmed and capped at
    /// [`MAX_PROMPT_CHARS`] characters; a blank prompt is ignored.
    pub async fn submit<F>(&mut self, prompt: &str, mut on_token: F) -> ChatView
    where
        F: FnMut(&str),
    {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return self.view_with(Some("Nothing to send.".to_string()));
        }

        let notice = (prompt.chars().count() > MAX_PROMPT_CHARS)
            .then(|| format!("Prompt truncated to {} characters.", MAX_PROMPT_CHARS));
        let prompt: String = prompt.chars().take(MAX_PROMPT_CHARS).collect();

        self.state.messages.push(ChatMessage::user(prompt));

        let accumulator = MessageAccumulator::new();
        let mut tokens = self
            .llm
            .generate_response(self.state.messages.clone(), Some(accumulator.clone()));
        while let Some(token) = tokens.next().await {
            on_token(&token);
        }

        self.state
            .messages
            .push(ChatMessage::assistant(accumulator.take()));
        self.history.save(&self.state.messages);

        self.view_with(notice)
    }

    /// Reset the transcript to the seed greeting and clear the store
    pub fn clear(&mut self) -> ChatView {
        self.state.messages = self.history.clear();
        self.view_with(Some("Chat history cleared.".to_string()))
    }

    /// Record feedback on the latest exchange
    ///
    /// Ignored while the transcript holds only the greeting.
    pub fn feedback(&mut self, kind: FeedbackKind) -> ChatView {
        if self.state.messages.len() < 2 {
            return self.view_with(Some("Nothing to rate yet.".to_string()));
        }
        self.history.log_feedback(kind, &self.state.messages);
        self.view_with(Some("Thanks for your feedback!".to_string()))
    }

    fn view_with(&self, notice: Option<String>) -> ChatView {
        ChatView {
            messages: self.state.messages.clone(),
            notice,
        }
    }
}
