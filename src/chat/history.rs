//! Chat history persistence
//!
//! The transcript lives under a single `messages` key in an embedded `sled`
//! database. The database is opened on first use and the handle is kept for
//! the life of the store (clones share it). sled holds an exclusive lock on
//! the directory, so only one live store per path is supported; an open that
//! hits a lock still being released by a dropped handle is retried briefly.
//!
//! Storage failures never reach the caller: they are logged and replaced by
//! a safe default so the chat keeps working without persistence.

use crate::chat::message::{ChatMessage, Role};
use crate::error::{Result, TicketAssistError};
use chrono::Local;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const MESSAGES_KEY: &[u8] = b"messages";

/// Attempts made when the database lock is still held
const OPEN_ATTEMPTS: u32 = 20;
const OPEN_RETRY_DELAY: Duration = Duration::from_millis(25);

/// Feedback label attached to the last exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Positive,
    Negative,
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => f.write_str("positive"),
            Self::Negative => f.write_str("negative"),
        }
    }
}

/// Persistent store for the chat transcript
///
/// # Examples
///
/// ```
/// use ticketassist::chat::{ChatHistory, ChatMessage};
///
/// let dir = tempfile::tempdir().unwrap();
/// let history = ChatHistory::new(dir.path().join("chat_history"));
/// history.save(&[ChatMessage::user("hello")]);
/// assert_eq!(history.load().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ChatHistory {
    path: PathBuf,
    db: Arc<Mutex<Option<sled::Db>>>,
}

impl ChatHistory {
    /// Create a store backed by the database directory at `path`
    ///
    /// The parent directory is created if missing; failure to create it is
    /// logged and surfaces later as masked load/save failures.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::error!(
                    "Failed to create chat history directory {}: {}",
                    parent.display(),
                    e
                );
            }
        }
        Self {
            path,
            db: Arc::new(Mutex::new(None)),
        }
    }

    /// Location of the backing database
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored transcript
    ///
    /// Returns an empty list when nothing is stored or the store cannot be
    /// read.
    pub fn load(&self) -> Vec<ChatMessage> {
        match self.try_load() {
            Ok(messages) => {
                tracing::debug!("Loaded {} chat messages", messages.len());
                messages
            }
            Err(e) => {
                tracing::error!("Error loading chat history: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Replace the stored transcript with `messages`
    pub fn save(&self, messages: &[ChatMessage]) {
        if let Err(e) = self.try_save(messages) {
            tracing::error!("Error saving chat history: {:#}", e);
        }
    }

    /// Persist an empty transcript and return a fresh one holding the seed
    /// greeting
    pub fn clear(&self) -> Vec<ChatMessage> {
        self.save(&[]);
        tracing::info!("Chat history cleared");
        vec![ChatMessage::seed()]
    }

    /// Log feedback on the most recent exchange
    ///
    /// Emits one `info` event on the `ticketassist::feedback` target holding
    /// a local timestamp, the feedback label and the JSON of the last two
    /// transcript entries. The entries are logged as they are even when they
    /// are not a user question followed by an assistant answer; that case
    /// is flagged with a warning.
    pub fn log_feedback(&self, kind: FeedbackKind, transcript: &[ChatMessage]) {
        let tail = &transcript[transcript.len().saturating_sub(2)..];

        if !matches!(
            tail,
            [
                ChatMessage {
                    role: Role::User,
                    ..
                },
                ChatMessage {
                    role: Role::Assistant,
                    ..
                }
            ]
        ) {
            tracing::warn!(
                "Feedback recorded against {} trailing entries that are not a user/assistant pair",
                tail.len()
            );
        }

        match serde_json::to_string(tail) {
            Ok(last_messages) => {
                let activity = format!(
                    "{}: {}: {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    kind,
                    last_messages
                );
                tracing::info!(target: "ticketassist::feedback", "{}", activity);
            }
            Err(e) => tracing::error!("Error logging feedback: {}", e),
        }
    }

    /// Shared database handle, opened on first use
    ///
    /// A failed open is not cached, so the next operation tries again.
    fn open(&self) -> Result<sled::Db> {
        let mut slot = match self.db.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(db) = slot.as_ref() {
            return Ok(db.clone());
        }

        let db = open_with_retry(&self.path).map_err(|e| {
            TicketAssistError::Storage(format!(
                "Failed to open {}: {}",
                self.path.display(),
                e
            ))
        })?;
        *slot = Some(db.clone());
        Ok(db)
    }

    fn try_load(&self) -> Result<Vec<ChatMessage>> {
        let db = self.open()?;
        match db
            .get(MESSAGES_KEY)
            .map_err(|e| TicketAssistError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => {
                let messages = serde_json::from_slice(&bytes).map_err(|e| {
                    TicketAssistError::Storage(format!("Deserialization failed: {}", e))
                })?;
                Ok(messages)
            }
            None => Ok(Vec::new()),
        }
    }

    fn try_save(&self, messages: &[ChatMessage]) -> Result<()> {
        let value = serde_json::to_vec(messages)
            .map_err(|e| TicketAssistError::Storage(format!("Serialization failed: {}", e)))?;

        let db = self.open()?;
        db.insert(MESSAGES_KEY, value)
            .map_err(|e| TicketAssistError::Storage(format!("Insert failed: {}", e)))?;
        db.flush()
            .map_err(|e| TicketAssistError::Storage(format!("Flush failed: {}", e)))?;

        tracing::debug!("Saved {} chat messages", messages.len());
        Ok(())
    }
}

/// sled reports a held directory lock as an `Other` io error whose message
/// wraps the underlying `WouldBlock`
fn is_lock_contention(error: &sled::Error) -> bool {
    match error {
        sled::Error::Io(io) => {
            io.kind() == std::io::ErrorKind::WouldBlock
                || io.to_string().contains("could not acquire lock")
        }
        _ => false,
    }
}

fn open_with_retry(path: &Path) -> sled::Result<sled::Db> {
    let mut attempt = 1;
    loop {
        match sled::open(path) {
            Err(e) if is_lock_contention(&e) && attempt < OPEN_ATTEMPTS => {
                tracing::debug!(
                    "Chat history at {} is locked (attempt {}/{})",
                    path.display(),
                    attempt,
                    OPEN_ATTEMPTS
                );
                std::thread::sleep(OPEN_RETRY_DELAY);
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::SEED_MESSAGE;
    use tempfile::TempDir;

    fn store() -> (TempDir, ChatHistory) {
        let dir = TempDir::new().unwrap();
        let history = ChatHistory::new(dir.path().join("data").join("chat_history"));
        (dir, history)
    }

    #[test]
    fn test_load_missing_is_empty() {
        let (_dir, history) = store();
        assert!(history.load().is_empty());
    }

    #[test]
    fn test_new_creates_parent_directory() {
        let (dir, _history) = store();
        assert!(dir.path().join("data").is_dir());
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, history) = store();
        let messages = vec![ChatMessage::user("ping"), ChatMessage::assistant("pong")];
        history.save(&messages);
        assert_eq!(history.load(), messages);
    }

    #[test]
    fn test_save_overwrites() {
        let (_dir, history) = store();
        history.save(&[ChatMessage::user("one"), ChatMessage::assistant("two")]);
        history.save(&[ChatMessage::user("three")]);
        assert_eq!(history.load(), vec![ChatMessage::user("three")]);
    }

    #[test]
    fn test_clear_returns_seed_and_empties_store() {
        let (_dir, history) = store();
        history.save(&[ChatMessage::user("remember me")]);
        let fresh = history.clear();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].role, Role::Assistant);
        assert_eq!(fresh[0].content, SEED_MESSAGE);
        assert!(history.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_value_is_masked() {
        let (_dir, history) = store();
        {
            let db = sled::open(history.path()).unwrap();
            db.insert(MESSAGES_KEY, b"not json".to_vec()).unwrap();
            db.flush().unwrap();
        }
        assert!(history.load().is_empty());
    }

    #[test]
    fn test_unopenable_path_is_masked() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let history = ChatHistory::new(blocker.join("chat_history"));
        history.save(&[ChatMessage::user("lost")]);
        assert!(history.load().is_empty());
    }

    #[test]
    fn test_log_feedback_never_panics() {
        let (_dir, history) = store();
        history.log_feedback(FeedbackKind::Positive, &[]);
        history.log_feedback(FeedbackKind::Negative, &[ChatMessage::seed()]);
        history.log_feedback(
            FeedbackKind::Positive,
            &[ChatMessage::user("q"), ChatMessage::assistant("a")],
        );
    }

    #[test]
    fn test_save_then_load_repeatedly() {
        let (_dir, history) = store();
        for round in 0..200 {
            let messages = vec![ChatMessage::user(format!("hello {}", round))];
            history.save(&messages);
            assert_eq!(history.load(), messages, "round {}", round);
        }
    }

    #[test]
    fn test_reopen_after_drop_sees_saved_messages() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat_history");
        for round in 0..20 {
            let messages = vec![ChatMessage::user(format!("turn {}", round))];
            ChatHistory::new(&path).save(&messages);
            assert_eq!(ChatHistory::new(&path).load(), messages, "round {}", round);
        }
    }

    #[test]
    fn test_clones_share_the_handle() {
        let (_dir, history) = store();
        let other = history.clone();
        history.save(&[ChatMessage::user("shared")]);
        assert_eq!(other.load(), vec![ChatMessage::user("shared")]);
    }

    #[test]
    fn test_held_lock_is_recognized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat_history");
        let _held = sled::open(&path).unwrap();
        match sled::open(&path) {
            Err(e) => assert!(is_lock_contention(&e), "unexpected error: {}", e),
            Ok(_) => panic!("second open of a locked directory succeeded"),
        }
    }

    #[test]
    fn test_feedback_labels() {
        assert_eq!(FeedbackKind::Positive.to_string(), "positive");
        assert_eq!(FeedbackKind::Negative.to_string(), "negative");
    }
}
