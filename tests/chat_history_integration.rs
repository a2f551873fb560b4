//! Chat transcript persistence integration tests
//!
//! Exercises the sled-backed [`ChatHistory`] across separate handles, the
//! way consecutive CLI invocations share one database directory.

use tempfile::TempDir;
use ticketassist::chat::{ChatHistory, ChatMessage, FeedbackKind, Role, SEED_MESSAGE};

#[test]
fn test_transcript_survives_reopen() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("data").join("chat_history");

    let transcript = vec![
        ChatMessage::seed(),
        ChatMessage::user("Why does the SMF drop sessions?"),
        ChatMessage::assistant("Check the N4 heartbeat timer."),
    ];
    ChatHistory::new(&path).save(&transcript);

    let reopened = ChatHistory::new(&path);
    assert_eq!(reopened.load(), transcript);
}

#[test]
fn test_save_replaces_previous_transcript() {
    let tmp = TempDir::new().expect("tempdir");
    let history = ChatHistory::new(tmp.path().join("chat_history"));

    history.save(&[ChatMessage::user("first"), ChatMessage::assistant("one")]);
    history.save(&[ChatMessage::user("second")]);

    let loaded = history.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].content, "second");
}

#[test]
fn test_clear_returns_seed_and_empties_store() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("chat_history");
    let history = ChatHistory::new(&path);
    history.save(&[ChatMessage::user("hello")]);

    let fresh = history.clear();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].role, Role::Assistant);
    assert_eq!(fresh[0].content, SEED_MESSAGE);
    assert!(history.load().is_empty());

    drop(history);
    let reopened = ChatHistory::new(&path);
    assert!(reopened.load().is_empty());
    reopened.save(&[ChatMessage::user("after clear")]);
    assert_eq!(reopened.load().len(), 1);
}

#[test]
fn test_immediate_load_after_save_never_misses() {
    let tmp = TempDir::new().expect("tempdir");
    let history = ChatHistory::new(tmp.path().join("chat_history"));

    let misses = (0..200)
        .filter(|round| {
            history.save(&[ChatMessage::user(format!("hello {}", round))]);
            history.load().len() != 1
        })
        .count();
    assert_eq!(misses, 0);
}

#[test]
fn test_separate_handles_in_sequence_never_miss() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("chat_history");

    for round in 0..25 {
        let transcript = vec![
            ChatMessage::user(format!("question {}", round)),
            ChatMessage::assistant("answer"),
        ];
        ChatHistory::new(&path).save(&transcript);
        assert_eq!(ChatHistory::new(&path).load(), transcript, "round {}", round);
    }
}

#[test]
fn test_load_from_missing_store_is_empty() {
    let tmp = TempDir::new().expect("tempdir");
    let history = ChatHistory::new(tmp.path().join("never_written"));
    assert!(history.load().is_empty());
}

#[test]
fn test_unusable_path_is_masked() {
    let tmp = TempDir::new().expect("tempdir");
    let blocker = tmp.path().join("not_a_dir");
    std::fs::write(&blocker, b"file").expect("write blocker");

    let history = ChatHistory::new(blocker.join("chat_history"));
    history.save(&[ChatMessage::user("lost")]);
    assert!(history.load().is_empty());
}

#[test]
fn test_feedback_on_short_transcript_does_not_panic() {
    let tmp = TempDir::new().expect("tempdir");
    let history = ChatHistory::new(tmp.path().join("chat_history"));

    history.log_feedback(FeedbackKind::Positive, &[]);
    history.log_feedback(FeedbackKind::Negative, &[ChatMessage::seed()]);
    history.log_feedback(
        FeedbackKind::Positive,
        &[
            ChatMessage::seed(),
            ChatMessage::user("q"),
            ChatMessage::assistant("a"),
        ],
    );
}
