//! Test utilities for TicketAssist
//!
//! Provides a deterministic ticket builder, temporary directories and a
//! sample configuration for unit tests.

use crate::config::Config;
use crate::error::TicketAssistError;
use crate::tickets::model::{
    find_project, Priority, Status, TicketAnswer, TicketComment, TicketRecord, PROJECTS,
};
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Build a valid ticket with fixed content
///
/// The project is derived from the key prefix (falling back to `PCTR`);
/// timestamps are fixed so date orderings are predictable.
///
/// # Arguments
///
/// * `key` - Ticket key, e.g. `PCTR-81234`
/// * `priority` - Priority to assign
/// * `status` - Status to assign
pub fn sample_ticket(key: &str, priority: Priority, status: Status) -> TicketRecord {
    let prefix = key.split('-').next().unwrap_or_default();
    let project = find_project(prefix).unwrap_or(&PROJECTS[1]);

    TicketRecord {
        url: format!("localhost:8080/browse/{}", key),
        key: key.to_string(),
        created: "2024-03-10T09:15:00.000+0200".to_string(),
        last_updated: "2024-03-12T09:15:00.000+0200".to_string(),
        environment: None,
        status_name: status,
        labels: Vec::new(),
        project_id: project.id.to_string(),
        project_key: prefix.to_string(),
        project_name: project.name.to_string(),
        priority_id: priority.id().unwrap_or_default(),
        priority_name: priority,
        linked_issues: Vec::new(),
        components: vec!["Service Engine".to_string()],
        attachments: Vec::new(),
        title: "Sample ticket".to_string(),
        description: "Reproduced on the staging cluster.".to_string(),
        detected_language: "en".to_string(),
        comments: vec![TicketComment {
            detected_language: "en".to_string(),
            content: "Any update?".to_string(),
            url: format!("localhost:8080/browse/{}?focusedId=19000001#comment-19000001", key),
        }],
        answer: TicketAnswer {
            summary_of_analysis: "Timer misconfiguration.".to_string(),
            planned_release: "v24.2.0".to_string(),
            answer_text: "Adjusted the timer defaults.".to_string(),
            included_build: "build_8000".to_string(),
            answer_code: "FIX-12345".to_string(),
            answer_category: "Bug Fix".to_string(),
        },
        project_options: PROJECTS.iter().map(|p| p.key.to_string()).collect(),
    }
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration YAML exercising every section
pub fn test_config_yaml() -> String {
    r#"
app:
  title: TicketAssist Test
  debug: true
auth:
  username: tester
  password: hunter2
llm:
  model: llama3.1:8b
  temperature: 0.2
  max_tokens: 256
  top_p: 0.8
  host: http://localhost:11434
  health_check:
    max_retries: 3
    retry_interval_ms: 100
    request_timeout_ms: 500
storage:
  history_path: data/test_history
tickets:
  default_count: 10
  base_url: localhost:8080/browse
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_sample_ticket_is_valid() {
        let ticket = sample_ticket("PCIFUS-90000", Priority::Critical, Status::Verify);
        assert_eq!(ticket.project_name, "5G Network Function State Manager");
        assert!(ticket.validate().is_ok());
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: crate::error::Result<()> =
            Err(TicketAssistError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_test_config_yaml() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.auth.username, "tester");
        assert_eq!(config.llm.health_check.max_retries, 3);
        assert!(config.validate().is_ok());
    }
}
