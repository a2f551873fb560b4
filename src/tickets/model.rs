//! Ticket record types
//!
//! A [`TicketRecord`] is created once per batch and never mutated afterwards.
//! Classification fields are typed enums; free-text fields stay `String`.

use crate::error::{Result, TicketAssistError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Timestamp layout used for `created` and `last_updated`
///
/// The layout sorts lexicographically in chronological order, which the
/// date-based orderings rely on.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000+0200";

/// Ticket priority
///
/// Anything not recognised deserializes to [`Priority::Unknown`], which
/// ranks after every known priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Highest severity
    Critical,
    /// Medium severity
    Major,
    /// Lowest severity
    Minor,
    /// Unrecognised priority label
    #[serde(other)]
    Unknown,
}

impl Priority {
    /// Priorities a generator may assign, in `priority_id` order
    pub const ASSIGNABLE: [Priority; 3] = [Priority::Minor, Priority::Major, Priority::Critical];

    /// Display label, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Unknown => "Unknown",
        }
    }

    /// Severity rank used for sorting (Critical=0 ... unknown=3)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Major => 1,
            Self::Minor => 2,
            Self::Unknown => 3,
        }
    }

    /// Short code shown in compact views
    pub fn code(&self) -> &'static str {
        match self {
            Self::Critical => "C",
            Self::Major => "M",
            Self::Minor => "m",
            Self::Unknown => "?",
        }
    }

    /// Numeric priority id (`10500 + position` in [`Priority::ASSIGNABLE`])
    pub fn id(&self) -> Option<String> {
        Self::ASSIGNABLE
            .iter()
            .position(|p| p == self)
            .map(|idx| (10500 + idx).to_string())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Newly reported
    Open,
    /// Being worked on
    #[serde(rename = "In Progress")]
    InProgress,
    /// Fix delivered, awaiting verification
    Verify,
    /// Closed out
    Resolved,
    /// Unrecognised status label
    #[serde(other)]
    Unknown,
}

impl Status {
    /// Statuses a generator may assign
    pub const ASSIGNABLE: [Status; 4] = [
        Status::Open,
        Status::InProgress,
        Status::Verify,
        Status::Resolved,
    ];

    /// Display label, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Verify => "Verify",
            Self::Resolved => "Resolved",
            Self::Unknown => "Unknown",
        }
    }

    /// Lifecycle rank used for sorting (Open=0 ... unknown=4)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Open => 0,
            Self::InProgress => 1,
            Self::Verify => 2,
            Self::Resolved => 3,
            Self::Unknown => 4,
        }
    }

    /// Short code shown in compact views
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open => "O",
            Self::InProgress => "IP",
            Self::Verify => "V",
            Self::Resolved => "R",
            Self::Unknown => "?",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project tickets can be filed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project {
    /// Short key used as the ticket key prefix
    pub key: &'static str,
    /// Human readable name
    pub name: &'static str,
    /// Numeric id as issued by the tracker
    pub id: &'static str,
}

/// The fixed project table
pub const PROJECTS: [Project; 4] = [
    Project {
        key: "PCELS",
        name: "5G Policy Control",
        id: "20001",
    },
    Project {
        key: "PCTR",
        name: "5G Charging Trigger Router",
        id: "20002",
    },
    Project {
        key: "PCIFUS",
        name: "5G Network Function State Manager",
        id: "20003",
    },
    Project {
        key: "PCBP",
        name: "5G Policy Control Data Repository",
        id: "20004",
    },
];

/// Look up a project by key
pub fn find_project(key: &str) -> Option<&'static Project> {
    PROJECTS.iter().find(|p| p.key == key)
}

/// A comment attached to a ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketComment {
    /// Language tag reported by the tracker
    #[serde(default = "default_language")]
    pub detected_language: String,
    /// Comment body
    pub content: String,
    /// Permalink to the comment
    pub url: String,
}

/// Resolution record carried by every ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketAnswer {
    /// One-line summary of the investigation
    pub summary_of_analysis: String,
    /// Release tag that ships the fix
    pub planned_release: String,
    /// Full explanation
    pub answer_text: String,
    /// Build identifier containing the fix
    pub included_build: String,
    /// Fix reference code
    pub answer_code: String,
    /// Resolution category
    pub answer_category: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// A single synthetic support ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub url: String,
    pub key: String,
    pub created: String,
    pub last_updated: String,
    #[serde(default)]
    pub environment: Option<String>,
    pub status_name: Status,
    #[serde(default)]
    pub labels: Vec<String>,
    pub project_id: String,
    pub project_key: String,
    pub project_name: String,
    pub priority_id: String,
    pub priority_name: Priority,
    #[serde(default)]
    pub linked_issues: Vec<String>,
    pub components: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub title: String,
    pub description: String,
    #[serde(default = "default_language")]
    pub detected_language: String,
    pub comments: Vec<TicketComment>,
    #[serde(rename = "Answer")]
    pub answer: TicketAnswer,
    #[serde(default)]
    pub project_options: Vec<String>,
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Z]+)-(\d{5})$").expect("static regex is valid"))
}

impl TicketRecord {
    /// Check the construction invariants and return the record unchanged
    ///
    /// # Errors
    ///
    /// Returns [`TicketAssistError::InvalidTicket`] when the key is not
    /// `<PROJECT>-<5 digits>`, its prefix differs from `project_key`,
    /// `last_updated` precedes `created`, or the comment/component counts
    /// fall outside 1–3 / 1–2.
    pub fn validate(self) -> Result<Self> {
        let invalid = |reason: String| TicketAssistError::InvalidTicket {
            key: self.key.clone(),
            reason,
        };

        let captures = key_pattern()
            .captures(&self.key)
            .ok_or_else(|| invalid("key must look like <PROJECT>-<5 digits>".to_string()))?;

        if &captures[1] != self.project_key {
            return Err(invalid(format!(
                "key prefix does not match project {}",
                self.project_key
            ))
            .into());
        }

        if self.last_updated < self.created {
            return Err(invalid("last_updated precedes created".to_string()).into());
        }

        if !(1..=3).contains(&self.comments.len()) {
            return Err(invalid(format!(
                "expected 1-3 comments, found {}",
                self.comments.len()
            ))
            .into());
        }

        if !(1..=2).contains(&self.components.len()) {
            return Err(invalid(format!(
                "expected 1-2 components, found {}",
                self.components.len()
            ))
            .into());
        }

        Ok(self)
    }

    /// Lower-cased, accent-stripped text the free-text search runs against
    pub fn searchable_text(&self) -> String {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.key.as_str(),
            self.answer.answer_category.as_str(),
            self.answer.summary_of_analysis.as_str(),
        ]
        .iter()
        .map(|part| crate::tickets::manager::normalize_search_text(part))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_ticket;

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::Critical.rank() < Priority::Major.rank());
        assert!(Priority::Major.rank() < Priority::Minor.rank());
        assert_eq!(Priority::Unknown.rank(), 3);
    }

    #[test]
    fn test_status_rank_order() {
        assert_eq!(Status::Open.rank(), 0);
        assert_eq!(Status::InProgress.rank(), 1);
        assert_eq!(Status::Verify.rank(), 2);
        assert_eq!(Status::Resolved.rank(), 3);
        assert_eq!(Status::Unknown.rank(), 4);
    }

    #[test]
    fn test_priority_ids_follow_assignable_order() {
        assert_eq!(Priority::Minor.id().as_deref(), Some("10500"));
        assert_eq!(Priority::Major.id().as_deref(), Some("10501"));
        assert_eq!(Priority::Critical.id().as_deref(), Some("10502"));
        assert_eq!(Priority::Unknown.id(), None);
    }

    #[test]
    fn test_status_serializes_with_space() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: Status = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(back, Status::InProgress);
    }

    #[test]
    fn test_unknown_labels_deserialize_to_unknown() {
        let priority: Priority = serde_json::from_str("\"Blocker\"").unwrap();
        assert_eq!(priority, Priority::Unknown);
        let status: Status = serde_json::from_str("\"Closed\"").unwrap();
        assert_eq!(status, Status::Unknown);
    }

    #[test]
    fn test_codes() {
        assert_eq!(Priority::Critical.code(), "C");
        assert_eq!(Priority::Minor.code(), "m");
        assert_eq!(Status::InProgress.code(), "IP");
        assert_eq!(Status::Resolved.code(), "R");
    }

    #[test]
    fn test_find_project() {
        assert_eq!(find_project("PCTR").map(|p| p.id), Some("20002"));
        assert!(find_project("NOPE").is_none());
    }

    #[test]
    fn test_validate_accepts_well_formed_ticket() {
        let ticket = sample_ticket("PCTR-81234", Priority::Major, Status::Open);
        assert!(ticket.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_mismatched_prefix() {
        let mut ticket = sample_ticket("PCTR-81234", Priority::Major, Status::Open);
        ticket.project_key = "PCBP".to_string();
        assert!(ticket.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_number() {
        let ticket = sample_ticket("PCTR-812", Priority::Major, Status::Open);
        assert!(ticket.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_time_travel() {
        let mut ticket = sample_ticket("PCTR-81234", Priority::Major, Status::Open);
        ticket.last_updated = "2020-01-01T00:00:00.000+0200".to_string();
        assert!(ticket.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_comments() {
        let mut ticket = sample_ticket("PCTR-81234", Priority::Major, Status::Open);
        ticket.comments.clear();
        assert!(ticket.validate().is_err());
    }

    #[test]
    fn test_answer_serializes_under_capitalized_key() {
        let ticket = sample_ticket("PCTR-81234", Priority::Major, Status::Open);
        let value = serde_json::to_value(&ticket).unwrap();
        assert!(value.get("Answer").is_some());
        assert_eq!(value["status_name"], "Open");
        assert_eq!(value["priority_name"], "Major");
    }

    #[test]
    fn test_searchable_text_is_normalized() {
        let mut ticket = sample_ticket("PCTR-81234", Priority::Major, Status::Open);
        ticket.title = "Défaillance UPF".to_string();
        let text = ticket.searchable_text();
        assert!(text.contains("defaillance upf"));
        assert!(text.contains("pctr-81234"));
    }
}
