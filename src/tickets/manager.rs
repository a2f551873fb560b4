//! Ticket filter, sort and statistics pipeline
//!
//! Every function here is pure: it borrows the input batch and returns a new
//! list, leaving the input untouched. The pipeline is re-run from scratch for
//! each interaction with the current filters and sort selection.

use crate::tickets::model::TicketRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lower-case `text` and strip diacritics
///
/// Applies NFKD decomposition and drops combining marks, so "Défaillance"
/// normalizes to "defaillance". Latin letters with no decomposition
/// (`ł`, `ø`, `ß`, `æ`, ...) are folded through a small table; other
/// scripts pass through unchanged rather than being transliterated.
///
/// # Examples
///
/// ```
/// use ticketassist::tickets::manager::normalize_search_text;
///
/// assert_eq!(normalize_search_text("Crème UPF"), "creme upf");
/// assert_eq!(normalize_search_text("Łódź Straße"), "lodz strasse");
/// ```
pub fn normalize_search_text(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        match fold_latin(c) {
            Some(replacement) => folded.push_str(replacement),
            None => folded.extend(c.to_lowercase()),
        }
    }
    folded
}

/// ASCII spelling of Latin letters that NFKD leaves intact
fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'ł' | 'Ł' => "l",
        'ø' | 'Ø' => "o",
        'đ' | 'Đ' | 'ð' | 'Ð' => "d",
        'ħ' | 'Ħ' => "h",
        'ı' => "i",
        'ŧ' | 'Ŧ' => "t",
        'ß' | 'ẞ' => "ss",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        'þ' | 'Þ' => "th",
        _ => return None,
    };
    Some(folded)
}

/// Session-scoped filter selection
///
/// An empty set disables filtering on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFilters {
    /// Project keys to keep
    #[serde(default)]
    pub projects: BTreeSet<String>,
    /// Priority labels to keep
    #[serde(default)]
    pub priority: BTreeSet<String>,
    /// Status labels to keep
    #[serde(default)]
    pub status: BTreeSet<String>,
    /// Raw free-text search as typed by the user
    #[serde(default)]
    pub search: String,
}

impl TicketFilters {
    /// Returns true when no dimension narrows the batch
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
            && self.priority.is_empty()
            && self.status.is_empty()
            && self.search.trim().is_empty()
    }

    /// Normalized form of [`TicketFilters::search`] ready for
    /// [`apply_filters`]
    pub fn normalized_search(&self) -> String {
        normalize_search_text(self.search.trim())
    }
}

/// The ten supported orderings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    KeyAscending,
    KeyDescending,
    /// Most severe first
    PriorityDown,
    /// Least severe first
    PriorityUp,
    /// Earliest lifecycle stage first
    StatusDown,
    /// Latest lifecycle stage first
    StatusUp,
    /// Newest first
    CreatedDown,
    /// Oldest first
    CreatedUp,
    /// Most recently updated first
    UpdatedDown,
    /// Least recently updated first
    UpdatedUp,
}

impl SortOrder {
    /// All orderings in menu order
    pub const ALL: [SortOrder; 10] = [
        SortOrder::KeyAscending,
        SortOrder::KeyDescending,
        SortOrder::PriorityDown,
        SortOrder::PriorityUp,
        SortOrder::StatusDown,
        SortOrder::StatusUp,
        SortOrder::CreatedDown,
        SortOrder::CreatedUp,
        SortOrder::UpdatedDown,
        SortOrder::UpdatedUp,
    ];

    /// Menu label for this ordering
    pub fn label(&self) -> &'static str {
        match self {
            Self::KeyAscending => "Key A → Z",
            Self::KeyDescending => "Key Z → A",
            Self::PriorityDown => "Priority ↓",
            Self::PriorityUp => "Priority ↑",
            Self::StatusDown => "Status ↓",
            Self::StatusUp => "Status ↑",
            Self::CreatedDown => "Created ↓",
            Self::CreatedUp => "Created ↑",
            Self::UpdatedDown => "Updated ↓",
            Self::UpdatedUp => "Updated ↑",
        }
    }

    /// Parse a menu label; unknown labels yield `None`
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|order| order.label() == label)
    }

    fn compare(&self, a: &TicketRecord, b: &TicketRecord) -> Ordering {
        match self {
            Self::KeyAscending => a.key.cmp(&b.key),
            Self::KeyDescending => b.key.cmp(&a.key),
            Self::PriorityDown => a.priority_name.rank().cmp(&b.priority_name.rank()),
            Self::PriorityUp => b.priority_name.rank().cmp(&a.priority_name.rank()),
            Self::StatusDown => a.status_name.rank().cmp(&b.status_name.rank()),
            Self::StatusUp => b.status_name.rank().cmp(&a.status_name.rank()),
            Self::CreatedDown => b.created.cmp(&a.created),
            Self::CreatedUp => a.created.cmp(&b.created),
            Self::UpdatedDown => b.last_updated.cmp(&a.last_updated),
            Self::UpdatedUp => a.last_updated.cmp(&b.last_updated),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate counters over a ticket list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStatistics {
    pub open_count: usize,
    pub in_progress_count: usize,
    pub critical_count: usize,
    pub major_count: usize,
    pub total_count: usize,
}

/// Narrow `tickets` by the selected projects, priorities, statuses and search
///
/// Each dimension is skipped when its set is empty. `search_text` must
/// already be normalized (see [`normalize_search_text`]); an empty string
/// disables the text search. Surviving tickets keep their input order.
///
/// # Arguments
///
/// * `tickets` - The batch to filter
/// * `filters` - Current filter selection
/// * `search_text` - Normalized search string
///
/// # Returns
///
/// The matching tickets, possibly empty
pub fn apply_filters(
    tickets: &[TicketRecord],
    filters: &TicketFilters,
    search_text: &str,
) -> Vec<TicketRecord> {
    let filtered: Vec<TicketRecord> = tickets
        .iter()
        .filter(|t| filters.projects.is_empty() || filters.projects.contains(&t.project_key))
        .filter(|t| {
            filters.priority.is_empty() || filters.priority.contains(t.priority_name.as_str())
        })
        .filter(|t| filters.status.is_empty() || filters.status.contains(t.status_name.as_str()))
        .filter(|t| search_text.is_empty() || t.searchable_text().contains(search_text))
        .cloned()
        .collect();

    tracing::debug!(
        "Filtered {} tickets down to {} (search: {:?})",
        tickets.len(),
        filtered.len(),
        search_text
    );
    filtered
}

/// Stable sort of `tickets` by a menu label
///
/// An unknown label returns the input order unchanged.
pub fn apply_sorting(tickets: &[TicketRecord], sort_key: &str) -> Vec<TicketRecord> {
    match SortOrder::from_label(sort_key) {
        Some(order) => sort_by_order(tickets, order),
        None => {
            tracing::debug!("Unknown sort key {:?}, keeping input order", sort_key);
            tickets.to_vec()
        }
    }
}

/// Stable sort of `tickets` by a typed ordering
pub fn sort_by_order(tickets: &[TicketRecord], order: SortOrder) -> Vec<TicketRecord> {
    let mut sorted = tickets.to_vec();
    // `sort_by` is stable, and the descending comparators swap operands
    // instead of reversing the result so ties keep their input order.
    sorted.sort_by(|a, b| order.compare(a, b));
    sorted
}

/// Count open, in-progress, critical and major tickets
pub fn calculate_statistics(tickets: &[TicketRecord]) -> TicketStatistics {
    use crate::tickets::model::{Priority, Status};

    tickets.iter().fold(
        TicketStatistics {
            total_count: tickets.len(),
            ..Default::default()
        },
        |mut stats, t| {
            match t.status_name {
                Status::Open => stats.open_count += 1,
                Status::InProgress => stats.in_progress_count += 1,
                _ => {}
            }
            match t.priority_name {
                Priority::Critical => stats.critical_count += 1,
                Priority::Major => stats.major_count += 1,
                _ => {}
            }
            stats
        },
    )
}
