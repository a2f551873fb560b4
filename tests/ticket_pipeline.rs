//! Ticket pipeline integration tests
//!
//! Drives generated batches through filtering, sorting, statistics and CSV
//! export using only the public API.

mod common;

use common::seeded_batch;
use std::collections::BTreeSet;
use ticketassist::tickets::{
    apply_filters, apply_sorting, calculate_statistics, export_to_csv, normalize_search_text,
    Priority, SortOrder, Status, TicketFilters,
};

#[test]
fn test_generated_tickets_satisfy_invariants() {
    let batch = seeded_batch(60, 7);
    assert!(!batch.is_empty());

    for ticket in &batch {
        let (prefix, number) = ticket.key.split_once('-').expect("key has a dash");
        assert_eq!(prefix, ticket.project_key);
        assert_eq!(number.len(), 5);
        assert!(ticket.url.ends_with(&ticket.key));
        assert!(ticket.last_updated > ticket.created);
        assert!(Priority::ASSIGNABLE.contains(&ticket.priority_name));
        assert!(Status::ASSIGNABLE.contains(&ticket.status_name));
        assert!(!ticket.components.is_empty());
        assert_eq!(ticket.project_options.len(), 4);
    }
}

#[test]
fn test_filters_are_subsets_of_input() {
    let batch = seeded_batch(80, 11);
    let filters = TicketFilters {
        priority: ["Critical".to_string()].into(),
        status: ["Open".to_string(), "Verify".to_string()].into(),
        ..Default::default()
    };

    let filtered = apply_filters(&batch, &filters, "");
    assert!(filtered.len() <= batch.len());
    for ticket in &filtered {
        assert_eq!(ticket.priority_name, Priority::Critical);
        assert!(matches!(ticket.status_name, Status::Open | Status::Verify));
        assert!(batch.contains(ticket));
    }

    let expected = batch
        .iter()
        .filter(|t| {
            t.priority_name == Priority::Critical
                && matches!(t.status_name, Status::Open | Status::Verify)
        })
        .count();
    assert_eq!(filtered.len(), expected);
}

#[test]
fn test_empty_filters_keep_everything_in_order() {
    let batch = seeded_batch(30, 3);
    let filtered = apply_filters(&batch, &TicketFilters::default(), "");
    assert_eq!(filtered, batch);
}

#[test]
fn test_search_matches_case_and_accent_insensitively() {
    let batch = seeded_batch(40, 5);
    let target = &batch[0];

    let query = normalize_search_text(&target.key.to_uppercase());
    let found = apply_filters(&batch, &TicketFilters::default(), &query);
    assert!(found.iter().any(|t| t.key == target.key));

    let filters = TicketFilters {
        search: "Ünmatchable Qüery zzz".to_string(),
        ..Default::default()
    };
    assert!(apply_filters(&batch, &filters, &filters.normalized_search()).is_empty());
}

#[test]
fn test_every_sort_order_is_a_permutation() {
    let batch = seeded_batch(50, 13);
    let original_keys: BTreeSet<_> = batch.iter().map(|t| t.key.clone()).collect();

    for order in SortOrder::ALL {
        let sorted = apply_sorting(&batch, order.label());
        assert_eq!(sorted.len(), batch.len(), "{}", order.label());
        let keys: BTreeSet<_> = sorted.iter().map(|t| t.key.clone()).collect();
        assert_eq!(keys, original_keys, "{}", order.label());
    }
}

#[test]
fn test_priority_down_puts_critical_first() {
    let batch = seeded_batch(50, 17);
    let sorted = apply_sorting(&batch, "Priority ↓");
    let ranks: Vec<u8> = sorted.iter().map(|t| t.priority_name.rank()).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    if sorted.iter().any(|t| t.priority_name == Priority::Critical) {
        assert_eq!(sorted[0].priority_name, Priority::Critical);
    }
}

#[test]
fn test_priority_up_puts_minor_first() {
    let batch = seeded_batch(50, 17);
    let sorted = apply_sorting(&batch, "Priority ↑");
    let ranks: Vec<u8> = sorted.iter().map(|t| t.priority_name.rank()).collect();
    assert!(ranks.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_created_up_is_chronological() {
    let batch = seeded_batch(50, 19);
    let sorted = apply_sorting(&batch, "Created ↑");
    assert!(sorted.windows(2).all(|w| w[0].created <= w[1].created));
}

#[test]
fn test_unknown_sort_label_keeps_input_order() {
    let batch = seeded_batch(20, 23);
    assert_eq!(apply_sorting(&batch, "Alphabetical-ish"), batch);
}

#[test]
fn test_statistics_match_filtered_view() {
    let batch = seeded_batch(70, 29);
    let filters = TicketFilters {
        projects: ["PCTR".to_string(), "PCBP".to_string()].into(),
        ..Default::default()
    };
    let filtered = apply_filters(&batch, &filters, "");
    let stats = calculate_statistics(&filtered);

    assert_eq!(stats.total_count, filtered.len());
    assert_eq!(
        stats.open_count,
        filtered.iter().filter(|t| t.status_name == Status::Open).count()
    );
    assert_eq!(
        stats.critical_count,
        filtered
            .iter()
            .filter(|t| t.priority_name == Priority::Critical)
            .count()
    );
    assert!(stats.open_count + stats.in_progress_count <= stats.total_count);
}

#[test]
fn test_csv_export_of_sorted_view() {
    let batch = seeded_batch(10, 31);
    let sorted = apply_sorting(&batch, "Key A → Z");
    let csv = export_to_csv(&sorted).expect("export succeeds");

    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let keys: Vec<String> = reader
        .records()
        .map(|r| r.expect("valid record")[0].to_string())
        .collect();
    let expected: Vec<String> = sorted.iter().map(|t| t.key.clone()).collect();
    assert_eq!(keys, expected);
}
