//! CSV export and display formatting for tickets

use crate::error::{Result, TicketAssistError};
use crate::tickets::model::{TicketRecord, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;

/// One flattened CSV row
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    key: &'a str,
    title: &'a str,
    description: &'a str,
    status: &'a str,
    priority: &'a str,
    project: &'a str,
    created: String,
    updated: String,
    components: String,
    category: &'a str,
    solution: &'a str,
    planned_release: &'a str,
    build: &'a str,
}

impl<'a> From<&'a TicketRecord> for ExportRow<'a> {
    fn from(ticket: &'a TicketRecord) -> Self {
        Self {
            key: &ticket.key,
            title: &ticket.title,
            description: &ticket.description,
            status: ticket.status_name.as_str(),
            priority: ticket.priority_name.as_str(),
            project: &ticket.project_name,
            created: format_date(&ticket.created),
            updated: format_date(&ticket.last_updated),
            components: ticket.components.join(", "),
            category: &ticket.answer.answer_category,
            solution: &ticket.answer.answer_text,
            planned_release: &ticket.answer.planned_release,
            build: &ticket.answer.included_build,
        }
    }
}

/// Shorten a ticket timestamp to `YYYY-MM-DD`
///
/// Strings that do not match the ticket timestamp layout are returned as-is.
pub fn format_date(date: &str) -> String {
    NaiveDateTime::parse_from_str(date, TIMESTAMP_FORMAT)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Render tickets as CSV with a header row
///
/// # Errors
///
/// Returns an error if the CSV writer fails, which only happens on
/// serialization bugs since the output is held in memory.
pub fn export_to_csv(tickets: &[TicketRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for ticket in tickets {
        writer.serialize(ExportRow::from(ticket))?;
    }

    if tickets.is_empty() {
        writer.write_record([
            "key",
            "title",
            "description",
            "status",
            "priority",
            "project",
            "created",
            "updated",
            "components",
            "category",
            "solution",
            "planned_release",
            "build",
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TicketAssistError::Export(e.to_string()))?;
    let csv = String::from_utf8(bytes).map_err(|e| TicketAssistError::Export(e.to_string()))?;
    Ok(csv)
}

/// Write the CSV export of `tickets` to `path`
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written
pub fn write_csv_file(tickets: &[TicketRecord], path: &Path) -> Result<()> {
    let csv = export_to_csv(tickets)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, csv)?;
    tracing::info!("Exported {} tickets to {}", tickets.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_ticket;
    use crate::tickets::model::{Priority, Status};
    use tempfile::TempDir;

    const HEADER: &str = "key,title,description,status,priority,project,created,updated,components,category,solution,planned_release,build";

    #[test]
    fn test_format_date_shortens_timestamp() {
        assert_eq!(format_date("2024-03-10T09:15:00.000+0200"), "2024-03-10");
    }

    #[test]
    fn test_format_date_keeps_unparsable_input() {
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_export_header_and_rows() {
        let mut ticket = sample_ticket("PCTR-81234", Priority::Critical, Status::InProgress);
        ticket.components = vec!["Compass".to_string(), "Traffic Control".to_string()];
        let csv = export_to_csv(&[ticket]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(HEADER));
        let row = lines.next().unwrap();
        assert!(row.starts_with("PCTR-81234,"));
        assert!(row.contains("In Progress"));
        assert!(row.contains("\"Compass, Traffic Control\""));
        assert!(row.contains("2024-03-10"));
    }

    #[test]
    fn test_export_empty_has_header_only() {
        let csv = export_to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), HEADER);
    }

    #[test]
    fn test_write_csv_file_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("tickets.csv");
        let ticket = sample_ticket("PCBP-80000", Priority::Minor, Status::Open);
        write_csv_file(&[ticket], &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("PCBP-80000"));
    }
}
