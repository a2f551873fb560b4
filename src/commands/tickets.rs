//! Ticket board command
//!
//! Drives the session's [`TicketState`] with events built from the command
//! line (batch size, filters, search, sort) and prints the resulting view.

use crate::cli::TicketArgs;
use crate::error::Result;
use crate::session::{TicketEvent, TicketState, TicketView};
use crate::tickets::export::{format_date, write_csv_file};
use crate::tickets::manager::{SortOrder, TicketStatistics};
use crate::tickets::model::{Priority, Status, TicketRecord};
use colored::{ColoredString, Colorize};
use prettytable::{format, Table};
use serde::Serialize;

const TITLE_WIDTH: usize = 40;

/// JSON shape of `tickets --json`
#[derive(Debug, Serialize)]
struct BoardOutput<'a> {
    sort: &'a str,
    batch_size: usize,
    statistics: &'a TicketStatistics,
    tickets: &'a [TicketRecord],
}

/// Run the `tickets` command
///
/// # Errors
///
/// Returns error if generation fails, JSON serialization fails or the CSV
/// file cannot be written
pub fn run_tickets(state: &mut TicketState, args: TicketArgs) -> Result<()> {
    let view = build_view(state, &args)?;

    if SortOrder::from_label(&args.sort).is_none() {
        eprintln!(
            "{}",
            format!("Unknown sort order '{}'; showing tickets unsorted.", args.sort).yellow()
        );
    }

    if let Some(path) = &args.export_csv {
        write_csv_file(&view.tickets, path)?;
        eprintln!(
            "{}",
            format!("Exported {} tickets to {}", view.tickets.len(), path.display()).green()
        );
    }

    if args.json {
        let output = BoardOutput {
            sort: &view.sort_label,
            batch_size: view.batch_size,
            statistics: &view.statistics,
            tickets: &view.tickets,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_statistics(&view);

    if view.tickets.is_empty() {
        println!("{}", "No tickets match the current filters.".yellow());
        return Ok(());
    }

    board_table(&view.tickets).printstd();

    if args.details {
        for ticket in &view.tickets {
            print_details(ticket);
        }
    }

    Ok(())
}

/// Replay the command-line selections as board events
///
/// `--count` becomes a batch-size change; without it the current batch is
/// rendered (generating it on first use). With no filter or search flags
/// the board's filters are cleared.
///
/// # Errors
///
/// Returns error if the batch cannot be generated
pub fn build_view(state: &mut TicketState, args: &TicketArgs) -> Result<TicketView> {
    match args.count {
        Some(count) => state.handle(TicketEvent::ChangeCount(count))?,
        None => state.handle(TicketEvent::Refresh)?,
    };

    let unfiltered = args.projects.is_empty()
        && args.priorities.is_empty()
        && args.statuses.is_empty()
        && args.search.is_none();
    if unfiltered {
        state.handle(TicketEvent::ClearFilters)?;
    } else {
        state.handle(TicketEvent::ApplyFilters {
            projects: args.projects.clone(),
            priority: args.priorities.clone(),
            status: args.statuses.clone(),
        })?;
        if let Some(search) = &args.search {
            state.handle(TicketEvent::Search(search.clone()))?;
        }
    }

    state.handle(TicketEvent::ChangeSort(args.sort.clone()))
}

fn print_statistics(view: &TicketView) {
    let stats = &view.statistics;
    println!();
    println!(
        "{} {}   {} {}   {} {}   {} {}   {} {} of {}",
        "Open:".bold(),
        stats.open_count,
        "In Progress:".bold(),
        stats.in_progress_count,
        "Critical:".bold(),
        stats.critical_count.to_string().red(),
        "Major:".bold(),
        stats.major_count.to_string().yellow(),
        "Showing:".bold(),
        stats.total_count,
        view.batch_size
    );
    println!("{} {}", "Sorted by:".bold(), view.sort_label);
}

/// Render tickets as a bordered table
pub fn board_table(tickets: &[TicketRecord]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "Key".bold(),
        "Title".bold(),
        "St".bold(),
        "Pr".bold(),
        "Project".bold(),
        "Created".bold(),
        "Updated".bold(),
        "Components".bold()
    ]);

    for ticket in tickets {
        let title = if ticket.title.chars().count() > TITLE_WIDTH {
            let cut: String = ticket.title.chars().take(TITLE_WIDTH - 3).collect();
            format!("{}...", cut)
        } else {
            ticket.title.clone()
        };

        table.add_row(prettytable::row![
            ticket.key.cyan(),
            title,
            status_badge(ticket.status_name),
            priority_badge(ticket.priority_name),
            ticket.project_key,
            format_date(&ticket.created),
            format_date(&ticket.last_updated),
            ticket.components.join(", ")
        ]);
    }

    table
}

fn priority_badge(priority: Priority) -> ColoredString {
    match priority {
        Priority::Critical => priority.code().red().bold(),
        Priority::Major => priority.code().yellow(),
        Priority::Minor | Priority::Unknown => priority.code().green(),
    }
}

fn status_badge(status: Status) -> ColoredString {
    match status {
        Status::Resolved => status.code().dimmed(),
        _ => status.code().normal(),
    }
}

fn print_details(ticket: &TicketRecord) {
    println!();
    println!(
        "{} {} [{} / {}]",
        ticket.key.cyan().bold(),
        ticket.title.bold(),
        ticket.status_name,
        ticket.priority_name
    );
    println!("  {} {} ({})", "Project:".bold(), ticket.project_name, ticket.project_key);
    println!("  {} {}", "Link:".bold(), ticket.url);
    if !ticket.description.is_empty() {
        println!("  {} {}", "Description:".bold(), ticket.description);
    }
    for comment in &ticket.comments {
        println!("  {} {}", "Comment:".bold(), comment.content);
    }

    let answer = &ticket.answer;
    println!(
        "  {} {} ({}, {}, {})",
        "Answer:".bold(),
        answer.answer_category.green(),
        answer.planned_release,
        answer.included_build,
        answer.answer_code
    );
    println!("  {} {}", "Summary:".bold(), answer.summary_of_analysis);
    println!("  {}", answer.answer_text);
}
