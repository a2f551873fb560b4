//! Ticket board
//!
//! - [`model`] defines the typed ticket record
//! - [`generator`] produces synthetic batches
//! - [`manager`] filters, sorts and counts a batch
//! - [`export`] renders CSV and display helpers

pub mod export;
pub mod generator;
pub mod manager;
pub mod model;

pub use export::{export_to_csv, format_date};
pub use generator::TicketGenerator;
pub use manager::{
    apply_filters, apply_sorting, calculate_statistics, normalize_search_text, SortOrder,
    TicketFilters, TicketStatistics,
};
pub use model::{Priority, Status, TicketAnswer, TicketComment, TicketRecord};
