use crate::chat::{ChatHistory, ChatMessage, Role};
use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use prettytable::{format, Table};

const PREVIEW_CHARS: usize = 80;

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let history = ChatHistory::new(config.storage.history_path.clone());

    match command {
        HistoryCommand::Show => {
            let messages = history.load();

            if messages.is_empty() {
                println!("{}", "No chat history found.".yellow());
                return Ok(());
            }

            println!("\nChat History ({}):", history.path().display());
            history_table(&messages).printstd();
            println!();
        }
        HistoryCommand::Clear => {
            history.clear();
            println!("{}", "Chat history cleared.".green());
        }
    }

    Ok(())
}

/// Render a transcript as a bordered table, one row per message
pub fn history_table(messages: &[ChatMessage]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row!["#".bold(), "Role".bold(), "Message".bold()]);

    for (idx, message) in messages.iter().enumerate() {
        let role = match message.role {
            Role::User => "user".cyan(),
            Role::Assistant => "assistant".green(),
        };
        table.add_row(prettytable::row![idx + 1, role, preview(&message.content)]);
    }

    table
}

fn preview(content: &str) -> String {
    let single_line = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() > PREVIEW_CHARS {
        let cut: String = single_line.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        single_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_preview_collapses_whitespace() {
        assert_eq!(preview("line one\n\nline   two"), "line one line two");
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let text = "é".repeat(200);
        let shown = preview(&text);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_history_table_has_header_and_rows() {
        let table = history_table(&[ChatMessage::seed(), ChatMessage::user("hi")]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_handle_history_clear_then_show() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.history_path = dir.path().join("chat_history");

        ChatHistory::new(config.storage.history_path.clone()).save(&[ChatMessage::user("x")]);
        handle_history(&config, HistoryCommand::Clear).unwrap();
        assert!(ChatHistory::new(config.storage.history_path.clone())
            .load()
            .is_empty());
        handle_history(&config, HistoryCommand::Show).unwrap();
    }
}
