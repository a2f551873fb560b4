/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `login`    - Credential check before any other command
- `tickets`  - Ticket board
- `chat`     - Interactive chat with the language model
- `history`  - Stored transcript management
*/

// Special commands parser for the chat loop
pub mod special_commands;

// Ticket board command
pub mod tickets;

// Chat history management
pub mod history;

// Login handler
pub mod login {
    //! Login before dispatching a command.
    //!
    //! Credentials come from `--user`/`--password` (or their env variables);
    //! whatever is missing is prompted for on the terminal.

    use crate::auth::{Authenticator, SessionManager};
    use crate::config::Config;
    use crate::error::Result;
    use crate::session::SessionContext;
    use rustyline::DefaultEditor;

    /// Shown when the password has to be typed in; the line editor echoes it
    pub const PASSWORD_PROMPT: &str = "Password (input is visible) : ";

    /// Log the session in, prompting for missing credentials
    ///
    /// The line editor cannot mask input, so the password prompt warns that
    /// the typed password stays visible. Use `--password` or
    /// `TICKETASSIST_PASSWORD` to keep it off the screen.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TicketAssistError::Authentication`] when the credentials
    /// are rejected, or an error if the terminal prompt fails
    pub fn login(
        config: &Config,
        session: &mut SessionContext,
        user: Option<String>,
        password: Option<String>,
    ) -> Result<()> {
        let (user, password) = match (user, password) {
            (Some(user), Some(password)) => (user, password),
            (user, password) => {
                let mut rl = DefaultEditor::new()?;
                let user = match user {
                    Some(user) => user,
                    None => rl.readline("Username : ")?,
                };
                let password = match password {
                    Some(password) => password,
                    None => rl.readline(PASSWORD_PROMPT)?,
                };
                (user, password)
            }
        };

        let authenticator = Authenticator::new(&config.auth);
        SessionManager::new(&authenticator, &mut session.auth)
            .login(&user, &password)
            .into_result()?;

        tracing::info!("Logged in as {}", user.trim());
        Ok(())
    }

}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Loads the stored transcript, then runs a readline loop that streams
    //! each reply to the terminal as it arrives and saves the transcript
    //! after every exchange.

    use crate::chat::{ChatHistory, ChatMessage, LlmService, Role};
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::config::Config;
    use crate::error::Result;
    use crate::session::{ChatController, SessionContext};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::io::Write;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `session` - Session context; only its chat slice is touched
    /// * `model` - Optional override for the configured model
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client or the line editor cannot be created
    pub async fn run_chat(
        config: &Config,
        session: &mut SessionContext,
        model: Option<String>,
    ) -> Result<()> {
        let mut llm = LlmService::new(config.llm.clone())?;
        if let Some(model) = model {
            tracing::debug!("Using model override: {}", model);
            llm.set_model(model);
        }
        let history = ChatHistory::new(config.storage.history_path.clone());
        let mut controller = ChatController::new(&history, &llm, &mut session.chat);

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config.app.title, llm.model());
        print_transcript(&controller.view().messages);

        loop {
            match rl.readline(&format!("{} ", ">>".cyan().bold())) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Exit => break,
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::ShowHistory => print_transcript(&controller.view().messages),
                        SpecialCommand::Clear => {
                            let view = controller.clear();
                            print_notice(view.notice.as_deref());
                            print_transcript(&view.messages);
                        }
                        SpecialCommand::Feedback(kind) => {
                            let view = controller.feedback(kind);
                            print_notice(view.notice.as_deref());
                        }
                        SpecialCommand::None => {
                            print!("{} ", "assistant:".green().bold());
                            let _ = std::io::stdout().flush();
                            let view = controller
                                .submit(trimmed, |token| {
                                    print!("{}", token);
                                    let _ = std::io::stdout().flush();
                                })
                                .await;
                            println!();
                            print_notice(view.notice.as_deref());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome_banner(title: &str, model: &str) {
        println!();
        println!("{} {}", "💬".bold(), title.bold());
        println!("Model: {}", model.cyan());
        println!("Type {} for commands, {} to leave.", "/help".cyan(), "/exit".cyan());
        println!();
    }

    fn print_notice(notice: Option<&str>) {
        if let Some(notice) = notice {
            println!("{}", notice.yellow());
        }
    }

    /// Print each transcript entry with a role prefix
    pub fn print_transcript(messages: &[ChatMessage]) {
        for message in messages {
            let role = match message.role {
                Role::User => "you:".cyan().bold(),
                Role::Assistant => "assistant:".green().bold(),
            };
            println!("{} {}", role, message.content);
        }
    }
}
