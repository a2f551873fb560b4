//! Login against the configured credentials
//!
//! A single username/password pair comes from configuration (file, env or
//! secret files). [`Authenticator`] checks a login attempt against it and
//! [`SessionManager`] records the result in the session's [`AuthState`].

use crate::config::AuthConfig;
use crate::error::{Result, TicketAssistError};
use std::fmt;

/// Result of one login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    MissingPassword,
    MissingUsername,
    InvalidCredentials,
}

impl AuthOutcome {
    /// True only for [`AuthOutcome::Authenticated`]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Convert a failed outcome into an authentication error
    ///
    /// # Errors
    ///
    /// Returns [`TicketAssistError::Authentication`] unless authenticated
    pub fn into_result(self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(TicketAssistError::Authentication(self.to_string()).into())
        }
    }
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Authenticated => "Authenticated",
            Self::MissingPassword => "Please enter password.",
            Self::MissingUsername => "Please enter username.",
            Self::InvalidCredentials => "Invalid Username/Password",
        };
        f.write_str(text)
    }
}

/// Checks login attempts against the configured credentials
#[derive(Clone)]
pub struct Authenticator {
    username: String,
    password: String,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

impl Authenticator {
    /// Build an authenticator for the configured credentials
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Check a login attempt
    ///
    /// Both inputs are trimmed before comparison. On failure a missing
    /// password is reported before a missing username.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticketassist::auth::{AuthOutcome, Authenticator};
    /// use ticketassist::config::AuthConfig;
    ///
    /// let auth = Authenticator::new(&AuthConfig::default());
    /// assert_eq!(auth.verify(" admin ", "admin"), AuthOutcome::Authenticated);
    /// assert_eq!(auth.verify("admin", ""), AuthOutcome::MissingPassword);
    /// ```
    pub fn verify(&self, username: &str, password: &str) -> AuthOutcome {
        let username = username.trim();
        let password = password.trim();

        if username == self.username && password == self.password {
            return AuthOutcome::Authenticated;
        }

        if password.is_empty() {
            AuthOutcome::MissingPassword
        } else if username.is_empty() {
            AuthOutcome::MissingUsername
        } else {
            AuthOutcome::InvalidCredentials
        }
    }
}

/// Login slice of the session context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    logged_in: bool,
    user: Option<String>,
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Name of the logged-in user, if any
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

/// Drives login and logout on an [`AuthState`]
#[derive(Debug)]
pub struct SessionManager<'a> {
    authenticator: &'a Authenticator,
    state: &'a mut AuthState,
}

impl<'a> SessionManager<'a> {
    pub fn new(authenticator: &'a Authenticator, state: &'a mut AuthState) -> Self {
        Self {
            authenticator,
            state,
        }
    }

    /// Attempt a login; the state is updated whatever the outcome
    pub fn login(&mut self, username: &str, password: &str) -> AuthOutcome {
        let outcome = self.authenticator.verify(username, password);
        if outcome.is_authenticated() {
            tracing::info!("User {} logged in", username.trim());
            self.state.logged_in = true;
            self.state.user = Some(username.trim().to_string());
        } else {
            tracing::warn!("Login rejected: {}", outcome);
            self.state.logged_in = false;
            self.state.user = None;
        }
        outcome
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.state.user.take() {
            tracing::info!("User {} logged out", user);
        }
        self.state.logged_in = false;
    }
}
