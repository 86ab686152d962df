use std::fmt;

use thiserror::Error;

/// Identity sent when no user has been chosen.
pub const ANONYMOUS: &str = "anonymous";

/// Maximum length for a user identifier.
const MAX_IDENTITY_LENGTH: usize = 50;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdentityError {
    #[error("User name must not be empty")]
    Empty,

    #[error("User name is too long ({0} characters, max {MAX_IDENTITY_LENGTH})")]
    TooLong(usize),
}

/// The user identifier carried by every API request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: &str) -> Result<Self, IdentityError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_IDENTITY_LENGTH {
            return Err(IdentityError::TooLong(len));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First letter, upper-cased, for avatar-style display.
    pub fn initial(&self) -> char {
        self.0
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::anonymous()
    }
}
