//! Error type shared by every MorningPost crate.

use thiserror::Error;

/// Everything that can halt a cycle. A placeholder without a matching field
/// is not an error and never shows up here.
#[derive(Debug, Error)]
pub enum MorningPostError {
    /// A source adapter could not fetch or parse its page.
    #[error("fetch '{source_name}' failed: {reason}")]
    Fetch { source_name: String, reason: String },

    /// Missing or malformed configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The notifier could not hand a message to a recipient.
    #[error("delivery to '{recipient}' failed: {reason}")]
    Delivery { recipient: String, reason: String },

    /// Bad cron expression or an unrepresentable fire time.
    #[error("schedule error: {0}")]
    Schedule(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MorningPostError {
    pub fn fetch(source_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn delivery(recipient: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Delivery {
            recipient: recipient.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MorningPostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_message_names_source() {
        let err = MorningPostError::fetch("poem", "status: error");
        assert_eq!(err.to_string(), "fetch 'poem' failed: status: error");
    }

    #[test]
    fn test_io_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MorningPostError = io.into();
        assert!(matches!(err, MorningPostError::Io(_)));
    }
}
