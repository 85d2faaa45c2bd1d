//! Copy results.

use thiserror::Error;

/// Why a copy attempt did not succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CopyError {
    /// The caller had no text at all. An empty string is not this.
    #[error("Nothing to copy")]
    NoInput,
    /// The clipboard capability rejected the write. Recovered by the fallback.
    #[error("clipboard write failed: {0}")]
    PrimaryCapability(String),
    /// The copy command ran but reported that nothing was copied.
    #[error("Copy command unsuccessful")]
    FallbackCommandRejected,
    /// Staging the scratch field or running the copy command failed.
    #[error("{}", exception_message(.0))]
    FallbackException(String),
}

fn exception_message(message: &str) -> &str {
    if message.is_empty() {
        "Copy failed"
    } else {
        message
    }
}

/// Result of one copy request, reported back to the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Success,
    Failure { message: String },
}

impl CopyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CopyOutcome::Success)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CopyOutcome::Success => None,
            CopyOutcome::Failure { message } => Some(message),
        }
    }
}

impl From<CopyError> for CopyOutcome {
    fn from(err: CopyError) -> Self {
        CopyOutcome::Failure {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            CopyOutcome::from(CopyError::NoInput).message(),
            Some("Nothing to copy")
        );
        assert_eq!(
            CopyOutcome::from(CopyError::FallbackCommandRejected).message(),
            Some("Copy command unsuccessful")
        );
        assert_eq!(
            CopyOutcome::from(CopyError::FallbackException("xclip exploded".into())).message(),
            Some("xclip exploded")
        );
    }

    #[test]
    fn test_empty_exception_message_falls_back_to_generic_text() {
        let outcome = CopyOutcome::from(CopyError::FallbackException(String::new()));
        assert_eq!(outcome.message(), Some("Copy failed"));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_success_has_no_message() {
        assert!(CopyOutcome::Success.is_success());
        assert_eq!(CopyOutcome::Success.message(), None);
    }
}
