use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pager error: {0}")]
    Pager(#[from] infipage_core::PagerError),

    #[error("invalid scenario: {message}")]
    InvalidScenario { message: String },

    #[error("unknown pager: {name}")]
    UnknownPager { name: String },

    #[error("scenario file does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("{message}")]
    Exit { code: i32, message: String },
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exit { code, .. } => *code,
            Self::InvalidScenario { .. } | Self::UnknownPager { .. } => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Self::Exit {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidScenario {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unknown_pager(name: impl Into<String>) -> Self {
        Self::UnknownPager { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use infipage_core::PagerError;

    use super::HarnessError;

    #[test]
    fn exit_constructor_preserves_code_and_message() {
        let error = HarnessError::exit(42, "golden mismatch");
        assert_eq!(error.exit_code(), 42);
        assert_eq!(error.to_string(), "golden mismatch");
    }

    #[test]
    fn scenario_errors_exit_with_usage_code() {
        assert_eq!(HarnessError::invalid("no pagers").exit_code(), 2);
        assert_eq!(HarnessError::unknown_pager("feed").exit_code(), 2);
    }

    #[test]
    fn pager_errors_are_wrapped() {
        let error = HarnessError::from(PagerError::MissingPageContent);
        assert_eq!(error.exit_code(), 1);
        assert!(error.to_string().starts_with("pager error:"));
    }
}
