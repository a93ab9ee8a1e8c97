use thiserror::Error;

pub type Result<T> = std::result::Result<T, PagerError>;

/// Construction-time failures. Runtime conditions (zero-size viewport,
/// out-of-range `set_page`, arbitration races) are absorbed locally and never
/// surface as errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PagerError {
    #[error("either a page component or a page render function is required")]
    MissingPageContent,

    #[error("invalid index bounds: min {min} is greater than max {max}")]
    InvalidBounds { min: i64, max: i64 },

    #[error("invalid pager configuration: {message}")]
    InvalidConfig { message: String },
}

impl PagerError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PagerError;

    #[test]
    fn bounds_error_names_both_ends() {
        let error = PagerError::InvalidBounds { min: 4, max: -1 };
        assert_eq!(
            error.to_string(),
            "invalid index bounds: min 4 is greater than max -1"
        );
    }

    #[test]
    fn invalid_constructor_wraps_message() {
        let error = PagerError::invalid("bounce_pct must be within [0, 1]");
        assert!(matches!(error, PagerError::InvalidConfig { .. }));
        assert!(error.to_string().ends_with("bounce_pct must be within [0, 1]"));
    }
}
