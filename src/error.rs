//! Error types
//!
//! The simulation itself never fails - bad geometry is clamped and impossible
//! spawns are skipped. Errors only come from outside collaborators and from
//! loading configuration.

/// Failure reported by an external collaborator (stats, leaderboard, ...)
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: &'static str, reason: String },

    #[error("{service} rejected request: {reason}")]
    Rejected { service: &'static str, reason: String },
}

impl CollaboratorError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            reason: reason.into(),
        }
    }

    pub fn rejected(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            service,
            reason: reason.into(),
        }
    }

    /// Name of the collaborator that failed
    pub fn service(&self) -> &'static str {
        match self {
            Self::Unavailable { service, .. } | Self::Rejected { service, .. } => service,
        }
    }
}

/// Configuration loading / validation errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_error_display() {
        let err = CollaboratorError::unavailable("stats", "timeout");
        assert_eq!(err.to_string(), "stats unavailable: timeout");
        assert_eq!(err.service(), "stats");

        let err = CollaboratorError::rejected("leaderboard", "score too high");
        assert_eq!(err.to_string(), "leaderboard rejected request: score too high");
    }

    #[test]
    fn test_config_error_from_json() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: ConfigError = parse.unwrap_err().into();
        assert!(err.to_string().starts_with("Settings JSON error"));
    }
}
