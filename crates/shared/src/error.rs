use thiserror::Error;

/// Failure of a single catalog call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl CatalogError {
    /// Maps a non-success HTTP status and its (possibly empty) message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => Self::Validation(if message.is_empty() {
                format!("request rejected with status {status}")
            } else {
                message
            }),
            _ => Self::Server { status, message },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_and_unprocessable_are_validation_failures() {
        assert_eq!(
            CatalogError::from_status(400, "name is required"),
            CatalogError::Validation("name is required".to_string())
        );
        assert!(matches!(
            CatalogError::from_status(422, ""),
            CatalogError::Validation(message) if message.contains("422")
        ));
    }

    #[test]
    fn other_statuses_are_server_failures() {
        let err = CatalogError::from_status(503, "down");
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "server returned 503: down");
        assert_eq!(CatalogError::from_status(404, "").status(), Some(404));
    }
}
