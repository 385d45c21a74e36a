use thiserror::Error;

/// Failures raised by a [`crate::transport::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected http status: {status}, body: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("invalid credentials: {0}")]
    Credentials(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
}

/// Errors returned by [`crate::client::IdentifierClient`].
#[derive(Debug, Error)]
pub enum IdentifierError {
    /// A required request field was empty, absent or null. Raised before any network call.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl IdentifierError {
    /// Status code of a non-2xx response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            IdentifierError::Transport(TransportError::UnexpectedStatus { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T, E = IdentifierError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_unexpected_status() {
        let err = IdentifierError::from(TransportError::UnexpectedStatus {
            status: 404,
            body: "{\"message\":\"user not found\"}".to_string(),
        });
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("404"));

        assert_eq!(IdentifierError::MissingParameter("userName").status(), None);
        assert_eq!(
            IdentifierError::MissingParameter("userName").to_string(),
            "missing required parameter: userName"
        );
    }
}
