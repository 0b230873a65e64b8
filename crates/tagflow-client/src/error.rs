use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status {status}")]
    Status { status: u16 },

    #[error("graphql error: {0}")]
    Graphql(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Whether a retry has any chance of succeeding.
    ///
    /// Transient: rate limiting, server-side errors, connection failures
    /// and timeouts. GraphQL-level errors and malformed bodies are not;
    /// the server answered and will answer the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Status { status } => matches!(status, 429 | 500 | 502 | 503 | 504),
            ClientError::Http(e) => e.is_timeout() || e.is_connect(),
            ClientError::Graphql(_) | ClientError::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_statuses() {
        for status in [429, 500, 502, 503, 504] {
            assert!(ClientError::Status { status }.is_transient(), "{status}");
        }
        for status in [400, 401, 403, 404, 422] {
            assert!(!ClientError::Status { status }.is_transient(), "{status}");
        }
    }

    #[test]
    fn application_errors_are_not_transient() {
        assert!(!ClientError::Graphql("boom".into()).is_transient());
        assert!(!ClientError::Decode("truncated".into()).is_transient());
    }
}
