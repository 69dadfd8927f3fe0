/// Every failure a repository call can produce, normalized so callers never
/// branch on transport detail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (unreachable, timeout).
    #[error("network error: {message}")]
    Transport { message: String, timed_out: bool },

    /// The backend answered with a non-success status.
    #[error("request failed ({status}): {message}")]
    Remote { status: u16, message: String },

    /// The backend answered 2xx but the body was not a valid case payload.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout() -> Self {
        Self::Transport {
            message: "request timed out".to_string(),
            timed_out: true,
        }
    }

    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// HTTP status, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode(_) => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message, .. } | Self::Remote { message, .. } => message,
            Self::Decode(message) => message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { timed_out: true, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout()
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::remote(status.as_u16(), err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

impl From<clinicase_api::WireError> for ClientError {
    fn from(err: clinicase_api::WireError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_only_present_for_remote_failures() {
        assert_eq!(ClientError::remote(503, "down").status(), Some(503));
        assert_eq!(ClientError::transport("refused").status(), None);
        assert_eq!(ClientError::Decode("bad".into()).status(), None);
    }

    #[test]
    fn not_found_and_timeout_classification() {
        assert!(ClientError::remote(404, "Case not found").is_not_found());
        assert!(!ClientError::remote(500, "boom").is_not_found());
        assert!(ClientError::timeout().is_timeout());
        assert!(!ClientError::transport("refused").is_timeout());
    }

    #[test]
    fn display_includes_status_and_message() {
        let err = ClientError::remote(500, "Failed to summarize case");
        assert_eq!(
            err.to_string(),
            "request failed (500): Failed to summarize case"
        );
        assert_eq!(err.message(), "Failed to summarize case");
    }
}
