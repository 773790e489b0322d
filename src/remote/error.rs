//! Remote gateway error types.

use thiserror::Error;

/// What a single HTTP exchange with the backend can produce. Transport
/// problems and server rejections stay distinct so the coordinator can
/// decide between "offline" handling and surfacing the server's answer.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Could not reach server: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server rejected the request: {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// True for failures where no well-formed answer arrived at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Timeout)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(ApiError::Timeout.is_transport());
        assert!(ApiError::Transport("refused".to_string()).is_transport());
        assert!(!ApiError::Server {
            status: 401,
            message: "no".to_string()
        }
        .is_transport());
        assert!(!ApiError::InvalidResponse("bad json".to_string()).is_transport());
    }

    #[test]
    fn test_status_only_on_server_errors() {
        let err = ApiError::Server {
            status: 409,
            message: "exists".to_string(),
        };
        assert_eq!(err.status(), Some(409));
        assert_eq!(ApiError::Timeout.status(), None);
    }
}
