use crate::result::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{operation} request timed out: the server did not respond")]
    Timeout { operation: &'static str },

    #[error("cannot connect to the {operation} server, check that it is running")]
    Connect {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty response from {operation}")]
    EmptyResponse { operation: &'static str },

    #[error("invalid upload: {0}")]
    Upload(String),

    #[error("{0}")]
    Remote(String),
}

impl ClientError {
    /// Classify a transport error raised while sending or reading a request.
    pub(crate) fn from_transport(operation: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { operation }
        } else if err.is_connect() {
            Self::Connect {
                operation,
                source: err,
            }
        } else {
            Self::Http(err)
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Connect { .. } => ErrorKind::Connect,
            Self::Status { status, .. } => ErrorKind::Status(*status),
            Self::Json(_) => ErrorKind::Decode,
            Self::Http(e) if e.is_decode() => ErrorKind::Decode,
            Self::Http(_) | Self::Upload(_) => ErrorKind::Transport,
            Self::EmptyResponse { .. } | Self::Remote(_) => ErrorKind::Remote,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_names_code() {
        let err = ClientError::Status {
            status: 502,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 502");
        assert_eq!(err.kind(), ErrorKind::Status(502));
    }

    #[test]
    fn timeout_message_mentions_timeout() {
        let err = ClientError::Timeout {
            operation: "summary",
        };
        assert!(err.to_string().contains("timed out"));
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn remote_error_passes_message_through() {
        let err = ClientError::Remote("model overloaded".into());
        assert_eq!(err.to_string(), "model overloaded");
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn json_error_is_decode_kind() {
        let err: ClientError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
