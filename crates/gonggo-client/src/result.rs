use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Failure category attached to an unsuccessful [`ApiResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    Connect,
    Status(u16),
    Decode,
    Transport,
    Remote,
}

impl ErrorKind {
    /// Server-side failure (HTTP 5xx).
    #[must_use]
    pub fn is_server_error(self) -> bool {
        matches!(self, Self::Status(code) if code >= 500)
    }
}

/// Uniform result of every client operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl<T> ApiResult<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }

    #[must_use]
    pub fn fail(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            kind: Some(kind),
        }
    }

    /// Convert back into a `Result`, keeping the error message and kind.
    ///
    /// # Errors
    ///
    /// Returns `(kind, message)` when the call failed or carried no data.
    pub fn into_result(self) -> Result<T, (ErrorKind, String)> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err((
                self.kind.unwrap_or(ErrorKind::Remote),
                self.error.unwrap_or_else(|| "unknown error".to_owned()),
            )),
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        ApiResult {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            kind: self.kind,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

impl<T> From<Result<T, ClientError>> for ApiResult<T> {
    fn from(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.kind(), e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_result_has_no_error() {
        let r = ApiResult::ok(3);
        assert!(r.success);
        assert_eq!(r.data, Some(3));
        assert!(r.error.is_none());
        assert!(r.kind.is_none());
    }

    #[test]
    fn from_client_error_keeps_kind_and_message() {
        let r: ApiResult<()> = Err(ClientError::Status {
            status: 500,
            body: "boom".into(),
        })
        .into();
        assert!(!r.success);
        assert_eq!(r.kind, Some(ErrorKind::Status(500)));
        assert_eq!(r.error_message(), "HTTP error! status: 500");
    }

    #[test]
    fn into_result_without_data_is_error() {
        let r: ApiResult<u8> = ApiResult {
            success: true,
            data: None,
            error: None,
            kind: None,
        };
        let (kind, msg) = r.into_result().unwrap_err();
        assert_eq!(kind, ErrorKind::Remote);
        assert_eq!(msg, "unknown error");
    }

    #[test]
    fn server_error_detection() {
        assert!(ErrorKind::Status(503).is_server_error());
        assert!(!ErrorKind::Status(404).is_server_error());
        assert!(!ErrorKind::Timeout.is_server_error());
    }

    #[test]
    fn serializes_without_empty_fields() {
        let json = serde_json::to_string(&ApiResult::ok("x")).unwrap();
        assert_eq!(json, r#"{"success":true,"data":"x"}"#);
    }

    #[test]
    fn map_preserves_failure() {
        let r: ApiResult<u8> = ApiResult::fail(ErrorKind::Timeout, "late");
        let mapped = r.map(|v| v * 2);
        assert!(!mapped.success);
        assert_eq!(mapped.kind, Some(ErrorKind::Timeout));
    }
}
