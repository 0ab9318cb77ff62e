//! Caller-facing response shape
//!
//! Every operation reports `{ success, data?, error?, code? }`.

use serde::Serialize;

use crate::error::StudioError;
use crate::error::handlers::{error_code, handle_error};

#[derive(Debug, Serialize)]
pub struct Response<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T: Serialize> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    /// A failed operation that still carries a payload (e.g. attempted mounts)
    pub fn failed(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(message.into()),
            code: None,
        }
    }

    pub fn err(error: &StudioError) -> Self {
        handle_error(error);
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            code: Some(error_code(error)),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!("{{\"success\":false,\"error\":\"serialize: {}\"}}", e)
        })
    }
}

impl<T: Serialize, E: Into<StudioError>> From<Result<T, E>> for Response<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Response::ok(data),
            Err(e) => Response::err(&e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;

    #[test]
    fn error_response_carries_code() {
        let resp: Response<()> = Err::<(), _>(SyncError::NasNotAvailable).into();
        let json = resp.to_json();
        assert!(json.contains("\"success\": false"));
        assert!(json.contains("NAS_NOT_AVAILABLE"));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn ok_response_omits_error() {
        let json = Response::ok(3).to_json();
        assert!(json.contains("\"data\": 3"));
        assert!(!json.contains("error"));
    }
}
