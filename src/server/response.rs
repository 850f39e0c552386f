use serde::Serialize;
use serde_json::Value;

/// Error envelope returned on every non-200 response:
/// `{"error": {"message": ..., "type": "invalid_request_error"}}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorInfo,
}

#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

pub const TYPE_INVALID_REQUEST_ERROR: &str = "invalid_request_error";

pub const INTERNAL_SERVER_ERROR: &str = "An internal error occurred.";

impl ApiError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError {
            error: ErrorInfo {
                message: message.into(),
                error_type: TYPE_INVALID_REQUEST_ERROR.to_string(),
            },
        }
    }

    pub fn internal() -> Self {
        Self::invalid_request(INTERNAL_SERVER_ERROR)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Null)
    }
}

pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Serialize a response body. Requests from curl get a pretty-printed
/// document with a trailing newline so terminal output reads cleanly;
/// everything else gets the compact form.
pub fn encode_body(data: &Value, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
    if pretty {
        let mut encoded = serde_json::to_vec_pretty(data)?;
        encoded.push(b'\n');
        Ok(encoded)
    } else {
        serde_json::to_vec(data)
    }
}

pub fn is_curl(user_agent: &str) -> bool {
    user_agent.starts_with("curl/")
}
