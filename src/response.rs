use serde::Serialize;

/// Uniform response envelope shared by every route.
///
/// Success bodies are `{"status":"success","message":...,"data":...}`,
/// errors are `{"status":"error","message":...,"data":null}` (see
/// `crate::error::ApiError`).
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(message: &str, data: T) -> Self {
        Self {
            status: "success",
            message: Some(message.to_string()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: &str) -> Self {
        Self {
            status: "success",
            message: Some(message.to_string()),
            data: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            status: "error",
            message: Some(message.to_string()),
            data: None,
        }
    }
}
