use serde::{Deserialize, Serialize};

/// Uniform JSON envelope for every endpoint. `code` 0 means success;
/// non-zero values come from `utils::error_codes`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}
