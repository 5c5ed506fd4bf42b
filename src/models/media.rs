use serde::Deserialize;
use validator::Validate;

/// Image sent inline with a create request.
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    /// Raw base64 or a `data:<mime>;base64,<payload>` URL.
    #[validate(length(min = 1))]
    pub base64: String,
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    pub content_type: Option<String>,
}
