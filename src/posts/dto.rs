use serde::Deserialize;

/// Body shared by new posts and new comments.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextRequest {
    pub text: Option<String>,
}
