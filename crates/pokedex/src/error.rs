#[derive(thiserror::Error, Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Request to {url} failed: HTTP {status}")]
    Remote { status: u16, url: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },
}
