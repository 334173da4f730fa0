use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Warehouse API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Credential error: {message}")]
    Auth { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<url::ParseError> for SetupError {
    fn from(err: url::ParseError) -> Self {
        SetupError::Config {
            message: format!("Invalid URL: {}", err),
        }
    }
}
