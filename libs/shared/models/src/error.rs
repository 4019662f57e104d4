use thiserror::Error;

/// Client-side error taxonomy. Every variant carries a human-readable message
/// suitable for direct display; the UI never branches on status codes.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// The message a form or toast should show for this failure.
    pub fn display_message(&self) -> String {
        match self {
            ClientError::Auth(msg)
            | ClientError::NotFound(msg)
            | ClientError::Validation(msg)
            | ClientError::Api(msg) => msg.clone(),
            ClientError::Network(_) => "Unable to reach the server".to_string(),
            ClientError::Decode(_) => "Unexpected response from the server".to_string(),
        }
    }
}
