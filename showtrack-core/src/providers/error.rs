#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found")]
    NotFound,

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Failures a later retry may plausibly get past.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::RateLimited | ProviderError::Timeout => true,
            ProviderError::Network(_) | ProviderError::Parse(_) => true,
            ProviderError::Api { status, .. } => *status >= 500,
            ProviderError::NotFound | ProviderError::InvalidApiKey => false,
        }
    }
}
