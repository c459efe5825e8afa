use thiserror::Error;

/// Fallback message when the provider gives no reason for an empty result.
pub const NO_ROUTE_FOUND: &str = "no route found";

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Routing unavailable: {0}")]
    RoutingUnavailable(String),
    #[error("Directions provider error: {0}")]
    ProviderError(String),
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON Deserialization Error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Polyline Decoding Error: {0}")]
    PolylineDecode(String),
}

impl RouteError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RouteError::InvalidInput(message.into())
    }

    /// Whether a failed directions attempt may be absorbed and retried.
    /// Bad input fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RouteError::InvalidInput(_))
    }

    /// The underlying message without the variant prefix, used when a
    /// provider failure is re-surfaced as `RoutingUnavailable`.
    pub fn provider_message(&self) -> String {
        match self {
            RouteError::RoutingUnavailable(msg)
            | RouteError::ProviderError(msg)
            | RouteError::PolylineDecode(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RouteError>;
