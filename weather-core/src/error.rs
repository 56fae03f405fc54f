use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single outbound call to the weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, TLS or timeout failure. Timeouts are not distinguished.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The body arrived but is missing fields the reshaping needs.
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Request-level error taxonomy. Each variant maps to exactly one client status.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Could not find location for city: {0}")]
    LocationNotFound(String),

    #[error("{service} service unavailable")]
    UpstreamUnavailable {
        service: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("Weather API key is not configured")]
    MissingConfiguration,

    /// Carries the detail for logs only; clients get a generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WeatherError {
    /// Classify a failed mandatory call. Malformed bodies are our problem, not
    /// the provider being down.
    pub fn from_provider(service: &'static str, err: ProviderError) -> Self {
        match err {
            ProviderError::Decode { .. } => WeatherError::Internal(err.to_string()),
            other => WeatherError::UpstreamUnavailable {
                service,
                source: other,
            },
        }
    }
}
