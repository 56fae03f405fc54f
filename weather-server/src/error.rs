use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use weather_core::WeatherError;

/// HTTP face of [`WeatherError`].
#[derive(Debug)]
pub struct ApiError(pub WeatherError);

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            WeatherError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            WeatherError::LocationNotFound(_) => StatusCode::NOT_FOUND,
            WeatherError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            WeatherError::MissingConfiguration | WeatherError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self.0 {
            WeatherError::UpstreamUnavailable { source, .. } => {
                tracing::warn!(error = %source, "upstream call failed");
                ErrorResponse {
                    error: self.0.to_string(),
                    details: Some(source.to_string()),
                }
            }
            WeatherError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    details: None,
                }
            }
            WeatherError::MissingConfiguration => {
                tracing::error!("request refused: API key is not configured");
                ErrorResponse {
                    error: self.0.to_string(),
                    details: None,
                }
            }
            other => ErrorResponse {
                error: other.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
