use axum::{Json, http::StatusCode, response::IntoResponse};
use relay_state::RelayStateError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String },

    #[error(transparent)]
    RelayState(#[from] RelayStateError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": {
                    "message": self.to_string(),
                }
            })),
        )
            .into_response()
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::RelayState(RelayStateError::InvalidValue { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::RelayState(RelayStateError::Redis(_) | RelayStateError::Init { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}
