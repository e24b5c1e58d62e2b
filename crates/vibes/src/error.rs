use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Application error type that wraps `anyhow::Error`.
///
/// This allows using `?` on functions that return `Result<_, anyhow::Error>`
/// to automatically convert them into `Result<_, AppError>`.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Application error");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "internal server error",
                "details": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
