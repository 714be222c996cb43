use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Input failed its schema; carries every failing rule's message.
    Invalid(Vec<String>),
    /// A state conflict answered with a bare status and no body.
    Status(StatusCode),
    Store(anyhow::Error),
}

impl AppError {
    pub fn conflict() -> Self {
        Self::Status(StatusCode::CONFLICT)
    }

    pub fn unprocessable() -> Self {
        Self::Status(StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn not_found() -> Self {
        Self::Status(StatusCode::NOT_FOUND)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Invalid(messages) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(messages)).into_response()
            }
            AppError::Status(status) => status.into_response(),
            AppError::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Store(err.into())
    }
}
