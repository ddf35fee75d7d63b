use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use surveyrpc_core::AppError;

use crate::dto::{INTERNAL_ERROR, PARSE_ERROR, RpcResponse};

/// Transport-level failure, raised before a call reaches the services.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, PARSE_ERROR),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, INTERNAL_ERROR),
            AppError::Conflict(_) => (StatusCode::CONFLICT, INTERNAL_ERROR),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR),
        };

        let payload = Json(RpcResponse::failure(Value::Null, code, self.0.to_string()));

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use surveyrpc_core::AppError;

    use super::ApiError;

    #[test]
    fn fault_categories_map_to_http_status() {
        let cases = [
            (AppError::Validation("bad".to_owned()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("gone".to_owned()), StatusCode::NOT_FOUND),
            (AppError::Conflict("race".to_owned()), StatusCode::CONFLICT),
            (
                AppError::Internal("boom".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).into_response().status(), expected);
        }
    }
}
