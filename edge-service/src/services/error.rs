use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::BadRequest(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthenticated => {
                AppError::Unauthorized(anyhow::anyhow!("User not authenticated"))
            }
            ServiceError::BadRequest(e) => AppError::BadRequest(anyhow::anyhow!(e)),
            ServiceError::Forbidden(e) => AppError::Forbidden(anyhow::anyhow!(e)),
            ServiceError::NotFound(e) => AppError::NotFound(anyhow::anyhow!(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_error_kinds_map_to_http_status() {
        assert_eq!(status_of(ServiceError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(ServiceError::BadRequest("Organization ID is required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::Forbidden("no access".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ServiceError::NotFound("Exit node not found".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ServiceError::Internal(anyhow::anyhow!("pool timed out"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
