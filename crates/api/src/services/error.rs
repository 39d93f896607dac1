#[derive(Debug)]
pub enum ServiceError {
    NotFound,
    Forbidden(String),
    BadRequest(String),
    Database(sqlx::Error),
}

impl ServiceError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

impl From<ServiceError> for crate::ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => {
                crate::ApiError::not_found("요청한 리소스를 찾을 수 없습니다.")
            }
            ServiceError::Forbidden(msg) => crate::ApiError::forbidden(msg),
            ServiceError::BadRequest(msg) => crate::ApiError::bad_request(msg),
            ServiceError::Database(db_err) => {
                tracing::error!("database error: {}", db_err);
                crate::ApiError::internal_server_error("서버 오류가 발생했습니다.")
            }
        }
    }
}
