use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use agora_auth::{AuthSession, User};

use crate::{util::require_bearer, ApiError, AppState};

pub const THROTTLED_DETAIL: &str = "요청이 너무 많습니다. 잠시 후 다시 시도해주세요.";

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub nickname: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: String,
}

impl SessionResponse {
    pub fn new(session: AuthSession, user: User) -> Self {
        Self {
            token: session.token,
            user: user.into(),
            expires_at: session.expires_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub nickname: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.public_id,
            email: value.email,
            nickname: value.nickname,
            role: value.role.as_str().to_string(),
            is_active: value.is_active,
            created_at: value.created_at,
            last_login_at: value.last_login_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    pub detail: String,
}

#[utoipa::path(
    post,
    path = "/api/users/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfileResponse),
        (status = 400, description = "Invalid email, nickname, or password", body = crate::error::ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserProfileResponse>), ApiError> {
    if payload.password != payload.password_confirm {
        return Err(ApiError::bad_request("비밀번호가 일치하지 않습니다."));
    }

    let user = state
        .authenticator()
        .signup(&payload.email, &payload.password, &payload.nickname)
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(UserProfileResponse { user: user.into() }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 429, description = "Throttled or locked out", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if !state.login_limiter().check(&payload.email) {
        return Err(ApiError::too_many_requests(THROTTLED_DETAIL));
    }

    let (user, session) = state
        .authenticator()
        .login(&payload.email, &payload.password)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(SessionResponse::new(session, user)))
}

#[utoipa::path(
    post,
    path = "/api/users/logout",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Session deleted", body = LogoutResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let _ = state.authenticate(&token).await?;

    state
        .authenticator()
        .logout(&token)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(LogoutResponse {
        detail: "로그아웃되었습니다.".to_string(),
    }))
}
