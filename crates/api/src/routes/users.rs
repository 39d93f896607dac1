use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use agora_auth::{Role, UpdateProfile};

use crate::{
    routes::auth::{UserProfileResponse, UserResponse},
    util::{require_admin, require_bearer},
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[utoipa::path(
    get,
    path = "/api/users/",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "All accounts, newest first", body = UsersResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UsersResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    require_admin(&user)?;

    let users = state
        .authenticator()
        .list_users()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfileResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    Ok(Json(UserProfileResponse { user: user.into() }))
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = "Users",
    security(("bearerAuth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfileResponse),
        (status = 400, description = "Nickname violates policy", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let updated = state
        .authenticator()
        .update_profile(
            user.id,
            UpdateProfile {
                nickname: payload.nickname,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UserProfileResponse {
        user: updated.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/users/{user_id}/role",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(
        ("user_id" = String, Path, description = "User public identifier")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role assigned", body = UserProfileResponse),
        (status = 400, description = "Unknown role", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    require_admin(&user)?;

    if !matches!(payload.role.as_str(), "admin" | "manager" | "user") {
        return Err(ApiError::bad_request("유효하지 않은 역할입니다."));
    }

    let updated = state
        .authenticator()
        .update_role(&user_id, Role::from(payload.role.as_str()))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UserProfileResponse {
        user: updated.into(),
    }))
}
