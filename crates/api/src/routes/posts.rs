use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    routes::models::{CreatePostRequest, Post, UpdatePostRequest, UpdatePostStatusRequest},
    services::post as post_service,
    util::{require_bearer, require_manager},
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    pub post: Post,
}

#[utoipa::path(
    get,
    path = "/api/posts/",
    tag = "Posts",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Posts visible to the current user", body = PostsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PostsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let posts = post_service::list_posts(state.db_pool(), &user)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(PostsResponse { posts }))
}

#[utoipa::path(
    post,
    path = "/api/posts/",
    tag = "Posts",
    security(("bearerAuth" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid post payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let post = post_service::create_post(state.db_pool(), &user, req)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(PostResponse { post })))
}

#[utoipa::path(
    get,
    path = "/api/posts/{post_id}",
    tag = "Posts",
    security(("bearerAuth" = [])),
    params(
        ("post_id" = String, Path, description = "Post public identifier")
    ),
    responses(
        (status = 200, description = "Post fetched", body = PostResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the author", body = crate::error::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PostResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let post = post_service::get_post(state.db_pool(), &user, &post_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(PostResponse { post }))
}

#[utoipa::path(
    put,
    path = "/api/posts/{post_id}",
    tag = "Posts",
    security(("bearerAuth" = [])),
    params(
        ("post_id" = String, Path, description = "Post public identifier")
    ),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Invalid update payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the author", body = crate::error::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let post = post_service::update_post(state.db_pool(), &user, &post_id, req)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(PostResponse { post }))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}",
    tag = "Posts",
    security(("bearerAuth" = [])),
    params(
        ("post_id" = String, Path, description = "Post public identifier")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the author", body = crate::error::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    headers: HeaderMap,
) -> Result<(), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    post_service::delete_post(state.db_pool(), &user, &post_id)
        .await
        .map_err(ApiError::from)?;

    Ok(())
}

#[utoipa::path(
    put,
    path = "/api/posts/{post_id}/status",
    tag = "Posts",
    security(("bearerAuth" = [])),
    params(
        ("post_id" = String, Path, description = "Post public identifier")
    ),
    request_body = UpdatePostStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = PostResponse),
        (status = 400, description = "Unknown status", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Manager or admin only", body = crate::error::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_post_status(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdatePostStatusRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    require_manager(&user)?;

    let post = post_service::update_status(state.db_pool(), &user, &post_id, &req.status)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(PostResponse { post }))
}
