use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    routes::models::{CreateFaqRequest, Faq, UpdateFaqRequest},
    services::faq as faq_service,
    util::{require_admin, require_bearer},
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct FaqsResponse {
    pub faqs: Vec<Faq>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FaqResponse {
    pub faq: Faq,
}

#[utoipa::path(
    get,
    path = "/api/faq/",
    tag = "Faq",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Published FAQ entries (all entries for admins)", body = FaqsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_faqs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FaqsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let faqs = faq_service::list_faqs(state.db_pool(), &user)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(FaqsResponse { faqs }))
}

#[utoipa::path(
    post,
    path = "/api/faq/",
    tag = "Faq",
    security(("bearerAuth" = [])),
    request_body = CreateFaqRequest,
    responses(
        (status = 201, description = "FAQ entry created", body = FaqResponse),
        (status = 400, description = "Invalid FAQ payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_faq(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateFaqRequest>,
) -> Result<(StatusCode, Json<FaqResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    require_admin(&user)?;

    let faq = faq_service::create_faq(state.db_pool(), req)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(FaqResponse { faq })))
}

#[utoipa::path(
    get,
    path = "/api/faq/{faq_id}",
    tag = "Faq",
    security(("bearerAuth" = [])),
    params(
        ("faq_id" = String, Path, description = "FAQ public identifier")
    ),
    responses(
        (status = 200, description = "FAQ entry fetched", body = FaqResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "FAQ entry not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_faq(
    State(state): State<AppState>,
    Path(faq_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<FaqResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let faq = faq_service::get_faq(state.db_pool(), &user, &faq_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(FaqResponse { faq }))
}

#[utoipa::path(
    put,
    path = "/api/faq/{faq_id}",
    tag = "Faq",
    security(("bearerAuth" = [])),
    params(
        ("faq_id" = String, Path, description = "FAQ public identifier")
    ),
    request_body = UpdateFaqRequest,
    responses(
        (status = 200, description = "FAQ entry updated", body = FaqResponse),
        (status = 400, description = "Invalid update payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse),
        (status = 404, description = "FAQ entry not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_faq(
    State(state): State<AppState>,
    Path(faq_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateFaqRequest>,
) -> Result<Json<FaqResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    require_admin(&user)?;

    let faq = faq_service::update_faq(state.db_pool(), &faq_id, req)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(FaqResponse { faq }))
}

#[utoipa::path(
    delete,
    path = "/api/faq/{faq_id}",
    tag = "Faq",
    security(("bearerAuth" = [])),
    params(
        ("faq_id" = String, Path, description = "FAQ public identifier")
    ),
    responses(
        (status = 200, description = "FAQ entry deleted"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse),
        (status = 404, description = "FAQ entry not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_faq(
    State(state): State<AppState>,
    Path(faq_id): Path<String>,
    headers: HeaderMap,
) -> Result<(), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    require_admin(&user)?;

    faq_service::delete_faq(state.db_pool(), &faq_id)
        .await
        .map_err(ApiError::from)?;

    Ok(())
}
