use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    routes::models::{ChatMessage, ChatRoom, CreateChatMessageRequest, CreateChatRoomRequest},
    services::chat_room as chat_room_service,
    util::require_bearer,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatRoomsResponse {
    pub chat_rooms: Vec<ChatRoom>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatRoomResponse {
    pub chat_room: ChatRoom,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatMessagesResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatMessageResponse {
    pub message: ChatMessage,
}

#[utoipa::path(
    post,
    path = "/api/chat_room/",
    tag = "Chat Rooms",
    security(("bearerAuth" = [])),
    request_body = CreateChatRoomRequest,
    responses(
        (status = 201, description = "Room created with the creator joined", body = ChatRoomResponse),
        (status = 400, description = "Invalid room payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateChatRoomRequest>,
) -> Result<(StatusCode, Json<ChatRoomResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let chat_room = chat_room_service::create_room(state.db_pool(), &user, req)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(ChatRoomResponse { chat_room })))
}

#[utoipa::path(
    get,
    path = "/api/chat_room/",
    tag = "Chat Rooms",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Rooms joined by the current user (all rooms for admins)", body = ChatRoomsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ChatRoomsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let chat_rooms = chat_room_service::list_rooms(state.db_pool(), &user)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ChatRoomsResponse { chat_rooms }))
}

#[utoipa::path(
    get,
    path = "/api/chat_room/{room_id}",
    tag = "Chat Rooms",
    security(("bearerAuth" = [])),
    params(
        ("room_id" = String, Path, description = "Room public identifier")
    ),
    responses(
        (status = 200, description = "Room fetched", body = ChatRoomResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Participants only", body = crate::error::ErrorResponse),
        (status = 404, description = "Room not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ChatRoomResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let chat_room = chat_room_service::get_room(state.db_pool(), &user, &room_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ChatRoomResponse { chat_room }))
}

#[utoipa::path(
    delete,
    path = "/api/chat_room/{room_id}",
    tag = "Chat Rooms",
    security(("bearerAuth" = [])),
    params(
        ("room_id" = String, Path, description = "Room public identifier")
    ),
    responses(
        (status = 200, description = "Room deactivated"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Creator or admin only", body = crate::error::ErrorResponse),
        (status = 404, description = "Room not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
) -> Result<(), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    chat_room_service::delete_room(state.db_pool(), &user, &room_id)
        .await
        .map_err(ApiError::from)?;

    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/chat_room/{room_id}/join",
    tag = "Chat Rooms",
    security(("bearerAuth" = [])),
    params(
        ("room_id" = String, Path, description = "Room public identifier")
    ),
    responses(
        (status = 200, description = "Joined the room", body = ChatRoomResponse),
        (status = 400, description = "Room full or already joined", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Room not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ChatRoomResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let chat_room = chat_room_service::join_room(state.db_pool(), &user, &room_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ChatRoomResponse { chat_room }))
}

#[utoipa::path(
    get,
    path = "/api/chat_room/{room_id}/messages",
    tag = "Chat Rooms",
    security(("bearerAuth" = [])),
    params(
        ("room_id" = String, Path, description = "Room public identifier")
    ),
    responses(
        (status = 200, description = "Message history, oldest first", body = ChatMessagesResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Participants only", body = crate::error::ErrorResponse),
        (status = 404, description = "Room not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ChatMessagesResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let messages = chat_room_service::list_messages(state.db_pool(), &user, &room_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ChatMessagesResponse { messages }))
}

#[utoipa::path(
    post,
    path = "/api/chat_room/{room_id}/messages",
    tag = "Chat Rooms",
    security(("bearerAuth" = [])),
    params(
        ("room_id" = String, Path, description = "Room public identifier")
    ),
    request_body = CreateChatMessageRequest,
    responses(
        (status = 201, description = "Message stored with profanity masked", body = ChatMessageResponse),
        (status = 400, description = "Empty message", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Participants only", body = crate::error::ErrorResponse),
        (status = 404, description = "Room not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<CreateChatMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessageResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let message = chat_room_service::create_message(state.db_pool(), &user, &room_id, &req.content)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(ChatMessageResponse { message })))
}
