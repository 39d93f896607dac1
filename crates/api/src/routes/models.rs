//! Shared entity and request payload types for the route handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Post {
    #[serde(skip_serializing)]
    pub id: i64,
    #[serde(skip_serializing)]
    pub author_id: i64,
    pub public_id: String,
    /// Author nickname.
    pub author: String,
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Faq {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ChatRoom {
    #[serde(skip_serializing)]
    pub id: i64,
    #[serde(skip_serializing)]
    pub created_by: i64,
    pub public_id: String,
    pub name: String,
    pub description: Option<String>,
    pub room_type: String,
    pub max_participants: i64,
    /// Creator nickname.
    pub creator: String,
    pub participant_count: i64,
    pub created_at: String,
    pub last_message_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ChatMessage {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    /// Sender nickname.
    pub sender: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub post_type: Option<String>,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub post_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePostStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFaqRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateChatRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub max_participants: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateChatMessageRequest {
    pub content: String,
}
