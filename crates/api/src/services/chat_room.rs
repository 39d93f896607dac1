use sqlx::SqlitePool;

use agora_auth::User;
use agora_moderation::{contains_profanity, mask_profanity};

use crate::routes::models::{ChatMessage, ChatRoom, CreateChatRoomRequest};

use super::error::ServiceError;
use super::notification;

const ROOM_TYPES: &[&str] = &["direct", "group"];

const ROOM_NAME_MAX_CHARS: usize = 100;
const DEFAULT_MAX_PARTICIPANTS: i64 = 10;

const ROOM_SELECT: &str = "SELECT r.id, r.created_by, r.public_id, r.name, r.description, \
     r.room_type, r.max_participants, u.nickname AS creator, \
     (SELECT COUNT(*) FROM chat_room_participants cp WHERE cp.room_id = r.id) AS participant_count, \
     r.created_at, r.last_message_at \
     FROM chat_rooms r JOIN users u ON u.id = r.created_by";

async fn find_room(pool: &SqlitePool, public_id: &str) -> Result<ChatRoom, ServiceError> {
    let query = format!("{ROOM_SELECT} WHERE r.public_id = ? AND r.is_active = TRUE");
    sqlx::query_as::<_, ChatRoom>(&query)
        .bind(public_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound)
}

async fn is_participant(pool: &SqlitePool, room_id: i64, user_id: i64) -> Result<bool, ServiceError> {
    let joined: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM chat_room_participants WHERE room_id = ? AND user_id = ?",
    )
    .bind(room_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(joined.is_some())
}

/// Create a room and join its creator. Room names run through the same
/// profanity filter as nicknames.
pub async fn create_room(
    pool: &SqlitePool,
    user: &User,
    req: CreateChatRoomRequest,
) -> Result<ChatRoom, ServiceError> {
    if req.name.trim().is_empty() {
        return Err(ServiceError::bad_request("채팅방 이름을 입력하세요."));
    }
    if req.name.chars().count() > ROOM_NAME_MAX_CHARS {
        return Err(ServiceError::bad_request(
            "채팅방 이름은 최대 100자까지 입력 가능합니다.",
        ));
    }
    if contains_profanity(&req.name) {
        return Err(ServiceError::bad_request(
            "채팅방 이름에 부적절한 단어가 포함되어 있습니다.",
        ));
    }

    let room_type = req.room_type.as_deref().unwrap_or("direct");
    if !ROOM_TYPES.contains(&room_type) {
        return Err(ServiceError::bad_request(
            "유효하지 않은 채팅방 유형입니다.",
        ));
    }

    let max_participants = req.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS);
    if max_participants < 2 {
        return Err(ServiceError::bad_request(
            "최대 인원은 2명 이상이어야 합니다.",
        ));
    }

    let public_id = cuid2::create_id();
    let now = chrono::Utc::now().to_rfc3339();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO chat_rooms (public_id, name, description, room_type, max_participants, \
         created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&public_id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(room_type)
    .bind(max_participants)
    .bind(user.id)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    let room_id = sqlx::query_scalar::<_, i64>("SELECT last_insert_rowid()")
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO chat_room_participants (room_id, user_id, joined_at) VALUES (?, ?, ?)")
        .bind(room_id)
        .bind(user.id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    find_room(pool, &public_id).await
}

/// Rooms the user participates in; admins see every active room.
pub async fn list_rooms(pool: &SqlitePool, user: &User) -> Result<Vec<ChatRoom>, ServiceError> {
    let rooms = if user.is_admin() {
        let query = format!("{ROOM_SELECT} WHERE r.is_active = TRUE ORDER BY r.created_at DESC");
        sqlx::query_as::<_, ChatRoom>(&query).fetch_all(pool).await?
    } else {
        let query = format!(
            "{ROOM_SELECT} WHERE r.is_active = TRUE AND r.id IN \
             (SELECT room_id FROM chat_room_participants WHERE user_id = ?) \
             ORDER BY r.created_at DESC"
        );
        sqlx::query_as::<_, ChatRoom>(&query)
            .bind(user.id)
            .fetch_all(pool)
            .await?
    };

    Ok(rooms)
}

pub async fn get_room(
    pool: &SqlitePool,
    user: &User,
    public_id: &str,
) -> Result<ChatRoom, ServiceError> {
    let room = find_room(pool, public_id).await?;

    if !user.is_admin() && !is_participant(pool, room.id, user.id).await? {
        return Err(ServiceError::forbidden(
            "채팅방 참여자만 접근할 수 있습니다.",
        ));
    }

    Ok(room)
}

/// Deactivate a room. Only its creator or an admin may do so.
pub async fn delete_room(
    pool: &SqlitePool,
    user: &User,
    public_id: &str,
) -> Result<(), ServiceError> {
    let room = find_room(pool, public_id).await?;

    if room.created_by != user.id && !user.is_admin() {
        return Err(ServiceError::forbidden("권한이 없습니다."));
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("UPDATE chat_rooms SET is_active = FALSE, updated_at = ? WHERE id = ?")
        .bind(&now)
        .bind(room.id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Join a room, respecting its capacity, and tell the creator.
pub async fn join_room(
    pool: &SqlitePool,
    user: &User,
    public_id: &str,
) -> Result<ChatRoom, ServiceError> {
    let room = find_room(pool, public_id).await?;

    if is_participant(pool, room.id, user.id).await? {
        return Err(ServiceError::bad_request("이미 참여 중인 채팅방입니다."));
    }
    if room.participant_count >= room.max_participants {
        return Err(ServiceError::bad_request("채팅방 인원이 가득 찼습니다."));
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("INSERT INTO chat_room_participants (room_id, user_id, joined_at) VALUES (?, ?, ?)")
        .bind(room.id)
        .bind(user.id)
        .bind(&now)
        .execute(pool)
        .await?;

    if room.created_by != user.id {
        notification::create(
            pool,
            room.created_by,
            "채팅방 참여",
            &format!("{}님이 '{}' 채팅방에 참여했습니다.", user.nickname, room.name),
        )
        .await?;
    }

    find_room(pool, public_id).await
}

/// Message history, oldest first. Participants and admins only.
pub async fn list_messages(
    pool: &SqlitePool,
    user: &User,
    public_id: &str,
) -> Result<Vec<ChatMessage>, ServiceError> {
    let room = find_room(pool, public_id).await?;

    if !user.is_admin() && !is_participant(pool, room.id, user.id).await? {
        return Err(ServiceError::forbidden(
            "채팅방 참여자만 접근할 수 있습니다.",
        ));
    }

    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT m.id, m.public_id, u.nickname AS sender, m.content, m.created_at \
         FROM chat_messages m JOIN users u ON u.id = m.sender_id \
         WHERE m.room_id = ? ORDER BY m.created_at ASC",
    )
    .bind(room.id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Store a message with profanity masked out. Participants only.
pub async fn create_message(
    pool: &SqlitePool,
    user: &User,
    public_id: &str,
    content: &str,
) -> Result<ChatMessage, ServiceError> {
    let room = find_room(pool, public_id).await?;

    if !is_participant(pool, room.id, user.id).await? {
        return Err(ServiceError::forbidden(
            "채팅방 참여자만 접근할 수 있습니다.",
        ));
    }

    if content.trim().is_empty() {
        return Err(ServiceError::bad_request("메시지 내용을 입력하세요."));
    }

    let masked = mask_profanity(content);
    let message_id = cuid2::create_id();
    let now = chrono::Utc::now().to_rfc3339();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO chat_messages (public_id, room_id, sender_id, content, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&message_id)
    .bind(room.id)
    .bind(user.id)
    .bind(&masked)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE chat_rooms SET last_message_at = ? WHERE id = ?")
        .bind(&now)
        .bind(room.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let message = sqlx::query_as::<_, ChatMessage>(
        "SELECT m.id, m.public_id, u.nickname AS sender, m.content, m.created_at \
         FROM chat_messages m JOIN users u ON u.id = m.sender_id WHERE m.public_id = ?",
    )
    .bind(&message_id)
    .fetch_one(pool)
    .await?;

    Ok(message)
}
