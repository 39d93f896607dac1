use sqlx::SqlitePool;

use agora_auth::User;

use crate::routes::models::{CreatePostRequest, Post, UpdatePostRequest};

use super::error::ServiceError;
use super::notification;

const POST_TYPES: &[&str] = &["inquiry", "report", "suggestion", "etc"];
const POST_STATUSES: &[&str] = &["pending", "in_progress", "completed", "closed"];

const TITLE_MAX_CHARS: usize = 255;

const POST_SELECT: &str = "SELECT p.id, p.author_id, p.public_id, u.nickname AS author, \
     p.post_type, p.title, p.content, p.status, p.created_at, p.updated_at \
     FROM posts p JOIN users u ON u.id = p.author_id";

fn validate_title(title: &str) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::bad_request("제목을 입력하세요."));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ServiceError::bad_request(
            "제목은 최대 255자까지 입력 가능합니다.",
        ));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), ServiceError> {
    if content.trim().is_empty() {
        return Err(ServiceError::bad_request("내용을 입력하세요."));
    }
    Ok(())
}

fn validate_post_type(post_type: &str) -> Result<(), ServiceError> {
    if !POST_TYPES.contains(&post_type) {
        return Err(ServiceError::bad_request("유효하지 않은 문의 유형입니다."));
    }
    Ok(())
}

async fn find_post(pool: &SqlitePool, public_id: &str) -> Result<Post, ServiceError> {
    let query = format!("{POST_SELECT} WHERE p.public_id = ?");
    sqlx::query_as::<_, Post>(&query)
        .bind(public_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound)
}

/// Posts visible to the user: their own, or all of them for managers
/// and admins.
pub async fn list_posts(pool: &SqlitePool, user: &User) -> Result<Vec<Post>, ServiceError> {
    let posts = if user.is_manager() {
        let query = format!("{POST_SELECT} ORDER BY p.created_at DESC");
        sqlx::query_as::<_, Post>(&query).fetch_all(pool).await?
    } else {
        let query = format!("{POST_SELECT} WHERE p.author_id = ? ORDER BY p.created_at DESC");
        sqlx::query_as::<_, Post>(&query)
            .bind(user.id)
            .fetch_all(pool)
            .await?
    };

    Ok(posts)
}

pub async fn create_post(
    pool: &SqlitePool,
    user: &User,
    req: CreatePostRequest,
) -> Result<Post, ServiceError> {
    let post_type = req.post_type.as_deref().unwrap_or("inquiry");
    validate_post_type(post_type)?;
    validate_title(&req.title)?;
    validate_content(&req.content)?;

    let public_id = cuid2::create_id();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO posts (public_id, author_id, post_type, title, content, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(&public_id)
    .bind(user.id)
    .bind(post_type)
    .bind(&req.title)
    .bind(&req.content)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    find_post(pool, &public_id).await
}

/// Fetch one post. Readable by its author and by managers/admins.
pub async fn get_post(
    pool: &SqlitePool,
    user: &User,
    public_id: &str,
) -> Result<Post, ServiceError> {
    let post = find_post(pool, public_id).await?;

    if post.author_id != user.id && !user.is_manager() {
        return Err(ServiceError::forbidden("권한이 없습니다."));
    }

    Ok(post)
}

/// Edit a post. Only the author or an admin may change its content.
pub async fn update_post(
    pool: &SqlitePool,
    user: &User,
    public_id: &str,
    req: UpdatePostRequest,
) -> Result<Post, ServiceError> {
    let post = find_post(pool, public_id).await?;

    if post.author_id != user.id && !user.is_admin() {
        return Err(ServiceError::forbidden("권한이 없습니다."));
    }

    if let Some(post_type) = req.post_type.as_deref() {
        validate_post_type(post_type)?;
    }
    if let Some(title) = req.title.as_deref() {
        validate_title(title)?;
    }
    if let Some(content) = req.content.as_deref() {
        validate_content(content)?;
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "UPDATE posts SET post_type = COALESCE(?, post_type), title = COALESCE(?, title), \
         content = COALESCE(?, content), updated_at = ? WHERE public_id = ?",
    )
    .bind(&req.post_type)
    .bind(&req.title)
    .bind(&req.content)
    .bind(&now)
    .bind(public_id)
    .execute(pool)
    .await?;

    find_post(pool, public_id).await
}

pub async fn delete_post(
    pool: &SqlitePool,
    user: &User,
    public_id: &str,
) -> Result<(), ServiceError> {
    let post = find_post(pool, public_id).await?;

    if post.author_id != user.id && !user.is_admin() {
        return Err(ServiceError::forbidden("권한이 없습니다."));
    }

    sqlx::query("DELETE FROM posts WHERE public_id = ?")
        .bind(public_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Move a post through its status workflow and notify the author.
/// Callers gate this behind the manager role.
pub async fn update_status(
    pool: &SqlitePool,
    user: &User,
    public_id: &str,
    status: &str,
) -> Result<Post, ServiceError> {
    if !POST_STATUSES.contains(&status) {
        return Err(ServiceError::bad_request("유효하지 않은 상태 값입니다."));
    }

    let post = find_post(pool, public_id).await?;

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("UPDATE posts SET status = ?, updated_at = ? WHERE public_id = ?")
        .bind(status)
        .bind(&now)
        .bind(public_id)
        .execute(pool)
        .await?;

    if post.author_id != user.id {
        notification::create(
            pool,
            post.author_id,
            "문의 상태 변경",
            &format!(
                "'{}' 문의의 상태가 '{}'(으)로 변경되었습니다.",
                post.title, status
            ),
        )
        .await?;
    }

    find_post(pool, public_id).await
}
