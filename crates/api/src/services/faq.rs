use sqlx::SqlitePool;

use agora_auth::User;

use crate::routes::models::{CreateFaqRequest, Faq, UpdateFaqRequest};

use super::error::ServiceError;

const FAQ_SELECT: &str = "SELECT id, public_id, question, answer, category, is_published, \
     created_at, updated_at FROM faqs";

fn validate_question(question: &str) -> Result<(), ServiceError> {
    if question.trim().is_empty() {
        return Err(ServiceError::bad_request("질문을 입력하세요."));
    }
    Ok(())
}

fn validate_answer(answer: &str) -> Result<(), ServiceError> {
    if answer.trim().is_empty() {
        return Err(ServiceError::bad_request("답변을 입력하세요."));
    }
    Ok(())
}

async fn find_faq(pool: &SqlitePool, public_id: &str) -> Result<Faq, ServiceError> {
    let query = format!("{FAQ_SELECT} WHERE public_id = ?");
    sqlx::query_as::<_, Faq>(&query)
        .bind(public_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound)
}

/// Published entries, oldest first. Admins also see unpublished ones.
pub async fn list_faqs(pool: &SqlitePool, user: &User) -> Result<Vec<Faq>, ServiceError> {
    let faqs = if user.is_admin() {
        let query = format!("{FAQ_SELECT} ORDER BY created_at ASC");
        sqlx::query_as::<_, Faq>(&query).fetch_all(pool).await?
    } else {
        let query = format!("{FAQ_SELECT} WHERE is_published = TRUE ORDER BY created_at ASC");
        sqlx::query_as::<_, Faq>(&query).fetch_all(pool).await?
    };

    Ok(faqs)
}

pub async fn create_faq(pool: &SqlitePool, req: CreateFaqRequest) -> Result<Faq, ServiceError> {
    validate_question(&req.question)?;
    validate_answer(&req.answer)?;

    let public_id = cuid2::create_id();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO faqs (public_id, question, answer, category, is_published, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&public_id)
    .bind(&req.question)
    .bind(&req.answer)
    .bind(&req.category)
    .bind(req.is_published.unwrap_or(true))
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    find_faq(pool, &public_id).await
}

/// Fetch one entry. Unpublished entries are hidden from non-admins.
pub async fn get_faq(pool: &SqlitePool, user: &User, public_id: &str) -> Result<Faq, ServiceError> {
    let faq = find_faq(pool, public_id).await?;

    if !faq.is_published && !user.is_admin() {
        return Err(ServiceError::NotFound);
    }

    Ok(faq)
}

pub async fn update_faq(
    pool: &SqlitePool,
    public_id: &str,
    req: UpdateFaqRequest,
) -> Result<Faq, ServiceError> {
    let _ = find_faq(pool, public_id).await?;

    if let Some(question) = req.question.as_deref() {
        validate_question(question)?;
    }
    if let Some(answer) = req.answer.as_deref() {
        validate_answer(answer)?;
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "UPDATE faqs SET question = COALESCE(?, question), answer = COALESCE(?, answer), \
         category = COALESCE(?, category), is_published = COALESCE(?, is_published), \
         updated_at = ? WHERE public_id = ?",
    )
    .bind(&req.question)
    .bind(&req.answer)
    .bind(&req.category)
    .bind(req.is_published)
    .bind(&now)
    .bind(public_id)
    .execute(pool)
    .await?;

    find_faq(pool, public_id).await
}

pub async fn delete_faq(pool: &SqlitePool, public_id: &str) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM faqs WHERE public_id = ?")
        .bind(public_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound);
    }

    Ok(())
}
