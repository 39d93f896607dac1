use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::info;

use agora_config::AuthConfig;
use agora_moderation::{validate_email, validate_nickname, validate_password, ValidationError};

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    session_ttl: Duration,
    login_attempts_limit: u32,
    login_lockout: Duration,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("이미 존재하는 이메일입니다.")]
    EmailExists,
    #[error("이미 존재하는 닉네임입니다.")]
    NicknameExists,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("이메일 또는 비밀번호가 올바르지 않습니다.")]
    InvalidCredentials,
    #[error("비활성화된 계정입니다.")]
    AccountDisabled,
    #[error("요청이 너무 많습니다. {0}초 후에 다시 시도해주세요.")]
    AccountLocked(i64),
    #[error("사용자를 찾을 수 없습니다.")]
    UserNotFound,
    #[error("유효하지 않은 토큰입니다.")]
    SessionNotFound,
    #[error("만료된 토큰입니다.")]
    SessionExpired,
    #[error("유효하지 않은 토큰입니다.")]
    InvalidSession,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
}

/// Account role. `admin` and `manager` gate parts of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            _ => Role::User,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    pub email: String,
    pub nickname: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Manager gates also admit admins.
    pub fn is_manager(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Manager)
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub nickname: Option<String>,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: AuthConfig) -> Self {
        let session_ttl = Duration::seconds(config.session_ttl_seconds as i64);
        let login_lockout = Duration::seconds(config.login_lockout_seconds as i64);

        Self {
            pool,
            session_ttl,
            login_attempts_limit: config.login_attempts_limit,
            login_lockout,
        }
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// Register a new account. Validates email, nickname, and password
    /// policy before touching the database; the role is always `user`.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        nickname: &str,
    ) -> Result<User, AuthError> {
        validate_email(email)?;
        validate_nickname(nickname)?;
        validate_password(password)?;

        let mut tx = self.pool.begin().await?;

        let email_taken = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;
        if email_taken.is_some() {
            return Err(AuthError::EmailExists);
        }

        let nickname_taken = sqlx::query("SELECT id FROM users WHERE nickname = ?")
            .bind(nickname)
            .fetch_optional(&mut *tx)
            .await?;
        if nickname_taken.is_some() {
            return Err(AuthError::NicknameExists);
        }

        let now = Utc::now().to_rfc3339();
        let public_id = cuid2::create_id();
        let password_hash = self.hash_password(password)?;

        sqlx::query(
            "INSERT INTO users (public_id, email, password_hash, nickname, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 'user', ?, ?)",
        )
        .bind(&public_id)
        .bind(email)
        .bind(&password_hash)
        .bind(nickname)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query("SELECT id FROM users WHERE public_id = ?")
            .bind(&public_id)
            .fetch_one(&mut *tx)
            .await?;
        let id: i64 = row.try_get("id")?;

        tx.commit().await?;

        info!(user = %public_id, "registered new account");

        Ok(User {
            id,
            public_id,
            email: email.to_owned(),
            nickname: nickname.to_owned(),
            role: Role::User,
            is_active: true,
            created_at: now,
            last_login_at: None,
        })
    }

    /// Verify credentials and issue a session. Applies the failed-attempt
    /// lockout: after `login_attempts_limit` consecutive failures the
    /// account is locked for the configured window.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, AuthSession), AuthError> {
        let row = sqlx::query(
            "SELECT id, password_hash, is_active, failed_login_attempts, last_failed_login_at \
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials);
        };

        let user_id: i64 = row.try_get("id")?;
        let failed_attempts: i64 = row.try_get("failed_login_attempts")?;
        let last_failed: Option<String> = row.try_get("last_failed_login_at")?;

        if failed_attempts >= i64::from(self.login_attempts_limit) {
            if let Some(remaining) = self.lockout_remaining(last_failed.as_deref()) {
                return Err(AuthError::AccountLocked(remaining));
            }
            // Lockout window elapsed; start counting afresh.
            self.reset_failed_attempts(user_id).await?;
        }

        let secret: String = row.try_get("password_hash")?;
        let stored_hash = PasswordHash::new(&secret)?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &stored_hash)
            .is_err()
        {
            self.record_failed_attempt(user_id).await?;
            return Err(AuthError::InvalidCredentials);
        }

        let is_active: bool = row.try_get("is_active")?;
        if !is_active {
            return Err(AuthError::AccountDisabled);
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, last_failed_login_at = NULL, \
             last_login_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&now)
        .bind(&now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let user = self.fetch_user(user_id).await?;
        let session = self.issue_session(user_id).await?;
        Ok((user, session))
    }

    /// Resolve a bearer token to its user and session. Expired sessions
    /// are deleted on sight.
    pub async fn authenticate_token(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::SessionNotFound);
        };

        let user_id: i64 = row.try_get("user_id")?;
        let expires_at: String = row.try_get("expires_at")?;

        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|_| AuthError::InvalidSession)?
            .with_timezone(&Utc);

        if expires_at <= Utc::now() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await?;
            return Err(AuthError::SessionExpired);
        }

        let user = self.fetch_user(user_id).await?;
        let session = AuthSession {
            token: token.to_owned(),
            user_id,
            expires_at,
        };

        Ok((user, session))
    }

    /// Delete the session behind a token. Unknown tokens are not an error.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn user_profile(&self, user_id: i64) -> Result<User, AuthError> {
        self.fetch_user(user_id).await
    }

    /// Update a user's own profile. Nickname changes re-run the nickname
    /// policy and the uniqueness check.
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: UpdateProfile,
    ) -> Result<User, AuthError> {
        if let Some(nickname) = update.nickname.as_deref() {
            validate_nickname(nickname)?;

            let taken = sqlx::query("SELECT id FROM users WHERE nickname = ? AND id != ?")
                .bind(nickname)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            if taken.is_some() {
                return Err(AuthError::NicknameExists);
            }

            let now = Utc::now().to_rfc3339();
            sqlx::query("UPDATE users SET nickname = ?, updated_at = ? WHERE id = ?")
                .bind(nickname)
                .bind(&now)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        }

        self.fetch_user(user_id).await
    }

    /// All accounts, newest first. Callers gate this behind the admin role.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let rows = sqlx::query(
            "SELECT id, public_id, email, nickname, role, is_active, created_at, last_login_at \
             FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| Self::row_to_user(&row)).collect()
    }

    /// Assign a role by public id.
    pub async fn update_role(&self, public_id: &str, role: Role) -> Result<User, AuthError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE public_id = ?")
            .bind(role.as_str())
            .bind(&now)
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        let row = sqlx::query(
            "SELECT id, public_id, email, nickname, role, is_active, created_at, last_login_at \
             FROM users WHERE public_id = ?",
        )
        .bind(public_id)
        .fetch_one(&self.pool)
        .await?;

        info!(user = %public_id, role = role.as_str(), "role updated");
        Self::row_to_user(&row)
    }

    async fn fetch_user(&self, id: i64) -> Result<User, AuthError> {
        let row = sqlx::query(
            "SELECT id, public_id, email, nickname, role, is_active, created_at, last_login_at \
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::UserNotFound)?;

        Self::row_to_user(&row)
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, AuthError> {
        let role: String = row.try_get("role")?;
        Ok(User {
            id: row.try_get("id")?,
            public_id: row.try_get("public_id")?,
            email: row.try_get("email")?,
            nickname: row.try_get("nickname")?,
            role: Role::from(role.as_str()),
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            last_login_at: row.try_get("last_login_at")?,
        })
    }

    fn lockout_remaining(&self, last_failed: Option<&str>) -> Option<i64> {
        let last_failed = last_failed?;
        let last_failed = DateTime::parse_from_rfc3339(last_failed)
            .ok()?
            .with_timezone(&Utc);
        let unlock_at = last_failed + self.login_lockout;
        let remaining = (unlock_at - Utc::now()).num_seconds();
        (remaining > 0).then_some(remaining)
    }

    async fn record_failed_attempt(&self, user_id: i64) -> Result<(), AuthError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE users SET failed_login_attempts = failed_login_attempts + 1, \
             last_failed_login_at = ? WHERE id = ?",
        )
        .bind(&now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn reset_failed_attempts(&self, user_id: i64) -> Result<(), AuthError> {
        sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, last_failed_login_at = NULL WHERE id = ?",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn issue_session(&self, user_id: i64) -> Result<AuthSession, AuthError> {
        let token = self.generate_session_token();
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(AuthSession {
            token,
            user_id,
            expires_at,
        })
    }

    fn hash_password(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    fn generate_session_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_values_and_defaults_to_user() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("manager"), Role::Manager);
        assert_eq!(Role::from("user"), Role::User);
        assert_eq!(Role::from("ADMIN"), Role::Admin);
        assert_eq!(Role::from("unknown"), Role::User);
    }

    #[test]
    fn manager_gate_admits_admin() {
        let mut user = User {
            id: 1,
            public_id: "u1".into(),
            email: "a@b.co".into(),
            nickname: "닉".into(),
            role: Role::Manager,
            is_active: true,
            created_at: Utc::now().to_rfc3339(),
            last_login_at: None,
        };
        assert!(user.is_manager());
        assert!(!user.is_admin());

        user.role = Role::Admin;
        assert!(user.is_manager());
        assert!(user.is_admin());

        user.role = Role::User;
        assert!(!user.is_manager());
    }
}
