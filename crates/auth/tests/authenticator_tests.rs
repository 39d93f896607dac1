use std::collections::HashSet;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tempfile::TempDir;

use agora_auth::{AuthError, Authenticator, Role, UpdateProfile};
use agora_config::AuthConfig;
use agora_moderation::ValidationError;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

const PASSWORD: &str = "Str0ngPassw0rd!";

fn default_auth_config() -> AuthConfig {
    AuthConfig {
        session_ttl_seconds: 3_600,
        login_attempts_limit: 5,
        login_lockout_seconds: 300,
    }
}

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    _temp_dir: TempDir,
    config: AuthConfig,
}

impl TestContext {
    async fn new(config: AuthConfig) -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("auth.sqlite");
        let db_url = format!("sqlite://{}", db_path.display());

        let mut options = SqliteConnectOptions::from_str(&db_url)?;
        options = options.create_if_missing(true);
        options = options.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        let authenticator = Authenticator::new(pool.clone(), config.clone());

        Ok(Self {
            pool,
            authenticator,
            _temp_dir: temp_dir,
            config,
        })
    }

    async fn new_default() -> TestResult<Self> {
        Self::new(default_auth_config()).await
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }
}

#[tokio::test]
async fn signup_persists_user_with_hashed_password() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let user = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.nickname, "앨리스");
    assert_eq!(user.role, Role::User);

    let secret: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
        .bind(user.id)
        .fetch_one(ctx.pool())
        .await?;
    assert!(
        secret.starts_with("$argon2"),
        "password must be stored as an argon2 hash"
    );

    Ok(())
}

#[tokio::test]
async fn signup_rejects_duplicate_email() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    let err = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "다른닉네임")
        .await
        .expect_err("expected duplicate email to fail");
    assert!(matches!(err, AuthError::EmailExists));
    assert_eq!(err.to_string(), "이미 존재하는 이메일입니다.");

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(user_count, 1, "no additional users should be created");

    Ok(())
}

#[tokio::test]
async fn signup_rejects_duplicate_nickname() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    let err = ctx
        .authenticator()
        .signup("bob@example.com", PASSWORD, "앨리스")
        .await
        .expect_err("expected duplicate nickname to fail");
    assert!(matches!(err, AuthError::NicknameExists));
    assert_eq!(err.to_string(), "이미 존재하는 닉네임입니다.");

    Ok(())
}

#[tokio::test]
async fn signup_rejects_eleven_character_nickname() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let err = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "abcdefghijk")
        .await
        .expect_err("expected over-long nickname to fail");
    assert!(matches!(
        err,
        AuthError::Validation(ValidationError::NicknameTooLong)
    ));
    assert_eq!(err.to_string(), "닉네임은 최대 10글자까지 입력 가능합니다.");

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(user_count, 0);

    Ok(())
}

#[tokio::test]
async fn signup_rejects_profane_nickname() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let err = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "바보천사")
        .await
        .expect_err("expected profane nickname to fail");
    assert!(matches!(
        err,
        AuthError::Validation(ValidationError::NicknameProfanity)
    ));
    assert_eq!(
        err.to_string(),
        "닉네임에 부적절한 단어가 포함되어 있습니다."
    );

    Ok(())
}

#[tokio::test]
async fn signup_rejects_weak_password() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let err = ctx
        .authenticator()
        .signup("alice@example.com", "weakpassword", "앨리스")
        .await
        .expect_err("expected weak password to fail");
    assert!(matches!(err, AuthError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn login_returns_session_for_valid_credentials() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    let (user, session) = ctx
        .authenticator()
        .login("alice@example.com", PASSWORD)
        .await?;

    assert_eq!(user.email, "alice@example.com");
    assert!(user.last_login_at.is_some(), "last login should be stamped");

    let ttl = Duration::seconds(ctx.config.session_ttl_seconds as i64);
    let remaining = session.expires_at - Utc::now();
    assert!(
        (remaining - ttl).num_seconds().abs() <= 2,
        "session ttl should respect configuration"
    );

    let stored_expires: String =
        sqlx::query_scalar("SELECT expires_at FROM sessions WHERE token = ?")
            .bind(&session.token)
            .fetch_one(ctx.pool())
            .await?;
    let parsed = DateTime::parse_from_rfc3339(&stored_expires)?.with_timezone(&Utc);
    assert_eq!(parsed, session.expires_at);

    Ok(())
}

#[tokio::test]
async fn login_rejects_incorrect_password() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    let err = ctx
        .authenticator()
        .login("alice@example.com", "Wr0ngPassword!!")
        .await
        .expect_err("expected invalid password");
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(err.to_string(), "이메일 또는 비밀번호가 올바르지 않습니다.");

    let session_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(session_count, 0, "no sessions should be issued on failure");

    Ok(())
}

#[tokio::test]
async fn login_rejects_unknown_email() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let err = ctx
        .authenticator()
        .login("unknown@example.com", PASSWORD)
        .await
        .expect_err("expected unknown email to fail");
    assert!(matches!(err, AuthError::InvalidCredentials));
    Ok(())
}

#[tokio::test]
async fn login_locks_account_after_repeated_failures() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    for _ in 0..5 {
        let err = ctx
            .authenticator()
            .login("alice@example.com", "Wr0ngPassword!!")
            .await
            .expect_err("wrong password should fail");
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    // Even the correct password is refused while the lockout holds.
    let err = ctx
        .authenticator()
        .login("alice@example.com", PASSWORD)
        .await
        .expect_err("locked account should refuse login");
    match err {
        AuthError::AccountLocked(remaining) => {
            assert!(remaining > 0 && remaining <= 300);
            assert!(err.to_string().contains("요청이 너무 많습니다."));
        }
        other => panic!("expected AccountLocked, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn login_lockout_expires_and_resets_counter() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    // Backdate five recorded failures past the lockout window.
    let stale = (Utc::now() - Duration::seconds(400)).to_rfc3339();
    sqlx::query(
        "UPDATE users SET failed_login_attempts = 5, last_failed_login_at = ? WHERE id = ?",
    )
    .bind(&stale)
    .bind(user.id)
    .execute(ctx.pool())
    .await?;

    let (logged_in, _) = ctx
        .authenticator()
        .login("alice@example.com", PASSWORD)
        .await?;
    assert_eq!(logged_in.id, user.id);

    let attempts: i64 =
        sqlx::query_scalar("SELECT failed_login_attempts FROM users WHERE id = ?")
            .bind(user.id)
            .fetch_one(ctx.pool())
            .await?;
    assert_eq!(attempts, 0, "counter should reset after successful login");

    Ok(())
}

#[tokio::test]
async fn login_successful_attempt_resets_failure_counter() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    for _ in 0..3 {
        let _ = ctx
            .authenticator()
            .login("alice@example.com", "Wr0ngPassword!!")
            .await;
    }

    ctx.authenticator()
        .login("alice@example.com", PASSWORD)
        .await?;

    let attempts: i64 =
        sqlx::query_scalar("SELECT failed_login_attempts FROM users WHERE id = ?")
            .bind(user.id)
            .fetch_one(ctx.pool())
            .await?;
    assert_eq!(attempts, 0);

    Ok(())
}

#[tokio::test]
async fn login_rejects_disabled_account() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = ?")
        .bind(user.id)
        .execute(ctx.pool())
        .await?;

    let err = ctx
        .authenticator()
        .login("alice@example.com", PASSWORD)
        .await
        .expect_err("disabled account should refuse login");
    assert!(matches!(err, AuthError::AccountDisabled));

    Ok(())
}

#[tokio::test]
async fn authenticate_token_returns_user_and_session_for_active_token() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;
    let (_, session) = ctx
        .authenticator()
        .login("alice@example.com", PASSWORD)
        .await?;

    let (resolved_user, resolved_session) = ctx
        .authenticator()
        .authenticate_token(&session.token)
        .await?;

    assert_eq!(resolved_user.id, user.id);
    assert_eq!(resolved_session.token, session.token);
    Ok(())
}

#[tokio::test]
async fn authenticate_token_deletes_expired_sessions() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    let token = "expired-token";
    let created_at = (Utc::now() - Duration::hours(2)).to_rfc3339();
    let expires_at = (Utc::now() - Duration::hours(1)).to_rfc3339();

    sqlx::query(
        "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(token)
    .bind(&created_at)
    .bind(&expires_at)
    .execute(ctx.pool())
    .await?;

    let err = ctx
        .authenticator()
        .authenticate_token(token)
        .await
        .expect_err("expired token should be rejected");
    assert!(matches!(err, AuthError::SessionExpired));

    let remaining: Option<i64> = sqlx::query_scalar("SELECT 1 FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(ctx.pool())
        .await?;
    assert!(
        remaining.is_none(),
        "expired session should be removed from the database"
    );

    Ok(())
}

#[tokio::test]
async fn authenticate_token_rejects_unknown_token() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let err = ctx
        .authenticator()
        .authenticate_token("missing-token")
        .await
        .expect_err("unknown token should not authenticate");
    assert!(matches!(err, AuthError::SessionNotFound));
    Ok(())
}

#[tokio::test]
async fn logout_invalidates_session() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;
    let (_, session) = ctx
        .authenticator()
        .login("alice@example.com", PASSWORD)
        .await?;

    ctx.authenticator().logout(&session.token).await?;

    let err = ctx
        .authenticator()
        .authenticate_token(&session.token)
        .await
        .expect_err("logged-out token should not authenticate");
    assert!(matches!(err, AuthError::SessionNotFound));

    Ok(())
}

#[tokio::test]
async fn update_profile_changes_nickname_with_policy() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    let updated = ctx
        .authenticator()
        .update_profile(
            user.id,
            UpdateProfile {
                nickname: Some("새앨리스".into()),
            },
        )
        .await?;
    assert_eq!(updated.nickname, "새앨리스");

    let err = ctx
        .authenticator()
        .update_profile(
            user.id,
            UpdateProfile {
                nickname: Some("바보".into()),
            },
        )
        .await
        .expect_err("profane nickname should be rejected");
    assert!(matches!(
        err,
        AuthError::Validation(ValidationError::NicknameProfanity)
    ));

    Ok(())
}

#[tokio::test]
async fn update_profile_rejects_taken_nickname() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;
    let bob = ctx
        .authenticator()
        .signup("bob@example.com", PASSWORD, "밥")
        .await?;

    let err = ctx
        .authenticator()
        .update_profile(
            bob.id,
            UpdateProfile {
                nickname: Some("앨리스".into()),
            },
        )
        .await
        .expect_err("taken nickname should be rejected");
    assert!(matches!(err, AuthError::NicknameExists));

    Ok(())
}

#[tokio::test]
async fn list_users_returns_all_accounts() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;
    ctx.authenticator()
        .signup("bob@example.com", PASSWORD, "밥")
        .await?;

    let users = ctx.authenticator().list_users().await?;
    assert_eq!(users.len(), 2);

    Ok(())
}

#[tokio::test]
async fn update_role_promotes_user() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    let promoted = ctx
        .authenticator()
        .update_role(&user.public_id, Role::Manager)
        .await?;
    assert_eq!(promoted.role, Role::Manager);

    let err = ctx
        .authenticator()
        .update_role("missing-id", Role::Admin)
        .await
        .expect_err("unknown user should not be promoted");
    assert!(matches!(err, AuthError::UserNotFound));

    Ok(())
}

#[tokio::test]
async fn generate_session_token_produces_unique_urlsafe_tokens() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;

    let mut tokens = HashSet::new();
    for _ in 0..5 {
        let (_, session) = ctx
            .authenticator()
            .login("alice@example.com", PASSWORD)
            .await?;
        assert!(
            URL_SAFE_NO_PAD.decode(session.token.as_bytes()).is_ok(),
            "token should be URL safe base64"
        );
        assert!(
            tokens.insert(session.token.clone()),
            "tokens should be unique per session"
        );
    }
    Ok(())
}

#[tokio::test]
async fn hash_password_uses_random_salt_per_call() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let first = ctx
        .authenticator()
        .signup("alice@example.com", PASSWORD, "앨리스")
        .await?;
    let second = ctx
        .authenticator()
        .signup("bob@example.com", PASSWORD, "밥")
        .await?;

    let first_secret: String =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
            .bind(first.id)
            .fetch_one(ctx.pool())
            .await?;
    let second_secret: String =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
            .bind(second.id)
            .fetch_one(ctx.pool())
            .await?;

    assert_ne!(
        first_secret, second_secret,
        "argon2 salts must randomise identical passwords"
    );
    Ok(())
}
