use sqlx::SqlitePool;

use agora_auth::{AuthSession, Authenticator, User};
use agora_config::ThrottleConfig;

use crate::throttle::LoginRateLimiter;
use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    authenticator: Authenticator,
    login_limiter: LoginRateLimiter,
}

impl AppState {
    pub fn new(pool: SqlitePool, authenticator: Authenticator, throttle: &ThrottleConfig) -> Self {
        Self {
            pool,
            authenticator,
            login_limiter: LoginRateLimiter::new(throttle.login_per_minute, throttle.login_burst),
        }
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn login_limiter(&self) -> &LoginRateLimiter {
        &self.login_limiter
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }
}
