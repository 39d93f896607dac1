use axum::http::{header::AUTHORIZATION, HeaderMap};

use agora_auth::User;

use crate::ApiError;

pub const ADMIN_ONLY_DETAIL: &str = "권한이 없습니다. (관리자만 접근 가능)";
pub const MANAGER_ONLY_DETAIL: &str = "권한이 없습니다. (매니저 이상 접근 가능)";

pub fn require_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("인증 정보가 제공되지 않았습니다."))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized("유효하지 않은 인증 방식입니다."));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized("인증 토큰이 제공되지 않았습니다."));
    }

    Ok(token.to_string())
}

/// Admin gate. Exact match, no hierarchy.
pub fn require_admin(user: &User) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden(ADMIN_ONLY_DETAIL))
    }
}

/// Manager gate. Admits admins as well.
pub fn require_manager(user: &User) -> Result<(), ApiError> {
    if user.is_manager() {
        Ok(())
    } else {
        Err(ApiError::forbidden(MANAGER_ONLY_DETAIL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use chrono::Utc;

    use agora_auth::Role;

    fn user_with_role(role: Role) -> User {
        User {
            id: 1,
            public_id: "u1".into(),
            email: "a@b.co".into(),
            nickname: "닉".into(),
            role,
            is_active: true,
            created_at: Utc::now().to_rfc3339(),
            last_login_at: None,
        }
    }

    #[test]
    fn require_bearer_extracts_token_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer TOKEN123"));

        let token = require_bearer(&headers).expect("token should be extracted");
        assert_eq!(token, "TOKEN123");
    }

    #[test]
    fn require_bearer_rejects_missing_header() {
        let headers = HeaderMap::new();
        let error = require_bearer(&headers).expect_err("should reject missing header");
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn require_bearer_rejects_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));

        let error = require_bearer(&headers).expect_err("should reject non-bearer scheme");
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn admin_gate_rejects_manager_and_user() {
        assert!(require_admin(&user_with_role(Role::Admin)).is_ok());

        for role in [Role::Manager, Role::User] {
            let error = require_admin(&user_with_role(role)).expect_err("should be forbidden");
            assert_eq!(error.status, StatusCode::FORBIDDEN);
            assert_eq!(error.message, ADMIN_ONLY_DETAIL);
        }
    }

    #[test]
    fn manager_gate_admits_admin() {
        assert!(require_manager(&user_with_role(Role::Admin)).is_ok());
        assert!(require_manager(&user_with_role(Role::Manager)).is_ok());

        let error =
            require_manager(&user_with_role(Role::User)).expect_err("should be forbidden");
        assert_eq!(error.message, MANAGER_ONLY_DETAIL);
    }
}
