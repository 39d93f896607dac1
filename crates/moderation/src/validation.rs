//! Field validation rules for user-submitted input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::profanity::contains_profanity;

/// Nicknames are limited to 10 characters (Unicode scalar values, not bytes).
pub const NICKNAME_MAX_CHARS: usize = 10;

/// Minimum password length.
pub const PASSWORD_MIN_CHARS: usize = 12;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email regex must compile")
});

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("닉네임을 입력하세요.")]
    NicknameRequired,
    #[error("닉네임은 최대 10글자까지 입력 가능합니다.")]
    NicknameTooLong,
    #[error("닉네임에 부적절한 단어가 포함되어 있습니다.")]
    NicknameProfanity,
    #[error("올바른 이메일을 입력하세요.")]
    InvalidEmail,
    #[error("비밀번호는 최소 12자 이상이어야 합니다.")]
    PasswordTooShort,
    #[error("비밀번호는 하나 이상의 대문자를 포함해야 합니다.")]
    PasswordNoUppercase,
    #[error("비밀번호는 하나 이상의 소문자를 포함해야 합니다.")]
    PasswordNoLowercase,
    #[error("비밀번호는 하나 이상의 숫자를 포함해야 합니다.")]
    PasswordNoDigit,
    #[error("비밀번호는 하나 이상의 특수 문자를 포함해야 합니다.")]
    PasswordNoSpecial,
}

/// Validate a candidate nickname: presence, then length, then profanity.
/// Uniqueness is a database concern and checked at signup.
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    if nickname.trim().is_empty() {
        return Err(ValidationError::NicknameRequired);
    }

    if nickname.chars().count() > NICKNAME_MAX_CHARS {
        return Err(ValidationError::NicknameTooLong);
    }

    if contains_profanity(nickname) {
        return Err(ValidationError::NicknameProfanity);
    }

    Ok(())
}

/// Validate email format.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > 255 || !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Validate password strength: length, upper, lower, digit, special.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::PasswordNoUppercase);
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::PasswordNoLowercase);
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordNoDigit);
    }

    // Mirrors the [^\w\s] class: underscores and whitespace do not count.
    let is_special = |c: char| !c.is_alphanumeric() && !c.is_whitespace() && c != '_';
    if !password.chars().any(is_special) {
        return Err(ValidationError::PasswordNoSpecial);
    }

    Ok(())
}
