//! 인증 요청 DTO
//!
//! 클라이언트 입력 데이터의 역직렬화와 검증을 담당합니다.

use serde::Deserialize;
use validator::{Validate, ValidationError};

/// 로컬 로그인 요청
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 회원가입 요청
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    /// 계정 비밀번호 (최소 8자, 대소문자+숫자 포함)
    #[validate(length(min = 8, message = "비밀번호는 최소 8자 이상이어야 합니다"))]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    /// 표시 이름 (1-50자)
    #[validate(length(min = 1, max = 50, message = "이름은 1-50자 사이여야 합니다"))]
    pub name: String,
}

/// 토큰 갱신 요청
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "리프레시 토큰이 필요합니다"))]
    pub refresh_token: String,
}

/// 비밀번호 보안 강도 검증 (대문자, 소문자, 숫자 필수 포함)
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_uppercase && has_lowercase && has_digit) {
        return Err(ValidationError::new("weak_password")
            .with_message("비밀번호는 대문자, 소문자, 숫자를 포함해야 합니다".into()));
    }

    Ok(())
}
