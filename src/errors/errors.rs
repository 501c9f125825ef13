//! 애플리케이션 전역에서 사용하는 에러 시스템
//!
//! 인증 파이프라인에서 발생하는 모든 실패를 타입으로 표현합니다.
//! `thiserror`와 `actix_web::ResponseError`를 사용하여 비즈니스 에러와
//! 인프라 에러를 구분된 HTTP 응답으로 변환합니다.
//!
//! ## 에러 코드 체계
//!
//! `E-{카테고리}{일련번호}` 형식을 사용합니다:
//!
//! - `C` (Common): 공통 예외
//! - `A` (Auth): 토큰 인증/인가
//! - `U` (User): 사용자 계정 관련
//! - `O` (OAuth): OAuth 관련

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::oauth::OAuthProvider;

/// 애플리케이션 전역 에러 타입
///
/// 인증 코어에서 발생하는 비즈니스 실패와 저장소/내부 실패를 모두 포괄합니다.
/// 비즈니스 실패는 호출자에게 그대로 전파되며, 절대 삼켜지지 않습니다.
#[derive(Error, Debug)]
pub enum AuthError {
    /// 이메일/비밀번호 불일치 (401 Unauthorized)
    ///
    /// 사용자 열거 공격을 막기 위해 "계정 없음"과 "비밀번호 틀림"을
    /// 구분하지 않고 이 하나의 에러로 통합합니다.
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials {
        /// 잠금까지 남은 시도 횟수 (비밀번호 불일치인 경우에만 포함)
        remaining_attempts: Option<u32>,
    },

    /// 로그인 실패 횟수 초과로 잠긴 계정 (401 Unauthorized)
    #[error("계정이 잠겼습니다. {} 이후에 다시 시도해주세요", .locked_until.format("%Y-%m-%d %H:%M"))]
    AccountLocked { locked_until: DateTime<Utc> },

    /// 비활성화된 계정 (403 Forbidden)
    #[error("비활성화된 계정입니다. 관리자에게 문의하세요")]
    AccountInactive,

    /// 탈퇴(삭제)된 계정 (410 Gone)
    #[error("탈퇴한 계정입니다")]
    AccountDeleted,

    /// OAuth 계정으로 로컬 로그인 시도 (401 Unauthorized)
    #[error("{provider} 계정으로 로그인해주세요")]
    WrongAuthMethod { provider: OAuthProvider },

    /// 지원하지 않는 OAuth 제공자 (400 Bad Request)
    #[error("지원하지 않는 OAuth 제공자입니다: {0}")]
    UnsupportedProvider(String),

    /// OAuth 사용자 정보 파싱 실패 (400 Bad Request)
    #[error("OAuth 사용자 정보를 읽을 수 없습니다: {0}")]
    OAuthUserInfoError(String),

    /// 구조가 잘못되었거나 서명이 유효하지 않은 토큰 (401 Unauthorized)
    #[error("유효하지 않은 토큰입니다")]
    MalformedToken,

    /// 만료된 토큰 (401 Unauthorized)
    #[error("토큰이 만료되었습니다")]
    ExpiredToken,

    /// 알고리즘 또는 토큰 타입이 맞지 않는 토큰 (401 Unauthorized)
    #[error("지원하지 않는 토큰입니다")]
    UnsupportedToken,

    /// 이메일 중복 (409 Conflict)
    #[error("이미 사용 중인 이메일입니다")]
    EmailAlreadyExists,

    /// 사용자 없음 (404 Not Found)
    ///
    /// 로그인 경로에서는 사용하지 않습니다. 이미 인증된 사용자의
    /// 자기 정보 조회(`/me`, 토큰 갱신)에서만 사용합니다.
    #[error("사용자를 찾을 수 없습니다")]
    UserNotFound,

    /// 입력값 검증 에러 (400 Bad Request)
    #[error("입력값이 올바르지 않습니다: {0}")]
    ValidationError(String),

    /// 저장소 에러 (500 Internal Server Error)
    ///
    /// 코어에서 재시도하지 않고 그대로 전파합니다.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// 에러 코드를 반환합니다.
    ///
    /// 클라이언트가 메시지 문자열 대신 기계적으로 분기할 수 있는 식별자입니다.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials { .. } => "E-U003",
            AuthError::AccountLocked { .. } => "E-U005",
            AuthError::AccountInactive => "E-U006",
            AuthError::AccountDeleted => "E-U007",
            AuthError::WrongAuthMethod { .. } => "E-U008",
            AuthError::UnsupportedProvider(_) => "E-O001",
            AuthError::OAuthUserInfoError(_) => "E-O002",
            AuthError::MalformedToken => "E-A003",
            AuthError::ExpiredToken => "E-A004",
            AuthError::UnsupportedToken => "E-A006",
            AuthError::EmailAlreadyExists => "E-U002",
            AuthError::UserNotFound => "E-U001",
            AuthError::ValidationError(_) => "E-C001",
            AuthError::DatabaseError(_) => "E-C998",
            AuthError::InternalError(_) => "E-C999",
        }
    }
}

impl actix_web::ResponseError for AuthError {
    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 각 에러 타입을 적절한 HTTP 상태 코드와 JSON 응답으로 변환합니다.
    /// 잠금 시각/남은 시도 횟수처럼 구조화된 정보는 별도 필드로 내려갑니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::http::StatusCode;

        let status = match self {
            AuthError::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            AuthError::AccountLocked { .. } => StatusCode::UNAUTHORIZED,
            AuthError::AccountInactive => StatusCode::FORBIDDEN,
            AuthError::AccountDeleted => StatusCode::GONE,
            AuthError::WrongAuthMethod { .. } => StatusCode::UNAUTHORIZED,
            AuthError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
            AuthError::OAuthUserInfoError(_) => StatusCode::BAD_REQUEST,
            AuthError::MalformedToken => StatusCode::UNAUTHORIZED,
            AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::UnsupportedToken => StatusCode::UNAUTHORIZED,
            AuthError::EmailAlreadyExists => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        });

        match self {
            AuthError::InvalidCredentials {
                remaining_attempts: Some(remaining),
            } => {
                body["remaining_attempts"] = serde_json::json!(remaining);
            }
            AuthError::AccountLocked { locked_until } => {
                body["locked_until"] = serde_json::json!(locked_until.to_rfc3339());
            }
            _ => {}
        }

        actix_web::HttpResponse::build(status).json(body)
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AuthResult<T> = Result<T, AuthError>;
