//! 인증 관련 설정
//!
//! JWT 서명 키와 토큰 수명, 비밀번호 해시 비용 설정을 관리합니다.
//!
//! ## 환경 변수
//!
//! ```bash
//! export JWT_SECRET="your-super-secret-256-bit-key-generated-securely"
//! export JWT_ACCESS_TOKEN_VALIDITY_SECONDS="1800"     # 30분
//! export JWT_REFRESH_TOKEN_VALIDITY_SECONDS="259200"  # 3일
//! export BCRYPT_COST="12"
//! ```
//!
//! 서명 키는 프로세스 시작 시 한 번 읽혀 [`JwtSettings`] 값으로 고정되고
//! 이후 변경되지 않습니다. 전역 static이 아니라 명시적으로 생성해서
//! 토큰 서비스 생성자에 넘기는 값 객체입니다.

use std::env;

use crate::errors::AuthError;

/// 액세스 토큰 기본 수명: 30분
pub const DEFAULT_ACCESS_TOKEN_VALIDITY_SECS: i64 = 30 * 60;

/// 리프레시 토큰 기본 수명: 3일
pub const DEFAULT_REFRESH_TOKEN_VALIDITY_SECS: i64 = 3 * 24 * 60 * 60;

/// HMAC 서명 키 최소 길이 (바이트)
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// JWT 토큰 발급/검증 설정
///
/// [`crate::services::token_service::JwtTokenProvider`] 생성 시 한 번
/// 전달되는 불변 설정입니다.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    /// HMAC 서명 비밀키
    pub secret: String,
    /// 액세스 토큰 수명 (초)
    pub access_token_validity_secs: i64,
    /// 리프레시 토큰 수명 (초)
    pub refresh_token_validity_secs: i64,
}

impl JwtSettings {
    /// 명시적 값으로 설정을 생성합니다 (테스트 용도 포함).
    pub fn new(
        secret: impl Into<String>,
        access_token_validity_secs: i64,
        refresh_token_validity_secs: i64,
    ) -> Self {
        Self {
            secret: secret.into(),
            access_token_validity_secs,
            refresh_token_validity_secs,
        }
    }

    /// 환경 변수에서 설정을 읽습니다.
    ///
    /// `JWT_SECRET`은 필수입니다. 키 길이 검증은 토큰 서비스 생성자에서
    /// 수행됩니다.
    pub fn from_env() -> Result<Self, AuthError> {
        let secret = env::var("JWT_SECRET").map_err(|_| {
            AuthError::InternalError("JWT_SECRET 환경 변수가 설정되지 않았습니다".to_string())
        })?;

        let access_token_validity_secs = parse_secs(
            "JWT_ACCESS_TOKEN_VALIDITY_SECONDS",
            DEFAULT_ACCESS_TOKEN_VALIDITY_SECS,
        );
        let refresh_token_validity_secs = parse_secs(
            "JWT_REFRESH_TOKEN_VALIDITY_SECONDS",
            DEFAULT_REFRESH_TOKEN_VALIDITY_SECS,
        );

        Ok(Self {
            secret,
            access_token_validity_secs,
            refresh_token_validity_secs,
        })
    }
}

fn parse_secs(key: &str, default: i64) -> i64 {
    match env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("{} 파싱 실패, 기본값 {} 사용", key, default);
            default
        }),
        Err(_) => default,
    }
}

/// 비밀번호 해시 설정
pub struct PasswordConfig;

impl PasswordConfig {
    /// bcrypt cost factor를 반환합니다.
    ///
    /// 4-15 범위를 벗어나면 기본값으로 되돌립니다. 값이 클수록 해시가
    /// 느려지고 무차별 대입 공격에 강해집니다.
    pub fn bcrypt_cost() -> u32 {
        let default = bcrypt::DEFAULT_COST;

        match env::var("BCRYPT_COST") {
            Ok(value) => match value.parse::<u32>() {
                Ok(cost) if (4..=15).contains(&cost) => cost,
                _ => {
                    log::warn!("BCRYPT_COST 값이 유효하지 않습니다. 기본값 {} 사용", default);
                    default
                }
            },
            Err(_) => default,
        }
    }
}
