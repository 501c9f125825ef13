//! JWT 토큰 클레임과 토큰 쌍
//!
//! RFC 7519 표준 클레임(sub/iat/exp)에 애플리케이션 클레임을 더한
//! 페이로드 구조와, 클라이언트에 전달되는 액세스/리프레시 토큰 쌍을
//! 정의합니다.

use serde::{Deserialize, Serialize};

use crate::domain::entities::user::Role;

/// 토큰 용도 구분자
///
/// 리프레시 토큰으로 보호된 API를 호출하는 것을 막기 위해 모든 토큰에
/// `type` 클레임으로 포함됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT 토큰의 클레임(Payload) 구조체
///
/// - `sub`: 토큰 주체 (계정 ID, ObjectId hex — 두 토큰 모두 동일 기준)
/// - `email` / `role`: 액세스 토큰에만 포함. 리프레시 토큰은 탈취 시
///   피해 범위를 줄이기 위해 주체와 타입만 담습니다.
/// - `iat` / `exp`: 발급/만료 시각 (Unix timestamp)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 토큰의 주체 (계정 ID)
    pub sub: String,
    /// 사용자 이메일 (액세스 토큰 전용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 사용자 권한 (액세스 토큰 전용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// 토큰 용도 구분자
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// 토큰 발급 시각 (Unix timestamp)
    pub iat: i64,
    /// 토큰 만료 시각 (Unix timestamp)
    pub exp: i64,
}

/// 액세스 + 리프레시 토큰 쌍
///
/// 성공한 인증 이벤트마다 새로 발급되며, 이후에는 상태 없이
/// 서명과 만료 검사만으로 유효성이 결정됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// 토큰 타입 (항상 "Bearer")
    pub grant_type: String,
    /// API 접근용 단기 토큰
    pub access_token: String,
    /// 토큰 갱신용 장기 토큰
    pub refresh_token: String,
    /// 액세스 토큰 만료 시각 (Unix timestamp, 초)
    pub access_token_expires_at: i64,
    /// 리프레시 토큰 만료 시각 (Unix timestamp, 초)
    pub refresh_token_expires_at: i64,
}
