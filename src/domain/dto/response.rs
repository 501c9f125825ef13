//! 인증 응답 DTO

use serde::{Deserialize, Serialize};

use crate::domain::entities::user::{Role, User, UserStatus};
use crate::domain::oauth::OAuthProvider;
use crate::domain::token::TokenPair;

/// 사용자 응답 DTO
///
/// 비밀번호 해시, 실패 카운터 같은 내부 필드는 노출하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<OAuthProvider>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id_string().unwrap_or_default(),
            email: user.email.clone(),
            name: user.name.clone(),
            profile_image_url: user.profile_image_url.clone(),
            role: user.role,
            status: user.status,
            provider: user.provider,
            created_at: user.created_at.to_chrono().to_rfc3339(),
            last_login_at: user.last_login_at.map(|dt| dt.to_chrono().to_rfc3339()),
        }
    }
}

/// 로그인 응답 DTO
///
/// 인증된 사용자 정보와 토큰 쌍을 함께 반환합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub grant_type: String,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: i64,
    pub refresh_token_expires_at: i64,
}

impl LoginResponse {
    pub fn new(user: &User, tokens: TokenPair) -> Self {
        Self {
            user: UserResponse::from(user),
            grant_type: tokens.grant_type,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_token_expires_at: tokens.access_token_expires_at,
            refresh_token_expires_at: tokens.refresh_token_expires_at,
        }
    }
}
