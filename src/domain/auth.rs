//! 인증 요청 컨텍스트 모델
//!
//! 미들웨어가 토큰 검증 후 Request Extensions에 싣는 사용자 정보와,
//! 라우트별 인증 요구사항(모드/권한)을 정의합니다.

use crate::domain::entities::user::Role;
use crate::domain::token::TokenClaims;

/// 토큰 검증을 통과한 요청의 사용자 정보
///
/// 액세스 토큰 클레임에서 추출되며, 핸들러는 저장소를 다시 조회하지 않고
/// 이 값으로 요청 주체를 식별합니다.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// 계정 ID (ObjectId hex)
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<TokenClaims> for AuthenticatedUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role.unwrap_or(Role::User),
        }
    }
}

/// 인증 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// 토큰이 없거나 유효하지 않으면 요청 거부
    Required,
    /// 토큰이 있으면 사용자 정보를 싣고, 없어도 진행 허용
    Optional,
}

/// 라우트 접근에 필요한 권한
#[derive(Debug, Clone)]
pub enum RequiredRole {
    /// 특정 권한 하나
    Single(Role),
    /// 나열된 권한 중 하나 이상
    Any(Vec<Role>),
}

impl RequiredRole {
    /// 사용자의 권한이 요구사항을 만족하는지 확인
    pub fn is_satisfied(&self, role: Role) -> bool {
        match self {
            RequiredRole::Single(required) => role == *required,
            RequiredRole::Any(allowed) => allowed.contains(&role),
        }
    }
}
