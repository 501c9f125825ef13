//! 비밀번호 해싱 서비스
//!
//! bcrypt 기반 비밀번호 해싱과 검증을 담당합니다. cost factor는
//! [`crate::config::PasswordConfig`]에서 환경 변수로 조정합니다.

use bcrypt::{hash, verify};

use crate::config::PasswordConfig;
use crate::errors::{AuthError, AuthResult};

/// bcrypt 비밀번호 인코더
///
/// 생성 시점에 cost factor를 고정하고, 이후 해싱/검증에 동일한 설정을
/// 사용합니다.
#[derive(Clone)]
pub struct PasswordEncoder {
    cost: u32,
}

impl PasswordEncoder {
    /// 환경 변수 설정으로 인코더를 생성합니다.
    pub fn new() -> Self {
        Self {
            cost: PasswordConfig::bcrypt_cost(),
        }
    }

    /// 명시적 cost로 인코더를 생성합니다 (테스트 용도).
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// 평문 비밀번호를 해싱합니다.
    pub fn hash_password(&self, raw_password: &str) -> AuthResult<String> {
        hash(raw_password, self.cost)
            .map_err(|e| AuthError::InternalError(format!("비밀번호 해싱 실패: {}", e)))
    }

    /// 평문 비밀번호가 저장된 해시와 일치하는지 검증합니다.
    ///
    /// 해시 파싱 실패는 저장 데이터 이상이므로 내부 오류로 처리합니다.
    pub fn verify_password(&self, raw_password: &str, password_hash: &str) -> AuthResult<bool> {
        verify(raw_password, password_hash)
            .map_err(|e| AuthError::InternalError(format!("비밀번호 검증 실패: {}", e)))
    }
}

impl Default for PasswordEncoder {
    fn default() -> Self {
        Self::new()
    }
}
