//! 비즈니스 로직 서비스
//!
//! - [`auth_service`] - 인증 의사결정 파이프라인 (잠금 정책 포함)
//! - [`user_service`] - 회원가입, 사용자 조회
//! - [`token_service`] - JWT 발급/검증
//! - [`password_service`] - bcrypt 해싱/검증

pub mod auth_service;
pub mod password_service;
pub mod token_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use password_service::PasswordEncoder;
pub use token_service::JwtTokenProvider;
pub use user_service::UserService;
