//! 설정 모듈
//!
//! 환경 변수 기반의 설정값들을 관리합니다.
//!
//! - [`auth_config`] - JWT, 비밀번호 해시 설정
//! - [`data_config`] - 서버, 실행 환경 설정
//!
//! 민감한 값(서명 키 등)은 환경 변수로만 받으며, 프로세스 시작 시 한 번
//! 읽혀 불변 값 객체로 각 서비스 생성자에 전달됩니다.

pub mod auth_config;
pub mod data_config;

pub use auth_config::{JwtSettings, PasswordConfig, MIN_JWT_SECRET_BYTES};
pub use data_config::{Environment, ServerConfig};
