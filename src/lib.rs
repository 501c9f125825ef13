//! # 사용자 인증 서비스
//!
//! 이메일/비밀번호 인증과 OAuth(Google/Kakao/Naver) 인증을 처리하고 JWT
//! 액세스/리프레시 토큰을 발급하는 인증 백엔드입니다.
//!
//! ## 아키텍처
//!
//! - [`handlers`] / [`routes`] - HTTP 입출력 (Actix-web)
//! - [`middlewares`] - 보호 경로의 JWT 검증
//! - [`services`] - 인증 의사결정 파이프라인, 잠금 정책, 토큰 발급
//! - [`repositories`] - MongoDB 영속성 ([`repositories::UserStore`] 트레이트)
//! - [`domain`] - 엔티티, 클레임, DTO, OAuth 정규화
//! - [`config`] / [`db`] / [`errors`] - 설정, 연결, 오류 타입
//!
//! ## 핵심 정책
//!
//! 비밀번호 5회 연속 실패 시 계정이 1시간 잠기며, 잠금 해제는 명시적
//! 해제 없이 시간 경과로 이루어집니다. 실패 카운터 갱신은 저장소에서
//! 원자적으로 수행됩니다.

pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod middlewares;
pub mod repositories;
pub mod routes;
pub mod services;
