//! 도메인 모델
//!
//! 사용자 엔티티, 토큰 클레임, OAuth 표준 사용자 정보, 요청/응답 DTO 등
//! 비즈니스 로직이 다루는 타입들을 정의합니다.

pub mod auth;
pub mod dto;
pub mod entities;
pub mod oauth;
pub mod token;
