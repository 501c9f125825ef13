//! API 라우트 설정 모듈
//!
//! 인증 관련 엔드포인트와 헬스체크를 등록합니다.
//!
//! # Routes
//!
//! ## Public
//! - `POST /api/v1/auth/signup` - 회원가입
//! - `POST /api/v1/auth/login` - 이메일/비밀번호 로그인
//! - `POST /api/v1/auth/oauth/{provider}` - OAuth 로그인 (google/kakao/naver)
//! - `POST /api/v1/auth/refresh` - 토큰 갱신
//! - `GET /health` - 헬스체크
//!
//! ## Protected (Bearer 액세스 토큰 필요)
//! - `GET /api/v1/auth/me` - 내 정보 조회

use std::sync::Arc;

use actix_web::web;
use serde_json::json;

use crate::handlers;
use crate::middlewares::AuthMiddleware;
use crate::services::JwtTokenProvider;

/// 모든 라우트를 설정합니다
pub fn configure_all_routes(
    cfg: &mut web::ServiceConfig,
    token_provider: Arc<JwtTokenProvider>,
) {
    // Health check endpoint
    cfg.service(health_check);

    // 보호 구역은 public scope보다 먼저 등록해야 경로가 가려지지 않는다
    cfg.service(
        web::scope("/api/v1/auth/me")
            .wrap(AuthMiddleware::required(token_provider))
            .service(handlers::auth::get_current_user),
    );

    // 인증 엔드포인트 (public)
    cfg.service(
        web::scope("/api/v1/auth")
            .service(handlers::auth::signup)
            .service(handlers::auth::login)
            .service(handlers::auth::oauth_login)
            .service(handlers::auth::refresh),
    );
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// 로드밸런서나 모니터링 시스템에서 서비스 상태를 확인하는 데 사용됩니다.
#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "user_auth_service",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
