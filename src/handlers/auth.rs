//! 인증 API 핸들러
//!
//! 회원가입, 로그인, OAuth 로그인, 토큰 갱신, 내 정보 조회 엔드포인트를
//! 제공합니다. 핸들러는 입력 검증과 DTO 변환만 담당하고 의사결정은 모두
//! 서비스 계층에 위임합니다.

use actix_web::{get, post, web, HttpMessage, HttpRequest, HttpResponse};
use chrono::Utc;
use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::dto::request::{LoginRequest, RefreshTokenRequest, SignupRequest};
use crate::domain::dto::response::{LoginResponse, UserResponse};
use crate::domain::oauth::{OAuthProvider, OAuthUserInfo};
use crate::errors::{AuthError, AuthResult};
use crate::services::{AuthService, UserService};

/// 회원가입
///
/// `POST /api/v1/auth/signup`
#[post("/signup")]
pub async fn signup(
    user_service: web::Data<UserService>,
    payload: web::Json<SignupRequest>,
) -> AuthResult<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let user = user_service.signup(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// 이메일/비밀번호 로그인
///
/// `POST /api/v1/auth/login`
#[post("/login")]
pub async fn login(
    auth_service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> AuthResult<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let (user, tokens) = auth_service
        .login(&payload.email, &payload.password)
        .await?;
    Ok(HttpResponse::Ok().json(LoginResponse::new(&user, tokens)))
}

/// OAuth 로그인
///
/// `POST /api/v1/auth/oauth/{provider}`
///
/// 본문은 제공자가 반환한 user-info 응답 원본입니다. 제공자와의 네트워크
/// 핸드셰이크는 게이트웨이 계층의 책임이고, 여기서는 정규화와 계정
/// 프로비저닝만 수행합니다.
#[post("/oauth/{provider}")]
pub async fn oauth_login(
    auth_service: web::Data<AuthService>,
    path: web::Path<String>,
    payload: web::Json<serde_json::Value>,
) -> AuthResult<HttpResponse> {
    let provider = OAuthProvider::from_registration_id(&path.into_inner())?;
    let attributes = payload.into_inner();
    let info = OAuthUserInfo::from_attributes(provider, &attributes)?;

    let (user, tokens) = auth_service.authenticate_oauth(info, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(LoginResponse::new(&user, tokens)))
}

/// 토큰 갱신
///
/// `POST /api/v1/auth/refresh`
#[post("/refresh")]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    payload: web::Json<RefreshTokenRequest>,
) -> AuthResult<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let (user, tokens) = auth_service.refresh(&payload.refresh_token).await?;
    Ok(HttpResponse::Ok().json(LoginResponse::new(&user, tokens)))
}

/// 내 정보 조회
///
/// `GET /api/v1/auth/me` — 인증 미들웨어를 통과한 요청만 도달합니다.
/// 전체 경로는 보호 scope가 결정하므로 핸들러 경로는 비워 둡니다.
#[get("")]
pub async fn get_current_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> AuthResult<HttpResponse> {
    let authenticated = req
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(AuthError::MalformedToken)?;

    let user = user_service.find_by_id(&authenticated.user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
