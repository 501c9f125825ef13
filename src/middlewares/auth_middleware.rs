//! JWT 인증 미들웨어
//!
//! Actix-web 요청 파이프라인에서 액세스 토큰을 검증하고 사용자 정보를
//! 추출합니다. 토큰 제공자는 전역 상태가 아니라 미들웨어 생성 시점에
//! 주입됩니다.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
};

use crate::domain::auth::{AuthMode, RequiredRole};
use crate::domain::entities::user::Role;
use crate::middlewares::auth_inner::AuthMiddlewareService;
use crate::services::token_service::JwtTokenProvider;

/// JWT 인증 미들웨어
pub struct AuthMiddleware {
    token_provider: Arc<JwtTokenProvider>,
    /// 인증 모드 (Required/Optional)
    mode: AuthMode,
    /// 접근에 필요한 권한 (선택사항)
    required_role: Option<RequiredRole>,
}

impl AuthMiddleware {
    /// 새로운 인증 미들웨어 생성
    pub fn new(token_provider: Arc<JwtTokenProvider>, mode: AuthMode) -> Self {
        Self {
            token_provider,
            mode,
            required_role: None,
        }
    }

    /// 필수 인증 미들웨어 생성
    pub fn required(token_provider: Arc<JwtTokenProvider>) -> Self {
        Self::new(token_provider, AuthMode::Required)
    }

    /// 선택적 인증 미들웨어 생성
    pub fn optional(token_provider: Arc<JwtTokenProvider>) -> Self {
        Self::new(token_provider, AuthMode::Optional)
    }

    /// 특정 권한 요구 인증 미들웨어 생성
    pub fn required_with_role(token_provider: Arc<JwtTokenProvider>, role: Role) -> Self {
        Self {
            token_provider,
            mode: AuthMode::Required,
            required_role: Some(RequiredRole::Single(role)),
        }
    }

    /// 복수 권한 중 하나 요구 인증 미들웨어 생성
    pub fn required_with_roles(token_provider: Arc<JwtTokenProvider>, roles: Vec<Role>) -> Self {
        Self {
            token_provider,
            mode: AuthMode::Required,
            required_role: Some(RequiredRole::Any(roles)),
        }
    }
}

/// Actix-web Transform trait 구현
impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            token_provider: self.token_provider.clone(),
            mode: self.mode,
            required_role: self.required_role.clone(),
        }))
    }
}
