//! AuthMiddleware 인증 로직의 핵심적인 기능

use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::future::LocalBoxFuture;

use crate::domain::auth::{AuthMode, AuthenticatedUser, RequiredRole};
use crate::errors::{AuthError, AuthResult};
use crate::services::token_service::JwtTokenProvider;

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub token_provider: Arc<JwtTokenProvider>,
    pub mode: AuthMode,
    pub required_role: Option<RequiredRole>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let token_provider = self.token_provider.clone();
        let mode = self.mode;
        let required_role = self.required_role.clone();

        Box::pin(async move {
            // Authorization 헤더에서 토큰 추출 시도
            let auth_result = authenticate_request(&req, &token_provider);

            match (&mode, auth_result) {
                // Required 모드에서 인증 실패
                (AuthMode::Required, Err(err)) => {
                    log::warn!("인증 실패: {}", err);
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "code": err.code(),
                        "message": err.to_string(),
                    }));
                    let (req, _) = req.into_parts();
                    let res = ServiceResponse::new(req, response).map_into_right_body();
                    return Ok(res);
                }
                // Required 모드에서 인증 성공
                (AuthMode::Required, Ok(user)) => {
                    // 권한 검증
                    if let Some(ref required) = required_role {
                        if !required.is_satisfied(user.role) {
                            log::warn!(
                                "권한 부족: 사용자 ID {} ({:?}), 필요 권한: {:?}",
                                user.user_id,
                                user.role,
                                required
                            );
                            let response = HttpResponse::Forbidden().json(serde_json::json!({
                                "code": "E-C002",
                                "message": "접근 권한이 부족합니다",
                            }));
                            let (req, _) = req.into_parts();
                            let res = ServiceResponse::new(req, response).map_into_right_body();
                            return Ok(res);
                        }
                    }

                    // 사용자 정보를 Request Extensions에 저장
                    req.extensions_mut().insert(user.clone());
                    log::debug!("인증 성공: 사용자 ID {}", user.user_id);
                }
                // Optional 모드에서 인증 성공
                (AuthMode::Optional, Ok(user)) => {
                    // 권한 검증 (Optional 모드에서는 실패해도 진행)
                    let satisfied = required_role
                        .as_ref()
                        .map(|required| required.is_satisfied(user.role))
                        .unwrap_or(true);
                    if satisfied {
                        req.extensions_mut().insert(user.clone());
                        log::debug!("선택적 인증 성공: 사용자 ID {}", user.user_id);
                    } else {
                        log::debug!("선택적 인증: 권한 부족하지만 진행 허용");
                    }
                }
                // Optional 모드에서 인증 실패 (진행 허용)
                (AuthMode::Optional, Err(_)) => {
                    log::debug!("선택적 인증: 토큰 없음, 요청 진행");
                }
            }

            // 다음 서비스로 요청 전달
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// 요청에서 액세스 토큰을 추출하고 검증
fn authenticate_request(
    req: &ServiceRequest,
    token_provider: &JwtTokenProvider,
) -> AuthResult<AuthenticatedUser> {
    // Authorization 헤더 추출
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MalformedToken)?;

    // Bearer 토큰 추출 후 액세스 토큰 검증 (리프레시 토큰은 거부)
    let token = token_provider.extract_bearer_token(auth_header)?;
    let claims = token_provider.validate_access_token(token)?;

    Ok(AuthenticatedUser::from(claims))
}
