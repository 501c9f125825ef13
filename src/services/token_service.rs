//! JWT 토큰 발급/검증 서비스
//!
//! HS512 대칭키 서명 기반의 액세스/리프레시 토큰을 관리합니다.
//! 서명 키와 토큰 수명은 생성 시점에 [`JwtSettings`]로 고정되며, 이후
//! 전역 상태 없이 동작합니다.

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::config::{JwtSettings, MIN_JWT_SECRET_BYTES};
use crate::domain::entities::user::User;
use crate::domain::token::{TokenClaims, TokenPair, TokenType};
use crate::errors::{AuthError, AuthResult};

/// JWT 토큰 제공자
///
/// 키 자료는 생성자에서 한 번 파싱해 보관합니다.
#[derive(Clone)]
pub struct JwtTokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_validity_secs: i64,
    refresh_token_validity_secs: i64,
}

impl JwtTokenProvider {
    /// 설정으로부터 토큰 제공자를 생성합니다.
    ///
    /// HMAC-SHA512 기준으로 서명 키가 32바이트 미만이면 거부합니다.
    pub fn new(settings: &JwtSettings) -> AuthResult<Self> {
        if settings.secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(AuthError::InternalError(format!(
                "JWT 서명 키가 너무 짧습니다 (최소 {}바이트)",
                MIN_JWT_SECRET_BYTES
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            access_token_validity_secs: settings.access_token_validity_secs,
            refresh_token_validity_secs: settings.refresh_token_validity_secs,
        })
    }

    /// 인증에 성공한 사용자에게 토큰 쌍을 발급합니다.
    pub fn issue_token_pair(&self, user: &User) -> AuthResult<TokenPair> {
        self.issue_token_pair_at(user, Utc::now())
    }

    /// 명시적 발급 시각으로 토큰 쌍을 발급합니다 (테스트 용도 포함).
    pub fn issue_token_pair_at(&self, user: &User, now: DateTime<Utc>) -> AuthResult<TokenPair> {
        let user_id = user
            .id_string()
            .ok_or_else(|| AuthError::InternalError("저장되지 않은 사용자입니다".to_string()))?;

        let iat = now.timestamp();
        let access_exp = iat + self.access_token_validity_secs;
        let refresh_exp = iat + self.refresh_token_validity_secs;

        let access_claims = TokenClaims {
            sub: user_id.clone(),
            email: Some(user.email.clone()),
            role: Some(user.role),
            token_type: TokenType::Access,
            iat,
            exp: access_exp,
        };

        // 리프레시 토큰은 주체와 타입만 담는다
        let refresh_claims = TokenClaims {
            sub: user_id,
            email: None,
            role: None,
            token_type: TokenType::Refresh,
            iat,
            exp: refresh_exp,
        };

        let access_token = self.sign(&access_claims)?;
        let refresh_token = self.sign(&refresh_claims)?;

        Ok(TokenPair {
            grant_type: "Bearer".to_string(),
            access_token,
            refresh_token,
            access_token_expires_at: access_exp,
            refresh_token_expires_at: refresh_exp,
        })
    }

    fn sign(&self, claims: &TokenClaims) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS512), claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("토큰 서명 실패: {}", e)))
    }

    /// 토큰 서명과 만료를 검증하고 클레임을 반환합니다.
    ///
    /// 만료 판정에 유예 시간(leeway)은 두지 않습니다.
    pub fn validate_token(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    AuthError::UnsupportedToken
                }
                _ => AuthError::MalformedToken,
            })
    }

    /// 액세스 토큰을 검증합니다. 리프레시 토큰을 제시하면 거부합니다.
    pub fn validate_access_token(&self, token: &str) -> AuthResult<TokenClaims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(AuthError::UnsupportedToken);
        }
        Ok(claims)
    }

    /// 리프레시 토큰을 검증합니다. 액세스 토큰을 제시하면 거부합니다.
    pub fn validate_refresh_token(&self, token: &str) -> AuthResult<TokenClaims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::UnsupportedToken);
        }
        Ok(claims)
    }

    /// `Authorization` 헤더 값에서 Bearer 토큰을 추출합니다.
    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> AuthResult<&'a str> {
        auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedToken)
    }
}
