//! OAuth 제공자별 사용자 정보 정규화
//!
//! Google, Kakao, Naver가 내려주는 서로 다른 user-info 응답 구조를
//! 하나의 표준 형태([`OAuthUserInfo`])로 변환합니다. 순수 데이터 변환만
//! 수행하며 네트워크 I/O는 하지 않습니다. 토큰 교환 등 제공자와의 통신은
//! 이 코어 바깥(게이트웨이)의 책임입니다.
//!
//! ## 제공자별 응답 구조
//!
//! | 제공자 | 구조 | 주요 필드 |
//! |--------|------|-----------|
//! | Google | 평탄(OIDC) | `sub`, `email`, `name`, `picture` |
//! | Kakao | `kakao_account.profile` 중첩 | `id`, `email`, `nickname`, `profile_image_url` |
//! | Naver | `response` 중첩 | `id`, `email`, `name`, `profile_image` |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AuthError;

/// 지원하는 OAuth 제공자
///
/// 저장소에는 대문자 이름(`GOOGLE` 등)으로 직렬화됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OAuthProvider {
    Google,
    Kakao,
    Naver,
}

impl OAuthProvider {
    /// registration id 문자열에서 제공자를 찾습니다 (대소문자 무관).
    ///
    /// 지원하지 않는 제공자는 `UnsupportedProvider` 에러가 됩니다.
    pub fn from_registration_id(s: &str) -> Result<Self, AuthError> {
        match s.to_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "kakao" => Ok(OAuthProvider::Kakao),
            "naver" => Ok(OAuthProvider::Naver),
            _ => Err(AuthError::UnsupportedProvider(s.to_string())),
        }
    }

    /// 소문자 registration id를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Kakao => "kakao",
            OAuthProvider::Naver => "naver",
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OAuthProvider::Google => "GOOGLE",
            OAuthProvider::Kakao => "KAKAO",
            OAuthProvider::Naver => "NAVER",
        };
        write!(f, "{}", name)
    }
}

/// 정규화된 OAuth 사용자 정보
///
/// 어떤 제공자로 로그인했든 다운스트림 로직은 이 형태 하나만 봅니다.
/// 로그인 시도마다 새로 생성되며, 매칭/프로비저닝된 계정과 별도로
/// 저장되지는 않습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthUserInfo {
    pub provider: OAuthProvider,
    /// 제공자 범위의 고유 사용자 ID
    pub provider_id: String,
    pub email: String,
    pub name: String,
    pub profile_image_url: Option<String>,
}

impl OAuthUserInfo {
    /// 제공자의 원본 user-info 응답에서 표준 사용자 정보를 추출합니다.
    ///
    /// 제공자별로 중첩 구조가 다르므로 variant별로 분기합니다.
    /// 필수 필드(id, email, name)가 없으면 `OAuthUserInfoError`로 실패합니다.
    pub fn from_attributes(
        provider: OAuthProvider,
        attributes: &Value,
    ) -> Result<Self, AuthError> {
        match provider {
            OAuthProvider::Google => Self::from_google(attributes),
            OAuthProvider::Kakao => Self::from_kakao(attributes),
            OAuthProvider::Naver => Self::from_naver(attributes),
        }
    }

    /// Google OIDC userinfo: 평탄한 구조
    fn from_google(attributes: &Value) -> Result<Self, AuthError> {
        Ok(Self {
            provider: OAuthProvider::Google,
            provider_id: required_str(attributes, "sub")?,
            email: required_str(attributes, "email")?,
            name: required_str(attributes, "name")?,
            profile_image_url: optional_str(attributes, "picture"),
        })
    }

    /// Kakao: 최상위 `id`는 숫자, 나머지는 `kakao_account` 아래에 중첩
    fn from_kakao(attributes: &Value) -> Result<Self, AuthError> {
        let id = attributes
            .get("id")
            .and_then(|v| {
                v.as_i64()
                    .map(|n| n.to_string())
                    .or_else(|| v.as_str().map(str::to_string))
            })
            .ok_or_else(|| missing_field("id"))?;

        let account = attributes
            .get("kakao_account")
            .ok_or_else(|| missing_field("kakao_account"))?;
        let profile = account
            .get("profile")
            .ok_or_else(|| missing_field("kakao_account.profile"))?;

        Ok(Self {
            provider: OAuthProvider::Kakao,
            provider_id: id,
            email: required_str(account, "email")?,
            name: required_str(profile, "nickname")?,
            profile_image_url: optional_str(profile, "profile_image_url"),
        })
    }

    /// Naver: 전체 페이로드가 `response` 객체 아래에 중첩
    fn from_naver(attributes: &Value) -> Result<Self, AuthError> {
        let response = attributes
            .get("response")
            .ok_or_else(|| missing_field("response"))?;

        Ok(Self {
            provider: OAuthProvider::Naver,
            provider_id: required_str(response, "id")?,
            email: required_str(response, "email")?,
            name: required_str(response, "name")?,
            profile_image_url: optional_str(response, "profile_image"),
        })
    }
}

fn required_str(value: &Value, key: &str) -> Result<String, AuthError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing_field(key))
}

fn optional_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn missing_field(key: &str) -> AuthError {
    AuthError::OAuthUserInfoError(format!("필수 필드가 없습니다: {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_from_registration_id() {
        assert_eq!(
            OAuthProvider::from_registration_id("google").unwrap(),
            OAuthProvider::Google
        );
        assert_eq!(
            OAuthProvider::from_registration_id("KAKAO").unwrap(),
            OAuthProvider::Kakao
        );
        assert_eq!(
            OAuthProvider::from_registration_id("Naver").unwrap(),
            OAuthProvider::Naver
        );

        let err = OAuthProvider::from_registration_id("twitter").unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedProvider(tag) if tag == "twitter"));
    }

    #[test]
    fn test_provider_roundtrip() {
        for provider in [
            OAuthProvider::Google,
            OAuthProvider::Kakao,
            OAuthProvider::Naver,
        ] {
            assert_eq!(
                OAuthProvider::from_registration_id(provider.as_str()).unwrap(),
                provider
            );
        }
    }

    #[test]
    fn test_provider_serialization() {
        let json = serde_json::to_string(&OAuthProvider::Naver).unwrap();
        assert_eq!(json, "\"NAVER\"");

        let provider: OAuthProvider = serde_json::from_str("\"GOOGLE\"").unwrap();
        assert_eq!(provider, OAuthProvider::Google);
    }

    #[test]
    fn test_normalize_google() {
        let attributes = json!({
            "sub": "109876543210",
            "email": "alice@gmail.com",
            "name": "Alice",
            "picture": "https://lh3.googleusercontent.com/a/photo.jpg"
        });

        let info =
            OAuthUserInfo::from_attributes(OAuthProvider::Google, &attributes).unwrap();
        assert_eq!(info.provider_id, "109876543210");
        assert_eq!(info.email, "alice@gmail.com");
        assert_eq!(info.name, "Alice");
        assert_eq!(
            info.profile_image_url.as_deref(),
            Some("https://lh3.googleusercontent.com/a/photo.jpg")
        );
    }

    #[test]
    fn test_normalize_kakao_nested_account() {
        let attributes = json!({
            "id": 2345678901i64,
            "kakao_account": {
                "email": "bob@kakao.com",
                "profile": {
                    "nickname": "밥",
                    "profile_image_url": "https://k.kakaocdn.net/img.jpg"
                }
            }
        });

        let info =
            OAuthUserInfo::from_attributes(OAuthProvider::Kakao, &attributes).unwrap();
        assert_eq!(info.provider_id, "2345678901");
        assert_eq!(info.email, "bob@kakao.com");
        assert_eq!(info.name, "밥");
    }

    #[test]
    fn test_normalize_naver_nested_response() {
        let attributes = json!({
            "resultcode": "00",
            "message": "success",
            "response": {
                "id": "naver-abc-123",
                "email": "carol@naver.com",
                "name": "캐롤",
                "profile_image": "https://phinf.pstatic.net/profile.png"
            }
        });

        let info =
            OAuthUserInfo::from_attributes(OAuthProvider::Naver, &attributes).unwrap();
        assert_eq!(info.provider, OAuthProvider::Naver);
        assert_eq!(info.provider_id, "naver-abc-123");
        assert_eq!(info.email, "carol@naver.com");
        assert_eq!(info.name, "캐롤");
        assert_eq!(
            info.profile_image_url.as_deref(),
            Some("https://phinf.pstatic.net/profile.png")
        );
    }

    #[test]
    fn test_normalize_missing_required_field() {
        // Naver 응답에 email이 없는 경우
        let attributes = json!({
            "response": { "id": "naver-abc-123", "name": "캐롤" }
        });

        let err =
            OAuthUserInfo::from_attributes(OAuthProvider::Naver, &attributes).unwrap_err();
        assert!(matches!(err, AuthError::OAuthUserInfoError(_)));
    }

    #[test]
    fn test_normalize_naver_without_wrapper() {
        // 중첩 response 없이 평탄한 페이로드가 오면 실패해야 함
        let attributes = json!({ "id": "x", "email": "y@z.com", "name": "y" });

        let err =
            OAuthUserInfo::from_attributes(OAuthProvider::Naver, &attributes).unwrap_err();
        assert!(matches!(err, AuthError::OAuthUserInfoError(_)));
    }
}
