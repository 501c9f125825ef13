//! 사용자 엔티티
//!
//! 로컬 인증(이메일/비밀번호)과 OAuth 인증을 모두 표현하는 통합 사용자
//! 모델입니다. 로그인 성공/실패에 따른 상태 전이는 모두 순수 함수로
//! 정의되어 있고, 전이 결과를 원자적으로 저장하는 책임은 저장소 계층
//! ([`crate::repositories::UserStore`])이 집니다.

use chrono::{DateTime, Duration, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::domain::oauth::{OAuthProvider, OAuthUserInfo};

/// 잠금이 걸리는 연속 로그인 실패 횟수
pub const MAX_LOGIN_FAIL_COUNT: u32 = 5;

/// 잠금 유지 시간 (시간 단위)
pub const ACCOUNT_LOCK_HOURS: i64 = 1;

/// 사용자 권한
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

/// 계정 상태
///
/// DELETED는 soft-delete이며 물리 삭제를 의미하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Inactive,
    Deleted,
}

/// 로그인 시도 결과에 따른 계정 상태 전이
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// 인증 성공: 실패 카운터/잠금 해제, 마지막 로그인 시각 기록
    Success,
    /// 비밀번호 불일치: 카운터 증가, 임계치 도달 시 잠금 설정
    Failure,
    /// 잠금 시간 경과: 명시적 해제 요청 없이 카운터/잠금 초기화
    LockExpired,
}

/// 사용자 엔티티
///
/// ## 불변식
///
/// 두 팩토리 경로 중 하나로 생성된 계정은 항상
/// {`password_hash` 존재} 와 {`provider` + `provider_id` 존재} 중
/// 정확히 하나만 성립합니다. 둘 다이거나 둘 다 아닌 상태는 없습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// OAuth 제공자 (로컬 가입 계정은 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<OAuthProvider>,
    /// 제공자 범위의 고유 ID (로컬 가입 계정은 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    /// 사용자 이메일 (unique)
    pub email: String,
    /// 해시된 비밀번호 (OAuth 계정은 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// 표시 이름
    pub name: String,
    /// 프로필 이미지 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// 권한
    pub role: Role,
    /// 계정 상태
    pub status: UserStatus,
    /// 연속 로그인 실패 횟수
    pub login_fail_count: u32,
    /// 잠금 만료 시각. 과거 시각이면 읽기 시점에 잠기지 않은 것으로 평가됩니다.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_locked_until: Option<mongodb::bson::DateTime>,
    /// 비밀번호 변경 시각 (OAuth 계정은 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<mongodb::bson::DateTime>,
    /// 생성 시각
    pub created_at: mongodb::bson::DateTime,
    /// 마지막 로그인 시각
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<mongodb::bson::DateTime>,
}

impl User {
    /// 일반 회원가입 사용자 생성
    pub fn new_local(
        email: String,
        password_hash: String,
        name: String,
        now: DateTime<Utc>,
    ) -> Self {
        let now = mongodb::bson::DateTime::from_chrono(now);

        Self {
            id: None,
            provider: None,
            provider_id: None,
            email,
            password_hash: Some(password_hash),
            name,
            profile_image_url: None,
            role: Role::User,
            status: UserStatus::Active,
            login_fail_count: 0,
            account_locked_until: None,
            password_changed_at: Some(now),
            created_at: now,
            last_login_at: None,
        }
    }

    /// OAuth 소셜 로그인 사용자 생성
    ///
    /// 첫 OAuth 로그인 시 정규화된 사용자 정보로 프로비저닝됩니다.
    pub fn new_oauth(info: OAuthUserInfo, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            provider: Some(info.provider),
            provider_id: Some(info.provider_id),
            email: info.email,
            password_hash: None,
            name: info.name,
            profile_image_url: info.profile_image_url,
            role: Role::User,
            status: UserStatus::Active,
            login_fail_count: 0,
            account_locked_until: None,
            password_changed_at: None,
            created_at: mongodb::bson::DateTime::from_chrono(now),
            last_login_at: None,
        }
    }

    /// ID를 hex 문자열로 반환
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    /// 일반 회원가입 사용자인지 확인
    pub fn is_local_user(&self) -> bool {
        self.provider.is_none()
    }

    /// OAuth 사용자인지 확인
    pub fn is_oauth_user(&self) -> bool {
        self.provider.is_some()
    }

    /// 잠금 만료 시각을 chrono 타입으로 반환
    pub fn locked_until(&self) -> Option<DateTime<Utc>> {
        self.account_locked_until.map(|dt| dt.to_chrono())
    }

    /// 주어진 시각 기준으로 계정이 잠겨 있는지 평가
    ///
    /// 만료된 잠금은 잠기지 않은 것으로 취급합니다. 실제 필드 초기화는
    /// [`LoginOutcome::LockExpired`] 전이로 수행됩니다.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.locked_until(), Some(until) if until > now)
    }

    /// 로그인 시도 결과를 적용한 새 계정 상태를 반환합니다.
    ///
    /// 이 함수는 순수합니다. 같은 계정에 대한 동시 시도 간의 경합은
    /// 저장소의 원자적 read-modify-write가 책임집니다.
    ///
    /// 실패 전이에서 잠금 시각은 카운터가 임계치에 *도달*할 때만
    /// 기록됩니다. 이미 잠긴 계정에 실패가 더 쌓여도 최초 잠금 시각이
    /// 유지되므로, 호출자는 항상 동일한 해제 시각을 보게 됩니다.
    pub fn with_login_outcome(mut self, outcome: LoginOutcome, now: DateTime<Utc>) -> Self {
        match outcome {
            LoginOutcome::Success => {
                self.login_fail_count = 0;
                self.account_locked_until = None;
                self.last_login_at = Some(mongodb::bson::DateTime::from_chrono(now));
            }
            LoginOutcome::Failure => {
                self.login_fail_count += 1;
                if self.login_fail_count >= MAX_LOGIN_FAIL_COUNT
                    && self.account_locked_until.is_none()
                {
                    let locked_until = now + Duration::hours(ACCOUNT_LOCK_HOURS);
                    self.account_locked_until =
                        Some(mongodb::bson::DateTime::from_chrono(locked_until));
                }
            }
            LoginOutcome::LockExpired => {
                self.login_fail_count = 0;
                self.account_locked_until = None;
            }
        }
        self
    }
}
