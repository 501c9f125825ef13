//! 인증 정책 엔진
//!
//! 로컬(이메일/비밀번호) 인증과 OAuth 인증의 의사결정 파이프라인을
//! 구현합니다. 실패 카운터와 계정 잠금 정책이 여기서 집행되며, 검사
//! 순서는 엄격하게 고정되어 있습니다:
//!
//! 1. 이메일로 계정 조회 (없으면 자격 증명 오류로 통일)
//! 2. OAuth 가입 계정이면 로그인 방식 오류
//! 3. 비밀번호 검증 (불일치 시 카운터 증가, 임계치 도달 시 잠금)
//! 4. 계정 상태 검사 (INACTIVE / DELETED)
//! 5. 잠금 검사 (잠긴 계정이자 비활성 계정은 비활성으로 보고됨)
//! 6. 성공 부수효과 (카운터 초기화, 마지막 로그인 기록) 후 토큰 발급
//!
//! 만료된 잠금은 비밀번호 검증 전에 정리되어 카운터가 0에서 다시
//! 시작합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use mongodb::bson::oid::ObjectId;

use crate::domain::entities::user::{
    LoginOutcome, User, UserStatus, MAX_LOGIN_FAIL_COUNT,
};
use crate::domain::oauth::OAuthUserInfo;
use crate::domain::token::TokenPair;
use crate::errors::{AuthError, AuthResult};
use crate::repositories::UserStore;
use crate::services::password_service::PasswordEncoder;
use crate::services::token_service::JwtTokenProvider;

/// 인증 서비스
pub struct AuthService {
    store: Arc<dyn UserStore>,
    password_encoder: PasswordEncoder,
    token_provider: Arc<JwtTokenProvider>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        password_encoder: PasswordEncoder,
        token_provider: Arc<JwtTokenProvider>,
    ) -> Self {
        Self {
            store,
            password_encoder,
            token_provider,
        }
    }

    /// 이메일/비밀번호 로그인
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<(User, TokenPair)> {
        self.authenticate_local(email, password, Utc::now()).await
    }

    /// 명시적 기준 시각으로 로컬 인증을 수행합니다.
    pub async fn authenticate_local(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<(User, TokenPair)> {
        // 1. 계정 조회. 존재 여부는 응답으로 구분하지 않는다
        let user = match self.store.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("로그인 실패 (미등록 이메일): {}", mask_email(email));
                return Err(AuthError::InvalidCredentials {
                    remaining_attempts: None,
                });
            }
        };

        // 2. OAuth 가입 계정은 비밀번호 로그인 불가
        if let Some(provider) = user.provider {
            warn!(
                "로그인 실패 (OAuth 계정에 비밀번호 시도): {}",
                mask_email(email)
            );
            return Err(AuthError::WrongAuthMethod { provider });
        }

        // 만료된 잠금은 여기서 정리한다. 이후 검사들은 초기화된 상태를 본다
        let user = self.clear_expired_lock(user, now).await?;
        let user_id = require_id(&user)?;

        // 3. 비밀번호 검증. 불일치는 원자적 카운터 증가로 기록된다
        let password_hash = user
            .password_hash
            .as_deref()
            .ok_or_else(|| AuthError::InternalError("로컬 계정에 비밀번호 해시가 없습니다".to_string()))?;

        if !self.password_encoder.verify_password(password, password_hash)? {
            let updated = self
                .store
                .apply_login_outcome(&user_id, LoginOutcome::Failure, now)
                .await?;

            if updated.login_fail_count >= MAX_LOGIN_FAIL_COUNT {
                let locked_until = updated.locked_until().ok_or_else(|| {
                    AuthError::InternalError("잠금 임계치 도달 후 잠금 시각 누락".to_string())
                })?;
                warn!(
                    "로그인 실패 (잠금, {}회): {}",
                    updated.login_fail_count,
                    mask_email(email)
                );
                return Err(AuthError::AccountLocked { locked_until });
            }

            let remaining = MAX_LOGIN_FAIL_COUNT - updated.login_fail_count;
            warn!(
                "로그인 실패 (비밀번호 불일치, 남은 시도 {}회): {}",
                remaining,
                mask_email(email)
            );
            return Err(AuthError::InvalidCredentials {
                remaining_attempts: Some(remaining),
            });
        }

        // 4. 계정 상태. 잠금보다 먼저 검사한다
        check_status(&user)?;

        // 5. 잠금 검사
        if user.is_locked_at(now) {
            let locked_until = user.locked_until().ok_or_else(|| {
                AuthError::InternalError("잠금 평가와 잠금 시각 불일치".to_string())
            })?;
            warn!("로그인 실패 (계정 잠금): {}", mask_email(email));
            return Err(AuthError::AccountLocked { locked_until });
        }

        // 6. 성공 부수효과 및 토큰 발급
        let updated = self
            .store
            .apply_login_outcome(&user_id, LoginOutcome::Success, now)
            .await?;
        let tokens = self.token_provider.issue_token_pair_at(&updated, now)?;

        info!("로그인 성공: {}", mask_email(email));
        Ok((updated, tokens))
    }

    /// OAuth 인증
    ///
    /// 정규화된 사용자 정보로 (provider, provider_id) 조회 후, 없으면 새
    /// 계정을 프로비저닝합니다. OAuth 계정은 비밀번호 검증과 실패
    /// 카운터를 거치지 않습니다.
    pub async fn authenticate_oauth(
        &self,
        info: OAuthUserInfo,
        now: DateTime<Utc>,
    ) -> AuthResult<(User, TokenPair)> {
        let existing = self
            .store
            .find_by_provider_and_id(info.provider, &info.provider_id)
            .await?;

        let user = match existing {
            Some(user) => {
                check_status(&user)?;
                user
            }
            None => {
                // 같은 이메일의 로컬 계정과는 병합하지 않는다
                if self.store.exists_by_email(&info.email).await? {
                    return Err(AuthError::EmailAlreadyExists);
                }
                let provisioned = self.store.save(User::new_oauth(info, now)).await?;
                info!(
                    "OAuth 첫 로그인, 계정 생성: {}",
                    mask_email(&provisioned.email)
                );
                provisioned
            }
        };

        let user_id = require_id(&user)?;
        let updated = self
            .store
            .apply_login_outcome(&user_id, LoginOutcome::Success, now)
            .await?;
        let tokens = self.token_provider.issue_token_pair_at(&updated, now)?;

        info!("OAuth 로그인 성공: {}", mask_email(&updated.email));
        Ok((updated, tokens))
    }

    /// 리프레시 토큰으로 새 토큰 쌍을 발급합니다.
    ///
    /// 토큰 자체는 상태가 없으므로, 발급 전에 계정을 다시 조회해 상태를
    /// 재검사합니다.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<(User, TokenPair)> {
        self.refresh_at(refresh_token, Utc::now()).await
    }

    pub async fn refresh_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<(User, TokenPair)> {
        let claims = self.token_provider.validate_refresh_token(refresh_token)?;

        let user_id = ObjectId::parse_str(&claims.sub).map_err(|_| AuthError::MalformedToken)?;
        let user = self
            .store
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        check_status(&user)?;

        let tokens = self.token_provider.issue_token_pair_at(&user, now)?;
        Ok((user, tokens))
    }

    /// 만료된 잠금을 초기화한 계정 상태를 반환합니다.
    async fn clear_expired_lock(&self, user: User, now: DateTime<Utc>) -> AuthResult<User> {
        if user.locked_until().is_some() && !user.is_locked_at(now) {
            let user_id = require_id(&user)?;
            return self
                .store
                .apply_login_outcome(&user_id, LoginOutcome::LockExpired, now)
                .await;
        }
        Ok(user)
    }
}

fn check_status(user: &User) -> AuthResult<()> {
    match user.status {
        UserStatus::Active => Ok(()),
        UserStatus::Inactive => Err(AuthError::AccountInactive),
        UserStatus::Deleted => Err(AuthError::AccountDeleted),
    }
}

fn require_id(user: &User) -> AuthResult<ObjectId> {
    user.id
        .ok_or_else(|| AuthError::InternalError("저장되지 않은 사용자입니다".to_string()))
}

/// 로그에 남길 이메일을 마스킹합니다. `abcdef@x.com` -> `abc***@x.com`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let visible: String = local.chars().take(3).collect();
            format!("{}***@{}", visible, domain)
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtSettings;
    use crate::domain::oauth::OAuthProvider;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    /// 테스트용 인메모리 사용자 저장소
    struct InMemoryUserStore {
        users: Mutex<Vec<User>>,
    }

    impl InMemoryUserStore {
        fn new() -> Self {
            Self {
                users: Mutex::new(Vec::new()),
            }
        }

        fn get(&self, id: &ObjectId) -> Option<User> {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id.as_ref() == Some(id))
                .cloned()
        }
    }

    #[async_trait::async_trait]
    impl UserStore for InMemoryUserStore {
        async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_by_provider_and_id(
            &self,
            provider: OAuthProvider,
            provider_id: &str,
        ) -> AuthResult<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| {
                    u.provider == Some(provider) && u.provider_id.as_deref() == Some(provider_id)
                })
                .cloned())
        }

        async fn find_by_id(&self, id: &ObjectId) -> AuthResult<Option<User>> {
            Ok(self.get(id))
        }

        async fn exists_by_email(&self, email: &str) -> AuthResult<bool> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .any(|u| u.email == email))
        }

        async fn save(&self, mut user: User) -> AuthResult<User> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == user.email) {
                return Err(AuthError::EmailAlreadyExists);
            }
            user.id = Some(ObjectId::new());
            users.push(user.clone());
            Ok(user)
        }

        async fn apply_login_outcome(
            &self,
            id: &ObjectId,
            outcome: LoginOutcome,
            now: DateTime<Utc>,
        ) -> AuthResult<User> {
            let mut users = self.users.lock().unwrap();
            let slot = users
                .iter_mut()
                .find(|u| u.id.as_ref() == Some(id))
                .ok_or(AuthError::UserNotFound)?;
            *slot = slot.clone().with_login_outcome(outcome, now);
            Ok(slot.clone())
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn service() -> (Arc<InMemoryUserStore>, AuthService) {
        let store = Arc::new(InMemoryUserStore::new());
        let encoder = PasswordEncoder::with_cost(4);
        let settings = JwtSettings::new("a".repeat(64), 1800, 259_200);
        let provider = Arc::new(JwtTokenProvider::new(&settings).unwrap());
        let service = AuthService::new(store.clone(), encoder.clone(), provider);
        (store, service)
    }

    async fn seed_local(store: &InMemoryUserStore, email: &str, password: &str) -> User {
        let encoder = PasswordEncoder::with_cost(4);
        let user = User::new_local(
            email.to_string(),
            encoder.hash_password(password).unwrap(),
            "테스터".to_string(),
            fixed_now(),
        );
        store.save(user).await.unwrap()
    }

    fn naver_info(provider_id: &str, email: &str) -> OAuthUserInfo {
        OAuthUserInfo {
            provider: OAuthProvider::Naver,
            provider_id: provider_id.to_string(),
            email: email.to_string(),
            name: "네이버사용자".to_string(),
            profile_image_url: None,
        }
    }

    #[actix_web::test]
    async fn test_successful_login_issues_tokens_and_resets_state() {
        let (store, service) = service();
        let seeded = seed_local(&store, "user@example.com", "Secret123!").await;
        let now = fixed_now();

        let (user, tokens) = service
            .authenticate_local("user@example.com", "Secret123!", now)
            .await
            .unwrap();

        assert_eq!(user.id, seeded.id);
        assert_eq!(user.login_fail_count, 0);
        assert_eq!(user.last_login_at.map(|dt| dt.to_chrono()), Some(now));
        assert_eq!(tokens.access_token_expires_at, now.timestamp() + 1800);
        assert_eq!(tokens.refresh_token_expires_at, now.timestamp() + 259_200);
    }

    #[actix_web::test]
    async fn test_unknown_email_is_invalid_credentials() {
        let (_store, service) = service();

        let result = service
            .authenticate_local("nobody@example.com", "whatever", fixed_now())
            .await;

        // 계정 존재 여부가 드러나지 않도록 남은 시도 횟수도 없어야 한다
        assert!(matches!(
            result,
            Err(AuthError::InvalidCredentials {
                remaining_attempts: None
            })
        ));
    }

    #[actix_web::test]
    async fn test_wrong_password_increments_counter_with_remaining() {
        let (store, service) = service();
        let seeded = seed_local(&store, "user@example.com", "Secret123!").await;

        let result = service
            .authenticate_local("user@example.com", "wrong", fixed_now())
            .await;

        assert!(matches!(
            result,
            Err(AuthError::InvalidCredentials {
                remaining_attempts: Some(4)
            })
        ));
        let stored = store.get(&seeded.id.unwrap()).unwrap();
        assert_eq!(stored.login_fail_count, 1);
    }

    #[actix_web::test]
    async fn test_fifth_failure_locks_for_one_hour() {
        let (store, service) = service();
        seed_local(&store, "user@example.com", "Secret123!").await;
        let now = fixed_now();

        for _ in 0..4 {
            let _ = service
                .authenticate_local("user@example.com", "wrong", now)
                .await;
        }
        let result = service
            .authenticate_local("user@example.com", "wrong", now)
            .await;

        match result {
            Err(AuthError::AccountLocked { locked_until }) => {
                assert_eq!(locked_until, now + Duration::hours(1));
            }
            other => panic!("잠금 오류를 기대했으나 {:?}", other.map(|_| ())),
        }
    }

    #[actix_web::test]
    async fn test_sixth_failure_reports_same_unlock_time() {
        let (store, service) = service();
        seed_local(&store, "user@example.com", "Secret123!").await;
        let now = fixed_now();

        for _ in 0..5 {
            let _ = service
                .authenticate_local("user@example.com", "wrong", now)
                .await;
        }

        // 1분 뒤 6번째 실패 — 해제 시각은 처음 잠금 그대로
        let later = now + Duration::minutes(1);
        let result = service
            .authenticate_local("user@example.com", "wrong", later)
            .await;

        match result {
            Err(AuthError::AccountLocked { locked_until }) => {
                assert_eq!(locked_until, now + Duration::hours(1));
            }
            other => panic!("잠금 오류를 기대했으나 {:?}", other.map(|_| ())),
        }
    }

    #[actix_web::test]
    async fn test_correct_password_on_locked_account_is_rejected() {
        let (store, service) = service();
        seed_local(&store, "user@example.com", "Secret123!").await;
        let now = fixed_now();

        for _ in 0..5 {
            let _ = service
                .authenticate_local("user@example.com", "wrong", now)
                .await;
        }

        let result = service
            .authenticate_local("user@example.com", "Secret123!", now + Duration::minutes(10))
            .await;

        assert!(matches!(result, Err(AuthError::AccountLocked { .. })));
    }

    #[actix_web::test]
    async fn test_expired_lock_allows_login_and_resets_counter() {
        let (store, service) = service();
        let seeded = seed_local(&store, "user@example.com", "Secret123!").await;
        let now = fixed_now();

        for _ in 0..5 {
            let _ = service
                .authenticate_local("user@example.com", "wrong", now)
                .await;
        }

        // 잠금 만료 후 올바른 비밀번호 — 성공하고 카운터는 0
        let after = now + Duration::hours(1) + Duration::seconds(1);
        let (user, _tokens) = service
            .authenticate_local("user@example.com", "Secret123!", after)
            .await
            .unwrap();

        assert_eq!(user.login_fail_count, 0);
        assert!(user.account_locked_until.is_none());
        let stored = store.get(&seeded.id.unwrap()).unwrap();
        assert_eq!(stored.login_fail_count, 0);
    }

    #[actix_web::test]
    async fn test_expired_lock_then_wrong_password_counts_from_zero() {
        let (store, service) = service();
        let seeded = seed_local(&store, "user@example.com", "Secret123!").await;
        let now = fixed_now();

        for _ in 0..5 {
            let _ = service
                .authenticate_local("user@example.com", "wrong", now)
                .await;
        }

        let after = now + Duration::hours(2);
        let result = service
            .authenticate_local("user@example.com", "wrong", after)
            .await;

        assert!(matches!(
            result,
            Err(AuthError::InvalidCredentials {
                remaining_attempts: Some(4)
            })
        ));
        let stored = store.get(&seeded.id.unwrap()).unwrap();
        assert_eq!(stored.login_fail_count, 1);
        assert!(stored.account_locked_until.is_none());
    }

    #[actix_web::test]
    async fn test_oauth_account_rejects_password_login() {
        let (store, service) = service();
        store
            .save(User::new_oauth(
                naver_info("naver-1", "social@naver.com"),
                fixed_now(),
            ))
            .await
            .unwrap();

        let result = service
            .authenticate_local("social@naver.com", "whatever", fixed_now())
            .await;

        assert!(matches!(
            result,
            Err(AuthError::WrongAuthMethod {
                provider: OAuthProvider::Naver
            })
        ));
    }

    #[actix_web::test]
    async fn test_inactive_account_reported_before_lockout() {
        let (store, service) = service();
        let seeded = seed_local(&store, "user@example.com", "Secret123!").await;
        let now = fixed_now();

        // 비활성 + 잠금 상태를 동시에 만든다
        {
            let mut users = store.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == seeded.id)
                .unwrap();
            user.status = UserStatus::Inactive;
            user.login_fail_count = 5;
            user.account_locked_until = Some(mongodb::bson::DateTime::from_chrono(
                now + Duration::hours(1),
            ));
        }

        let result = service
            .authenticate_local("user@example.com", "Secret123!", now)
            .await;

        assert!(matches!(result, Err(AuthError::AccountInactive)));
    }

    #[actix_web::test]
    async fn test_deleted_account_is_rejected() {
        let (store, service) = service();
        let seeded = seed_local(&store, "user@example.com", "Secret123!").await;
        {
            let mut users = store.users.lock().unwrap();
            users.iter_mut().find(|u| u.id == seeded.id).unwrap().status = UserStatus::Deleted;
        }

        let result = service
            .authenticate_local("user@example.com", "Secret123!", fixed_now())
            .await;

        assert!(matches!(result, Err(AuthError::AccountDeleted)));
    }

    #[actix_web::test]
    async fn test_oauth_first_login_provisions_account() {
        let (store, service) = service();
        let now = fixed_now();

        let (user, tokens) = service
            .authenticate_oauth(naver_info("naver-1", "social@naver.com"), now)
            .await
            .unwrap();

        assert!(user.is_oauth_user());
        assert_eq!(user.role, crate::domain::entities::user::Role::User);
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.last_login_at.map(|dt| dt.to_chrono()), Some(now));
        assert_eq!(tokens.grant_type, "Bearer");
        assert!(store
            .find_by_provider_and_id(OAuthProvider::Naver, "naver-1")
            .await
            .unwrap()
            .is_some());
    }

    #[actix_web::test]
    async fn test_oauth_returning_login_reuses_account() {
        let (store, service) = service();
        let now = fixed_now();

        let (first, _) = service
            .authenticate_oauth(naver_info("naver-1", "social@naver.com"), now)
            .await
            .unwrap();
        let (second, _) = service
            .authenticate_oauth(naver_info("naver-1", "social@naver.com"), now)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.users.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_oauth_email_conflict_with_local_account() {
        let (store, service) = service();
        seed_local(&store, "user@example.com", "Secret123!").await;

        let result = service
            .authenticate_oauth(naver_info("naver-1", "user@example.com"), fixed_now())
            .await;

        assert!(matches!(result, Err(AuthError::EmailAlreadyExists)));
    }

    #[actix_web::test]
    async fn test_refresh_issues_new_pair() {
        let (store, service) = service();
        seed_local(&store, "user@example.com", "Secret123!").await;
        let now = fixed_now();

        let (_, tokens) = service
            .authenticate_local("user@example.com", "Secret123!", now)
            .await
            .unwrap();

        let later = now + Duration::minutes(10);
        let (user, new_tokens) = service
            .refresh_at(&tokens.refresh_token, later)
            .await
            .unwrap();

        assert_eq!(user.email, "user@example.com");
        assert_eq!(
            new_tokens.access_token_expires_at,
            later.timestamp() + 1800
        );
    }

    #[actix_web::test]
    async fn test_refresh_rejects_access_token() {
        let (store, service) = service();
        seed_local(&store, "user@example.com", "Secret123!").await;

        let (_, tokens) = service
            .authenticate_local("user@example.com", "Secret123!", fixed_now())
            .await
            .unwrap();

        let result = service.refresh(&tokens.access_token).await;
        assert!(matches!(result, Err(AuthError::UnsupportedToken)));
    }

    #[actix_web::test]
    async fn test_refresh_rechecks_account_status() {
        let (store, service) = service();
        let seeded = seed_local(&store, "user@example.com", "Secret123!").await;

        let (_, tokens) = service
            .authenticate_local("user@example.com", "Secret123!", fixed_now())
            .await
            .unwrap();

        {
            let mut users = store.users.lock().unwrap();
            users.iter_mut().find(|u| u.id == seeded.id).unwrap().status = UserStatus::Inactive;
        }

        let result = service.refresh(&tokens.refresh_token).await;
        assert!(matches!(result, Err(AuthError::AccountInactive)));
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("abcdef@example.com"), "abc***@example.com");
        assert_eq!(mask_email("ab@example.com"), "ab***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
