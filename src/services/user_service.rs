//! 사용자 계정 관리 서비스
//!
//! 회원가입과 사용자 조회를 담당합니다. 인증 의사결정은
//! [`crate::services::auth_service::AuthService`]의 책임입니다.

use std::sync::Arc;

use chrono::Utc;
use log::info;
use mongodb::bson::oid::ObjectId;

use crate::domain::dto::request::SignupRequest;
use crate::domain::entities::user::User;
use crate::errors::{AuthError, AuthResult};
use crate::repositories::UserStore;
use crate::services::password_service::PasswordEncoder;

/// 사용자 서비스
pub struct UserService {
    store: Arc<dyn UserStore>,
    password_encoder: PasswordEncoder,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, password_encoder: PasswordEncoder) -> Self {
        Self {
            store,
            password_encoder,
        }
    }

    /// 로컬 회원가입
    ///
    /// 이메일 중복 검사 후 비밀번호를 해싱하고 ACTIVE/USER 계정을
    /// 생성합니다. 중복 검사와 저장 사이의 경합은 저장소의 unique
    /// 인덱스가 최종적으로 막습니다.
    pub async fn signup(&self, request: SignupRequest) -> AuthResult<User> {
        if self.store.exists_by_email(&request.email).await? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = self.password_encoder.hash_password(&request.password)?;
        let user = User::new_local(request.email, password_hash, request.name, Utc::now());

        let saved = self.store.save(user).await?;
        info!(
            "회원가입 완료: {}",
            crate::services::auth_service::mask_email(&saved.email)
        );
        Ok(saved)
    }

    /// ID(hex 문자열)로 사용자를 조회합니다.
    pub async fn find_by_id(&self, id: &str) -> AuthResult<User> {
        let object_id = ObjectId::parse_str(id).map_err(|_| AuthError::UserNotFound)?;
        self.store
            .find_by_id(&object_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::user::{Role, UserStatus};
    use crate::domain::oauth::OAuthProvider;
    use crate::domain::entities::user::LoginOutcome;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    struct InMemoryUserStore {
        users: Mutex<Vec<User>>,
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
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id.as_ref() == Some(id))
                .cloned())
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

    fn service() -> (Arc<InMemoryUserStore>, UserService) {
        let store = Arc::new(InMemoryUserStore {
            users: Mutex::new(Vec::new()),
        });
        let service = UserService::new(store.clone(), PasswordEncoder::with_cost(4));
        (store, service)
    }

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: "Secret123!".to_string(),
            name: "테스터".to_string(),
        }
    }

    #[actix_web::test]
    async fn test_signup_creates_active_local_user() {
        let (_store, service) = service();

        let user = service.signup(signup_request("new@example.com")).await.unwrap();

        assert!(user.id.is_some());
        assert!(user.is_local_user());
        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, UserStatus::Active);
        // 평문 비밀번호가 저장되면 안 된다
        assert_ne!(user.password_hash.as_deref(), Some("Secret123!"));
    }

    #[actix_web::test]
    async fn test_signup_duplicate_email_is_rejected() {
        let (_store, service) = service();
        service.signup(signup_request("new@example.com")).await.unwrap();

        let result = service.signup(signup_request("new@example.com")).await;

        assert!(matches!(result, Err(AuthError::EmailAlreadyExists)));
    }

    #[actix_web::test]
    async fn test_find_by_id() {
        let (_store, service) = service();
        let created = service.signup(signup_request("new@example.com")).await.unwrap();

        let found = service.find_by_id(&created.id_string().unwrap()).await.unwrap();
        assert_eq!(found.email, "new@example.com");

        let missing = service.find_by_id(&ObjectId::new().to_hex()).await;
        assert!(matches!(missing, Err(AuthError::UserNotFound)));

        let invalid = service.find_by_id("not-an-object-id").await;
        assert!(matches!(invalid, Err(AuthError::UserNotFound)));
    }
}
