//! 사용자 저장소
//!
//! MongoDB `users` 컬렉션에 대한 CRUD와, 로그인 시도 결과를 원자적으로
//! 반영하는 read-modify-write 연산을 제공합니다. 서비스 계층은
//! [`UserStore`] 트레이트에만 의존하므로 테스트에서는 인메모리 구현으로
//! 대체할 수 있습니다.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use mongodb::{
    bson::{doc, oid::ObjectId, Bson},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::db::Database;
use crate::domain::entities::user::{
    LoginOutcome, User, ACCOUNT_LOCK_HOURS, MAX_LOGIN_FAIL_COUNT,
};
use crate::domain::oauth::OAuthProvider;
use crate::errors::{AuthError, AuthResult};

/// 사용자 영속성 인터페이스
///
/// 로그인 실패 카운터 갱신은 단건 문서에 대한 원자적 연산이어야 하며,
/// 구현체가 이를 보장합니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일로 사용자를 조회합니다. 로컬/OAuth 계정을 구분하지 않습니다.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// OAuth 제공자와 제공자 범위 ID로 사용자를 조회합니다.
    async fn find_by_provider_and_id(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> AuthResult<Option<User>>;

    /// ID로 사용자를 조회합니다.
    async fn find_by_id(&self, id: &ObjectId) -> AuthResult<Option<User>>;

    /// 이메일 사용 여부를 확인합니다.
    async fn exists_by_email(&self, email: &str) -> AuthResult<bool>;

    /// 새 사용자를 저장하고 ID가 채워진 엔티티를 반환합니다.
    async fn save(&self, user: User) -> AuthResult<User>;

    /// 로그인 시도 결과를 원자적으로 반영하고 갱신된 사용자를 반환합니다.
    async fn apply_login_outcome(
        &self,
        id: &ObjectId,
        outcome: LoginOutcome,
        now: DateTime<Utc>,
    ) -> AuthResult<User>;
}

/// MongoDB 기반 사용자 저장소
#[derive(Clone)]
pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.get_database().collection("users"),
        }
    }

    /// 이메일 unique, (provider, provider_id) unique 인덱스를 보장합니다.
    ///
    /// 로컬 계정은 provider 필드가 없으므로 partial 인덱스로 제외합니다.
    pub async fn ensure_indexes(&self) -> AuthResult<()> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        let provider_index = IndexModel::builder()
            .keys(doc! { "provider": 1, "provider_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! { "provider": { "$exists": true } })
                    .build(),
            )
            .build();

        self.collection
            .create_indexes([email_index, provider_index])
            .await
            .map_err(|e| AuthError::DatabaseError(format!("인덱스 생성 실패: {}", e)))?;

        info!("users 컬렉션 인덱스 보장 완료");
        Ok(())
    }

    fn map_db_error(e: mongodb::error::Error) -> AuthError {
        AuthError::DatabaseError(e.to_string())
    }

    fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
        matches!(
            *e.kind,
            ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == 11000
        )
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        self.collection
            .find_one(doc! { "email": email })
            .await
            .map_err(Self::map_db_error)
    }

    async fn find_by_provider_and_id(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> AuthResult<Option<User>> {
        self.collection
            .find_one(doc! {
                "provider": provider.as_str(),
                "provider_id": provider_id,
            })
            .await
            .map_err(Self::map_db_error)
    }

    async fn find_by_id(&self, id: &ObjectId) -> AuthResult<Option<User>> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(Self::map_db_error)
    }

    async fn exists_by_email(&self, email: &str) -> AuthResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "email": email })
            .limit(1)
            .await
            .map_err(Self::map_db_error)?;
        Ok(count > 0)
    }

    async fn save(&self, mut user: User) -> AuthResult<User> {
        let result = self.collection.insert_one(&user).await.map_err(|e| {
            if Self::is_duplicate_key(&e) {
                AuthError::EmailAlreadyExists
            } else {
                Self::map_db_error(e)
            }
        })?;

        user.id = result.inserted_id.as_object_id();
        debug!("사용자 저장 완료: {:?}", user.id);
        Ok(user)
    }

    /// 로그인 시도 결과를 단일 `findOneAndUpdate`로 반영합니다.
    ///
    /// 실패 전이는 aggregation pipeline update로 표현합니다. 카운터 증가와
    /// 잠금 판정이 서버에서 한 번에 수행되므로, 동시 실패 시도가 겹쳐도
    /// 증가 유실이나 잠금 시각 재기록이 발생하지 않습니다.
    async fn apply_login_outcome(
        &self,
        id: &ObjectId,
        outcome: LoginOutcome,
        now: DateTime<Utc>,
    ) -> AuthResult<User> {
        let now_bson = mongodb::bson::DateTime::from_chrono(now);

        let update: mongodb::options::UpdateModifications = match outcome {
            LoginOutcome::Success => doc! {
                "$set": { "login_fail_count": 0, "last_login_at": now_bson },
                "$unset": { "account_locked_until": "" },
            }
            .into(),
            LoginOutcome::LockExpired => doc! {
                "$set": { "login_fail_count": 0 },
                "$unset": { "account_locked_until": "" },
            }
            .into(),
            LoginOutcome::Failure => {
                let lock_until = mongodb::bson::DateTime::from_chrono(
                    now + Duration::hours(ACCOUNT_LOCK_HOURS),
                );
                let incremented = doc! { "$add": ["$login_fail_count", 1] };

                // 임계치 도달 && 기존 잠금 없음 일 때만 잠금 시각 기록
                vec![doc! {
                    "$set": {
                        "login_fail_count": incremented.clone(),
                        "account_locked_until": {
                            "$cond": [
                                {
                                    "$and": [
                                        { "$gte": [incremented, MAX_LOGIN_FAIL_COUNT as i64] },
                                        {
                                            "$eq": [
                                                { "$ifNull": ["$account_locked_until", Bson::Null] },
                                                Bson::Null,
                                            ]
                                        },
                                    ]
                                },
                                lock_until,
                                "$account_locked_until",
                            ]
                        },
                    }
                }]
                .into()
            }
        };

        self.collection
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(Self::map_db_error)?
            .ok_or(AuthError::UserNotFound)
    }
}
