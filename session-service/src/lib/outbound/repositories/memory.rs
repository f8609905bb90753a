//! Process-local stores for development and tests.
//!
//! Each store holds one async mutex and runs every operation entirely under
//! it, which gives the same single-writer guarantees as the conditional
//! statements of the PostgreSQL adapters.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::otp::errors::OtpError;
use crate::domain::otp::models::OtpCode;
use crate::domain::otp::models::OtpRecord;
use crate::domain::otp::models::OtpVerification;
use crate::domain::otp::ports::OtpRepository;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::ConsumedRefreshToken;
use crate::domain::session::models::RefreshTokenHash;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, UserError> {
        let mut users = self.users.lock().await;

        match users.get_mut(id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    records: Mutex<HashMap<RefreshTokenHash, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn put(&self, record: RefreshTokenRecord) -> Result<(), SessionError> {
        let mut records = self.records.lock().await;

        if records.contains_key(&record.token_hash) {
            return Err(SessionError::DatabaseError(
                "duplicate refresh token digest".to_string(),
            ));
        }

        records.insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn consume(
        &self,
        token_hash: &RefreshTokenHash,
        now: DateTime<Utc>,
    ) -> Result<Option<ConsumedRefreshToken>, SessionError> {
        let mut records = self.records.lock().await;

        let Some(record) = records.get_mut(token_hash).filter(|r| r.is_active(now)) else {
            return Ok(None);
        };

        record.revoked = true;
        record.used_at = Some(now);

        Ok(Some(ConsumedRefreshToken {
            user_id: record.user_id,
            expires_at: record.expires_at,
        }))
    }

    async fn revoke(
        &self,
        token_hash: &RefreshTokenHash,
        now: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        let mut records = self.records.lock().await;

        match records.get_mut(token_hash).filter(|r| !r.revoked) {
            Some(record) => {
                record.revoked = true;
                record.revoked_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<u64, SessionError> {
        let mut records = self.records.lock().await;
        let mut revoked = 0;

        for record in records
            .values_mut()
            .filter(|r| r.user_id == *user_id && !r.revoked)
        {
            record.revoked = true;
            record.revoked_at = Some(now);
            revoked += 1;
        }

        Ok(revoked)
    }
}

#[derive(Default)]
pub struct InMemoryOtpRepository {
    records: Mutex<Vec<OtpRecord>>,
}

impl InMemoryOtpRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpRepository for InMemoryOtpRepository {
    async fn create_within_limit(
        &self,
        record: OtpRecord,
        window_start: DateTime<Utc>,
        limit: i64,
    ) -> Result<bool, OtpError> {
        let mut records = self.records.lock().await;

        let recent = records
            .iter()
            .filter(|r| r.user_id == record.user_id && r.created_at > window_start)
            .count();

        if recent as i64 >= limit {
            return Ok(false);
        }

        records.push(record);
        Ok(true)
    }

    async fn verify(
        &self,
        user_id: &UserId,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<OtpVerification, OtpError> {
        let mut records = self.records.lock().await;

        let latest = records
            .iter_mut()
            .filter(|r| r.user_id == *user_id && r.is_live(now))
            .max_by_key(|r| r.created_at);

        Ok(match latest {
            Some(record) => record.evaluate(code),
            None => OtpVerification::Expired,
        })
    }
}
