use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::ConsumedRefreshToken;
use crate::domain::session::models::RefreshTokenHash;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::user::models::UserId;

pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> SessionError {
    tracing::error!(error = %e, "Refresh token store failure");
    SessionError::DatabaseError(e.to_string())
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn put(&self, record: RefreshTokenRecord) -> Result<(), SessionError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens
                (id, user_id, token_hash, expires_at, revoked, used_at, revoked_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id.0)
        .bind(record.token_hash.as_str())
        .bind(record.expires_at)
        .bind(record.revoked)
        .bind(record.used_at)
        .bind(record.revoked_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn consume(
        &self,
        token_hash: &RefreshTokenHash,
        now: DateTime<Utc>,
    ) -> Result<Option<ConsumedRefreshToken>, SessionError> {
        // Check and flip in one statement; concurrent callers serialize on the row.
        let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            UPDATE refresh_tokens
            SET revoked = true, used_at = $2
            WHERE token_hash = $1 AND revoked = false AND expires_at > $2
            RETURNING user_id, expires_at
            "#,
        )
        .bind(token_hash.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(|(user_id, expires_at)| ConsumedRefreshToken {
            user_id: UserId(user_id),
            expires_at,
        }))
    }

    async fn revoke(
        &self,
        token_hash: &RefreshTokenHash,
        now: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = true, revoked_at = $2
            WHERE token_hash = $1 AND revoked = false
            "#,
        )
        .bind(token_hash.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<u64, SessionError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = true, revoked_at = $2
            WHERE user_id = $1 AND revoked = false
            "#,
        )
        .bind(user_id.0)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
