use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::otp::errors::OtpError;
use crate::domain::otp::models::OtpCode;
use crate::domain::otp::models::OtpRecord;
use crate::domain::otp::models::OtpVerification;
use crate::domain::otp::ports::OtpRepository;
use crate::domain::user::models::UserId;

#[derive(sqlx::FromRow)]
struct OtpRow {
    id: Uuid,
    user_id: Uuid,
    otp_hash: String,
    otp_expires_at: DateTime<Utc>,
    attempts_remaining: i32,
    is_used: bool,
    created_at: DateTime<Utc>,
}

impl From<OtpRow> for OtpRecord {
    fn from(r: OtpRow) -> Self {
        OtpRecord {
            id: r.id,
            user_id: UserId(r.user_id),
            otp_hash: r.otp_hash,
            expires_at: r.otp_expires_at,
            attempts_remaining: r.attempts_remaining,
            is_used: r.is_used,
            created_at: r.created_at,
        }
    }
}

pub struct PostgresOtpRepository {
    pool: PgPool,
}

impl PostgresOtpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> OtpError {
    tracing::error!(error = %e, "OTP store failure");
    OtpError::DatabaseError(e.to_string())
}

#[async_trait]
impl OtpRepository for PostgresOtpRepository {
    async fn create_within_limit(
        &self,
        record: OtpRecord,
        window_start: DateTime<Utc>,
        limit: i64,
    ) -> Result<bool, OtpError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        // Lock the owner so concurrent requests for one user count in turn.
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(record.user_id.0)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        let recent: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM password_reset_otps
            WHERE user_id = $1 AND created_at > $2
            "#,
        )
        .bind(record.user_id.0)
        .bind(window_start)
        .fetch_one(&mut *tx)
        .await
        .map_err(database_error)?;

        if recent >= limit {
            tx.rollback().await.map_err(database_error)?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO password_reset_otps
                (id, user_id, otp_hash, otp_expires_at, attempts_remaining, is_used, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id.0)
        .bind(&record.otp_hash)
        .bind(record.expires_at)
        .bind(record.attempts_remaining)
        .bind(record.is_used)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(true)
    }

    async fn verify(
        &self,
        user_id: &UserId,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<OtpVerification, OtpError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let row = sqlx::query_as::<_, OtpRow>(
            r#"
            SELECT id, user_id, otp_hash, otp_expires_at, attempts_remaining, is_used, created_at
            FROM password_reset_otps
            WHERE user_id = $1 AND is_used = false AND otp_expires_at > $2
            ORDER BY created_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_id.0)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error)?;

        let Some(row) = row else {
            tx.rollback().await.map_err(database_error)?;
            return Ok(OtpVerification::Expired);
        };

        let mut record = OtpRecord::from(row);
        let outcome = record.evaluate(code);

        if outcome != OtpVerification::NoAttemptsLeft {
            sqlx::query(
                r#"
                UPDATE password_reset_otps
                SET attempts_remaining = $2, is_used = $3
                WHERE id = $1
                "#,
            )
            .bind(record.id)
            .bind(record.attempts_remaining)
            .bind(record.is_used)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;
        }

        tx.commit().await.map_err(database_error)?;

        Ok(outcome)
    }
}
