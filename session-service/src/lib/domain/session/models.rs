use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::UserId;

/// Access tokens this close to expiry are reported as expiring soon, so
/// clients can refresh proactively.
pub const EXPIRING_SOON_THRESHOLD_SECS: i64 = 120;

/// Digest of a refresh token. The bearer value itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefreshTokenHash(String);

impl RefreshTokenHash {
    /// Hash a presented bearer value.
    pub fn of(token: &str) -> Self {
        Self(auth::secret::sha256_hex(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Refresh token row as persisted. Records are revoked, never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub token_hash: RefreshTokenHash,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Build the initial, active record.
    pub fn active(
        user_id: UserId,
        token_hash: RefreshTokenHash,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at,
            revoked: false,
            used_at: None,
            revoked_at: None,
            created_at,
        }
    }

    /// Usable for rotation at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

/// What a successful `consume` hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedRefreshToken {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// A freshly minted refresh token. `token` is the only copy of the bearer value.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Configured lifetimes, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTtls {
    pub access: i64,
    pub refresh: i64,
}

/// Access and refresh pair handed to the transport layer.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub ttls: SessionTtls,
}

/// Result of a store-free access token inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStatus {
    pub expires_in: i64,
    pub is_expiring_soon: bool,
    pub expires_at: DateTime<Utc>,
}

impl TokenStatus {
    /// Derive the status from a token's `exp` claim.
    pub fn from_expiry(exp: i64, now: DateTime<Utc>) -> Self {
        let expires_in = (exp - now.timestamp()).max(0);
        Self {
            expires_in,
            is_expiring_soon: expires_in <= EXPIRING_SOON_THRESHOLD_SECS,
            expires_at: DateTime::from_timestamp(exp, 0).unwrap_or(now),
        }
    }
}
