use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Discriminator carried in every token this service signs.
///
/// A token is only accepted where its type is expected, so a password-reset
/// artifact can never be presented as an access token and vice versa.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    PasswordReset,
}

/// Claims that declare which [`TokenType`] they belong to.
pub trait TypedClaims {
    /// Type a token must carry to decode into these claims.
    const EXPECTED_TYPE: TokenType;

    /// Type actually carried by the decoded token.
    fn token_type(&self) -> TokenType;

    /// Expiration (Unix timestamp).
    fn expires_at(&self) -> i64;
}

/// Identity claims of a short-lived access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Role of the user at issuance time
    pub role: String,

    /// Display name
    pub name: String,

    /// Organization name, absent for users without an organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,

    /// Always [`TokenType::Access`]
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Create access claims for a user.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `role` - User role
    /// * `name` - Display name
    /// * `org_name` - Organization name, if any
    /// * `issued_at` - Issuance instant
    /// * `ttl_seconds` - Seconds until the token expires
    pub fn for_user(
        user_id: impl ToString,
        role: impl Into<String>,
        name: impl Into<String>,
        org_name: Option<String>,
        issued_at: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            role: role.into(),
            name: name.into(),
            org_name,
            token_type: TokenType::Access,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(ttl_seconds)).timestamp(),
        }
    }

    /// Check if token is expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

impl TypedClaims for AccessClaims {
    const EXPECTED_TYPE: TokenType = TokenType::Access;

    fn token_type(&self) -> TokenType {
        self.token_type
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Claims of a password-reset grant minted after a successful OTP check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordResetClaims {
    pub sub: String,

    #[serde(rename = "type")]
    pub token_type: TokenType,

    pub iat: i64,

    pub exp: i64,
}

impl PasswordResetClaims {
    pub fn for_user(user_id: impl ToString, issued_at: DateTime<Utc>, ttl_seconds: i64) -> Self {
        Self {
            sub: user_id.to_string(),
            token_type: TokenType::PasswordReset,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(ttl_seconds)).timestamp(),
        }
    }
}

impl TypedClaims for PasswordResetClaims {
    const EXPECTED_TYPE: TokenType = TokenType::PasswordReset;

    fn token_type(&self) -> TokenType {
        self.token_type
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}
