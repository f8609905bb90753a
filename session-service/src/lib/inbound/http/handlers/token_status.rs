use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::models::TokenStatus;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::middleware::access_token;
use crate::inbound::http::router::AppState;

/// Inspect the access token without touching the store.
pub async fn token_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<ApiSuccess<TokenStatusData>, (CookieJar, ApiError)> {
    let Some(token) = access_token(&headers, &jar) else {
        return Err((
            state.cookies.clear(jar),
            ApiError::Unauthorized("Authentication required".to_string()),
        ));
    };

    match state.session_service.token_status(&token) {
        Ok(status) => Ok(ApiSuccess::new(StatusCode::OK, status.into())),
        Err(e) => Err((state.cookies.clear(jar), ApiError::from(e))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenStatusData {
    pub expires_in: i64,
    pub is_expiring_soon: bool,
    pub expires_at: DateTime<Utc>,
}

impl From<TokenStatus> for TokenStatusData {
    fn from(status: TokenStatus) -> Self {
        Self {
            expires_in: status.expires_in,
            is_expiring_soon: status.is_expiring_soon,
            expires_at: status.expires_at,
        }
    }
}
