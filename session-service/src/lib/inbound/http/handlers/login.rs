use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::models::SessionTtls;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequestBody>,
) -> Result<(CookieJar, ApiSuccess<SessionTtlData>), ApiError> {
    let tokens = state
        .session_service
        .login(&body.email, &body.password)
        .await?;

    Ok((
        state.cookies.issue(jar, &tokens),
        ApiSuccess::new(StatusCode::OK, tokens.ttls.into()),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

/// Lifetimes of the cookies just set, so clients can schedule a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionTtlData {
    pub access_ttl: i64,
    pub refresh_ttl: i64,
}

impl From<SessionTtls> for SessionTtlData {
    fn from(ttls: SessionTtls) -> Self {
        Self {
            access_ttl: ttls.access,
            refresh_ttl: ttls.refresh,
        }
    }
}
