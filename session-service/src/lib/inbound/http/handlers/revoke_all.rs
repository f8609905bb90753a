use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Revoke every refresh chain of the caller and clear the caller's cookies.
///
/// Access tokens already handed out stay valid until they expire.
pub async fn revoke_all(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<RevokeAllResponseData>), ApiError> {
    let revoked = state
        .session_service
        .revoke_all_sessions(&user.user_id)
        .await?;

    Ok((
        state.cookies.clear(jar),
        ApiSuccess::new(
            StatusCode::OK,
            RevokeAllResponseData {
                message: "All sessions revoked".to_string(),
                revoked,
            },
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevokeAllResponseData {
    pub message: String,
    pub revoked: u64,
}
