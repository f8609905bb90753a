use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::ApiSuccess;
use super::MessageData;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::cookies::REFRESH_COOKIE;
use crate::inbound::http::router::AppState;

/// Best-effort revocation; always succeeds and always clears the cookies.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, ApiSuccess<MessageData>) {
    let refresh_token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());

    if let Err(e) = state
        .session_service
        .logout(refresh_token.as_deref().filter(|t| !t.is_empty()))
        .await
    {
        tracing::error!(error = %e, "Refresh token revocation failed during logout");
    }

    (
        state.cookies.clear(jar),
        ApiSuccess::new(StatusCode::OK, MessageData::new("Logged out")),
    )
}
