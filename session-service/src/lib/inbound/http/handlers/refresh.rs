use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::login::SessionTtlData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::cookies::REFRESH_COOKIE;
use crate::inbound::http::router::AppState;

/// Rotate the refresh cookie.
///
/// A rejected token clears both cookies; infrastructure failures leave them alone.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<SessionTtlData>), (CookieJar, ApiError)> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty());

    match state.session_service.refresh(presented.as_deref()).await {
        Ok(tokens) => Ok((
            state.cookies.issue(jar, &tokens),
            ApiSuccess::new(StatusCode::OK, tokens.ttls.into()),
        )),
        Err(e) => {
            let error = ApiError::from(e);
            let jar = match error {
                ApiError::Unauthorized(_) => state.cookies.clear(jar),
                _ => jar,
            };
            Err((jar, error))
        }
    }
}
