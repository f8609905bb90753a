use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::models::UserId;
use crate::inbound::http::cookies::ACCESS_COOKIE;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Identity resolved from a valid access token, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: String,
    pub name: String,
    pub org_name: Option<String>,
}

/// Middleware that validates the access token and adds the caller's identity
/// to request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());
    let token = access_token(req.headers(), &jar)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let claims = state.session_service.authenticate(&token).map_err(|e| {
        tracing::warn!(error = %e, "Access token rejected");
        ApiError::from(e)
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::error!(error = %e, "Access token subject is not a user ID");
        ApiError::Unauthorized("Invalid token".to_string())
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id,
        role: claims.role,
        name: claims.name,
        org_name: claims.org_name,
    });

    Ok(next.run(req).await)
}

/// Access token from an `Authorization: Bearer` header, else from the cookie.
pub fn access_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    bearer
        .map(str::to_string)
        .or_else(|| jar.get(ACCESS_COOKIE).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    use super::*;

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        let jar = CookieJar::new().add(Cookie::new(ACCESS_COOKIE, "from-cookie"));

        assert_eq!(
            access_token(&headers, &jar).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn test_cookie_fallback() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_COOKIE, "from-cookie"));

        assert_eq!(
            access_token(&HeaderMap::new(), &jar).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn test_missing_or_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        let cleared = CookieJar::new().add(Cookie::new(ACCESS_COOKIE, ""));

        assert_eq!(access_token(&headers, &CookieJar::new()), None);
        assert_eq!(access_token(&HeaderMap::new(), &cleared), None);
    }
}
