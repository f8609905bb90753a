//! Session cookies.

use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;
use time::Duration;

use crate::domain::session::models::SessionTokens;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Attributes shared by both session cookies.
///
/// Production cookies are `Secure`, cross-site (`SameSite=None`) and scoped
/// to the configured domain; elsewhere they are host-only and `Lax`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    secure: bool,
    domain: Option<String>,
}

impl CookieSettings {
    pub fn new(production: bool, domain: Option<String>) -> Self {
        Self {
            secure: production,
            domain: domain.filter(|d| production && !d.is_empty()),
        }
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        let same_site = if self.secure {
            SameSite::None
        } else {
            SameSite::Lax
        };

        let mut cookie = Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(same_site)
            .path("/")
            .max_age(max_age);

        if let Some(domain) = &self.domain {
            cookie = cookie.domain(domain.clone());
        }

        cookie.build()
    }

    /// Attach a freshly issued pair.
    pub fn issue(&self, jar: CookieJar, tokens: &SessionTokens) -> CookieJar {
        jar.add(self.build(
            ACCESS_COOKIE,
            tokens.access_token.clone(),
            Duration::seconds(tokens.ttls.access),
        ))
        .add(self.build(
            REFRESH_COOKIE,
            tokens.refresh_token.clone(),
            Duration::seconds(tokens.ttls.refresh),
        ))
    }

    /// Overwrite both cookies with expired, empty ones.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(ACCESS_COOKIE, String::new(), Duration::ZERO))
            .add(self.build(REFRESH_COOKIE, String::new(), Duration::ZERO))
    }
}
