use std::sync::Arc;

use crate::config::Config;
use crate::domain::clock::Clock;
use crate::domain::otp::ports::OtpDelivery;
use crate::domain::otp::ports::OtpRepository;
use crate::domain::otp::recovery::PasswordRecoveryService;
use crate::domain::otp::service::OtpManager;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::session::service::SessionService;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::service::UserService;
use crate::inbound::http::cookies::CookieSettings;
use crate::inbound::http::router::AppState;

/// Storage adapters the services are built on.
pub struct Stores<UR, RR, OR> {
    pub users: Arc<UR>,
    pub refresh_tokens: Arc<RR>,
    pub otps: Arc<OR>,
}

/// Wire every service over one set of stores.
///
/// # Arguments
/// * `config` - Validated configuration
/// * `stores` - PostgreSQL or in-memory adapters
/// * `delivery` - Channel for recovery codes
/// * `clock` - Time source shared by all services
pub fn build_state<UR, RR, OR>(
    config: &Config,
    stores: Stores<UR, RR, OR>,
    delivery: Arc<dyn OtpDelivery>,
    clock: Arc<dyn Clock>,
) -> AppState
where
    UR: UserRepository,
    RR: RefreshTokenRepository,
    OR: OtpRepository,
{
    let authenticator = Arc::new(auth::Authenticator::new(config.jwt.secret.as_bytes()));
    let ttls = config.session_ttls();

    let user_service = UserService::new(
        Arc::clone(&stores.users),
        Arc::clone(&authenticator),
        Arc::clone(&clock),
    );

    let session_service = SessionService::new(
        Arc::clone(&stores.users),
        Arc::clone(&stores.refresh_tokens),
        Arc::clone(&authenticator),
        Arc::clone(&clock),
        ttls,
    );

    let recovery_service = PasswordRecoveryService::new(
        stores.users,
        OtpManager::new(stores.otps, config.otp_ttl()),
        stores.refresh_tokens,
        delivery,
        authenticator,
        clock,
    );

    AppState {
        user_service: Arc::new(user_service),
        session_service: Arc::new(session_service),
        recovery_service: Arc::new(recovery_service),
        cookies: Arc::new(CookieSettings::new(
            config.is_production(),
            config.cookie.domain.clone(),
        )),
    }
}
