use chrono::DateTime;
use chrono::Utc;

/// Source of the current instant for every expiry and rate-limit decision.
///
/// Stores receive `now` from the domain instead of asking the database, so a
/// single injected clock governs token lifetimes, OTP windows and revocation
/// timestamps.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
