//! Human-readable duration strings ("15m", "7d") for token lifetimes.
//!
//! Misconfigured lifetimes must never stop the service from starting, so
//! parsing never fails: anything that is not `<digits><unit>` resolves to the
//! caller's fallback and a warning is logged.

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 15 * 60;

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Parse a duration string into seconds, falling back on malformed input.
///
/// Accepted units are `s`, `m`, `h` and `d`. The numeric part must be plain
/// ASCII digits with no sign or whitespace.
///
/// # Arguments
/// * `input` - Raw configuration value, `None` when unset
/// * `fallback` - Seconds returned when the input is absent or unparsable
///
/// # Returns
/// Duration in seconds
pub fn parse_duration_secs(input: Option<&str>, fallback: u64) -> u64 {
    let Some(raw) = input else {
        return fallback;
    };

    match try_parse(raw) {
        Some(seconds) => seconds,
        None => {
            tracing::warn!(
                value = raw,
                fallback_secs = fallback,
                "Unparsable duration, using fallback"
            );
            fallback
        }
    }
}

fn try_parse(raw: &str) -> Option<u64> {
    let unit = raw.chars().last()?;
    let digits = &raw[..raw.len() - unit.len_utf8()];

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return None,
    };

    digits.parse::<u64>().ok()?.checked_mul(multiplier)
}
