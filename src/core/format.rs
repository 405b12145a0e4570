//! Human-readable rendering of on-chain values.

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};
use ethers::types::U256;
use ethers::utils::format_units;

use crate::core::errors::PolicyApiError;

/// Layout used for policy start/end dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a Unix timestamp (seconds) in the process-local timezone.
pub fn convert_timestamp_to_date(timestamp: i64) -> Result<String, PolicyApiError> {
    format_timestamp_in(timestamp, &Local)
}

/// Formats a Unix timestamp (seconds) in the given timezone.
pub fn format_timestamp_in<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Result<String, PolicyApiError>
where
    Tz::Offset: std::fmt::Display,
{
    let utc = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
        PolicyApiError::InvalidPolicyData(format!("timestamp {} is out of range", timestamp))
    })?;
    Ok(utc.with_timezone(tz).format(DATE_FORMAT).to_string())
}

/// Inverse of [`format_timestamp_in`]. Ambiguous local times (DST fold)
/// resolve to the earlier instant.
pub fn parse_date_in<Tz: TimeZone>(date: &str, tz: &Tz) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(date, DATE_FORMAT).ok()?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.timestamp()),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.timestamp()),
        LocalResult::None => None,
    }
}

/// Scales a raw token amount by `10^decimals`.
///
/// The division is done on the exact decimal string so that values that fit
/// in an `f64` come out exactly (`10^18` with 18 decimals is `1.0`).
pub fn scale_balance(raw: U256, decimals: u8) -> Result<f64, PolicyApiError> {
    let text = format_units(raw, decimals as u32).map_err(|e| {
        PolicyApiError::InvalidPolicyData(format!(
            "cannot scale balance {} by {} decimals: {}",
            raw, decimals, e
        ))
    })?;
    text.parse::<f64>().map_err(|e| {
        PolicyApiError::Internal(format!("formatted balance '{}' is not a number: {}", text, e))
    })
}

/// Converts a contract timestamp to seconds since the epoch.
pub fn timestamp_from_u256(value: U256, field: &str) -> Result<i64, PolicyApiError> {
    if value > U256::from(i64::MAX as u64) {
        return Err(PolicyApiError::InvalidPolicyData(format!(
            "{} {} does not fit a Unix timestamp",
            field, value
        )));
    }
    Ok(value.as_u64() as i64)
}
