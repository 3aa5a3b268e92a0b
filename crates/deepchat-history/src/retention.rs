//! Relative ages for bulk removal.

use chrono::{DateTime, Duration, Utc};

use crate::error::{HistoryError, Result};

/// What a removal request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// A single conversation was removed by ID.
    Removed { id: String },
    /// Every conversation created before `cutoff` was removed.
    Expired {
        cutoff: DateTime<Utc>,
        removed: Vec<String>,
    },
}

impl RemovalOutcome {
    /// Whether the store changed and needs saving.
    pub fn changed(&self) -> bool {
        match self {
            Self::Removed { .. } => true,
            Self::Expired { removed, .. } => !removed.is_empty(),
        }
    }
}

/// Parse a relative age such as `10d`, `10 days`, `72 hours` or `1h30m`.
///
/// The input is one or more `<number><unit>` groups, optionally separated by
/// whitespace. Numbers may be fractional.
pub fn parse_age(input: &str) -> Result<Duration> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return Err(HistoryError::invalid_age(input, "empty"));
    }

    let mut total_ms = 0f64;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(HistoryError::invalid_age(input, "expected a number"));
        }
        let value: f64 = rest[..num_len]
            .parse()
            .map_err(|_| HistoryError::invalid_age(input, "malformed number"))?;
        rest = rest[num_len..].trim_start();

        let unit_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(HistoryError::invalid_age(input, "missing unit"));
        }
        let unit = rest[..unit_len].to_ascii_lowercase();
        let seconds = unit_seconds(&unit)
            .ok_or_else(|| HistoryError::invalid_age(input, format!("unknown unit '{}'", unit)))?;
        rest = rest[unit_len..].trim_start();

        total_ms += value * seconds * 1000.0;
    }

    if !total_ms.is_finite() || total_ms >= i64::MAX as f64 {
        return Err(HistoryError::invalid_age(input, "out of range"));
    }
    Duration::try_milliseconds(total_ms.round() as i64)
        .ok_or_else(|| HistoryError::invalid_age(input, "out of range"))
}

fn unit_seconds(unit: &str) -> Option<f64> {
    let seconds = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600.0,
        "d" | "day" | "days" => 86_400.0,
        "w" | "week" | "weeks" => 604_800.0,
        _ => return None,
    };
    Some(seconds)
}
