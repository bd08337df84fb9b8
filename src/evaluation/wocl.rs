//! Window of circadian low (WOCL) detection.
//!
//! This module resolves base timezones and tests whether a time interval
//! overlaps a local-time window, such as the WOCL or the night window, in
//! the base's local time. Windows are half-open, so an interval that starts
//! exactly when the window closes, or ends exactly when it opens, does not
//! overlap it.

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::LocalWindow;
use crate::error::{EngineError, EngineResult};
use crate::models::MAX_INTERVAL_DAYS;

/// A resolved base timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseTimezone {
    /// An IANA zone such as `Europe/London`, with daylight saving.
    Named(Tz),
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl BaseTimezone {
    /// Returns the local calendar date of an instant.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(instant).date()
    }

    /// Returns the local wall-clock time of an instant.
    pub fn local_datetime(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            BaseTimezone::Named(tz) => instant.with_timezone(tz).naive_local(),
            BaseTimezone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    /// Returns the first instant at which the local clock reads `local`.
    ///
    /// A wall-clock time skipped by a daylight-saving jump maps to the first
    /// valid minute after the jump.
    pub fn instant_at(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self {
            BaseTimezone::Named(tz) => first_instant(tz, local),
            BaseTimezone::Fixed(offset) => first_instant(offset, local),
        }
    }
}

fn first_instant<Z: TimeZone>(tz: &Z, local: NaiveDateTime) -> DateTime<Utc> {
    // Daylight-saving gaps are at most a few hours wide.
    (0..=240)
        .map(|minute| local + chrono::Duration::minutes(minute))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

/// Resolves a timezone identifier.
///
/// Accepts IANA zone names (`Europe/London`), `UTC` or `Z`, and fixed
/// offsets written `+HH:MM`, `+HHMM` or `+HH`. Anything else is a
/// [`EngineError::TimezoneResolution`]; nothing falls back to UTC.
///
/// # Example
///
/// ```
/// use rest_engine::evaluation::{resolve_timezone, BaseTimezone};
/// use chrono::FixedOffset;
///
/// assert!(matches!(resolve_timezone("Europe/London"), Ok(BaseTimezone::Named(_))));
/// assert_eq!(
///     resolve_timezone("+05:30").unwrap(),
///     BaseTimezone::Fixed(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap())
/// );
/// assert!(resolve_timezone("Europe/Atlantis").is_err());
/// ```
pub fn resolve_timezone(identifier: &str) -> EngineResult<BaseTimezone> {
    let trimmed = identifier.trim();
    let failure = |message: String| EngineError::TimezoneResolution {
        timezone: identifier.to_string(),
        message,
    };

    if trimmed.is_empty() {
        return Err(failure("timezone identifier is empty".to_string()));
    }

    if trimmed.eq_ignore_ascii_case("UTC") || trimmed == "Z" {
        return FixedOffset::east_opt(0)
            .map(BaseTimezone::Fixed)
            .ok_or_else(|| failure("invalid offset".to_string()));
    }

    if trimmed.starts_with('+') || trimmed.starts_with('-') {
        return parse_offset(trimmed).map(BaseTimezone::Fixed).map_err(failure);
    }

    trimmed
        .parse::<Tz>()
        .map(BaseTimezone::Named)
        .map_err(|e| failure(format!("unknown zone identifier ({})", e)))
}

fn parse_offset(text: &str) -> Result<FixedOffset, String> {
    let (sign, digits) = text.split_at(1);
    let digits: String = digits.chars().filter(|c| *c != ':').collect();

    if !digits.chars().all(|c| c.is_ascii_digit()) || !matches!(digits.len(), 2 | 4) {
        return Err(format!("invalid offset '{}'", text));
    }

    let hours: i32 = digits[..2].parse().map_err(|_| format!("invalid offset '{}'", text))?;
    let minutes: i32 = if digits.len() == 4 {
        digits[2..].parse().map_err(|_| format!("invalid offset '{}'", text))?
    } else {
        0
    };

    if hours > 18 || minutes > 59 {
        return Err(format!("offset '{}' is out of range", text));
    }

    let seconds = (hours * 3600 + minutes * 60) * if sign == "-" { -1 } else { 1 };
    FixedOffset::east_opt(seconds).ok_or_else(|| format!("offset '{}' is out of range", text))
}

/// The result of testing an interval against a local window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WoclDetection {
    /// Whether any non-zero part of the interval lies inside the window.
    pub overlaps: bool,
    /// Whole minutes of the interval inside the window.
    pub overlap_minutes: i64,
    /// Interval start on the base's local clock.
    pub local_start: NaiveDateTime,
    /// Interval end on the base's local clock.
    pub local_end: NaiveDateTime,
}

/// Seconds of `[start, end)` that fall inside the window.
///
/// Each local calendar day the interval touches contributes that day's
/// window (for a window wrapping midnight, the one opening that day), so an
/// interval crossing midnight is tested against both days' windows. At most
/// [`MAX_INTERVAL_DAYS`] plus two days are visited; [`detect_window`]
/// rejects longer intervals before getting here.
pub fn window_overlap_seconds(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    timezone: &BaseTimezone,
    window: LocalWindow,
) -> i64 {
    if end <= start {
        return 0;
    }

    let first_day = timezone.local_date(start);
    let first_day = if window.wraps_midnight() {
        first_day.checked_sub_days(Days::new(1)).unwrap_or(first_day)
    } else {
        first_day
    };
    let last_day = timezone.local_date(end);

    let max_days = usize::try_from(MAX_INTERVAL_DAYS + 2).unwrap_or(usize::MAX);

    first_day
        .iter_days()
        .take_while(|day| *day <= last_day)
        .take(max_days)
        .map(|day| {
            let opens = timezone.instant_at(day.and_time(window.start));
            let close_day = if window.wraps_midnight() {
                day.succ_opt().unwrap_or(day)
            } else {
                day
            };
            let closes = timezone.instant_at(close_day.and_time(window.end));

            let from = start.max(opens);
            let to = end.min(closes);
            if to > from { (to - from).num_seconds() } else { 0 }
        })
        .sum()
}

/// Tests an interval against a window on an already resolved base clock.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if the interval is longer than
/// [`MAX_INTERVAL_DAYS`].
pub fn detect_window(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    timezone: &BaseTimezone,
    window: LocalWindow,
) -> EngineResult<WoclDetection> {
    if end - start > Duration::days(MAX_INTERVAL_DAYS) {
        return Err(EngineError::invalid_input(
            "end",
            format!("interval is longer than {} days", MAX_INTERVAL_DAYS),
        ));
    }

    let start = start.with_timezone(&Utc);
    let end = end.with_timezone(&Utc);
    let seconds = window_overlap_seconds(start, end, timezone, window);

    Ok(WoclDetection {
        overlaps: seconds > 0,
        overlap_minutes: seconds / 60,
        local_start: timezone.local_datetime(start),
        local_end: timezone.local_datetime(end),
    })
}

/// Tests an interval against the WOCL of the given timezone.
///
/// # Arguments
///
/// * `start` - Interval start
/// * `end` - Interval end
/// * `timezone` - Timezone identifier of the base
/// * `window` - The window of circadian low
///
/// # Errors
///
/// Returns [`EngineError::TimezoneResolution`] if `timezone` cannot be
/// resolved, and [`EngineError::InvalidInput`] if the interval is longer
/// than [`MAX_INTERVAL_DAYS`].
///
/// # Example
///
/// ```
/// use rest_engine::config::LocalWindow;
/// use rest_engine::evaluation::detect_wocl;
/// use chrono::DateTime;
///
/// // 22:00 to 08:00 London time in winter crosses 02:00-06:00
/// let start = DateTime::parse_from_rfc3339("2026-01-10T22:00:00Z").unwrap();
/// let end = DateTime::parse_from_rfc3339("2026-01-11T08:00:00Z").unwrap();
/// let detection = detect_wocl(start, end, "Europe/London", LocalWindow::wocl()).unwrap();
/// assert!(detection.overlaps);
/// assert_eq!(detection.overlap_minutes, 240);
/// ```
pub fn detect_wocl(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    timezone: &str,
    window: LocalWindow,
) -> EngineResult<WoclDetection> {
    let tz = resolve_timezone(timezone)?;
    detect_window(start, end, &tz, window)
}

/// Returns true if the interval overlaps the WOCL.
pub fn overlaps_wocl(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    timezone: &str,
    window: LocalWindow,
) -> EngineResult<bool> {
    detect_wocl(start, end, timezone, window).map(|d| d.overlaps)
}
