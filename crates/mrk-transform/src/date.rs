//! Date formatting for `<!date^...>` tokens and message timestamps.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Placeholder used whenever a date cannot be rendered.
pub const DATE_FALLBACK: &str = "(failed to parse date)";

/// Turns raw Slack date tokens into display strings.
///
/// Implementations never fail; a token that cannot be parsed yields some
/// placeholder text.
pub trait DateFormatter: Send + Sync {
    /// Format the segment following `!date^`.
    ///
    /// This is usually an epoch in seconds, possibly followed by `|fallback`.
    fn format_datetime(&self, raw: &str) -> String;

    /// Format a message timestamp (`"1609459200.000200"`) as a time of day.
    fn format_time(&self, ts: &str) -> String {
        self.format_datetime(ts)
    }
}

/// Error returned for an unusable date configuration.
#[derive(Debug, thiserror::Error)]
pub enum DateFormatError {
    /// The strftime pattern contains an invalid specifier.
    #[error("Invalid date format pattern: {0:?}")]
    Pattern(String),
    /// The UTC offset is out of range.
    #[error("UTC offset out of range: {0} seconds")]
    Offset(i32),
}

/// [`DateFormatter`] backed by `chrono`, with a fixed UTC offset.
#[derive(Debug, Clone)]
pub struct ChronoDateFormatter {
    offset: FixedOffset,
    datetime_format: String,
    time_format: String,
}

impl Default for ChronoDateFormatter {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            datetime_format: "%Y-%m-%d %H:%M".to_owned(),
            time_format: "%H:%M".to_owned(),
        }
    }
}

impl ChronoDateFormatter {
    /// Create a formatter with explicit patterns and offset.
    ///
    /// Both patterns use strftime syntax and are validated up front.
    pub fn new(
        datetime_format: impl Into<String>,
        time_format: impl Into<String>,
        utc_offset_seconds: i32,
    ) -> Result<Self, DateFormatError> {
        let datetime_format = validate_pattern(datetime_format.into())?;
        let time_format = validate_pattern(time_format.into())?;
        let offset = FixedOffset::east_opt(utc_offset_seconds)
            .ok_or(DateFormatError::Offset(utc_offset_seconds))?;
        Ok(Self {
            offset,
            datetime_format,
            time_format,
        })
    }

    fn render(&self, raw: &str, pattern: &str) -> String {
        let (epoch, fallback) = split_token(raw);
        let Some(datetime) = parse_epoch(epoch) else {
            tracing::warn!(token = raw, "Failed to parse date token");
            return fallback
                .filter(|f| !f.is_empty())
                .map_or_else(|| DATE_FALLBACK.to_owned(), str::to_owned);
        };

        let local = datetime.with_timezone(&self.offset);
        let mut out = String::new();
        if write!(out, "{}", local.format(pattern)).is_err() {
            tracing::warn!(pattern, "Date pattern could not be rendered");
            return DATE_FALLBACK.to_owned();
        }
        out
    }
}

impl DateFormatter for ChronoDateFormatter {
    fn format_datetime(&self, raw: &str) -> String {
        self.render(raw, &self.datetime_format)
    }

    fn format_time(&self, ts: &str) -> String {
        self.render(ts, &self.time_format)
    }
}

fn validate_pattern(pattern: String) -> Result<String, DateFormatError> {
    if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
        return Err(DateFormatError::Pattern(pattern));
    }
    Ok(pattern)
}

/// Split `1609459200^{date}|Jan 1` into the epoch and the fallback text.
fn split_token(raw: &str) -> (&str, Option<&str>) {
    let (head, fallback) = match raw.split_once('|') {
        Some((head, fallback)) => (head, Some(fallback)),
        None => (raw, None),
    };
    let epoch = head.split_once('^').map_or(head, |(epoch, _)| epoch);
    (epoch.trim(), fallback)
}

/// Parse epoch seconds with an optional fractional part.
fn parse_epoch(epoch: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = epoch.split_once('.').unwrap_or((epoch, ""));
    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs: i64 = secs.parse().ok()?;
    // Nanoseconds from the first nine fractional digits.
    let nanos = frac
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    DateTime::from_timestamp(secs, nanos)
}
