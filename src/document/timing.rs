use once_cell::sync::Lazy;
use regex::Regex;

use crate::caption::Millis;
use crate::errors::DocumentError;

// @module: TTML time expressions

// @const: Clock time, HH:MM:SS with an optional fraction of a second
static CLOCK_TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})(?:\.(\d+))?$").unwrap());

// @const: Offset time with a unit
static OFFSET_TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(h|m|s|ms)$").unwrap());

// @const: H:MM:SS.mmm as typed into the shift tool
static SHIFT_FROM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+):(\d{1,2}):(\d{1,2})\.(\d{1,3})\s*$").unwrap());

/// Milliseconds represented by the fractional digits of a second
fn fraction_to_ms(digits: &str) -> Result<Millis, DocumentError> {
    if digits.len() <= 3 {
        let padded = format!("{:0<3}", digits);
        let ms: u64 = padded
            .parse()
            .map_err(|_| DocumentError::InvalidTime(digits.to_string()))?;
        return Ok(ms as Millis);
    }
    let fraction: f64 = format!("0.{}", digits)
        .parse()
        .map_err(|_| DocumentError::InvalidTime(digits.to_string()))?;
    Ok(fraction * 1000.0)
}

fn parse_number(value: &str, expression: &str) -> Result<f64, DocumentError> {
    value
        .parse::<f64>()
        .map_err(|_| DocumentError::InvalidTime(expression.to_string()))
}

/// Parse a TTML time expression into milliseconds
pub fn parse_time_expression(expression: &str) -> Result<Millis, DocumentError> {
    let trimmed = expression.trim();

    if let Some(caps) = CLOCK_TIME_REGEX.captures(trimmed) {
        let hours = parse_number(&caps[1], expression)?;
        let minutes = parse_number(&caps[2], expression)?;
        let seconds = parse_number(&caps[3], expression)?;
        if minutes >= 60.0 || seconds >= 60.0 {
            return Err(DocumentError::InvalidTime(expression.to_string()));
        }
        let millis = match caps.get(4) {
            Some(fraction) => fraction_to_ms(fraction.as_str())?,
            None => 0.0,
        };
        return Ok((hours * 3600.0 + minutes * 60.0 + seconds) * 1000.0 + millis);
    }

    if let Some(caps) = OFFSET_TIME_REGEX.captures(trimmed) {
        let value = parse_number(&caps[1], expression)?;
        let factor = match &caps[2] {
            "h" => 3_600_000.0,
            "m" => 60_000.0,
            "s" => 1_000.0,
            _ => 1.0,
        };
        return Ok(value * factor);
    }

    Err(DocumentError::InvalidTime(expression.to_string()))
}

/// Format milliseconds as a TTML time expression.
///
/// Whole milliseconds use clock time (`HH:MM:SS.mmm`); fractional values use
/// an offset in ms so they read back unchanged.
pub fn format_time_expression(time: Millis) -> String {
    if time.fract() != 0.0 || time < 0.0 {
        return format!("{}ms", time);
    }
    let ms = time as u64;
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Parse a `H:MM:SS.mmm` position as entered for time shifting
pub fn parse_clock_time(input: &str) -> Option<Millis> {
    let caps = SHIFT_FROM_REGEX.captures(input)?;
    let hours: u64 = caps[1].parse().ok()?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;
    let millis: u64 = format!("{:0<3}", &caps[4]).parse().ok()?;
    Some((millis + 1000 * (seconds + 60 * (minutes + 60 * hours))) as Millis)
}
