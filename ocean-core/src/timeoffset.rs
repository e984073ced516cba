//! Converts a timestamp recorded under one GMT offset into GMT and into a
//! second offset, producing display labels for all three.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, PrimitiveDateTime};

pub const CONVERSION_ERROR: &str = "Error in time conversion";

const INPUT_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];

// en-GB locale rendering, e.g. "10/03/2024, 17:00:00"
const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year], [hour]:[minute]:[second]");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetLabels {
    /// Not produced when the conversion fails.
    pub source: Option<String>,
    pub gmt: String,
    pub target: String,
}

impl OffsetLabels {
    fn failed() -> Self {
        Self {
            source: None,
            gmt: CONVERSION_ERROR.into(),
            target: CONVERSION_ERROR.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.source.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct TimeOffsetCalculator {
    pub source_name: String,
    pub target_name: String,
}

impl Default for TimeOffsetCalculator {
    fn default() -> Self {
        Self {
            source_name: "File Time".into(),
            target_name: "Local Time".into(),
        }
    }
}

impl TimeOffsetCalculator {
    /// Offsets are signed minutes east of GMT and parsed leniently: leading
    /// whitespace, an optional sign and a run of digits, anything after is
    /// ignored. A missing number on either side fails the whole conversion.
    pub fn calculate(
        &self,
        timestamp: &str,
        source_offset: &str,
        target_offset: &str,
    ) -> OffsetLabels {
        let (Some(src), Some(tgt)) = (parse_offset(source_offset), parse_offset(target_offset))
        else {
            return OffsetLabels::failed();
        };
        let Some(source) = parse_timestamp(timestamp) else {
            return OffsetLabels::failed();
        };
        let Some((gmt, target)) = convert(source, src, tgt) else {
            return OffsetLabels::failed();
        };

        let rendered = (display(source), display(gmt), display(target));
        let (Some(source), Some(gmt), Some(target)) = rendered else {
            return OffsetLabels::failed();
        };
        OffsetLabels {
            source: Some(format!("{} ({}): {source}", self.source_name, offset_label(src))),
            gmt: format!("GMT Time (GMT+0): {gmt}"),
            target: format!("{} ({}): {target}", self.target_name, offset_label(tgt)),
        }
    }
}

/// `(gmt, target)` for a source time under `source_minutes`; None on overflow.
pub fn convert(
    source: PrimitiveDateTime,
    source_minutes: i64,
    target_minutes: i64,
) -> Option<(PrimitiveDateTime, PrimitiveDateTime)> {
    let gmt = source.checked_sub(Duration::seconds(source_minutes.checked_mul(60)?))?;
    let target = gmt.checked_add(Duration::seconds(target_minutes.checked_mul(60)?))?;
    Some((gmt, target))
}

/// `GMT+5`, `GMT-5`, `GMT+5.5`, `GMT+0`.
pub fn offset_label(minutes: i64) -> String {
    let sign = if minutes >= 0 { "+" } else { "" };
    format!("GMT{sign}{}", minutes as f64 / 60.0)
}

pub fn parse_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(raw, *fmt).ok())
}

fn parse_offset(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn display(t: PrimitiveDateTime) -> Option<String> {
    t.format(DISPLAY_FORMAT).ok()
}
