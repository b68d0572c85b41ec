use serde::{Deserialize, Serialize};
use crate::data::datetime;

/// Shown in place of values that are missing or not numbers.
pub const PLACEHOLDER: &str = "\u{2013}";

/// Text of a zero difference, whatever the requested precision.
pub const ZERO_DIFF: &str = "\u{b1}0";

/// A value handed to a formatter: a raw field (possibly absent) or a number
/// computed by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Raw<'a> {
    Missing,
    Text(&'a str),
    Number(f64),
}

impl<'a> From<&'a str> for Raw<'a> {
    fn from(s: &'a str) -> Self {
        Raw::Text(s)
    }
}

impl<'a> From<Option<&'a str>> for Raw<'a> {
    fn from(s: Option<&'a str>) -> Self {
        s.map_or(Raw::Missing, Raw::Text)
    }
}

impl From<f64> for Raw<'static> {
    fn from(v: f64) -> Self {
        Raw::Number(v)
    }
}

impl Raw<'_> {
    /// Missing values, empty text and numeric zero carry no information.
    /// Text `"0"` is a real reading and is not falsy.
    pub fn is_falsy(&self) -> bool {
        match self {
            Raw::Missing => true,
            Raw::Text(s) => s.is_empty(),
            Raw::Number(v) => *v == 0.0 || v.is_nan(),
        }
    }

    /// Numeric value, NaN when the input is absent or not a finite number.
    /// Blank text counts as zero.
    pub fn to_number(&self) -> f64 {
        match self {
            Raw::Missing => f64::NAN,
            Raw::Text(s) => coerce(s),
            Raw::Number(v) if v.is_finite() => *v,
            Raw::Number(_) => f64::NAN,
        }
    }
}

fn coerce(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}

/// Parse a field as a finite number; blank or malformed fields yield `None`.
pub fn numeric(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render `v` with `,` thousands separators and exactly `decimals` digits.
fn with_separators(v: f64, decimals: usize) -> String {
    let digits = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
    if v < 0.0 {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

pub fn format_number<'a>(raw: impl Into<Raw<'a>>, decimals: usize) -> String {
    let raw = raw.into();
    if raw.is_falsy() {
        return PLACEHOLDER.to_string();
    }
    let v = raw.to_number();
    if v.is_nan() {
        return PLACEHOLDER.to_string();
    }
    with_separators(v, decimals)
}

/// Short form for axis ticks: `1.5M`, `12k`, `950`.
pub fn format_compact<'a>(raw: impl Into<Raw<'a>>) -> String {
    let v = raw.into().to_number();
    if v.is_nan() {
        return PLACEHOLDER.to_string();
    }

    let scaled = |div: f64, suffix: &str| {
        let s = format!("{:.1}", v / div);
        let s = s.strip_suffix(".0").unwrap_or(&s);
        format!("{s}{suffix}")
    };

    if v.abs() >= 1e6 {
        scaled(1e6, "M")
    } else if v.abs() >= 1e3 {
        scaled(1e3, "k")
    } else if v == 0.0 {
        "0".to_string()
    } else {
        format!("{v}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Equal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub trend: Trend,
    pub text: String,
}

/// Signed change with its direction. `None` means there is nothing to show.
pub fn format_diff<'a>(raw: impl Into<Raw<'a>>, decimals: usize) -> Option<Diff> {
    let v = raw.into().to_number();
    if v.is_nan() {
        return None;
    }

    let diff = if v > 0.0 {
        Diff { trend: Trend::Up, text: format!("+{}", format_number(v, decimals)) }
    } else if v < 0.0 {
        Diff { trend: Trend::Down, text: format_number(v, decimals) }
    } else {
        Diff { trend: Trend::Equal, text: ZERO_DIFF.to_string() }
    };
    Some(diff)
}

pub fn format_date<'a>(raw: impl Into<Raw<'a>>) -> String {
    match raw.into() {
        Raw::Text(s) if !s.is_empty() => datetime::parse_date(s)
            .map(datetime::format_short_date)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Rendered content of a table cell or highlight tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Diff(Diff),
}

impl Cell {
    pub fn text(&self) -> &str {
        match self {
            Cell::Text(s) => s,
            Cell::Diff(d) => &d.text,
        }
    }

    pub fn trend(&self) -> Option<Trend> {
        match self {
            Cell::Text(_) => None,
            Cell::Diff(d) => Some(d.trend),
        }
    }
}

/// Named cell formatters a column can ask for in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormatterId {
    #[default]
    Number,
    Number1,
    Compact,
    Diff,
    Date,
    Text,
    Quoted,
}

impl FormatterId {
    pub fn name(&self) -> &'static str {
        match self {
            FormatterId::Number => "number",
            FormatterId::Number1 => "number1",
            FormatterId::Compact => "compact",
            FormatterId::Diff => "diff",
            FormatterId::Date => "date",
            FormatterId::Text => "text",
            FormatterId::Quoted => "quoted",
        }
    }

    pub fn apply(self, raw: Option<&str>) -> Cell {
        match self {
            FormatterId::Number => Cell::Text(format_number(raw, 0)),
            FormatterId::Number1 => Cell::Text(format_number(raw, 1)),
            FormatterId::Compact => Cell::Text(format_compact(raw)),
            FormatterId::Diff => match format_diff(raw, 0) {
                Some(d) => Cell::Diff(d),
                None => Cell::Text(PLACEHOLDER.to_string()),
            },
            FormatterId::Date => Cell::Text(format_date(raw)),
            FormatterId::Text => Cell::Text(raw.unwrap_or_default().to_string()),
            FormatterId::Quoted => {
                let s = raw.unwrap_or_default();
                let s = s.strip_prefix('"').unwrap_or(s);
                let s = s.strip_suffix('"').unwrap_or(s);
                Cell::Text(s.to_string())
            }
        }
    }
}
