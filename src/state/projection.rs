use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::data::datetime::{format_short_date, parse_date};
use crate::data::format::{format_number, numeric, PLACEHOLDER};
use crate::data::loader::Record;

/// Number of trailing daily records the rate is averaged over.
pub const DEFAULT_PROJECTION_DAYS: usize = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("no daily data with a valid date and total")]
    NoData,
    #[error("no positive daily points in the last {0} days")]
    NoRate(usize),
    #[error("target is not a number")]
    InvalidTarget,
    #[error("target date is not after the latest record")]
    DateInPast,
}

/// Where the projection starts: the newest record and the recent daily rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub date: NaiveDate,
    pub total: f64,
    /// Mean of the positive daily gains in the window.
    pub rate: f64,
}

impl Baseline {
    /// `daily` is oldest first; the rate is taken over the last `window`
    /// records, ignoring days without positive points.
    pub fn from_daily(daily: &[Record], window: usize) -> Result<Self, ProjectionError> {
        let latest = daily.last().ok_or(ProjectionError::NoData)?;
        let date = latest.get("date").and_then(parse_date).ok_or(ProjectionError::NoData)?;
        let total = latest.get("total").and_then(numeric).ok_or(ProjectionError::NoData)?;

        let gains: Vec<f64> = daily[daily.len().saturating_sub(window)..]
            .iter()
            .filter_map(|r| r.get("daily").and_then(numeric))
            .filter(|v| *v > 0.0)
            .collect();
        if gains.is_empty() {
            return Err(ProjectionError::NoRate(window));
        }
        let rate = gains.iter().sum::<f64>() / gains.len() as f64;

        Ok(Self { date, total, rate })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// The target total is already behind us.
    Reached,
    Eta { days: i64, date: NaiveDate },
    Total { days: i64, total: f64 },
}

impl Projection {
    /// Headline and detail line for the calculator.
    pub fn summary(&self) -> (String, String) {
        match self {
            Projection::Reached => ("Reached".to_string(), "Target is already met".to_string()),
            Projection::Eta { days, date } => (
                format_short_date(*date),
                format!("in {} days", format_number(*days as f64, 0)),
            ),
            Projection::Total { days, total } => (
                format_number(*total, 0),
                format!("after {} days", format_number(*days as f64, 0)),
            ),
        }
    }
}

/// Days needed to reach `target` points at the baseline rate.
pub fn project_points(base: &Baseline, target: f64) -> Result<Projection, ProjectionError> {
    if !target.is_finite() {
        return Err(ProjectionError::InvalidTarget);
    }
    let remaining = target - base.total;
    if remaining <= 0.0 {
        return Ok(Projection::Reached);
    }
    let days = (remaining / base.rate).ceil();
    if !days.is_finite() || days >= i64::MAX as f64 {
        return Err(ProjectionError::InvalidTarget);
    }
    let days = days as i64;
    let date = Duration::try_days(days)
        .and_then(|span| base.date.checked_add_signed(span))
        .ok_or(ProjectionError::InvalidTarget)?;
    Ok(Projection::Eta { days, date })
}

/// Expected total on `target` at the baseline rate.
pub fn project_date(base: &Baseline, target: NaiveDate) -> Result<Projection, ProjectionError> {
    let days = (target - base.date).num_days();
    if days <= 0 {
        return Err(ProjectionError::DateInPast);
    }
    Ok(Projection::Total { days, total: base.total + base.rate * days as f64 })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalculatorMode {
    #[default]
    TargetPoints,
    TargetDate,
}

impl CalculatorMode {
    pub fn label(&self) -> &'static str {
        match self {
            CalculatorMode::TargetPoints => "Target points",
            CalculatorMode::TargetDate => "Target date",
        }
    }
}

/// What the user has typed into the calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorInput {
    pub mode: CalculatorMode,
    pub points: String,
    pub date: NaiveDate,
}

impl CalculatorInput {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            mode: CalculatorMode::default(),
            points: String::new(),
            date: today,
        }
    }

    pub fn evaluate(&self, base: &Baseline) -> Result<Projection, ProjectionError> {
        match self.mode {
            CalculatorMode::TargetPoints => {
                let cleaned: String = self.points.chars().filter(|c| *c != ',').collect();
                let target = numeric(&cleaned).ok_or(ProjectionError::InvalidTarget)?;
                project_points(base, target)
            }
            CalculatorMode::TargetDate => project_date(base, self.date),
        }
    }
}

/// Calculator output, with the placeholder and the reason on failure.
pub fn render_result(result: &Result<Projection, ProjectionError>) -> (String, String) {
    match result {
        Ok(p) => p.summary(),
        Err(e) => (PLACEHOLDER.to_string(), e.to_string()),
    }
}
