use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Fallback colors for series whose configured color does not parse.
pub const COLOR_PALETTE: [[u8; 4]; 6] = [
    [59, 130, 246, 255],  // Blue
    [34, 197, 94, 255],   // Green
    [251, 191, 36, 255],  // Amber
    [139, 92, 246, 255],  // Violet
    [239, 68, 68, 255],   // Red
    [20, 184, 166, 255],  // Teal
];

pub fn color_for_index(index: usize) -> [u8; 4] {
    COLOR_PALETTE[index % COLOR_PALETTE.len()]
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(s: &str) -> Option<[u8; 4]> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0, 0, 0, 255];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(out)
        }
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
}

/// How one metric column is drawn: target slot, colors, shape and axis
/// options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Target slot on the page.
    pub id: String,
    /// Daily column holding the values.
    pub column: String,
    pub label: String,
    pub color: String,
    #[serde(default)]
    pub shape: Shape,
    /// Flip the value axis (rank: 1 on top).
    #[serde(default)]
    pub reversed: bool,
    /// Step interpolation; lines only.
    #[serde(default)]
    pub stepped: bool,
    #[serde(default)]
    pub decimals: Option<usize>,
    /// Section heading on the overview page.
    #[serde(default)]
    pub group: Option<String>,
}

impl SeriesConfig {
    fn new(id: &str, column: &str, label: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            column: column.to_string(),
            label: label.to_string(),
            color: color.to_string(),
            shape: Shape::Line,
            reversed: false,
            stepped: false,
            decimals: None,
            group: None,
        }
    }

    fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    fn stepped(mut self) -> Self {
        self.stepped = true;
        self
    }

    fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = Some(decimals);
        self
    }

    fn group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn interpolation(&self) -> InterpolationMode {
        if self.stepped && self.shape == Shape::Line {
            InterpolationMode::Step
        } else {
            InterpolationMode::Linear
        }
    }

    pub fn rgba(&self, fallback_index: usize) -> [u8; 4] {
        parse_hex_color(&self.color).unwrap_or_else(|| color_for_index(fallback_index))
    }
}

/// Metric name to series configuration. Built once at startup and handed to
/// whoever renders charts; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRegistry {
    entries: Vec<(String, SeriesConfig)>,
}

/// Metric shown when a page asks for an unknown one.
pub const DEFAULT_METRIC: &str = "total";

impl ChartRegistry {
    pub fn builtin() -> Self {
        let entries = vec![
            SeriesConfig::new("totalPointsChart", "total", "Total Points", "#3b82f6")
                .group("Points"),
            SeriesConfig::new("worldRankChart", "rank", "World Rank", "#22c55e")
                .reversed()
                .stepped()
                .group("Ranks"),
            SeriesConfig::new("dailyPointsChart", "daily", "Daily Points", "#fbbf24")
                .shape(Shape::Bar)
                .group("Points"),
            SeriesConfig::new("countryRankChart", "country_rank", "Country Rank", "#8b5cf6")
                .reversed()
                .stepped()
                .group("Ranks"),
            SeriesConfig::new("activeDaysChart", "active", "Active Days", "#ef4444")
                .stepped()
                .group("Activity"),
            SeriesConfig::new("averagePointsChart", "average", "Average Points", "#14b8a6")
                .decimals(1)
                .group("Points"),
        ];
        let names = ["total", "rank", "daily", "country", "active", "average"];
        Self {
            entries: names
                .iter()
                .map(|n| n.to_string())
                .zip(entries)
                .collect(),
        }
    }

    /// Registry with `overrides` replacing same-named entries and adding new
    /// ones after the existing entries.
    pub fn with_overrides(mut self, overrides: BTreeMap<String, SeriesConfig>) -> Self {
        for (name, config) in overrides {
            match self.entries.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = config,
                None => self.entries.push((name, config)),
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&SeriesConfig> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Entry for a metric page, falling back to the default metric (or the
    /// first entry) for unknown names.
    pub fn resolve(&self, name: &str) -> Option<(&str, &SeriesConfig)> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.entries.iter().find(|(n, _)| n == DEFAULT_METRIC))
            .or_else(|| self.entries.first())
            .map(|(n, c)| (n.as_str(), c))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SeriesConfig)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }
}
