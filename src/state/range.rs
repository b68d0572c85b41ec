use serde::{Deserialize, Serialize};

/// A contiguous `[start, end)` slice of a chronologically ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    pub start: usize,
    pub end: usize,
}

impl RangeWindow {
    pub fn full(len: usize) -> Self {
        Self { start: 0, end: len }
    }

    /// Window clamped so that `0 <= start <= end <= len`.
    pub fn new(start: usize, end: usize, len: usize) -> Self {
        let end = end.min(len);
        Self { start: start.min(end), end }
    }

    /// The trailing `count` entries of a sequence of `len`.
    pub fn last(count: usize, len: usize) -> Self {
        Self { start: len.saturating_sub(count), end: len }
    }

    /// Re-clamp against a sequence of `len`.
    pub fn clamp(self, len: usize) -> Self {
        Self::new(self.start, self.end, len)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let w = self.clamp(items.len());
        &items[w.start..w.end]
    }
}

/// Range buttons offered on a metric page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RangePreset {
    #[serde(rename = "1W")]
    Week,
    #[serde(rename = "1M")]
    Month,
    #[serde(rename = "3M")]
    #[default]
    Quarter,
    #[serde(rename = "1Y")]
    Year,
    #[serde(rename = "max")]
    Max,
}

impl RangePreset {
    pub const ALL: [RangePreset; 5] = [
        RangePreset::Week,
        RangePreset::Month,
        RangePreset::Quarter,
        RangePreset::Year,
        RangePreset::Max,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RangePreset::Week => "1W",
            RangePreset::Month => "1M",
            RangePreset::Quarter => "3M",
            RangePreset::Year => "1Y",
            RangePreset::Max => "Max",
        }
    }

    /// Number of most recent days shown, `None` for everything.
    pub fn days(&self) -> Option<usize> {
        match self {
            RangePreset::Week => Some(7),
            RangePreset::Month => Some(30),
            RangePreset::Quarter => Some(90),
            RangePreset::Year => Some(365),
            RangePreset::Max => None,
        }
    }

    pub fn window(&self, len: usize) -> RangeWindow {
        match self.days() {
            Some(days) => RangeWindow::last(days, len),
            None => RangeWindow::full(len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_into_bounds() {
        assert_eq!(RangeWindow::new(2, 5, 10), RangeWindow { start: 2, end: 5 });
        assert_eq!(RangeWindow::new(8, 50, 10), RangeWindow { start: 8, end: 10 });
        assert_eq!(RangeWindow::new(7, 3, 10), RangeWindow { start: 3, end: 3 });
        assert_eq!(RangeWindow::new(12, 20, 10), RangeWindow { start: 10, end: 10 });
    }

    #[test]
    fn last_takes_the_tail() {
        assert_eq!(RangeWindow::last(3, 10), RangeWindow { start: 7, end: 10 });
        assert_eq!(RangeWindow::last(30, 10), RangeWindow::full(10));
    }

    #[test]
    fn slice_selects_window() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(RangeWindow { start: 2, end: 5 }.slice(&items), &[2, 3, 4]);
        assert_eq!(RangeWindow { start: 8, end: 40 }.slice(&items), &[8, 9]);
    }

    #[test]
    fn presets_resolve_to_trailing_windows() {
        assert_eq!(RangePreset::default(), RangePreset::Quarter);
        assert_eq!(RangePreset::Week.window(100), RangeWindow { start: 93, end: 100 });
        assert_eq!(RangePreset::Quarter.window(60), RangeWindow::full(60));
        assert_eq!(RangePreset::Max.window(500), RangeWindow::full(500));
    }

    #[test]
    fn presets_deserialize_from_button_labels() {
        let p: RangePreset = serde_json::from_str("\"1Y\"").unwrap();
        assert_eq!(p, RangePreset::Year);
        let p: RangePreset = serde_json::from_str("\"max\"").unwrap();
        assert_eq!(p, RangePreset::Max);
    }
}
