use std::collections::HashMap;
use crate::data::format::{format_compact, format_date, format_number, Raw};
use crate::data::loader::Record;
use crate::render::axis::ValueAxis;
use crate::state::chart_registry::{InterpolationMode, SeriesConfig, Shape};
use crate::state::range::RangeWindow;

/// Labels and values of one metric column, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSource {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl SeriesSource {
    /// Date labels from `label_key` and numbers from `value_key`.
    /// Values that do not parse become NaN and are drawn as gaps.
    pub fn from_records(records: &[Record], label_key: &str, value_key: &str) -> Self {
        Self {
            labels: records.iter().map(|r| format_date(r.get(label_key))).collect(),
            values: records
                .iter()
                .map(|r| Raw::from(r.get(value_key)).to_number())
                .collect(),
        }
    }

    /// Points usable from both sequences.
    fn len(&self) -> usize {
        self.labels.len().min(self.values.len())
    }
}

/// Identifies one drawn chart. A re-render of the same target gets a new
/// generation, so stale handles can be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartHandle {
    pub target: String,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line(InterpolationMode),
    Bar,
}

/// Everything the painter needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    pub handle: ChartHandle,
    pub label: String,
    pub color: [u8; 4],
    pub kind: ChartKind,
    pub axis: ValueAxis,
    pub decimals: usize,
    pub window: RangeWindow,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartInstance {
    pub fn point_count(&self) -> usize {
        self.values.len()
    }

    pub fn color32(&self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.color[0], self.color[1], self.color[2], self.color[3])
    }

    /// Tick values with their axis labels.
    pub fn ticks(&self) -> Vec<(f64, String)> {
        self.axis
            .ticks()
            .into_iter()
            .map(|v| (v, format_compact(v)))
            .collect()
    }

    /// Tooltip text for point `index` of the window.
    pub fn tooltip(&self, index: usize) -> Option<String> {
        let label = self.labels.get(index)?;
        let value = self.values.get(index)?;
        Some(format!("{label}: {}", format_number(*value, self.decimals)))
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.iter().rev().copied().find(|v| v.is_finite())
    }
}

/// Chart slots of the current page and the charts drawn into them.
///
/// A target must be declared before anything can be drawn into it; drawing
/// into an undeclared target does nothing, so a missing slot only loses its
/// own chart.
#[derive(Debug, Default)]
pub struct ChartBoard {
    slots: HashMap<String, Option<ChartInstance>>,
    generation: u64,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the declared targets, destroying every drawn chart.
    pub fn set_targets<I, S>(&mut self, targets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots = targets.into_iter().map(|t| (t.into(), None)).collect();
    }

    pub fn has_target(&self, target: &str) -> bool {
        self.slots.contains_key(target)
    }

    pub fn get(&self, target: &str) -> Option<&ChartInstance> {
        self.slots.get(target).and_then(|slot| slot.as_ref())
    }

    /// Number of charts currently drawn.
    pub fn live_count(&self) -> usize {
        self.slots.values().filter(|s| s.is_some()).count()
    }

    /// Draw `config`'s series into its target, restricted to `range` (the
    /// whole series when `None`). Any chart already in the target is
    /// destroyed first.
    pub fn render_series(
        &mut self,
        config: &SeriesConfig,
        source: &SeriesSource,
        range: Option<RangeWindow>,
        color_index: usize,
    ) -> Option<ChartHandle> {
        let Some(slot) = self.slots.get_mut(&config.id) else {
            tracing::debug!("Chart target {} is not on this page; skipping {}", config.id, config.label);
            return None;
        };

        if let Some(old) = slot.take() {
            tracing::debug!("Destroying chart {}#{}", old.handle.target, old.handle.generation);
        }

        let len = source.len();
        let window = range.map_or(RangeWindow::full(len), |r| r.clamp(len));
        let labels = window.slice(&source.labels[..len]).to_vec();
        let values = window.slice(&source.values[..len]).to_vec();

        let kind = match config.shape {
            Shape::Line => ChartKind::Line(config.interpolation()),
            Shape::Bar => ChartKind::Bar,
        };

        self.generation += 1;
        let handle = ChartHandle {
            target: config.id.clone(),
            generation: self.generation,
        };

        *slot = Some(ChartInstance {
            handle: handle.clone(),
            label: config.label.clone(),
            color: config.rgba(color_index),
            kind,
            axis: ValueAxis::fit(&values, kind == ChartKind::Bar, config.reversed),
            decimals: config.decimals.unwrap_or(0),
            window,
            labels,
            values,
        });
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::chart_registry::ChartRegistry;

    fn source(n: usize) -> SeriesSource {
        SeriesSource {
            labels: (0..n).map(|i| format!("L{i}")).collect(),
            values: (0..n).map(|i| (i * 10) as f64).collect(),
        }
    }

    fn board_for(config: &SeriesConfig) -> ChartBoard {
        let mut board = ChartBoard::new();
        board.set_targets([config.id.as_str()]);
        board
    }

    #[test]
    fn window_selects_exact_points() {
        let reg = ChartRegistry::builtin();
        let cfg = reg.get("total").unwrap();
        let mut board = board_for(cfg);

        board.render_series(cfg, &source(10), Some(RangeWindow { start: 2, end: 5 }), 0);
        let chart = board.get(&cfg.id).unwrap();
        assert_eq!(chart.labels, vec!["L2", "L3", "L4"]);
        assert_eq!(chart.values, vec![20.0, 30.0, 40.0]);
        assert_eq!(chart.point_count(), 3);
    }

    #[test]
    fn reversed_axis_keeps_points_and_order() {
        let reg = ChartRegistry::builtin();
        let rank = reg.get("rank").unwrap();
        let mut board = board_for(rank);

        board.render_series(rank, &source(10), Some(RangeWindow { start: 2, end: 5 }), 0);
        let chart = board.get(&rank.id).unwrap();
        assert!(chart.axis.reversed);
        assert_eq!(chart.labels, vec!["L2", "L3", "L4"]);
        assert_eq!(chart.kind, ChartKind::Line(InterpolationMode::Step));
    }

    #[test]
    fn no_range_means_full_span() {
        let reg = ChartRegistry::builtin();
        let daily = reg.get("daily").unwrap();
        let mut board = board_for(daily);

        board.render_series(daily, &source(4), None, 0);
        let chart = board.get(&daily.id).unwrap();
        assert_eq!(chart.point_count(), 4);
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.axis.min, 0.0);
    }

    #[test]
    fn oversized_range_is_clamped() {
        let reg = ChartRegistry::builtin();
        let cfg = reg.get("total").unwrap();
        let mut board = board_for(cfg);
        board.render_series(cfg, &source(3), Some(RangeWindow { start: 1, end: 90 }), 0);
        assert_eq!(board.get(&cfg.id).unwrap().window, RangeWindow { start: 1, end: 3 });
    }

    #[test]
    fn rerender_replaces_previous_chart() {
        let reg = ChartRegistry::builtin();
        let cfg = reg.get("total").unwrap();
        let mut board = board_for(cfg);

        let first = board.render_series(cfg, &source(10), None, 0).unwrap();
        let second = board
            .render_series(cfg, &source(10), Some(RangeWindow::last(7, 10)), 0)
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(board.live_count(), 1);
        assert_eq!(board.get(&cfg.id).unwrap().handle, second);
        assert_eq!(board.get(&cfg.id).unwrap().point_count(), 7);
    }

    #[test]
    fn undeclared_target_is_a_no_op() {
        let reg = ChartRegistry::builtin();
        let cfg = reg.get("total").unwrap();
        let mut board = ChartBoard::new();
        board.set_targets(["worldRankChart"]);

        assert_eq!(board.render_series(cfg, &source(5), None, 0), None);
        assert_eq!(board.live_count(), 0);
    }

    #[test]
    fn tooltips_and_ticks_are_formatted() {
        let reg = ChartRegistry::builtin();
        let avg = reg.get("average").unwrap();
        let mut board = board_for(avg);
        let src = SeriesSource {
            labels: vec!["01/01/24".into(), "01/02/24".into()],
            values: vec![1234.56, 2500000.0],
        };
        board.render_series(avg, &src, None, 0);
        let chart = board.get(&avg.id).unwrap();
        assert_eq!(chart.tooltip(0).as_deref(), Some("01/01/24: 1,234.6"));
        assert_eq!(chart.tooltip(2), None);
        assert!(chart.ticks().iter().any(|(_, label)| label.ends_with('M')));
        assert_eq!(chart.latest(), Some(2500000.0));
    }

    #[test]
    fn flat_series_tick_labels_are_clean() {
        let reg = ChartRegistry::builtin();
        let active = reg.get("active").unwrap();
        let mut board = board_for(active);
        let src = SeriesSource {
            labels: vec!["01/01/24".into(), "01/02/24".into()],
            values: vec![5.0, 5.0],
        };
        board.render_series(active, &src, None, 0);
        let labels: Vec<String> = board.get(&active.id).unwrap().ticks().into_iter().map(|(_, l)| l).collect();
        assert_eq!(labels, vec!["4.6", "4.8", "5", "5.2", "5.4"]);
    }

    #[test]
    fn series_from_records_marks_bad_values() {
        use crate::data::loader::{parse_records, RowMode, TableDescriptor};
        let t = TableDescriptor::new("daily", &["date", "total"], &["Date", "Total"]).unwrap();
        let records = parse_records("2024-01-01 10\n2024-01-02 n/a\n2024-01-03\n", &t, RowMode::Lenient);
        let src = SeriesSource::from_records(&records, "date", "total");
        assert_eq!(src.labels, vec!["01/01/24", "01/02/24", "01/03/24"]);
        assert_eq!(src.values[0], 10.0);
        assert!(src.values[1].is_nan());
        assert!(src.values[2].is_nan());
    }
}
