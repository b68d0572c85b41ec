/// Value (vertical) axis of a chart: data bounds plus orientation.
/// `reversed` puts the minimum at the top, which is what rank charts want.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAxis {
    pub min: f64,
    pub max: f64,
    pub reversed: bool,
}

impl ValueAxis {
    /// Fit the axis to the finite `values` with 5% padding. Bar charts keep
    /// zero inside the range so bars have a baseline.
    pub fn fit(values: &[f64], include_zero: bool, reversed: bool) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values.iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if !min.is_finite() || !max.is_finite() {
            return Self { min: 0.0, max: 1.0, reversed };
        }
        if include_zero {
            min = min.min(0.0);
            max = max.max(0.0);
        }

        let pad = (max - min) * 0.05;
        let pad = if pad.abs() < 1e-15 { 0.5 } else { pad };
        let (lo, hi) = if include_zero && min >= 0.0 {
            (min, max + pad)
        } else if include_zero && max <= 0.0 {
            (min - pad, max)
        } else {
            (min - pad, max + pad)
        };
        Self { min: lo, max: hi, reversed }
    }

    /// Position of `v` along the axis: 0.0 at the bottom edge, 1.0 at the top.
    pub fn to_unit(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        let t = if span.abs() < 1e-15 { 0.5 } else { (v - self.min) / span };
        if self.reversed {
            1.0 - t
        } else {
            t
        }
    }

    pub fn to_screen_y(&self, v: f64, rect: egui::Rect) -> f32 {
        rect.bottom() - (self.to_unit(v) as f32) * rect.height()
    }

    /// Major tick values inside the axis bounds.
    pub fn ticks(&self) -> Vec<f64> {
        tick_values(self.min, self.max)
    }
}

/// Horizontal center of category `index` out of `count` evenly spaced slots.
pub fn category_x(index: usize, count: usize, rect: egui::Rect) -> f32 {
    if count == 0 {
        return rect.center().x;
    }
    let slot = rect.width() / count as f32;
    rect.left() + slot * (index as f32 + 0.5)
}

/// Category slot under screen position `x`, if any.
pub fn category_at(x: f32, count: usize, rect: egui::Rect) -> Option<usize> {
    if count == 0 || x < rect.left() || x > rect.right() {
        return None;
    }
    let slot = rect.width() / count as f32;
    Some((((x - rect.left()) / slot) as usize).min(count - 1))
}

/// Expand a polyline into a step-before path: hold the previous value
/// horizontally, then jump vertically at the next point.
pub fn stepped_path(points: &[egui::Pos2]) -> Vec<egui::Pos2> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(egui::Pos2::new(p.x, points[i - 1].y));
        }
        out.push(*p);
    }
    out
}

/// Major tick spacing: 1, 2 or 5 times a power of ten, giving about six
/// intervals over `span`.
fn nice_step(span: f64) -> f64 {
    let rough = span / 6.0;
    let magnitude = 10f64.powf(rough.log10().floor());
    let multiple = [1.0, 2.0, 5.0]
        .into_iter()
        .find(|m| rough / magnitude <= *m)
        .unwrap_or(10.0);
    multiple * magnitude
}

/// Tick values between `min` and `max`, each rounded to the decimals of the
/// step so accumulated float error never reaches the labels.
pub fn tick_values(min: f64, max: f64) -> Vec<f64> {
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return Vec::new();
    }
    let step = nice_step(span);
    let decimals = (-step.log10().floor()).clamp(0.0, 15.0) as i32;
    let scale = 10f64.powi(decimals);
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last)
        .map(|i| (i as f64 * step * scale).round() / scale)
        .filter(|v| (min..=max).contains(v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> egui::Rect {
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(100.0, 200.0))
    }

    #[test]
    fn reversed_axis_flips_orientation_only() {
        let normal = ValueAxis { min: 0.0, max: 10.0, reversed: false };
        let reversed = ValueAxis { reversed: true, ..normal };

        assert_eq!(normal.to_unit(10.0), 1.0);
        assert_eq!(reversed.to_unit(10.0), 0.0);
        // Rank 1 ends up above rank 10.
        assert!(reversed.to_screen_y(1.0, rect()) < reversed.to_screen_y(10.0, rect()));
        assert!(normal.to_screen_y(1.0, rect()) > normal.to_screen_y(10.0, rect()));
        assert_eq!(normal.ticks(), reversed.ticks());
    }

    #[test]
    fn fit_pads_and_anchors_bars_at_zero() {
        let line = ValueAxis::fit(&[100.0, 200.0, f64::NAN], false, false);
        assert!(line.min < 100.0 && line.min > 90.0);
        assert!(line.max > 200.0);

        let bar = ValueAxis::fit(&[100.0, 200.0], true, false);
        assert_eq!(bar.min, 0.0);
        assert!(bar.max > 200.0);
    }

    #[test]
    fn fit_handles_flat_and_empty_series() {
        let flat = ValueAxis::fit(&[5.0, 5.0], false, false);
        assert_eq!((flat.min, flat.max), (4.5, 5.5));
        let empty = ValueAxis::fit(&[f64::NAN], false, true);
        assert_eq!((empty.min, empty.max), (0.0, 1.0));
        assert!(empty.reversed);
    }

    #[test]
    fn categories_map_both_ways() {
        let r = rect();
        assert_eq!(category_x(0, 4, r), 12.5);
        assert_eq!(category_x(3, 4, r), 87.5);
        assert_eq!(category_at(12.5, 4, r), Some(0));
        assert_eq!(category_at(100.0, 4, r), Some(3));
        assert_eq!(category_at(-1.0, 4, r), None);
        assert_eq!(category_at(50.0, 0, r), None);
    }

    #[test]
    fn step_path_holds_previous_value() {
        let pts = [egui::pos2(0.0, 10.0), egui::pos2(5.0, 20.0), egui::pos2(9.0, 15.0)];
        assert_eq!(
            stepped_path(&pts),
            vec![
                egui::pos2(0.0, 10.0),
                egui::pos2(5.0, 10.0),
                egui::pos2(5.0, 20.0),
                egui::pos2(9.0, 20.0),
                egui::pos2(9.0, 15.0),
            ]
        );
        assert!(stepped_path(&[]).is_empty());
    }

    #[test]
    fn ticks_use_round_steps() {
        assert_eq!(tick_values(0.0, 1000.0), vec![0.0, 200.0, 400.0, 600.0, 800.0, 1000.0]);
        assert_eq!(tick_values(-3.0, 12.0), vec![0.0, 5.0, 10.0]);
        assert!(tick_values(5.0, 5.0).is_empty());
        assert!(tick_values(f64::NAN, 1.0).is_empty());
    }

    #[test]
    fn fractional_ticks_are_snapped() {
        assert_eq!(tick_values(4.5, 5.5), vec![4.6, 4.8, 5.0, 5.2, 5.4]);
        assert_eq!(tick_values(0.0, 0.7), vec![0.0, 0.2, 0.4, 0.6]);
        assert_eq!(tick_values(0.0, 0.35), vec![0.0, 0.1, 0.2, 0.3]);
    }
}
