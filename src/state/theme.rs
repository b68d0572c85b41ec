use egui::{Color32, CornerRadius, Visuals};
use serde::{Deserialize, Serialize};
use crate::data::format::Trend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Colors the dashboard paints with, beyond what egui's visuals cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub chart_bg: Color32,
    pub tile_bg: Color32,
    pub grid: Color32,
    pub axis_text: Color32,
    pub gain: Color32,
    pub loss: Color32,
}

const DARK: Palette = Palette {
    chart_bg: Color32::from_rgb(20, 20, 20),
    tile_bg: Color32::from_rgb(32, 34, 38),
    grid: Color32::from_rgba_premultiplied(100, 100, 100, 60),
    axis_text: Color32::from_gray(170),
    gain: Color32::from_rgb(74, 222, 128),
    loss: Color32::from_rgb(248, 113, 113),
};

const LIGHT: Palette = Palette {
    chart_bg: Color32::WHITE,
    tile_bg: Color32::from_rgb(243, 244, 246),
    grid: Color32::from_rgba_premultiplied(180, 180, 180, 80),
    axis_text: Color32::from_gray(90),
    gain: Color32::from_rgb(22, 163, 74),
    loss: Color32::from_rgb(220, 38, 38),
};

impl Palette {
    /// Color of a diff cell. Unchanged values use the axis text color.
    pub fn trend(&self, trend: Trend) -> Color32 {
        match trend {
            Trend::Up => self.gain,
            Trend::Down => self.loss,
            Trend::Equal => self.axis_text,
        }
    }
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Theme::Dark => &DARK,
            Theme::Light => &LIGHT,
        }
    }

    /// egui visuals for the theme with rounded windows and widgets.
    pub fn visuals(self) -> Visuals {
        let mut vis = match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        };
        vis.window_corner_radius = CornerRadius::same(8);
        for widget in [
            &mut vis.widgets.inactive,
            &mut vis.widgets.hovered,
            &mut vis.widgets.active,
        ] {
            widget.corner_radius = CornerRadius::same(6);
        }
        vis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_round_trips() {
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Dark.toggle().toggle(), Theme::Dark);
    }

    #[test]
    fn trends_have_distinct_colors() {
        for theme in [Theme::Dark, Theme::Light] {
            let p = theme.palette();
            assert_ne!(p.trend(Trend::Up), p.trend(Trend::Down));
            assert_eq!(p.trend(Trend::Equal), p.axis_text);
        }
    }

    #[test]
    fn visuals_follow_theme() {
        assert!(Theme::Dark.visuals().dark_mode);
        assert!(!Theme::Light.visuals().dark_mode);
        assert_eq!(Theme::Light.visuals().window_corner_radius, CornerRadius::same(8));
    }
}
