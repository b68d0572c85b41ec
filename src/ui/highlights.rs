use eframe::egui;
use crate::state::highlights::Highlights;
use crate::state::theme::Theme;

const TILE_SIZE: egui::Vec2 = egui::vec2(170.0, 62.0);

pub fn show_highlights(ui: &mut egui::Ui, highlights: &Highlights, theme: &Theme) {
    if highlights.is_empty() {
        return;
    }
    ui.horizontal_wrapped(|ui| {
        for tile in &highlights.tiles {
            egui::Frame::new()
                .fill(theme.palette().tile_bg)
                .corner_radius(egui::CornerRadius::same(8))
                .inner_margin(egui::Margin::symmetric(12, 8))
                .show(ui, |ui| {
                    ui.set_min_size(TILE_SIZE);
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(tile.title).small().weak());
                        let mut value = egui::RichText::new(tile.value.text()).size(20.0).strong();
                        if let Some(trend) = tile.value.trend() {
                            value = value.color(theme.palette().trend(trend));
                        }
                        ui.label(value);
                    });
                });
        }
    });
}
