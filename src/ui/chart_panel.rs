use eframe::egui;
use crate::render::axis::{category_at, category_x, stepped_path};
use crate::render::chart::{ChartInstance, ChartKind};
use crate::state::chart_registry::InterpolationMode;
use crate::state::theme::Theme;

const LEFT_MARGIN: f32 = 56.0;
const RIGHT_MARGIN: f32 = 12.0;
const TOP_MARGIN: f32 = 8.0;
const BOTTOM_MARGIN: f32 = 22.0;
/// Roughly how many x labels fit without overlapping.
const X_LABEL_SPACING: f32 = 70.0;

/// Draw one chart into a frame of `height`, with its title above.
pub fn show_chart(ui: &mut egui::Ui, chart: &ChartInstance, theme: &Theme, height: f32) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(10))
        .corner_radius(egui::CornerRadius::same(8))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&chart.label).strong().color(chart.color32()));
                if let Some(latest) = chart.latest() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let text = crate::data::format::format_number(latest, chart.decimals);
                        ui.label(egui::RichText::new(text).weak());
                    });
                }
            });

            if chart.point_count() == 0 {
                ui.add_space(height / 2.0 - 10.0);
                ui.vertical_centered(|ui| ui.label(egui::RichText::new("No data").weak()));
                ui.add_space(height / 2.0 - 10.0);
                return;
            }

            let total_rect = ui.allocate_space(egui::vec2(ui.available_width(), height)).1;
            let plot_rect = egui::Rect::from_min_max(
                egui::pos2(total_rect.left() + LEFT_MARGIN, total_rect.top() + TOP_MARGIN),
                egui::pos2(total_rect.right() - RIGHT_MARGIN, total_rect.bottom() - BOTTOM_MARGIN),
            );
            let response = ui.interact(
                plot_rect,
                egui::Id::new("chart").with(&chart.handle.target),
                egui::Sense::hover(),
            );
            let painter = ui.painter_at(total_rect);

            painter.rect_filled(plot_rect, 0.0, theme.palette().chart_bg);
            draw_axes(&painter, chart, theme, plot_rect);
            match chart.kind {
                ChartKind::Bar => draw_bars(&painter, chart, plot_rect),
                ChartKind::Line(mode) => draw_line(&painter, chart, plot_rect, mode),
            }

            if let Some(pos) = response.hover_pos() {
                if let Some(index) = category_at(pos.x, chart.point_count(), plot_rect) {
                    draw_hover_tooltip(&painter, chart, plot_rect, index);
                }
            }
        });
}

fn draw_axes(painter: &egui::Painter, chart: &ChartInstance, theme: &Theme, plot_rect: egui::Rect) {
    let dim_color = theme.palette().axis_text;
    let font = egui::FontId::proportional(10.0);

    for (value, label) in chart.ticks() {
        let y = chart.axis.to_screen_y(value, plot_rect);
        painter.line_segment(
            [egui::pos2(plot_rect.left(), y), egui::pos2(plot_rect.right(), y)],
            egui::Stroke::new(1.0, theme.palette().grid),
        );
        painter.text(
            egui::pos2(plot_rect.left() - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            label,
            font.clone(),
            dim_color,
        );
    }

    let count = chart.point_count();
    let every = ((count as f32 * X_LABEL_SPACING / plot_rect.width().max(1.0)).ceil() as usize).max(1);
    for (i, label) in chart.labels.iter().enumerate() {
        if i % every != 0 {
            continue;
        }
        painter.text(
            egui::pos2(category_x(i, count, plot_rect), plot_rect.bottom() + 4.0),
            egui::Align2::CENTER_TOP,
            label,
            font.clone(),
            dim_color,
        );
    }

    painter.rect_stroke(
        plot_rect,
        0.0,
        egui::Stroke::new(1.0, dim_color.gamma_multiply(0.6)),
        egui::StrokeKind::Outside,
    );
}

fn draw_bars(painter: &egui::Painter, chart: &ChartInstance, plot_rect: egui::Rect) {
    let count = chart.point_count();
    let half = (plot_rect.width() / count as f32 * 0.35).max(0.5);
    let zero = 0.0_f64.clamp(chart.axis.min, chart.axis.max);
    let base_y = chart.axis.to_screen_y(zero, plot_rect);
    let color = chart.color32();

    for (i, v) in chart.values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        let x = category_x(i, count, plot_rect);
        let y = chart.axis.to_screen_y(*v, plot_rect);
        let rect = egui::Rect::from_two_pos(egui::pos2(x - half, base_y), egui::pos2(x + half, y));
        painter.rect_filled(rect, 1.0, color);
    }
}

fn draw_line(painter: &egui::Painter, chart: &ChartInstance, plot_rect: egui::Rect, mode: InterpolationMode) {
    let count = chart.point_count();
    let stroke = egui::Stroke::new(2.0, chart.color32());

    // Missing values split the line into separate runs.
    let mut run: Vec<egui::Pos2> = Vec::new();
    let flush = |run: &mut Vec<egui::Pos2>| {
        match run.len() {
            0 => {}
            1 => {
                painter.circle_filled(run[0], 2.0, stroke.color);
            }
            _ => {
                let points = match mode {
                    InterpolationMode::Step => stepped_path(run),
                    InterpolationMode::Linear => run.clone(),
                };
                painter.add(egui::Shape::line(points, stroke));
            }
        }
        run.clear();
    };

    for (i, v) in chart.values.iter().enumerate() {
        if v.is_finite() {
            run.push(egui::pos2(
                category_x(i, count, plot_rect),
                chart.axis.to_screen_y(*v, plot_rect),
            ));
        } else {
            flush(&mut run);
        }
    }
    flush(&mut run);
}

fn draw_hover_tooltip(painter: &egui::Painter, chart: &ChartInstance, plot_rect: egui::Rect, index: usize) {
    let Some(text) = chart.tooltip(index) else {
        return;
    };
    let color = chart.color32();
    let x = category_x(index, chart.point_count(), plot_rect);
    painter.line_segment(
        [egui::pos2(x, plot_rect.top()), egui::pos2(x, plot_rect.bottom())],
        egui::Stroke::new(1.0, color.gamma_multiply(0.5)),
    );

    let value = chart.values[index];
    let anchor = if value.is_finite() {
        let p = egui::pos2(x, chart.axis.to_screen_y(value, plot_rect));
        painter.circle_filled(p, 4.0, color);
        painter.circle_stroke(p, 4.0, egui::Stroke::new(1.0, egui::Color32::WHITE));
        p
    } else {
        egui::pos2(x, plot_rect.center().y)
    };

    let font = egui::FontId::proportional(11.0);
    let text_color = painter.ctx().style().visuals.text_color();
    let galley = painter.layout_no_wrap(text.clone(), font.clone(), text_color);
    let size = galley.rect.size();

    // Flip to the left of the cursor near the right edge.
    let left = if anchor.x + 10.0 + size.x + 8.0 > plot_rect.right() {
        anchor.x - 10.0 - size.x
    } else {
        anchor.x + 10.0
    };
    let top = (anchor.y - size.y - 8.0).max(plot_rect.top());
    let tooltip_pos = egui::pos2(left, top);
    let bg_rect = egui::Rect::from_min_size(
        egui::pos2(tooltip_pos.x - 4.0, tooltip_pos.y - 2.0),
        egui::vec2(size.x + 8.0, size.y + 4.0),
    );

    let bg_color = painter.ctx().style().visuals.window_fill;
    painter.rect_filled(bg_rect, 3.0, bg_color.gamma_multiply(0.9));
    painter.rect_stroke(bg_rect, 3.0, egui::Stroke::new(0.5, color), egui::StrokeKind::Outside);
    painter.text(tooltip_pos, egui::Align2::LEFT_TOP, text, font, text_color);
}
