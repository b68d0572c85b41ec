use eframe::egui;
use egui_extras::DatePickerButton;
use crate::data::datetime::format_short_date;
use crate::data::format::format_number;
use crate::state::projection::{render_result, Baseline, CalculatorInput, CalculatorMode, ProjectionError};

/// Projection calculator page. Edits `input` in place; the result is
/// recomputed every frame from the baseline.
pub fn show_calculator(
    ui: &mut egui::Ui,
    input: &mut CalculatorInput,
    baseline: &Result<Baseline, ProjectionError>,
    window_days: usize,
) {
    ui.heading("Projection");
    ui.add_space(4.0);

    let base = match baseline {
        Ok(base) => base,
        Err(e) => {
            ui.label(egui::RichText::new(e.to_string()).weak());
            return;
        }
    };

    egui::Grid::new("calc_baseline").num_columns(2).spacing([16.0, 4.0]).show(ui, |ui| {
        ui.label("Latest record");
        ui.label(format_short_date(base.date));
        ui.end_row();
        ui.label("Current total");
        ui.label(format_number(base.total, 0));
        ui.end_row();
        ui.label(format!("Rate ({window_days} days)"));
        ui.label(format!("{} / day", format_number(base.rate, 1)));
        ui.end_row();
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        for mode in [CalculatorMode::TargetPoints, CalculatorMode::TargetDate] {
            ui.selectable_value(&mut input.mode, mode, mode.label());
        }
    });

    ui.horizontal(|ui| match input.mode {
        CalculatorMode::TargetPoints => {
            ui.label("Points");
            ui.add(egui::TextEdit::singleline(&mut input.points).hint_text("e.g. 1,000,000").desired_width(160.0));
        }
        CalculatorMode::TargetDate => {
            ui.label("Date");
            ui.add(DatePickerButton::new(&mut input.date).id_salt("calc_date"));
        }
    });

    ui.add_space(8.0);
    let (headline, detail) = render_result(&input.evaluate(base));
    ui.label(egui::RichText::new(headline).size(24.0).strong());
    ui.label(egui::RichText::new(detail).weak());
}
