use eframe::egui;
use egui_extras::{Column, TableBuilder};
use crate::data::format::Cell;
use crate::state::table_state::{CellFormatter, SortableTable};
use crate::state::theme::Theme;

const ROW_HEIGHT: f32 = 18.0;

fn cell_label(ui: &mut egui::Ui, cell: &Cell, theme: &Theme) {
    match cell.trend() {
        Some(trend) => {
            ui.label(egui::RichText::new(cell.text()).color(theme.palette().trend(trend)));
        }
        None => {
            ui.label(cell.text());
        }
    }
}

/// Draw a sortable table. Returns the header column the user clicked, if
/// any; the caller applies it so the sort transition stays in app state.
pub fn show_table(
    ui: &mut egui::Ui,
    table: &SortableTable,
    formatter: &dyn CellFormatter,
    theme: &Theme,
) -> Option<usize> {
    if table.is_empty() {
        ui.label(egui::RichText::new("No rows").weak());
        return None;
    }

    let header = table.header();
    let sorted_hint = if table.sort().is_ascending() {
        "Sorted ascending"
    } else {
        "Sorted descending"
    };
    let clicked_col: std::cell::Cell<Option<usize>> = std::cell::Cell::new(None);

    ui.push_id(table.id(), |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(70.0), header.len())
            .max_scroll_height(320.0)
            .header(20.0, |mut row| {
                for (i, cell) in header.iter().enumerate() {
                    row.col(|ui| {
                        let text = format!("{}{}", cell.label, cell.indicator);
                        let text = if cell.active {
                            egui::RichText::new(text).strong()
                        } else {
                            egui::RichText::new(text)
                        };
                        let mut response = ui.button(text);
                        if cell.active {
                            response = response.on_hover_text(sorted_hint);
                        }
                        if response.clicked() {
                            clicked_col.set(Some(i));
                        }
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.len(), |mut row| {
                    let cells = table.cells(row.index(), formatter);
                    for cell in &cells {
                        row.col(|ui| cell_label(ui, cell, theme));
                    }
                });
            });
    });

    clicked_col.get()
}
