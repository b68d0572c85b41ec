use std::sync::{Arc, Mutex};
use eframe::egui;
use crate::config::DashboardConfig;
use crate::data::loader::{self, Dataset, DescriptorError, RowMode, TableSet};
use crate::data::source::{source_for, DataSource, DirSource};
use crate::state::app_state::{AppState, Page, TableId, VERSION};
use crate::state::range::RangePreset;
use crate::state::theme::Theme;
use crate::ui::{calculator, chart_panel, highlights, table_view};

const OVERVIEW_CHART_HEIGHT: f32 = 200.0;
const METRIC_CHART_HEIGHT: f32 = 420.0;

/// Pending background load. The worker fills the slot once every table
/// has settled.
struct PendingLoad {
    result: Arc<Mutex<Option<Dataset>>>,
    source: String,
}

/// Something the user clicked this frame, applied after drawing.
enum UiAction {
    Page(Page),
    Range(RangePreset),
    Sort(TableId, usize),
    Reload,
    OpenFolder,
    ToggleTheme,
}

pub struct StatboardApp {
    pub state: AppState,
    source: Arc<dyn DataSource>,
    pending_load: Option<PendingLoad>,
    /// An error message shown in the footer until dismissed.
    pub error_message: Option<String>,
    pub show_about: bool,
}

impl StatboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: DashboardConfig,
        tables: TableSet,
    ) -> Result<Self, DescriptorError> {
        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(14.5));
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(22.0));
        style.text_styles.insert(egui::TextStyle::Small, egui::FontId::proportional(12.0));
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        ctx.set_style(style);
        ctx.set_visuals(config.theme.visuals());

        let source: Arc<dyn DataSource> = Arc::from(source_for(&config.source));
        let mut app = Self {
            state: AppState::new(config, tables)?,
            source,
            pending_load: None,
            error_message: None,
            show_about: false,
        };
        app.start_load();
        Ok(app)
    }

    fn row_mode(&self) -> RowMode {
        if self.state.config.strict_rows {
            RowMode::Strict
        } else {
            RowMode::Lenient
        }
    }

    /// Fetch every table on a worker thread so the UI stays responsive.
    fn start_load(&mut self) {
        let result: Arc<Mutex<Option<Dataset>>> = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);
        let source = Arc::clone(&self.source);
        let tables = self.state.tables.clone();
        let mode = self.row_mode();

        tracing::info!("Loading from {}", source.describe());
        std::thread::spawn(move || {
            let dataset = loader::load_dataset(source.as_ref(), &tables, mode);
            if let Ok(mut slot) = result_clone.lock() {
                *slot = Some(dataset);
            }
        });

        self.pending_load = Some(PendingLoad {
            result,
            source: self.source.describe(),
        });
    }

    fn poll_load(&mut self) {
        let Some(pending) = &self.pending_load else {
            return;
        };
        let finished = pending.result.lock().ok().and_then(|mut slot| slot.take());
        if let Some(dataset) = finished {
            if dataset.is_empty() {
                self.error_message = Some(format!("No data loaded from {}", pending.source));
            } else {
                self.error_message = None;
            }
            self.pending_load = None;
            if let Err(e) = self.state.apply_dataset(dataset) {
                tracing::error!("Cannot show loaded data: {e}");
                self.error_message = Some(e.to_string());
            }
        }
    }

    /// Switch to a local snapshot directory picked by the user.
    fn open_folder(&mut self) {
        if let Some(path) = rfd::FileDialog::new().pick_folder() {
            tracing::info!("Switching source to {}", path.display());
            self.state.config.source = path.display().to_string();
            self.source = Arc::new(DirSource::new(path));
            self.start_load();
        }
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Page(page) => self.state.select_page(page),
            UiAction::Range(range) => self.state.select_range(range),
            UiAction::Sort(table, col) => {
                self.state.sort_clicked(table, col);
            }
            UiAction::Reload => self.start_load(),
            UiAction::OpenFolder => self.open_folder(),
            UiAction::ToggleTheme => self.state.theme = self.state.theme.toggle(),
        }
    }

    fn show_header(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let loading = self.pending_load.is_some();
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let heading = ui.heading("Statboard");
                    heading.context_menu(|ui| {
                        if ui.button("About Statboard").clicked() {
                            self.show_about = true;
                            ui.close_menu();
                        }
                    });
                    ui.separator();

                    let page = &self.state.page;
                    if ui.selectable_label(*page == Page::Overview, "Overview").clicked() {
                        actions.push(UiAction::Page(Page::Overview));
                    }
                    let current = self.state.current_metric();
                    for (name, config) in self.state.registry.iter() {
                        if ui.selectable_label(current == Some(name), &config.label).clicked() {
                            actions.push(UiAction::Page(Page::Metric(name.to_string())));
                        }
                    }
                    if ui.selectable_label(*page == Page::Calculator, "Calculator").clicked() {
                        actions.push(UiAction::Page(Page::Calculator));
                    }

                    ui.separator();
                    if ui.add_enabled(!loading, egui::Button::new("Reload")).clicked() {
                        actions.push(UiAction::Reload);
                    }
                    if ui.add_enabled(!loading, egui::Button::new("Open folder\u{2026}")).clicked() {
                        actions.push(UiAction::OpenFolder);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let theme_label = match self.state.theme {
                            Theme::Dark => "Light Mode",
                            Theme::Light => "Dark Mode",
                        };
                        if ui.button(theme_label).clicked() {
                            actions.push(UiAction::ToggleTheme);
                        }
                        ui.separator();
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });
    }

    fn show_footer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(self.source.describe()).weak());
                    ui.separator();
                    let d = &self.state.dataset;
                    ui.label(
                        egui::RichText::new(format!(
                            "{} days, {} projects, {} hosts",
                            d.daily.len(),
                            d.projects.len(),
                            d.hosts.len()
                        ))
                        .weak(),
                    );

                    if let Some(msg) = &self.error_message {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(255, 80, 80), msg);
                        if ui.small_button("dismiss").clicked() {
                            self.error_message = None;
                        }
                    }
                });
            });
    }

    fn show_page(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        match self.state.page {
            Page::Overview => self.show_overview(ui, actions),
            Page::Metric(_) => self.show_metric(ui, actions),
            Page::Calculator => calculator::show_calculator(
                ui,
                &mut self.state.calculator,
                &self.state.baseline,
                self.state.config.projection_days,
            ),
        }
    }

    fn show_overview(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let state = &self.state;
        highlights::show_highlights(ui, &state.highlights, &state.theme);
        ui.add_space(8.0);

        // Charts grouped by section, in registry order.
        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for (_, config) in state.registry.iter() {
            let group = config.group.as_deref().unwrap_or("Other");
            match groups.iter_mut().find(|(g, _)| *g == group) {
                Some((_, ids)) => ids.push(config.id.as_str()),
                None => groups.push((group, vec![config.id.as_str()])),
            }
        }
        for (group, ids) in groups {
            ui.heading(group);
            let charts: Vec<_> = ids.iter().filter_map(|id| state.charts.get(id)).collect();
            for pair in charts.chunks(2) {
                ui.columns(2, |cols| {
                    for (col, chart) in cols.iter_mut().zip(pair) {
                        chart_panel::show_chart(col, chart, &state.theme, OVERVIEW_CHART_HEIGHT);
                    }
                });
            }
            ui.add_space(8.0);
        }

        for id in TableId::ALL {
            let (table, descriptor) = state.table(id);
            egui::CollapsingHeader::new(id.title())
                .default_open(true)
                .show(ui, |ui| {
                    if let Some(col) = table_view::show_table(ui, table, descriptor, &state.theme) {
                        actions.push(UiAction::Sort(id, col));
                    }
                });
        }
    }

    fn show_metric(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let state = &self.state;
        let Some((_, config)) = state.current_metric().and_then(|m| state.registry.resolve(m)) else {
            ui.label("No charts configured");
            return;
        };

        ui.horizontal(|ui| {
            for preset in RangePreset::ALL {
                if ui.selectable_label(state.range == preset, preset.label()).clicked() {
                    actions.push(UiAction::Range(preset));
                }
            }
        });
        ui.add_space(6.0);
        if let Some(chart) = state.charts.get(&config.id) {
            chart_panel::show_chart(ui, chart, &state.theme, METRIC_CHART_HEIGHT);
        }
    }
}

impl eframe::App for StatboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(self.state.theme.visuals());
        self.poll_load();

        let mut actions: Vec<UiAction> = Vec::new();
        self.show_header(ctx, &mut actions);
        self.show_footer(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| self.show_page(ui, &mut actions));
        });

        if self.pending_load.is_some() {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading statistics...");
                    });
                });
            ctx.request_repaint();
        }

        if self.show_about {
            egui::Window::new("About Statboard")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .default_width(320.0)
                .show(ctx, |ui| {
                    ui.heading("Statboard");
                    ui.label(format!("Version: {VERSION}"));
                    ui.add_space(4.0);
                    ui.label("Personal statistics dashboard for a distributed computing project.");
                    ui.add_space(10.0);
                    ui.label("Right-click the title for this menu.");
                });
        }

        for action in actions {
            self.apply(action);
        }
    }
}
