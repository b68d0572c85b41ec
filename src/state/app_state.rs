use crate::config::DashboardConfig;
use crate::data::loader::{Dataset, DescriptorError, TableDescriptor, TableSet};
use crate::render::chart::{ChartBoard, SeriesSource};
use crate::state::chart_registry::ChartRegistry;
use crate::state::highlights::Highlights;
use crate::state::projection::{Baseline, CalculatorInput, ProjectionError};
use crate::state::range::{RangePreset, RangeWindow};
use crate::state::table_state::SortableTable;
use crate::state::theme::Theme;

pub const VERSION: &str = "0.1.0";

/// Daily column holding the x-axis labels of every chart.
pub const DATE_KEY: &str = "date";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Overview,
    /// Single chart for one registry metric.
    Metric(String),
    Calculator,
}

impl Page {
    pub fn title(&self) -> String {
        match self {
            Page::Overview => "Overview".to_string(),
            Page::Metric(name) => name.clone(),
            Page::Calculator => "Calculator".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableId {
    Daily,
    Projects,
    Hosts,
}

impl TableId {
    pub const ALL: [TableId; 3] = [TableId::Daily, TableId::Projects, TableId::Hosts];

    pub fn title(&self) -> &'static str {
        match self {
            TableId::Daily => "Daily",
            TableId::Projects => "Projects",
            TableId::Hosts => "Hosts",
        }
    }
}

/// Everything the dashboard shows, plus the transitions the UI triggers.
/// Rendering code reads this; only the methods below change it.
pub struct AppState {
    pub config: DashboardConfig,
    pub registry: ChartRegistry,
    pub tables: TableSet,
    pub dataset: Dataset,
    pub daily: SortableTable,
    pub projects: SortableTable,
    pub hosts: SortableTable,
    pub charts: ChartBoard,
    pub highlights: Highlights,
    pub baseline: Result<Baseline, ProjectionError>,
    pub calculator: CalculatorInput,
    pub page: Page,
    pub range: RangePreset,
    pub theme: Theme,
}

impl AppState {
    pub fn new(config: DashboardConfig, tables: TableSet) -> Result<Self, DescriptorError> {
        let registry = config.registry();
        let empty = |id: &str, t: &TableDescriptor| SortableTable::from_descriptor(id, t, Vec::new());
        let mut state = Self {
            daily: empty("daily", &tables.daily)?,
            projects: empty("projects", &tables.projects)?,
            hosts: empty("hosts", &tables.hosts)?,
            registry,
            tables,
            dataset: Dataset::default(),
            charts: ChartBoard::new(),
            highlights: Highlights::default(),
            baseline: Err(ProjectionError::NoData),
            calculator: CalculatorInput::new(chrono::Local::now().date_naive()),
            page: Page::Overview,
            range: config.default_range,
            theme: config.theme,
            config,
        };
        state.rebuild_charts();
        Ok(state)
    }

    /// Swap in a freshly loaded dataset. Sorts and the range go back to
    /// their defaults and every chart is rebuilt. On error nothing changes.
    pub fn apply_dataset(&mut self, dataset: Dataset) -> Result<(), DescriptorError> {
        let daily = SortableTable::from_descriptor("daily", &self.tables.daily, dataset.daily.clone())?;
        let projects =
            SortableTable::from_descriptor("projects", &self.tables.projects, dataset.projects.clone())?;
        let hosts = SortableTable::from_descriptor("hosts", &self.tables.hosts, dataset.hosts.clone())?;
        self.daily = daily;
        self.projects = projects;
        self.hosts = hosts;
        self.highlights = Highlights::from_daily(&dataset.daily);
        self.baseline = Baseline::from_daily(&dataset.daily, self.config.projection_days);
        if let Err(e) = &self.baseline {
            tracing::debug!("No projection baseline: {e}");
        }
        self.dataset = dataset;
        self.range = self.config.default_range;
        self.rebuild_charts();
        Ok(())
    }

    pub fn select_page(&mut self, page: Page) {
        if page == self.page {
            return;
        }
        tracing::debug!("Page {:?}", page);
        self.page = page;
        self.range = self.config.default_range;
        self.rebuild_charts();
    }

    pub fn select_range(&mut self, range: RangePreset) {
        if range == self.range {
            return;
        }
        self.range = range;
        self.rebuild_charts();
    }

    pub fn table(&self, id: TableId) -> (&SortableTable, &TableDescriptor) {
        match id {
            TableId::Daily => (&self.daily, &self.tables.daily),
            TableId::Projects => (&self.projects, &self.tables.projects),
            TableId::Hosts => (&self.hosts, &self.tables.hosts),
        }
    }

    pub fn sort_clicked(&mut self, id: TableId, column: usize) -> bool {
        let table = match id {
            TableId::Daily => &mut self.daily,
            TableId::Projects => &mut self.projects,
            TableId::Hosts => &mut self.hosts,
        };
        table.header_clicked(column)
    }

    /// Registry metric shown on the current metric page.
    pub fn current_metric(&self) -> Option<&str> {
        match &self.page {
            Page::Metric(name) => self.registry.resolve(name).map(|(n, _)| n),
            _ => None,
        }
    }

    /// Chart slots present on the current page.
    pub fn page_targets(&self) -> Vec<String> {
        match &self.page {
            Page::Overview => self.registry.iter().map(|(_, c)| c.id.clone()).collect(),
            Page::Metric(name) => self
                .registry
                .resolve(name)
                .map(|(_, c)| vec![c.id.clone()])
                .unwrap_or_default(),
            Page::Calculator => Vec::new(),
        }
    }

    fn window(&self, len: usize) -> RangeWindow {
        match self.page {
            Page::Overview => RangeWindow::last(self.config.overview_days, len),
            _ => self.range.window(len),
        }
    }

    /// Redraw every chart on the current page from the daily records.
    pub fn rebuild_charts(&mut self) {
        let targets = self.page_targets();
        self.charts.set_targets(targets);
        let window = self.window(self.dataset.daily.len());
        for (index, (_, config)) in self.registry.iter().enumerate() {
            if !self.charts.has_target(&config.id) {
                continue;
            }
            let source = SeriesSource::from_records(&self.dataset.daily, DATE_KEY, &config.column);
            self.charts.render_series(config, &source, Some(window), index);
        }
        tracing::debug!("{} charts on {}", self.charts.live_count(), self.page.title());
    }
}
