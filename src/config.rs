use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::data::format::FormatterId;
use crate::data::loader::{DescriptorError, TableSet};
use crate::state::chart_registry::{ChartRegistry, SeriesConfig};
use crate::state::projection::DEFAULT_PROJECTION_DAYS;
use crate::state::range::RangePreset;
use crate::state::theme::Theme;

pub const CONFIG_ENV: &str = "STATBOARD_CONFIG";
pub const SOURCE_ENV: &str = "STATBOARD_SOURCE";
pub const DEFAULT_CONFIG_FILE: &str = "statboard.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Table(#[from] DescriptorError),
}

/// Resource paths of the three tables, relative to the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablePaths {
    pub daily: String,
    pub projects: String,
    pub hosts: String,
}

impl Default for TablePaths {
    fn default() -> Self {
        Self {
            daily: "daily".to_string(),
            projects: "projects".to_string(),
            hosts: "hosts".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Snapshot directory or `http(s)://` base URL.
    pub source: String,
    pub tables: TablePaths,
    /// Column key to formatter, applied to every table with that column.
    pub formats: BTreeMap<String, FormatterId>,
    /// Merged over the built-in chart registry.
    pub charts: BTreeMap<String, SeriesConfig>,
    pub overview_days: usize,
    pub default_range: RangePreset,
    /// Drop short rows instead of padding them.
    pub strict_rows: bool,
    pub projection_days: usize,
    pub theme: Theme,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: "data".to_string(),
            tables: TablePaths::default(),
            formats: BTreeMap::new(),
            charts: BTreeMap::new(),
            overview_days: 60,
            default_range: RangePreset::default(),
            strict_rows: false,
            projection_days: DEFAULT_PROJECTION_DAYS,
            theme: Theme::default(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the config for this process: explicit path (first CLI
    /// argument, then `STATBOARD_CONFIG`), else `statboard.json` if it
    /// exists, else defaults. A broken file is logged and ignored.
    pub fn from_environment() -> Self {
        let arg = std::env::args().nth(1);
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let path = config_path(arg, var(CONFIG_ENV), Path::new(DEFAULT_CONFIG_FILE).exists());

        let config = match path {
            Some(path) => match Self::load(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("{e}; using defaults");
                    Self::default()
                }
            },
            None => Self::default(),
        };
        config.with_source_override(var(SOURCE_ENV))
    }

    pub fn with_source_override(mut self, source: Option<String>) -> Self {
        if let Some(source) = source {
            tracing::info!("Source overridden by {SOURCE_ENV}: {source}");
            self.source = source;
        }
        self
    }

    /// Built-in table descriptors pointed at the configured paths.
    pub fn table_set(&self) -> Result<TableSet, ConfigError> {
        let mut tables = TableSet::builtin()?;
        tables.daily.path = self.tables.daily.clone();
        tables.projects.path = self.tables.projects.clone();
        tables.hosts.path = self.tables.hosts.clone();
        for (key, format) in &self.formats {
            tracing::debug!("Column {key} formatted as {}", format.name());
            for table in [&mut tables.daily, &mut tables.projects, &mut tables.hosts] {
                for col in table.columns.iter_mut().filter(|c| c.key == *key) {
                    col.format = *format;
                }
            }
        }
        Ok(tables)
    }

    pub fn registry(&self) -> ChartRegistry {
        ChartRegistry::builtin().with_overrides(self.charts.clone())
    }
}

fn config_path(arg: Option<String>, env: Option<String>, default_exists: bool) -> Option<PathBuf> {
    arg.or(env)
        .map(PathBuf::from)
        .or_else(|| default_exists.then(|| PathBuf::from(DEFAULT_CONFIG_FILE)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::chart_registry::Shape;

    #[test]
    fn empty_file_gives_defaults() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.overview_days, 60);
        assert_eq!(config.projection_days, 30);
        assert_eq!(config.default_range, RangePreset::Quarter);
    }

    #[test]
    fn fields_and_chart_overrides_parse() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("statboard.json");
        std::fs::write(
            &path,
            r##"{
                "source": "https://stats.example.org/user/42/",
                "tables": {"hosts": "machines"},
                "default_range": "1Y",
                "strict_rows": true,
                "theme": "light",
                "formats": {"share": "number1", "total": "compact"},
                "charts": {
                    "team": {"id": "teamRankChart", "column": "team_rank", "label": "Team Rank",
                             "color": "#f97316", "reversed": true, "stepped": true},
                    "daily": {"id": "dailyPointsChart", "column": "daily", "label": "Daily",
                              "color": "#000", "shape": "line"}
                }
            }"##,
        )
        .unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.default_range, RangePreset::Year);
        assert!(config.strict_rows);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.tables.hosts, "machines");
        assert_eq!(config.tables.daily, "daily");

        let tables = config.table_set().unwrap();
        assert_eq!(tables.hosts.path, "machines");
        assert_eq!(tables.projects.format_of("share"), FormatterId::Number1);
        assert_eq!(tables.daily.format_of("total"), FormatterId::Compact);
        assert_eq!(tables.daily.format_of("rank"), FormatterId::Number);

        let registry = config.registry();
        assert_eq!(registry.iter().count(), 7);
        assert_eq!(registry.get("daily").unwrap().shape, Shape::Line);
        assert!(registry.get("team").unwrap().reversed);
    }

    #[test]
    fn broken_files_are_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(DashboardConfig::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            DashboardConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn path_precedence() {
        let p = |a: Option<&str>, e: Option<&str>, d| config_path(a.map(Into::into), e.map(Into::into), d);
        assert_eq!(p(Some("a.json"), Some("b.json"), true), Some(PathBuf::from("a.json")));
        assert_eq!(p(None, Some("b.json"), true), Some(PathBuf::from("b.json")));
        assert_eq!(p(None, None, true), Some(PathBuf::from(DEFAULT_CONFIG_FILE)));
        assert_eq!(p(None, None, false), None);
    }

    #[test]
    fn source_override_wins() {
        let config = DashboardConfig::default().with_source_override(Some("/srv/stats".into()));
        assert_eq!(config.source, "/srv/stats");
        let config = DashboardConfig::default().with_source_override(None);
        assert_eq!(config.source, "data");
    }
}
