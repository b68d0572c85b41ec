use std::sync::Arc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::data::format::{numeric, FormatterId};
use crate::data::parser;
use crate::data::source::DataSource;

/// Raw values that mark a row as "not reporting yet".
pub const ZERO_SENTINELS: [&str; 2] = ["0", "0.0"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("table {path}: {keys} column keys but {labels} labels")]
    LabelCount { path: String, keys: usize, labels: usize },
    #[error("table {path}: duplicate column key {key:?}")]
    DuplicateKey { path: String, key: String },
}

/// One parsed row, keyed by the table's column keys.
/// Values stay raw strings; a short row leaves trailing keys absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    keys: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl Record {
    /// Zip positional fields onto `keys`. Missing fields become `None`,
    /// surplus fields are dropped.
    pub fn from_fields(keys: Arc<[String]>, fields: Vec<String>) -> Self {
        let mut fields = fields.into_iter();
        let values = (0..keys.len()).map(|_| fields.next()).collect();
        Self { keys, values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.keys
            .iter()
            .position(|k| k == key)
            .and_then(|i| self.values[i].as_deref())
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Copy of this record with `extra` values appended under the trailing
    /// keys of `keys` (which must start with this record's keys).
    pub fn extended(&self, keys: Arc<[String]>, extra: Vec<Option<String>>) -> Self {
        debug_assert!(keys.starts_with(&self.keys));
        let mut values = self.values.clone();
        values.extend(extra);
        values.resize(keys.len(), None);
        Self { keys, values }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub format: FormatterId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InitialSort {
    #[serde(default)]
    pub column: usize,
    #[serde(default)]
    pub descending: bool,
}

/// Static description of one snapshot table: where it lives and how its
/// positional fields are named, labelled and formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub path: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub zero_filter: Option<String>,
    #[serde(default)]
    pub initial_sort: InitialSort,
}

impl TableDescriptor {
    pub fn new(path: &str, keys: &[&str], labels: &[&str]) -> Result<Self, DescriptorError> {
        if keys.len() != labels.len() {
            return Err(DescriptorError::LabelCount {
                path: path.to_string(),
                keys: keys.len(),
                labels: labels.len(),
            });
        }
        let table = Self {
            path: path.to_string(),
            columns: keys
                .iter()
                .zip(labels)
                .map(|(k, l)| Column {
                    key: k.to_string(),
                    label: l.to_string(),
                    format: FormatterId::default(),
                })
                .collect(),
            zero_filter: None,
            initial_sort: InitialSort::default(),
        };
        table.validate()?;
        Ok(table)
    }

    pub fn with_zero_filter(mut self, key: &str) -> Self {
        self.zero_filter = Some(key.to_string());
        self
    }

    pub fn with_initial_sort(mut self, column: usize, descending: bool) -> Self {
        self.initial_sort = InitialSort { column, descending };
        self
    }

    /// Assign `format` to every column whose key satisfies `pred`.
    pub fn with_format(mut self, pred: impl Fn(&str) -> bool, format: FormatterId) -> Self {
        for col in self.columns.iter_mut().filter(|c| pred(c.key.as_str())) {
            col.format = format;
        }
        self
    }

    pub fn validate(&self) -> Result<(), DescriptorError> {
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.key == col.key) {
                return Err(DescriptorError::DuplicateKey {
                    path: self.path.clone(),
                    key: col.key.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn keys(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.key.clone()).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }

    pub fn format_of(&self, key: &str) -> FormatterId {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.format)
            .unwrap_or_default()
    }
}

/// How to treat rows with fewer fields than declared columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RowMode {
    /// Keep the row; trailing keys stay absent.
    #[default]
    Lenient,
    /// Drop the row.
    Strict,
}

/// Turn snapshot text into records for `table`.
pub fn parse_records(text: &str, table: &TableDescriptor, mode: RowMode) -> Vec<Record> {
    let keys: Arc<[String]> = table.keys().into();
    let zero_idx = table
        .zero_filter
        .as_deref()
        .and_then(|key| keys.iter().position(|k| k == key));

    let mut records = Vec::new();
    let mut zero_rows = 0usize;
    let mut short_rows = 0usize;

    for line in parser::data_lines(text) {
        let fields = parser::parse_line(line);

        if let Some(idx) = zero_idx {
            if fields
                .get(idx)
                .is_some_and(|v| ZERO_SENTINELS.contains(&v.as_str()))
            {
                zero_rows += 1;
                continue;
            }
        }

        if fields.len() < keys.len() && mode == RowMode::Strict {
            short_rows += 1;
            continue;
        }

        records.push(Record::from_fields(Arc::clone(&keys), fields));
    }

    tracing::debug!(
        "{}: {} rows, {} zero rows skipped, {} short rows rejected",
        table.path,
        records.len(),
        zero_rows,
        short_rows
    );
    records
}

/// Fetch and parse one table. Transport failures are logged and produce an
/// empty table; they never reach the caller.
pub fn load_table(source: &dyn DataSource, table: &TableDescriptor, mode: RowMode) -> Vec<Record> {
    match source.fetch(&table.path) {
        Ok(text) => parse_records(&text, table, mode),
        Err(e) => {
            tracing::warn!("Failed to load table {}: {e}", table.path);
            Vec::new()
        }
    }
}

/// The three snapshot tables the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSet {
    pub daily: TableDescriptor,
    pub projects: TableDescriptor,
    pub hosts: TableDescriptor,
}

impl TableSet {
    pub fn builtin() -> Result<Self, DescriptorError> {
        let daily = TableDescriptor::new(
            "daily",
            &["date", "total", "daily", "rank", "rank_cng", "team_rank", "team_cng", "country_rank", "country_cng"],
            &["Date", "Total", "Daily", "Rank", "\u{394} Rank", "Team Rank", "\u{394} Team", "Country Rank", "\u{394} Country"],
        )?
        .with_zero_filter("total")
        .with_initial_sort(0, true)
        .with_format(|k| k == "date", FormatterId::Date)
        .with_format(|k| k.ends_with("_cng"), FormatterId::Diff);

        let projects = TableDescriptor::new(
            "projects",
            &[
                "project", "total", "share", "today", "daily", "weekly", "monthly", "rank",
                "rank_cng_day", "rank_cng_week", "rank_cng_month", "team_rank", "country_rank",
            ],
            &[
                "Project", "Total", "Share", "Today", "Daily", "Weekly", "Monthly", "Rank",
                "\u{394} Day", "\u{394} Week", "\u{394} Month", "Team Rank", "Country Rank",
            ],
        )?
        .with_format(|k| k == "project", FormatterId::Quoted)
        .with_format(|k| k.starts_with("rank_cng_"), FormatterId::Diff);

        let hosts = TableDescriptor::new(
            "hosts",
            &["rank", "cpu", "cores", "os", "total", "daily", "weekly", "monthly", "avg"],
            &["Rank", "CPU", "Cores", "OS", "Total", "Daily", "Weekly", "Monthly", "\u{d8}"],
        )?
        .with_format(|k| k == "cpu" || k == "os", FormatterId::Text);

        Ok(Self { daily, projects, hosts })
    }
}

/// Records produced by one load. A reload replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub daily: Vec<Record>,
    pub projects: Vec<Record>,
    pub hosts: Vec<Record>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty() && self.projects.is_empty() && self.hosts.is_empty()
    }
}

/// Load all tables in parallel and return once every load has settled.
/// A failing table comes back empty without affecting the others.
pub fn load_dataset(source: &dyn DataSource, tables: &TableSet, mode: RowMode) -> Dataset {
    let started = std::time::Instant::now();

    let dataset = std::thread::scope(|s| {
        let daily = s.spawn(|| load_table(source, &tables.daily, mode));
        let projects = s.spawn(|| load_table(source, &tables.projects, mode));
        let hosts = s.spawn(|| load_table(source, &tables.hosts, mode));

        Dataset {
            daily: derive_daily_metrics(settle("daily", daily)),
            projects: settle("projects", projects),
            hosts: settle("hosts", hosts),
        }
    });

    tracing::info!(
        "Loaded {} daily, {} project, {} host rows from {} in {:?}",
        dataset.daily.len(),
        dataset.projects.len(),
        dataset.hosts.len(),
        source.describe(),
        started.elapsed()
    );
    dataset
}

fn settle(name: &str, handle: std::thread::ScopedJoinHandle<'_, Vec<Record>>) -> Vec<Record> {
    handle.join().unwrap_or_else(|_| {
        tracing::error!("Loader thread for {name} panicked");
        Vec::new()
    })
}

/// Keys appended to every daily record by [`derive_daily_metrics`].
pub const DERIVED_DAILY_KEYS: [&str; 2] = ["average", "active"];

/// Extend daily records (oldest first) with running metrics:
/// `average` is the cumulative total divided by the day number and
/// `active` counts the days so far with positive daily points.
pub fn derive_daily_metrics(records: Vec<Record>) -> Vec<Record> {
    let Some(first) = records.first() else {
        return records;
    };
    if DERIVED_DAILY_KEYS.iter().any(|k| first.keys().iter().any(|existing| existing == k)) {
        return records;
    }

    let keys: Arc<[String]> = first
        .keys()
        .iter()
        .cloned()
        .chain(DERIVED_DAILY_KEYS.iter().map(|k| k.to_string()))
        .collect();

    let mut active_days = 0u64;
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            if r.get("daily").and_then(numeric).is_some_and(|d| d > 0.0) {
                active_days += 1;
            }
            let average = r
                .get("total")
                .and_then(numeric)
                .map(|t| format!("{:.1}", t / (i + 1) as f64));
            r.extended(Arc::clone(&keys), vec![average, Some(active_days.to_string())])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::data::source::FetchError;

    struct StaticSource(HashMap<&'static str, &'static str>);

    impl DataSource for StaticSource {
        fn fetch(&self, path: &str) -> Result<String, FetchError> {
            self.0
                .get(path)
                .map(|s| s.to_string())
                .ok_or_else(|| FetchError::Status { url: path.to_string(), status: 404 })
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    fn table(keys: &[&str]) -> TableDescriptor {
        TableDescriptor::new("t", keys, keys).unwrap()
    }

    #[test]
    fn label_count_must_match_keys() {
        let err = TableDescriptor::new("t", &["a", "b"], &["A"]).unwrap_err();
        assert_eq!(err, DescriptorError::LabelCount { path: "t".into(), keys: 2, labels: 1 });
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        assert!(matches!(
            TableDescriptor::new("t", &["a", "a"], &["A", "B"]),
            Err(DescriptorError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn zero_sentinels_are_dropped_exactly() {
        let t = table(&["date", "total"]).with_zero_filter("total");
        let text = "d1 0\nd2 0.0\nd3 0.5\nd4 -0\nd5 00\nd6 12\n";
        let dates: Vec<_> = parse_records(text, &t, RowMode::Lenient)
            .iter()
            .map(|r| r.get("date").unwrap().to_string())
            .collect();
        assert_eq!(dates, vec!["d3", "d4", "d5", "d6"]);
    }

    #[test]
    fn unknown_zero_filter_key_filters_nothing() {
        let t = table(&["date", "total"]).with_zero_filter("points");
        assert_eq!(parse_records("d1 0\nd2 0.0\n", &t, RowMode::Lenient).len(), 2);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let t = table(&["a", "b", "c"]);
        let records = parse_records("1\n1 2 3 4\n", &t, RowMode::Lenient);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("a"), Some("1"));
        assert_eq!(records[0].get("b"), None);
        assert_eq!(records[1].get("c"), Some("3"));
        assert_eq!(records[1].keys().len(), 3);
    }

    #[test]
    fn strict_mode_rejects_short_rows() {
        let t = table(&["a", "b"]);
        let records = parse_records("1\n1 2\n", &t, RowMode::Strict);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("b"), Some("2"));
    }

    #[test]
    fn blank_lines_are_ignored_and_quotes_group_fields() {
        let t = table(&["project", "total"]);
        let records = parse_records("\n\"Einstein@Home\" 10\n   \n\"World Community Grid\" 20\n", &t, RowMode::Lenient);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("project"), Some("World Community Grid"));
    }

    #[test]
    fn failed_fetch_yields_empty_table() {
        let source = StaticSource(HashMap::new());
        assert!(load_table(&source, &table(&["a"]), RowMode::Lenient).is_empty());
    }

    #[test]
    fn dataset_survives_a_missing_table() {
        let tables = TableSet::builtin().unwrap();
        let source = StaticSource(HashMap::from([
            ("daily", "2024-01-01 100 100 5000\n2024-01-02 0 0 5000\n2024-01-03 250 150 4900\n"),
            ("hosts", "1 \"Intel Core i7\" 8 Linux 1000 10 70 300 9.5\n"),
        ]));

        let dataset = load_dataset(&source, &tables, RowMode::Lenient);
        assert_eq!(dataset.daily.len(), 2);
        assert!(dataset.projects.is_empty());
        assert_eq!(dataset.hosts.len(), 1);
        assert_eq!(dataset.hosts[0].get("cpu"), Some("Intel Core i7"));
        assert!(!dataset.is_empty());
    }

    #[test]
    fn derived_metrics_follow_the_history() {
        let t = table(&["date", "total", "daily"]);
        let records = parse_records("d1 100 100\nd2 150 0\nd3 300 150\nd4 x\n", &t, RowMode::Lenient);
        let derived = derive_daily_metrics(records);

        let averages: Vec<_> = derived.iter().map(|r| r.get("average")).collect();
        assert_eq!(averages, vec![Some("100.0"), Some("75.0"), Some("100.0"), None]);

        let active: Vec<_> = derived.iter().map(|r| r.get("active")).collect();
        assert_eq!(active, vec![Some("1"), Some("1"), Some("2"), Some("2")]);
        assert_eq!(derived[0].get("date"), Some("d1"));
    }

    #[test]
    fn derived_metrics_are_not_added_twice() {
        let t = table(&["date", "total", "daily"]);
        let once = derive_daily_metrics(parse_records("d1 10 10\n", &t, RowMode::Lenient));
        let twice = derive_daily_metrics(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn builtin_tables_keep_labels_aligned() {
        let tables = TableSet::builtin().unwrap();
        for t in [&tables.daily, &tables.projects, &tables.hosts] {
            assert_eq!(t.keys().len(), t.labels().len());
        }
        assert_eq!(tables.daily.format_of("rank_cng"), FormatterId::Diff);
        assert_eq!(tables.daily.format_of("date"), FormatterId::Date);
        assert_eq!(tables.projects.format_of("rank_cng_week"), FormatterId::Diff);
        assert_eq!(tables.hosts.format_of("os"), FormatterId::Text);
        assert_eq!(tables.hosts.format_of("cores"), FormatterId::Number);
    }
}
