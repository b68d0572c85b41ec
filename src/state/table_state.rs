use std::cmp::Ordering;
use crate::data::format::{numeric, Cell};
use crate::data::loader::{DescriptorError, Record, TableDescriptor};

/// Direction for table column sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => " ^",
            SortDirection::Descending => " v",
        }
    }
}

/// Active column and direction of a sortable table. Exactly one column is
/// active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

impl SortState {
    /// Starting state; `column` is clamped into the table.
    pub fn initial(column: usize, descending: bool, column_count: usize) -> Self {
        Self {
            column: column.min(column_count.saturating_sub(1)),
            direction: if descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }
    }

    pub fn is_ascending(&self) -> bool {
        self.direction == SortDirection::Ascending
    }

    /// Header click on `col`: the active column flips direction, any other
    /// column becomes active ascending. Clicks outside the table are ignored.
    pub fn clicked(self, col: usize, column_count: usize) -> Self {
        if col >= column_count {
            self
        } else if col == self.column {
            Self { direction: self.direction.toggle(), ..self }
        } else {
            Self { column: col, direction: SortDirection::Ascending }
        }
    }
}

/// Compare two raw field values: numerically when both parse as numbers,
/// otherwise as strings with absent values treated as empty.
pub fn compare_values(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a.and_then(numeric), b.and_then(numeric)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.unwrap_or_default().cmp(b.unwrap_or_default()),
    }
}

/// Stable ordering of `records` by the value at `key`, as indices into the
/// slice. Ties keep their load order in both directions.
pub fn sorted_order(records: &[Record], key: &str, direction: SortDirection) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..records.len()).collect();
    indices.sort_by(|&a, &b| {
        let cmp = compare_values(records[a].get(key), records[b].get(key));
        match direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        }
    });
    indices
}

/// Produces the displayed content of a cell from its column key and raw value.
pub trait CellFormatter {
    fn cell(&self, key: &str, value: Option<&str>) -> Cell;
}

impl<F> CellFormatter for F
where
    F: Fn(&str, Option<&str>) -> Cell,
{
    fn cell(&self, key: &str, value: Option<&str>) -> Cell {
        self(key, value)
    }
}

impl CellFormatter for TableDescriptor {
    fn cell(&self, key: &str, value: Option<&str>) -> Cell {
        self.format_of(key).apply(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell<'a> {
    pub label: &'a str,
    pub active: bool,
    pub indicator: &'static str,
}

/// A table view over one record sequence. The loaded order is kept as the
/// canonical sequence; every sort is computed from it afresh.
#[derive(Debug, Clone)]
pub struct SortableTable {
    id: String,
    keys: Vec<String>,
    labels: Vec<String>,
    records: Vec<Record>,
    sort: SortState,
    order: Vec<usize>,
}

impl SortableTable {
    pub fn new(
        id: &str,
        keys: Vec<String>,
        records: Vec<Record>,
        labels: Vec<String>,
        initial_column: usize,
        initial_descending: bool,
    ) -> Result<Self, DescriptorError> {
        if keys.len() != labels.len() {
            return Err(DescriptorError::LabelCount {
                path: id.to_string(),
                keys: keys.len(),
                labels: labels.len(),
            });
        }

        let sort = SortState::initial(initial_column, initial_descending, keys.len());
        let mut table = Self {
            id: id.to_string(),
            keys,
            labels,
            records,
            sort,
            order: Vec::new(),
        };
        table.resort();
        Ok(table)
    }

    /// Table with the descriptor's columns and initial sort.
    pub fn from_descriptor(
        id: &str,
        descriptor: &TableDescriptor,
        records: Vec<Record>,
    ) -> Result<Self, DescriptorError> {
        Self::new(
            id,
            descriptor.keys(),
            records,
            descriptor.labels(),
            descriptor.initial_sort.column,
            descriptor.initial_sort.descending,
        )
    }

    fn resort(&mut self) {
        self.order = match self.keys.get(self.sort.column) {
            Some(key) => sorted_order(&self.records, key, self.sort.direction),
            None => (0..self.records.len()).collect(),
        };
    }

    /// Apply a header click. Returns whether the sort state changed.
    pub fn header_clicked(&mut self, col: usize) -> bool {
        let next = self.sort.clicked(col, self.keys.len());
        if next == self.sort {
            return false;
        }
        tracing::debug!("{}: sort by column {} {:?}", self.id, next.column, next.direction);
        self.sort = next;
        self.resort();
        true
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn header(&self) -> Vec<HeaderCell<'_>> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let active = i == self.sort.column;
                HeaderCell {
                    label,
                    active,
                    indicator: if active { self.sort.direction.indicator() } else { "" },
                }
            })
            .collect()
    }

    /// Records in display order.
    pub fn rows(&self) -> impl Iterator<Item = &Record> {
        self.order.iter().map(|&i| &self.records[i])
    }

    /// Record shown at display position `row`.
    pub fn row(&self, row: usize) -> Option<&Record> {
        self.order.get(row).map(|&i| &self.records[i])
    }

    /// Formatted cells of display row `row`, one per column key.
    pub fn cells(&self, row: usize, formatter: &dyn CellFormatter) -> Vec<Cell> {
        match self.row(row) {
            Some(record) => self
                .keys
                .iter()
                .map(|k| formatter.cell(k, record.get(k)))
                .collect(),
            None => Vec::new(),
        }
    }
}
