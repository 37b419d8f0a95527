use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Series – one y column sampled over an x domain
// ---------------------------------------------------------------------------

/// An ordered sequence of `(x, y)` samples keyed by `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Whether `x` is strictly ascending, enabling binary-search lookups.
    ascending: bool,
}

impl Series {
    /// Build a series from parallel `x` / `y` vectors.
    ///
    /// # Panics
    ///
    /// Panics if `x` and `y` differ in length.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        assert_eq!(
            x.len(),
            y.len(),
            "series x has {} samples but y has {}",
            x.len(),
            y.len()
        );
        let ascending = x.windows(2).all(|w| w[0] < w[1]);
        Series { x, y, ascending }
    }

    /// Like [`Series::new`], but `None` when `x` and `y` differ in length.
    pub fn try_new(x: Vec<f64>, y: Vec<f64>) -> Option<Self> {
        (x.len() == y.len()).then(|| Series::new(x, y))
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate `(x, y)` samples in domain order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Value of the series at exactly `x`, or `None` when `x` is outside the domain.
    pub fn value_at(&self, x: f64) -> Option<f64> {
        let idx = if self.ascending {
            self.x
                .binary_search_by(|sample| sample.partial_cmp(&x).unwrap_or(Ordering::Less))
                .ok()?
        } else {
            self.x.iter().position(|&sample| sample == x)?
        };
        Some(self.y[idx])
    }

    /// Two series are co-sampled when their x domains are identical ordered sets.
    pub fn same_domain(&self, other: &Series) -> bool {
        self.x == other.x
    }
}

// ---------------------------------------------------------------------------
// SeriesSet – named series in caller-visible order
// ---------------------------------------------------------------------------

/// Named series kept in insertion order with an id index.
///
/// Both the training set and the ideal-function catalog use this shape; the
/// insertion order is the iteration order every matching step relies on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    entries: Vec<(String, Series)>,
    index: BTreeMap<String, usize>,
}

/// Reference series whose best-fit candidate is being sought.
pub type TrainingSet = SeriesSet;

/// Candidate ("ideal") functions evaluated against each training series.
pub type Catalog = SeriesSet;

impl SeriesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series. Re-inserting an existing id replaces the series in place.
    pub fn insert(&mut self, id: impl Into<String>, series: Series) {
        let id = id.into();
        match self.index.get(&id) {
            Some(&pos) => self.entries[pos].1 = series,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, series));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Series> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate `(id, series)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> + '_ {
        self.entries.iter().map(|(id, s)| (id.as_str(), s))
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub(crate) fn entries(&self) -> &[(String, Series)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Series)> for SeriesSet {
    fn from_iter<I: IntoIterator<Item = (S, Series)>>(iter: I) -> Self {
        let mut set = SeriesSet::new();
        for (id, series) in iter {
            set.insert(id, series);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Points and mapping outcomes
// ---------------------------------------------------------------------------

/// A test observation, independent of any series domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedPoint {
    pub x: f64,
    pub y: f64,
}

impl ObservedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        ObservedPoint { x, y }
    }
}

/// A test point assigned to one of the selected ideal functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub x: f64,
    pub y: f64,
    /// `|y - ideal(x)|` for the matched function.
    pub delta_y: f64,
    /// Id of the matched ideal function.
    pub ideal_func: String,
}

/// A test point that satisfied no selected function's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnmappedPoint {
    pub x: f64,
    pub y: f64,
}

impl From<ObservedPoint> for UnmappedPoint {
    fn from(p: ObservedPoint) -> Self {
        UnmappedPoint { x: p.x, y: p.y }
    }
}

// ---------------------------------------------------------------------------
// Frame – a wide numeric input table
// ---------------------------------------------------------------------------

/// A wide table as read from disk: the `x` column plus named y columns.
/// A frame value column whose length differs from its `x` column.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("column '{column}' has {values} values but x has {rows}")]
pub struct RaggedColumn {
    pub column: String,
    pub rows: usize,
    pub values: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub x: Vec<f64>,
    /// Value columns in file order, each the same length as `x`.
    pub columns: Vec<(String, Vec<f64>)>,
}

impl Frame {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Whether every x value occurs once (required for series tables).
    pub fn has_unique_x(&self) -> bool {
        let mut sorted = self.x.clone();
        sorted.sort_by(f64::total_cmp);
        sorted.windows(2).all(|w| w[0] != w[1])
    }

    /// One series per value column, all sharing the frame's x domain.
    pub fn to_series_set(&self) -> Result<SeriesSet, RaggedColumn> {
        self.columns
            .iter()
            .map(|(name, y)| {
                Series::try_new(self.x.clone(), y.clone())
                    .map(|series| (name.clone(), series))
                    .ok_or_else(|| self.ragged(name, y))
            })
            .collect()
    }

    fn ragged(&self, name: &str, y: &[f64]) -> RaggedColumn {
        RaggedColumn {
            column: name.to_string(),
            rows: self.x.len(),
            values: y.len(),
        }
    }

    /// Pair `x` with the named column as observed points, in row order.
    ///
    /// `Ok(None)` when the column does not exist.
    pub fn to_points(&self, column: &str) -> Result<Option<Vec<ObservedPoint>>, RaggedColumn> {
        let Some(y) = self.column(column) else {
            return Ok(None);
        };
        if y.len() != self.x.len() {
            return Err(self.ragged(column, y));
        }
        Ok(Some(
            self.x
                .iter()
                .zip(y)
                .map(|(&x, &y)| ObservedPoint::new(x, y))
                .collect(),
        ))
    }

    /// Convert to a persistable table (`x` first, then the value columns).
    pub fn to_table(&self) -> Table {
        let mut table = Table::new().with_float("x", self.x.clone());
        for (name, values) in &self.columns {
            table = table.with_float(name.clone(), values.clone());
        }
        table
    }
}

// ---------------------------------------------------------------------------
// Table – column-oriented result table handed to a sink
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render a single cell as text.
    pub fn cell(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Float(v) => v.get(row).map(|f| f.to_string()),
            ColumnData::Text(v) => v.get(row).cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_float(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            data: ColumnData::Float(values),
        });
        self
    }

    pub fn with_text(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            data: ColumnData::Text(values),
        });
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    /// Row count, taken from the first column.
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    /// Whether every column has the same number of rows.
    pub fn is_rectangular(&self) -> bool {
        let rows = self.num_rows();
        self.columns.iter().all(|c| c.data.len() == rows)
    }
}
