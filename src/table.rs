//! Tables and series keyed by a strictly increasing timestamp index
//!
//! A [`Table`] is columnar: one `f64` index plus named columns of [`Value`]s.
//! A [`Series`] is the single numeric column specialization used by the
//! alignment and calculus helpers. Both implement [`Indexed`], which is all
//! the windowing code needs to know about them.
//!
//! # Example
//!
//! ```
//! use tracesignal::table::{Table, Value};
//!
//! # fn main() -> anyhow::Result<()> {
//! let table = Table::new(vec![15.0, 16.0, 17.0])?
//!     .with_column("state", [1, 0, 1])?
//!     .with_column("comm", ["init", "sh", "init"])?;
//!
//! assert_eq!(table.len(), 3);
//! assert_eq!(table.row(1).get("comm"), Some(&Value::from("sh")));
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SignalError};
use crate::window::{locate, Seek};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// A single scalar cell
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Value {
    /// Missing value
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value (integers widen to `f64`)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Equality used by filters: integers and floats compare by numeric
    /// value, so `Int(10)` matches `Float(10.0)`, and `NaN` matches nothing
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            _ => self == other,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Str(_) => 4,
        }
    }
}

/// Float with `-0.0` folded into `0.0`
pub(crate) fn canonical_float(f: f64) -> f64 {
    if f == 0.0 {
        0.0
    } else {
        f
    }
}

// Total equality so values can key groups and dedup sets. Floats compare by
// `total_cmp` after folding `-0.0` into `0.0`, which agrees with the bit
// patterns used by `Hash`.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => {
                canonical_float(*a).total_cmp(&canonical_float(*b))
            }
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => canonical_float(*f).to_bits().hash(state),
            Value::Str(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A named column of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    fn take(&self, rows: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            values: rows.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

/// Check that an index is finite and strictly increasing
pub(crate) fn validate_index(index: &[f64]) -> Result<()> {
    if let Some(bad) = index.iter().find(|t| !t.is_finite()) {
        return Err(SignalError::invalid(format!(
            "index values must be finite, got {}",
            bad
        )));
    }
    if let Some(pos) = index.windows(2).position(|w| w[0] >= w[1]) {
        return Err(SignalError::invalid(format!(
            "index must be strictly increasing: {} followed by {} at row {}",
            index[pos],
            index[pos + 1],
            pos + 1
        )));
    }
    Ok(())
}

/// Anything keyed by a strictly increasing `f64` index
///
/// Windowing and refitting are written once against this trait and apply
/// identically to [`Table`] and [`Series`].
pub trait Indexed: Clone + Sized {
    /// The timestamps, sorted ascending without duplicates
    fn index(&self) -> &[f64];

    /// Rows at positions `rows`, index included
    fn slice_rows(&self, rows: Range<usize>) -> Self;

    /// Same data with a replacement index, validated
    fn with_index(self, index: Vec<f64>) -> Result<Self>;

    fn len(&self) -> usize {
        self.index().len()
    }

    fn is_empty(&self) -> bool {
        self.index().is_empty()
    }

    fn first_index(&self) -> Option<f64> {
        self.index().first().copied()
    }

    fn last_index(&self) -> Option<f64> {
        self.index().last().copied()
    }
}

#[derive(Deserialize)]
struct TableParts {
    index: Vec<f64>,
    columns: Vec<Column>,
}

impl TryFrom<TableParts> for Table {
    type Error = SignalError;

    fn try_from(parts: TableParts) -> Result<Self> {
        Table::from_parts(parts.index, parts.columns)
    }
}

/// Ordered rows keyed by a unique, strictly increasing timestamp
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "TableParts")]
pub struct Table {
    index: Vec<f64>,
    columns: Vec<Column>,
}

impl Table {
    /// Create a table with the given index and no columns
    pub fn new(index: Vec<f64>) -> Result<Self> {
        validate_index(&index)?;
        Ok(Self {
            index,
            columns: Vec::new(),
        })
    }

    /// Create a table from an index and prebuilt columns
    pub fn from_parts(index: Vec<f64>, columns: Vec<Column>) -> Result<Self> {
        let mut table = Table::new(index)?;
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    pub(crate) fn from_parts_unchecked(index: Vec<f64>, columns: Vec<Column>) -> Self {
        debug_assert!(validate_index(&index).is_ok());
        Self { index, columns }
    }

    /// Add a column, builder style
    pub fn with_column<V: Into<Value>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self> {
        let column = Column::new(name, values.into_iter().map(Into::into).collect());
        self.push_column(column)?;
        Ok(self)
    }

    fn push_column(&mut self, column: Column) -> Result<()> {
        if column.values.len() != self.index.len() {
            return Err(SignalError::invalid(format!(
                "column '{}' has {} values but the index has {}",
                column.name,
                column.values.len(),
                self.index.len()
            )));
        }
        if self.has_column(&column.name) {
            return Err(SignalError::invalid(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Same columns, no rows
    pub fn empty_like(&self) -> Table {
        Table {
            index: Vec::new(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), Vec::new()))
                .collect(),
        }
    }

    pub fn index(&self) -> &[f64] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    pub(crate) fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Look up a column, failing with `MissingColumn` when absent
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SignalError::missing_column(name))
    }

    /// Positions of `names`, failing on the first absent one
    pub(crate) fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                self.column_position(name)
                    .ok_or_else(|| SignalError::missing_column(*name))
            })
            .collect()
    }

    /// Borrow the row at `pos`
    ///
    /// # Panics
    ///
    /// Panics when `pos >= self.len()`.
    pub fn row(&self, pos: usize) -> Row<'_> {
        assert!(pos < self.len(), "row {} out of bounds", pos);
        Row { table: self, pos }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.len()).map(move |pos| Row { table: self, pos })
    }

    /// The row holding the value in effect at `t` (last row at or before `t`)
    pub fn row_at(&self, t: f64) -> Option<Row<'_>> {
        locate(&self.index, t, Seek::Pad)
            .map(|pos| Row { table: self, pos })
    }

    /// Rows at the given increasing positions
    pub(crate) fn take(&self, rows: &[usize]) -> Table {
        Table {
            index: rows.iter().map(|&i| self.index[i]).collect(),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
        }
    }

    pub(crate) fn select_mask(&self, mask: &[bool]) -> Table {
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect();
        self.take(&rows)
    }

    /// Keep the rows accepted by `predicate`
    pub fn filter_rows(&self, predicate: impl Fn(&Row<'_>) -> bool) -> Table {
        let mask: Vec<bool> = self.rows().map(|row| predicate(&row)).collect();
        self.select_mask(&mask)
    }

    /// Drop columns in place
    pub fn drop_columns(&mut self, names: &[&str]) -> Result<()> {
        self.require_columns(names)?;
        self.columns.retain(|c| !names.contains(&c.name.as_str()));
        Ok(())
    }

    /// Copy of the table without the named columns
    pub fn without_columns(&self, names: &[&str]) -> Result<Table> {
        let mut table = self.clone();
        table.drop_columns(names)?;
        Ok(table)
    }

    /// Append the rows of `other`, which must share this table's column layout
    /// and start strictly after this table ends.
    pub(crate) fn append_unchecked(&mut self, other: &Table) {
        debug_assert_eq!(self.column_names(), other.column_names());
        self.index.extend_from_slice(&other.index);
        for (dst, src) in self.columns.iter_mut().zip(&other.columns) {
            dst.values.extend_from_slice(&src.values);
        }
    }
}

impl Indexed for Table {
    fn index(&self) -> &[f64] {
        &self.index
    }

    fn slice_rows(&self, rows: Range<usize>) -> Self {
        Table {
            index: self.index[rows.clone()].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values[rows.clone()].to_vec()))
                .collect(),
        }
    }

    fn with_index(mut self, index: Vec<f64>) -> Result<Self> {
        if index.len() != self.index.len() {
            return Err(SignalError::invalid(format!(
                "replacement index has {} values, table has {} rows",
                index.len(),
                self.index.len()
            )));
        }
        validate_index(&index)?;
        self.index = index;
        Ok(self)
    }
}

/// Borrowed view of one table row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    pos: usize,
}

impl<'a> Row<'a> {
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn timestamp(&self) -> f64 {
        self.table.index[self.pos]
    }

    /// Value of the named column in this row
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let table: &'a Table = self.table;
        table
            .columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| &c.values[self.pos])
    }

    pub fn values(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        let table: &'a Table = self.table;
        let pos = self.pos;
        table
            .columns
            .iter()
            .map(move |c| (c.name.as_str(), &c.values[pos]))
    }
}

// Missing samples are written as `null` rather than `NaN`, which not every
// encoding can represent
#[derive(Serialize, Deserialize)]
struct SeriesParts {
    name: String,
    index: Vec<f64>,
    values: Vec<Option<f64>>,
}

impl TryFrom<SeriesParts> for Series {
    type Error = SignalError;

    fn try_from(parts: SeriesParts) -> Result<Self> {
        let values = parts
            .values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Series::new(parts.name, parts.index, values)
    }
}

impl From<Series> for SeriesParts {
    fn from(series: Series) -> Self {
        SeriesParts {
            name: series.name,
            index: series.index,
            values: series
                .values
                .into_iter()
                .map(|v| (!v.is_nan()).then_some(v))
                .collect(),
        }
    }
}

/// A single numeric column keyed by timestamp; `NaN` marks a missing value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesParts", into = "SeriesParts")]
pub struct Series {
    name: String,
    index: Vec<f64>,
    values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, index: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if index.len() != values.len() {
            return Err(SignalError::invalid(format!(
                "series '{}' has {} values but the index has {}",
                name,
                values.len(),
                index.len()
            )));
        }
        validate_index(&index)?;
        Ok(Self {
            name,
            index,
            values,
        })
    }

    pub(crate) fn from_parts_unchecked(name: String, index: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(index.len(), values.len());
        Self {
            name,
            index,
            values,
        }
    }

    /// Extract a numeric column of `table`; `Null` cells become `NaN`
    pub fn from_column(table: &Table, name: &str) -> Result<Self> {
        let column = table.column(name)?;
        let values = column
            .values()
            .iter()
            .map(|v| match v {
                Value::Null => Ok(f64::NAN),
                other => other.as_f64().ok_or_else(|| {
                    SignalError::invalid(format!(
                        "column '{}' holds non-numeric value {}",
                        name, other
                    ))
                }),
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(Self::from_parts_unchecked(
            name.to_string(),
            table.index().to_vec(),
            values,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> &[f64] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// `(timestamp, value)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }

    /// Value in effect at `t` (last sample at or before `t`)
    pub fn value_at(&self, t: f64) -> Option<f64> {
        locate(&self.index, t, Seek::Pad).map(|pos| self.values[pos])
    }

    pub(crate) fn take(&self, rows: &[usize]) -> Series {
        Series {
            name: self.name.clone(),
            index: rows.iter().map(|&i| self.index[i]).collect(),
            values: rows.iter().map(|&i| self.values[i]).collect(),
        }
    }
}

impl Indexed for Series {
    fn index(&self) -> &[f64] {
        &self.index
    }

    fn slice_rows(&self, rows: Range<usize>) -> Self {
        Series {
            name: self.name.clone(),
            index: self.index[rows.clone()].to_vec(),
            values: self.values[rows].to_vec(),
        }
    }

    fn with_index(mut self, index: Vec<f64>) -> Result<Self> {
        if index.len() != self.index.len() {
            return Err(SignalError::invalid(format!(
                "replacement index has {} values, series has {} samples",
                index.len(),
                self.index.len()
            )));
        }
        validate_index(&index)?;
        self.index = index;
        Ok(self)
    }
}
