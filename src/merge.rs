//! Outer join of several tables on their index
//!
//! Tables are joined pairwise, left to right. The result index is the sorted
//! union of all indices; cells a table has no row for are [`Value::Null`].
//! Column names present on both sides of a join get `_x` (left) and `_y`
//! (right) suffixes.

use crate::error::{Result, SignalError};
use crate::filter::df_filter;
use crate::table::{Column, Table, Value};

/// Column preparation applied to every table before merging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOptions {
    /// Columns removed from each table prior to merging
    pub drop_columns: Vec<String>,
    /// Equality filter applied to each table; the filtered columns are then
    /// dropped since they hold a constant value
    pub filter_columns: Vec<(String, Value)>,
}

impl MergeOptions {
    pub fn drop_columns<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.drop_columns.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn filter_column(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter_columns.push((name.into(), value.into()));
        self
    }
}

fn prepare(mut table: Table, options: &MergeOptions) -> Result<Table> {
    if !options.filter_columns.is_empty() {
        let predicates: Vec<(&str, Value)> = options
            .filter_columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.clone()))
            .collect();
        table = df_filter(&table, &predicates)?;
    }

    let drop: Vec<&str> = options
        .drop_columns
        .iter()
        .chain(options.filter_columns.iter().map(|(name, _)| name))
        .map(String::as_str)
        .collect();
    if !drop.is_empty() {
        table.drop_columns(&drop)?;
    }
    Ok(table)
}

/// Positions of each side's rows in the union of two sorted indices
fn union_index(left: &[f64], right: &[f64]) -> (Vec<f64>, Vec<Option<usize>>, Vec<Option<usize>>) {
    let capacity = left.len() + right.len();
    let mut index = Vec::with_capacity(capacity);
    let mut from_left = Vec::with_capacity(capacity);
    let mut from_right = Vec::with_capacity(capacity);

    let (mut i, mut j) = (0, 0);
    while i < left.len() || j < right.len() {
        let l = left.get(i).copied();
        let r = right.get(j).copied();
        match (l, r) {
            (Some(l), Some(r)) if l == r => {
                index.push(l);
                from_left.push(Some(i));
                from_right.push(Some(j));
                i += 1;
                j += 1;
            }
            (Some(l), Some(r)) if l < r => {
                index.push(l);
                from_left.push(Some(i));
                from_right.push(None);
                i += 1;
            }
            (Some(l), None) => {
                index.push(l);
                from_left.push(Some(i));
                from_right.push(None);
                i += 1;
            }
            (_, Some(r)) => {
                index.push(r);
                from_left.push(None);
                from_right.push(Some(j));
                j += 1;
            }
            (None, None) => break,
        }
    }
    (index, from_left, from_right)
}

fn spread(column: &Column, name: String, rows: &[Option<usize>]) -> Column {
    let values = rows
        .iter()
        .map(|row| match row {
            Some(pos) => column.values()[*pos].clone(),
            None => Value::Null,
        })
        .collect();
    Column::new(name, values)
}

fn outer_join(left: &Table, right: &Table) -> Result<Table> {
    let (index, from_left, from_right) = union_index(left.index(), right.index());

    let mut columns = Vec::with_capacity(left.columns().len() + right.columns().len());
    for column in left.columns() {
        let name = if right.has_column(column.name()) {
            format!("{}_x", column.name())
        } else {
            column.name().to_string()
        };
        columns.push(spread(column, name, &from_left));
    }
    for column in right.columns() {
        let name = if left.has_column(column.name()) {
            format!("{}_y", column.name())
        } else {
            column.name().to_string()
        };
        columns.push(spread(column, name, &from_right));
    }

    Table::from_parts(index, columns)
}

/// Merge `tables` into one, keeping the index sorted
///
/// Tables are consumed so dropped columns are removed in place; use
/// [`Table::without_columns`] beforehand to keep the originals intact.
pub fn df_merge(tables: Vec<Table>, options: &MergeOptions) -> Result<Table> {
    let count = tables.len();
    let mut tables = tables
        .into_iter()
        .map(|table| prepare(table, options))
        .collect::<Result<Vec<Table>>>()?
        .into_iter();

    let mut merged = tables
        .next()
        .ok_or_else(|| SignalError::invalid("cannot merge an empty list of tables"))?;
    for table in tables {
        merged = outer_join(&merged, &table)?;
    }

    tracing::debug!(
        tables = count,
        rows = merged.len(),
        columns = merged.columns().len(),
        "merged tables"
    );
    Ok(merged)
}
