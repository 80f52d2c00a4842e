//! Row filtering on column values
//!
//! Supports:
//! - Equality predicates ANDed together: `df_filter(df, &[("cpu", 0.into())])`
//! - Task selection by PID and/or command name: `df_filter_task_ids`
//! - Arbitrary predicates through [`Table::filter_rows`]

use crate::error::Result;
use crate::table::{Table, Value};
use serde::{Deserialize, Serialize};

/// Maximum length of a task command name recorded by the kernel
pub const TASK_COMM_MAX_LEN: usize = 16;

/// Keep the rows where every `(column, value)` pair matches
///
/// Cells compare with [`Value::matches`], so numeric columns match whether
/// they hold integers or floats. An empty predicate list keeps every row.
pub fn df_filter(df: &Table, filter_columns: &[(&str, Value)]) -> Result<Table> {
    let names: Vec<&str> = filter_columns.iter().map(|(name, _)| *name).collect();
    let positions = df.require_columns(&names)?;

    let mask: Vec<bool> = (0..df.len())
        .map(|row| {
            positions
                .iter()
                .zip(filter_columns)
                .all(|(&col, (_, value))| df.columns()[col].values()[row].matches(value))
        })
        .collect();
    Ok(df.select_mask(&mask))
}

/// Task identity; unset fields match any task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TaskId {
    pub pid: Option<i64>,
    pub comm: Option<String>,
}

impl TaskId {
    pub fn new(pid: Option<i64>, comm: Option<&str>) -> Self {
        Self {
            pid,
            comm: comm.map(str::to_string),
        }
    }

    pub fn from_pid(pid: i64) -> Self {
        Self::new(Some(pid), None)
    }

    pub fn from_comm(comm: &str) -> Self {
        Self::new(None, Some(comm))
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.pid, &self.comm) {
            (Some(pid), Some(comm)) => write!(f, "{}:{}", pid, comm),
            (Some(pid), None) => write!(f, "{}", pid),
            (None, Some(comm)) => write!(f, "{}", comm),
            (None, None) => write!(f, "*"),
        }
    }
}

fn cell_matches(column: Option<&[Value]>, wanted: &Option<Value>, row: usize) -> bool {
    match (column, wanted) {
        (Some(values), Some(value)) => values[row].matches(value),
        _ => true,
    }
}

/// Keep the rows belonging to any of `task_ids`
///
/// A task matches a row when its PID equals `pid_col` and its command name,
/// truncated to `comm_max_len` characters, equals `comm_col`. An unset task
/// field or an unset column name matches every row. `invert` keeps the
/// complement; an empty task list therefore keeps nothing, or everything
/// when inverted.
pub fn df_filter_task_ids(
    df: &Table,
    task_ids: &[TaskId],
    pid_col: Option<&str>,
    comm_col: Option<&str>,
    invert: bool,
    comm_max_len: usize,
) -> Result<Table> {
    let pid_values = match pid_col {
        Some(col) if task_ids.iter().any(|t| t.pid.is_some()) => Some(df.column(col)?.values()),
        _ => None,
    };
    let comm_values = match comm_col {
        Some(col) if task_ids.iter().any(|t| t.comm.is_some()) => {
            Some(df.column(col)?.values())
        }
        _ => None,
    };

    let wanted: Vec<(Option<Value>, Option<Value>)> = task_ids
        .iter()
        .map(|task| {
            let pid = task.pid.map(Value::Int);
            let comm = task
                .comm
                .as_ref()
                .map(|c| Value::Str(c.chars().take(comm_max_len).collect()));
            (pid, comm)
        })
        .collect();

    let mask: Vec<bool> = (0..df.len())
        .map(|row| {
            let selected = wanted.iter().any(|(pid, comm)| {
                cell_matches(pid_values, pid, row) && cell_matches(comm_values, comm, row)
            });
            selected != invert
        })
        .collect();

    let out = df.select_mask(&mask);
    tracing::debug!(
        tasks = task_ids.len(),
        invert,
        kept = out.len(),
        total = df.len(),
        "filtered task ids"
    );
    Ok(out)
}
