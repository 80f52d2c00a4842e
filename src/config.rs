// Configuration shared by the interval operations
//
// Groups the knobs callers otherwise pass to every call: edge method,
// column names, alignment cap, dedup policy.

use crate::align::{series_align_signal, Alignment};
use crate::dedup::{df_deduplicate, Keep};
use crate::error::{Result, SignalError};
use crate::filter::{df_filter_task_ids, TaskId, TASK_COMM_MAX_LEN};
use crate::signals::df_window_signals;
use crate::squash::{df_squash, DEFAULT_DELTA_COLUMN};
use crate::table::{Series, Table};
use crate::window::{df_refit_index, df_window, EdgeMethod, Window};
use serde::{Deserialize, Serialize};

/// Configuration for windowing, squashing and aligning trace signals
///
/// # Example
/// ```
/// use tracesignal::config::AnalysisConfig;
/// use tracesignal::window::EdgeMethod;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.edge_method, EdgeMethod::Inclusive);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// How window boundaries resolve to rows
    ///
    /// - `inclusive` (default): smallest row range covering the window
    /// - `pre`: signals where every value change has its own row
    /// - `nearest`: downsampled data
    pub edge_method: EdgeMethod,

    /// Clamp windows into the data's extent before slicing
    ///
    /// Default: true
    pub clip_window: bool,

    /// Name of the duration column of interval sequences
    pub delta_column: String,

    /// Columns identifying a signal in a multi-signal table
    ///
    /// Empty (default): the whole table is one signal.
    pub signal_columns: Vec<String>,

    /// Relabel the initial values of windowed signals to just before the
    /// window's first row
    pub compress_init: bool,

    pub pid_column: Option<String>,
    pub comm_column: Option<String>,

    /// Length command names are truncated to before matching
    pub comm_max_len: usize,

    /// Largest shift applied when aligning signals, in index units
    pub max_shift: Option<f64>,

    pub dedup_keep: Keep,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            edge_method: EdgeMethod::Inclusive,
            clip_window: true,
            delta_column: DEFAULT_DELTA_COLUMN.to_string(),
            signal_columns: Vec::new(),
            compress_init: false,
            pid_column: Some("pid".to_string()),
            comm_column: Some("comm".to_string()),
            comm_max_len: TASK_COMM_MAX_LEN,
            max_shift: None,
            dedup_keep: Keep::First,
        }
    }
}

impl AnalysisConfig {
    /// Configuration for event signals where each value change is a row
    pub fn sparse_events() -> Self {
        Self {
            edge_method: EdgeMethod::Pre,
            ..Self::default()
        }
    }

    /// Configuration for data resampled at a lower rate than the source
    pub fn downsampled() -> Self {
        Self {
            edge_method: EdgeMethod::Nearest,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.delta_column.is_empty() {
            return Err(SignalError::invalid("delta_column must not be empty"));
        }

        if self.comm_max_len == 0 {
            return Err(SignalError::invalid("comm_max_len must be >= 1"));
        }

        if let Some(max_shift) = self.max_shift {
            if !max_shift.is_finite() || max_shift < 0.0 {
                return Err(SignalError::invalid(format!(
                    "max_shift must be a non-negative number, got {}",
                    max_shift
                )));
            }
        }

        Ok(())
    }

    fn signal_columns(&self) -> Vec<&str> {
        self.signal_columns.iter().map(String::as_str).collect()
    }

    /// [`df_window`] with the configured edge method and clipping
    pub fn window(&self, df: &Table, window: impl Into<Window>) -> Result<Table> {
        self.validate()?;
        df_window(df, window, self.edge_method, self.clip_window)
    }

    /// [`df_refit_index`] with the configured edge method
    pub fn refit(&self, df: &Table, start: Option<f64>, end: Option<f64>) -> Result<Table> {
        self.validate()?;
        df_refit_index(df, start, end, self.edge_method)
    }

    /// [`df_squash`] on the configured duration column
    pub fn squash(&self, df: &Table, start: f64, end: f64) -> Result<Table> {
        self.validate()?;
        df_squash(df, start, end, &self.delta_column)
    }

    /// [`df_window_signals`] on the configured signal columns
    pub fn window_signals(&self, df: &Table, window: impl Into<Window>) -> Result<Table> {
        self.validate()?;
        df_window_signals(df, window, &self.signal_columns(), self.compress_init)
    }

    /// [`series_align_signal`] capped by the configured `max_shift`
    pub fn align(&self, reference: &Series, to_align: &Series) -> Result<Alignment> {
        self.validate()?;
        series_align_signal(reference, to_align, self.max_shift)
    }

    /// [`df_filter_task_ids`] on the configured PID and command columns
    pub fn filter_task_ids(&self, df: &Table, task_ids: &[TaskId], invert: bool) -> Result<Table> {
        self.validate()?;
        df_filter_task_ids(
            df,
            task_ids,
            self.pid_column.as_deref(),
            self.comm_column.as_deref(),
            invert,
            self.comm_max_len,
        )
    }

    /// Collapse runs of rows repeating every signal column, keeping
    /// [`Self::dedup_keep`]
    pub fn deduplicate(&self, df: &Table) -> Result<Table> {
        self.validate()?;
        let columns = self.signal_columns();
        let cols = (!columns.is_empty()).then_some(columns.as_slice());
        df_deduplicate(df, self.dedup_keep, true, cols, true)
    }
}
