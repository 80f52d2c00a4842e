//! Tracesignal - interval algebra for piecewise-constant trace signals
//!
//! This library provides the table operations behind trace analysis:
//! boundary-exact windowing of timestamp-indexed tables, duration-accounted
//! slicing of interval sequences, per-signal splitting with initial values,
//! deduplication, cross-correlation alignment and table merging.

pub mod align;
pub mod config;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod merge;
pub mod persistence;
pub mod signals;
pub mod squash;
pub mod stats;
pub mod table;
pub mod window;

pub use error::{Result, SignalError};
pub use table::{Column, Indexed, Row, Series, Table, Value};
pub use window::{EdgeMethod, Window};
