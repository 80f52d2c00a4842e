// Boundary lookup in a strictly increasing index
//
// A requested boundary rarely matches a sample exactly. The edge method
// decides which neighbouring sample stands in for it, separately for the
// start and the end of a window.

use crate::error::SignalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a single boundary value that misses the index is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seek {
    /// Last index value at or before the target
    Pad,
    /// First index value at or after the target
    Backfill,
    /// Numerically closest index value; ties go to the later sample
    Nearest,
}

/// Edge-matching policy for window boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMethod {
    /// Smallest range containing every row inside `[start, end]`: a missed
    /// start widens to the sample before it, a missed end to the sample after
    #[default]
    Inclusive,
    /// Only rows strictly inside the requested interval
    Exclusive,
    /// Both boundaries snap to the closest sample
    Nearest,
    /// Both boundaries snap to the last sample at or before them
    Pre,
    /// Both boundaries snap to the first sample at or after them
    Post,
}

impl EdgeMethod {
    pub fn start_seek(self) -> Seek {
        match self {
            EdgeMethod::Inclusive => Seek::Pad,
            EdgeMethod::Exclusive => Seek::Backfill,
            EdgeMethod::Nearest => Seek::Nearest,
            EdgeMethod::Pre => Seek::Pad,
            EdgeMethod::Post => Seek::Backfill,
        }
    }

    pub fn end_seek(self) -> Seek {
        match self {
            EdgeMethod::Inclusive => Seek::Backfill,
            EdgeMethod::Exclusive => Seek::Pad,
            EdgeMethod::Nearest => Seek::Nearest,
            EdgeMethod::Pre => Seek::Pad,
            EdgeMethod::Post => Seek::Backfill,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeMethod::Inclusive => "inclusive",
            EdgeMethod::Exclusive => "exclusive",
            EdgeMethod::Nearest => "nearest",
            EdgeMethod::Pre => "pre",
            EdgeMethod::Post => "post",
        }
    }
}

impl fmt::Display for EdgeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeMethod {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inclusive" => Ok(EdgeMethod::Inclusive),
            "exclusive" => Ok(EdgeMethod::Exclusive),
            "nearest" => Ok(EdgeMethod::Nearest),
            "pre" => Ok(EdgeMethod::Pre),
            "post" => Ok(EdgeMethod::Post),
            other => Err(SignalError::invalid(format!(
                "Slicing method not supported: {}",
                other
            ))),
        }
    }
}

/// Resolve `target` to a row position of `index`
///
/// Exact matches always win. Returns `None` when the policy has no sample to
/// fall back on (`Pad` before the first sample, `Backfill` after the last,
/// or an empty index).
pub fn locate(index: &[f64], target: f64, seek: Seek) -> Option<usize> {
    // First position whose value is >= target
    let pos = index.partition_point(|&t| t < target);
    if pos < index.len() && index[pos] == target {
        return Some(pos);
    }

    let before = pos.checked_sub(1);
    let after = (pos < index.len()).then_some(pos);

    match seek {
        Seek::Pad => before,
        Seek::Backfill => after,
        Seek::Nearest => match (before, after) {
            (Some(b), Some(a)) => {
                if target - index[b] < index[a] - target {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (b, a) => b.or(a),
        },
    }
}
