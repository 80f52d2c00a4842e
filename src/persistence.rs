//! Versioned persistence of tables, series and configuration
//!
//! Objects are written inside an envelope carrying a format version and the
//! kind of object stored:
//!
//! ```text
//! { "format_version": 1, "kind": "table", "payload": { ... } }
//! ```
//!
//! Decoding reads the header first, so a file holding another kind of
//! object or written by an incompatible version is rejected before its
//! payload is interpreted.
//!
//! # Example
//!
//! ```
//! use tracesignal::persistence::{from_reader, to_writer, Encoding};
//! use tracesignal::table::Table;
//!
//! # fn main() -> anyhow::Result<()> {
//! let table = Table::new(vec![0.0, 1.0])?.with_column("cpu", [0, 1])?;
//!
//! let mut buf = Vec::new();
//! to_writer(&table, &mut buf, Encoding::MessagePack)?;
//! let restored: Table = from_reader(buf.as_slice(), Encoding::MessagePack)?;
//! assert_eq!(restored, table);
//! # Ok(())
//! # }
//! ```

use crate::config::AnalysisConfig;
use crate::table::{Series, Table};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Current envelope format version
pub const FORMAT_VERSION: u32 = 1;

/// Errors that can occur while saving or loading objects
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode {kind}: {reason}")]
    Encode { kind: String, reason: String },

    #[error("Failed to decode: {0}")]
    Decode(String),

    #[error("Format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: String, found: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// An object that can be stored in an envelope
pub trait Persist: Serialize + DeserializeOwned {
    /// Tag written in the envelope header
    const KIND: &'static str;
}

impl Persist for Table {
    const KIND: &'static str = "table";
}

impl Persist for Series {
    const KIND: &'static str = "series";
}

impl Persist for AnalysisConfig {
    const KIND: &'static str = "analysis_config";
}

/// On-disk encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Json,
    /// MessagePack with named fields
    MessagePack,
    Toml,
}

impl Encoding {
    /// Guess the encoding from a file extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for Encoding {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Encoding::Json),
            "msgpack" | "mp" => Ok(Encoding::MessagePack),
            "toml" => Ok(Encoding::Toml),
            other => Err(PersistenceError::UnknownEncoding(other.to_string())),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    format_version: u32,
    kind: &'a str,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Header {
    format_version: u32,
    kind: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    payload: T,
}

fn decode<D: DeserializeOwned>(bytes: &[u8], encoding: Encoding) -> Result<D> {
    let decode_err = |e: &dyn std::fmt::Display| PersistenceError::Decode(e.to_string());
    match encoding {
        Encoding::Json => serde_json::from_slice(bytes).map_err(|e| decode_err(&e)),
        Encoding::MessagePack => rmp_serde::from_slice(bytes).map_err(|e| decode_err(&e)),
        Encoding::Toml => {
            let text = std::str::from_utf8(bytes).map_err(|e| decode_err(&e))?;
            toml::from_str(text).map_err(|e| decode_err(&e))
        }
    }
}

/// Encode `value` in its envelope
pub fn to_bytes<T: Persist>(value: &T, encoding: Encoding) -> Result<Vec<u8>> {
    let envelope = EnvelopeRef {
        format_version: FORMAT_VERSION,
        kind: T::KIND,
        payload: value,
    };
    let encode_err = |e: &dyn std::fmt::Display| PersistenceError::Encode {
        kind: T::KIND.to_string(),
        reason: e.to_string(),
    };
    match encoding {
        Encoding::Json => serde_json::to_vec_pretty(&envelope).map_err(|e| encode_err(&e)),
        Encoding::MessagePack => rmp_serde::to_vec_named(&envelope).map_err(|e| encode_err(&e)),
        Encoding::Toml => toml::to_string(&envelope)
            .map(String::into_bytes)
            .map_err(|e| encode_err(&e)),
    }
}

/// Decode an object of kind `T` from its envelope
pub fn from_bytes<T: Persist>(bytes: &[u8], encoding: Encoding) -> Result<T> {
    let header: Header = decode(bytes, encoding)?;
    if header.format_version != FORMAT_VERSION {
        return Err(PersistenceError::VersionMismatch {
            expected: FORMAT_VERSION,
            found: header.format_version,
        });
    }
    if header.kind != T::KIND {
        return Err(PersistenceError::KindMismatch {
            expected: T::KIND.to_string(),
            found: header.kind,
        });
    }
    let envelope: Envelope<T> = decode(bytes, encoding)?;
    Ok(envelope.payload)
}

/// Write `value` to a stream
pub fn to_writer<T: Persist, W: Write>(value: &T, mut writer: W, encoding: Encoding) -> Result<()> {
    let bytes = to_bytes(value, encoding)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    tracing::debug!(kind = T::KIND, ?encoding, bytes = bytes.len(), "saved object");
    Ok(())
}

/// Read an object of kind `T` from a stream
pub fn from_reader<T: Persist, R: Read>(mut reader: R, encoding: Encoding) -> Result<T> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let value = from_bytes(&bytes, encoding)?;
    tracing::debug!(kind = T::KIND, ?encoding, bytes = bytes.len(), "loaded object");
    Ok(value)
}

/// Save `value` to `path`
pub fn to_path<T: Persist>(value: &T, path: impl AsRef<Path>, encoding: Encoding) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    to_writer(value, std::io::BufWriter::new(file), encoding)
}

/// Load an object of kind `T` from `path`
pub fn from_path<T: Persist>(path: impl AsRef<Path>, encoding: Encoding) -> Result<T> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PersistenceError::FileNotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    from_reader(std::io::BufReader::new(file), encoding)
}
