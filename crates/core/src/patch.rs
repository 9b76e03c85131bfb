//! Partial updates expressed as a sequence of patch operations.
//!
//! The operation vocabulary follows RFC 6902 (`add`, `remove`, `replace`,
//! `move`, `copy`, `test`), but targets are flat typed structs rather than
//! arbitrary JSON documents. Each patchable struct implements [`Patchable`]
//! with an explicit accessor per field, so an operation against a field the
//! struct does not have fails with a [`PatchError`] instead of being
//! silently ignored.
//!
//! Paths are single-segment JSON pointers (`/title`). Field names are
//! matched case-insensitively against [`Patchable::FIELDS`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// A single patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl PatchOperation {
    /// The lowercase operation name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Remove { .. } => "remove",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Move { .. } => "move",
            PatchOperation::Copy { .. } => "copy",
            PatchOperation::Test { .. } => "test",
        }
    }

    /// The target path of the operation.
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }
}

/// Describes the first operation that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("operation {index} ({op} {path}): {reason}")]
pub struct PatchError {
    /// Zero-based position of the offending operation in the document.
    pub index: usize,
    pub op: String,
    pub path: String,
    pub reason: String,
}

impl PatchError {
    fn at(index: usize, op: &PatchOperation, reason: impl Into<String>) -> Self {
        Self {
            index,
            op: op.name().to_string(),
            path: op.path().to_string(),
            reason: reason.into(),
        }
    }
}

/// Parse a JSON array into a list of operations.
///
/// Each element is decoded independently so the error names the element
/// that failed, including unknown `op` values.
pub fn parse_document(document: Value) -> Result<Vec<PatchOperation>, PatchError> {
    let Value::Array(items) = document else {
        return Err(PatchError {
            index: 0,
            op: String::new(),
            path: String::new(),
            reason: "patch document must be a JSON array".into(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let op = item
                .get("op")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let path = item
                .get("path")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            serde_json::from_value::<PatchOperation>(item).map_err(|e| PatchError {
                index,
                op,
                path,
                reason: e.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Why a field accessor rejected an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Unknown,
    InvalidValue(String),
}

/// A flat struct whose fields can be read and written by name.
///
/// Implementors only ever see canonical names taken from [`Self::FIELDS`];
/// path parsing and case folding happen in [`apply`].
pub trait Patchable {
    /// Canonical wire names of every patchable field.
    const FIELDS: &'static [&'static str];

    fn get_field(&self, field: &str) -> Result<Value, FieldError>;

    fn set_field(&mut self, field: &str, value: Value) -> Result<(), FieldError>;

    /// Reset a field to its empty value (`None`, empty string).
    fn clear_field(&mut self, field: &str) -> Result<(), FieldError>;
}

/// Decode a JSON value into a field's type.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, FieldError> {
    serde_json::from_value(value).map_err(|e| FieldError::InvalidValue(e.to_string()))
}

/// Encode a field's current value as JSON.
pub fn encode<T: Serialize>(value: &T) -> Result<Value, FieldError> {
    serde_json::to_value(value).map_err(|e| FieldError::InvalidValue(e.to_string()))
}

/// Apply `operations` to `target` in order.
///
/// Stops at the first failing operation. The target may already reflect the
/// operations before the failing one, so callers should patch a disposable
/// copy.
pub fn apply<T: Patchable>(target: &mut T, operations: &[PatchOperation]) -> Result<(), PatchError> {
    for (index, op) in operations.iter().enumerate() {
        apply_one(target, op).map_err(|reason| PatchError::at(index, op, reason))?;
    }
    Ok(())
}

fn apply_one<T: Patchable>(target: &mut T, op: &PatchOperation) -> Result<(), String> {
    match op {
        PatchOperation::Add { path, value } | PatchOperation::Replace { path, value } => {
            let field = resolve::<T>(path)?;
            target
                .set_field(field, value.clone())
                .map_err(|e| describe(field, e))
        }
        PatchOperation::Remove { path } => {
            let field = resolve::<T>(path)?;
            target.clear_field(field).map_err(|e| describe(field, e))
        }
        PatchOperation::Move { from, path } => {
            let source = resolve::<T>(from)?;
            let dest = resolve::<T>(path)?;
            if source == dest {
                return Ok(());
            }
            let value = target.get_field(source).map_err(|e| describe(source, e))?;
            target.clear_field(source).map_err(|e| describe(source, e))?;
            target.set_field(dest, value).map_err(|e| describe(dest, e))
        }
        PatchOperation::Copy { from, path } => {
            let source = resolve::<T>(from)?;
            let dest = resolve::<T>(path)?;
            let value = target.get_field(source).map_err(|e| describe(source, e))?;
            target.set_field(dest, value).map_err(|e| describe(dest, e))
        }
        PatchOperation::Test { path, value } => {
            let field = resolve::<T>(path)?;
            let current = target.get_field(field).map_err(|e| describe(field, e))?;
            if &current == value {
                Ok(())
            } else {
                Err(format!("test failed: '{field}' is {current}, expected {value}"))
            }
        }
    }
}

/// Map a JSON pointer onto a canonical field name.
fn resolve<T: Patchable>(pointer: &str) -> Result<&'static str, String> {
    let segment = pointer
        .strip_prefix('/')
        .ok_or_else(|| format!("path '{pointer}' must start with '/'"))?;
    if segment.is_empty() || segment.contains('/') {
        return Err(format!("path '{pointer}' must name a single top-level field"));
    }
    let segment = segment.replace("~1", "/").replace("~0", "~");

    T::FIELDS
        .iter()
        .copied()
        .find(|f| f.eq_ignore_ascii_case(&segment))
        .ok_or_else(|| format!("unknown field '{segment}'"))
}

fn describe(field: &str, err: FieldError) -> String {
    match err {
        FieldError::Unknown => format!("unknown field '{field}'"),
        FieldError::InvalidValue(msg) => format!("invalid value for '{field}': {msg}"),
    }
}
