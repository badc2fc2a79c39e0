use crate::error::{LedgerError, Result};
use serde::Serialize;

/// Serialize a value to JSON text with object keys in sorted order.
///
/// `serde_json` backs objects with a `BTreeMap`, so routing any serializable
/// value through `Value` yields the sorted-key form no matter how the source
/// struct declares its fields. Block hashes are computed over this text, so
/// it must stay byte-stable for a given value.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)
        .map_err(|e| LedgerError::Serialization(format!("Failed to canonicalize value: {e}")))?;
    Ok(value.to_string())
}
