//! JSON output for scans and stored records.
//!
//! Pretty by default so the output can be read and diffed; compact for piping.

use serde::Serialize;

use crate::error::Result;

pub fn render<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<String> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(text)
}
