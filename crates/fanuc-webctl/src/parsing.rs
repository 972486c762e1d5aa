//! Decoding of controller responses into typed values.

#![allow(missing_docs)]

mod faults;
mod listing;
mod position;

pub use faults::{classify_port_write, classify_value, port_write_confirms};
pub use listing::{
    parse_clock, parse_error_log, parse_features, parse_program_list, parse_version_major,
};
pub use position::{parse_position, parse_posreg};

use serde_json::Value as JsonValue;

use crate::error::{Result, WebCtlError};

const XMP_OPEN: &str = "<XMP>";
const XMP_CLOSE: &str = "</XMP>";

/// Extract the value the `scalar_var` helper rendered for `name`.
///
/// Error strings the controller substitutes for the value are turned into
/// [`WebCtlError::Rejected`].
pub fn parse_scalar_json(body: &str, name: &str) -> Result<String> {
    let document: JsonValue = serde_json::from_str(body).map_err(|err| {
        WebCtlError::Protocol(format!("helper returned invalid JSON for '{name}': {err}").into())
    })?;
    let key = name.to_uppercase();
    let value = document.get(&key).ok_or_else(|| {
        WebCtlError::Protocol(format!("helper response has no entry for '{key}'").into())
    })?;
    let text = match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    };
    if let Some(fault) = classify_value(&text) {
        return Err(WebCtlError::Rejected {
            name: name.into(),
            fault,
            message: text.into(),
        });
    }
    Ok(text)
}

/// Verbatim text between the outermost `<XMP>` and `</XMP>` markers of a
/// KCL response page.
pub fn parse_kcl_output(document: &str) -> Result<String> {
    let start = document.find(XMP_OPEN).map(|idx| idx + XMP_OPEN.len());
    let end = document.rfind(XMP_CLOSE);
    match (start, end) {
        (Some(start), Some(end)) if start <= end => Ok(document[start..end].to_string()),
        _ => Err(WebCtlError::Protocol(
            "could not find KCL output in returned document".into(),
        )),
    }
}
