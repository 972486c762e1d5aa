//! Error messages the controller firmware embeds in otherwise successful
//! responses. The tables hold the firmware's fixed English strings.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{PortWriteFault, ValueFault};

/// Matched case-insensitively against rendered variable/port values.
const VALUE_SENTINELS: &[(&str, ValueFault)] = &[
    ("bad variable", ValueFault::BadVariable),
    ("unknown variable", ValueFault::UnknownVariable),
    ("unknown port type name", ValueFault::UnknownPortType),
    ("illegal port number", ValueFault::IllegalPortNumber),
    ("no ports of this type", ValueFault::NoPortsOfType),
];

/// Matched verbatim against KCL `set port` output, first hit wins.
const PORT_WRITE_SENTINELS: &[(&str, PortWriteFault)] = &[
    ("Port name expected", PortWriteFault::UnknownPortType),
    ("No ports of this type", PortWriteFault::NoPortsOfType),
    ("Illegal port number", PortWriteFault::IllegalPortNumber),
    ("Value out of range", PortWriteFault::ValueOutOfRange),
    ("ERROR", PortWriteFault::Unrecognised),
];

#[must_use]
pub fn classify_value(text: &str) -> Option<ValueFault> {
    let lower = text.to_lowercase();
    VALUE_SENTINELS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, fault)| *fault)
}

#[must_use]
pub fn classify_port_write(output: &str) -> Option<PortWriteFault> {
    PORT_WRITE_SENTINELS
        .iter()
        .find(|(needle, _)| output.contains(needle))
        .map(|(_, fault)| *fault)
}

/// Whether `set port` output reports the port now holds `value`.
#[must_use]
pub fn port_write_confirms(output: &str, value: i64) -> bool {
    static VALUE_CHANGE: OnceLock<Regex> = OnceLock::new();
    let pattern = VALUE_CHANGE.get_or_init(|| {
        Regex::new(r"(?s)Value was:\s*(-?\d+).*Value is:\s*(-?\d+)")
            .expect("value change pattern is valid")
    });
    pattern
        .captures(output)
        .and_then(|caps| caps.get(2))
        .and_then(|now| now.as_str().parse::<i64>().ok())
        .is_some_and(|now| now == value)
}
