//! Line-oriented dumps: program listings, the error log, the options list
//! and the controller clock.

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::{Result, WebCtlError};
use crate::types::{ErrorLogEntry, Feature, ProgramEntry};

const CLOCK_FORMAT: &str = "%d-%b-%y %H:%M";

/// `(name, type)` pairs of a `show progs` dump, keeping only the listed types
/// (compared case-insensitively). An empty `types` keeps everything.
#[must_use]
pub fn parse_program_list(text: &str, types: &[&str]) -> Vec<ProgramEntry> {
    static PROGRAM: OnceLock<Regex> = OnceLock::new();
    let pattern = PROGRAM
        .get_or_init(|| Regex::new(r"(\S+)\s+(\S+)\s+Task").expect("program pattern is valid"));
    let wanted = types.iter().map(|t| t.to_lowercase()).collect::<Vec<_>>();
    pattern
        .captures_iter(text)
        .map(|caps| ProgramEntry {
            name: caps[1].to_string(),
            program_type: caps[2].to_string(),
        })
        .filter(|entry| wanted.is_empty() || wanted.contains(&entry.program_type.to_lowercase()))
        .collect()
}

/// Entries of `errall.ls` in file order.
///
/// Fields are separated by `"`. Lines either delimit fields with a single
/// quote (`1"date"message"detail"level state`) or wrap every field in quotes
/// (`"1" "date" "message" "detail" "level state"`).
pub fn parse_error_log(text: &str) -> Result<Vec<ErrorLogEntry>> {
    let mut entries = Vec::new();
    for line in text.lines() {
        if line.contains("Robot Name") || line.trim().is_empty() {
            continue;
        }
        let pieces = line.split('"').map(str::trim).collect::<Vec<_>>();
        let fields = if pieces.first().is_some_and(|first| first.is_empty()) {
            pieces.iter().skip(1).step_by(2).copied().collect::<Vec<_>>()
        } else {
            pieces
        };
        let [seq, timestamp, message, detail, level_state, ..] = fields.as_slice() else {
            return Err(WebCtlError::Protocol(
                format!("error log line has too few fields: '{line}'").into(),
            ));
        };
        let seq = seq.parse::<u32>().map_err(|err| {
            WebCtlError::Protocol(format!("error log sequence '{seq}': {err}").into())
        })?;
        let mut tokens = level_state.split_whitespace().collect::<Vec<_>>();
        let state = tokens.pop().ok_or_else(|| {
            WebCtlError::Protocol(format!("error log line has no state: '{line}'").into())
        })?;
        entries.push(ErrorLogEntry {
            seq,
            timestamp: timestamp.to_string(),
            message: message.to_string(),
            detail: detail.to_string(),
            level: tokens.join(" "),
            state: state.to_string(),
        });
    }
    Ok(entries)
}

/// Installed options listed in the `FEATURE` section of `version.dg`.
#[must_use]
pub fn parse_features(text: &str) -> Vec<Feature> {
    text.lines()
        .skip_while(|line| !line.to_lowercase().starts_with("feature"))
        .skip(1)
        .take_while(|line| !line.trim().is_empty())
        .map(|line| {
            let line = line.trim();
            let (description, order_no) = line.rsplit_once(' ').unwrap_or(("", line));
            Feature {
                order_no: order_no.to_string(),
                description: description.trim_end().to_string(),
            }
        })
        .collect()
}

/// First line of `show clock` output holding a `DD-MON-YY HH:MM` stamp.
pub fn parse_clock(text: &str) -> Result<NaiveDateTime> {
    text.lines()
        .find_map(|line| NaiveDateTime::parse_from_str(line.trim(), CLOCK_FORMAT).ok())
        .ok_or_else(|| {
            WebCtlError::Protocol(format!("no date/time in clock output: '{}'", text.trim()).into())
        })
}

/// Major version of a software version string such as `V9.30P/44`.
#[must_use]
pub fn parse_version_major(version: &str) -> Option<u32> {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    let pattern = VERSION
        .get_or_init(|| Regex::new(r"^V(\d+)\.").expect("version pattern is valid"));
    pattern
        .captures(version.trim())
        .and_then(|caps| caps[1].parse().ok())
}
