//! Controller-wide information, status predicates and program control.

#![allow(missing_docs)]

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::connection::Connection;
use crate::error::{ensure_in_range, Result, WebCtlError};
use crate::io::{
    io_read_sopin, io_read_sopout, io_read_uopout, IoState, SOPI_ESTOP, SOPO_FAULT, SOPO_REMOTE,
    SOPO_TPENBL, UOPO_PAUSED, UOPO_PROGRUN,
};
use crate::parsing::{parse_clock, parse_error_log, parse_program_list, parse_version_major};
use crate::protocol::{
    disable_web_server_headers, enable_web_server_headers, exec_karel_prg, exec_kcl,
    exec_kcl_wait, get_file_as_string,
};
use crate::types::{ErrorLogEntry, ProgramEntry};
use crate::variables::{get_scalar_var, parse_bool, parse_int, set_scalar_var};

const GENERAL_OVERRIDE_VAR: &str = "$MCR.$GENOVERRIDE";
const ERROR_LOG_PATH: &str = "/md:/errall.ls";

const KAREL_AUTO_MODE: &str = "dmh_autom";
const KAREL_SELECT_PROGRAM: &str = "dmh_selprg";
const JSON_SUCCESS: &str = "success";
const JSON_REASON: &str = "reason";
const JSON_IN_AUTO_MODE: &str = "in_auto_mode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ControllerSeries {
    R30iA,
    R30iB,
    R30iBPlus,
    /// Software version the series could not be derived from.
    Unknown(String),
}

impl ControllerSeries {
    #[must_use]
    pub fn from_version(version: &str) -> Self {
        match parse_version_major(version) {
            Some(7) => Self::R30iA,
            Some(8) => Self::R30iB,
            Some(9) => Self::R30iBPlus,
            _ => Self::Unknown(version.to_string()),
        }
    }
}

impl fmt::Display for ControllerSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::R30iA => f.write_str("R-30iA"),
            Self::R30iB => f.write_str("R-30iB"),
            Self::R30iBPlus => f.write_str("R-30iB+"),
            Self::Unknown(version) => write!(f, "Unknown (\"{version}\")"),
        }
    }
}

/// Installed application, e.g. `HandlingTool`.
pub fn get_application(conn: &Connection) -> Result<String> {
    get_scalar_var(conn, "$application[1]")
}

pub fn get_system_software_version(conn: &Connection) -> Result<String> {
    get_scalar_var(conn, "$application[2]")
}

pub fn get_controller_series(conn: &Connection) -> Result<ControllerSeries> {
    Ok(ControllerSeries::from_version(
        &get_system_software_version(conn)?,
    ))
}

pub fn get_active_prog(conn: &Connection) -> Result<String> {
    get_scalar_var(conn, "$SHELL_WRK.$ACTIVEPROG")
}

pub fn get_curr_routine(conn: &Connection) -> Result<String> {
    get_scalar_var(conn, "$SHELL_WRK.$ROUT_NAME")
}

pub fn get_curr_line(conn: &Connection) -> Result<i64> {
    parse_int(&get_scalar_var(conn, "$SHELL_WRK.$CURR_LINE")?)
}

pub fn get_num_groups(conn: &Connection) -> Result<i64> {
    parse_int(&get_scalar_var(conn, "$SCR.$NUM_GROUP")?)
}

/// Controller date and time, to the minute.
pub fn get_clock(conn: &Connection) -> Result<NaiveDateTime> {
    parse_clock(&exec_kcl_wait(conn, "show clock")?)
}

/// Request a fault reset. Does not report whether it cleared anything.
pub fn reset(conn: &Connection) -> Result<()> {
    exec_kcl(conn, "reset")
}

pub fn get_general_override(conn: &Connection) -> Result<i64> {
    parse_int(&get_scalar_var(conn, GENERAL_OVERRIDE_VAR)?)
}

pub fn set_general_override(conn: &Connection, value: u32) -> Result<()> {
    ensure_in_range("general override", value, 0, 100)?;
    set_scalar_var(conn, GENERAL_OVERRIDE_VAR, value)
}

fn karel_checked(
    conn: &Connection,
    prg_name: &str,
    params: &[(&str, &str)],
    failure: &str,
) -> Result<JsonValue> {
    let response = exec_karel_prg(conn, prg_name, params)?;
    let success = response
        .get(JSON_SUCCESS)
        .and_then(JsonValue::as_bool)
        .ok_or_else(|| {
            WebCtlError::Protocol(
                format!("'{prg_name}' response has no '{JSON_SUCCESS}' flag").into(),
            )
        })?;
    if !success {
        let reason = response
            .get(JSON_REASON)
            .and_then(JsonValue::as_str)
            .unwrap_or_default();
        return Err(WebCtlError::Controller(format!("{failure}: {reason}").into()));
    }
    Ok(response)
}

/// Whether the mode switch is in AUTO. Runs the `dmh_autom` Karel program.
pub fn in_auto_mode(conn: &Connection) -> Result<bool> {
    let response = karel_checked(conn, KAREL_AUTO_MODE, &[], "could not determine mode")?;
    match response.get(JSON_IN_AUTO_MODE) {
        Some(JsonValue::Bool(flag)) => Ok(*flag),
        Some(JsonValue::String(text)) => parse_bool(text),
        Some(JsonValue::Number(number)) => Ok(number.as_i64() != Some(0)),
        _ => Err(WebCtlError::Protocol(
            format!("'{KAREL_AUTO_MODE}' response has no '{JSON_IN_AUTO_MODE}' field").into(),
        )),
    }
}

/// Make `program` the selected program on the teach pendant. Needs the
/// `dmh_selprg` Karel program on the controller.
pub fn select_program(conn: &Connection, program: &str) -> Result<()> {
    karel_checked(
        conn,
        KAREL_SELECT_PROGRAM,
        &[("prog_name", program)],
        "program could not be selected",
    )?;
    Ok(())
}

pub fn tp_enabled(conn: &Connection) -> Result<bool> {
    Ok(io_read_sopout(conn, SOPO_TPENBL)?.is_on())
}

pub fn is_faulted(conn: &Connection) -> Result<bool> {
    Ok(io_read_sopout(conn, SOPO_FAULT)?.is_on())
}

/// The e-stop input is active low.
pub fn is_e_stopped(conn: &Connection) -> Result<bool> {
    Ok(io_read_sopin(conn, SOPI_ESTOP)? == IoState::Off)
}

pub fn in_remote_mode(conn: &Connection) -> Result<bool> {
    Ok(io_read_sopout(conn, SOPO_REMOTE)?.is_on())
}

pub fn is_program_running(conn: &Connection) -> Result<bool> {
    Ok(io_read_uopout(conn, UOPO_PROGRUN)?.is_on())
}

pub fn is_program_paused(conn: &Connection) -> Result<bool> {
    Ok(io_read_uopout(conn, UOPO_PAUSED)?.is_on())
}

/// Programs known to the controller, optionally only those of the given
/// types (`TP`, `PC`, `VR`, ...).
///
/// Web server headers are switched off for the listing and back on
/// afterwards, also when the listing failed.
pub fn list_programs(conn: &Connection, types: &[&str]) -> Result<Vec<ProgramEntry>> {
    disable_web_server_headers(conn)?;
    let listing = exec_kcl_wait(conn, "show progs");
    let restored = enable_web_server_headers(conn);
    if let Err(err) = &restored {
        warn!("could not re-enable web server headers on {}: {err}", conn.host());
    }
    let listing = listing?;
    restored?;
    Ok(parse_program_list(&listing, types))
}

/// Entries of the controller's error log, in file order.
pub fn list_errors(conn: &Connection) -> Result<Vec<ErrorLogEntry>> {
    parse_error_log(&get_file_as_string(conn, ERROR_LOG_PATH)?)
}
