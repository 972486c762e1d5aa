//! Numeric, string and position registers.

#![allow(missing_docs)]

use std::fmt;

use serde::Serialize;

use crate::comset::{comset_val, ComSetValue, ValueFuncCode};
use crate::connection::Connection;
use crate::error::{ensure_in_range, Result, WebCtlError};
use crate::parsing::parse_posreg;
use crate::types::Pose;
use crate::variables::{get_scalar_var, get_var_raw, parse_int, parse_real};

pub(crate) const MIN_GROUP: u32 = 1;
pub(crate) const MAX_GROUP: u32 = 8;

/// Content of a numeric register.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Real(f64),
}

impl Number {
    /// A rendering containing `.` is a real, anything else an integer.
    pub fn parse(text: &str) -> Result<Self> {
        if text.contains('.') {
            Ok(Self::Real(parse_real(text)?))
        } else {
            Ok(Self::Int(parse_int(text)?))
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Real(value) => value,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<Number> for ComSetValue {
    fn from(value: Number) -> Self {
        match value {
            Number::Int(value) => Self::Int(value),
            Number::Real(value) => Self::Real(value),
        }
    }
}

pub(crate) fn ensure_register_index(idx: u32) -> Result<()> {
    if idx == 0 {
        return Err(WebCtlError::InvalidArgument(
            "register indices start at 1".into(),
        ));
    }
    Ok(())
}

pub fn get_numreg(conn: &Connection, idx: u32) -> Result<Number> {
    ensure_register_index(idx)?;
    Number::parse(&get_scalar_var(conn, &format!("$NUMREG[{idx}]"))?)
}

pub fn set_numreg(conn: &Connection, idx: u32, value: Number) -> Result<()> {
    ensure_register_index(idx)?;
    comset_val(conn, ValueFuncCode::NumReg, idx, &value.into())
}

pub fn get_strreg(conn: &Connection, idx: u32) -> Result<String> {
    ensure_register_index(idx)?;
    get_scalar_var(conn, &format!("[*STRREG*]$STRREG[{idx}]"))
}

pub fn set_strreg(conn: &Connection, idx: u32, value: &str) -> Result<()> {
    ensure_register_index(idx)?;
    comset_val(
        conn,
        ValueFuncCode::StrReg,
        idx,
        &ComSetValue::Str(value.to_string()),
    )
}

/// Number of string registers configured on the controller.
pub fn get_num_strreg(conn: &Connection) -> Result<u32> {
    let text = get_scalar_var(conn, "[*STRREG*]$MAXSREGNUM")?;
    text.trim().parse::<u32>().map_err(|err| {
        WebCtlError::Protocol(format!("string register count '{text}': {err}").into())
    })
}

/// Pose and comment of `PR[idx]` for `group`; `None` when uninitialised.
pub fn get_posreg(conn: &Connection, idx: u32, group: u32) -> Result<(Option<Pose>, String)> {
    ensure_register_index(idx)?;
    ensure_in_range("group id", group, MIN_GROUP, MAX_GROUP)?;
    let varname = format!("$POSREG[{group},{idx}]");
    let text = get_var_raw(conn, &varname)?;
    parse_posreg(&text).map_err(|err| {
        WebCtlError::Protocol(
            format!("could not match value returned for '{varname}': {err}").into(),
        )
    })
}
