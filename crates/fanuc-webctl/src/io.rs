//! Digital, analog and group I/O ports.
//!
//! Ports are read through the `scalar_var` helper as `<TYPE>[<idx>]` and
//! written with KCL `set port`. The two use different names for some port
//! families, so [`PortType`] carries both.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::connection::Connection;
use crate::error::{Result, WebCtlError};
use crate::parsing::{classify_port_write, port_write_confirms};
use crate::protocol::{exec_kcl, exec_kcl_wait};
use crate::variables::{get_scalar_var, parse_bool, parse_int};

/// System operator panel output bits.
pub const SOPO_REMOTE: u32 = 0;
pub const SOPO_FAULT: u32 = 3;
pub const SOPO_TPENBL: u32 = 7;

/// System operator panel input bits.
pub const SOPI_ESTOP: u32 = 0;

/// User operator panel output bits.
pub const UOPO_CMDENBL: u32 = 1;
pub const UOPO_SYSRDY: u32 = 2;
pub const UOPO_PROGRUN: u32 = 3;
pub const UOPO_PAUSED: u32 = 4;
pub const UOPO_HELD: u32 = 5;
pub const UOPO_FAULT: u32 = 6;
pub const UOPO_ATPERCH: u32 = 7;
pub const UOPO_TPENBL: u32 = 8;
pub const UOPO_BATALM: u32 = 9;
pub const UOPO_BUSY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortKind {
    Bool,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PortType {
    Brake,
    DigitalIn,
    DigitalOut,
    EStop,
    LinkDigitalIn,
    LinkDigitalOut,
    PlcIn,
    PlcOut,
    RobotIn,
    RobotOut,
    SopIn,
    SopOut,
    Tool,
    TpIn,
    TpOut,
    UopIn,
    UopOut,
    WeldIn,
    WeldOut,
    WeldStickIn,
    WeldStickOut,
    AnalogIn,
    AnalogOut,
    GroupIn,
    GroupOut,
    LinkAnalogIn,
    LinkAnalogOut,
}

impl PortType {
    pub const ALL: [Self; 27] = [
        Self::Brake,
        Self::DigitalIn,
        Self::DigitalOut,
        Self::EStop,
        Self::LinkDigitalIn,
        Self::LinkDigitalOut,
        Self::PlcIn,
        Self::PlcOut,
        Self::RobotIn,
        Self::RobotOut,
        Self::SopIn,
        Self::SopOut,
        Self::Tool,
        Self::TpIn,
        Self::TpOut,
        Self::UopIn,
        Self::UopOut,
        Self::WeldIn,
        Self::WeldOut,
        Self::WeldStickIn,
        Self::WeldStickOut,
        Self::AnalogIn,
        Self::AnalogOut,
        Self::GroupIn,
        Self::GroupOut,
        Self::LinkAnalogIn,
        Self::LinkAnalogOut,
    ];

    /// Name used when reading the port as a variable.
    #[must_use]
    pub fn read_name(self) -> &'static str {
        match self {
            Self::Brake => "BRAKE",
            Self::DigitalIn => "DIN",
            Self::DigitalOut => "DOUT",
            Self::EStop => "ESTOP",
            Self::LinkDigitalIn => "LDIN",
            Self::LinkDigitalOut => "LDOUT",
            Self::PlcIn => "PLCIN",
            Self::PlcOut => "PLCOUT",
            Self::RobotIn => "RDI",
            Self::RobotOut => "RDO",
            Self::SopIn => "SOPIN",
            Self::SopOut => "SOPOUT",
            Self::Tool => "TOOL",
            Self::TpIn => "TPIN",
            Self::TpOut => "TPOUT",
            Self::UopIn => "UOPIN",
            Self::UopOut => "UOPOUT",
            Self::WeldIn => "WDI",
            Self::WeldOut => "WDO",
            Self::WeldStickIn => "WSIN",
            Self::WeldStickOut => "WSOUT",
            Self::AnalogIn => "ANIN",
            Self::AnalogOut => "ANOUT",
            Self::GroupIn => "GPIN",
            Self::GroupOut => "GPOUT",
            Self::LinkAnalogIn => "LANIN",
            Self::LinkAnalogOut => "LANOUT",
        }
    }

    /// Name KCL `set port` knows the port by, `None` for read-only families.
    #[must_use]
    pub fn write_name(self) -> Option<&'static str> {
        match self {
            Self::DigitalIn => Some("DIN"),
            Self::DigitalOut => Some("DOUT"),
            Self::RobotOut => Some("RDO"),
            Self::SopOut => Some("OPOUT"),
            Self::TpOut => Some("TPOUT"),
            Self::WeldIn => Some("WDI"),
            Self::WeldOut => Some("WDO"),
            Self::AnalogIn => Some("AIN"),
            Self::AnalogOut => Some("AOUT"),
            Self::GroupIn => Some("GIN"),
            Self::GroupOut => Some("GOUT"),
            _ => None,
        }
    }

    #[must_use]
    pub fn kind(self) -> PortKind {
        match self {
            Self::AnalogIn
            | Self::AnalogOut
            | Self::GroupIn
            | Self::GroupOut
            | Self::LinkAnalogIn
            | Self::LinkAnalogOut => PortKind::Int,
            _ => PortKind::Bool,
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.read_name())
    }
}

/// Accepts read and `set port` names, case-insensitively.
impl FromStr for PortType {
    type Err = WebCtlError;

    fn from_str(text: &str) -> Result<Self> {
        let upper = text.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|port| port.read_name() == upper || port.write_name() == Some(upper.as_str()))
            .ok_or_else(|| {
                WebCtlError::InvalidArgument(format!("unknown port type '{text}'").into())
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortValue {
    Bool(bool),
    Int(i64),
}

impl fmt::Display for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("ON"),
            Self::Bool(false) => f.write_str("OFF"),
            Self::Int(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IoState {
    Off,
    On,
}

impl IoState {
    /// Only the literal `ON` counts as set.
    fn from_value(text: &str) -> Self {
        if text.trim() == "ON" {
            Self::On
        } else {
            Self::Off
        }
    }

    #[must_use]
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

/// Value of `<port_type>[<idx>]` as the controller renders it (`ON`, `OFF`
/// or a number).
pub fn io_read(conn: &Connection, port_type: &str, idx: u32) -> Result<String> {
    let port_id = format!("{}[{idx}]", port_type.to_uppercase());
    get_scalar_var(conn, &port_id)
}

/// Read a port and decode it according to its family.
pub fn read_port(conn: &Connection, port: PortType, idx: u32) -> Result<PortValue> {
    let text = io_read(conn, port.read_name(), idx)?;
    Ok(match port.kind() {
        PortKind::Bool => PortValue::Bool(parse_bool(&text)?),
        PortKind::Int => PortValue::Int(parse_int(&text)?),
    })
}

fn set_port_command(port: PortType, idx: u32, value: i64) -> Result<String> {
    let name = port.write_name().ok_or_else(|| {
        WebCtlError::InvalidArgument(format!("port type {port} cannot be written").into())
    })?;
    if port.kind() == PortKind::Bool && !(0..=1).contains(&value) {
        return Err(WebCtlError::InvalidArgument(
            format!("{name}[{idx}] is a boolean port, got value {value}").into(),
        ));
    }
    Ok(format!("set port {name}[{idx}]={value}"))
}

/// `set port` without waiting for the controller's answer.
pub fn io_write(conn: &Connection, port: PortType, idx: u32, value: i64) -> Result<()> {
    let cmd = set_port_command(port, idx, value)?;
    exec_kcl(conn, &cmd)
}

/// `set port` and report whether the controller confirmed the new value.
pub fn io_write_checked(conn: &Connection, port: PortType, idx: u32, value: i64) -> Result<bool> {
    let cmd = set_port_command(port, idx, value)?;
    let output = exec_kcl_wait(conn, &cmd)?;
    let output = output.trim();
    if let Some(fault) = classify_port_write(output) {
        return Err(WebCtlError::PortWrite {
            port: format!("{}[{idx}]", port.write_name().unwrap_or_default()).into(),
            fault,
            response: output.into(),
        });
    }
    Ok(port_write_confirms(output, value))
}

pub fn io_read_sopout(conn: &Connection, idx: u32) -> Result<IoState> {
    Ok(IoState::from_value(&io_read(conn, "SOPOUT", idx)?))
}

pub fn io_read_sopin(conn: &Connection, idx: u32) -> Result<IoState> {
    Ok(IoState::from_value(&io_read(conn, "SOPIN", idx)?))
}

pub fn io_read_uopout(conn: &Connection, idx: u32) -> Result<IoState> {
    Ok(IoState::from_value(&io_read(conn, "UOPOUT", idx)?))
}

/// Robot output (`RDO`).
pub fn io_read_rout(conn: &Connection, idx: u32) -> Result<IoState> {
    Ok(IoState::from_value(&io_read(conn, "RDO", idx)?))
}

pub fn io_write_dout(conn: &Connection, idx: u32, on: bool) -> Result<()> {
    io_write(conn, PortType::DigitalOut, idx, i64::from(on))
}

pub fn io_write_rout(conn: &Connection, idx: u32, on: bool) -> Result<()> {
    io_write(conn, PortType::RobotOut, idx, i64::from(on))
}
