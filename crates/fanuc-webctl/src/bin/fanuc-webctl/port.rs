//! `read` and `write`: single I/O port access.

use std::process::ExitCode;

use anyhow::Context;
use fanuc_webctl::io::{io_write, io_write_checked, read_port};
use fanuc_webctl::{Connection, PortType, PortValue, WebCtlError};

use crate::style;

pub fn run_read(
    conn: &Connection,
    port_type: &str,
    index: u32,
    status: bool,
) -> anyhow::Result<ExitCode> {
    let port: PortType = port_type.parse()?;
    let value =
        read_port(conn, port, index).with_context(|| format!("reading {port}[{index}]"))?;
    match (value, status) {
        (PortValue::Bool(on), true) => Ok(ExitCode::from(u8::from(on))),
        (PortValue::Int(_), true) => Err(WebCtlError::InvalidArgument(
            format!("--status needs a boolean port, {port} holds integers").into(),
        )
        .into()),
        (PortValue::Bool(on), false) => {
            println!("{}", u8::from(on));
            Ok(ExitCode::SUCCESS)
        }
        (PortValue::Int(value), false) => {
            println!("{value}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

pub fn run_write(
    conn: &Connection,
    port_type: &str,
    index: u32,
    value: i64,
    check: bool,
) -> anyhow::Result<ExitCode> {
    let port: PortType = port_type.parse()?;
    if !check {
        io_write(conn, port, index, value)
            .with_context(|| format!("writing {port}[{index}]"))?;
        return Ok(ExitCode::SUCCESS);
    }
    let confirmed = io_write_checked(conn, port, index, value)
        .with_context(|| format!("writing {port}[{index}]"))?;
    if confirmed {
        println!("{}", style::success("true"));
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", style::warning("false"));
        Ok(ExitCode::FAILURE)
    }
}
