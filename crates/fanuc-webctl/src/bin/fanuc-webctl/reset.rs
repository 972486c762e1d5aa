//! `reset`: clear active faults.

use std::process::ExitCode;

use fanuc_webctl::controller::{is_faulted, reset};
use fanuc_webctl::Connection;

use crate::style;

pub fn run_reset(conn: &Connection, verify: bool) -> anyhow::Result<ExitCode> {
    reset(conn)?;
    if !verify {
        return Ok(ExitCode::SUCCESS);
    }
    if is_faulted(conn)? {
        eprintln!("{}", style::warning("controller is still faulted"));
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
