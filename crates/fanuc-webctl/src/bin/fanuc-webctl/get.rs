//! `get`: print one scalar variable.

use std::process::ExitCode;

use anyhow::Context;
use fanuc_webctl::variables::get_scalar_var;
use fanuc_webctl::Connection;

pub fn run_get(conn: &Connection, variable: &str) -> anyhow::Result<ExitCode> {
    let value = get_scalar_var(conn, variable).with_context(|| format!("reading {variable}"))?;
    println!("{value}");
    Ok(ExitCode::SUCCESS)
}
