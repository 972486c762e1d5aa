//! `info`: controller overview.

use std::process::ExitCode;

use anyhow::Context;
use fanuc_webctl::controller::{
    get_application, get_clock, get_controller_series, get_general_override, get_num_groups,
    get_system_software_version, in_auto_mode, in_remote_mode, is_e_stopped, is_faulted,
    is_program_paused, is_program_running, list_errors, list_programs, tp_enabled,
};
use fanuc_webctl::group::{get_payload, get_robot_id, get_robot_model};
use fanuc_webctl::registers::get_numreg;
use fanuc_webctl::variables::get_scalar_var;
use fanuc_webctl::Connection;

use crate::style;

const SUMMARY_LEN: usize = 5;

pub fn run_info(conn: &Connection) -> anyhow::Result<ExitCode> {
    println!("{}", style::heading("Controller info:"));
    println!("  Time                  : {}", get_clock(conn)?);
    println!("  Series                : {}", get_controller_series(conn)?);
    println!("  Application           : {}", get_application(conn)?);
    println!("  Software version      : {}", get_system_software_version(conn)?);
    println!("  $FNO                  : {}", get_scalar_var(conn, "$FNO")?);

    println!();
    println!("{}", style::heading("Robot info:"));
    let num_groups = get_num_groups(conn)?;
    println!("  Number of groups      : {num_groups}");
    for group in 1..=u32::try_from(num_groups).unwrap_or(0) {
        println!("  Group {group}:");
        println!("    ID                  : {}", get_robot_id(conn, group)?);
        println!("    Model               : {}", get_robot_model(conn, group)?);
    }
    println!("  General override      : {}%", get_general_override(conn)?);

    println!();
    println!("{}", style::heading("Controller status:"));
    println!("  TP enabled            : {}", tp_enabled(conn)?);
    println!(
        "  In AUTO               : {}",
        in_auto_mode(conn).context("dmh_autom must be installed on the controller")?
    );
    println!("  In error              : {}", is_faulted(conn)?);
    println!("  E-stopped             : {}", is_e_stopped(conn)?);
    println!("  Remote mode           : {}", in_remote_mode(conn)?);
    println!("  Program running       : {}", is_program_running(conn)?);
    println!("  Program paused        : {}", is_program_paused(conn)?);

    println!();
    let numregs = (1_u32..)
        .take(SUMMARY_LEN)
        .map(|idx| get_numreg(conn, idx).map(|value| value.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    println!("First {SUMMARY_LEN} numregs         : {}", numregs.join(", "));

    let payload = get_payload(conn, 1, 1)?;
    println!(
        "Payload 1 in group 1    : {} kg at ({}, {}, {}) (inertia: {}, {}, {})",
        payload.payload,
        payload.payload_x,
        payload.payload_y,
        payload.payload_z,
        payload.payload_ix,
        payload.payload_iy,
        payload.payload_iz
    );

    let programs = list_programs(conn, &[])?
        .into_iter()
        .take(SUMMARY_LEN)
        .map(|program| format!("{}.{}", program.name, program.program_type))
        .collect::<Vec<_>>();
    println!("First {SUMMARY_LEN} programs     : {}", programs.join("; "));

    println!();
    println!("{}", style::heading(format!("{SUMMARY_LEN} most recent errors:")));
    for entry in list_errors(conn)?.iter().take(SUMMARY_LEN) {
        println!(
            "  {:15} {:7} {}",
            entry.timestamp, entry.level, entry.message
        );
    }
    Ok(ExitCode::SUCCESS)
}
