//! Per motion group state: identity, jog flag, payloads and current pose.

#![allow(missing_docs)]

use tracing::warn;

use crate::connection::Connection;
use crate::error::{ensure_in_range, Result, WebCtlError};
use crate::parsing::parse_position;
use crate::protocol::{exec_kcl, exec_kcl_wait};
use crate::registers::{MAX_GROUP, MIN_GROUP};
use crate::types::{PayloadSchedule, Pose};
use crate::variables::{get_scalar_var, parse_bool, parse_real};

const MAX_PAYLOAD_GROUP: u32 = 5;
const MAX_PAYLOAD_IDX: u32 = 10;
const UNINITIALIZED: &str = "Uninitialized";

fn ensure_group(group: u32) -> Result<()> {
    ensure_in_range("group id", group, MIN_GROUP, MAX_GROUP)
}

pub fn was_jogged(conn: &Connection, group: u32) -> Result<bool> {
    ensure_group(group)?;
    parse_bool(&get_scalar_var(conn, &format!("$MOR_GRP[{group}].$JOGGED"))?)
}

pub fn get_robot_id(conn: &Connection, group: u32) -> Result<String> {
    ensure_group(group)?;
    get_scalar_var(conn, &format!("$SCR_GRP[{group}].$ROBOT_ID"))
}

pub fn get_robot_model(conn: &Connection, group: u32) -> Result<String> {
    ensure_group(group)?;
    get_scalar_var(conn, &format!("$SCR_GRP[{group}].$ROBOT_MODEL"))
}

/// Payload schedule `idx` of `group`, read one field at a time.
pub fn get_payload(conn: &Connection, idx: u32, group: u32) -> Result<PayloadSchedule> {
    ensure_in_range("group id", group, MIN_GROUP, MAX_PAYLOAD_GROUP)?;
    ensure_in_range("payload idx", idx, 1, MAX_PAYLOAD_IDX)?;
    let base = format!("$PLST_GRP{group}[{idx}]");
    let field = |name: &str| get_scalar_var(conn, &format!("{base}.${name}"));
    let real = |name: &str| field(name).and_then(|text| parse_real(&text));

    let comment = field("COMMENT")?;
    Ok(PayloadSchedule {
        comment: (comment != UNINITIALIZED).then_some(comment),
        payload: real("PAYLOAD")?,
        payload_x: real("PAYLOAD_X")?,
        payload_y: real("PAYLOAD_Y")?,
        payload_z: real("PAYLOAD_Z")?,
        payload_ix: real("PAYLOAD_IX")?,
        payload_iy: real("PAYLOAD_IY")?,
        payload_iz: real("PAYLOAD_IZ")?,
    })
}

/// Group KCL commands currently apply to.
pub fn get_default_group(conn: &Connection) -> Result<u32> {
    let output = exec_kcl_wait(conn, "show group")?;
    output
        .split(|c: char| !c.is_ascii_digit())
        .find(|token| !token.is_empty())
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| {
            WebCtlError::Protocol(
                format!("no group number in 'show group' output: '{}'", output.trim()).into(),
            )
        })
}

/// Current pose of `group` as reported by `show curpos`.
///
/// KCL reports the pose of its default group, so that is switched to
/// `group` first. With `restore_default_group` the previous default is read
/// beforehand and put back afterwards; failing to put it back is logged and
/// does not discard the pose.
pub fn get_current_pose(
    conn: &Connection,
    group: u32,
    restore_default_group: bool,
) -> Result<Pose> {
    ensure_group(group)?;
    let previous = if restore_default_group {
        Some(get_default_group(conn)?)
    } else {
        None
    };
    exec_kcl(conn, &format!("set group {group}"))?;
    let pose = exec_kcl_wait(conn, "show curpos").and_then(|text| parse_position(&text));
    if let Some(previous) = previous.filter(|previous| *previous != group) {
        if let Err(err) = exec_kcl(conn, &format!("set group {previous}")) {
            warn!("could not restore default group {previous} on {}: {err}", conn.host());
        }
    }
    pose
}
