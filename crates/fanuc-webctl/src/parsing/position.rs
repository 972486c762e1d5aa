//! Position blocks as printed by `show curpos` and the variable dumps of
//! position registers and frames.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{Result, WebCtlError};
use crate::types::{Config, JointPos, Pose, Position};

/// A field the controller cannot print in its column is rendered as `*`s.
const NUM: &str = r"-?(?:\d*\.\d+|\d+)|\*+";

const CARTESIAN: &str = concat!(
    r" *Group: (?P<group>\d+) +Config: (?P<flip>[FN]) (?P<up>[UD]) (?P<top>[TB]),",
    r" *(?P<t1>-?\d+), *(?P<t2>-?\d+), *(?P<t3>-?\d+)[ \t]*\r?\n",
    r" *X: *(?P<x>NUM) +Y: *(?P<y>NUM) +Z: *(?P<z>NUM)[ \t]*\r?\n",
    r" *W: *(?P<w>NUM) +P: *(?P<p>NUM) +R: *(?P<r>NUM)",
);

const JOINT: &str = concat!(
    r" *Group: (?P<jgroup>\d+)[ \t]*\r?\n",
    r" *(?P<axis>J1) = *(?P<j1>NUM) deg +J2 = *(?P<j2>NUM) deg +J3 = *(?P<j3>NUM) deg[ \t]*\r?\n",
    r" *J4 = *(?P<j4>NUM) deg +J5 = *(?P<j5>NUM) deg +J6 = *(?P<j6>NUM) deg",
);

fn position_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let source = format!("(?:{CARTESIAN})|(?:{JOINT})").replace("NUM", NUM);
        Regex::new(&source).expect("position pattern is valid")
    })
}

fn posreg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let source = format!(
            r"'(?P<comment>[^']*)'\s*(?:(?P<uninit>Uninitialized)|(?:{CARTESIAN})|(?:{JOINT}))"
        )
        .replace("NUM", NUM);
        Regex::new(&source).expect("posreg pattern is valid")
    })
}

/// Decode the first Cartesian or joint block in `text`.
pub fn parse_position(text: &str) -> Result<Pose> {
    let caps = position_pattern()
        .captures(text)
        .ok_or_else(|| WebCtlError::Protocol("could not match position block".into()))?;
    pose_from(&caps)
}

/// Decode a position register dump into its pose and comment.
///
/// An uninitialised register yields `(None, "")`.
pub fn parse_posreg(text: &str) -> Result<(Option<Pose>, String)> {
    let caps = posreg_pattern()
        .captures(text)
        .ok_or_else(|| WebCtlError::Protocol("could not match position register".into()))?;
    if caps.name("uninit").is_some() {
        return Ok((None, String::new()));
    }
    let comment = caps
        .name("comment")
        .map_or_else(String::new, |m| m.as_str().to_string());
    Ok((Some(pose_from(&caps)?), comment))
}

fn pose_from(caps: &Captures<'_>) -> Result<Pose> {
    if caps.name("axis").is_some() {
        return Ok(Pose::Joint(JointPos {
            j1: number(caps, "j1")?,
            j2: number(caps, "j2")?,
            j3: number(caps, "j3")?,
            j4: number(caps, "j4")?,
            j5: number(caps, "j5")?,
            j6: number(caps, "j6")?,
        }));
    }
    let config = Config {
        flip: text(caps, "flip")? == "F",
        up: text(caps, "up")? == "U",
        top: text(caps, "top")? == "T",
        turn_no1: turn(caps, "t1")?,
        turn_no2: turn(caps, "t2")?,
        turn_no3: turn(caps, "t3")?,
    };
    Ok(Pose::Cartesian(Position {
        config,
        x: number(caps, "x")?,
        y: number(caps, "y")?,
        z: number(caps, "z")?,
        w: number(caps, "w")?,
        p: number(caps, "p")?,
        r: number(caps, "r")?,
    }))
}

fn text<'t>(caps: &Captures<'t>, field: &str) -> Result<&'t str> {
    caps.name(field)
        .map(|m| m.as_str())
        .ok_or_else(|| WebCtlError::Protocol(format!("position is missing field '{field}'").into()))
}

fn number(caps: &Captures<'_>, field: &str) -> Result<f64> {
    let raw = text(caps, field)?;
    if raw.starts_with('*') {
        return Err(WebCtlError::Protocol(
            format!("position field '{field}' is out of display range ('{raw}')").into(),
        ));
    }
    raw.parse::<f64>().map_err(|err| {
        WebCtlError::Protocol(format!("position field '{field}' ('{raw}'): {err}").into())
    })
}

fn turn(caps: &Captures<'_>, field: &str) -> Result<i32> {
    let raw = text(caps, field)?;
    raw.parse::<i32>().map_err(|err| {
        WebCtlError::Protocol(format!("turn number '{field}' ('{raw}'): {err}").into())
    })
}
