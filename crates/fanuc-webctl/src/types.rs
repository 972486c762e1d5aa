//! Value objects decoded from controller responses.

#![allow(missing_docs)]

use std::fmt;

use serde::Serialize;

/// Arm configuration disambiguating a Cartesian pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Config {
    /// `F`lip (true) or `N`o-flip (false).
    pub flip: bool,
    /// `U`p (true) or `D`own (false).
    pub up: bool,
    /// `T`op (true) or `B`ottom (false).
    pub top: bool,
    pub turn_no1: i32,
    pub turn_no2: i32,
    pub turn_no3: i32,
}

/// Cartesian pose: millimetres and degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub config: Config,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
    pub p: f64,
    pub r: f64,
}

/// Joint pose in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointPos {
    pub j1: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    pub j5: f64,
    pub j6: f64,
}

/// A register or frame holds exactly one of the two representations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Pose {
    Cartesian(Position),
    Joint(JointPos),
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cartesian(pos) => write!(
                f,
                "{} {} {}, {}, {}, {} X {:.3} Y {:.3} Z {:.3} W {:.3} P {:.3} R {:.3}",
                if pos.config.flip { 'F' } else { 'N' },
                if pos.config.up { 'U' } else { 'D' },
                if pos.config.top { 'T' } else { 'B' },
                pos.config.turn_no1,
                pos.config.turn_no2,
                pos.config.turn_no3,
                pos.x,
                pos.y,
                pos.z,
                pos.w,
                pos.p,
                pos.r
            ),
            Self::Joint(jp) => write!(
                f,
                "J1 {:.3} J2 {:.3} J3 {:.3} J4 {:.3} J5 {:.3} J6 {:.3}",
                jp.j1, jp.j2, jp.j3, jp.j4, jp.j5, jp.j6
            ),
        }
    }
}

/// One payload schedule (`PLST_GRP_T` without `ICONDISP`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadSchedule {
    pub comment: Option<String>,
    /// Mass in kg.
    pub payload: f64,
    pub payload_x: f64,
    pub payload_y: f64,
    pub payload_z: f64,
    pub payload_ix: f64,
    pub payload_iy: f64,
    pub payload_iz: f64,
}

/// A line of `errall.ls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorLogEntry {
    pub seq: u32,
    pub timestamp: String,
    pub message: String,
    pub detail: String,
    /// Empty when the controller did not report one.
    pub level: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramEntry {
    pub name: String,
    pub program_type: String,
}

/// An installed software option from `version.dg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub order_no: String,
    pub description: String,
}
