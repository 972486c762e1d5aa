//! Comments and register values set through the controller's `ComSet`
//! Karel program (the backend of the web server's comment tool).

#![allow(missing_docs)]

use std::fmt;

use crate::connection::Connection;
use crate::error::{Result, WebCtlError};
use crate::protocol::exec_karel_prg_raw;
use crate::registers::ensure_register_index;

const COMSET_PRG: &str = "ComSet";

/// `sFc` values that update the comment of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CommentFuncCode {
    NumReg = 1,
    PosReg = 3,
    UserAlarm = 4,
    RobotIn = 6,
    RobotOut = 7,
    DigitalIn = 8,
    DigitalOut = 9,
    GroupIn = 10,
    GroupOut = 11,
    AnalogIn = 12,
    AnalogOut = 13,
    StrReg = 14,
    Flag = 19,
}

/// `sFc` values that update the value of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ValueFuncCode {
    NumReg = 2,
    /// Sets the alarm's severity.
    UserAlarm = 5,
    StrReg = 15,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComSetValue {
    Int(i64),
    Real(f64),
    Str(String),
}

impl ComSetValue {
    fn real_flag(&self) -> &'static str {
        match self {
            Self::Real(_) => "1",
            Self::Int(_) | Self::Str(_) => "-1",
        }
    }
}

impl fmt::Display for ComSetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value:?}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

/// Invoke `ComSet` for element `idx` of function code `fc`.
///
/// At least one of `val` and `comment` is required; an empty comment counts
/// as absent. When both are given only the comment is written.
pub fn comset(
    conn: &Connection,
    fc: u32,
    idx: u32,
    val: Option<&ComSetValue>,
    comment: Option<&str>,
) -> Result<()> {
    let comment = comment.filter(|c| !c.is_empty());
    let fc = fc.to_string();
    let idx = idx.to_string();
    let params: Vec<(&str, String)> = match (comment, val) {
        (Some(comment), _) => vec![
            ("sComment", comment.to_string()),
            ("sIndx", idx),
            ("sFc", fc),
        ],
        (None, Some(val)) => vec![
            ("sValue", val.to_string()),
            ("sIndx", idx),
            ("sRealFlag", val.real_flag().to_string()),
            ("sFc", fc),
        ],
        (None, None) => {
            return Err(WebCtlError::InvalidArgument(
                "need either val or comment".into(),
            ));
        }
    };
    let params = params
        .iter()
        .map(|(key, value)| (*key, value.as_str()))
        .collect::<Vec<_>>();
    exec_karel_prg_raw(conn, COMSET_PRG, &params)?;
    Ok(())
}

pub fn comset_val(conn: &Connection, fc: ValueFuncCode, idx: u32, val: &ComSetValue) -> Result<()> {
    comset(conn, fc as u32, idx, Some(val), None)
}

pub fn comset_cmt(conn: &Connection, fc: CommentFuncCode, idx: u32, comment: &str) -> Result<()> {
    comset(conn, fc as u32, idx, None, Some(comment))
}

pub fn cmt_numreg(conn: &Connection, idx: u32, comment: &str) -> Result<()> {
    ensure_register_index(idx)?;
    comset_cmt(conn, CommentFuncCode::NumReg, idx, comment)
}

pub fn cmt_posreg(conn: &Connection, idx: u32, comment: &str) -> Result<()> {
    ensure_register_index(idx)?;
    comset_cmt(conn, CommentFuncCode::PosReg, idx, comment)
}

pub fn cmt_din(conn: &Connection, idx: u32, comment: &str) -> Result<()> {
    comset_cmt(conn, CommentFuncCode::DigitalIn, idx, comment)
}

pub fn cmt_dout(conn: &Connection, idx: u32, comment: &str) -> Result<()> {
    comset_cmt(conn, CommentFuncCode::DigitalOut, idx, comment)
}

pub fn set_ualarm_severity(conn: &Connection, idx: u32, severity: i64) -> Result<()> {
    comset_val(conn, ValueFuncCode::UserAlarm, idx, &ComSetValue::Int(severity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{self, MockTransport};
    use crate::transport::HttpResponse;

    fn mock() -> std::sync::Arc<MockTransport> {
        let mock = MockTransport::new();
        mock.on_get("/KAREL/ComSet", HttpResponse::ok("<HTML>OK</HTML>"));
        mock
    }

    #[test]
    fn requires_value_or_comment_before_io() {
        let mock = mock();
        let conn = harness::connection(&mock);
        assert!(matches!(
            comset(&conn, 1, 1, None, None),
            Err(WebCtlError::InvalidArgument(_))
        ));
        assert!(matches!(
            comset(&conn, 1, 1, None, Some("")),
            Err(WebCtlError::InvalidArgument(_))
        ));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn zero_counts_as_a_value() {
        let mock = mock();
        let conn = harness::connection(&mock);
        comset_val(&conn, ValueFuncCode::NumReg, 3, &ComSetValue::Int(0)).expect("comset");
        assert_eq!(
            mock.get_requests(),
            vec!["/KAREL/ComSet?sValue=0&sIndx=3&sRealFlag=-1&sFc=2"]
        );
    }

    #[test]
    fn reals_set_the_real_flag() {
        let mock = mock();
        let conn = harness::connection(&mock);
        comset_val(&conn, ValueFuncCode::NumReg, 1, &ComSetValue::Real(2.5)).expect("comset");
        assert_eq!(
            mock.get_requests(),
            vec!["/KAREL/ComSet?sValue=2.5&sIndx=1&sRealFlag=1&sFc=2"]
        );
    }

    #[test]
    fn comment_wins_over_value() {
        let mock = mock();
        let conn = harness::connection(&mock);
        comset(&conn, 1, 7, Some(&ComSetValue::Int(5)), Some("part count")).expect("comset");
        assert_eq!(
            mock.get_requests(),
            vec!["/KAREL/ComSet?sComment=part count&sIndx=7&sFc=1"]
        );
    }

    #[test]
    fn wrappers_use_their_function_codes() {
        let mock = mock();
        let conn = harness::connection(&mock);
        cmt_posreg(&conn, 2, "home").expect("posreg");
        cmt_dout(&conn, 4, "gripper").expect("dout");
        set_ualarm_severity(&conn, 1, 6).expect("severity");
        assert_eq!(
            mock.get_requests(),
            vec![
                "/KAREL/ComSet?sComment=home&sIndx=2&sFc=3",
                "/KAREL/ComSet?sComment=gripper&sIndx=4&sFc=9",
                "/KAREL/ComSet?sValue=6&sIndx=1&sRealFlag=-1&sFc=5"
            ]
        );
    }

    #[test]
    fn register_comment_index_starts_at_one() {
        let mock = mock();
        let conn = harness::connection(&mock);
        assert!(matches!(
            cmt_numreg(&conn, 0, "x"),
            Err(WebCtlError::InvalidArgument(_))
        ));
        assert!(mock.calls().is_empty());
    }
}
