//! Jog, tool and user frames.

#![allow(missing_docs)]

use crate::connection::Connection;
use crate::error::{ensure_in_range, Result, WebCtlError};
use crate::parsing::parse_position;
use crate::registers::{MAX_GROUP, MIN_GROUP};
use crate::types::{Pose, Position};
use crate::variables::{get_scalar_var, get_var_raw, parse_int};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Tool,
    Jog,
    User,
}

impl FrameKind {
    fn max_index(self) -> u32 {
        match self {
            Self::Jog => 5,
            Self::Tool | Self::User => 10,
        }
    }

    fn index_label(self) -> &'static str {
        match self {
            Self::Tool => "tool frame idx",
            Self::Jog => "jog frame idx",
            Self::User => "user frame idx",
        }
    }

    /// Second index into `SETUP_DATA`.
    fn setup_slot(self) -> u32 {
        match self {
            Self::Tool => 1,
            Self::Jog => 2,
            Self::User => 3,
        }
    }

    fn frame_var(self, group: u32, idx: u32) -> String {
        match self {
            Self::Tool => format!("[*SYSTEM*]$MNUTOOL[{group},{idx}]"),
            Self::Jog => format!("[TPFDEF]JOGFRAMES[{group},{idx}]"),
            Self::User => format!("[*SYSTEM*]$MNUFRAME[{group},{idx}]"),
        }
    }

    fn active_var(self, group: u32) -> String {
        match self {
            Self::Tool => format!("[*SYSTEM*]$MNUTOOLNUM[{group}]"),
            Self::Jog => format!("[TPFDEF]JOGFRAMNUM[{group}]"),
            Self::User => format!("[*SYSTEM*]$MNUFRAMENUM[{group}]"),
        }
    }
}

/// Frame `idx` of `group`, with its comment when `include_comment` is set.
pub fn get_frame(
    conn: &Connection,
    kind: FrameKind,
    idx: u32,
    group: u32,
    include_comment: bool,
) -> Result<(Position, Option<String>)> {
    ensure_in_range("group id", group, MIN_GROUP, MAX_GROUP)?;
    ensure_in_range(kind.index_label(), idx, 1, kind.max_index())?;
    let varname = kind.frame_var(group, idx);
    let text = get_var_raw(conn, &varname)?;
    let frame = match parse_position(&text) {
        Ok(Pose::Cartesian(pos)) => pos,
        Ok(Pose::Joint(_)) => {
            return Err(WebCtlError::Protocol(
                format!("'{varname}' holds a joint position").into(),
            ));
        }
        Err(err) => {
            return Err(WebCtlError::Protocol(
                format!("could not match value returned for '{varname}': {err}").into(),
            ));
        }
    };
    let comment = if include_comment {
        let varname = format!(
            "[TPFDEF]SETUP_DATA[{group},{},{idx}].$COMMENT",
            kind.setup_slot()
        );
        Some(get_scalar_var(conn, &varname)?)
    } else {
        None
    };
    Ok((frame, comment))
}

pub fn get_jogframe(
    conn: &Connection,
    idx: u32,
    group: u32,
    include_comment: bool,
) -> Result<(Position, Option<String>)> {
    get_frame(conn, FrameKind::Jog, idx, group, include_comment)
}

pub fn get_toolframe(
    conn: &Connection,
    idx: u32,
    group: u32,
    include_comment: bool,
) -> Result<(Position, Option<String>)> {
    get_frame(conn, FrameKind::Tool, idx, group, include_comment)
}

pub fn get_userframe(
    conn: &Connection,
    idx: u32,
    group: u32,
    include_comment: bool,
) -> Result<(Position, Option<String>)> {
    get_frame(conn, FrameKind::User, idx, group, include_comment)
}

/// Index of the frame currently selected for `group`.
pub fn get_active_frame(conn: &Connection, kind: FrameKind, group: u32) -> Result<i64> {
    ensure_in_range("group id", group, MIN_GROUP, MAX_GROUP)?;
    parse_int(&get_scalar_var(conn, &kind.active_var(group))?)
}

pub fn get_active_jogframe(conn: &Connection, group: u32) -> Result<i64> {
    get_active_frame(conn, FrameKind::Jog, group)
}

pub fn get_active_toolframe(conn: &Connection, group: u32) -> Result<i64> {
    get_active_frame(conn, FrameKind::Tool, group)
}

pub fn get_active_userframe(conn: &Connection, group: u32) -> Result<i64> {
    get_active_frame(conn, FrameKind::User, group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{self, MockTransport};

    const FRAME: &str = "\r\n  Group: 1   Config: N D B, 0, 0, 0\r\n  X:      0.000   Y:      0.000   Z:    150.000\r\n  W:      0.000   P:      0.000   R:      0.000\r\n";

    #[test]
    fn reads_frame_with_comment() {
        let mock = MockTransport::new();
        mock.on_raw("[*SYSTEM*]$MNUTOOL[1,2]", FRAME);
        mock.on_scalar("[TPFDEF]SETUP_DATA[1,1,2].$COMMENT", "gripper");
        let conn = harness::connection(&mock);
        let (frame, comment) = get_toolframe(&conn, 2, 1, true).expect("tool frame");
        assert_eq!(frame.z, 150.0);
        assert!(!frame.config.up);
        assert_eq!(comment.as_deref(), Some("gripper"));
    }

    #[test]
    fn comment_is_only_read_on_request() {
        let mock = MockTransport::new();
        mock.on_raw("[TPFDEF]JOGFRAMES[2,5]", FRAME);
        let conn = harness::connection(&mock);
        let (_, comment) = get_jogframe(&conn, 5, 2, false).expect("jog frame");
        assert!(comment.is_none());
        assert_eq!(mock.get_requests().len(), 1);
    }

    #[test]
    fn active_frames_are_integers() {
        let mock = MockTransport::new();
        mock.on_scalar("[*SYSTEM*]$MNUFRAMENUM[1]", "3");
        mock.on_scalar("[TPFDEF]JOGFRAMNUM[1]", "0");
        let conn = harness::connection(&mock);
        assert_eq!(get_active_userframe(&conn, 1).expect("uframe"), 3);
        assert_eq!(get_active_jogframe(&conn, 1).expect("jframe"), 0);
    }

    #[test]
    fn bounds_are_checked_before_io() {
        let mock = MockTransport::new();
        let conn = harness::connection(&mock);
        for (kind, max) in [
            (FrameKind::Jog, 5),
            (FrameKind::Tool, 10),
            (FrameKind::User, 10),
        ] {
            assert!(matches!(
                get_frame(&conn, kind, max + 1, 1, false),
                Err(WebCtlError::OutOfRange { .. })
            ));
            assert!(get_frame(&conn, kind, 0, 1, false).is_err());
            assert!(get_frame(&conn, kind, 1, 9, false).is_err());
            assert!(get_frame(&conn, kind, 1, 0, false).is_err());
        }
        assert!(get_active_toolframe(&conn, 9).is_err());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn out_of_range_message_names_frame_kind() {
        let mock = MockTransport::new();
        let conn = harness::connection(&mock);
        let err = get_jogframe(&conn, 6, 1, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "requested jog frame idx invalid (must be between 1 and 5, got: 6)"
        );
    }
}
