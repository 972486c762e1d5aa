//! Library error type.

#![allow(missing_docs)]

use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

/// Controller web resource a request was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Kcl,
    Karel,
    Stm,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kcl => "KCL",
            Self::Karel => "Karel",
            Self::Stm => "stm",
        })
    }
}

/// Failure the controller embedded in an otherwise well-formed variable or
/// port value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFault {
    BadVariable,
    UnknownVariable,
    UnknownPortType,
    IllegalPortNumber,
    NoPortsOfType,
}

impl fmt::Display for ValueFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BadVariable => "bad variable",
            Self::UnknownVariable => "unknown variable",
            Self::UnknownPortType => "illegal port type identifier",
            Self::IllegalPortNumber => "illegal port number",
            Self::NoPortsOfType => "controller does not have ports of this type",
        })
    }
}

/// Failure reported by KCL in response to `set port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortWriteFault {
    UnknownPortType,
    NoPortsOfType,
    IllegalPortNumber,
    ValueOutOfRange,
    Unrecognised,
}

impl fmt::Display for PortWriteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnknownPortType => "illegal port type identifier",
            Self::NoPortsOfType => "controller does not have ports of this type",
            Self::IllegalPortNumber => "illegal port number",
            Self::ValueOutOfRange => "value out of range",
            Self::Unrecognised => "unrecognised error trying to set port",
        })
    }
}

/// Broad error category, used by callers that only need to know who is at
/// fault (the caller, the network, the credentials, the protocol or the
/// controller).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Connectivity,
    Authentication,
    Protocol,
    Domain,
}

#[derive(Debug, Error)]
pub enum WebCtlError {
    #[error("invalid argument: {0}")]
    InvalidArgument(SmolStr),
    #[error("requested {what} invalid (must be between {min} and {max}, got: {value})")]
    OutOfRange {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("helpers not uploaded")]
    HelpersNotUploaded,
    #[error("invalid config: {0}")]
    InvalidConfig(SmolStr),
    #[error("connection error: {0}")]
    Connection(SmolStr),
    #[error("authentication failed ({0})")]
    Authentication(Resource),
    #[error("access is forbidden/locked ({0})")]
    LockedResource(Resource),
    #[error("unexpected result code from {resource}. Expected: {expected}, got: {actual}")]
    UnexpectedStatus {
        resource: Resource,
        expected: u16,
        actual: u16,
    },
    #[error("protocol error: {0}")]
    Protocol(SmolStr),
    #[error("could not read '{name}': {fault} ({message})")]
    Rejected {
        name: SmolStr,
        fault: ValueFault,
        message: SmolStr,
    },
    #[error("could not set port {port}: {fault}\n{response}")]
    PortWrite {
        port: SmolStr,
        fault: PortWriteFault,
        response: SmolStr,
    },
    #[error("controller error: {0}")]
    Controller(SmolStr),
}

impl WebCtlError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_)
            | Self::OutOfRange { .. }
            | Self::HelpersNotUploaded
            | Self::InvalidConfig(_) => ErrorKind::Usage,
            Self::Connection(_) => ErrorKind::Connectivity,
            Self::Authentication(_) | Self::LockedResource(_) => ErrorKind::Authentication,
            Self::UnexpectedStatus { .. } | Self::Protocol(_) => ErrorKind::Protocol,
            Self::Rejected { .. } | Self::PortWrite { .. } | Self::Controller(_) => {
                ErrorKind::Domain
            }
        }
    }
}

pub type Result<T, E = WebCtlError> = std::result::Result<T, E>;

/// Reject `value` unless it lies within `min..=max`.
pub(crate) fn ensure_in_range(what: &'static str, value: u32, min: u32, max: u32) -> Result<()> {
    if value < min || value > max {
        return Err(WebCtlError::OutOfRange {
            what,
            value: i64::from(value),
            min: i64::from(min),
            max: i64::from(max),
        });
    }
    Ok(())
}
