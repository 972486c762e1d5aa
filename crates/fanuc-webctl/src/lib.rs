//! Client for the web interfaces of Fanuc robot controllers.
//!
//! Controller state is read and written through KCL commands, Karel
//! programs, FTP and two small `.stm` templates that are uploaded to the
//! controller when a [`Connection`] is opened. Every operation is a free
//! function taking the connection explicitly and re-reads what it needs
//! from the controller.

#![warn(missing_docs)]

pub mod comset;
pub mod config;
pub mod connection;
pub mod controller;
pub mod error;
pub mod frames;
pub mod group;
pub mod harness;
pub mod helpers;
pub mod io;
pub mod options;
pub mod parsing;
pub mod protocol;
pub mod registers;
pub mod transport;
pub mod types;
pub mod variables;

pub use config::{ClientConfig, Credentials};
pub use connection::{connect, connect_with, Connection};
pub use controller::ControllerSeries;
pub use error::{ErrorKind, Result, WebCtlError};
pub use io::{IoState, PortType, PortValue};
pub use registers::Number;
pub use transport::{NetTransport, Transport};
pub use types::{
    Config, ErrorLogEntry, Feature, JointPos, PayloadSchedule, Pose, Position, ProgramEntry,
};
pub use variables::{ScalarKind, ScalarValue, ScalarVariable};
