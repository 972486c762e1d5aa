//! Reading and writing controller variables by name.

#![allow(missing_docs)]

use std::fmt;

use crate::connection::Connection;
use crate::error::{Result, WebCtlError};
use crate::helpers::{HLPR_RAW_VAR, HLPR_SCALAR_VAR, HLPR_VAR_PARAM};
use crate::parsing::parse_scalar_json;
use crate::protocol::{exec_kcl, read_helper};

/// Controller's string rendering of a scalar variable.
pub fn get_scalar_var(conn: &Connection, name: &str) -> Result<String> {
    let body = read_helper(conn, HLPR_SCALAR_VAR, &[(HLPR_VAR_PARAM, name)])?;
    parse_scalar_json(&body, name)
}

/// Bare text dump of any variable, including multi-line structures.
pub fn get_var_raw(conn: &Connection, name: &str) -> Result<String> {
    read_helper(conn, HLPR_RAW_VAR, &[(HLPR_VAR_PARAM, name)])
}

/// `set var <name>=<value>` without waiting for the controller's answer.
pub fn set_scalar_var(conn: &Connection, name: &str, value: impl fmt::Display) -> Result<()> {
    exec_kcl(conn, &format!("set var {name}={value}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    Real,
    Str,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Real => "real",
            Self::Str => "string",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
}

impl ScalarValue {
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int(_) => ScalarKind::Int,
            Self::Real(_) => ScalarKind::Real,
            Self::Str(_) => ScalarKind::Str,
        }
    }
}

/// Formats values the way KCL `set var` accepts them.
impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value:?}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

/// Controller spelling of a boolean: `TRUE`/`FALSE`, `ON`/`OFF` or `1`/`0`.
pub fn parse_bool(text: &str) -> Result<bool> {
    match text.trim().to_uppercase().as_str() {
        "TRUE" | "ON" | "1" => Ok(true),
        "FALSE" | "OFF" | "0" => Ok(false),
        _ => Err(WebCtlError::Protocol(
            format!("expected a boolean, got '{}'", text.trim()).into(),
        )),
    }
}

pub fn parse_int(text: &str) -> Result<i64> {
    let text = text.trim();
    text.parse::<i64>().map_err(|err| {
        WebCtlError::Protocol(format!("expected an integer, got '{text}': {err}").into())
    })
}

pub fn parse_real(text: &str) -> Result<f64> {
    let text = text.trim();
    text.parse::<f64>().map_err(|err| {
        WebCtlError::Protocol(format!("expected a real, got '{text}': {err}").into())
    })
}

/// A named scalar variable with the type its value is decoded as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarVariable {
    pub name: String,
    pub kind: ScalarKind,
}

impl ScalarVariable {
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn read(&self, conn: &Connection) -> Result<ScalarValue> {
        let text = get_scalar_var(conn, &self.name)?;
        Ok(match self.kind {
            ScalarKind::Bool => ScalarValue::Bool(parse_bool(&text)?),
            ScalarKind::Int => ScalarValue::Int(parse_int(&text)?),
            ScalarKind::Real => ScalarValue::Real(parse_real(&text)?),
            ScalarKind::Str => ScalarValue::Str(text),
        })
    }

    pub fn write(&self, conn: &Connection, value: &ScalarValue) -> Result<()> {
        if value.kind() != self.kind {
            return Err(WebCtlError::InvalidArgument(
                format!(
                    "'{}' holds a {} value, got a {} value",
                    self.name,
                    self.kind,
                    value.kind()
                )
                .into(),
            ));
        }
        set_scalar_var(conn, &self.name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueFault;
    use crate::harness::{self, MockTransport};
    use crate::transport::HttpResponse;

    #[test]
    fn scalar_read_goes_through_helper() {
        let mock = MockTransport::new();
        mock.on_scalar("$MCR.$GENOVERRIDE", "75");
        let conn = harness::connection(&mock);
        assert_eq!(get_scalar_var(&conn, "$MCR.$GENOVERRIDE").expect("read"), "75");
        assert_eq!(
            mock.get_requests(),
            vec!["/td:/scalar_var.stm?_reqvar=$MCR.$GENOVERRIDE"]
        );
    }

    #[test]
    fn bad_variable_is_never_returned_as_data() {
        let mock = MockTransport::new();
        mock.on_scalar("$NOSUCHVAR", "Bad variable: $NOSUCHVAR");
        let conn = harness::connection(&mock);
        let err = get_scalar_var(&conn, "$NOSUCHVAR").unwrap_err();
        assert!(matches!(
            err,
            WebCtlError::Rejected {
                fault: ValueFault::BadVariable,
                ..
            }
        ));
    }

    #[test]
    fn raw_read_returns_body_verbatim() {
        let mock = MockTransport::new();
        mock.on_raw("$POSREG[1,1]", "'' Uninitialized\r\n");
        let conn = harness::connection(&mock);
        assert_eq!(
            get_var_raw(&conn, "$POSREG[1,1]").expect("raw"),
            "'' Uninitialized\r\n"
        );
    }

    #[test]
    fn typed_read_decodes_kind() {
        let mock = MockTransport::new();
        mock.on_scalar("$MOR_GRP[1].$JOGGED", "FALSE");
        mock.on_scalar("$SCR.$NUM_GROUP", "2");
        mock.on_scalar("$NUMREG[3]", "1.5");
        let conn = harness::connection(&mock);
        let read = |name: &str, kind| ScalarVariable::new(name, kind).read(&conn).expect("read");
        assert_eq!(read("$MOR_GRP[1].$JOGGED", ScalarKind::Bool), ScalarValue::Bool(false));
        assert_eq!(read("$SCR.$NUM_GROUP", ScalarKind::Int), ScalarValue::Int(2));
        assert_eq!(read("$NUMREG[3]", ScalarKind::Real), ScalarValue::Real(1.5));
    }

    #[test]
    fn typed_write_rejects_kind_mismatch_before_io() {
        let mock = MockTransport::new();
        let conn = harness::connection(&mock);
        let var = ScalarVariable::new("$MCR.$GENOVERRIDE", ScalarKind::Int);
        let err = var.write(&conn, &ScalarValue::Str("fast".into())).unwrap_err();
        assert!(matches!(err, WebCtlError::InvalidArgument(_)));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn typed_write_formats_for_kcl() {
        let mock = MockTransport::new();
        mock.on_get("/KCLDO/set var", HttpResponse::no_content());
        let conn = harness::connection(&mock);
        ScalarVariable::new("$A", ScalarKind::Bool)
            .write(&conn, &ScalarValue::Bool(true))
            .expect("write bool");
        ScalarVariable::new("$B", ScalarKind::Real)
            .write(&conn, &ScalarValue::Real(2.0))
            .expect("write real");
        assert_eq!(
            mock.get_requests(),
            vec!["/KCLDO/set var $A=TRUE", "/KCLDO/set var $B=2.0"]
        );
    }

    #[test]
    fn bool_spellings() {
        for text in ["TRUE", "on", " 1 "] {
            assert!(parse_bool(text).expect("bool"));
        }
        for text in ["false", "OFF", "0"] {
            assert!(!parse_bool(text).expect("bool"));
        }
        assert!(parse_bool("maybe").is_err());
    }
}
