//! Server-side template helpers the controller's web server renders on
//! request.

#![allow(missing_docs)]

use tracing::info;

use crate::connection::Connection;
use crate::error::Result;

/// Renders `{ "<NAME>": "<value>" }` for the variable named in `_reqvar`.
pub const HLPR_SCALAR_VAR: &str = "scalar_var";
/// Renders the bare text dump of the variable named in `_reqvar`.
pub const HLPR_RAW_VAR: &str = "raw_var";
/// Query parameter both helpers read the variable name from.
pub const HLPR_VAR_PARAM: &str = "_reqvar";

pub const SCALAR_VAR_TEMPLATE: &[u8] =
    br#"{ "<!-- #ECHO var="_reqvar" -->": "<!-- #ECHO var="{_reqvar}" -->" }"#;
pub const RAW_VAR_TEMPLATE: &[u8] = br#"<!-- #ECHO var="{_reqvar}" -->"#;

/// Upload both helper templates to the session's base path.
///
/// Does nothing when they were already uploaded by this session, unless
/// `reupload` is set.
pub fn upload_helpers(conn: &mut Connection, reupload: bool) -> Result<()> {
    if conn.helpers_uploaded() && !reupload {
        return Ok(());
    }
    let target = conn.ftp_target();
    for (helper, contents) in [
        (HLPR_SCALAR_VAR, SCALAR_VAR_TEMPLATE),
        (HLPR_RAW_VAR, RAW_VAR_TEMPLATE),
    ] {
        let path = helper_path(conn.base_path(), helper);
        conn.transport().upload(&target, &path, contents)?;
    }
    info!("uploaded helpers to {}:/{}", conn.host(), conn.base_path());
    conn.mark_helpers_uploaded();
    Ok(())
}

/// Remove the helper templates from the controller.
pub fn remove_helpers(conn: &Connection) -> Result<()> {
    let target = conn.ftp_target();
    for helper in [HLPR_SCALAR_VAR, HLPR_RAW_VAR] {
        conn.transport()
            .delete(&target, &helper_path(conn.base_path(), helper))?;
    }
    Ok(())
}

fn helper_path(base_path: &str, helper: &str) -> String {
    format!("/{base_path}/{helper}.stm")
}
