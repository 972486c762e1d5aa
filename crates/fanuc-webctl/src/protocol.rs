//! Requests against the controller's KCL, Karel and stm endpoints.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::connection::Connection;
use crate::error::{Resource, Result, WebCtlError};
use crate::parsing::parse_kcl_output;
use crate::transport::{
    HttpRequest, HttpResponse, HTTP_FORBIDDEN, HTTP_NO_CONTENT, HTTP_OK, HTTP_UNAUTHORIZED,
};

/// Characters escaped when a KCL command line is placed in the URL path.
const KCL_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const KCL_WAIT: &str = "KCL";
const KCL_NO_WAIT: &str = "KCLDO";
const KAREL: &str = "KAREL";
const KAREL_NOT_STARTED: &str = "Unable to run";

/// Toggles the header/footer the web server wraps around every page.
pub const WEB_HEADERS_VAR: &str = "$HTTP_CTRL.$ENAB_TEMPL";

fn send(
    conn: &Connection,
    resource: Resource,
    path: &str,
    query: &[(&str, &str)],
) -> Result<HttpResponse> {
    let auth = match resource {
        Resource::Kcl => conn.kcl_auth(),
        Resource::Karel => conn.karel_auth(),
        Resource::Stm => None,
    };
    let request = HttpRequest {
        url: conn.url(path),
        query: query
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect(),
        auth,
        timeout: conn.request_timeout(),
    };
    let response = conn.transport().get(&request)?;
    debug!(
        "{resource} GET {} status={}",
        request.request_line(),
        response.status
    );
    check_access(resource, response.status)?;
    Ok(response)
}

fn check_access(resource: Resource, status: u16) -> Result<()> {
    match status {
        HTTP_UNAUTHORIZED => Err(WebCtlError::Authentication(resource)),
        HTTP_FORBIDDEN => Err(WebCtlError::LockedResource(resource)),
        _ => Ok(()),
    }
}

fn expect_status(resource: Resource, expected: u16, response: &HttpResponse) -> Result<()> {
    if response.status == expected {
        return Ok(());
    }
    Err(WebCtlError::UnexpectedStatus {
        resource,
        expected,
        actual: response.status,
    })
}

/// Fetch a page rendered by the web server from the helper directory.
pub fn get_stm(conn: &Connection, page: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
    let path = format!("{}/{page}", conn.base_path());
    let response = send(conn, Resource::Stm, &path, query)?;
    expect_status(Resource::Stm, HTTP_OK, &response)?;
    Ok(response)
}

/// Render one of the uploaded helpers; `helper` is given without extension.
pub fn read_helper(conn: &Connection, helper: &str, query: &[(&str, &str)]) -> Result<String> {
    conn.ensure_helpers()?;
    if helper.to_lowercase().contains(".stm") {
        return Err(WebCtlError::InvalidArgument(
            format!("helper name includes extension ('{helper}')").into(),
        ));
    }
    Ok(get_stm(conn, &format!("{helper}.stm"), query)?.body)
}

fn kcl_path(mode: &str, cmd: &str) -> String {
    format!("{mode}/{}", utf8_percent_encode(cmd, KCL_PATH))
}

/// Run a KCL command without waiting for its output.
pub fn exec_kcl(conn: &Connection, cmd: &str) -> Result<()> {
    let response = send(conn, Resource::Kcl, &kcl_path(KCL_NO_WAIT, cmd), &[])?;
    expect_status(Resource::Kcl, HTTP_NO_CONTENT, &response)
}

/// Run a KCL command and return its output verbatim.
pub fn exec_kcl_wait(conn: &Connection, cmd: &str) -> Result<String> {
    let response = send(conn, Resource::Kcl, &kcl_path(KCL_WAIT, cmd), &[])?;
    expect_status(Resource::Kcl, HTTP_OK, &response)?;
    parse_kcl_output(&response.body)
}

fn run_karel(conn: &Connection, prg_name: &str, params: &[(&str, &str)]) -> Result<String> {
    if prg_name.to_lowercase().contains(".pc") {
        return Err(WebCtlError::InvalidArgument(
            format!("program name includes extension ('{prg_name}')").into(),
        ));
    }
    let response = send(conn, Resource::Karel, &format!("{KAREL}/{prg_name}"), params)?;
    expect_status(Resource::Karel, HTTP_OK, &response)?;
    if response.body.contains(KAREL_NOT_STARTED) {
        return Err(WebCtlError::Controller(
            format!("Karel program '{prg_name}' cannot be started on controller").into(),
        ));
    }
    Ok(response.body)
}

/// Run a Karel program that answers with a JSON document.
pub fn exec_karel_prg(
    conn: &Connection,
    prg_name: &str,
    params: &[(&str, &str)],
) -> Result<JsonValue> {
    let body = run_karel(conn, prg_name, params)?;
    serde_json::from_str(&body).map_err(|err| {
        WebCtlError::Protocol(
            format!("Karel program '{prg_name}' returned invalid JSON: {err}").into(),
        )
    })
}

/// Run a Karel program and return its response body untouched.
pub fn exec_karel_prg_raw(
    conn: &Connection,
    prg_name: &str,
    params: &[(&str, &str)],
) -> Result<String> {
    run_karel(conn, prg_name, params)
}

/// Download a file from the controller's FTP server.
pub fn get_file_as_bytes(conn: &Connection, path: &str) -> Result<Vec<u8>> {
    conn.transport().download(&conn.ftp_target(), path)
}

/// Download a text file, replacing invalid UTF-8.
pub fn get_file_as_string(conn: &Connection, path: &str) -> Result<String> {
    let bytes = get_file_as_bytes(conn, path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Stop the web server from wrapping responses in its header and footer.
pub fn disable_web_server_headers(conn: &Connection) -> Result<()> {
    exec_kcl(conn, &format!("set var {WEB_HEADERS_VAR}=0"))
}

/// Undo [`disable_web_server_headers`].
pub fn enable_web_server_headers(conn: &Connection) -> Result<()> {
    exec_kcl(conn, &format!("set var {WEB_HEADERS_VAR}=1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, Credentials};
    use crate::harness::{self, MockTransport, TransportCall};

    #[test]
    fn kcl_commands_are_percent_encoded_in_the_path() {
        assert_eq!(
            kcl_path("KCLDO", "set port DOUT [1] = 1"),
            "KCLDO/set%20port%20DOUT%20[1]%20=%201"
        );
        assert_eq!(kcl_path("KCL", "show var $MCR"), "KCL/show%20var%20$MCR");
    }

    #[test]
    fn fire_and_forget_expects_no_content() {
        let mock = MockTransport::new();
        mock.on_get("/KCLDO/reset", HttpResponse::no_content());
        let conn = harness::connection(&mock);
        exec_kcl(&conn, "reset").expect("reset");

        mock.on_get("/KCLDO/reset", HttpResponse::ok(""));
        let err = exec_kcl(&conn, "reset").unwrap_err();
        assert!(matches!(
            err,
            WebCtlError::UnexpectedStatus {
                resource: Resource::Kcl,
                expected: 204,
                actual: 200
            }
        ));
    }

    #[test]
    fn auth_failures_win_over_mode_checks() {
        let mock = MockTransport::new();
        mock.on_get("/KCLDO/reset", HttpResponse::new(401, ""));
        mock.on_get("/KCL/show clock", HttpResponse::new(403, ""));
        let conn = harness::connection(&mock);
        assert!(matches!(
            exec_kcl(&conn, "reset"),
            Err(WebCtlError::Authentication(Resource::Kcl))
        ));
        assert!(matches!(
            exec_kcl_wait(&conn, "show clock"),
            Err(WebCtlError::LockedResource(Resource::Kcl))
        ));
    }

    #[test]
    fn wait_mode_returns_xmp_contents() {
        let mock = MockTransport::new();
        mock.on_kcl("show clock", "\n12-JAN-21 10:00\n");
        let conn = harness::connection(&mock);
        assert_eq!(
            exec_kcl_wait(&conn, "show clock").expect("kcl"),
            "\n12-JAN-21 10:00\n"
        );
    }

    #[test]
    fn kcl_requests_carry_kcl_credentials_only() {
        let mock = MockTransport::new();
        mock.on_get("/KCLDO/reset", HttpResponse::no_content());
        mock.on_get("/KAREL/dmh_autom", HttpResponse::ok("{}"));
        let config = ClientConfig::new("robot")
            .with_skip_helper_upload(true)
            .with_kcl_auth(Credentials::new("kcl", "pw"));
        let conn = Connection::new(&config, mock.clone());
        exec_kcl(&conn, "reset").expect("reset");
        exec_karel_prg(&conn, "dmh_autom", &[]).expect("karel");
        let auth = mock
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Get { authenticated, .. } => Some(authenticated),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(auth, vec![true, false]);
    }

    #[test]
    fn karel_rejects_extension_before_io() {
        let mock = MockTransport::new();
        let conn = harness::connection(&mock);
        let err = exec_karel_prg(&conn, "ComSet.PC", &[]).unwrap_err();
        assert!(matches!(err, WebCtlError::InvalidArgument(_)));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn karel_not_started_is_a_controller_error() {
        let mock = MockTransport::new();
        mock.on_get(
            "/KAREL/dmh_autom",
            HttpResponse::ok("<HTML>Unable to run DMH_AUTOM</HTML>"),
        );
        let conn = harness::connection(&mock);
        assert!(matches!(
            exec_karel_prg(&conn, "dmh_autom", &[]),
            Err(WebCtlError::Controller(_))
        ));
    }

    #[test]
    fn karel_params_are_passed_as_query() {
        let mock = MockTransport::new();
        mock.on_get("/KAREL/ComSet", HttpResponse::ok("done"));
        let conn = harness::connection(&mock);
        let body = exec_karel_prg_raw(&conn, "ComSet", &[("sFc", "1"), ("sIndx", "5")])
            .expect("comset");
        assert_eq!(body, "done");
        assert_eq!(mock.get_requests(), vec!["/KAREL/ComSet?sFc=1&sIndx=5"]);
    }

    #[test]
    fn helper_reads_require_upload_and_bare_name() {
        let mock = MockTransport::new();
        let conn = Connection::new(&ClientConfig::new("robot"), mock.clone());
        assert!(matches!(
            read_helper(&conn, "scalar_var", &[]),
            Err(WebCtlError::HelpersNotUploaded)
        ));
        let conn = harness::connection(&mock);
        assert!(matches!(
            read_helper(&conn, "scalar_var.STM", &[]),
            Err(WebCtlError::InvalidArgument(_))
        ));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn stm_error_status_is_reported() {
        let mock = MockTransport::new();
        let conn = harness::connection(&mock);
        assert!(matches!(
            read_helper(&conn, "raw_var", &[("_reqvar", "$X")]),
            Err(WebCtlError::UnexpectedStatus {
                resource: Resource::Stm,
                actual: 404,
                ..
            })
        ));
    }

    #[test]
    fn web_headers_are_toggled_with_set_var() {
        let mock = MockTransport::new();
        mock.on_get("/KCLDO/set var", HttpResponse::no_content());
        let conn = harness::connection(&mock);
        disable_web_server_headers(&conn).expect("disable");
        enable_web_server_headers(&conn).expect("enable");
        assert_eq!(
            mock.get_requests(),
            vec![
                "/KCLDO/set var $HTTP_CTRL.$ENAB_TEMPL=0",
                "/KCLDO/set var $HTTP_CTRL.$ENAB_TEMPL=1"
            ]
        );
    }
}
