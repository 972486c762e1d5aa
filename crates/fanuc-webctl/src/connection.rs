//! Session state shared by every operation.

#![allow(missing_docs)]

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use smol_str::SmolStr;

use crate::config::{ClientConfig, Credentials};
use crate::error::{Result, WebCtlError};
use crate::helpers;
use crate::transport::{FtpTarget, NetTransport, Transport};

/// An open session with one controller.
///
/// Holds no controller state besides whether the helper templates have been
/// uploaded; every operation re-reads what it needs from the controller.
#[derive(Clone)]
pub struct Connection {
    host: SmolStr,
    base_path: SmolStr,
    helpers_uploaded: bool,
    skip_helper_upload: bool,
    request_timeout: Duration,
    ftp_port: u16,
    kcl_auth: Option<Credentials>,
    karel_auth: Option<Credentials>,
    ftp_auth: Option<Credentials>,
    transport: Arc<dyn Transport>,
}

impl Connection {
    /// Build a session without contacting the controller.
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            host: config.host.clone(),
            base_path: config.base_path(),
            helpers_uploaded: false,
            skip_helper_upload: config.skip_helper_upload,
            request_timeout: config.request_timeout,
            ftp_port: config.ftp_port,
            kcl_auth: config.kcl_auth.clone(),
            karel_auth: config.karel_auth.clone(),
            ftp_auth: config.ftp_auth.clone(),
            transport,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn helpers_uploaded(&self) -> bool {
        self.helpers_uploaded
    }

    pub fn skip_helper_upload(&self) -> bool {
        self.skip_helper_upload
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn kcl_auth(&self) -> Option<&Credentials> {
        self.kcl_auth.as_ref()
    }

    pub fn karel_auth(&self) -> Option<&Credentials> {
        self.karel_auth.as_ref()
    }

    pub fn ftp_auth(&self) -> Option<&Credentials> {
        self.ftp_auth.as_ref()
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn ftp_target(&self) -> FtpTarget<'_> {
        FtpTarget {
            host: &self.host,
            port: self.ftp_port,
            auth: self.ftp_auth.as_ref(),
            timeout: self.request_timeout,
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.host, path.trim_start_matches('/'))
    }

    pub(crate) fn mark_helpers_uploaded(&mut self) {
        self.helpers_uploaded = true;
    }

    /// Fail unless the helper templates are usable for this session.
    pub fn ensure_helpers(&self) -> Result<()> {
        if self.helpers_uploaded || self.skip_helper_upload {
            return Ok(());
        }
        Err(WebCtlError::HelpersNotUploaded)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("base_path", &self.base_path)
            .field("helpers_uploaded", &self.helpers_uploaded)
            .field("skip_helper_upload", &self.skip_helper_upload)
            .field("request_timeout", &self.request_timeout)
            .field("ftp_port", &self.ftp_port)
            .field("kcl_auth", &self.kcl_auth)
            .field("karel_auth", &self.karel_auth)
            .field("ftp_auth", &self.ftp_auth)
            .finish_non_exhaustive()
    }
}

/// Open a session over the network and upload the helpers unless the
/// configuration asks to skip that.
pub fn connect(config: &ClientConfig) -> Result<Connection> {
    connect_with(config, Arc::new(NetTransport))
}

pub fn connect_with(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Connection> {
    if config.host.trim().is_empty() {
        return Err(WebCtlError::InvalidArgument("host must not be empty".into()));
    }
    let mut conn = Connection::new(config, transport);
    if !conn.skip_helper_upload {
        helpers::upload_helpers(&mut conn, false)?;
    }
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::MockTransport;

    #[test]
    fn connect_uploads_helpers_once() {
        let mock = MockTransport::new();
        let conn = connect_with(&ClientConfig::new("robot"), mock.clone()).expect("connect");
        assert!(conn.helpers_uploaded());
        assert_eq!(
            mock.uploaded_paths(),
            vec!["/td:/scalar_var.stm".to_string(), "/td:/raw_var.stm".to_string()]
        );
    }

    #[test]
    fn skipping_upload_performs_no_ftp_calls() {
        let mock = MockTransport::new();
        let config = ClientConfig::new("robot").with_skip_helper_upload(true);
        let conn = connect_with(&config, mock.clone()).expect("connect");
        assert!(!conn.helpers_uploaded());
        assert!(conn.ensure_helpers().is_ok());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn fresh_connection_without_skip_requires_helpers() {
        let mock = MockTransport::new();
        let conn = Connection::new(&ClientConfig::new("robot"), mock);
        assert!(matches!(
            conn.ensure_helpers(),
            Err(WebCtlError::HelpersNotUploaded)
        ));
    }

    #[test]
    fn empty_host_is_rejected_before_io() {
        let mock = MockTransport::new();
        let err = connect_with(&ClientConfig::new(" "), mock.clone()).unwrap_err();
        assert!(matches!(err, WebCtlError::InvalidArgument(_)));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn url_joins_host_and_path() {
        let conn = Connection::new(&ClientConfig::new("10.0.0.5:8080"), MockTransport::new());
        assert_eq!(conn.url("/KCL/reset"), "http://10.0.0.5:8080/KCL/reset");
        assert_eq!(conn.url("td:/raw_var.stm"), "http://10.0.0.5:8080/td:/raw_var.stm");
    }
}
