//! Send/receive primitives for the controller's HTTP and FTP servers.
//!
//! Every call opens its own connection; nothing is pooled or retried.

#![allow(missing_docs)]

use std::io::Cursor;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use suppaftp::types::FileType;
use suppaftp::FtpStream;
use tracing::debug;

use crate::config::Credentials;
use crate::error::{Result, WebCtlError};

pub const HTTP_OK: u16 = 200;
pub const HTTP_NO_CONTENT: u16 = 204;
pub const HTTP_UNAUTHORIZED: u16 = 401;
pub const HTTP_FORBIDDEN: u16 = 403;

const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub auth: Option<&'a Credentials>,
    pub timeout: Duration,
}

impl HttpRequest<'_> {
    /// Path and query as plain text, e.g. `/KCL/show progs` or
    /// `/td:/scalar_var.stm?_reqvar=$NUMREG[1]`.
    #[must_use]
    pub fn request_line(&self) -> String {
        let path = self
            .url
            .split_once("://")
            .and_then(|(_, rest)| rest.find('/').map(|idx| &rest[idx..]))
            .unwrap_or("/");
        let path = percent_encoding::percent_decode_str(path).decode_utf8_lossy();
        if self.query.is_empty() {
            return path.into_owned();
        }
        let query = self
            .query
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{path}?{query}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(HTTP_OK, body)
    }

    #[must_use]
    pub fn no_content() -> Self {
        Self::new(HTTP_NO_CONTENT, String::new())
    }
}

/// FTP server plus login for one transfer.
///
/// `host` is the controller address as used for HTTP; a port in it is
/// ignored in favour of `port`.
#[derive(Debug, Clone, Copy)]
pub struct FtpTarget<'a> {
    pub host: &'a str,
    pub port: u16,
    pub auth: Option<&'a Credentials>,
    pub timeout: Duration,
}

/// Capabilities the protocol layer consumes.
///
/// HTTP error statuses are returned as responses; only failures to reach the
/// server (DNS, refused connection, timeout) are errors.
pub trait Transport: Send + Sync {
    fn get(&self, request: &HttpRequest<'_>) -> Result<HttpResponse>;

    fn upload(&self, target: &FtpTarget<'_>, path: &str, contents: &[u8]) -> Result<()>;

    fn download(&self, target: &FtpTarget<'_>, path: &str) -> Result<Vec<u8>>;

    fn delete(&self, target: &FtpTarget<'_>, path: &str) -> Result<()>;
}

/// Blocking network transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetTransport;

impl Transport for NetTransport {
    fn get(&self, request: &HttpRequest<'_>) -> Result<HttpResponse> {
        let agent = ureq::AgentBuilder::new().timeout(request.timeout).build();
        let mut call = agent.get(&request.url);
        for (key, value) in &request.query {
            call = call.query(key, value);
        }
        if let Some(auth) = request.auth {
            call = call.set("Authorization", &basic_auth_header(auth));
        }
        let response = match call.call() {
            Ok(response) | Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(WebCtlError::Connection(
                    format!("GET {}: {err}", request.url).into(),
                ));
            }
        };
        let status = response.status();
        debug!("http GET {} status={status}", request.url);
        let body = response.into_string().map_err(|err| {
            WebCtlError::Connection(format!("read response from {}: {err}", request.url).into())
        })?;
        Ok(HttpResponse { status, body })
    }

    fn upload(&self, target: &FtpTarget<'_>, path: &str, contents: &[u8]) -> Result<()> {
        let mut ftp = open_ftp(target)?;
        let mut reader = Cursor::new(contents);
        let written = ftp
            .put_file(path, &mut reader)
            .map_err(|err| ftp_error("STOR", path, &err))?;
        debug!("ftp STOR {path} bytes={written}");
        close_ftp(ftp);
        Ok(())
    }

    fn download(&self, target: &FtpTarget<'_>, path: &str) -> Result<Vec<u8>> {
        let mut ftp = open_ftp(target)?;
        let buffer = ftp
            .retr_as_buffer(path)
            .map_err(|err| ftp_error("RETR", path, &err))?;
        let bytes = buffer.into_inner();
        debug!("ftp RETR {path} bytes={}", bytes.len());
        close_ftp(ftp);
        Ok(bytes)
    }

    fn delete(&self, target: &FtpTarget<'_>, path: &str) -> Result<()> {
        let mut ftp = open_ftp(target)?;
        ftp.rm(path).map_err(|err| ftp_error("DELE", path, &err))?;
        debug!("ftp DELE {path}");
        close_ftp(ftp);
        Ok(())
    }
}

#[must_use]
pub fn basic_auth_header(auth: &Credentials) -> String {
    let token = BASE64_STANDARD.encode(format!("{}:{}", auth.user, auth.password));
    format!("Basic {token}")
}

fn open_ftp(target: &FtpTarget<'_>) -> Result<FtpStream> {
    let addr = resolve_ftp_addr(target.host, target.port)?;
    let mut ftp = FtpStream::connect_timeout(addr, target.timeout).map_err(|err| {
        WebCtlError::Connection(format!("ftp connect {}: {err}", target.host).into())
    })?;
    let (user, password) = target
        .auth
        .map_or((ANONYMOUS, ANONYMOUS), |auth| (auth.user.as_str(), auth.password.as_str()));
    ftp.login(user, password)
        .map_err(|err| WebCtlError::Connection(format!("ftp login as '{user}': {err}").into()))?;
    ftp.transfer_type(FileType::Binary)
        .map_err(|err| WebCtlError::Connection(format!("ftp TYPE I: {err}").into()))?;
    Ok(ftp)
}

fn close_ftp(mut ftp: FtpStream) {
    // the transfer already succeeded; a failed QUIT only affects the server's bookkeeping
    if let Err(err) = ftp.quit() {
        debug!("ftp QUIT failed: {err}");
    }
}

/// Host part of `host`, dropping an HTTP port and IPv6 brackets.
fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map_or(rest, |(addr, _)| addr);
    }
    match host.split_once(':') {
        // a second colon means a bare IPv6 literal
        Some((name, port)) if !port.contains(':') => name,
        _ => host,
    }
}

fn resolve_ftp_addr(host: &str, port: u16) -> Result<SocketAddr> {
    (strip_port(host), port)
        .to_socket_addrs()
        .map_err(|err| WebCtlError::Connection(format!("resolve {host}: {err}").into()))?
        .next()
        .ok_or_else(|| WebCtlError::Connection(format!("resolve {host}: no addresses").into()))
}

fn ftp_error(command: &str, path: &str, err: &suppaftp::FtpError) -> WebCtlError {
    WebCtlError::Connection(format!("ftp {command} {path}: {err}").into())
}
