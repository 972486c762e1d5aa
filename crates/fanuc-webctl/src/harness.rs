//! In-memory controller stand-in for tests.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::{Result, WebCtlError};
use crate::transport::{FtpTarget, HttpRequest, HttpResponse, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Get {
        request_line: String,
        authenticated: bool,
    },
    Upload {
        path: String,
        contents: Vec<u8>,
    },
    Download {
        path: String,
    },
    Delete {
        path: String,
    },
}

#[derive(Debug, Default)]
struct MockState {
    routes: Vec<(String, HttpResponse)>,
    files: HashMap<String, Vec<u8>>,
    calls: Vec<TransportCall>,
    offline: bool,
}

/// Canned controller responses plus a log of every call made.
///
/// A GET is answered by the most recently registered route whose pattern
/// occurs in the request line (`/KCL/show progs`,
/// `/td:/scalar_var.stm?_reqvar=$NUMREG[1]`, ...); unmatched requests get a
/// 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn on_get(&self, pattern: &str, response: HttpResponse) -> &Self {
        self.state().routes.push((pattern.to_string(), response));
        self
    }

    /// Answer scalar reads of `name` the way the `scalar_var` helper renders
    /// them.
    pub fn on_scalar(&self, name: &str, value: &str) -> &Self {
        let mut object = serde_json::Map::new();
        object.insert(
            name.to_uppercase(),
            serde_json::Value::String(value.to_string()),
        );
        let body = serde_json::Value::Object(object).to_string();
        self.on_get(&format!("scalar_var.stm?_reqvar={name}"), HttpResponse::ok(body))
    }

    pub fn on_raw(&self, name: &str, text: &str) -> &Self {
        self.on_get(&format!("raw_var.stm?_reqvar={name}"), HttpResponse::ok(text))
    }

    /// Answer `KCL/<cmd>` with `output` wrapped in the usual XMP block.
    pub fn on_kcl(&self, cmd: &str, output: &str) -> &Self {
        let body = format!("<HTML><BODY><XMP>{output}</XMP></BODY></HTML>");
        self.on_get(&format!("/KCL/{cmd}"), HttpResponse::ok(body))
    }

    pub fn put_file(&self, path: &str, contents: &[u8]) -> &Self {
        self.state().files.insert(path.to_string(), contents.to_vec());
        self
    }

    /// Make every following call fail as if the controller were unreachable.
    pub fn go_offline(&self) -> &Self {
        self.state().offline = true;
        self
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.state().calls.clone()
    }

    pub fn get_requests(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::Get { request_line, .. } => Some(request_line.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn uploaded_paths(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::Upload { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state().files.get(path).cloned()
    }

    fn record(&self, call: TransportCall) -> Result<()> {
        let mut state = self.state();
        state.calls.push(call);
        if state.offline {
            return Err(WebCtlError::Connection("controller unreachable".into()));
        }
        Ok(())
    }
}

impl Transport for MockTransport {
    fn get(&self, request: &HttpRequest<'_>) -> Result<HttpResponse> {
        let request_line = request.request_line();
        self.record(TransportCall::Get {
            request_line: request_line.clone(),
            authenticated: request.auth.is_some(),
        })?;
        let state = self.state();
        Ok(state
            .routes
            .iter()
            .rev()
            .find(|(pattern, _)| request_line.contains(pattern.as_str()))
            .map_or_else(
                || HttpResponse::new(404, "not found"),
                |(_, response)| response.clone(),
            ))
    }

    fn upload(&self, _target: &FtpTarget<'_>, path: &str, contents: &[u8]) -> Result<()> {
        self.record(TransportCall::Upload {
            path: path.to_string(),
            contents: contents.to_vec(),
        })?;
        self.state().files.insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    fn download(&self, _target: &FtpTarget<'_>, path: &str) -> Result<Vec<u8>> {
        self.record(TransportCall::Download {
            path: path.to_string(),
        })?;
        self.state()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| {
                WebCtlError::Connection(format!("ftp RETR {path}: 550 not found").into())
            })
    }

    fn delete(&self, _target: &FtpTarget<'_>, path: &str) -> Result<()> {
        self.record(TransportCall::Delete {
            path: path.to_string(),
        })?;
        self.state().files.remove(path);
        Ok(())
    }
}

/// Session over `mock` whose helpers count as already present.
pub fn connection(mock: &Arc<MockTransport>) -> Connection {
    let config = ClientConfig::new("robot").with_skip_helper_upload(true);
    Connection::new(&config, mock.clone())
}
