#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread;

use tiny_http::{Response, Server};

/// What the loopback controller saw for one request.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    /// Percent-decoded path and query.
    pub target: String,
    pub authorization: Option<String>,
}

type Route = (String, u16, String);

/// HTTP server on 127.0.0.1 answering with canned responses.
///
/// A request is answered by the last registered route whose pattern is a
/// substring of the decoded request target; anything else gets a 404.
pub struct LoopbackController {
    pub host: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl LoopbackController {
    pub fn start(routes: &[(&str, u16, &str)]) -> Self {
        let server = Server::http("127.0.0.1:0").expect("bind loopback server");
        let addr = server.server_addr().to_ip().expect("ip listener");
        let routes: Vec<Route> = routes
            .iter()
            .map(|(pattern, status, body)| ((*pattern).to_string(), *status, (*body).to_string()))
            .collect();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        thread::spawn(move || {
            for request in server.incoming_requests() {
                let target = percent_encoding::percent_decode_str(request.url())
                    .decode_utf8_lossy()
                    .into_owned();
                let authorization = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Authorization"))
                    .map(|header| header.value.as_str().to_string());
                log.lock().expect("request log").push(SeenRequest {
                    target: target.clone(),
                    authorization,
                });
                let (status, body) = routes
                    .iter()
                    .rev()
                    .find(|(pattern, _, _)| target.contains(pattern.as_str()))
                    .map_or((404, String::from("not found")), |(_, status, body)| {
                        (*status, body.clone())
                    });
                let response = Response::from_string(body).with_status_code(status);
                let _ = request.respond(response);
            }
        });
        Self {
            host: addr.to_string(),
            seen,
        }
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("request log").clone()
    }
}

/// Wrap KCL output the way the controller's web server renders it.
pub fn kcl_page(output: &str) -> String {
    format!("<HTML><BODY><XMP>{output}</XMP></BODY></HTML>")
}

/// Address nothing is listening on.
pub fn closed_host() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    addr.to_string()
}
