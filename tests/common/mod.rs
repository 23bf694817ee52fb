//! Shared test utilities for integration and E2E tests.
//!
//! Provides a configuration fixture and a minimal HTTP server that answers
//! the management API endpoints with canned JSON, so the CLI binary can be
//! run end to end without network access.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let server = FakeApi::start(|req| Reply::json(200, json!({})));
//! let fixture = TestFixture::new().with_config(&server.base_url());
//! ```

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use serde_json::Value;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;
    pub use serde_json::json;

    pub use super::{FakeApi, Reply, Request, TestFixture, BIKES_KEY, SOURCE_KEY};
}

pub const SOURCE_KEY: &str = "blt2e8819a463338e6b";
pub const BIKES_KEY: &str = "blt38fde950b30192d4";

/// A request received by the fake API.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    /// Path and query, e.g. `/v3/extensions?include_marketplace_extensions=true`.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }
}

/// A canned response.
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

type Handler = dyn Fn(&Request) -> Reply + Send + Sync;

/// HTTP/1.1 server on a loopback port, one request per connection.
pub struct FakeApi {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl FakeApi {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let handler: Arc<Handler> = Arc::new(handler);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let Some(request) = read_request(&mut stream) else {
                    continue;
                };
                let reply = handler(&request);
                seen.lock().unwrap().push(request);
                let _ = write_reply(&mut stream, &reply);
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/v3/", self.addr)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path() == path)
            .count()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find(&buf, b"\r\n\r\n") {
            break end;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| {
            let (k, v) = line.split_once(':')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(body_start + content_length);
    let body = String::from_utf8_lossy(&buf[body_start..body_end]).to_string();

    Some(Request {
        method,
        target,
        headers,
        body,
    })
}

fn write_reply(stream: &mut TcpStream, reply: &Reply) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    stream.write_all(response.as_bytes())?;
    stream.flush()
}

/// Temporary working directory holding a configuration file.
pub struct TestFixture {
    pub temp: TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    /// Write a config with the standard source stack and the bicycling
    /// target, pointed at `base_url`.
    pub fn with_config(self, base_url: &str) -> Self {
        self.with_targets(base_url, &[("Goal-Oriented Bicycling", BIKES_KEY)])
    }

    pub fn with_targets(self, base_url: &str, targets: &[(&str, &str)]) -> Self {
        let mut yaml = format!(
            "base_url: {}\nsource:\n  name: Stylish Outdoor Gear\n  key: {}\ntargets:\n",
            base_url, SOURCE_KEY
        );
        for (name, key) in targets {
            yaml.push_str(&format!("  - name: {}\n    key: {}\n", name, key));
        }
        self.temp
            .child(".stack-schema-copy.yaml")
            .write_str(&yaml)
            .unwrap();
        self
    }

    pub fn with_cached_token(self, token: &str) -> Self {
        self.temp.child(".authtoken").write_str(token).unwrap();
        self
    }

    pub fn path(&self) -> &std::path::Path {
        self.temp.path()
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.temp.path().join(relative)).unwrap()
    }
}
