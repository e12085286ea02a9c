//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves configurable routes on `127.0.0.1`, one request per connection.
//! Routes can return any status, omit `Content-Length`, or close the
//! connection before the advertised length was sent. Requests are counted per
//! path.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Body {
    /// Body with an accurate `Content-Length`.
    Full(Vec<u8>),
    /// Body delimited by connection close; no `Content-Length`.
    Unsized(Vec<u8>),
    /// Advertises `declared` bytes but only sends `sent`.
    Truncated { declared: usize, sent: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Body,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: Body::Full(body.into()),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Body::Full(b"error".to_vec()),
        }
    }
}

type Routes = Arc<Mutex<HashMap<String, Route>>>;
type Hits = Arc<Mutex<HashMap<String, usize>>>;

pub struct TestServer {
    base: String,
    routes: Routes,
    hits: Hits,
}

impl TestServer {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes: Routes = Arc::default();
        let hits: Hits = Arc::default();

        let (r, h) = (Arc::clone(&routes), Arc::clone(&hits));
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let (r, h) = (Arc::clone(&r), Arc::clone(&h));
                thread::spawn(move || handle(stream, &r, &h));
            }
        });

        Self {
            base: format!("http://127.0.0.1:{port}"),
            routes,
            hits,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, path: &str, route: Route) {
        self.routes.lock().unwrap().insert(path.to_owned(), route);
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

/// A URL nothing listens on.
pub fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/contenu.txt")
}

fn handle(mut stream: TcpStream, routes: &Routes, hits: &Hits) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_owned();

    *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;
    let route = routes
        .lock()
        .unwrap()
        .get(&path)
        .cloned()
        .unwrap_or_else(|| Route::status(404));

    let reason = if route.status == 200 { "OK" } else { "Error" };
    let mut head = format!("HTTP/1.1 {} {}\r\nConnection: close\r\n", route.status, reason);
    let payload = match &route.body {
        Body::Full(data) => {
            head.push_str(&format!("Content-Length: {}\r\n", data.len()));
            data
        }
        Body::Unsized(data) => data,
        Body::Truncated { declared, sent } => {
            head.push_str(&format!("Content-Length: {declared}\r\n"));
            sent
        }
    };
    head.push_str("\r\n");

    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(payload);
    let _ = stream.flush();
    let _ = stream.shutdown(std::net::Shutdown::Both);
}
