//! Minimal HTTP/1.1 server for integration tests.
//!
//! Answers every GET with one static body (or a fixed error status) and
//! counts the requests it has seen, so tests can assert how many fetches
//! the provisioner made.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

pub struct ArchiveServer {
    /// Base URL including the archive path, e.g. "http://127.0.0.1:12345/testdata.zip".
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl ArchiveServer {
    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serves `body` with 200 OK. The server runs until the process exits.
pub fn start(body: Vec<u8>) -> ArchiveServer {
    start_with_status(200, body)
}

/// Serves `body` with the given status line code (e.g. 404, 503).
pub fn start_with_status(status: u16, body: Vec<u8>) -> ArchiveServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let hits = Arc::clone(&hits_srv);
            thread::spawn(move || handle(stream, &body, status, &hits));
        }
    });
    ArchiveServer {
        url: format!("http://127.0.0.1:{}/testdata.zip", port),
        hits,
    }
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], status: u16, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let mut seen = Vec::new();
    // Read until the end of the request headers.
    while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => seen.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&seen);
    let method = request.split_whitespace().next().unwrap_or("");
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    hits.fetch_add(1, Ordering::SeqCst);
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/zip\r\nConnection: close\r\n\r\n",
        status,
        reason,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}
