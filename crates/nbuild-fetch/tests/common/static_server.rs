//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of paths with GET and counts the requests it answers.
//! Unknown paths get 404; paths registered with a status other than 200 get
//! that status and an empty body.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Clone)]
struct Route {
    status: u16,
    body: Vec<u8>,
}

pub struct StaticServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

impl StaticServer {
    /// `http://127.0.0.1:<port>` joined with `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Requests answered so far, any path.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct StaticServerBuilder {
    routes: HashMap<String, Route>,
}

impl StaticServerBuilder {
    pub fn file(mut self, path: &str, body: &[u8]) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status: 200,
                body: body.to_vec(),
            },
        );
        self
    }

    pub fn status(mut self, path: &str, status: u16) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status,
                body: Vec::new(),
            },
        );
        self
    }

    /// Starts the server in a background thread. It runs until the process exits.
    pub fn start(self) -> StaticServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes = Arc::new(self.routes);
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_srv = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let hits = Arc::clone(&hits_srv);
                thread::spawn(move || handle(stream, &routes, &hits));
            }
        });
        StaticServer {
            base_url: format!("http://127.0.0.1:{}", port),
            hits,
        }
    }
}

pub fn builder() -> StaticServerBuilder {
    StaticServerBuilder::default()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, Route>, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");
    hits.fetch_add(1, Ordering::SeqCst);

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    let route = routes.get(path).cloned().unwrap_or(Route {
        status: 404,
        body: Vec::new(),
    });
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        reason(route.status),
        route.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&route.body);
}
