//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed bodies by path, answers 404 for anything else, and counts
//! GET requests per path so tests can assert that nothing was re-fetched.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Clone)]
struct Route {
    body: Vec<u8>,
    delay: Duration,
    /// When set, answer 302 with this Location instead of the body.
    location: Option<String>,
}

pub struct FileServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl FileServer {
    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Number of GET requests seen for `path` (with leading slash).
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

#[derive(Default)]
pub struct FileServerBuilder {
    routes: HashMap<String, Route>,
}

impl FileServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                body: body.into(),
                delay: Duration::ZERO,
                location: None,
            },
        );
        self
    }

    /// Serves `body` only after sleeping `delay` (for timeout tests).
    pub fn slow_file(mut self, path: &str, body: impl Into<Vec<u8>>, delay: Duration) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                body: body.into(),
                delay,
                location: None,
            },
        );
        self
    }

    /// Answers `path` with a 302 pointing at `to` (a path on this server).
    pub fn redirect(mut self, path: &str, to: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                body: Vec::new(),
                delay: Duration::ZERO,
                location: Some(to.to_string()),
            },
        );
        self
    }

    /// Starts the server on a background thread. It runs until the process exits.
    pub fn start(self) -> FileServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes = Arc::new(self.routes);
        let hits = Arc::new(Mutex::new(HashMap::new()));
        let hits_srv = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let hits = Arc::clone(&hits_srv);
                thread::spawn(move || handle(stream, &routes, &hits));
            }
        });
        FileServer {
            base: format!("http://127.0.0.1:{}", port),
            hits,
        }
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let mut first = request.lines().next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("");
    let path = first.next().unwrap_or("/").to_string();

    if method.eq_ignore_ascii_case("GET") {
        *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;
    }

    let Some(route) = routes.get(&path) else {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    };
    if let Some(location) = &route.location {
        let response = format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            location
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    if !route.delay.is_zero() {
        thread::sleep(route.delay);
    }
    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    if !method.eq_ignore_ascii_case("HEAD") {
        let _ = stream.write_all(&route.body);
    }
}
