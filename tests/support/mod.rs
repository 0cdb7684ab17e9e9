//! In-process fake of the storefront backend.
//!
//! Serves canned JSON responses over plain HTTP/1.1 and records every
//! request it receives, including the `Authorization` header.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::Notify,
    task::JoinHandle,
};

/// A request as seen by the fake backend.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// The body parsed as JSON.
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Clone, Debug)]
struct Route {
    method: String,
    path: String,
    status: u16,
    body: String,
    gate: Option<Arc<Notify>>,
}

type Routes = Arc<Mutex<Vec<Route>>>;
type Requests = Arc<Mutex<Vec<RecordedRequest>>>;

/// Fake backend listening on a random local port.
#[derive(Debug)]
pub struct FakeBackend {
    addr: SocketAddr,
    routes: Routes,
    requests: Requests,
    task: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let routes = Routes::default();
        let requests = Requests::default();

        let task = tokio::spawn({
            let routes = routes.clone();
            let requests = requests.clone();

            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let routes = routes.clone();
                    let requests = requests.clone();

                    tokio::spawn(async move {
                        _ = serve(stream, &routes, &requests).await;
                    });
                }
            }
        });

        Ok(Self {
            addr,
            routes,
            requests,
            task,
        })
    }

    /// Base URL to configure the client with.
    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Answer `method path` (relative to `/api`) with `status` and `body`.
    /// Later registrations for the same route win.
    pub fn respond(&self, method: &str, path: &str, status: u16, body: &Value) {
        self.routes.lock().push(Route {
            method: method.to_string(),
            path: path.to_string(),
            status,
            body: body.to_string(),
            gate: None,
        });
    }

    /// Like [`FakeBackend::respond`], but each response waits until the
    /// returned handle is notified.
    pub fn respond_held(&self, method: &str, path: &str, status: u16, body: &Value) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());

        self.routes.lock().push(Route {
            method: method.to_string(),
            path: path.to_string(),
            status,
            body: body.to_string(),
            gate: Some(gate.clone()),
        });

        gate
    }

    /// Wait until `method path` has been received at least once.
    pub async fn wait_for(&self, method: &str, path: &str) {
        while self.requests_to(method, path).is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Requests received for `method path`.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .cloned()
            .collect()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut stream: TcpStream, routes: &Routes, requests: &Requests) -> io::Result<()> {
    let (read, mut write) = stream.split();
    let mut reader = BufReader::new(read);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default();
    let path = target
        .split('?')
        .next()
        .unwrap_or_default()
        .strip_prefix("/api")
        .unwrap_or(target)
        .to_string();

    let mut content_length = 0_usize;
    let mut authorization = None;

    loop {
        let mut header = String::new();

        if reader.read_line(&mut header).await? == 0 {
            break;
        }

        let header = header.trim_end();

        if header.is_empty() {
            break;
        }

        let Some((name, value)) = header.split_once(':') else {
            continue;
        };

        let value = value.trim();

        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse().unwrap_or(0);
        } else if name.eq_ignore_ascii_case("authorization") {
            authorization = Some(value.to_string());
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).await?;

    let route = routes
        .lock()
        .iter()
        .rev()
        .find(|route| route.method == method && route.path == path)
        .cloned();

    requests.lock().push(RecordedRequest {
        method,
        path,
        authorization,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let (status, body, gate) = route.map_or_else(
        || (404, r#"{"message":"no such route"}"#.to_string(), None),
        |route| (route.status, route.body, route.gate),
    );

    if let Some(gate) = gate {
        gate.notified().await;
    }

    let response = format!(
        "HTTP/1.1 {status} Fake\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    write.write_all(response.as_bytes()).await?;
    write.shutdown().await
}
