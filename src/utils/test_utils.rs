//! In-process HTTP server for exercising the chat and deploy workflows.
//!
//! Each route answers with a canned response. Every request is recorded so
//! tests can assert on what was (or was not) sent.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Clone, Debug)]
enum CannedBody {
    Full(Vec<u8>),
    Chunked { parts: Vec<Vec<u8>>, gap: Duration },
}

#[derive(Clone, Debug)]
pub struct CannedResponse {
    status: u16,
    content_type: &'static str,
    body: CannedBody,
    delay: Option<Duration>,
}

impl CannedResponse {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: CannedBody::Full(value.to_string().into_bytes()),
            delay: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: CannedBody::Full(body.as_bytes().to_vec()),
            delay: None,
        }
    }

    /// A `Transfer-Encoding: chunked` body written one part at a time.
    pub fn chunked(parts: Vec<Vec<u8>>, gap: Duration) -> Self {
        Self {
            status: 200,
            content_type: "text/event-stream",
            body: CannedBody::Chunked { parts, gap },
            delay: None,
        }
    }

    /// Wait before sending anything back.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(routes: Vec<(&str, CannedResponse)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("local addr should resolve");
        let routes: Arc<HashMap<String, CannedResponse>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, response)| (path.to_string(), response))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&requests);

        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = Arc::clone(&routes);
                let captured = Arc::clone(&captured);
                tokio::spawn(async move {
                    let _ = handle_connection(stream, routes, captured).await;
                });
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<CapturedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// An address nothing listens on, for connection-refused scenarios.
pub async fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    drop(listener);
    format!("http://{addr}")
}

async fn handle_connection(
    mut stream: TcpStream,
    routes: Arc<HashMap<String, CannedResponse>>,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
) -> Result<(), String> {
    let request = read_http_request(&mut stream).await?;
    let response = routes.get(&request.path).cloned();
    captured.lock().map_err(|err| err.to_string())?.push(request);

    let Some(response) = response else {
        return write_full(&mut stream, 404, "text/plain", b"not found").await;
    };

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    match response.body {
        CannedBody::Full(body) => {
            write_full(&mut stream, response.status, response.content_type, &body).await
        }
        CannedBody::Chunked { parts, gap } => {
            let head = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
                response.status,
                reason(response.status),
                response.content_type
            );
            stream
                .write_all(head.as_bytes())
                .await
                .map_err(|err| err.to_string())?;
            stream.flush().await.map_err(|err| err.to_string())?;
            for part in parts {
                let mut frame = format!("{:x}\r\n", part.len()).into_bytes();
                frame.extend_from_slice(&part);
                frame.extend_from_slice(b"\r\n");
                stream
                    .write_all(&frame)
                    .await
                    .map_err(|err| err.to_string())?;
                stream.flush().await.map_err(|err| err.to_string())?;
                tokio::time::sleep(gap).await;
            }
            stream
                .write_all(b"0\r\n\r\n")
                .await
                .map_err(|err| err.to_string())?;
            stream.shutdown().await.map_err(|err| err.to_string())
        }
    }
}

async fn write_full(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
) -> Result<(), String> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        content_type,
        body.len()
    );
    stream
        .write_all(head.as_bytes())
        .await
        .map_err(|err| err.to_string())?;
    stream.write_all(body).await.map_err(|err| err.to_string())?;
    stream.shutdown().await.map_err(|err| err.to_string())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

async fn read_http_request(stream: &mut TcpStream) -> Result<CapturedRequest, String> {
    let mut buffer = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.ok_or_else(|| "header end should exist".to_string())?;
    let header_text =
        std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    let mut content_length = None;
    let mut chunked = false;
    for line in lines {
        let mut parts = line.splitn(2, ':');
        let Some(name) = parts.next() else {
            continue;
        };
        let value = parts.next().unwrap_or_default().trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = Some(value.parse::<usize>().map_err(|err| err.to_string())?);
        }
        if name.eq_ignore_ascii_case("transfer-encoding")
            && value.eq_ignore_ascii_case("chunked")
        {
            chunked = true;
        }
        headers.push((name.to_string(), value));
    }

    let mut raw = buffer[header_end..].to_vec();
    let body = if chunked {
        read_chunked_body(stream, &mut raw).await?
    } else {
        let content_length = content_length.unwrap_or(0);
        while raw.len() < content_length {
            let mut chunk = vec![0_u8; content_length - raw.len()];
            let read = stream
                .read(&mut chunk)
                .await
                .map_err(|err| err.to_string())?;
            if read == 0 {
                return Err("Unexpected EOF while reading HTTP body".to_string());
            }
            raw.extend_from_slice(&chunk[..read]);
        }
        raw.truncate(content_length);
        raw
    };

    Ok(CapturedRequest {
        method,
        path,
        headers,
        body,
    })
}

async fn read_chunked_body(stream: &mut TcpStream, raw: &mut Vec<u8>) -> Result<Vec<u8>, String> {
    loop {
        if raw.windows(5).any(|window| window == b"0\r\n\r\n") {
            break;
        }
        let mut chunk = [0_u8; 4096];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..read]);
    }

    let mut body = Vec::new();
    let mut rest = raw.as_slice();
    while let Some(line_end) = rest.windows(2).position(|window| window == b"\r\n") {
        let size_text = std::str::from_utf8(&rest[..line_end]).map_err(|err| err.to_string())?;
        let size = usize::from_str_radix(size_text.trim(), 16).map_err(|err| err.to_string())?;
        if size == 0 {
            break;
        }
        let start = line_end + 2;
        let end = (start + size).min(rest.len());
        body.extend_from_slice(&rest[start..end]);
        rest = rest.get(end + 2..).unwrap_or_default();
    }
    Ok(body)
}
