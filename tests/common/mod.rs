//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dev_proxy::{HttpServer, ServerConfig, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, Notify};

/// A request as the mock upstream saw it.
#[allow(dead_code)]
pub struct Received {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Read one HTTP/1.1 request (head + Content-Length body) off `socket`.
pub async fn read_request(socket: &mut TcpStream) -> Received {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    let head_end = loop {
        let n = socket.read(&mut tmp).await.unwrap();
        assert!(n > 0, "connection closed before request head");
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap().split(' ');
    let method = request_line.next().unwrap().to_string();
    let target = request_line.next().unwrap().to_string();

    let headers: Vec<(String, String)> = lines
        .filter(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .map_or(0, |(_, v)| v.parse::<usize>().unwrap());

    let mut body = buf[head_end..].to_vec();
    while body.len() < length {
        let n = socket.read(&mut tmp).await.unwrap();
        assert!(n > 0, "connection closed mid-body");
        body.extend_from_slice(&tmp[..n]);
    }

    Received {
        method,
        target,
        headers,
        body,
    }
}

/// Start an upstream that answers every request with a JSON echo of it.
///
/// The echo also sets `x-upstream: echo` and its own (conflicting) CORS header.
pub async fn start_echo_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let received = read_request(&mut socket).await;
                let headers: serde_json::Map<String, serde_json::Value> = received
                    .headers
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                let echo = serde_json::json!({
                    "method": received.method,
                    "target": received.target,
                    "headers": headers,
                    "body": String::from_utf8_lossy(&received.body),
                })
                .to_string();

                let response = format!(
                    "HTTP/1.1 200 OK\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     X-Upstream: echo\r\n\
                     Access-Control-Allow-Origin: http://upstream.invalid\r\n\
                     Connection: close\r\n\r\n{}",
                    echo.len(),
                    echo
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start an upstream that streams `first`, waits for `release`, then streams
/// `rest` and ends the chunked body.
pub async fn start_gated_stream_upstream(
    first: &'static str,
    rest: &'static str,
    release: Arc<Notify>,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let _ = read_request(&mut socket).await;

        let head = "HTTP/1.1 200 OK\r\n\
                    Content-Type: application/x-ndjson\r\n\
                    Transfer-Encoding: chunked\r\n\r\n";
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(chunk(first).as_bytes()).await.unwrap();
        socket.flush().await.unwrap();

        release.notified().await;

        socket.write_all(chunk(rest).as_bytes()).await.unwrap();
        socket.write_all(b"0\r\n\r\n").await.unwrap();
        let _ = socket.shutdown().await;
    });

    addr
}

/// Start an upstream that sends `first`, then keeps dripping chunks and never
/// ends the body.
///
/// The receiver fires once the proxy closes the upstream connection (read EOF
/// or a failed write).
#[allow(dead_code)]
pub async fn start_endless_stream_upstream(
    first: &'static str,
) -> (SocketAddr, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let _ = read_request(&mut socket).await;

        let head = "HTTP/1.1 200 OK\r\n\
                    Content-Type: application/x-ndjson\r\n\
                    Transfer-Encoding: chunked\r\n\r\n";
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(chunk(first).as_bytes()).await.unwrap();
        socket.flush().await.unwrap();

        let (mut reader, mut writer) = socket.split();
        let mut buf = [0u8; 64];
        loop {
            tokio::select! {
                read = reader.read(&mut buf) => match read {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                },
                _ = tokio::time::sleep(Duration::from_millis(20)) => {
                    let drip = chunk("{\"response\":\".\"}\n");
                    if writer.write_all(drip.as_bytes()).await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = closed_tx.send(());
    });

    (addr, closed_rx)
}

/// Start an upstream that returns a fixed-length body of `size` bytes.
#[allow(dead_code)]
pub async fn start_bulk_upstream(size: usize) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                let body: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {size}\r\nConnection: close\r\n\r\n"
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

fn chunk(data: &str) -> String {
    format!("{:x}\r\n{}\r\n", data.len(), data)
}

/// An address with (almost certainly) nothing listening on it.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config pointing the proxy at `upstream`.
pub fn config_for(upstream: SocketAddr) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.proxy.upstream_base_url = format!("http://{upstream}/api/");
    config
}

/// Run the dev server on an ephemeral port.
pub async fn start_server(config: ServerConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = HttpServer::new(config).run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// A fresh directory holding a tiny SPA.
#[allow(dead_code)]
pub fn asset_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dev-proxy-assets-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index-modern.html"), "<!doctype html><title>TXT OS</title>").unwrap();
    std::fs::write(dir.join("script-modern.js"), "console.log('hi');").unwrap();
    std::fs::write(dir.join("style.css"), "body { margin: 0 }").unwrap();
    dir
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Assert the three CORS headers each appear exactly once with our values.
pub fn assert_cors_once(headers: &reqwest::header::HeaderMap) {
    for (name, expected) in [
        ("access-control-allow-origin", "*"),
        ("access-control-allow-methods", "GET, POST, OPTIONS"),
        ("access-control-allow-headers", "Content-Type, Authorization"),
    ] {
        let values: Vec<_> = headers.get_all(name).iter().collect();
        assert_eq!(values, [expected], "{name}");
    }
}
