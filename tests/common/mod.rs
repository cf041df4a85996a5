//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use mini_http_server::net::Listener;
use mini_http_server::{HttpServer, Router, ServerConfig, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

/// Bind an ephemeral port and run `router` on it in the background.
pub async fn start_server(router: Router) -> TestServer {
    let listener = Listener::bind_addr("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = addr.port();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, router);
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Send raw bytes and read until the server closes the connection.
pub async fn send_raw(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    read_all(&mut stream).await
}

/// Read a whole response, failing the test if it takes too long.
pub async fn read_all(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("server did not close the connection")
        .unwrap();
    String::from_utf8(buf).unwrap()
}

#[allow(dead_code)]
pub async fn get(addr: SocketAddr, path: &str) -> String {
    send_raw(addr, format!("GET {path} HTTP/1.1\r\nHost: test\r\n\r\n").as_bytes()).await
}

#[allow(dead_code)]
pub async fn post(addr: SocketAddr, path: &str, body: &str) -> String {
    let raw = format!(
        "POST {path} HTTP/1.1\r\nHost: test\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    send_raw(addr, raw.as_bytes()).await
}

#[allow(dead_code)]
pub fn status_line(response: &str) -> &str {
    response.split("\r\n").next().unwrap_or_default()
}

#[allow(dead_code)]
pub fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    let head = response.split("\r\n\r\n").next()?;
    head.split("\r\n").skip(1).find_map(|line| {
        let (n, v) = line.split_once(": ")?;
        n.eq_ignore_ascii_case(name).then_some(v)
    })
}

#[allow(dead_code)]
pub fn body(response: &str) -> &str {
    response.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or_default()
}
