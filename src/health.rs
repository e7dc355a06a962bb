//! Plain-HTTP status page served on the WebSocket port.
//!
//! Hosting platforms poll `GET /` to decide whether the process is alive; anything
//! that is not a WebSocket upgrade is answered here and the connection is closed.

use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;

/// Body returned for a status check
pub const STATUS_BODY: &str = "Vortex Bot Status: Active and Running";

const MAX_HEAD_BYTES: usize = 4096;

/// Look at the request head without consuming it, so a WebSocket handshake can
/// still read it afterwards. Returns an empty buffer if the peer closed early.
pub async fn peek_request_head(stream: &TcpStream) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; MAX_HEAD_BYTES];
    loop {
        let n = stream.peek(&mut buf).await?;
        if n == 0 || n == buf.len() || buf[..n].windows(4).any(|w| w == b"\r\n\r\n") {
            buf.truncate(n);
            return Ok(buf);
        }
        // Partial head: wait for the rest to arrive
        time::sleep(Duration::from_millis(5)).await;
    }
}

/// Whether the request carries `Upgrade: websocket`
pub fn is_websocket_upgrade(head: &[u8]) -> bool {
    String::from_utf8_lossy(head)
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .any(|(name, value)| {
            name.trim().eq_ignore_ascii_case("upgrade") && value.trim().eq_ignore_ascii_case("websocket")
        })
}

/// Answer a plain HTTP request and close the connection
pub async fn respond(stream: &mut TcpStream, head: &[u8]) -> io::Result<()> {
    // Drain the peeked bytes so closing does not reset the connection
    let mut consumed = vec![0u8; head.len()];
    stream.read_exact(&mut consumed).await?;

    let request = String::from_utf8_lossy(head);
    let mut request_line = request.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default();
    let path = request_line
        .next()
        .and_then(|target| target.split('?').next())
        .unwrap_or_default();

    let (status, body) = match (method, path) {
        ("GET" | "HEAD", "/" | "/health") => ("200 OK", STATUS_BODY),
        _ => ("404 Not Found", "Not Found"),
    };

    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    if method != "HEAD" {
        response.push_str(body);
    }

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
