//! Canned HTTP responder for client tests
//!
//! Serves the queued `(status, body)` pairs in order, one per connection,
//! and records each request line it receives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub(crate) struct TestServer {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub(crate) fn url(&self) -> String {
        self.url.clone()
    }

    /// Request lines seen so far, e.g. `GET /apis/v1beta1/runs/r HTTP/1.1`
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub(crate) async fn serve(responses: Vec<(u16, String)>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    let mut queue: VecDeque<(u16, String)> = responses.into();

    tokio::spawn(async move {
        while let Some((status, body)) = queue.pop_front() {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };

            let mut buf = vec![0u8; 16 * 1024];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let head = String::from_utf8_lossy(&buf[..read]);
            if let Some(line) = head.lines().next() {
                seen.lock().unwrap().push(line.to_string());
            }

            let reply = format!(
                "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    TestServer {
        url: format!("http://{}", addr),
        requests,
    }
}
