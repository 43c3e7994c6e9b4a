//! Minimal HTTP/1.1 server answering a fixed list of replies, one per
//! connection.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub(crate) struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}
impl Reply {
    pub(crate) fn new(status: u16, body: &[u8]) -> Self {
        Self { status, content_type: "text/html", body: body.to_vec() }
    }

    pub(crate) fn json(body: &str) -> Self {
        Self { status: 200, content_type: "application/json", body: body.as_bytes().to_vec() }
    }
}

pub(crate) struct TestServer {
    base: String,
    heads: Arc<Mutex<Vec<String>>>,
}
impl TestServer {
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Request lines seen so far, without the protocol, e.g. `GET /a?b=c`.
    pub(crate) fn requests(&self) -> Vec<String> {
        self.heads()
            .iter()
            .map(|head| head.lines().next().unwrap_or_default().trim_end_matches(" HTTP/1.1").to_string())
            .collect()
    }

    /// Full request heads seen so far.
    pub(crate) fn heads(&self) -> Vec<String> {
        self.heads.lock().unwrap().clone()
    }
}

pub(crate) async fn serve(replies: Vec<Reply>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let heads = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&heads);
    tokio::spawn(async move {
        for reply in replies {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&chunk[..n]),
                }
            }
            seen.lock().unwrap().push(String::from_utf8_lossy(&head).into_owned());

            let mut response = format!(
                "HTTP/1.1 {} Test\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                reply.status,
                reply.content_type,
                reply.body.len()
            )
            .into_bytes();
            response.extend_from_slice(&reply.body);
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        }
    });
    TestServer { base, heads }
}
