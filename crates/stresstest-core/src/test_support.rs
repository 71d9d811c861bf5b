//! In-process HTTP/1.1 server for engine tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How the mock server answers every request.
#[derive(Clone)]
pub(crate) struct MockBehavior {
    pub status: u16,
    pub body_len: usize,
    /// Send only this many body bytes, then close despite the advertised length.
    pub truncate_to: Option<usize>,
    pub delay: Duration,
    /// Cancel the token once this many requests have been received.
    pub cancel_after: Option<(u64, CancellationToken)>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            status: 200,
            body_len: 0,
            truncate_to: None,
            delay: Duration::ZERO,
            cancel_after: None,
        }
    }
}

pub(crate) struct MockServer {
    pub addr: SocketAddr,
    served: Arc<AtomicU64>,
    request_heads: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn spawn(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let served = Arc::new(AtomicU64::new(0));
        let request_heads = Arc::new(Mutex::new(Vec::new()));

        let task = {
            let served = Arc::clone(&served);
            let request_heads = Arc::clone(&request_heads);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let behavior = behavior.clone();
                    let served = Arc::clone(&served);
                    let request_heads = Arc::clone(&request_heads);
                    tokio::spawn(async move {
                        handle_connection(stream, behavior, served, request_heads).await;
                    });
                }
            })
        };

        Self {
            addr,
            served,
            request_heads,
            task,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn served(&self) -> u64 {
        self.served.load(Ordering::SeqCst)
    }

    pub fn request_heads(&self) -> Vec<String> {
        self.request_heads.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Address with nothing listening on it.
pub(crate) async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

async fn handle_connection(
    mut stream: TcpStream,
    behavior: MockBehavior,
    served: Arc<AtomicU64>,
    request_heads: Arc<Mutex<Vec<String>>>,
) {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    request_heads
        .lock()
        .unwrap()
        .push(String::from_utf8_lossy(&buf).into_owned());

    let count = served.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some((after, token)) = &behavior.cancel_after {
        if count >= *after {
            token.cancel();
        }
    }

    if !behavior.delay.is_zero() {
        tokio::time::sleep(behavior.delay).await;
    }

    let head = format!(
        "HTTP/1.1 {} OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        behavior.status, behavior.body_len
    );
    let sent = behavior.truncate_to.unwrap_or(behavior.body_len).min(behavior.body_len);
    let body = vec![b'x'; sent];

    if stream.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    if stream.write_all(&body).await.is_err() {
        return;
    }
    let _ = stream.flush().await;
    let _ = stream.shutdown().await;
}
