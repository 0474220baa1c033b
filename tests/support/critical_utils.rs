//! Shared utilities for integration and critical tests (raw HTTP peers,
//! unreachable endpoints, event collection, progress assertions).

use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::time::Duration;

use fetchfile_core::{DownloadEvent, DownloadOutcome, ProgressSample, RequestId};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use super::socket_guard::should_skip_socket_bound_test;

/// Serves exactly one HTTP/1.1 response written in the given chunks, pausing
/// between them, then closes the connection.
///
/// `content_length` is advertised verbatim, so it may disagree with the body.
/// Returns the URL to request, or `None` when sockets are unavailable.
pub async fn raw_http_server(
    chunks: Vec<Vec<u8>>,
    content_length: Option<u64>,
    pause: Duration,
) -> Option<String> {
    if should_skip_socket_bound_test() {
        return None;
    }
    let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
    let addr = listener.local_addr().ok()?;

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        let mut request = Vec::new();
        let mut buf = [0_u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let mut head = String::from("HTTP/1.1 200 OK\r\nConnection: close\r\n");
        if let Some(length) = content_length {
            head.push_str(&format!("Content-Length: {length}\r\n"));
        }
        head.push_str("\r\n");
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }

        for chunk in chunks {
            if socket.write_all(&chunk).await.is_err() || socket.flush().await.is_err() {
                return;
            }
            tokio::time::sleep(pause).await;
        }
        let _ = socket.shutdown().await;
    });

    Some(format!("http://{addr}/file.bin"))
}

/// URL on localhost where nothing is listening.
pub fn closed_port_url() -> Option<String> {
    let listener = StdTcpListener::bind("127.0.0.1:0").ok()?;
    let port = listener.local_addr().ok()?.port();
    drop(listener);
    Some(format!("http://127.0.0.1:{port}/file.bin"))
}

/// Everything one request reported, in arrival order.
#[derive(Debug, Default)]
pub struct RecordedRequest {
    pub progress: Vec<ProgressSample>,
    pub outcomes: Vec<DownloadOutcome>,
    /// Progress events received after an outcome for the same request.
    pub late_progress: usize,
}

/// Drains a shared event channel until `expected` requests have finished,
/// then keeps listening briefly to catch anything sent afterwards.
pub async fn record_events(
    mut events: mpsc::UnboundedReceiver<DownloadEvent>,
    expected: usize,
) -> HashMap<RequestId, RecordedRequest> {
    let mut recorded: HashMap<RequestId, RecordedRequest> = HashMap::new();
    let mut finished = 0;

    loop {
        let next = if finished < expected {
            tokio::time::timeout(Duration::from_secs(30), events.recv()).await
        } else {
            tokio::time::timeout(Duration::from_millis(100), events.recv()).await
        };
        let Ok(Some(event)) = next else {
            break;
        };

        let entry = recorded.entry(event.id()).or_default();
        match event {
            DownloadEvent::Progress { sample, .. } => {
                if entry.outcomes.is_empty() {
                    entry.progress.push(sample);
                } else {
                    entry.late_progress += 1;
                }
            }
            DownloadEvent::Finished { outcome, .. } => {
                entry.outcomes.push(outcome);
                finished += 1;
            }
        }
    }
    recorded
}

/// Asserts the progress invariants: non-decreasing, never above a known
/// total, and ending exactly at a known total.
pub fn assert_progress_well_formed(samples: &[ProgressSample]) {
    for pair in samples.windows(2) {
        assert!(
            pair[0].transferred <= pair[1].transferred,
            "progress went backwards: {pair:?}"
        );
        assert_eq!(pair[0].total, pair[1].total, "total changed mid-transfer");
    }
    for sample in samples {
        if let Some(total) = sample.total {
            assert!(sample.transferred <= total, "overshoot: {sample:?}");
        }
    }
    if let Some(last) = samples.last()
        && let Some(total) = last.total
    {
        assert_eq!(last.transferred, total, "final sample must reach the total");
    }
}

/// Deterministic payload of `len` bytes.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
