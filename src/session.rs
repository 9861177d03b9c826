use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::multipart::UploadSession;
use crate::response;
use crate::state::{ProgressSlot, ReceivedFile, UploadProgress};

/// Upper bound on a single read. Uploads arrive as arbitrarily fragmented
/// chunks; nothing here assumes any particular framing per read.
const MAX_CHUNK: usize = 64 * 1024;

enum RequestKind {
    /// CORS preflight, answered without touching the multipart machinery.
    Preflight,
    /// A multipart upload; hand everything to the accumulator.
    Upload,
    /// Anything else gets the upload form.
    Page,
}

// heuristic substring classifier over the first chunk; adequate because the
// only clients are the bundled form page and generic browsers
fn classify(chunk: &[u8]) -> RequestKind {
    let text = String::from_utf8_lossy(chunk);
    if text.starts_with("OPTIONS ") {
        RequestKind::Preflight
    } else if text.contains("Content-Type: multipart/form-data") {
        RequestKind::Upload
    } else {
        RequestKind::Page
    }
}

/// One accepted connection, one session, exactly one response write, then
/// close. No keep-alive, no pipelining.
pub(crate) async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    progress: Arc<ProgressSlot>,
    received_tx: mpsc::UnboundedSender<ReceivedFile>,
) {
    let mut buf = vec![0u8; MAX_CHUNK];

    let n = match stream.read(&mut buf).await {
        Ok(0) => return,
        Ok(n) => n,
        Err(e) => {
            tracing::debug!("receive failed from {}: {}", peer, e);
            return;
        }
    };

    match classify(&buf[..n]) {
        RequestKind::Preflight => {
            tracing::debug!("answering preflight from {}", peer);
            send_and_close(&mut stream, peer, &response::preflight()).await;
        }
        RequestKind::Page => {
            tracing::debug!("serving upload form to {}", peer);
            send_and_close(&mut stream, peer, &response::upload_form()).await;
        }
        RequestKind::Upload => {
            let mut session = UploadSession::new();
            session.push(&buf[..n]);
            run_upload(stream, peer, session, buf, progress, received_tx).await;
        }
    }
}

async fn run_upload(
    mut stream: TcpStream,
    peer: SocketAddr,
    mut session: UploadSession,
    mut buf: Vec<u8>,
    progress: Arc<ProgressSlot>,
    received_tx: mpsc::UnboundedSender<ReceivedFile>,
) {
    tracing::debug!("upload session started for {}", peer);
    progress.publish(session.progress());

    while !session.is_complete() {
        match stream.read(&mut buf).await {
            Ok(0) => {
                // peers without a Content-Length (or that close right after
                // the final boundary) end up here; parse what we have
                tracing::debug!("peer {} closed the stream; attempting final parse", peer);
                break;
            }
            Ok(n) => {
                session.push(&buf[..n]);
                progress.publish(session.progress());
            }
            Err(e) => {
                tracing::warn!("receive failed mid-upload from {}: {}", peer, e);
                progress.publish_transient(UploadProgress {
                    file_name: session.file_name().map(str::to_owned),
                    error_message: Some(format!("connection lost: {}", e)),
                    ..Default::default()
                });
                return;
            }
        }
    }

    match session.finish() {
        Ok(file) => {
            tracing::info!(
                "📖 received {} ({} bytes) from {} in {:?}",
                file.file_name,
                file.content.len(),
                peer,
                session.elapsed(),
            );
            let mut frame = session.progress();
            frame.file_name = Some(file.file_name.clone());
            frame.is_completed = true;
            progress.publish_transient(frame);

            let reply = response::success_page(&file.file_name);
            // host may have dropped the receiver; the upload still succeeded
            let _ = received_tx.send(file);
            send_and_close(&mut stream, peer, &reply).await;
        }
        Err(e) => {
            tracing::warn!("upload from {} failed: {}", peer, e);
            progress.publish_transient(UploadProgress {
                file_name: session.file_name().map(str::to_owned),
                error_message: Some(e.message().to_string()),
                ..Default::default()
            });
            send_and_close(&mut stream, peer, &response::error_page(e.message())).await;
        }
    }
}

// the single response write; the connection is done either way afterwards
async fn send_and_close(stream: &mut TcpStream, peer: SocketAddr, payload: &str) {
    if let Err(e) = stream.write_all(payload.as_bytes()).await {
        tracing::debug!("send to {} failed: {}", peer, e);
        return;
    }
    let _ = stream.shutdown().await;
}
