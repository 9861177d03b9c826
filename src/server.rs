use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::error::ServerError;
use crate::netinfo;
use crate::session;
use crate::state::{ProgressSlot, ReceivedFile, ServerState, UploadProgress};

/// Fixed plaintext port. The bundled form page and the companion app both
/// assume it, so it is not configurable.
pub const PORT: u16 = 8080;

/// The embedded upload server. One instance per process; hosts observe it
/// through the state and progress channels and drive it with `start`/`stop`.
pub struct BookServer {
    state_tx: watch::Sender<ServerState>,
    progress: Arc<ProgressSlot>,
    received_tx: mpsc::UnboundedSender<ReceivedFile>,
    accept_task: Mutex<Option<JoinHandle<()>>>,
}

impl BookServer {
    /// Create the server and the receiving end of the file-received channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReceivedFile>) {
        let (received_tx, received_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(ServerState::default());
        let server = Self {
            state_tx,
            progress: Arc::new(ProgressSlot::new()),
            received_tx,
            accept_task: Mutex::new(None),
        };
        (server, received_rx)
    }

    /// current state, copied out
    pub fn state(&self) -> ServerState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ServerState> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<Option<UploadProgress>> {
        self.progress.subscribe()
    }

    pub fn progress(&self) -> Option<UploadProgress> {
        self.progress.current()
    }

    /// Bind the fixed port and start accepting connections. Calling this
    /// while already running is a no-op that returns the current state.
    /// On bind failure the state stays not-running with no address.
    pub async fn start(&self) -> Result<ServerState, ServerError> {
        let mut task = self.accept_task.lock().await;
        if task.is_some() {
            tracing::debug!("start() while already running; returning current state");
            return Ok(self.state());
        }

        let listener = TcpListener::bind(("0.0.0.0", PORT))
            .await
            .map_err(ServerError::Bind)?;

        let address = netinfo::local_ipv4().map(|ip| format!("http://{}:{}", ip, PORT));
        if address.is_none() {
            tracing::warn!("no LAN address found; server is up but address is unknown");
        }

        let progress = Arc::clone(&self.progress);
        let received_tx = self.received_tx.clone();
        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        tracing::debug!("accepted connection from {}", peer);
                        let progress = Arc::clone(&progress);
                        let received_tx = received_tx.clone();
                        tokio::spawn(async move {
                            session::handle_connection(stream, peer, progress, received_tx)
                                .await;
                        });
                    }
                    // a failed accept never brings the listener down
                    Err(e) => tracing::warn!("accept failed: {}", e),
                }
            }
        });
        *task = Some(handle);

        let state = ServerState {
            is_running: true,
            address,
        };
        self.state_tx.send_replace(state.clone());
        tracing::info!("📡 book server listening on port {}", PORT);
        Ok(state)
    }

    /// Stop accepting connections. In-flight sessions are abandoned, not
    /// drained; they end when their sockets do. Idempotent.
    pub async fn stop(&self) {
        let mut task = self.accept_task.lock().await;
        if let Some(handle) = task.take() {
            handle.abort();
            self.state_tx.send_replace(ServerState::default());
            tracing::info!("book server stopped");
        }
    }
}
