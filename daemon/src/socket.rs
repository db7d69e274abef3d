//! Newline-delimited JSON over a per-user Unix socket

use crate::protocol::{Request, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

const SOCKET_NAME: &str = "cpuwatch.sock";
const BROADCAST_CAPACITY: usize = 100;

#[async_trait::async_trait]
pub trait RequestHandler {
    async fn handle(&self, request: Request) -> Response;
}

/// Listening socket plus the channel every client receives pushed events from.
/// The socket file is removed when the server is dropped.
pub struct SocketServer {
    path: PathBuf,
    listener: UnixListener,
    broadcast_tx: broadcast::Sender<String>,
}

impl SocketServer {
    /// Binds at `path`, replacing a stale socket left by an earlier run.
    pub async fn bind(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let _ = std::fs::remove_file(path);
        let listener = UnixListener::bind(path)?;
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        info!("Socket server listening on {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
            listener,
            broadcast_tx,
        })
    }

    pub fn broadcast_sender(&self) -> broadcast::Sender<String> {
        self.broadcast_tx.clone()
    }

    pub async fn accept(&self) -> std::io::Result<UnixStream> {
        self.listener.accept().await.map(|(stream, _)| stream)
    }

    /// Serves `stream` on its own task, subscribed to broadcasts from now on.
    pub fn spawn_client<H>(&self, stream: UnixStream, handler: Arc<H>)
    where
        H: RequestHandler + Send + Sync + 'static,
    {
        let broadcast_rx = self.broadcast_tx.subscribe();
        tokio::spawn(handle_client(stream, broadcast_rx, handler));
    }

    /// `$XDG_RUNTIME_DIR/cpuwatch.sock`, falling back to `/run/user/<uid>`.
    pub fn socket_path() -> PathBuf {
        let runtime_dir = directories::BaseDirs::new()
            .and_then(|dirs| dirs.runtime_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from(format!("/run/user/{}", unsafe { libc::getuid() })));
        runtime_dir.join(SOCKET_NAME)
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Answers each request line in order and forwards broadcasts between them until
/// the client hangs up.
pub async fn handle_client<H>(
    stream: UnixStream,
    mut broadcast_rx: broadcast::Receiver<String>,
    handler: Arc<H>,
) where
    H: RequestHandler + Send + Sync + 'static,
{
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let outgoing = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match encode(&respond(&*handler, &line).await) {
                    Some(json) => json,
                    None => continue,
                },
                Ok(None) => break,
                Err(e) => {
                    error!("Read error: {}", e);
                    break;
                }
            },
            pushed = broadcast_rx.recv() => match pushed {
                Ok(json) => json,
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Client lagged, skipped {} broadcasts", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
        };

        if let Err(e) = write_line(&mut writer, &outgoing).await {
            error!("Failed to write to client: {}", e);
            break;
        }
    }
    debug!("Client disconnected");
}

async fn respond<H>(handler: &H, line: &str) -> Response
where
    H: RequestHandler + Send + Sync,
{
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handler.handle(request).await,
        Err(e) => {
            warn!("Invalid request: {}", e);
            Response::error(e)
        }
    }
}

fn encode(response: &Response) -> Option<String> {
    serde_json::to_string(response)
        .map_err(|e| error!("Failed to encode response: {}", e))
        .ok()
}

async fn write_line(writer: &mut OwnedWriteHalf, json: &str) -> std::io::Result<()> {
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await
}
