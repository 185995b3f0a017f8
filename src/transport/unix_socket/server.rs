//! Unix socket server implementation

use std::{os::unix::fs::PermissionsExt, path::Path, sync::Arc};

use listenfd::ListenFd;
use tokio::{
    fs,
    net::{UnixListener, UnixStream},
};
use tracing::{error, info, warn};

use crate::{
    core::{error::TransportResult, service::LinkManager},
    driver::RadioDriver,
    protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId},
    store::KeyValueStore,
    transport::unix_socket::{
        handler::{RequestHandler, reject_line},
        session::{SessionReader, UnixSocketSession},
    },
};

/// Unix socket server
pub struct UnixSocketServer<D: RadioDriver, S: KeyValueStore> {
    socket_path: String,
    socket_mode: u32,
    handler: Arc<RequestHandler<D, S>>,
}

impl<D: RadioDriver, S: KeyValueStore> UnixSocketServer<D, S> {
    pub fn new(socket_path: String, socket_mode: u32, manager: Arc<LinkManager<D, S>>) -> Self {
        Self {
            socket_path,
            socket_mode,
            handler: Arc::new(RequestHandler::new(manager)),
        }
    }

    /// Serve clients until the listener fails
    ///
    /// A socket passed in by the service manager (socket activation) is
    /// preferred over binding `socket_path`.
    pub async fn start(&self) -> TransportResult<()> {
        let listener = self.listener().await?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let handler = self.handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_client(stream, handler).await {
                            error!("Error handling client: {}", e);
                        }
                    });
                }
                Err(e) => {
                    warn!("Error accepting connection: {}", e);
                }
            }
        }
    }

    async fn listener(&self) -> TransportResult<UnixListener> {
        if let Some(inherited) = ListenFd::from_env().take_unix_listener(0)? {
            inherited.set_nonblocking(true)?;
            info!("Unix socket server using inherited listener");
            return Ok(UnixListener::from_std(inherited)?);
        }

        if Path::new(&self.socket_path).exists() {
            fs::remove_file(&self.socket_path).await?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        fs::set_permissions(
            &self.socket_path,
            std::fs::Permissions::from_mode(self.socket_mode),
        )
        .await?;

        info!(
            mode = format_args!("{:o}", self.socket_mode),
            "Unix socket server listening on {}", self.socket_path
        );
        Ok(listener)
    }

    async fn handle_client(
        stream: UnixStream,
        handler: Arc<RequestHandler<D, S>>,
    ) -> TransportResult<()> {
        let (read_half, write_half) = stream.into_split();
        let session = UnixSocketSession::new(write_half);
        let mut reader = SessionReader::new(read_half);

        info!("New client connected: {}", session.id());

        while let Some(line) = reader.read_line().await? {
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => handler.handle_request(request, &session).await,
                Err(e) => {
                    warn!("Invalid JSON-RPC request: {}", e);
                    match reject_line(&line) {
                        Some(response) => response,
                        None => JsonRpcResponse::error(JsonRpcError::parse_error(), RequestId::Null),
                    }
                }
            };

            if let Err(e) = session.send_response(&response).await {
                error!("Error sending response: {}", e);
                break;
            }
        }

        info!("Client disconnected: {}", session.id());
        Ok(())
    }
}
