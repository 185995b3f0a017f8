//! Unix socket session management

use std::sync::Arc;

use serde::Serialize;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::unix::{OwnedReadHalf, OwnedWriteHalf},
    sync::Mutex,
};

use crate::{
    core::{error::TransportResult, types::SessionId},
    protocol::{JsonRpcNotification, JsonRpcResponse},
};

/// Writing side of one client connection
///
/// Responses and scan notifications share the socket; each message is one
/// line of JSON and is written under the lock as a whole.
#[derive(Debug)]
pub struct UnixSocketSession {
    id: SessionId,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl UnixSocketSession {
    pub fn new(writer: OwnedWriteHalf) -> Self {
        Self {
            id: SessionId::new(),
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub async fn send_response(&self, response: &JsonRpcResponse) -> TransportResult<()> {
        self.write_line(response).await
    }

    pub async fn send_notification(&self, notification: &JsonRpcNotification) -> TransportResult<()> {
        self.write_line(notification).await
    }

    async fn write_line<T: Serialize>(&self, message: &T) -> TransportResult<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Reading side of one client connection
pub struct SessionReader {
    reader: BufReader<OwnedReadHalf>,
}

impl SessionReader {
    pub fn new(reader: OwnedReadHalf) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Next line without its terminator, `None` at EOF
    pub async fn read_line(&mut self) -> TransportResult<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
