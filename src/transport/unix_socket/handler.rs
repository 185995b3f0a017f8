//! JSON-RPC request handler for Unix socket transport

use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    core::service::LinkManager,
    driver::RadioDriver,
    protocol::{
        AckResponse, ConnectParams, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
        JsonRpcResponse, Notification, Request, RequestId, Response, ScanCompleteResponse,
        StartResponse, StatusResponse, VersionResponse, WaitConnectedParams,
        WaitConnectedResponse,
    },
    store::KeyValueStore,
    transport::unix_socket::session::UnixSocketSession,
};

/// Upper bound for a scan to report completion
const SCAN_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest wait a client may ask for
const MAX_WAIT_MS: u64 = 600_000;

/// JSON-RPC request handler
pub struct RequestHandler<D: RadioDriver, S: KeyValueStore> {
    manager: Arc<LinkManager<D, S>>,
}

impl<D: RadioDriver, S: KeyValueStore> RequestHandler<D, S> {
    /// Create a new request handler
    pub fn new(manager: Arc<LinkManager<D, S>>) -> Self {
        Self { manager }
    }

    /// Handle a JSON-RPC request
    ///
    /// Scan results are pushed to `session` as notifications before the
    /// response is returned.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        session: &UnixSocketSession,
    ) -> JsonRpcResponse {
        let id = request.id;
        let result = match request.request {
            Request::Start => self.handle_start().await,
            Request::Stop => self.handle_stop().await,
            Request::Scan => self.handle_scan(session).await,
            Request::Connect(params) => self.handle_connect(params).await,
            Request::WaitConnected(params) => self.handle_wait_connected(params).await,
            Request::Status => Ok(Response::Status(StatusResponse::ok(
                self.manager.status().await,
            ))),
            Request::Version => self.handle_version().await,
            Request::ClearCredentials => self.handle_clear_credentials().await,
        };

        match result {
            Ok(response) => JsonRpcResponse::success(response, id),
            Err(error) => JsonRpcResponse::error(error, id),
        }
    }

    async fn handle_start(&self) -> Result<Response, JsonRpcError> {
        let outcome = self
            .manager
            .start()
            .await
            .map_err(|e| JsonRpcError::from(&e))?;
        Ok(Response::Start(StartResponse::ok(outcome)))
    }

    async fn handle_stop(&self) -> Result<Response, JsonRpcError> {
        self.manager.stop().await;
        Ok(Response::Ack(AckResponse::ok()))
    }

    async fn handle_scan(&self, session: &UnixSocketSession) -> Result<Response, JsonRpcError> {
        let mut stream = self
            .manager
            .scan()
            .await
            .map_err(|e| JsonRpcError::from(&e))?;

        let forward = async {
            let mut count = 0u32;
            while let Some(result) = stream.next().await {
                count += 1;
                let notification = JsonRpcNotification::new(Notification::ScanResult(result));
                if let Err(e) = session.send_notification(&notification).await {
                    // Keep draining so the session still gets its response
                    debug!("Failed to send scan result to {}: {}", session.id(), e);
                }
            }
            count
        };

        match tokio::time::timeout(SCAN_TIMEOUT, forward).await {
            Ok(count) => Ok(Response::ScanComplete(ScanCompleteResponse::ok(count))),
            Err(_) => {
                warn!("Scan did not complete within {:?}", SCAN_TIMEOUT);
                self.manager.abort_scan().await;
                Err(JsonRpcError::timeout())
            }
        }
    }

    async fn handle_connect(&self, params: ConnectParams) -> Result<Response, JsonRpcError> {
        self.manager
            .connect(&params.ssid, params.password.as_deref())
            .await
            .map_err(|e| JsonRpcError::from(&e))?;
        Ok(Response::Ack(AckResponse::ok()))
    }

    async fn handle_wait_connected(
        &self,
        params: WaitConnectedParams,
    ) -> Result<Response, JsonRpcError> {
        if params.timeout_ms > MAX_WAIT_MS {
            return Err(JsonRpcError::invalid_params(format!(
                "timeout_ms must not exceed {MAX_WAIT_MS}"
            )));
        }

        let outcome = self
            .manager
            .wait_connected(Duration::from_millis(params.timeout_ms))
            .await;
        Ok(Response::WaitConnected(WaitConnectedResponse::ok(outcome)))
    }

    async fn handle_version(&self) -> Result<Response, JsonRpcError> {
        let version = self
            .manager
            .version()
            .await
            .map_err(|e| JsonRpcError::from(&e))?;
        Ok(Response::Version(VersionResponse::ok(version)))
    }

    async fn handle_clear_credentials(&self) -> Result<Response, JsonRpcError> {
        self.manager
            .clear_credentials()
            .await
            .map_err(|e| JsonRpcError::from(&e))?;
        Ok(Response::Ack(AckResponse::ok()))
    }
}

/// Error response for a line that is not a valid request
///
/// Only possible when the line at least carries a usable `id`; anything else
/// cannot be answered.
pub fn reject_line(line: &str) -> Option<JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).ok()?;
    let id: RequestId = serde_json::from_value(value.get("id")?.clone()).ok()?;

    let error = match value.get("method").and_then(Value::as_str) {
        None => JsonRpcError::invalid_request("Missing method"),
        Some(
            "start" | "stop" | "scan" | "connect" | "wait_connected" | "status" | "version"
            | "clear_credentials",
        ) => JsonRpcError::invalid_params("Invalid parameters"),
        Some(_) => JsonRpcError::method_not_found(),
    };
    Some(JsonRpcResponse::error(error, id))
}
