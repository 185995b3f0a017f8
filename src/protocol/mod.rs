//! Protocol message definitions

pub mod jsonrpc;
pub mod notification;
pub mod request;
pub mod response;

pub use {
    jsonrpc::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId},
    notification::Notification,
    request::{ConnectParams, Request, WaitConnectedParams},
    response::{
        AckResponse, Response, ScanCompleteResponse, StartResponse, StatusResponse,
        VersionResponse, WaitConnectedResponse,
    },
};
