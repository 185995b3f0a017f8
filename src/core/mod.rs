//! Core link management logic

pub mod auto_connect;
pub mod connector;
pub mod credentials;
pub mod error;
pub mod flags;
pub mod regdb;
pub mod scanner;
pub mod service;
pub mod types;
