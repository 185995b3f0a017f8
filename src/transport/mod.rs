//! Command transports

pub mod unix_socket;
