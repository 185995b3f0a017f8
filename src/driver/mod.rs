//! Radio driver abstraction layer

pub mod radio;
pub mod sim;

pub use radio::{
    LinkCallback, RadioDriver, ScanCompleteCallback, ScanResultCallback, StatusCallback,
};
pub use sim::{ConnectBehavior, SimulatedNetwork, SimulatedRadio};
