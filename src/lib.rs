// src/lib.rs
//
// Interactive session console for multi-device CAN interface hardware.
//
// The console discovers devices exposed by a driver, lets an operator
// open/close them, toggle online state, configure message polling and bus
// bitrate, transmit and receive frames, and inspect event queues. The driver
// is abstracted behind the `CanDriver` trait; a deterministic simulated
// driver backs the shipped binary and the integration tests.

#[macro_use]
pub mod logging;

pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod format;
pub mod input;
pub mod registry;
pub mod session;
pub mod sim;

pub use config::ConsoleConfig;
pub use driver::{
    CanDriver, CanRxFrame, CanTransmitFrame, DeviceHandle, DriverVersion, EventRecord, RawFrame,
    ReceivedMessage,
};
pub use error::{DriverError, DriverErrorKind};
pub use registry::DeviceRegistry;
pub use session::{Session, SessionExit};
pub use sim::SimCanDriver;
