// src/driver.rs
//
// Driver abstraction for CAN interface hardware.
//
// The console never talks to hardware directly — everything goes through the
// `CanDriver` trait. A driver owns the device resources for the process
// lifetime; the console holds opaque `DeviceHandle` keys and re-queries live
// state (open/online/polling) on every render rather than caching it.

use crate::error::DriverError;

// ============================================================================
// Network identifiers
// ============================================================================

/// Logical channel identifiers on a multi-channel interface device.
/// Netid 0 is reserved as the "no network" placeholder.
pub mod netid {
    pub const NONE: u16 = 0;
    /// High-speed CAN, the primary channel on every supported device.
    pub const HSCAN: u16 = 1;
    pub const MSCAN: u16 = 2;
    pub const HSCAN2: u16 = 3;
}

// ============================================================================
// Shared Types
// ============================================================================

/// Opaque device identity. The driver owns the underlying resource; the
/// console only holds the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeviceHandle(pub u32);

/// Driver/API version triple, reported once at session start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// A received CAN frame as reported by the driver.
#[derive(Clone, Debug)]
pub struct CanRxFrame {
    /// Logical channel the frame arrived on.
    pub netid: u16,
    /// Arbitration id (11-bit standard or 29-bit extended).
    pub arbid: u32,
    /// Payload, 0-8 bytes for classic CAN.
    pub data: Vec<u8>,
    /// Monotonic device clock. Unit is device-defined; treated as opaque.
    pub timestamp: u64,
    pub extended: bool,
    pub fd: bool,
}

/// A received frame on a non-CAN network. Only the channel and length are
/// meaningful to the console.
#[derive(Clone, Debug)]
pub struct RawFrame {
    pub netid: u16,
    pub length: usize,
    pub timestamp: u64,
}

/// One entry from a batch read. Produced by the driver, consumed once by the
/// formatter, then discarded.
#[derive(Clone, Debug)]
pub enum ReceivedMessage {
    Can(CanRxFrame),
    Frame(RawFrame),
}

/// CAN frame for transmission.
#[derive(Clone, Debug)]
pub struct CanTransmitFrame {
    /// Logical channel to transmit on.
    pub netid: u16,
    /// CAN frame ID (11-bit standard or 29-bit extended).
    pub arbid: u32,
    /// Frame data (up to 8 bytes for classic CAN).
    pub data: Vec<u8>,
    /// Extended (29-bit) frame ID
    pub is_extended: bool,
    /// CAN FD frame
    pub is_fd: bool,
    /// Bit Rate Switch (CAN FD only)
    pub is_brs: bool,
}

/// A driver- or API-level status/error notification, distinct from bus
/// traffic. Queues are snapshot reads; the console never merges them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub code: u32,
    pub description: String,
}

// ============================================================================
// Driver Trait
// ============================================================================

/// Capability surface of the underlying CAN driver.
///
/// All calls are synchronous and blocking, returning a definitive outcome.
/// Failed operations also push a record onto the driver's error queue which
/// callers retrieve with `last_error` for operator display. `get_messages`
/// may silently truncate to `max` — accepted lossy behavior, not an error.
pub trait CanDriver {
    /// Driver/API version.
    fn version(&self) -> DriverVersion;

    /// Enumerate currently visible devices, up to `capacity` handles.
    /// Devices already known to the caller may appear again; deduplication is
    /// the registry's job.
    fn find_all_devices(&mut self, capacity: usize) -> Vec<DeviceHandle>;

    /// Human-readable product description for a device.
    fn describe_device(&self, device: DeviceHandle) -> Result<String, DriverError>;

    fn is_open(&self, device: DeviceHandle) -> bool;
    fn is_online(&self, device: DeviceHandle) -> bool;
    fn is_polling_enabled(&self, device: DeviceHandle) -> bool;

    fn open_device(&mut self, device: DeviceHandle) -> Result<(), DriverError>;
    fn close_device(&mut self, device: DeviceHandle) -> Result<(), DriverError>;
    fn go_online(&mut self, device: DeviceHandle) -> Result<(), DriverError>;
    fn go_offline(&mut self, device: DeviceHandle) -> Result<(), DriverError>;

    fn enable_polling(&mut self, device: DeviceHandle) -> Result<(), DriverError>;
    fn disable_polling(&mut self, device: DeviceHandle) -> Result<(), DriverError>;
    fn set_polling_limit(&mut self, device: DeviceHandle, limit: usize)
        -> Result<(), DriverError>;

    /// Drain up to `max` buffered messages received since `since` (device
    /// clock). More than `max` buffered frames are silently truncated.
    fn get_messages(
        &mut self,
        device: DeviceHandle,
        max: usize,
        since: u64,
    ) -> Result<Vec<ReceivedMessage>, DriverError>;

    fn transmit(
        &mut self,
        device: DeviceHandle,
        frame: &CanTransmitFrame,
    ) -> Result<(), DriverError>;

    /// Drain up to `max` API-scoped events. Flushes the queue.
    fn get_events(&mut self, max: usize) -> Result<Vec<EventRecord>, DriverError>;

    /// Drain up to `max` device-scoped events. Flushes the device's queue.
    fn get_device_events(
        &mut self,
        device: DeviceHandle,
        max: usize,
    ) -> Result<Vec<EventRecord>, DriverError>;

    /// Most recent error record, if any. Consumes the record.
    fn last_error(&mut self) -> Option<EventRecord>;

    /// Stage a bitrate change for a channel. Takes effect only after a
    /// subsequent `apply_settings` commit.
    fn set_bitrate(
        &mut self,
        device: DeviceHandle,
        channel: u16,
        bitrate: u32,
    ) -> Result<(), DriverError>;

    /// Commit staged settings to the device.
    fn apply_settings(&mut self, device: DeviceHandle) -> Result<(), DriverError>;
}
