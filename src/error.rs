// src/error.rs
//
// Typed error for driver operations.
//
// Every driver call that can fail returns `DriverError`. The error carries a
// kind, the device/context it happened on, and a human-readable detail. Each
// kind also maps to a stable numeric event code so the driver's last-error
// queue and the typed error agree on what happened.

use std::fmt;

use crate::driver::EventRecord;

/// What went wrong at the driver boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// The device handle does not refer to a known device.
    UnknownDevice,
    /// The operation requires an open device.
    NotOpen,
    /// The device is already in the requested state.
    AlreadyInState,
    /// The operation requires the device to be online.
    Offline,
    /// A parameter was rejected (bad bitrate, oversized payload, ...).
    InvalidParameter,
    /// The device or channel does not support the request.
    Unsupported,
    /// The underlying transport reported a failure.
    Transport,
}

impl DriverErrorKind {
    /// Stable event code reported through the driver's error queue.
    pub fn event_code(self) -> u32 {
        match self {
            DriverErrorKind::UnknownDevice => 0x01,
            DriverErrorKind::NotOpen => 0x02,
            DriverErrorKind::AlreadyInState => 0x03,
            DriverErrorKind::Offline => 0x04,
            DriverErrorKind::InvalidParameter => 0x05,
            DriverErrorKind::Unsupported => 0x06,
            DriverErrorKind::Transport => 0x07,
        }
    }
}

/// Error returned by `CanDriver` operations.
#[derive(Clone, Debug)]
pub struct DriverError {
    pub kind: DriverErrorKind,
    /// Device description or operation the error applies to.
    pub context: String,
    pub detail: String,
}

impl DriverError {
    pub fn new(
        kind: DriverErrorKind,
        context: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            context: context.into(),
            detail: detail.into(),
        }
    }

    pub fn unknown_device(context: impl Into<String>) -> Self {
        Self::new(
            DriverErrorKind::UnknownDevice,
            context,
            "device handle is not known to the driver",
        )
    }

    pub fn not_open(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::NotOpen, context, detail)
    }

    pub fn already_in_state(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::AlreadyInState, context, detail)
    }

    pub fn offline(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Offline, context, detail)
    }

    pub fn invalid_parameter(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::InvalidParameter, context, detail)
    }

    pub fn unsupported(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Unsupported, context, detail)
    }

    pub fn transport(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Transport, context, detail)
    }

    /// Render this error as an event record for the driver's error queue.
    pub fn to_event(&self) -> EventRecord {
        EventRecord {
            code: self.kind.event_code(),
            description: self.to_string(),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.detail)
    }
}

impl std::error::Error for DriverError {}
