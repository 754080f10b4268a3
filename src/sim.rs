// src/sim.rs
//
// Simulated CAN interface driver.
//
// Implements the full `CanDriver` surface against in-process state so the
// console can be exercised end to end with no hardware attached: device
// open/online/polling lifecycles, a supported-bitrate table with two-step
// commit, synthetic RX traffic, and per-device plus API event queues. Every
// failed operation also lands on the error queue that `last_error` drains,
// matching how a real driver reports through its event system.

use std::collections::HashMap;

use crate::driver::{
    netid, CanDriver, CanRxFrame, CanTransmitFrame, DeviceHandle, DriverVersion, EventRecord,
    RawFrame, ReceivedMessage,
};
use crate::error::DriverError;

/// Bitrates the simulated hardware accepts. Anything else is rejected at
/// `set_bitrate` time, before the apply step.
pub const SUPPORTED_BITRATES: &[u32] = &[
    20_000, 33_333, 50_000, 83_333, 100_000, 125_000, 250_000, 500_000, 800_000, 1_000_000,
];

/// Channels present on every simulated device.
const CHANNELS: &[u16] = &[netid::HSCAN, netid::MSCAN, netid::HSCAN2];

const DEFAULT_BITRATE: u32 = 500_000;

/// Driver-side default when the client never sets a polling limit.
const DEFAULT_POLL_LIMIT: usize = 20_000;

#[derive(Debug)]
struct SimDevice {
    description: String,
    open: bool,
    online: bool,
    polling: bool,
    poll_limit: usize,
    /// Committed bitrate per channel.
    bitrates: HashMap<u16, u32>,
    /// Bitrate staged by `set_bitrate`, committed by `apply_settings`.
    staged_bitrate: Option<(u16, u32)>,
    events: Vec<EventRecord>,
    /// Counter for synthetic RX traffic, so repeated reads differ.
    rx_seq: u32,
    /// Test/demo hook: makes `describe_device` fail for this device.
    describe_fails: bool,
    /// Test/demo hook: makes `apply_settings` fail for this device.
    apply_fails: bool,
}

impl SimDevice {
    fn new(description: String) -> Self {
        Self {
            description,
            open: false,
            online: false,
            polling: false,
            poll_limit: DEFAULT_POLL_LIMIT,
            bitrates: CHANNELS.iter().map(|&c| (c, DEFAULT_BITRATE)).collect(),
            staged_bitrate: None,
            events: Vec::new(),
            rx_seq: 0,
            describe_fails: false,
            apply_fails: false,
        }
    }
}

/// In-process simulated driver. Deterministic: the same command sequence
/// always produces the same traffic and events.
#[derive(Debug)]
pub struct SimCanDriver {
    devices: Vec<DeviceHandle>,
    table: HashMap<DeviceHandle, SimDevice>,
    api_events: Vec<EventRecord>,
    error_queue: Vec<EventRecord>,
    /// Monotonic device clock shared by all simulated devices.
    clock: u64,
}

impl Default for SimCanDriver {
    fn default() -> Self {
        Self::with_devices(2)
    }
}

impl SimCanDriver {
    /// Create a driver presenting `count` simulated two-channel devices.
    pub fn with_devices(count: usize) -> Self {
        let mut devices = Vec::with_capacity(count);
        let mut table = HashMap::with_capacity(count);
        for i in 0..count {
            let handle = DeviceHandle(i as u32 + 1);
            devices.push(handle);
            table.insert(
                handle,
                SimDevice::new(format!("SimCAN 2000 (SIM{:04})", i + 1)),
            );
        }
        Self {
            devices,
            table,
            api_events: Vec::new(),
            error_queue: Vec::new(),
            clock: 0,
        }
    }

    /// Queue an API-scoped event. Test/demo hook.
    pub fn push_api_event(&mut self, event: EventRecord) {
        self.api_events.push(event);
    }

    /// Queue an event on one device's queue. Test/demo hook.
    pub fn push_device_event(&mut self, device: DeviceHandle, event: EventRecord) {
        if let Some(dev) = self.table.get_mut(&device) {
            dev.events.push(event);
        }
    }

    /// Make `describe_device` fail for one device. Test/demo hook for the
    /// degraded-listing path.
    pub fn set_describe_failure(&mut self, device: DeviceHandle, fails: bool) {
        if let Some(dev) = self.table.get_mut(&device) {
            dev.describe_fails = fails;
        }
    }

    /// Make `apply_settings` fail for one device. Test/demo hook: a staged
    /// bitrate survives the failed commit and stays uncommitted.
    pub fn set_apply_failure(&mut self, device: DeviceHandle, fails: bool) {
        if let Some(dev) = self.table.get_mut(&device) {
            dev.apply_fails = fails;
        }
    }

    /// Record a failure on the error queue and hand it back to the caller.
    fn fail(&mut self, err: DriverError) -> DriverError {
        self.error_queue.push(err.to_event());
        err
    }

    fn device(&self, handle: DeviceHandle) -> Result<&SimDevice, DriverError> {
        self.table
            .get(&handle)
            .ok_or_else(|| DriverError::unknown_device(format!("device {}", handle.0)))
    }

    fn device_mut(&mut self, handle: DeviceHandle) -> Result<&mut SimDevice, DriverError> {
        self.table
            .get_mut(&handle)
            .ok_or_else(|| DriverError::unknown_device(format!("device {}", handle.0)))
    }

    /// Look up a device and require it to be open, queueing the error if not.
    fn open_device_mut(&mut self, handle: DeviceHandle) -> Result<&mut SimDevice, DriverError> {
        let check = match self.table.get(&handle) {
            None => Some(DriverError::unknown_device(format!("device {}", handle.0))),
            Some(dev) if !dev.open => Some(DriverError::not_open(
                dev.description.clone(),
                "device is not open",
            )),
            Some(_) => None,
        };
        if let Some(err) = check {
            return Err(self.fail(err));
        }
        // Fresh lookup so the mutable borrow starts after the checks.
        match self.table.get_mut(&handle) {
            Some(dev) => Ok(dev),
            None => Err(DriverError::unknown_device(format!("device {}", handle.0))),
        }
    }

    /// Synthesize a batch of buffered traffic for an online, polling device.
    /// Includes a netid-0 placeholder entry, which the formatter suppresses.
    fn generate_traffic(&mut self, handle: DeviceHandle) -> Vec<ReceivedMessage> {
        let clock = &mut self.clock;
        let dev = match self.table.get_mut(&handle) {
            Some(d) => d,
            None => return Vec::new(),
        };
        let mut batch = Vec::new();
        for _ in 0..3 {
            let seq = dev.rx_seq;
            dev.rx_seq = dev.rx_seq.wrapping_add(1);
            *clock += 1;
            batch.push(ReceivedMessage::Can(CanRxFrame {
                netid: netid::HSCAN,
                arbid: 0x100 + (seq % 16),
                data: vec![seq as u8, (seq >> 8) as u8, 0x5a, 0xa5],
                timestamp: *clock,
                extended: false,
                fd: false,
            }));
        }
        // Driver buffers flush with a "no network" placeholder entry.
        *clock += 1;
        batch.push(ReceivedMessage::Frame(RawFrame {
            netid: netid::NONE,
            length: 0,
            timestamp: *clock,
        }));
        batch
    }
}

impl CanDriver for SimCanDriver {
    fn version(&self) -> DriverVersion {
        DriverVersion {
            major: 0,
            minor: 1,
            patch: 0,
        }
    }

    fn find_all_devices(&mut self, capacity: usize) -> Vec<DeviceHandle> {
        self.devices.iter().take(capacity).copied().collect()
    }

    fn describe_device(&self, device: DeviceHandle) -> Result<String, DriverError> {
        let dev = self.device(device)?;
        if dev.describe_fails {
            return Err(DriverError::transport(
                format!("device {}", device.0),
                "description read failed",
            ));
        }
        Ok(dev.description.clone())
    }

    fn is_open(&self, device: DeviceHandle) -> bool {
        self.device(device).map(|d| d.open).unwrap_or(false)
    }

    fn is_online(&self, device: DeviceHandle) -> bool {
        self.device(device).map(|d| d.online).unwrap_or(false)
    }

    fn is_polling_enabled(&self, device: DeviceHandle) -> bool {
        self.device(device).map(|d| d.polling).unwrap_or(false)
    }

    fn open_device(&mut self, device: DeviceHandle) -> Result<(), DriverError> {
        let err = match self.table.get_mut(&device) {
            None => DriverError::unknown_device(format!("device {}", device.0)),
            Some(dev) if dev.open => {
                DriverError::already_in_state(dev.description.clone(), "device is already open")
            }
            Some(dev) => {
                dev.open = true;
                tlog!("[sim] opened {}", dev.description);
                return Ok(());
            }
        };
        Err(self.fail(err))
    }

    fn close_device(&mut self, device: DeviceHandle) -> Result<(), DriverError> {
        let dev = self.open_device_mut(device)?;
        dev.open = false;
        dev.online = false;
        dev.polling = false;
        dev.staged_bitrate = None;
        tlog!("[sim] closed {}", dev.description);
        Ok(())
    }

    fn go_online(&mut self, device: DeviceHandle) -> Result<(), DriverError> {
        let dev = self.open_device_mut(device)?;
        dev.online = true;
        Ok(())
    }

    fn go_offline(&mut self, device: DeviceHandle) -> Result<(), DriverError> {
        let dev = self.open_device_mut(device)?;
        dev.online = false;
        Ok(())
    }

    fn enable_polling(&mut self, device: DeviceHandle) -> Result<(), DriverError> {
        let dev = self.open_device_mut(device)?;
        dev.polling = true;
        Ok(())
    }

    fn disable_polling(&mut self, device: DeviceHandle) -> Result<(), DriverError> {
        let dev = self.open_device_mut(device)?;
        dev.polling = false;
        Ok(())
    }

    fn set_polling_limit(
        &mut self,
        device: DeviceHandle,
        limit: usize,
    ) -> Result<(), DriverError> {
        if limit == 0 {
            let err =
                DriverError::invalid_parameter("polling limit", "limit must be greater than zero");
            return Err(self.fail(err));
        }
        let dev = self.open_device_mut(device)?;
        dev.poll_limit = limit;
        Ok(())
    }

    fn get_messages(
        &mut self,
        device: DeviceHandle,
        max: usize,
        since: u64,
    ) -> Result<Vec<ReceivedMessage>, DriverError> {
        let (online, polling, description) = {
            let dev = self.open_device_mut(device)?;
            (dev.online, dev.polling, dev.description.clone())
        };
        if !polling {
            let err =
                DriverError::unsupported(description, "message polling is not enabled");
            return Err(self.fail(err));
        }
        if !online {
            // Offline devices buffer nothing; an empty read is a valid answer.
            return Ok(Vec::new());
        }
        let mut batch = self.generate_traffic(device);
        batch.retain(|msg| match msg {
            ReceivedMessage::Can(f) => f.timestamp > since,
            ReceivedMessage::Frame(f) => f.timestamp > since,
        });
        // More buffered than requested is silently truncated, by contract.
        batch.truncate(max);
        Ok(batch)
    }

    fn transmit(
        &mut self,
        device: DeviceHandle,
        frame: &CanTransmitFrame,
    ) -> Result<(), DriverError> {
        let (online, description) = {
            let dev = self.open_device_mut(device)?;
            (dev.online, dev.description.clone())
        };
        let err = if !online {
            DriverError::offline(description, "device must be online to transmit")
        } else if !CHANNELS.contains(&frame.netid) {
            DriverError::unsupported(description, format!("no channel with netid {}", frame.netid))
        } else if !frame.is_fd && frame.data.len() > 8 {
            DriverError::invalid_parameter(
                description,
                format!("classic CAN payload of {} bytes exceeds 8", frame.data.len()),
            )
        } else {
            tlog!(
                "[sim] tx 0x{:03x} on netid {}: {}",
                frame.arbid,
                frame.netid,
                hex::encode(&frame.data)
            );
            return Ok(());
        };
        Err(self.fail(err))
    }

    fn get_events(&mut self, max: usize) -> Result<Vec<EventRecord>, DriverError> {
        let take = self.api_events.len().min(max);
        Ok(self.api_events.drain(..take).collect())
    }

    fn get_device_events(
        &mut self,
        device: DeviceHandle,
        max: usize,
    ) -> Result<Vec<EventRecord>, DriverError> {
        match self.table.get_mut(&device) {
            Some(dev) => {
                let take = dev.events.len().min(max);
                Ok(dev.events.drain(..take).collect())
            }
            None => {
                let err = DriverError::unknown_device(format!("device {}", device.0));
                Err(self.fail(err))
            }
        }
    }

    fn last_error(&mut self) -> Option<EventRecord> {
        self.error_queue.pop()
    }

    fn set_bitrate(
        &mut self,
        device: DeviceHandle,
        channel: u16,
        bitrate: u32,
    ) -> Result<(), DriverError> {
        let description = {
            let dev = self.open_device_mut(device)?;
            dev.description.clone()
        };
        let err = if !CHANNELS.contains(&channel) {
            DriverError::unsupported(description, format!("no channel with netid {}", channel))
        } else if !SUPPORTED_BITRATES.contains(&bitrate) {
            DriverError::invalid_parameter(
                description,
                format!("{} bps is not a supported bitrate", bitrate),
            )
        } else {
            if let Some(dev) = self.table.get_mut(&device) {
                dev.staged_bitrate = Some((channel, bitrate));
            }
            return Ok(());
        };
        Err(self.fail(err))
    }

    fn apply_settings(&mut self, device: DeviceHandle) -> Result<(), DriverError> {
        let dev = self.open_device_mut(device)?;
        if dev.apply_fails {
            let err = DriverError::transport(dev.description.clone(), "settings write failed");
            return Err(self.fail(err));
        }
        if let Some((channel, bitrate)) = dev.staged_bitrate.take() {
            dev.bitrates.insert(channel, bitrate);
            tlog!(
                "[sim] committed {} bps on netid {} for {}",
                bitrate,
                channel,
                dev.description
            );
        }
        Ok(())
    }
}
