// src/registry.rs
//
// Client-side registry of discovered devices.
//
// The registry is the only state the console keeps between commands: an
// ordered list of device handles, insertion order = discovery order, so menu
// numbering stays stable. Everything else (open/online/polling, description)
// is re-queried from the driver on every render.

use crate::driver::{CanDriver, DeviceHandle};

/// One row of a device listing with live-queried state.
#[derive(Clone, Debug)]
pub struct DeviceListing {
    /// 1-based index as shown to the operator.
    pub index: usize,
    pub handle: DeviceHandle,
    /// `None` when the driver could not describe the device; the row degrades
    /// to a placeholder instead of aborting the listing.
    pub description: Option<String>,
    pub open: bool,
    pub online: bool,
    pub polling: bool,
}

/// Ordered set of known devices. No duplicate handles.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceHandle>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the driver to enumerate devices and append any handle not already
    /// known. Existing entries are never removed or reordered. Returns the
    /// number of devices added; zero is not an error.
    pub fn scan<D: CanDriver>(&mut self, driver: &mut D, capacity: usize) -> usize {
        let found = driver.find_all_devices(capacity);
        let mut added = 0;
        for handle in found {
            if !self.devices.contains(&handle) {
                self.devices.push(handle);
                added += 1;
            }
        }
        added
    }

    /// Build a listing row per device with state re-queried from the driver.
    pub fn list<D: CanDriver>(&self, driver: &D) -> Vec<DeviceListing> {
        self.devices
            .iter()
            .enumerate()
            .map(|(i, &handle)| DeviceListing {
                index: i + 1,
                handle,
                description: driver.describe_device(handle).ok(),
                open: driver.is_open(handle),
                online: driver.is_online(handle),
                polling: driver.is_polling_enabled(handle),
            })
            .collect()
    }

    /// Drop a device after a confirmed close. No-op when the handle is not
    /// present — closing an already-removed device must not crash the session.
    pub fn remove(&mut self, handle: DeviceHandle) {
        self.devices.retain(|&h| h != handle);
    }

    /// Handle at 1-based operator index.
    pub fn get(&self, index: usize) -> Option<DeviceHandle> {
        if index == 0 {
            return None;
        }
        self.devices.get(index - 1).copied()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimCanDriver;

    #[test]
    fn test_scan_appends_discovered_devices() {
        let mut driver = SimCanDriver::with_devices(3);
        let mut registry = DeviceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.scan(&mut driver, 99), 3);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_double_scan_does_not_duplicate() {
        let mut driver = SimCanDriver::with_devices(2);
        let mut registry = DeviceRegistry::new();
        assert_eq!(registry.scan(&mut driver, 99), 2);
        assert_eq!(registry.scan(&mut driver, 99), 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_scan_respects_capacity() {
        let mut driver = SimCanDriver::with_devices(5);
        let mut registry = DeviceRegistry::new();
        assert_eq!(registry.scan(&mut driver, 2), 2);
        assert_eq!(registry.len(), 2);
        // A later scan with room picks up the rest.
        assert_eq!(registry.scan(&mut driver, 99), 3);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_list_reflects_live_state() {
        let mut driver = SimCanDriver::with_devices(1);
        let mut registry = DeviceRegistry::new();
        registry.scan(&mut driver, 99);

        let rows = registry.list(&driver);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 1);
        assert!(!rows[0].open);

        let handle = rows[0].handle;
        driver.open_device(handle).expect("open");
        let rows = registry.list(&driver);
        assert!(rows[0].open);
        assert!(rows[0].description.is_some());
    }

    #[test]
    fn test_remove_is_noop_for_unknown_handle() {
        let mut driver = SimCanDriver::with_devices(2);
        let mut registry = DeviceRegistry::new();
        registry.scan(&mut driver, 99);
        registry.remove(DeviceHandle(0xdead));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut driver = SimCanDriver::with_devices(3);
        let mut registry = DeviceRegistry::new();
        registry.scan(&mut driver, 99);
        let first = registry.get(1).expect("first");
        let third = registry.get(3).expect("third");
        let second = registry.get(2).expect("second");
        registry.remove(second);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1), Some(first));
        assert_eq!(registry.get(2), Some(third));
    }

    #[test]
    fn test_get_is_one_based() {
        let mut driver = SimCanDriver::with_devices(1);
        let mut registry = DeviceRegistry::new();
        registry.scan(&mut driver, 99);
        assert!(registry.get(0).is_none());
        assert!(registry.get(1).is_some());
        assert!(registry.get(2).is_none());
    }
}
