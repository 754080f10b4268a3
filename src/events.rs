// src/events.rs
//
// Rendering of API- and device-scoped event queues and the last-error record.
//
// The phrasing rules here are observable contract behavior, not incidental
// formatting: 0 records, 1 record and N records each get distinct lines, and
// a failed fetch is reported as a failure — never conflated with an empty
// queue.

use std::io::Write;

use crate::driver::{CanDriver, DeviceHandle, EventRecord};

fn write_records<W: Write>(out: &mut W, records: &[EventRecord]) -> std::io::Result<()> {
    for record in records {
        writeln!(out, "Event 0x{:x}: {}", record.code, record.description)?;
    }
    Ok(())
}

/// Fetch and print up to `max` API-scoped events.
pub fn print_api_events<D: CanDriver, W: Write>(
    driver: &mut D,
    out: &mut W,
    max: usize,
) -> std::io::Result<()> {
    match driver.get_events(max) {
        Ok(events) => {
            if events.len() == 1 {
                writeln!(out, "1 API event found!")?;
            } else {
                writeln!(out, "{} API events found!", events.len())?;
            }
            write_records(out, &events)
        }
        Err(e) => {
            tlog!("[events] API event fetch failed: {}", e);
            writeln!(out, "Failed to get API events!")
        }
    }
}

/// Fetch and print up to `max` events scoped to one device.
pub fn print_device_events<D: CanDriver, W: Write>(
    driver: &mut D,
    out: &mut W,
    device: DeviceHandle,
    max: usize,
) -> std::io::Result<()> {
    match driver.get_device_events(device, max) {
        Ok(events) => {
            if events.len() == 1 {
                writeln!(out, "1 device event found!")?;
            } else {
                writeln!(out, "{} device events found!", events.len())?;
            }
            write_records(out, &events)
        }
        Err(e) => {
            tlog!("[events] device event fetch failed: {}", e);
            writeln!(out, "Failed to get device events!")
        }
    }
}

/// Print the most recent error record, or "No errors found!" when the queue
/// is empty. An empty queue is an answer, not an error.
pub fn print_last_error<D: CanDriver, W: Write>(
    driver: &mut D,
    out: &mut W,
) -> std::io::Result<()> {
    match driver.last_error() {
        Some(error) => writeln!(out, "Error 0x{:x}: {}", error.code, error.description),
        None => writeln!(out, "No errors found!"),
    }
}
