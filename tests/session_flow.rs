// tests/session_flow.rs
//
// End-to-end session tests: scripted operator input through the full menu
// loop against the simulated driver, asserting on the rendered transcript.

use std::io::Cursor;

use canconsole::{CanDriver, ConsoleConfig, Session, SessionExit, SimCanDriver};

/// Run a full session over scripted input and return the exit plus the
/// operator-facing transcript.
fn run_session(driver: SimCanDriver, script: &str) -> (SessionExit, String) {
    let input = Cursor::new(script.as_bytes().to_vec());
    let mut output = Vec::new();
    let exit = {
        let mut session = Session::new(driver, ConsoleConfig::default(), input, &mut output);
        session.run().expect("session I/O")
    };
    (exit, String::from_utf8(output).expect("utf8 transcript"))
}

#[test]
fn full_device_lifecycle() {
    let driver = SimCanDriver::with_devices(2);
    // scan, open #1, online #1, enable polling #1, get messages, send,
    // bitrate 250k, API events, device events, close #1, exit
    let script = "b\n\
                  c\n1\n1\n\
                  d\n1\n1\n\
                  e\n1\n1\n\
                  f\n1\n\
                  g\n1\n\
                  i\n1\n\
                  h\n1\n\
                  h\n2\n1\n\
                  c\n1\n2\n\
                  x\n";
    let (exit, out) = run_session(driver, script);
    assert_eq!(exit, SessionExit::Clean);

    assert!(out.contains("CAN driver version 0.1.0"));
    assert!(out.contains("2 new devices found!"));
    assert!(out.contains("SimCAN 2000 (SIM0001) successfully opened!"));
    assert!(out.contains("SimCAN 2000 (SIM0001) successfully went online!"));
    assert!(out.contains("Successfully enabled message polling for SimCAN 2000 (SIM0001)!"));
    assert!(out.contains("Successfully set message polling limit for SimCAN 2000 (SIM0001)!"));
    // The sim delivers 3 CAN frames plus one suppressed placeholder: the
    // count line includes it, the rendered lines do not.
    assert!(out.contains("4 messages received from SimCAN 2000 (SIM0001)!"));
    assert_eq!(out.matches("\t0x1").count(), 3);
    assert!(out.contains("Message transmit successful!"));
    assert!(out.contains("Successfully set HS CAN baudrate for SimCAN 2000 (SIM0001) to 250k!"));
    assert!(out.contains("0 API events found!"));
    assert!(out.contains("0 device events found!"));
    assert!(out.contains("Successfully closed SimCAN 2000 (SIM0001)!"));
    assert!(out.contains("Exiting program"));
}

#[test]
fn device_commands_need_a_scan_first() {
    let driver = SimCanDriver::with_devices(2);
    // Open/close, get messages and send all bail out before prompting when
    // the registry is empty.
    let (exit, out) = run_session(driver, "c\nf\ng\nx\n");
    assert_eq!(exit, SessionExit::Clean);
    assert_eq!(
        out.matches("No devices found! Please scan for new devices.")
            .count(),
        3
    );
    // No selection prompt ever appeared.
    assert!(!out.contains("Please select a device:"));
}

#[test]
fn out_of_range_selection_reprompts() {
    let driver = SimCanDriver::with_devices(2);
    // Select 9, then 3 (both out of range), then 1, then cancel.
    let (exit, out) = run_session(driver, "b\nc\n9\n3\n1\n3\nx\n");
    assert_eq!(exit, SessionExit::Clean);
    assert_eq!(out.matches("Selected device out of range!").count(), 2);
    assert!(out.contains("Canceling!"));
}

#[test]
fn unexpected_top_level_input_is_fatal() {
    let driver = SimCanDriver::with_devices(1);
    let (exit, out) = run_session(driver, "q\n");
    assert_eq!(exit, SessionExit::UnexpectedInput);
    assert!(out.contains("Unexpected input, exiting!"));
}

#[test]
fn sub_menu_input_reprompts_instead_of_exiting() {
    let driver = SimCanDriver::with_devices(1);
    // 'z' inside the open/close sub-menu re-prompts; the same character at
    // the top level would have ended the session.
    let (exit, out) = run_session(driver, "b\nc\n1\nz\n3\nx\n");
    assert_eq!(exit, SessionExit::Clean);
    assert!(out.contains("Input did not match expected options. Please try again."));
    assert!(out.contains("Canceling!"));
    assert!(out.contains("Exiting program"));
}

#[test]
fn closed_device_is_no_longer_selectable() {
    let driver = SimCanDriver::with_devices(2);
    // Open and close device 1, then try to select index 2 — only one device
    // remains so it re-prompts; index 1 now resolves to the second device.
    let script = "b\n\
                  c\n1\n1\n\
                  c\n1\n2\n\
                  c\n2\n1\n3\n\
                  x\n";
    let (exit, out) = run_session(driver, script);
    assert_eq!(exit, SessionExit::Clean);
    assert!(out.contains("Successfully closed SimCAN 2000 (SIM0001)!"));
    assert!(out.contains("Selected device out of range!"));
    assert!(out.contains("Would you like to open or close SimCAN 2000 (SIM0002)?"));
}

#[test]
fn rescan_after_close_rediscovers_without_duplicates() {
    let driver = SimCanDriver::with_devices(2);
    // Close device 1, rescan: the closed device comes back, the still-known
    // device is not duplicated.
    let script = "b\n\
                  c\n1\n1\n\
                  c\n1\n2\n\
                  b\n\
                  x\n";
    let (exit, out) = run_session(driver, script);
    assert_eq!(exit, SessionExit::Clean);
    assert!(out.contains("1 new device found!"));
    // After the rescan the surviving device keeps its slot and the
    // re-discovered one is appended.
    assert!(out.contains("[1] SimCAN 2000 (SIM0002)"));
    assert!(out.contains("[2] SimCAN 2000 (SIM0001)"));
}

#[test]
fn double_scan_reports_zero_new_devices() {
    let driver = SimCanDriver::with_devices(2);
    let (exit, out) = run_session(driver, "b\nb\nx\n");
    assert_eq!(exit, SessionExit::Clean);
    assert!(out.contains("2 new devices found!"));
    assert!(out.contains("0 new devices found!"));
}

#[test]
fn failed_operation_reports_last_error() {
    let driver = SimCanDriver::with_devices(1);
    // Going online without opening first fails; the driver's last-error
    // record follows the failure message.
    let (exit, out) = run_session(driver, "b\nd\n1\n1\nx\n");
    assert_eq!(exit, SessionExit::Clean);
    assert!(out.contains("SimCAN 2000 (SIM0001) failed to go online!"));
    assert!(out.contains("Error 0x2: SimCAN 2000 (SIM0001): device is not open"));
}

#[test]
fn description_failure_degrades_listing_row() {
    let mut driver = SimCanDriver::with_devices(2);
    let handle = driver.find_all_devices(99)[0];
    driver.set_describe_failure(handle, true);
    let (exit, out) = run_session(driver, "b\na\nx\n");
    assert_eq!(exit, SessionExit::Clean);
    assert!(out.contains("Description for device 1 not available!"));
    // The other row still renders normally.
    assert!(out.contains("[2] SimCAN 2000 (SIM0002)"));
}

#[test]
fn bitrate_failure_without_open_reports_combined_failure() {
    let driver = SimCanDriver::with_devices(1);
    // Device not open: set_bitrate fails, apply never runs, one combined
    // failure message plus the last-error record.
    let (exit, out) = run_session(driver, "b\ni\n1\nx\n");
    assert_eq!(exit, SessionExit::Clean);
    assert!(out.contains("Failed to set HS CAN for SimCAN 2000 (SIM0001) to 250k!"));
    assert!(out.contains("Error 0x"));
    assert!(!out.contains("Successfully set HS CAN baudrate"));
}

#[test]
fn apply_failure_after_staged_bitrate_reports_combined_failure() {
    let mut driver = SimCanDriver::with_devices(1);
    let handle = driver.find_all_devices(99)[0];
    driver.set_apply_failure(handle, true);
    // Open the device so staging succeeds; the settings commit then fails.
    // The operator sees one combined failure message plus the last-error
    // record, never a success line.
    let (exit, out) = run_session(driver, "b\nc\n1\n1\ni\n1\nx\n");
    assert_eq!(exit, SessionExit::Clean);
    assert!(out.contains("Failed to set HS CAN for SimCAN 2000 (SIM0001) to 250k!"));
    assert!(out.contains("Error 0x7: SimCAN 2000 (SIM0001): settings write failed"));
    assert!(!out.contains("Successfully set HS CAN baudrate"));
}

#[test]
fn cancel_paths_leave_no_side_effects() {
    let driver = SimCanDriver::with_devices(1);
    // Cancel open/close, polling and events sub-menus, then list: the device
    // is still closed with polling off.
    let script = "b\n\
                  c\n1\n3\n\
                  e\n1\n3\n\
                  h\n3\n\
                  a\n\
                  x\n";
    let (exit, out) = run_session(driver, script);
    assert_eq!(exit, SessionExit::Clean);
    assert_eq!(out.matches("Canceling!").count(), 3);
    assert!(out.contains("Connected: No\tOnline: No\tMsg Polling: Off"));
}

#[test]
fn api_events_render_through_menu() {
    let mut driver = SimCanDriver::with_devices(1);
    driver.push_api_event(canconsole::EventRecord {
        code: 0x30,
        description: "firmware mismatch".to_string(),
    });
    let (exit, out) = run_session(driver, "h\n1\nx\n");
    assert_eq!(exit, SessionExit::Clean);
    assert!(out.contains("1 API event found!"));
    assert!(out.contains("Event 0x30: firmware mismatch"));
}

#[test]
fn end_of_input_at_main_menu_exits_cleanly() {
    let driver = SimCanDriver::with_devices(1);
    let (exit, out) = run_session(driver, "a\n");
    assert_eq!(exit, SessionExit::Clean);
    assert!(out.contains("No devices found! Please scan for new devices."));
}
