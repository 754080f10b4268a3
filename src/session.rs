// src/session.rs
//
// Interactive session controller: the top-level menu loop and the
// per-command handlers.
//
// Single-threaded and blocking by design — every command runs to completion
// before the next input is read, so no two driver calls ever overlap. The
// session owns the driver, the device registry, and the config (including
// the polling limit); all operator-facing text goes to the session writer,
// diagnostics go through `tlog!` to stderr.

use std::io::{BufRead, ErrorKind, Write};

use crate::config::ConsoleConfig;
use crate::driver::{netid, CanDriver, DeviceHandle};
use crate::events;
use crate::format;
use crate::input;
use crate::registry::DeviceRegistry;

/// Digits accepted by the device-selection prompt. Selection is re-validated
/// against the live registry count, so a maximum of 9 devices are selectable.
const DEVICE_DIGITS: &[char] = &['1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// How an interactive session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionExit {
    /// Explicit exit command or end of input at the main menu.
    Clean,
    /// A top-level character outside the declared menu set. Fatal by
    /// contract — only sub-menus re-prompt on bad input.
    UnexpectedInput,
}

/// Interactive session over a driver, an input stream, and an output stream.
pub struct Session<D, R, W> {
    driver: D,
    registry: DeviceRegistry,
    config: ConsoleConfig,
    input: R,
    output: W,
}

impl<D: CanDriver, R: BufRead, W: Write> Session<D, R, W> {
    pub fn new(driver: D, config: ConsoleConfig, input: R, output: W) -> Self {
        Self {
            driver,
            registry: DeviceRegistry::new(),
            config,
            input,
            output,
        }
    }

    /// Run the menu loop until the operator exits.
    pub fn run(&mut self) -> std::io::Result<SessionExit> {
        let version = self.driver.version();
        writeln!(
            self.output,
            "CAN driver version {}.{}.{}\n",
            version.major, version.minor, version.patch
        )?;

        loop {
            self.print_main_menu()?;
            writeln!(self.output)?;
            let choice = match input::read_raw(&mut self.input) {
                Ok(Some(c)) => c,
                // Blank line: show the menu again.
                Ok(None) => continue,
                // End of input at the main menu is a normal way to leave.
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    tlog!("[session] end of input, exiting");
                    return Ok(SessionExit::Clean);
                }
                Err(e) => return Err(e),
            };
            writeln!(self.output)?;

            match choice {
                'A' | 'a' => self.cmd_list()?,
                'B' | 'b' => self.cmd_scan()?,
                'C' | 'c' => self.cmd_open_close()?,
                'D' | 'd' => self.cmd_online_offline()?,
                'E' | 'e' => self.cmd_polling()?,
                'F' | 'f' => self.cmd_get_messages()?,
                'G' | 'g' => self.cmd_send_message()?,
                'H' | 'h' => self.cmd_events()?,
                'I' | 'i' => self.cmd_set_bitrate(250_000, "250k")?,
                'J' | 'j' => self.cmd_set_bitrate(500_000, "500k")?,
                'X' | 'x' => {
                    writeln!(self.output, "Exiting program")?;
                    return Ok(SessionExit::Clean);
                }
                other => {
                    tlog!("[session] unexpected top-level input '{}'", other);
                    writeln!(self.output, "Unexpected input, exiting!")?;
                    return Ok(SessionExit::UnexpectedInput);
                }
            }
        }
    }

    fn print_main_menu(&mut self) -> std::io::Result<()> {
        writeln!(
            self.output,
            "Press the letter next to the function you want to use:"
        )?;
        writeln!(self.output, "A - List all devices")?;
        writeln!(self.output, "B - Scan for new devices")?;
        writeln!(self.output, "C - Open/close")?;
        writeln!(self.output, "D - Go online/offline")?;
        writeln!(self.output, "E - Enable/disable message polling")?;
        writeln!(self.output, "F - Get messages")?;
        writeln!(self.output, "G - Send message")?;
        writeln!(self.output, "H - Get events")?;
        writeln!(self.output, "I - Set HS CAN to 250K")?;
        writeln!(self.output, "J - Set HS CAN to 500K")?;
        writeln!(self.output, "X - Exit")?;
        Ok(())
    }

    /// Print every known device with live state, or the scan guidance line
    /// when the registry is empty.
    fn print_all_devices(&mut self) -> std::io::Result<()> {
        if self.registry.is_empty() {
            writeln!(self.output, "No devices found! Please scan for new devices.")?;
        }
        for row in self.registry.list(&self.driver) {
            match row.description {
                Some(desc) => writeln!(
                    self.output,
                    "[{}] {}\tConnected: {}\tOnline: {}\tMsg Polling: {}",
                    row.index,
                    desc,
                    if row.open { "Yes" } else { "No" },
                    if row.online { "Yes" } else { "No" },
                    if row.polling { "On" } else { "Off" },
                )?,
                None => writeln!(
                    self.output,
                    "Description for device {} not available!",
                    row.index
                )?,
            }
        }
        Ok(())
    }

    /// Prompt for a device by number, re-prompting while the selection is out
    /// of range. Only called with a non-empty registry.
    fn select_device(&mut self) -> std::io::Result<DeviceHandle> {
        writeln!(self.output, "Please select a device:")?;
        self.print_all_devices()?;
        writeln!(self.output)?;

        loop {
            let choice = input::read_choice(&mut self.input, &mut self.output, DEVICE_DIGITS)?;
            let index = match choice.to_digit(10) {
                Some(d) => d as usize,
                None => continue,
            };
            if let Some(handle) = self.registry.get(index) {
                writeln!(self.output)?;
                return Ok(handle);
            }
            writeln!(self.output, "Selected device out of range!")?;
        }
    }

    /// Common prologue for device-scoped commands: bail out with guidance when
    /// no devices are known, otherwise select one and fetch its description.
    /// A failed description lookup degrades to a placeholder; the command
    /// continues.
    fn device_command_target(&mut self) -> std::io::Result<Option<(DeviceHandle, String)>> {
        if self.registry.is_empty() {
            writeln!(self.output, "No devices found! Please scan for new devices.\n")?;
            return Ok(None);
        }
        let handle = self.select_device()?;
        let description = match self.driver.describe_device(handle) {
            Ok(desc) => desc,
            Err(e) => {
                tlog!("[session] describe failed for device {}: {}", handle.0, e);
                "(description unavailable)".to_string()
            }
        };
        Ok(Some((handle, description)))
    }

    /// Print the driver's last-error record after a failed operation.
    fn report_last_error(&mut self) -> std::io::Result<()> {
        events::print_last_error(&mut self.driver, &mut self.output)?;
        writeln!(self.output)
    }

    fn cmd_list(&mut self) -> std::io::Result<()> {
        self.print_all_devices()?;
        writeln!(self.output)
    }

    fn cmd_scan(&mut self) -> std::io::Result<()> {
        let added = self
            .registry
            .scan(&mut self.driver, self.config.scan_capacity);
        tlog!("[session] scan found {} new device(s)", added);
        if added == 1 {
            writeln!(self.output, "1 new device found!")?;
        } else {
            writeln!(self.output, "{} new devices found!", added)?;
        }
        self.print_all_devices()?;
        writeln!(self.output)
    }

    fn cmd_open_close(&mut self) -> std::io::Result<()> {
        let (handle, desc) = match self.device_command_target()? {
            Some(target) => target,
            None => return Ok(()),
        };

        writeln!(self.output, "Would you like to open or close {}?", desc)?;
        writeln!(self.output, "[1] Open\n[2] Close\n[3] Cancel\n")?;
        let choice = input::read_choice(&mut self.input, &mut self.output, &['1', '2', '3'])?;
        writeln!(self.output)?;

        match choice {
            '1' => match self.driver.open_device(handle) {
                Ok(()) => writeln!(self.output, "{} successfully opened!\n", desc)?,
                Err(e) => {
                    tlog!("[session] open failed for {}: {}", desc, e);
                    writeln!(self.output, "{} failed to open!\n", desc)?;
                    self.report_last_error()?;
                }
            },
            '2' => match self.driver.close_device(handle) {
                Ok(()) => {
                    // Close is the only command that mutates registry
                    // membership; the selection dies with the entry.
                    self.registry.remove(handle);
                    writeln!(self.output, "Successfully closed {}!\n", desc)?;
                }
                Err(e) => {
                    tlog!("[session] close failed for {}: {}", desc, e);
                    writeln!(self.output, "Failed to close {}!\n", desc)?;
                    self.report_last_error()?;
                }
            },
            _ => writeln!(self.output, "Canceling!\n")?,
        }
        Ok(())
    }

    fn cmd_online_offline(&mut self) -> std::io::Result<()> {
        let (handle, desc) = match self.device_command_target()? {
            Some(target) => target,
            None => return Ok(()),
        };

        writeln!(
            self.output,
            "Would you like to have {} go online or offline?",
            desc
        )?;
        writeln!(self.output, "[1] Online\n[2] Offline\n[3] Cancel\n")?;
        let choice = input::read_choice(&mut self.input, &mut self.output, &['1', '2', '3'])?;
        writeln!(self.output)?;

        match choice {
            '1' => match self.driver.go_online(handle) {
                Ok(()) => writeln!(self.output, "{} successfully went online!\n", desc)?,
                Err(e) => {
                    tlog!("[session] go online failed for {}: {}", desc, e);
                    writeln!(self.output, "{} failed to go online!\n", desc)?;
                    self.report_last_error()?;
                }
            },
            '2' => match self.driver.go_offline(handle) {
                Ok(()) => writeln!(self.output, "{} successfully went offline!\n", desc)?,
                Err(e) => {
                    tlog!("[session] go offline failed for {}: {}", desc, e);
                    writeln!(self.output, "{} failed to go offline!\n", desc)?;
                    self.report_last_error()?;
                }
            },
            _ => writeln!(self.output, "Canceling!\n")?,
        }
        Ok(())
    }

    fn cmd_polling(&mut self) -> std::io::Result<()> {
        let (handle, desc) = match self.device_command_target()? {
            Some(target) => target,
            None => return Ok(()),
        };

        writeln!(
            self.output,
            "Would you like to enable or disable message polling for {}?",
            desc
        )?;
        writeln!(self.output, "[1] Enable\n[2] Disable\n[3] Cancel\n")?;
        let choice = input::read_choice(&mut self.input, &mut self.output, &['1', '2', '3'])?;
        writeln!(self.output)?;

        match choice {
            '1' => {
                match self.driver.enable_polling(handle) {
                    Ok(()) => writeln!(
                        self.output,
                        "Successfully enabled message polling for {}!\n",
                        desc
                    )?,
                    Err(e) => {
                        tlog!("[session] enable polling failed for {}: {}", desc, e);
                        writeln!(
                            self.output,
                            "Failed to enable message polling for {}!\n",
                            desc
                        )?;
                        self.report_last_error()?;
                    }
                }
                // The limit is optional driver-side, but this command path is
                // the one place the session-wide value gets pushed down.
                match self
                    .driver
                    .set_polling_limit(handle, self.config.poll_limit)
                {
                    Ok(()) => writeln!(
                        self.output,
                        "Successfully set message polling limit for {}!\n",
                        desc
                    )?,
                    Err(e) => {
                        tlog!("[session] set polling limit failed for {}: {}", desc, e);
                        writeln!(
                            self.output,
                            "Failed to set polling message limit for {}!\n",
                            desc
                        )?;
                        self.report_last_error()?;
                    }
                }
            }
            '2' => match self.driver.disable_polling(handle) {
                Ok(()) => writeln!(
                    self.output,
                    "Successfully disabled message polling for {}!\n",
                    desc
                )?,
                Err(e) => {
                    tlog!("[session] disable polling failed for {}: {}", desc, e);
                    writeln!(
                        self.output,
                        "Failed to disable message polling limit for {}!\n",
                        desc
                    )?;
                    self.report_last_error()?;
                }
            },
            _ => writeln!(self.output, "Canceling!\n")?,
        }
        Ok(())
    }

    fn cmd_get_messages(&mut self) -> std::io::Result<()> {
        let (handle, desc) = match self.device_command_target()? {
            Some(target) => target,
            None => return Ok(()),
        };

        let batch = match self.driver.get_messages(handle, self.config.poll_limit, 0) {
            Ok(batch) => batch,
            Err(e) => {
                tlog!("[session] get messages failed for {}: {}", desc, e);
                writeln!(self.output, "Failed to get messages for {}!\n", desc)?;
                self.report_last_error()?;
                return Ok(());
            }
        };

        if batch.len() == 1 {
            writeln!(self.output, "1 message received from {}!", desc)?;
        } else {
            writeln!(self.output, "{} messages received from {}!", batch.len(), desc)?;
        }
        for msg in &batch {
            if let Some(line) = format::format_message(msg) {
                writeln!(self.output, "\t{}", line)?;
            }
        }
        writeln!(self.output)
    }

    fn cmd_send_message(&mut self) -> std::io::Result<()> {
        let (handle, desc) = match self.device_command_target()? {
            Some(target) => target,
            None => return Ok(()),
        };

        let frame = format::sample_frame();
        match self.driver.transmit(handle, &frame) {
            Ok(()) => writeln!(self.output, "Message transmit successful!\n")?,
            Err(e) => {
                tlog!("[session] transmit failed for {}: {}", desc, e);
                writeln!(self.output, "Failed to transmit message to {}!\n", desc)?;
                self.report_last_error()?;
            }
        }
        Ok(())
    }

    fn cmd_events(&mut self) -> std::io::Result<()> {
        writeln!(self.output, "Which events would you like to see?")?;
        writeln!(self.output, "[1] API events\n[2] Device events\n[3] Cancel\n")?;
        let choice = input::read_choice(&mut self.input, &mut self.output, &['1', '2', '3'])?;
        writeln!(self.output)?;

        match choice {
            '1' => {
                events::print_api_events(
                    &mut self.driver,
                    &mut self.output,
                    self.config.event_capacity,
                )?;
                writeln!(self.output)?;
            }
            '2' => {
                let (handle, _desc) = match self.device_command_target()? {
                    Some(target) => target,
                    None => return Ok(()),
                };
                events::print_device_events(
                    &mut self.driver,
                    &mut self.output,
                    handle,
                    self.config.event_capacity,
                )?;
                writeln!(self.output)?;
            }
            _ => writeln!(self.output, "Canceling!\n")?,
        }
        Ok(())
    }

    /// Shared handler for the fixed-rate HS CAN bitrate commands. The change
    /// is a two-step commit: staging the bitrate and applying settings must
    /// both succeed for the command to report success.
    fn cmd_set_bitrate(&mut self, bitrate: u32, label: &str) -> std::io::Result<()> {
        let (handle, desc) = match self.device_command_target()? {
            Some(target) => target,
            None => return Ok(()),
        };

        let outcome = self
            .driver
            .set_bitrate(handle, netid::HSCAN, bitrate)
            .and_then(|()| self.driver.apply_settings(handle));
        match outcome {
            Ok(()) => writeln!(
                self.output,
                "Successfully set HS CAN baudrate for {} to {}!\n",
                desc, label
            )?,
            Err(e) => {
                tlog!("[session] bitrate change failed for {}: {}", desc, e);
                writeln!(self.output, "Failed to set HS CAN for {} to {}!\n", desc, label)?;
                self.report_last_error()?;
            }
        }
        Ok(())
    }
}
