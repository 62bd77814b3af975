//! Serial port transport implementation
//!
//! Provides the real serial link to a controller via USB or RS-232,
//! plus enumeration of candidate controller ports.

use crate::transport::{ConnectionParams, Transport, LINE_TERMINATOR};
use laserkit_core::error::ConnectionError;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Internal poll interval for line reads; keeps `read_line` responsive
/// to its caller-supplied timeout without busy-waiting.
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Information about an available serial port
#[derive(Debug, Clone)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,
    /// Human-readable description
    pub description: String,
    /// Manufacturer name if available
    pub manufacturer: Option<String>,
}

/// List candidate controller ports on the system.
///
/// Filters the system port list to names that plausibly carry a motion
/// controller:
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn list_ports() -> Result<Vec<SerialPortInfo>, ConnectionError> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        ConnectionError::Io(io::Error::other(e.to_string()))
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_candidate_port(&port.port_name))
        .map(|port| {
            let (description, manufacturer) = match &port.port_type {
                serialport::SerialPortType::UsbPort(usb) => (
                    format!(
                        "USB {} {}",
                        usb.manufacturer.as_deref().unwrap_or("Device"),
                        usb.product.as_deref().unwrap_or("Serial Port")
                    ),
                    usb.manufacturer.clone(),
                ),
                serialport::SerialPortType::BluetoothPort => {
                    ("Bluetooth Serial".to_string(), None)
                }
                serialport::SerialPortType::PciPort => ("PCI Serial".to_string(), None),
                _ => ("Serial Port".to_string(), None),
            };
            SerialPortInfo {
                port_name: port.port_name.clone(),
                description,
                manufacturer,
            }
        })
        .collect())
}

/// Check if a port name matches controller-board patterns
fn is_candidate_port(port_name: &str) -> bool {
    if port_name.starts_with("COM") && port_name[3..].chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if port_name.starts_with("/dev/ttyUSB") || port_name.starts_with("/dev/ttyACM") {
        return true;
    }
    if port_name.starts_with("/dev/cu.usbserial-") || port_name.starts_with("/dev/cu.usbmodem") {
        return true;
    }
    false
}

/// Real serial transport over the serialport crate.
///
/// Opened 8N1 without flow control; DTR and RTS are asserted on open
/// (required by Leonardo/Micro style boards before they produce output).
/// Incoming bytes are accumulated in a line buffer so a read timeout
/// never discards a partially received line.
pub struct SerialTransport {
    port: Option<Box<dyn serialport::SerialPort>>,
    port_name: String,
    line_buffer: String,
}

impl SerialTransport {
    /// Open the port described by `params`.
    pub fn open(params: &ConnectionParams) -> Result<Self, ConnectionError> {
        let port_name = if params.port.eq_ignore_ascii_case("auto") {
            let candidates = list_ports()?;
            let first = candidates
                .first()
                .ok_or(ConnectionError::NoPortsAvailable)?;
            tracing::info!("Auto-detected port {}", first.port_name);
            first.port_name.clone()
        } else {
            params.port.clone()
        };

        let mut port = serialport::new(&port_name, params.baud_rate)
            .timeout(POLL_TIMEOUT)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| {
                tracing::warn!("Failed to open serial port {}: {}", port_name, e);
                ConnectionError::FailedToOpen {
                    port: port_name.clone(),
                    reason: e.to_string(),
                }
            })?;

        port.write_data_terminal_ready(true)
            .map_err(|e| ConnectionError::Io(io::Error::other(e.to_string())))?;
        port.write_request_to_send(true)
            .map_err(|e| ConnectionError::Io(io::Error::other(e.to_string())))?;

        Ok(Self {
            port: Some(port),
            port_name,
            line_buffer: String::new(),
        })
    }

    fn port_mut(&mut self) -> io::Result<&mut Box<dyn serialport::SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "port is closed"))
    }

    /// Pop a complete line off the buffer, stripped of its terminator.
    fn take_buffered_line(&mut self) -> Option<String> {
        let pos = self.line_buffer.find('\n')?;
        let line = self.line_buffer[..pos].trim_end_matches('\r').to_string();
        self.line_buffer.drain(..=pos);
        Some(line)
    }
}

impl Transport for SerialTransport {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let port = self.port_mut()?;
        port.write_all(line.as_bytes())?;
        port.write_all(LINE_TERMINATOR.as_bytes())?;
        port.flush()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        let port = self.port_mut()?;
        port.write_all(bytes)?;
        port.flush()
    }

    fn read_line(&mut self, timeout: Duration) -> io::Result<Option<String>> {
        if let Some(line) = self.take_buffered_line() {
            return Ok(Some(line));
        }

        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; 256];
        loop {
            match self.port_mut()?.read(&mut chunk) {
                Ok(0) => {}
                Ok(n) => {
                    self.line_buffer
                        .push_str(&String::from_utf8_lossy(&chunk[..n]));
                    if let Some(line) = self.take_buffered_line() {
                        return Ok(Some(line));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }

    fn set_reset(&mut self, asserted: bool) -> io::Result<()> {
        // DTR low asserts reset on auto-reset boards
        self.port_mut()?
            .write_data_terminal_ready(!asserted)
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn close(&mut self) -> io::Result<()> {
        self.port = None;
        self.line_buffer.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        &self.port_name
    }
}

#[cfg(test)]
mod tests {
    use super::is_candidate_port;

    #[test]
    fn candidate_port_patterns() {
        assert!(is_candidate_port("COM3"));
        assert!(is_candidate_port("/dev/ttyUSB0"));
        assert!(is_candidate_port("/dev/ttyACM1"));
        assert!(is_candidate_port("/dev/cu.usbmodem1411"));
        assert!(!is_candidate_port("/dev/ttyS0"));
        assert!(!is_candidate_port("COMX"));
        assert!(!is_candidate_port("/dev/random"));
    }
}
