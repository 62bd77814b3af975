//! Error handling for LaserKit
//!
//! Provides error types for all layers of the driver:
//! - Connection errors (port open, handshake, identification)
//! - Protocol errors (command rejection, transport faults)
//! - Job errors (validation, orchestration)
//! - Settings errors (configuration validation)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents failures to establish a usable link to a controller:
/// the port could not be opened, or the device on the other end never
/// identified itself as a compatible board.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Port not found on this system
    #[error("Port not found: {port}")]
    PortNotFound {
        /// The name of the port that was not found.
        port: String,
    },

    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// No serial ports available for auto-detection
    #[error("No candidate serial ports found")]
    NoPortsAvailable,

    /// The connected device never produced a matching identification line
    #[error("Unrecognized controller on {port}: last response {last_response:?}")]
    UnrecognizedController {
        /// The port the handshake ran on.
        port: String,
        /// The last line read during identification, if any.
        last_response: Option<String>,
    },

    /// I/O error during connection setup
    #[error("I/O error during connect: {0}")]
    Io(#[from] std::io::Error),
}

/// Distinguishes why a protocol exchange failed.
///
/// Callers branch on this instead of parsing message text: a rejection
/// means the device is alive but refused the command, a transport fault
/// means the link itself broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    /// The device answered, but not with the acknowledgment token
    RejectedByDevice,
    /// The underlying transport failed (read/write error, timeout)
    TransportFault,
}

/// Protocol error type
///
/// An emitted command line was not acknowledged. The session that
/// produced this error is dead: it has already closed its transport and
/// rejects further sends.
#[derive(Error, Debug)]
#[error("Controller did not answer 'ok' to {command:?}: {detail}")]
pub struct ProtocolError {
    /// Whether the device rejected the command or the transport failed.
    pub kind: ProtocolErrorKind,
    /// The command line that failed.
    pub command: String,
    /// The unexpected response, or a description of the transport fault.
    pub detail: String,
}

impl ProtocolError {
    /// The device answered something other than the acknowledgment token.
    pub fn rejected(command: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            kind: ProtocolErrorKind::RejectedByDevice,
            command: command.into(),
            detail: response.into(),
        }
    }

    /// The transport failed mid-exchange.
    pub fn transport(command: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: ProtocolErrorKind::TransportFault,
            command: command.into(),
            detail: detail.into(),
        }
    }

    /// Check whether the device itself rejected the command.
    pub fn is_rejection(&self) -> bool {
        self.kind == ProtocolErrorKind::RejectedByDevice
    }
}

/// Job error type
///
/// Represents failures detected before or during job streaming that are
/// not protocol exchanges: validation, empty jobs, aborted sequences.
#[derive(Error, Debug)]
pub enum JobError {
    /// A coordinate lands outside the configured bed
    #[error("Part {part} command {command} at ({x:.3}, {y:.3}) mm is outside the {bed_width:.0}x{bed_height:.0} mm bed")]
    OutOfBounds {
        /// Index of the offending part within the job.
        part: usize,
        /// Index of the offending command within the part.
        command: usize,
        /// X coordinate in millimeters.
        x: f64,
        /// Y coordinate in millimeters.
        y: f64,
        /// Configured bed width in millimeters.
        bed_width: f64,
        /// Configured bed height in millimeters.
        bed_height: f64,
    },

    /// The job contains no parts
    #[error("Job {name:?} contains no parts")]
    Empty {
        /// The job name.
        name: String,
    },

    /// A part carries a non-positive resolution
    #[error("Part {part} has invalid resolution {resolution} dpi")]
    InvalidResolution {
        /// Index of the offending part within the job.
        part: usize,
        /// The invalid resolution value.
        resolution: f64,
    },
}

/// Settings error type
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A configuration value is out of its valid range
    #[error("Invalid setting {setting}: {reason}")]
    InvalidValue {
        /// The setting that failed validation.
        setting: &'static str,
        /// Why the value is invalid.
        reason: String,
    },

    /// Configuration file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Parse error: {reason}")]
    Parse {
        /// The underlying parse failure.
        reason: String,
    },
}

/// Main error type for LaserKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Protocol error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Job error
    #[error(transparent)]
    Job(#[from] JobError),

    /// Settings error
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a protocol error
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Check if this is a job error
    pub fn is_job_error(&self) -> bool {
        matches!(self, Error::Job(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
