//! # LaserKit
//!
//! A device-control adapter that streams laser cutting/engraving jobs to
//! GRBL motion controllers over a serial link, enforcing the line-based
//! request/acknowledge protocol.
//!
//! ## Architecture
//!
//! LaserKit is organized as a workspace with multiple crates:
//!
//! 1. **laserkit-core** - Job model, error taxonomy, units, validation
//! 2. **laserkit-communication** - Serial transport, handshake, line
//!    protocol session
//! 3. **laserkit-grbl** - Command translator and job orchestrator
//! 4. **laserkit-settings** - Typed device configuration
//! 5. **laserkit** - This facade crate and the command-line binary

pub use laserkit_core::{
    check_job, ConnectionError, Error, Job, JobError, JobPart, LaserProperty,
    LogProgressListener, NullProgressListener, ProgressListener, ProtocolError, ProtocolErrorKind,
    RasterPart, Result, VectorCommand, VectorPart,
};

pub use laserkit_communication::{
    list_ports, ConnectionParams, ConnectionState, Handshake, LineSession, LineSink,
    SerialPortInfo, SerialTransport, SessionOptions, Transport,
};

pub use laserkit_grbl::{GrblDriver, ResetGuard, Translator, TranslatorState};

pub use laserkit_settings::DeviceConfig;

/// Initialize logging for the process.
///
/// Respects `RUST_LOG`; defaults to `info`.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(env_filter)
        .try_init()?;

    Ok(())
}
