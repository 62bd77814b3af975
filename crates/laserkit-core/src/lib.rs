//! # LaserKit Core
//!
//! Core types and utilities for LaserKit.
//! Provides the job model (vector/raster parts, laser properties), the
//! unified error taxonomy, unit conversion, progress reporting, and job
//! validation shared by the transport and driver crates.

pub mod error;
pub mod job;
pub mod listener;
pub mod units;
pub mod validate;

pub use error::{
    ConnectionError, Error, JobError, ProtocolError, ProtocolErrorKind, Result, SettingsError,
};
pub use job::{Job, JobPart, LaserProperty, RasterPart, VectorCommand, VectorPart};
pub use listener::{LogProgressListener, NullProgressListener, ProgressListener};
pub use validate::check_job;
