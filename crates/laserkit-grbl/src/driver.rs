//! GRBL laser driver
//!
//! Orchestrates one job end to end: validate, normalize, connect and
//! handshake, emit initialization lines, translate each part through the
//! acknowledged session, emit shutdown lines, and close — reporting
//! coarse progress throughout. Any failure aborts the remaining sequence,
//! still attempts to close the transport, and surfaces a single job
//! failure carrying the underlying cause.

use crate::reset_guard::ResetGuard;
use crate::translator::Translator;
use laserkit_communication::session::LineSink;
use laserkit_communication::{
    shared, ConnectionParams, Handshake, SerialTransport, SessionOptions, Transport,
};
use laserkit_core::error::{ConnectionError, Error, Result};
use laserkit_core::job::{Job, JobPart};
use laserkit_core::listener::ProgressListener;
use laserkit_core::validate::check_job;
use laserkit_settings::DeviceConfig;
use std::time::Duration;

/// Driver for GRBL-based laser cutters.
pub struct GrblDriver {
    config: DeviceConfig,
}

impl GrblDriver {
    /// Create a driver from a validated configuration.
    pub fn new(config: DeviceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The driver's configuration.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Stream `job` to the controller on the configured serial port.
    pub fn send_job(&self, job: &Job, listener: &dyn ProgressListener) -> Result<()> {
        let params = ConnectionParams {
            port: self.config.port.clone(),
            baud_rate: self.config.baud_rate,
        };
        self.run(job, listener, || {
            Ok(Box::new(SerialTransport::open(&params)?) as Box<dyn Transport>)
        })
    }

    /// Stream `job` over an already opened transport.
    ///
    /// The transport must be freshly opened at the configured baud rate;
    /// the handshake has not yet run. Used for simulators and tests.
    pub fn send_job_over(
        &self,
        transport: Box<dyn Transport>,
        job: &Job,
        listener: &dyn ProgressListener,
    ) -> Result<()> {
        self.run(job, listener, move || Ok(transport))
    }

    fn run(
        &self,
        job: &Job,
        listener: &dyn ProgressListener,
        acquire: impl FnOnce() -> std::result::Result<Box<dyn Transport>, ConnectionError>,
    ) -> Result<()> {
        listener.progress_changed(0);

        listener.task_changed("checking job");
        check_job(job, self.config.bed_width_mm, self.config.bed_height_mm)?;
        let job = job.with_start_point_applied();

        listener.task_changed("connecting...");
        let transport = shared(acquire()?);
        let guard = ResetGuard::arm(transport.clone());

        match self.stream(&job, transport.clone(), listener) {
            Ok(()) => {
                guard.disarm();
                listener.task_changed("sent.");
                listener.progress_changed(100);
                Ok(())
            }
            Err(e) => {
                tracing::error!("job {:?} failed: {}", job.name, e);
                // pulse the reset line while the port may still be open
                drop(guard);
                if let Err(close_err) = transport.lock().close() {
                    tracing::warn!("cleanup close failed: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// Handshake and stream every line of the job.
    fn stream(
        &self,
        job: &Job,
        transport: laserkit_communication::SharedTransport,
        listener: &dyn ProgressListener,
    ) -> Result<()> {
        let handshake = Handshake {
            identification_prefix: self.config.identification_prefix.clone(),
            homing: self.config.homing,
            reset_wait_secs: self.config.reset_wait_secs,
        };
        let options = SessionOptions {
            wait_for_ack: self.config.wait_for_ack,
            ack_timeout: self.config.ack_timeout_ms.map(Duration::from_millis),
        };
        let mut session = handshake.negotiate(transport, options, listener)?;

        listener.task_changed("sending");
        self.write_initialization(&mut session)?;
        listener.progress_changed(20);

        let mut translator = Translator::new(&self.config);
        let total = job.parts.len();
        for (index, part) in job.parts.iter().enumerate() {
            let converted;
            let vector = match part {
                JobPart::Vector(v) => v,
                JobPart::Raster(r) => {
                    converted = r.to_vector_part();
                    &converted
                }
            };
            translator.translate_part(vector, &mut session)?;
            listener.progress_changed((20 + (index + 1) * 60 / total) as u8);
        }

        session.send("M5")?;
        self.write_shutdown(&mut session)?;
        session.close().map_err(Error::Io)?;
        Ok(())
    }

    fn write_initialization(
        &self,
        session: &mut laserkit_communication::LineSession,
    ) -> Result<()> {
        if self.config.homing {
            tracing::info!("Homing...");
            session.send("$H")?;
        }
        for line in self.config.pre_job_lines() {
            session.send(line)?;
        }
        Ok(())
    }

    fn write_shutdown(&self, session: &mut laserkit_communication::LineSession) -> Result<()> {
        for line in self.config.post_job_lines() {
            session.send(line)?;
        }
        Ok(())
    }
}
