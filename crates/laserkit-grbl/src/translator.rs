//! Stateful command translator
//!
//! Maps job primitives (travel, cut, property change) onto the minimal
//! machine command stream, tracking what the controller last received so
//! redundant power/feed terms are never emitted, and bracketing every
//! travel move with laser-off/laser-on transitions.
//!
//! Power and speed changes are applied lazily at the next cutting move;
//! a staged value that is replaced before any cut costs nothing. Focus
//! changes are applied eagerly because the Z move must physically happen
//! before the next cut at that depth.

use laserkit_communication::session::LineSink;
use laserkit_core::error::ProtocolError;
use laserkit_core::job::{VectorCommand, VectorPart};
use laserkit_core::units;
use laserkit_settings::DeviceConfig;

/// Laser-off command
const LASER_OFF: &str = "M5";
/// Laser-on command
const LASER_ON: &str = "M3";

/// What the controller has last been told, plus the staged (not yet
/// applied) property values.
///
/// One instance lives per job: created when streaming starts, discarded
/// when it ends, so nothing leaks between jobs. Power/speed/focus only
/// change as the side effect of emitting a command that encodes the new
/// value.
///
/// Comparisons are bit-exact on purpose: a value is resent whenever the
/// stored one differs at all, which can produce redundant commands when
/// unit conversion introduces floating-point noise, but never suppresses
/// a resend the device needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatorState {
    /// Power percentage last encoded into a command, unset before the
    /// first cut
    pub current_power: Option<f64>,
    /// Speed percentage last encoded into a command, unset before the
    /// first cut
    pub current_speed: Option<f64>,
    /// Staged power percentage from the latest property change
    pub next_power: Option<f64>,
    /// Staged speed percentage from the latest property change
    pub next_speed: Option<f64>,
    /// Focus offset last encoded into a Z move, in device units
    pub current_focus: f64,
    /// The laser is currently disabled for a travel move
    pub laser_suspended: bool,
}

impl TranslatorState {
    /// Fresh state at the start of a job.
    pub fn new() -> Self {
        Self {
            current_power: None,
            current_speed: None,
            next_power: None,
            next_speed: None,
            current_focus: 0.0,
            laser_suspended: false,
        }
    }
}

impl Default for TranslatorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Translates vector parts into machine command lines.
pub struct Translator {
    max_travel_rate: f64,
    max_cut_rate: f64,
    state: TranslatorState,
}

impl Translator {
    /// Create a translator for one job with fresh state.
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            max_travel_rate: config.max_travel_rate,
            max_cut_rate: config.max_cut_rate,
            state: TranslatorState::new(),
        }
    }

    /// The current translation state, for inspection.
    pub fn state(&self) -> &TranslatorState {
        &self.state
    }

    /// Translate one part, emitting command lines into `sink`.
    ///
    /// State carries over between parts of the same job; the controller
    /// does not care about part boundaries.
    pub fn translate_part(
        &mut self,
        part: &VectorPart,
        sink: &mut dyn LineSink,
    ) -> Result<(), ProtocolError> {
        for cmd in &part.commands {
            match *cmd {
                VectorCommand::MoveTo { x, y } => self.travel(x, y, part.resolution_dpi, sink)?,
                VectorCommand::LineTo { x, y } => self.cut(x, y, part.resolution_dpi, sink)?,
                VectorCommand::SetProperty { property } => {
                    self.state.next_power = Some(property.power);
                    self.state.next_speed = Some(property.speed);
                    self.focus(property.focus, part.resolution_dpi, sink)?;
                }
            }
        }
        Ok(())
    }

    /// Non-cutting travel move: laser off, rapid feed.
    fn travel(
        &mut self,
        x: i32,
        y: i32,
        dpi: f64,
        sink: &mut dyn LineSink,
    ) -> Result<(), ProtocolError> {
        let mut terms = String::new();
        if !self.state.laser_suspended {
            self.state.laser_suspended = true;
            sink.send(LASER_OFF)?;
            terms.push_str(" S0");
            terms.push_str(&format!(" F{}", self.max_travel_rate as i64));
        }
        sink.send(&format!(
            "G0 X{} Y{}{}",
            mm(x as f64, dpi),
            mm(y as f64, dpi),
            terms
        ))
    }

    /// Cutting move: re-enable the laser if suspended, apply staged
    /// power/speed, restore the cutting feed after a travel move.
    fn cut(
        &mut self,
        x: i32,
        y: i32,
        dpi: f64,
        sink: &mut dyn LineSink,
    ) -> Result<(), ProtocolError> {
        let reenabled = self.state.laser_suspended;
        if reenabled {
            sink.send(LASER_ON)?;
            self.state.laser_suspended = false;
        }

        let mut terms = String::new();
        if self.state.next_power != self.state.current_power || reenabled {
            let power = self.state.next_power.unwrap_or(0.0);
            terms.push_str(&format!(" S{}", power));
            self.state.current_power = Some(power);
            self.state.next_power = Some(power);
        }
        if self.state.next_speed != self.state.current_speed {
            let speed = self.state.next_speed.unwrap_or(100.0);
            terms.push_str(&format!(" F{}", self.cut_feed(speed)));
            self.state.current_speed = Some(speed);
            self.state.next_speed = Some(speed);
        } else if reenabled {
            // the travel move changed the device's feed; restore it
            let speed = self.state.current_speed.unwrap_or(100.0);
            terms.push_str(&format!(" F{}", self.cut_feed(speed)));
        }

        sink.send(&format!(
            "G1 X{} Y{}{}",
            mm(x as f64, dpi),
            mm(y as f64, dpi),
            terms
        ))
    }

    /// Eager focus application: Z must be in place before the next cut.
    fn focus(&mut self, focus: f64, dpi: f64, sink: &mut dyn LineSink) -> Result<(), ProtocolError> {
        if focus == self.state.current_focus {
            return Ok(());
        }
        let mut terms = String::new();
        if !self.state.laser_suspended {
            self.state.laser_suspended = true;
            sink.send(LASER_OFF)?;
            terms.push_str(" S0");
        }
        sink.send(&format!("G0 Z{}{}", mm(focus, dpi), terms))?;
        self.state.current_focus = focus;
        Ok(())
    }

    /// Cutting feed rate for a speed percentage, truncated to whole
    /// units per minute.
    fn cut_feed(&self, speed_percent: f64) -> i64 {
        (self.max_cut_rate * speed_percent / 100.0) as i64
    }
}

/// Format a device-unit coordinate as millimeters.
fn mm(value_px: f64, dpi: f64) -> String {
    format!("{:.3}", units::px_to_mm(value_px, dpi))
}
