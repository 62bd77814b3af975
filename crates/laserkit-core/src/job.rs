//! Job model for laser cutting and engraving
//!
//! This module provides:
//! - Per-segment laser properties (power, speed, focus)
//! - Vector parts as ordered command sequences in device-resolution units
//! - Raster parts with black/white conversion into equivalent vector parts
//! - Jobs as immutable ordered sequences of parts with optional start-point
//!   normalization

use crate::units;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Laser parameters attached to the following cutting moves.
///
/// A value type: copied on read, compared field-by-field. Power and speed
/// are percentages of the configured maxima, focus is a physical Z offset
/// in device-resolution units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserProperty {
    /// Laser power in percent (0-100)
    pub power: f64,
    /// Movement speed in percent of the maximum cutting feed rate (0-100)
    pub speed: f64,
    /// Focus offset (Z), in device-resolution units
    pub focus: f64,
}

impl LaserProperty {
    /// Create a property with the given power and speed and zero focus
    pub fn new(power: f64, speed: f64) -> Self {
        Self {
            power,
            speed,
            focus: 0.0,
        }
    }

    /// Set the focus offset
    pub fn with_focus(mut self, focus: f64) -> Self {
        self.focus = focus;
        self
    }

    /// Clamp power and speed into the 0-100 range
    pub fn clamped(self) -> Self {
        Self {
            power: self.power.clamp(0.0, 100.0),
            speed: self.speed.clamp(0.0, 100.0),
            focus: self.focus,
        }
    }
}

impl Default for LaserProperty {
    fn default() -> Self {
        Self {
            power: 100.0,
            speed: 100.0,
            focus: 0.0,
        }
    }
}

impl fmt::Display for LaserProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "power {}% speed {}% focus {}",
            self.power, self.speed, self.focus
        )
    }
}

/// One step of a vector part.
///
/// Coordinates are in device-resolution units (dots at the part's
/// resolution). Sequence order is execution order; no reordering is
/// permitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum VectorCommand {
    /// Travel move with the laser off
    MoveTo {
        /// Target X in device units
        x: i32,
        /// Target Y in device units
        y: i32,
    },
    /// Cutting move with the laser on
    LineTo {
        /// Target X in device units
        x: i32,
        /// Target Y in device units
        y: i32,
    },
    /// Stage new laser parameters for subsequent cutting moves
    SetProperty {
        /// The parameters to apply
        property: LaserProperty,
    },
}

/// An ordered sequence of vector commands at a fixed resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPart {
    /// Resolution of the command coordinates, in dots per inch
    pub resolution_dpi: f64,
    /// The commands, in execution order
    pub commands: Vec<VectorCommand>,
}

impl VectorPart {
    /// Create an empty vector part at the given resolution
    pub fn new(resolution_dpi: f64) -> Self {
        Self {
            resolution_dpi,
            commands: Vec::new(),
        }
    }

    /// Append a travel move
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.commands.push(VectorCommand::MoveTo { x, y });
    }

    /// Append a cutting move
    pub fn line_to(&mut self, x: i32, y: i32) {
        self.commands.push(VectorCommand::LineTo { x, y });
    }

    /// Append a property change
    pub fn set_property(&mut self, property: LaserProperty) {
        self.commands.push(VectorCommand::SetProperty { property });
    }

    /// True if the part contains no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn translated(&self, dx: i32, dy: i32) -> Self {
        let commands = self
            .commands
            .iter()
            .map(|cmd| match *cmd {
                VectorCommand::MoveTo { x, y } => VectorCommand::MoveTo {
                    x: x + dx,
                    y: y + dy,
                },
                VectorCommand::LineTo { x, y } => VectorCommand::LineTo {
                    x: x + dx,
                    y: y + dy,
                },
                other => other,
            })
            .collect();
        Self {
            resolution_dpi: self.resolution_dpi,
            commands,
        }
    }
}

/// A black/white raster area to engrave.
///
/// Pixels are row-major, `true` = black (engrave at the part's property),
/// `false` = white (skip). Raster parts never reach the translator
/// directly; [`RasterPart::to_vector_part`] produces the equivalent
/// vector part first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterPart {
    /// Resolution of the raster, in dots per inch
    pub resolution_dpi: f64,
    /// Top-left corner of the raster, in device units
    pub origin: (i32, i32),
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Row-major pixel data, `width * height` entries
    pub pixels: Vec<bool>,
    /// Engraving parameters for black pixels
    pub property: LaserProperty,
    /// Sweep every other line right-to-left
    pub bidirectional: bool,
}

impl RasterPart {
    /// Create an all-white raster part
    pub fn new(
        resolution_dpi: f64,
        origin: (i32, i32),
        width: usize,
        height: usize,
        property: LaserProperty,
    ) -> Self {
        Self {
            resolution_dpi,
            origin,
            width,
            height,
            pixels: vec![false; width * height],
            property,
            bidirectional: false,
        }
    }

    /// Set a pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, black: bool) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = black;
        }
    }

    fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y * self.width + x]
    }

    /// Horizontal runs of black pixels in one row, as `(start, end)`
    /// pixel columns with `end` exclusive.
    fn black_runs(&self, y: usize) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut start = None;
        for x in 0..self.width {
            match (self.pixel(x, y), start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    runs.push((s, x));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, self.width));
        }
        runs
    }

    /// Convert into the equivalent vector part.
    ///
    /// Scanline sweep: each run of black pixels becomes a cutting move at
    /// the raster's property, each white gap becomes a travel move. With
    /// `bidirectional` set, every other populated line is swept
    /// right-to-left to halve travel distance.
    pub fn to_vector_part(&self) -> VectorPart {
        let (ox, oy) = self.origin;
        let mut part = VectorPart::new(self.resolution_dpi);
        part.set_property(self.property);
        let mut reverse = false;
        for y in 0..self.height {
            let mut runs = self.black_runs(y);
            if runs.is_empty() {
                continue;
            }
            if reverse {
                runs.reverse();
            }
            let row = oy + y as i32;
            for (s, e) in runs {
                // end is exclusive; the last engraved dot is e-1
                let (from, to) = if reverse {
                    (e as i32 - 1, s as i32)
                } else {
                    (s as i32, e as i32 - 1)
                };
                part.move_to(ox + from, row);
                part.line_to(ox + to, row);
            }
            if self.bidirectional {
                reverse = !reverse;
            }
        }
        part
    }
}

/// One contiguous drawable unit of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobPart {
    /// A vector path
    Vector(VectorPart),
    /// A raster region, converted to vectors before translation
    Raster(RasterPart),
}

impl JobPart {
    /// Resolution of the part, in dots per inch
    pub fn resolution_dpi(&self) -> f64 {
        match self {
            JobPart::Vector(v) => v.resolution_dpi,
            JobPart::Raster(r) => r.resolution_dpi,
        }
    }
}

/// An ordered sequence of parts to execute in one pass.
///
/// Immutable once handed to the driver; start-point normalization
/// produces a shifted copy rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Human-readable job name
    pub name: String,
    /// The parts, in execution order
    pub parts: Vec<JobPart>,
    /// Optional start point in millimeters; when set, all coordinates
    /// are shifted so this point becomes the origin
    pub start_point_mm: Option<(f64, f64)>,
}

impl Job {
    /// Create an empty job
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: Vec::new(),
            start_point_mm: None,
        }
    }

    /// Append a part
    pub fn add_part(&mut self, part: JobPart) {
        self.parts.push(part);
    }

    /// Set the start point, in millimeters
    pub fn with_start_point(mut self, x_mm: f64, y_mm: f64) -> Self {
        self.start_point_mm = Some((x_mm, y_mm));
        self
    }

    /// Apply start-point normalization.
    ///
    /// Returns a copy of the job with every coordinate shifted so the
    /// configured start point becomes the origin. Without a start point
    /// the job is returned unchanged.
    pub fn with_start_point_applied(&self) -> Job {
        let Some((sx_mm, sy_mm)) = self.start_point_mm else {
            return self.clone();
        };
        let parts = self
            .parts
            .iter()
            .map(|part| match part {
                JobPart::Vector(v) => {
                    let dx = -units::mm_to_px(sx_mm, v.resolution_dpi).round() as i32;
                    let dy = -units::mm_to_px(sy_mm, v.resolution_dpi).round() as i32;
                    JobPart::Vector(v.translated(dx, dy))
                }
                JobPart::Raster(r) => {
                    let dx = -units::mm_to_px(sx_mm, r.resolution_dpi).round() as i32;
                    let dy = -units::mm_to_px(sy_mm, r.resolution_dpi).round() as i32;
                    let mut shifted = r.clone();
                    shifted.origin = (r.origin.0 + dx, r.origin.1 + dy);
                    JobPart::Raster(shifted)
                }
            })
            .collect();
        Job {
            name: self.name.clone(),
            parts,
            start_point_mm: None,
        }
    }
}
