//! Job validation
//!
//! Checks a job against the physical machine before any connection is
//! opened: every coordinate must land inside the configured bed, every
//! part must carry a usable resolution.

use crate::error::JobError;
use crate::job::{Job, JobPart, VectorCommand};
use crate::units;

/// Validate a job against the configured bed dimensions.
///
/// Returns the first violation found, in execution order. Raster parts
/// are checked by their bounding box; vector parts command by command.
pub fn check_job(job: &Job, bed_width_mm: f64, bed_height_mm: f64) -> Result<(), JobError> {
    if job.parts.is_empty() {
        return Err(JobError::Empty {
            name: job.name.clone(),
        });
    }

    for (part_idx, part) in job.parts.iter().enumerate() {
        let dpi = part.resolution_dpi();
        if !(dpi > 0.0) {
            return Err(JobError::InvalidResolution {
                part: part_idx,
                resolution: dpi,
            });
        }

        match part {
            JobPart::Vector(v) => {
                for (cmd_idx, cmd) in v.commands.iter().enumerate() {
                    let (x, y) = match *cmd {
                        VectorCommand::MoveTo { x, y } | VectorCommand::LineTo { x, y } => (x, y),
                        VectorCommand::SetProperty { .. } => continue,
                    };
                    check_point(
                        part_idx,
                        cmd_idx,
                        units::px_to_mm(x as f64, dpi),
                        units::px_to_mm(y as f64, dpi),
                        bed_width_mm,
                        bed_height_mm,
                    )?;
                }
            }
            JobPart::Raster(r) => {
                let (ox, oy) = r.origin;
                let corners = [
                    (ox, oy),
                    (ox + r.width.saturating_sub(1) as i32, oy),
                    (ox, oy + r.height.saturating_sub(1) as i32),
                    (
                        ox + r.width.saturating_sub(1) as i32,
                        oy + r.height.saturating_sub(1) as i32,
                    ),
                ];
                for (cmd_idx, (x, y)) in corners.iter().enumerate() {
                    check_point(
                        part_idx,
                        cmd_idx,
                        units::px_to_mm(*x as f64, dpi),
                        units::px_to_mm(*y as f64, dpi),
                        bed_width_mm,
                        bed_height_mm,
                    )?;
                }
            }
        }
    }

    Ok(())
}

fn check_point(
    part: usize,
    command: usize,
    x_mm: f64,
    y_mm: f64,
    bed_width: f64,
    bed_height: f64,
) -> Result<(), JobError> {
    if x_mm < 0.0 || y_mm < 0.0 || x_mm > bed_width || y_mm > bed_height {
        return Err(JobError::OutOfBounds {
            part,
            command,
            x: x_mm,
            y: y_mm,
            bed_width,
            bed_height,
        });
    }
    Ok(())
}
