//! Unit conversion utilities
//!
//! Job coordinates are in device-resolution units (dots at a part's
//! resolution); the wire protocol speaks physical millimeters. These
//! helpers convert between the two.

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Convert device-resolution units to millimeters
///
/// * `px` - Value in dots
/// * `dpi` - Resolution in dots per inch
pub fn px_to_mm(px: f64, dpi: f64) -> f64 {
    px * MM_PER_INCH / dpi
}

/// Convert millimeters to device-resolution units
///
/// * `mm` - Value in millimeters
/// * `dpi` - Resolution in dots per inch
pub fn mm_to_px(mm: f64, dpi: f64) -> f64 {
    mm * dpi / MM_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_mm_round_trip() {
        let mm = px_to_mm(500.0, 500.0);
        assert!((mm - 25.4).abs() < 1e-9);
        assert!((mm_to_px(mm, 500.0) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn zero_is_zero() {
        assert_eq!(px_to_mm(0.0, 500.0), 0.0);
        assert_eq!(mm_to_px(0.0, 500.0), 0.0);
    }
}
