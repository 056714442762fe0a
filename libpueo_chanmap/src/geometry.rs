use std::f64::consts::TAU;

use super::error::AddressError;

/// Difference between two azimuthal angles (radians), wrapped to the shorter way around
pub fn phi_difference(first: f64, second: f64) -> f64 {
    let mut diff = first - second;
    if diff.abs() > (diff + TAU).abs() {
        diff += TAU;
    }
    if diff.abs() > (diff - TAU).abs() {
        diff -= TAU;
    }
    diff
}

/// Direction (degrees, [0, 360)) a phi sector is looking, relative to north.
///
/// Heading increases clockwise while phi sectors are numbered anticlockwise, hence the
/// subtraction.
pub fn direction_wrt_north(
    phi_sector: usize,
    heading: f64,
    n_phi_sectors: usize,
    aft_fore_offset_deg: f64,
) -> Result<f64, AddressError> {
    if phi_sector >= n_phi_sectors {
        return Err(AddressError::PhiSectorOutOfRange(phi_sector, n_phi_sectors));
    }
    if !heading.is_finite() {
        return Err(AddressError::InvalidHeading(heading.to_string()));
    }
    let direction =
        heading + aft_fore_offset_deg - (phi_sector as f64 * 360.0 / n_phi_sectors as f64);
    Ok(direction.rem_euclid(360.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phi_difference_wraps() {
        assert!((phi_difference(1.0, 0.5) - 0.5).abs() < 1e-12);
        assert!((phi_difference(0.1, TAU - 0.1) - 0.2).abs() < 1e-12);
        assert!((phi_difference(TAU - 0.1, 0.1) + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_direction_wrt_north() {
        assert_eq!(direction_wrt_north(0, 0.0, 24, 45.0), Ok(45.0));
        assert_eq!(direction_wrt_north(6, 0.0, 24, 45.0), Ok(315.0));
        assert_eq!(direction_wrt_north(0, 350.0, 24, 45.0), Ok(35.0));
        assert_eq!(
            direction_wrt_north(24, 0.0, 24, 45.0),
            Err(AddressError::PhiSectorOutOfRange(24, 24))
        );
        assert_eq!(
            direction_wrt_north(0, f64::NAN, 24, 45.0),
            Err(AddressError::InvalidHeading(String::from("NaN")))
        );
        assert!(matches!(
            direction_wrt_north(3, f64::INFINITY, 24, 45.0),
            Err(AddressError::InvalidHeading(_))
        ));
    }
}
