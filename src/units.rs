//! Unit conversions for the readings shown to visitors.
//!
//! Nothing here rounds; the page decides how many decimals to show.

/// Inches of mercury per hectopascal
pub const INHG_PER_HPA: f32 = 0.02953;

/// Gets temperature in Fahrenheit
/// param celsius: temperature in Celsius
pub fn fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Gets atmospheric pressure in inches of mercury
/// param hpa: pressure in hectopascals (millibars)
pub fn inches_of_mercury(hpa: f32) -> f32 {
    hpa * INHG_PER_HPA
}

/// Estimates altitude in meters from the international barometric formula
/// param hpa: measured pressure in hectopascals
/// param sea_level_hpa: reference pressure at sea level
pub fn altitude_meters(hpa: f32, sea_level_hpa: f32) -> f32 {
    44330.0 * (1.0 - libm::powf(hpa / sea_level_hpa, 0.1903))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fahrenheit_follows_formula() {
        for c in [-40.0f32, -17.5, 0.0, 25.0, 37.0, 100.0] {
            assert_eq!(fahrenheit(c), c * 9.0 / 5.0 + 32.0);
        }
        assert_eq!(fahrenheit(25.0), 77.0);
        assert_eq!(fahrenheit(-40.0), -40.0);
        assert_eq!(fahrenheit(0.0), 32.0);
    }

    #[test]
    fn inches_of_mercury_scale() {
        assert!((inches_of_mercury(1015.0) - 29.97295).abs() < 1e-3);
        assert!((inches_of_mercury(1013.25) - 29.921).abs() < 1e-3);
        assert_eq!(inches_of_mercury(0.0), 0.0);
    }

    #[test]
    fn altitude_is_zero_at_reference_pressure() {
        assert!(altitude_meters(1013.25, 1013.25).abs() < 1e-3);
        // Lower pressure means higher ground, about 640 m at the lake
        let lake = altitude_meters(938.0, 1013.25);
        assert!(lake > 600.0 && lake < 700.0);
    }

    #[test]
    fn altitude_of_missing_pressure_is_nan() {
        assert!(altitude_meters(f32::NAN, 1013.25).is_nan());
    }
}
