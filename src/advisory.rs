//! Advisory bands that turn a reading into visitor guidance.
//!
//! Each metric is split into half-open intervals checked from the bottom
//! up; the first comparison that holds wins and the last band takes
//! everything else, so exactly one band is always selected.

use crate::preferences::{HumidityThresholds, PressureThresholds, TemperatureThresholds};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureBand {
    Cold,
    Pleasant,
    ComfortableWarm,
    Hot,
    VeryHot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HumidityBand {
    Dry,
    Comfortable,
    Humid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressureBand {
    Falling,
    Normal,
    High,
}

impl TemperatureBand {
    /// Classifies a temperature in Fahrenheit
    pub fn classify(fahrenheit: f32, thresholds: &TemperatureThresholds) -> Self {
        if fahrenheit < thresholds.cold_below {
            TemperatureBand::Cold
        } else if fahrenheit < thresholds.pleasant_below {
            TemperatureBand::Pleasant
        } else if fahrenheit < thresholds.warm_below {
            TemperatureBand::ComfortableWarm
        } else if fahrenheit < thresholds.hot_below {
            TemperatureBand::Hot
        } else {
            TemperatureBand::VeryHot
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TemperatureBand::Cold => "cold",
            TemperatureBand::Pleasant => "pleasant",
            TemperatureBand::ComfortableWarm => "comfortable-warm",
            TemperatureBand::Hot => "hot",
            TemperatureBand::VeryHot => "very-hot",
        }
    }

    pub const fn advisory(self) -> &'static str {
        match self {
            TemperatureBand::Cold => "Cool conditions - bring warm layers!",
            TemperatureBand::Pleasant => "Pleasant weather - perfect for outdoor activities!",
            TemperatureBand::ComfortableWarm => "Warm and comfortable - great day to be outside!",
            TemperatureBand::Hot => "Hot weather - bring plenty of water and sun protection!",
            TemperatureBand::VeryHot => {
                "Very hot - limit outdoor activities to early morning or evening!"
            }
        }
    }
}

impl HumidityBand {
    /// Classifies relative humidity in percent
    pub fn classify(percent: f32, thresholds: &HumidityThresholds) -> Self {
        if percent < thresholds.dry_below {
            HumidityBand::Dry
        } else if percent < thresholds.humid_from {
            HumidityBand::Comfortable
        } else {
            HumidityBand::Humid
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            HumidityBand::Dry => "dry",
            HumidityBand::Comfortable => "comfortable",
            HumidityBand::Humid => "humid",
        }
    }

    pub const fn advisory(self) -> &'static str {
        match self {
            HumidityBand::Dry => "Dry desert air - stay hydrated and use moisturizer.",
            HumidityBand::Comfortable => "Comfortable humidity levels.",
            HumidityBand::Humid => "Higher humidity - may feel warmer than actual temperature.",
        }
    }
}

impl PressureBand {
    /// Classifies barometric pressure in hectopascals
    /// Both edges of the normal range are inclusive
    pub fn classify(hpa: f32, thresholds: &PressureThresholds) -> Self {
        if hpa < thresholds.falling_below {
            PressureBand::Falling
        } else if hpa > thresholds.high_above {
            PressureBand::High
        } else {
            PressureBand::Normal
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PressureBand::Falling => "falling",
            PressureBand::Normal => "normal",
            PressureBand::High => "high",
        }
    }

    pub const fn advisory(self) -> &'static str {
        match self {
            PressureBand::Falling => "Lower pressure - weather may be changing, possible storms.",
            PressureBand::Normal => "Normal pressure - stable conditions.",
            PressureBand::High => "High pressure - stable, clear weather expected.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Preferences;

    #[test]
    fn temperature_boundaries() {
        let t = Preferences::default().temperature;
        let cases = [
            (-20.0, TemperatureBand::Cold),
            (49.9, TemperatureBand::Cold),
            (50.0, TemperatureBand::Pleasant),
            (69.9, TemperatureBand::Pleasant),
            (70.0, TemperatureBand::ComfortableWarm),
            (77.0, TemperatureBand::ComfortableWarm),
            (85.0, TemperatureBand::Hot),
            (99.9, TemperatureBand::Hot),
            (100.0, TemperatureBand::VeryHot),
            (120.0, TemperatureBand::VeryHot),
        ];
        for (value, band) in cases {
            assert_eq!(TemperatureBand::classify(value, &t), band, "{value}F");
        }
    }

    #[test]
    fn humidity_boundaries() {
        let h = Preferences::default().humidity;
        assert_eq!(HumidityBand::classify(0.0, &h), HumidityBand::Dry);
        assert_eq!(HumidityBand::classify(29.99, &h), HumidityBand::Dry);
        assert_eq!(HumidityBand::classify(30.0, &h), HumidityBand::Comfortable);
        assert_eq!(HumidityBand::classify(45.0, &h), HumidityBand::Comfortable);
        assert_eq!(HumidityBand::classify(60.0, &h), HumidityBand::Humid);
        assert_eq!(HumidityBand::classify(100.0, &h), HumidityBand::Humid);
    }

    #[test]
    fn pressure_normal_range_is_inclusive() {
        let p = Preferences::default().pressure;
        assert_eq!(PressureBand::classify(1009.9, &p), PressureBand::Falling);
        assert_eq!(PressureBand::classify(1010.0, &p), PressureBand::Normal);
        assert_eq!(PressureBand::classify(1015.0, &p), PressureBand::Normal);
        assert_eq!(PressureBand::classify(1020.0, &p), PressureBand::Normal);
        assert_eq!(PressureBand::classify(1020.1, &p), PressureBand::High);
    }

    #[test]
    fn every_input_lands_in_exactly_one_band() {
        let prefs = Preferences::default();
        let mut value = -60.0f32;
        while value < 1100.0 {
            let t = TemperatureBand::classify(value, &prefs.temperature);
            let matches = [
                value < 50.0,
                (50.0..70.0).contains(&value),
                (70.0..85.0).contains(&value),
                (85.0..100.0).contains(&value),
                value >= 100.0,
            ];
            assert_eq!(matches.iter().filter(|m| **m).count(), 1);
            assert!(matches[t as usize], "{value} classified as {t:?}");

            let p = PressureBand::classify(value, &prefs.pressure);
            let expected = if value < 1010.0 {
                PressureBand::Falling
            } else if value > 1020.0 {
                PressureBand::High
            } else {
                PressureBand::Normal
            };
            assert_eq!(p, expected);
            value += 0.25;
        }
    }

    #[test]
    fn nan_falls_through_to_last_branch() {
        let prefs = Preferences::default();
        assert_eq!(
            TemperatureBand::classify(f32::NAN, &prefs.temperature),
            TemperatureBand::VeryHot
        );
        assert_eq!(
            HumidityBand::classify(f32::NAN, &prefs.humidity),
            HumidityBand::Humid
        );
        assert_eq!(
            PressureBand::classify(f32::NAN, &prefs.pressure),
            PressureBand::Normal
        );
    }

    #[test]
    fn labels_and_advisories() {
        assert_eq!(TemperatureBand::ComfortableWarm.label(), "comfortable-warm");
        assert_eq!(HumidityBand::Comfortable.label(), "comfortable");
        assert_eq!(PressureBand::Normal.label(), "normal");
        assert!(TemperatureBand::Cold.advisory().contains("warm layers"));
        assert!(PressureBand::Falling.advisory().contains("storms"));
    }
}
