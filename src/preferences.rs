/// Preferences holds every tunable constant of the weather pipeline.
/// temperature: advisory band edges in Fahrenheit
/// humidity: advisory band edges in percent relative humidity
/// pressure: advisory band edges in hectopascals
/// refresh_seconds: client reload interval embedded in the live page
/// sea_level_hpa: reference pressure for the altitude estimate
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Preferences {
    pub temperature: TemperatureThresholds,
    pub humidity: HumidityThresholds,
    pub pressure: PressureThresholds,
    pub refresh_seconds: u16,
    pub sea_level_hpa: f32,
}

/// Upper (exclusive) edges of the temperature bands, in Fahrenheit
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureThresholds {
    pub cold_below: f32,
    pub pleasant_below: f32,
    pub warm_below: f32,
    pub hot_below: f32,
}

/// Humidity below `dry_below` is dry, at or above `humid_from` is humid
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HumidityThresholds {
    pub dry_below: f32,
    pub humid_from: f32,
}

/// Pressure below `falling_below` is falling, strictly above `high_above` is high
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PressureThresholds {
    pub falling_below: f32,
    pub high_above: f32,
}

pub const DEFAULT_REFRESH_SECONDS: u16 = 30;
pub const STANDARD_SEA_LEVEL_HPA: f32 = 1013.25;

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            temperature: TemperatureThresholds {
                cold_below: 50.0,     // Below 50F bring layers
                pleasant_below: 70.0, // 50F - 70F
                warm_below: 85.0,     // 70F - 85F
                hot_below: 100.0,     // 85F - 100F, anything above is very hot
            },
            humidity: HumidityThresholds {
                dry_below: 30.0,  // Desert air
                humid_from: 60.0, // 30% - 60% is comfortable
            },
            pressure: PressureThresholds {
                falling_below: 1010.0,
                high_above: 1020.0, // 1010 - 1020 hPa inclusive is normal
            },
            refresh_seconds: DEFAULT_REFRESH_SECONDS,
            sea_level_hpa: STANDARD_SEA_LEVEL_HPA,
        }
    }
}

impl Preferences {
    /// Checks that every band edge is ordered so the bands cannot overlap
    /// returns true if the thresholds describe a valid partition
    pub fn is_ordered(&self) -> bool {
        let t = &self.temperature;
        let h = &self.humidity;
        let p = &self.pressure;
        t.cold_below <= t.pleasant_below
            && t.pleasant_below <= t.warm_below
            && t.warm_below <= t.hot_below
            && h.dry_below <= h.humid_from
            && p.falling_below <= p.high_above
    }

    /// Puts reversed band edges back into ascending order
    pub fn sanitize(&mut self) {
        let t = &mut self.temperature;
        let mut edges = [t.cold_below, t.pleasant_below, t.warm_below, t.hot_below];
        // Four elements, insertion sort is plenty
        for i in 1..edges.len() {
            let mut j = i;
            while j > 0 && edges[j - 1] > edges[j] {
                edges.swap(j - 1, j);
                j -= 1;
            }
        }
        [t.cold_below, t.pleasant_below, t.warm_below, t.hot_below] = edges;

        if self.humidity.dry_below > self.humidity.humid_from {
            core::mem::swap(&mut self.humidity.dry_below, &mut self.humidity.humid_from);
        }
        if self.pressure.falling_below > self.pressure.high_above {
            core::mem::swap(
                &mut self.pressure.falling_below,
                &mut self.pressure.high_above,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_visitor_guidance() {
        let prefs = Preferences::default();
        assert_eq!(prefs.temperature.cold_below, 50.0);
        assert_eq!(prefs.temperature.hot_below, 100.0);
        assert_eq!(prefs.humidity.dry_below, 30.0);
        assert_eq!(prefs.humidity.humid_from, 60.0);
        assert_eq!(prefs.pressure.falling_below, 1010.0);
        assert_eq!(prefs.pressure.high_above, 1020.0);
        assert_eq!(prefs.refresh_seconds, 30);
        assert_eq!(prefs.sea_level_hpa, 1013.25);
        assert!(prefs.is_ordered());
    }

    #[test]
    fn sanitize_restores_order() {
        let mut prefs = Preferences::default();
        prefs.temperature.cold_below = 90.0;
        prefs.temperature.hot_below = 40.0;
        prefs.humidity = HumidityThresholds {
            dry_below: 70.0,
            humid_from: 20.0,
        };
        prefs.pressure = PressureThresholds {
            falling_below: 1030.0,
            high_above: 1000.0,
        };
        assert!(!prefs.is_ordered());

        prefs.sanitize();

        assert!(prefs.is_ordered());
        assert_eq!(prefs.temperature.cold_below, 40.0);
        assert_eq!(prefs.temperature.pleasant_below, 70.0);
        assert_eq!(prefs.temperature.warm_below, 85.0);
        assert_eq!(prefs.temperature.hot_below, 90.0);
        assert_eq!(prefs.humidity.dry_below, 20.0);
        assert_eq!(prefs.pressure.high_above, 1030.0);
    }
}
