use core::cell::RefCell;

use bme280::i2c::BME280;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;

use crate::units;

/// BME280 register holding the chip identifier
const REG_CHIP_ID: u8 = 0xD0;
/// Value of the chip identifier register on a BME280
pub const BME280_CHIP_ID: u8 = 0x60;

/// The two addresses a BME280 breakout can strap to, in probe order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusAddress {
    /// SDO pulled low, 0x76
    Primary,
    /// SDO pulled high, 0x77
    Secondary,
}

impl BusAddress {
    pub const PROBE_ORDER: [BusAddress; 2] = [BusAddress::Primary, BusAddress::Secondary];

    pub const fn value(self) -> u8 {
        match self {
            BusAddress::Primary => 0x76,
            BusAddress::Secondary => 0x77,
        }
    }
}

/// Error type for the environment sensor port
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Nothing acknowledged the address
    #[error("no device acknowledged the address")]
    NoAcknowledge,
    /// Something answered but it is not a BME280
    #[error("unexpected chip id {0:#04x}")]
    WrongChip(u8),
    /// The driver's init sequence failed
    #[error("sensor init sequence failed")]
    InitFailed,
    /// A measurement transaction failed
    #[error("measurement failed")]
    ReadFailed,
    /// Read attempted before a successful `begin`
    #[error("sensor not initialized")]
    NotInitialized,
    /// The shared bus was already borrowed
    #[error("i2c bus busy")]
    BusBusy,
}

/// Per-field results of one sampling cycle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub temperature: Result<f32, SensorError>,
    pub humidity: Result<f32, SensorError>,
    pub pressure: Result<f32, SensorError>,
}

impl Sample {
    /// Every field failed with the same error
    pub fn failed(error: SensorError) -> Self {
        Self {
            temperature: Err(error),
            humidity: Err(error),
            pressure: Err(error),
        }
    }
}

/// Port for an attached temperature/humidity/pressure sensor
///
/// The gateway only ever calls `begin` during the startup probe and
/// `sample` afterwards, once per reading.
pub trait EnvironmentSensor {
    /// Bring the device up at the given address
    fn begin(&mut self, address: BusAddress) -> Result<(), SensorError>;

    /// Temperature in Celsius
    fn read_temperature(&mut self) -> Result<f32, SensorError>;

    /// Relative humidity in percent
    fn read_humidity(&mut self) -> Result<f32, SensorError>;

    /// Barometric pressure in hectopascals
    fn read_pressure(&mut self) -> Result<f32, SensorError>;

    /// All three fields for one reading
    ///
    /// Devices that convert every channel at once should override this so a
    /// reading costs a single conversion.
    fn sample(&mut self) -> Sample {
        Sample {
            temperature: self.read_temperature(),
            humidity: self.read_humidity(),
            pressure: self.read_pressure(),
        }
    }
}

/// A BME280 on a shared embedded-hal I2C bus
///
/// The driver only gets a handle to the bus, so a device that fails its init
/// sequence can be dropped and the next address probed on the same bus.
pub struct Bme280Sensor<'a, I2C, D> {
    bus: &'a RefCell<I2C>,
    device: Option<BME280<RefCellDevice<'a, I2C>>>,
    delay: D,
}

impl<'a, I2C, D> Bme280Sensor<'a, I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(bus: &'a RefCell<I2C>, delay: D) -> Self {
        Self {
            bus,
            device: None,
            delay,
        }
    }

    /// One forced conversion: (Celsius, percent RH, hectopascals)
    fn measure(&mut self) -> Result<(f32, f32, f32), SensorError> {
        let device = self.device.as_mut().ok_or(SensorError::NotInitialized)?;
        let m = device
            .measure(&mut self.delay)
            .map_err(|_| SensorError::ReadFailed)?;
        // Driver reports pascals
        Ok((m.temperature, m.humidity, m.pressure / 100.0))
    }
}

/// Reads the chip identifier at `address`
fn read_chip_id<I2C: I2c>(bus: &RefCell<I2C>, address: BusAddress) -> Result<u8, SensorError> {
    let mut bus = bus.try_borrow_mut().map_err(|_| SensorError::BusBusy)?;
    let mut id = [0u8; 1];
    bus.write_read(address.value(), &[REG_CHIP_ID], &mut id)
        .map_err(|_| SensorError::NoAcknowledge)?;
    Ok(id[0])
}

impl<I2C, D> EnvironmentSensor for Bme280Sensor<'_, I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn begin(&mut self, address: BusAddress) -> Result<(), SensorError> {
        let id = read_chip_id(self.bus, address)?;
        if id != BME280_CHIP_ID {
            return Err(SensorError::WrongChip(id));
        }

        let handle = RefCellDevice::new(self.bus);
        let mut device = match address {
            BusAddress::Primary => BME280::new_primary(handle),
            BusAddress::Secondary => BME280::new_secondary(handle),
        };
        device
            .init(&mut self.delay)
            .map_err(|_| SensorError::InitFailed)?;
        self.device = Some(device);
        Ok(())
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(self.measure()?.0)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        Ok(self.measure()?.1)
    }

    fn read_pressure(&mut self) -> Result<f32, SensorError> {
        Ok(self.measure()?.2)
    }

    fn sample(&mut self) -> Sample {
        match self.measure() {
            Ok((temperature, humidity, pressure)) => Sample {
                temperature: Ok(temperature),
                humidity: Ok(humidity),
                pressure: Ok(pressure),
            },
            Err(e) => Sample::failed(e),
        }
    }
}

/// One reading from the sensor, taken fresh for a single request
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReading {
    pub temperature_celsius: f32,
    pub humidity_percent: f32,
    pub pressure_hpa: f32,
    pub altitude_meters: f32,
}

/// What the page is built from: a reading, or nothing at all
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Snapshot {
    Available(SensorReading),
    Unavailable,
}

impl Snapshot {
    pub fn is_valid(&self) -> bool {
        matches!(self, Snapshot::Available(_))
    }

    pub fn reading(&self) -> Option<&SensorReading> {
        match self {
            Snapshot::Available(reading) => Some(reading),
            Snapshot::Unavailable => None,
        }
    }
}

/// Outcome of the startup probe; fixed for the life of the process
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorState {
    address: Option<BusAddress>,
}

impl SensorState {
    pub fn is_available(&self) -> bool {
        self.address.is_some()
    }

    /// Address that answered the probe, if any
    pub fn address(&self) -> Option<BusAddress> {
        self.address
    }
}

/// Owns the sensor and hides whether it is there at all
pub struct SensorGateway<S> {
    sensor: S,
    state: SensorState,
    sea_level_hpa: f32,
}

impl<S: EnvironmentSensor> SensorGateway<S> {
    /// Probes the primary address, then the secondary one
    /// The first address that comes up wins; if neither does, the gateway
    /// stays unavailable and never touches the sensor again
    /// param sensor: the sensor port to probe
    /// param sea_level_hpa: reference pressure for the altitude estimate
    pub fn initialize(mut sensor: S, sea_level_hpa: f32) -> Self {
        let mut address = None;
        for candidate in BusAddress::PROBE_ORDER {
            match sensor.begin(candidate) {
                Ok(()) => {
                    info!("BME280 sensor found at address {=u8:#x}", candidate.value());
                    address = Some(candidate);
                    break;
                }
                Err(e) => {
                    debug!("No BME280 at {=u8:#x}: {}", candidate.value(), e);
                }
            }
        }
        if address.is_none() {
            warn!("BME280 sensor not found - weather page will show unavailable");
        }

        Self {
            sensor,
            state: SensorState { address },
            sea_level_hpa,
        }
    }

    pub fn state(&self) -> SensorState {
        self.state
    }

    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }

    /// Takes a fresh reading, one sampling cycle per call
    /// Returns `Snapshot::Unavailable` without any bus traffic when the probe
    /// failed. A field whose transaction fails comes back as NaN while the
    /// rest of the reading stays valid.
    pub fn read(&mut self) -> Snapshot {
        if !self.state.is_available() {
            return Snapshot::Unavailable;
        }

        let sample = self.sensor.sample();
        let temperature_celsius = field(sample.temperature);
        let humidity_percent = field(sample.humidity);
        let pressure_hpa = field(sample.pressure);

        Snapshot::Available(SensorReading {
            temperature_celsius,
            humidity_percent,
            pressure_hpa,
            altitude_meters: units::altitude_meters(pressure_hpa, self.sea_level_hpa),
        })
    }

    /// Gives the sensor back, mostly useful to inspect fakes in tests
    pub fn release(self) -> S {
        self.sensor
    }
}

fn field(result: Result<f32, SensorError>) -> f32 {
    result.unwrap_or_else(|e| {
        warn!("Sensor field read failed: {}", e);
        f32::NAN
    })
}
