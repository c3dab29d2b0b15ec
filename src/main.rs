#![no_std]
#![no_main]

use core::cell::RefCell;

use bsp::entry;
use defmt::*;
use defmt_rtt as _;
use embedded_hal::delay::DelayNs;
use panic_probe as _;
use rp_pico::hal::Timer;

// Board support for the Pico; the kiosk only needs I2C0 and UART0
use rp_pico as bsp;

use bsp::hal::{
    clocks::{init_clocks_and_plls, Clock},
    pac,
    watchdog::Watchdog,
};
use lake_kiosk::content::Chrome;
use lake_kiosk::preferences::Preferences;
use lake_kiosk::sensors::{Bme280Sensor, SensorGateway};
use lake_kiosk::server::{Connection, Kiosk};
use lake_kiosk::timer::SENSOR_STARTUP_DELAY_MS;
use rp_pico::hal;
use rp_pico::hal::fugit::RateExtU32;
use rp_pico::hal::gpio::bank0::{Gpio0, Gpio1};
use rp_pico::hal::gpio::{FunctionI2C, FunctionUart, Pin, PullDown, PullUp};
use rp_pico::hal::uart::{DataBits, Enabled, ReadErrorType, StopBits, UartConfig, UartPeripheral};

/// Baud rate of the link to the Wi-Fi bridge module
const BRIDGE_BAUD: u32 = 115_200;

type BridgeUart = UartPeripheral<
    Enabled,
    pac::UART0,
    (
        Pin<Gpio0, FunctionUart, PullDown>,
        Pin<Gpio1, FunctionUart, PullDown>,
    ),
>;

/// UART to a Wi-Fi bridge running in transparent mode
/// Each HTTP connection arrives as a byte stream and is closed by the bridge
struct SerialLink(BridgeUart);

impl Connection for SerialLink {
    type Error = ReadErrorType;

    fn read(&mut self, buf: &mut [u8]) -> nb::Result<usize, ReadErrorType> {
        self.0.read_raw(buf).map_err(|e| e.map(|err| err.err_type))
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ReadErrorType> {
        self.0.write_full_blocking(bytes);
        Ok(())
    }
}

#[entry]
fn main() -> ! {
    info!("Lake kiosk starting");
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    //
    // The default is to generate a 125 MHz system clock
    let clocks = init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The single-cycle I/O block controls our GPIO pins
    let sio = hal::Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = rp_pico::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let mut delay = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // Set up I2C0 for the BME280
    let sda: Pin<_, FunctionI2C, PullUp> = pins.gpio4.reconfigure();
    let scl: Pin<_, FunctionI2C, PullUp> = pins.gpio5.reconfigure();
    let i2c = hal::I2C::i2c0(
        pac.I2C0,
        sda,
        scl,
        100.kHz(),
        &mut pac.RESETS,
        &clocks.system_clock,
    );

    // Let the sensor finish its power-on reset before probing
    delay.delay_ms(SENSOR_STARTUP_DELAY_MS);

    let preferences = Preferences::default();
    // The driver only borrows the bus, so a failed probe leaves it usable
    let i2c_bus = RefCell::new(i2c);
    let gateway = SensorGateway::initialize(Bme280Sensor::new(&i2c_bus, delay), preferences.sea_level_hpa);
    if !gateway.is_available() {
        warn!("Serving static weather guidance only");
    }
    let mut kiosk = Kiosk::new(gateway, preferences, Chrome::KIOSK);

    // Set up UART0 for the Wi-Fi bridge
    let uart_pins = (
        pins.gpio0.into_function::<FunctionUart>(),
        pins.gpio1.into_function::<FunctionUart>(),
    );
    let uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(BRIDGE_BAUD.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();
    let mut link = SerialLink(uart);

    info!("Lake kiosk ready");

    loop {
        match kiosk.serve(&mut link, &mut delay) {
            Ok(status) => info!("Answered {=u16} {=str}", status.code(), status.reason()),
            Err(e) => warn!("Request dropped: {}", Debug2Format(&e)),
        }
    }
}
