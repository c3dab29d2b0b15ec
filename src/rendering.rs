use core::convert::Infallible;

use heapless::String;
use ufmt::{uDisplay, uWrite, uwrite, Formatter};

use crate::advisory::{HumidityBand, PressureBand, TemperatureBand};
use crate::content::{self, Chrome, StaticPage};
use crate::preferences::Preferences;
use crate::sensors::{SensorReading, Snapshot};
use crate::units;

/// Largest page `render` will produce
pub const PAGE_CAPACITY: usize = 12 * 1024;

pub type PageBuffer = String<PAGE_CAPACITY>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    #[error("page does not fit in {0} bytes")]
    Overflow(usize),
}

/// Fixed-point display for floats, which ufmt cannot format on its own
/// Rounds half away from zero; NaN prints as `nan`, and magnitudes too
/// large for the fixed-point scratch value print as `inf`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decimal {
    value: f32,
    places: u8,
}

impl Decimal {
    /// Most decimals that still fit the u64 scratch value comfortably
    pub const MAX_PLACES: u8 = 6;

    pub fn new(value: f32, places: u8) -> Self {
        Self {
            value,
            places: places.min(Self::MAX_PLACES),
        }
    }
}

impl uDisplay for Decimal {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        let value = self.value;
        if value.is_nan() {
            return f.write_str("nan");
        }
        if value.is_infinite() {
            return f.write_str(if value < 0.0 { "-inf" } else { "inf" });
        }

        let scale = 10u64.pow(u32::from(self.places));
        let magnitude = libm::round(f64::from(value).abs() * scale as f64);
        // Past u64 range the cast would saturate and print wrong digits
        if magnitude >= u64::MAX as f64 {
            return f.write_str(if value < 0.0 { "-inf" } else { "inf" });
        }
        let scaled = magnitude as u64;
        if value < 0.0 && scaled != 0 {
            f.write_str("-")?;
        }
        uwrite!(f, "{}", scaled / scale)?;

        if self.places > 0 {
            f.write_str(".")?;
            let fraction = scaled % scale;
            // Leading zeros of the fraction matter: 0.05 is not 0.5
            let mut divisor = scale / 10;
            while divisor > 0 {
                uwrite!(f, "{}", ((fraction / divisor) % 10) as u8)?;
                divisor /= 10;
            }
        }
        Ok(())
    }
}

/// Converted and classified values, ready to drop into the page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeatherView {
    pub temperature_f: f32,
    pub temperature_c: f32,
    pub humidity_percent: f32,
    pub pressure_hpa: f32,
    pub pressure_inhg: f32,
    pub temperature: TemperatureBand,
    pub humidity: HumidityBand,
    pub pressure: PressureBand,
}

impl WeatherView {
    pub fn new(reading: &SensorReading, preferences: &Preferences) -> Self {
        let temperature_f = units::fahrenheit(reading.temperature_celsius);
        Self {
            temperature_f,
            temperature_c: reading.temperature_celsius,
            humidity_percent: reading.humidity_percent,
            pressure_hpa: reading.pressure_hpa,
            pressure_inhg: units::inches_of_mercury(reading.pressure_hpa),
            temperature: TemperatureBand::classify(temperature_f, &preferences.temperature),
            humidity: HumidityBand::classify(reading.humidity_percent, &preferences.humidity),
            pressure: PressureBand::classify(reading.pressure_hpa, &preferences.pressure),
        }
    }
}

/// The two shapes the weather page can take
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeatherPage {
    Live(WeatherView),
    Unavailable,
}

impl WeatherPage {
    /// The classifier only runs for a live reading
    pub fn from_snapshot(snapshot: &Snapshot, preferences: &Preferences) -> Self {
        match snapshot {
            Snapshot::Available(reading) => WeatherPage::Live(WeatherView::new(reading, preferences)),
            Snapshot::Unavailable => WeatherPage::Unavailable,
        }
    }
}

/// Anything the server can send as an HTML document
#[derive(Clone, Copy, Debug)]
pub enum Document<'a> {
    Static(&'a StaticPage),
    Weather(WeatherPage),
}

impl Document<'_> {
    /// Writes the whole document in one pass
    /// param chrome: styles and navigation shared by all pages
    /// param preferences: supplies the refresh interval for live weather
    /// param out: any ufmt sink
    pub fn compose<W>(&self, chrome: &Chrome, preferences: &Preferences, out: &mut W) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            Document::Static(page) => {
                write_head(out, chrome, page.title, None, None)?;
                write_body_open(out, chrome, page.heading, page.path)?;
                out.write_str(page.body)?;
            }
            Document::Weather(WeatherPage::Live(view)) => {
                write_head(
                    out,
                    chrome,
                    "Current Weather",
                    Some(content::WEATHER_CSS),
                    Some(preferences.refresh_seconds),
                )?;
                write_body_open(out, chrome, WEATHER_HEADING, "/weather")?;
                write_live_weather(out, view, preferences.refresh_seconds)?;
            }
            Document::Weather(WeatherPage::Unavailable) => {
                write_head(out, chrome, "Current Weather", Some(content::WEATHER_CSS), None)?;
                write_body_open(out, chrome, WEATHER_HEADING, "/weather")?;
                out.write_str(content::UNAVAILABLE_NOTICE)?;
            }
        }
        write_tail(out)
    }

    /// Byte length of the composed document, without buffering it
    pub fn encoded_len(&self, chrome: &Chrome, preferences: &Preferences) -> usize {
        let mut counter = ByteCounter::default();
        match self.compose(chrome, preferences, &mut counter) {
            Ok(()) => counter.len(),
            Err(never) => match never {},
        }
    }

    pub fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }
}

const WEATHER_HEADING: &str = "&#127777;&#65039; Current Weather Conditions";

/// Builds the weather page for a snapshot into a fixed buffer
pub fn render(snapshot: &Snapshot, chrome: &Chrome, preferences: &Preferences) -> Result<PageBuffer, RenderError> {
    let page = WeatherPage::from_snapshot(snapshot, preferences);
    let mut html = PageBuffer::new();
    Document::Weather(page)
        .compose(chrome, preferences, &mut html)
        .map_err(|()| RenderError::Overflow(PAGE_CAPACITY))?;
    Ok(html)
}

fn write_head<W>(
    out: &mut W,
    chrome: &Chrome,
    title: &str,
    extra_css: Option<&str>,
    refresh_seconds: Option<u16>,
) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    out.write_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\">\n  \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    )?;
    if let Some(seconds) = refresh_seconds {
        uwrite!(out, "  <meta http-equiv=\"refresh\" content=\"{}\">\n", seconds)?;
    }
    uwrite!(out, "  <title>{} - {}</title>\n  <style>\n", title, chrome.site_name)?;
    out.write_str(chrome.stylesheet)?;
    if let Some(css) = extra_css {
        out.write_str(css)?;
    }
    out.write_str("  </style>\n</head>\n")
}

fn write_body_open<W>(out: &mut W, chrome: &Chrome, heading: &str, current: &str) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    uwrite!(out, "<body>\n  <div class=\"container\">\n    <h1>{}</h1>\n    <nav>\n", heading)?;
    for link in chrome.navigation {
        if link.href == current {
            uwrite!(out, "      <a href=\"{}\" class=\"current\">{}</a>\n", link.href, link.label)?;
        } else {
            uwrite!(out, "      <a href=\"{}\">{}</a>\n", link.href, link.label)?;
        }
    }
    out.write_str("    </nav>\n")
}

fn write_tail<W>(out: &mut W) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    out.write_str("  </div>\n</body>\n</html>\n")
}

fn write_live_weather<W>(out: &mut W, view: &WeatherView, refresh_seconds: u16) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    uwrite!(
        out,
        "    <div class=\"info-box\">\n      <strong>&#128205; Location:</strong> {}<br>\n      \
         <strong>&#128339; Readings:</strong> Live sensor data from {}\n    </div>\n",
        content::LOCATION,
        content::SENSOR_NAME
    )?;

    out.write_str("    <div class=\"weather-grid\">\n")?;
    write_card(
        out,
        "temp",
        "Temperature",
        Decimal::new(view.temperature_f, 1),
        "°F",
        Secondary::Value(Decimal::new(view.temperature_c, 1), "°C"),
    )?;
    write_card(
        out,
        "humidity",
        "Humidity",
        Decimal::new(view.humidity_percent, 1),
        "%",
        Secondary::Text("Relative Humidity"),
    )?;
    write_card(
        out,
        "pressure",
        "Pressure",
        Decimal::new(view.pressure_hpa, 1),
        "hPa",
        Secondary::Value(Decimal::new(view.pressure_inhg, 2), "inHg"),
    )?;
    out.write_str("    </div>\n")?;

    out.write_str(
        "    <div class=\"info-box\">\n      \
         <h3 style=\"margin-top: 0;\">&#127780;&#65039; What This Means for Your Visit</h3>\n",
    )?;
    write_advisory(out, "temperature", "Temperature", view.temperature.label(), view.temperature.advisory())?;
    write_advisory(out, "humidity", "Humidity", view.humidity.label(), view.humidity.advisory())?;
    write_advisory(out, "pressure", "Pressure", view.pressure.label(), view.pressure.advisory())?;
    out.write_str("    </div>\n")?;

    uwrite!(
        out,
        "    <p class=\"refresh-note\">&#128202; Page automatically refreshes every {} seconds with live data</p>\n",
        refresh_seconds
    )
}

/// Small line under a card's main value
enum Secondary {
    Value(Decimal, &'static str),
    Text(&'static str),
}

fn write_card<W>(
    out: &mut W,
    class: &str,
    label: &str,
    value: Decimal,
    unit: &str,
    secondary: Secondary,
) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    uwrite!(
        out,
        "      <div class=\"weather-card {}\">\n        <div class=\"weather-label\">{}</div>\n        \
         <div class=\"weather-value\">{}<span class=\"weather-unit\">{}</span></div>\n",
        class,
        label,
        value,
        unit
    )?;
    match secondary {
        Secondary::Value(value, unit) => uwrite!(
            out,
            "        <div class=\"weather-secondary\">{} {}</div>\n",
            value,
            unit
        )?,
        Secondary::Text(text) => uwrite!(out, "        <div class=\"weather-secondary\">{}</div>\n", text)?,
    }
    out.write_str("      </div>\n")
}

fn write_advisory<W>(out: &mut W, metric: &str, label: &str, band: &str, advisory: &str) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    uwrite!(
        out,
        "      <p class=\"advisory {}\" data-band=\"{}\"><strong>{}:</strong> {}</p>\n",
        metric,
        band,
        label,
        advisory
    )
}

/// A sink that only counts bytes
#[derive(Default)]
pub struct ByteCounter {
    len: usize,
}

impl ByteCounter {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl uWrite for ByteCounter {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.len += s.len();
        Ok(())
    }
}
