#![cfg_attr(not(test), no_std)]

//! # lake-kiosk
//! ## A visitor information kiosk for a Raspberry Pi Pico, in Rust
//!
//! Features:
//! - Static tour pages served over a serial Wi-Fi bridge
//! - Live weather page from a BME280 (temperature, humidity, pressure)
//! - Two-address sensor probe with a degraded "unavailable" page
//! - Visitor guidance for each reading, refreshed by the browser

// Must come first so the log macros are visible to every module below
mod fmt;

pub mod advisory;
pub mod content;
pub mod preferences;
pub mod rendering;
pub mod sensors;
pub mod server;
pub mod timer;
pub mod units;
