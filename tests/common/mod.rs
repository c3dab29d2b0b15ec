#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use lake_kiosk::sensors::{BusAddress, EnvironmentSensor, SensorError};
use lake_kiosk::server::Connection;

/// Sensor that answers at one address with fixed values
pub struct BenchSensor {
    pub answers_at: Option<BusAddress>,
    pub celsius: f32,
    pub humidity: f32,
    pub hpa: f32,
    pub transactions: usize,
}

impl BenchSensor {
    pub fn new(answers_at: Option<BusAddress>, celsius: f32, humidity: f32, hpa: f32) -> Self {
        Self {
            answers_at,
            celsius,
            humidity,
            hpa,
            transactions: 0,
        }
    }

    pub fn absent() -> Self {
        Self::new(None, 0.0, 0.0, 0.0)
    }
}

impl EnvironmentSensor for BenchSensor {
    fn begin(&mut self, address: BusAddress) -> Result<(), SensorError> {
        if self.answers_at == Some(address) {
            Ok(())
        } else {
            Err(SensorError::NoAcknowledge)
        }
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.transactions += 1;
        Ok(self.celsius)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.transactions += 1;
        Ok(self.humidity)
    }

    fn read_pressure(&mut self) -> Result<f32, SensorError> {
        self.transactions += 1;
        Ok(self.hpa)
    }
}

/// One scripted event on the fake link
pub enum Incoming {
    Bytes(Vec<u8>),
    Idle,
    Hangup,
}

/// Connection fed from a script; an exhausted script just idles
#[derive(Default)]
pub struct ScriptedConnection {
    pub incoming: VecDeque<Incoming>,
    pub written: Vec<u8>,
}

impl ScriptedConnection {
    pub fn request(text: &str) -> Self {
        let mut connection = Self::default();
        connection.push(text);
        connection
    }

    pub fn push(&mut self, text: &str) {
        self.incoming.push_back(Incoming::Bytes(text.as_bytes().to_vec()));
    }

    pub fn response(&self) -> Response {
        let text = String::from_utf8(self.written.clone()).expect("utf-8 response");
        let (head, body) = text.split_once("\r\n\r\n").expect("blank line after headers");
        let mut lines = head.split("\r\n");
        let status = lines.next().unwrap().to_string();
        let headers = lines
            .map(|line| {
                let (name, value) = line.split_once(": ").unwrap();
                (name.to_string(), value.to_string())
            })
            .collect();
        Response {
            status,
            headers,
            body: body.to_string(),
        }
    }
}

impl Connection for ScriptedConnection {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> nb::Result<usize, ()> {
        match self.incoming.pop_front() {
            Some(Incoming::Bytes(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    self.incoming.push_front(Incoming::Bytes(bytes.split_off(n)));
                }
                Ok(n)
            }
            Some(Incoming::Idle) | None => Err(nb::Error::WouldBlock),
            Some(Incoming::Hangup) => Ok(0),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }
}

pub struct Response {
    pub status: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Delay that returns immediately
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
