//! Minimal HTTP/1.x responder for the kiosk.
//!
//! One request per connection: read the head, answer, let the bridge close
//! the socket. Request bodies are never read.

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use ufmt::{uWrite, uwrite};

use crate::content::{self, Chrome};
use crate::preferences::Preferences;
use crate::rendering::{Document, WeatherPage};
use crate::sensors::{EnvironmentSensor, SensorGateway};
use crate::timer::{CountDownTimer, POLL_INTERVAL_MS, REQUEST_TIMEOUT_MS};

/// Bytes of request head kept; the rest of an oversized head is discarded
pub const REQUEST_CAPACITY: usize = 1024;

pub type RequestHead = Vec<u8, REQUEST_CAPACITY>;

/// A byte stream to one client
///
/// `read` must not block: it returns `WouldBlock` when nothing is pending
/// and `Ok(0)` once the peer has gone away.
pub trait Connection {
    type Error: Debug;

    fn read(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error>;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError<E: Debug> {
    #[error("connection error: {0:?}")]
    Io(E),
    #[error("request head did not complete in time")]
    Timeout,
    #[error("connection closed before the request completed")]
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Head,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    Home,
    About,
    Weather,
    Logo,
    NotFound,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path {
            "/" | "/index.html" => Route::Home,
            "/about" => Route::About,
            "/weather" => Route::Weather,
            "/logo.svg" => Route::Logo,
            _ => Route::NotFound,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
}

impl Status {
    pub const fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    pub path: &'a str,
}

/// Parses the request line out of a request head
/// Returns None unless the line is `METHOD TARGET HTTP/x`
pub fn parse_request(head: &[u8]) -> Option<Request<'_>> {
    let end = head.iter().position(|&b| b == b'\n').unwrap_or(head.len());
    let line = core::str::from_utf8(&head[..end]).ok()?.trim_end_matches('\r');

    let mut parts = line.split(' ');
    let method = match parts.next()? {
        "GET" => Method::Get,
        "HEAD" => Method::Head,
        "" => return None,
        _ => Method::Other,
    };
    let target = parts.next()?;
    let version = parts.next()?;
    if !target.starts_with('/') || !version.starts_with("HTTP/") || parts.next().is_some() {
        return None;
    }

    let path = target.split(['?', '#']).next().unwrap_or(target);
    Some(Request { method, path })
}

/// Reads from `connection` until a blank line ends the request head
/// Waits indefinitely for the first byte, then allows `REQUEST_TIMEOUT_MS`
/// for the rest of the head
pub fn read_request_head<C, D>(connection: &mut C, delay: &mut D) -> Result<RequestHead, ServeError<C::Error>>
where
    C: Connection,
    D: DelayNs,
{
    const TERMINATOR: &[u8; 4] = b"\r\n\r\n";

    let mut head = RequestHead::new();
    let mut matched = 0;
    let mut started = false;
    let mut timer = CountDownTimer::new(REQUEST_TIMEOUT_MS);
    let mut chunk = [0u8; 64];

    loop {
        match connection.read(&mut chunk) {
            Ok(0) => return Err(ServeError::Closed),
            Ok(n) => {
                started = true;
                for &byte in &chunk[..n] {
                    // A full buffer keeps the request line; later header bytes are dropped
                    let _ = head.push(byte);
                    matched = if byte == TERMINATOR[matched] {
                        matched + 1
                    } else if byte == b'\r' {
                        1
                    } else {
                        0
                    };
                    if matched == TERMINATOR.len() {
                        return Ok(head);
                    }
                }
            }
            Err(nb::Error::WouldBlock) => {
                if started {
                    if timer.is_finished() {
                        return Err(ServeError::Timeout);
                    }
                    timer.tick(POLL_INTERVAL_MS);
                }
                delay.delay_ms(POLL_INTERVAL_MS);
            }
            Err(nb::Error::Other(e)) => return Err(ServeError::Io(e)),
        }
    }
}

/// Adapts a connection into a ufmt sink so pages stream straight out
struct ConnectionWriter<'a, C> {
    connection: &'a mut C,
}

impl<C: Connection> uWrite for ConnectionWriter<'_, C> {
    type Error = C::Error;

    fn write_str(&mut self, s: &str) -> Result<(), C::Error> {
        self.connection.write_all(s.as_bytes())
    }
}

/// Request-handling context: owns the sensor gateway and the page settings
///
/// There is exactly one of these, held by the serve loop and lent to each
/// request in turn.
pub struct Kiosk<S> {
    gateway: SensorGateway<S>,
    preferences: Preferences,
    chrome: Chrome,
}

impl<S: EnvironmentSensor> Kiosk<S> {
    /// Band edges given out of order are reordered before any page uses them
    pub fn new(gateway: SensorGateway<S>, mut preferences: Preferences, chrome: Chrome) -> Self {
        if !preferences.is_ordered() {
            warn!("Band thresholds out of order, reordering them");
            preferences.sanitize();
        }
        Self {
            gateway,
            preferences,
            chrome,
        }
    }

    /// Hands the gateway back, ending the kiosk
    pub fn release(self) -> SensorGateway<S> {
        self.gateway
    }

    /// Waits for one request on `connection` and answers it
    pub fn serve<C, D>(&mut self, connection: &mut C, delay: &mut D) -> Result<Status, ServeError<C::Error>>
    where
        C: Connection,
        D: DelayNs,
    {
        let head = read_request_head(connection, delay)?;
        self.respond(&head, connection)
    }

    /// Answers an already-read request head
    pub fn respond<C: Connection>(&mut self, head: &[u8], connection: &mut C) -> Result<Status, ServeError<C::Error>> {
        let Some(request) = parse_request(head) else {
            debug!("Unparseable request line");
            return send_text(connection, Status::BadRequest, true);
        };
        let with_body = match request.method {
            Method::Get => true,
            Method::Head => false,
            Method::Other => return send_text(connection, Status::MethodNotAllowed, true),
        };

        let route = Route::from_path(request.path);
        debug!("Request for {=str} -> {}", request.path, route);
        match route {
            Route::Home => self.send_document(connection, Document::Static(&content::HOME), with_body),
            Route::About => self.send_document(connection, Document::Static(&content::ABOUT), with_body),
            Route::Weather => {
                let snapshot = self.gateway.read();
                let page = WeatherPage::from_snapshot(&snapshot, &self.preferences);
                self.send_document(connection, Document::Weather(page), with_body)
            }
            Route::Logo => {
                let body = content::LOGO_SVG.as_bytes();
                write_head(connection, Status::Ok, "image/svg+xml", body.len())?;
                if with_body {
                    connection.write_all(body).map_err(ServeError::Io)?;
                }
                Ok(Status::Ok)
            }
            Route::NotFound => send_text(connection, Status::NotFound, with_body),
        }
    }

    fn send_document<C: Connection>(
        &self,
        connection: &mut C,
        document: Document<'_>,
        with_body: bool,
    ) -> Result<Status, ServeError<C::Error>> {
        // Composition is deterministic, so a counting pass gives the exact length
        let length = document.encoded_len(&self.chrome, &self.preferences);
        write_head(connection, Status::Ok, document.content_type(), length)?;
        if with_body {
            let mut writer = ConnectionWriter { connection };
            document
                .compose(&self.chrome, &self.preferences, &mut writer)
                .map_err(ServeError::Io)?;
        }
        Ok(Status::Ok)
    }
}

fn write_head<C: Connection>(
    connection: &mut C,
    status: Status,
    content_type: &str,
    length: usize,
) -> Result<(), ServeError<C::Error>> {
    let mut writer = ConnectionWriter { connection };
    uwrite!(
        writer,
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
        status.code(),
        status.reason(),
        content_type,
        length
    )
    .map_err(ServeError::Io)?;
    if status == Status::MethodNotAllowed {
        writer.write_str("Allow: GET, HEAD\r\n").map_err(ServeError::Io)?;
    }
    writer.write_str("Connection: close\r\n\r\n").map_err(ServeError::Io)
}

/// Plain-text response whose body is the status reason
fn send_text<C: Connection>(connection: &mut C, status: Status, with_body: bool) -> Result<Status, ServeError<C::Error>> {
    let body = status.reason();
    write_head(connection, status, "text/plain", body.len())?;
    if with_body {
        connection.write_all(body.as_bytes()).map_err(ServeError::Io)?;
    }
    Ok(status)
}
