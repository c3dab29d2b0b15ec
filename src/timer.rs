/// Counts down in whole milliseconds, one `tick` per poll
pub struct CountDownTimer {
    target_ms: u32,
}

pub const REQUEST_TIMEOUT_MS: u32 = 2000; // Whole request must arrive within 2s
pub const POLL_INTERVAL_MS: u32 = 1;
pub const SENSOR_STARTUP_DELAY_MS: u32 = 10; // BME280 needs ~2ms after power-on

impl CountDownTimer {
    pub fn new(target_ms: u32) -> CountDownTimer {
        Self { target_ms }
    }

    pub fn tick(&mut self, elapsed_ms: u32) {
        self.target_ms = self.target_ms.saturating_sub(elapsed_ms);
    }

    pub fn is_finished(&self) -> bool {
        self.target_ms == 0
    }
}
