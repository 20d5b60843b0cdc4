use std::time::Instant;

/// Holds back samples while emulation runs ahead of real time.
///
/// A sample is admitted only if admitting it keeps the average rate since
/// it was created at or below the device rate.
#[derive(Debug)]
pub struct Pacer {
    enabled: bool,
    start: Instant,
    admitted: u64,
}

impl Pacer {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            start: Instant::now(),
            admitted: 0,
        }
    }

    #[inline]
    pub fn admit(&mut self, device_rate: u32) -> bool {
        if !self.enabled {
            return true;
        }
        self.admit_at(Instant::now(), device_rate)
    }

    fn admit_at(&mut self, now: Instant, device_rate: u32) -> bool {
        let elapsed = now.duration_since(self.start).as_secs_f64();
        if (self.admitted + 1) as f64 / elapsed <= f64::from(device_rate) {
            self.admitted += 1;
            true
        } else {
            false
        }
    }
}
