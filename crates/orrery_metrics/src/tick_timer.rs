//! Wall-clock timing of simulation ticks

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

pub struct TickTimer {
    started: Option<Instant>,
    tick_times: RingBuffer<Duration>,
}

impl TickTimer {
    /// Track the last `window` ticks.
    pub fn new(window: usize) -> Self {
        Self {
            started: None,
            tick_times: RingBuffer::new(window),
        }
    }

    pub fn begin(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Record the tick opened by `begin`. Unpaired calls are ignored.
    pub fn end(&mut self) {
        if let Some(started) = self.started.take() {
            self.tick_times.push(started.elapsed());
        }
    }

    pub fn samples(&self) -> usize {
        self.tick_times.len()
    }

    pub fn ticks_per_second(&self) -> f64 {
        let avg = self.tick_times.average().as_secs_f64();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    pub fn tick_time_ms(&self) -> f64 {
        self.tick_times.average().as_secs_f64() * 1000.0
    }

    pub fn tick_time_range_ms(&self) -> (f64, f64) {
        let (min, max) = self.tick_times.min_max();
        (min.as_secs_f64() * 1000.0, max.as_secs_f64() * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_without_begin_records_nothing() {
        let mut timer = TickTimer::new(4);
        timer.end();
        assert_eq!(timer.samples(), 0);
        assert_eq!(timer.ticks_per_second(), 0.0);
    }

    #[test]
    fn paired_calls_record_samples() {
        let mut timer = TickTimer::new(4);
        for _ in 0..6 {
            timer.begin();
            std::thread::sleep(Duration::from_millis(1));
            timer.end();
        }
        assert_eq!(timer.samples(), 4);
        let (min, max) = timer.tick_time_range_ms();
        assert!(min >= 1.0);
        assert!(max >= min);
        assert!(timer.ticks_per_second() > 0.0);
    }
}
