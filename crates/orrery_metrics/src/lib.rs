//! Orrery Metrics - tick-level instrumentation for the simulation engine
//!
//! Everything in here is compiled out unless the `metrics` feature is
//! enabled. The stub types keep identical signatures so callers never need
//! their own `cfg` guards.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use orrery_metrics::{SystemProfiler, TickTimer};
//!
//! let mut timer = TickTimer::new(60);
//! let mut profiler = SystemProfiler::new();
//! timer.begin();
//! profiler.time_system("integrate", || { /* ... */ });
//! timer.end();
//! println!("{:.1} ticks/s", timer.ticks_per_second());
//! ```

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod system_profiler;
#[cfg(feature = "metrics")]
mod tick_timer;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use system_profiler::SystemProfiler;
#[cfg(feature = "metrics")]
pub use tick_timer::TickTimer;

// ============================================================================
// Macros for conditional compilation
// ============================================================================

/// Time a named phase (zero-cost when metrics disabled)
///
/// The `cfg` is evaluated in the calling crate, which must therefore define
/// its own `metrics` feature forwarding to this one.
#[macro_export]
macro_rules! time_scope {
    ($profiler:expr, $name:expr, $body:block) => {{
        #[cfg(feature = "metrics")]
        {
            $profiler.time_system($name, || $body)
        }
        #[cfg(not(feature = "metrics"))]
        {
            $body
        }
    }};
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct TickTimer;

#[cfg(not(feature = "metrics"))]
impl TickTimer {
    pub fn new(_window: usize) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn samples(&self) -> usize { 0 }
    pub fn ticks_per_second(&self) -> f64 { 0.0 }
    pub fn tick_time_ms(&self) -> f64 { 0.0 }
    pub fn tick_time_range_ms(&self) -> (f64, f64) { (0.0, 0.0) }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug)]
pub struct RingBuffer<T>(std::marker::PhantomData<T>);

#[cfg(not(feature = "metrics"))]
impl<T> RingBuffer<T> {
    pub fn new(_capacity: usize) -> Self { Self(std::marker::PhantomData) }
    pub fn push(&mut self, _value: T) {}
    pub fn len(&self) -> usize { 0 }
    pub fn is_empty(&self) -> bool { true }
    pub fn average(&self) -> T where T: Default { T::default() }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn add(&mut self, _name: &str, _value: u64) {}
    pub fn get(&self, _name: &str) -> u64 { 0 }
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> { std::iter::empty() }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct SystemProfiler;

#[cfg(not(feature = "metrics"))]
impl SystemProfiler {
    pub fn new() -> Self { Self }
    pub fn time_system<F, R>(&mut self, _name: &'static str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn calls(&self, _name: &str) -> u64 { 0 }
    pub fn iter(&self) -> impl Iterator<Item = (&str, std::time::Duration)> { std::iter::empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stubs_and_real_types_share_signatures() {
        let mut timer = TickTimer::new(8);
        timer.begin();
        timer.end();
        assert!(timer.tick_time_ms() >= 0.0);

        let mut counter = Counter::new();
        counter.add("ticks", 1);
        let _ = counter.get("ticks");

        let mut profiler = SystemProfiler::new();
        let value = profiler.time_system("phase", || 41 + 1);
        assert_eq!(value, 42);
    }

    #[test]
    fn time_scope_returns_body_value() {
        let mut profiler = SystemProfiler::new();
        let value = time_scope!(profiler, "scoped", { 7 * 6 });
        assert_eq!(value, 42);
    }
}
