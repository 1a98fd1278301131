//! Scoped wall-clock timers, aggregated per label.
//!
//! With the `profiling` feature off every item here is a no-op.

#[cfg(feature = "profiling")]
mod enabled {
    use std::sync::OnceLock;
    use std::time::{Duration, Instant};

    use dashmap::DashMap;
    use tracing::info;

    type Count = u64;
    type TotalNanos = u128;

    static STATS: OnceLock<DashMap<&'static str, (Count, TotalNanos)>> = OnceLock::new();

    #[inline]
    fn stats() -> &'static DashMap<&'static str, (Count, TotalNanos)> {
        STATS.get_or_init(DashMap::new)
    }

    /// Adds its lifetime to the label's total when dropped.
    pub struct Timer {
        label: &'static str,
        start: Instant,
    }

    impl Timer {
        /// Start timing `label`.
        #[inline]
        #[must_use]
        pub fn new(label: &'static str) -> Self {
            Self {
                label,
                start: Instant::now(),
            }
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            record(self.label, self.start.elapsed());
        }
    }

    /// Add one call of length `dur` to `label`.
    pub fn record(label: &'static str, dur: Duration) {
        let mut entry = stats().entry(label).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += dur.as_nanos();
    }

    /// Log every label, slowest total first.
    pub fn report() {
        let mut rows: Vec<(&'static str, Count, TotalNanos)> = stats()
            .iter()
            .map(|kv| (*kv.key(), kv.value().0, kv.value().1))
            .collect();
        rows.sort_by(|a, b| b.2.cmp(&a.2));

        info!("==== stencil search profile ====");
        for (label, count, total_ns) in rows {
            let total_ms = total_ns as f64 / 1_000_000.0;
            let avg_ns = if count == 0 {
                0.0
            } else {
                total_ns as f64 / count as f64
            };
            info!(
                "{:<48} calls={:<10} total={:>9.3} ms avg={:>12.1} ns",
                label, count, total_ms, avg_ns
            );
        }
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    use std::time::Duration;

    /// No-op timer.
    #[derive(Clone, Copy)]
    pub struct Timer;

    impl Timer {
        /// Does nothing.
        #[inline]
        #[must_use]
        pub const fn new(_: &'static str) -> Self {
            Self
        }
    }

    /// Does nothing.
    pub const fn record(_: &'static str, _: Duration) {}

    /// Does nothing.
    pub const fn report() {}
}

#[cfg(feature = "profiling")]
pub use enabled::*;

#[cfg(not(feature = "profiling"))]
pub use disabled::*;
