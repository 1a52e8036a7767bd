//! Bounded latency windows.

use std::collections::{HashMap, VecDeque};

/// Samples retained while an interval accumulates.
pub const LIVE_WINDOW: usize = 100;

/// Samples carried over into the next interval.
pub const RETAINED_WINDOW: usize = 50;

/// A named latency channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatencyChannel {
    /// End-to-end request handling time.
    Service,
    /// Time spent creating a pizza at the factory.
    PizzaCreation,
}

/// Recent duration samples per channel, in milliseconds.
#[derive(Debug)]
pub struct LatencySampler {
    channels: HashMap<LatencyChannel, VecDeque<u64>>,
    live_window: usize,
    retained_window: usize,
}

impl Default for LatencySampler {
    fn default() -> Self {
        Self::with_windows(LIVE_WINDOW, RETAINED_WINDOW)
    }
}

impl LatencySampler {
    /// Creates a sampler with the default windows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sampler with custom window sizes.
    ///
    /// A zero live window is raised to one so the newest sample is always kept.
    #[must_use]
    pub fn with_windows(live_window: usize, retained_window: usize) -> Self {
        Self {
            channels: HashMap::new(),
            live_window: live_window.max(1),
            retained_window,
        }
    }

    /// Appends a sample, dropping the oldest once the live window is full.
    pub fn record(&mut self, channel: LatencyChannel, duration_ms: u64) {
        let samples = self.channels.entry(channel).or_default();
        samples.push_back(duration_ms);
        while samples.len() > self.live_window {
            samples.pop_front();
        }
    }

    /// Mean of the retained samples rounded to the nearest millisecond, 0 if empty.
    #[must_use]
    pub fn average(&self, channel: LatencyChannel) -> u64 {
        let Some(samples) = self.channels.get(&channel) else {
            return 0;
        };
        if samples.is_empty() {
            return 0;
        }

        let sum: u128 = samples.iter().map(|&s| u128::from(s)).sum();
        let len = samples.len() as u128;
        // Round half up.
        let mean = (sum + len / 2) / len;
        u64::try_from(mean).unwrap_or(u64::MAX)
    }

    /// Number of samples currently held for a channel.
    #[must_use]
    pub fn len(&self, channel: LatencyChannel) -> usize {
        self.channels.get(&channel).map_or(0, VecDeque::len)
    }

    /// Returns true when no channel holds samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.values().all(VecDeque::is_empty)
    }

    /// Keeps only the most recent samples of every channel for the next interval.
    ///
    /// A window already at or under the retained size is left whole, so an idle
    /// interval still reports the last mean rather than zero.
    pub fn truncate_to_retained(&mut self) {
        for samples in self.channels.values_mut() {
            let excess = samples.len().saturating_sub(self.retained_window);
            samples.drain(..excess);
        }
    }
}

/// Converts a caller-supplied millisecond value into a sample, clamping
/// negative and non-finite inputs to zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_millis(ms: f64) -> u64 {
    if ms.is_finite() && ms > 0.0 {
        ms.round() as u64
    } else {
        0
    }
}
