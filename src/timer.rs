/// Countdown timer engine driven by a fixed 100ms tick
use crate::types::Command;
use std::time::{Duration, Instant};

pub const TICK_PERIOD: Duration = Duration::from_millis(100);
pub const DEFAULT_DURATION_SECS: f64 = 60.0;
pub const MIN_DURATION_SECS: f64 = 1.0;
pub const MAX_DURATION_SECS: f64 = 3600.0;

/// Quick-select durations offered next to the duration input
pub const PRESETS: [(&str, f64); 4] = [
    ("30s", 30.0),
    ("60s", 60.0),
    ("90s", 90.0),
    ("2 min", 120.0),
];

/// Parse user input into a duration in seconds.
///
/// Unparseable input and zero fall back to 60s; anything else is clamped to
/// 1..=3600 and rounded to one decimal.
pub fn parse_duration(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs != 0.0 => clamp_duration(secs),
        _ => DEFAULT_DURATION_SECS,
    }
}

pub fn clamp_duration(secs: f64) -> f64 {
    (secs.clamp(MIN_DURATION_SECS, MAX_DURATION_SECS) * 10.0).round() / 10.0
}

fn to_tenths(secs: f64) -> u32 {
    (secs.max(0.0) * 10.0).round() as u32
}

/// How the countdown should be coloured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Running,
    Idle,
    Expired,
}

/// Repeating 100ms schedule measured against a monotonic clock
#[derive(Debug)]
struct TickInterval {
    next_due: Instant,
}

impl TickInterval {
    fn new(now: Instant) -> Self {
        Self {
            next_due: now + TICK_PERIOD,
        }
    }

    /// Number of ticks that became due up to `now`
    fn due(&mut self, now: Instant) -> u32 {
        let mut count = 0;
        while self.next_due <= now {
            count += 1;
            self.next_due += TICK_PERIOD;
        }
        count
    }
}

/// Countdown state. Time is held in tenths of a second.
#[derive(Debug)]
pub struct TimerEngine {
    initial: u32,
    remaining: u32,
    running: bool,
    interval: Option<TickInterval>,
}

impl TimerEngine {
    pub fn new(initial_secs: f64) -> Self {
        let initial = to_tenths(clamp_duration(initial_secs));
        Self {
            initial,
            remaining: initial,
            running: false,
            interval: None,
        }
    }

    pub fn initial_secs(&self) -> f64 {
        self.initial as f64 / 10.0
    }

    pub fn remaining_secs(&self) -> f64 {
        self.remaining as f64 / 10.0
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a tick interval is installed
    #[cfg(test)]
    pub fn has_interval(&self) -> bool {
        self.interval.is_some()
    }

    /// Change the configured duration used by the next start. Does not
    /// touch the remaining time on display.
    pub fn set_initial(&mut self, secs: f64) {
        self.initial = to_tenths(clamp_duration(secs));
    }

    /// Reset to `secs` and begin ticking, replacing any previous interval
    pub fn start(&mut self, secs: f64, now: Instant) {
        self.remaining = to_tenths(secs);
        self.running = true;
        self.interval = Some(TickInterval::new(now));
    }

    /// Restart from the configured duration
    pub fn restart(&mut self, now: Instant) {
        self.start(self.initial_secs(), now);
    }

    /// Halt ticking. Remaining time is preserved.
    pub fn stop(&mut self) {
        self.running = false;
        self.interval = None;
    }

    /// Overwrite the running flag with a state reported by the device.
    /// The interval is left alone; ticks are gated on the flag.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Apply one tick. Returns the timeout command when the countdown hits 0.
    pub fn tick(&mut self) -> Option<Command> {
        if !self.running || self.interval.is_none() {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.interval = None;
            self.running = false;
            return Some(Command::Timeout);
        }
        None
    }

    /// Run every tick that became due up to `now`
    pub fn advance(&mut self, now: Instant) -> Option<Command> {
        let due = self.interval.as_mut().map_or(0, |interval| interval.due(now));
        for _ in 0..due {
            if let Some(command) = self.tick() {
                return Some(command);
            }
        }
        None
    }

    pub fn display_state(&self) -> DisplayState {
        if self.running {
            DisplayState::Running
        } else if self.remaining > 0 {
            DisplayState::Idle
        } else {
            DisplayState::Expired
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}
