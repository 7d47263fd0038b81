use chrono::{Datelike, Local, Timelike, Weekday};
use std::fmt;

const HOURS_PER_DAY: f64 = 24.0;
const SECS_PER_HOUR: f64 = 3600.0;
const SECS_PER_DAY: f64 = 86_400.0;
/// Seconds this close to midnight count as midnight.
const MIDNIGHT_SNAP: f64 = 1e-6;

/// External source of real-world time, queried once when the engine starts.
pub trait ClockSource {
    /// Current time of day in fractional hours `[0, 24)` and weekday.
    fn now(&self) -> (f64, Weekday);
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> (f64, Weekday) {
        let now = Local::now();
        let hours = now.hour() as f64
            + now.minute() as f64 / 60.0
            + (now.second() as f64 + now.nanosecond() as f64 / 1e9) / SECS_PER_HOUR;
        (hours, now.weekday())
    }
}

/// A clock source pinned to one instant. Used by tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub hours: f64,
    pub weekday: Weekday,
}

impl FixedClock {
    pub fn new(hours: f64, weekday: Weekday) -> Self {
        FixedClock { hours, weekday }
    }
}

impl ClockSource for FixedClock {
    fn now(&self) -> (f64, Weekday) {
        (self.hours, self.weekday)
    }
}

/// Simulated time of day and weekday, advanced 1:1 with elapsed seconds.
///
/// Time is held as seconds since midnight with a compensation term, so many
/// small ticks add up to whole days without drifting off midnight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    secs_of_day: f64,
    carry: f64,
    weekday: Weekday,
}

impl Clock {
    /// Create a clock at the given time. Out-of-range hours are wrapped into `[0, 24)`.
    pub fn new(hours: f64, weekday: Weekday) -> Self {
        let secs_of_day = if hours.is_finite() {
            hours.rem_euclid(HOURS_PER_DAY) * SECS_PER_HOUR
        } else {
            0.0
        };
        Clock {
            secs_of_day: secs_of_day.min(SECS_PER_DAY - MIDNIGHT_SNAP),
            carry: 0.0,
            weekday,
        }
    }

    /// Synchronize with an external clock source.
    pub fn from_source(source: &dyn ClockSource) -> Self {
        let (hours, weekday) = source.now();
        Clock::new(hours, weekday)
    }

    /// Fractional hours since midnight, `[0, 24)`.
    pub fn time_of_day(&self) -> f64 {
        self.secs_of_day / SECS_PER_HOUR
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Advance by `elapsed_secs`, rolling the weekday forward once per
    /// midnight crossed. Negative or non-finite input is ignored.
    pub fn advance(&mut self, elapsed_secs: f64) {
        if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
            return;
        }
        // Kahan summation keeps per-tick rounding from accumulating.
        let step = elapsed_secs - self.carry;
        let total = self.secs_of_day + step;
        self.carry = (total - self.secs_of_day) - step;
        if !self.carry.is_finite() || self.carry.abs() >= 1.0 {
            self.carry = 0.0;
        }

        let mut days = (total / SECS_PER_DAY).floor();
        let mut secs = total.rem_euclid(SECS_PER_DAY);
        if SECS_PER_DAY - secs < MIDNIGHT_SNAP {
            secs = 0.0;
            days += 1.0;
            self.carry = 0.0;
        }
        self.secs_of_day = secs;

        for _ in 0..(days.rem_euclid(7.0) as u8) {
            self.weekday = self.weekday.succ();
        }
    }

    /// Format the time of day as HH:MM.
    pub fn time_display(&self) -> String {
        format_hours(self.time_of_day())
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.weekday, self.time_display())
    }
}

/// Format fractional hours as HH:MM (24 renders as 24:00).
pub fn format_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).floor().max(0.0) as u64;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_adds_hours() {
        let mut clock = Clock::new(10.0, Weekday::Mon);
        clock.advance(1800.0);
        assert_eq!(clock.time_of_day(), 10.5);
        assert_eq!(clock.weekday(), Weekday::Mon);
    }

    #[test]
    fn advance_wraps_to_next_day() {
        let mut clock = Clock::new(23.5, Weekday::Tue);
        clock.advance(3600.0);
        assert_eq!(clock.time_of_day(), 0.5);
        assert_eq!(clock.weekday(), Weekday::Wed);
    }

    #[test]
    fn reaching_exactly_midnight_wraps() {
        let mut clock = Clock::new(23.0, Weekday::Fri);
        clock.advance(3600.0);
        assert_eq!(clock.time_of_day(), 0.0);
        assert_eq!(clock.weekday(), Weekday::Sat);
    }

    #[test]
    fn sunday_wraps_to_monday() {
        let mut clock = Clock::new(23.75, Weekday::Sun);
        clock.advance(900.0);
        assert_eq!(clock.weekday(), Weekday::Mon);
    }

    #[test]
    fn full_day_returns_to_same_time_next_weekday() {
        let mut clock = Clock::new(10.25, Weekday::Thu);
        for _ in 0..96 {
            clock.advance(900.0);
        }
        assert_eq!(clock.time_of_day(), 10.25);
        assert_eq!(clock.weekday(), Weekday::Fri);
    }

    #[test]
    fn multi_day_jump_wraps_each_day() {
        let mut clock = Clock::new(12.0, Weekday::Mon);
        clock.advance(3.0 * 86400.0);
        assert_eq!(clock.time_of_day(), 12.0);
        assert_eq!(clock.weekday(), Weekday::Thu);
    }

    #[test]
    fn sixtieth_second_ticks_cross_midnight_once() {
        let mut clock = Clock::new(0.0, Weekday::Mon);
        for _ in 0..(60 * 86_400) {
            clock.advance(1.0 / 60.0);
        }
        assert_eq!(clock.weekday(), Weekday::Tue);
        assert!(clock.time_of_day() < 1e-9, "drifted to {}", clock.time_of_day());
    }

    #[test]
    fn one_second_ticks_keep_time_of_day() {
        let mut clock = Clock::new(10.0, Weekday::Sat);
        for _ in 0..86_400 {
            clock.advance(1.0);
        }
        assert_eq!(clock.weekday(), Weekday::Sun);
        assert!((clock.time_of_day() - 10.0).abs() < 1e-9);

        let mut clock = Clock::new(10.0, Weekday::Sat);
        for _ in 0..(60 * 86_400) {
            clock.advance(1.0 / 60.0);
        }
        assert_eq!(clock.weekday(), Weekday::Sun);
        assert!((clock.time_of_day() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn huge_elapsed_returns_in_range() {
        let mut clock = Clock::new(1.0, Weekday::Mon);
        clock.advance(1e30);
        assert!((0.0..24.0).contains(&clock.time_of_day()));
        clock.advance(f64::MAX);
        assert!((0.0..24.0).contains(&clock.time_of_day()));
    }

    #[test]
    fn week_long_jump_keeps_weekday() {
        let mut clock = Clock::new(8.0, Weekday::Wed);
        clock.advance(7.0 * 86_400.0);
        assert_eq!(clock.weekday(), Weekday::Wed);
        clock.advance(9.0 * 86_400.0);
        assert_eq!(clock.weekday(), Weekday::Fri);
        assert_eq!(clock.time_of_day(), 8.0);
    }

    #[test]
    fn negative_and_nan_elapsed_ignored() {
        let mut clock = Clock::new(8.0, Weekday::Mon);
        clock.advance(-60.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.time_of_day(), 8.0);
    }

    #[test]
    fn new_wraps_out_of_range_hours() {
        let clock = Clock::new(25.0, Weekday::Mon);
        assert_eq!(clock.time_of_day(), 1.0);
    }

    #[test]
    fn from_fixed_source() {
        let clock = Clock::from_source(&FixedClock::new(6.5, Weekday::Sat));
        assert_eq!(clock.time_of_day(), 6.5);
        assert_eq!(clock.weekday(), Weekday::Sat);
    }

    #[test]
    fn system_clock_in_range() {
        let (hours, _) = SystemClock.now();
        assert!((0.0..24.0).contains(&hours));
    }

    #[test]
    fn display_formats_day_and_time() {
        let clock = Clock::new(9.75, Weekday::Wed);
        assert_eq!(clock.to_string(), "Wed 09:45");
    }
}
