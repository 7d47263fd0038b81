use crate::station::{ProgramSlot, Schedule};
use chrono::Weekday;

/// Identity of a slot within a station's schedule: the weekday list it sits
/// in and its position there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub day: Weekday,
    pub index: usize,
}

/// Tracks which programme slot is on air for the active station.
#[derive(Debug, Clone, Default)]
pub struct ProgramScheduler {
    active: Option<SlotKey>,
}

impl ProgramScheduler {
    pub fn new() -> Self {
        ProgramScheduler { active: None }
    }

    pub fn active(&self) -> Option<SlotKey> {
        self.active
    }

    /// Look up the active slot in `schedule`.
    pub fn active_slot<'a>(&self, schedule: &'a Schedule) -> Option<&'a ProgramSlot> {
        let key = self.active?;
        schedule.slot(key.day, key.index)
    }

    /// Per-tick check. Returns true when a different slot has come on air.
    ///
    /// When the day has no schedule entry, or no slot covers `hour`, the
    /// current slot is left as it is.
    pub fn update(&mut self, schedule: &Schedule, day: Weekday, hour: f64) -> bool {
        let Some((index, _)) = schedule.slot_at(day, hour) else {
            return false;
        };
        let key = SlotKey { day, index };
        if self.active == Some(key) {
            return false;
        }
        self.active = Some(key);
        true
    }

    /// Resolve from scratch, dropping whatever was active before.
    pub fn reset(&mut self, schedule: &Schedule, day: Weekday, hour: f64) -> Option<SlotKey> {
        self.active = schedule
            .slot_at(day, hour)
            .map(|(index, _)| SlotKey { day, index });
        self.active
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}
