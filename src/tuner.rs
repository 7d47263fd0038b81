use crate::station::StationRegistry;

/// What a dial change did to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuneOutcome {
    /// The nearest station was already active.
    Unchanged,
    /// A different station (registry index) is now active.
    Activated(usize),
    /// No station within tolerance. `previous` is the station that was lost, if any.
    Untuned { previous: Option<usize> },
}

/// Dial position, locked station and current reception quality.
#[derive(Debug, Clone)]
pub struct Tuner {
    frequency: f32,
    station: Option<usize>,
    quality: f32,
    tolerance: f32,
}

impl Tuner {
    pub fn new(tolerance: f32) -> Self {
        Tuner {
            frequency: 0.0,
            station: None,
            quality: 0.0,
            tolerance,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn station(&self) -> Option<usize> {
        self.station
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn set_quality(&mut self, quality: f32) {
        self.quality = quality.clamp(0.0, 1.0);
    }

    /// Index and distance of the station closest to `frequency`.
    /// Ties go to the earliest station in registry order.
    pub fn nearest(registry: &StationRegistry, frequency: f32) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, station) in registry.stations().iter().enumerate() {
            let diff = (station.frequency - frequency).abs();
            match best {
                Some((_, best_diff)) if diff >= best_diff => {}
                _ => best = Some((idx, diff)),
            }
        }
        best
    }

    /// Move the dial and lock onto the nearest station within tolerance.
    ///
    /// Locking a new station resets quality to 1; losing reception forces it to 0.
    pub fn tune(&mut self, registry: &StationRegistry, frequency: f32) -> TuneOutcome {
        self.frequency = frequency;
        match Self::nearest(registry, frequency) {
            Some((idx, diff)) if diff < self.tolerance => {
                if self.station == Some(idx) {
                    TuneOutcome::Unchanged
                } else {
                    self.station = Some(idx);
                    self.quality = 1.0;
                    TuneOutcome::Activated(idx)
                }
            }
            _ => {
                let previous = self.station.take();
                self.quality = 0.0;
                TuneOutcome::Untuned { previous }
            }
        }
    }

    /// Absolute distance between the dial and the locked station.
    pub fn offset(&self, registry: &StationRegistry) -> Option<f32> {
        let station = registry.get(self.station?)?;
        Some((self.frequency - station.frequency).abs())
    }
}
