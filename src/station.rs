use crate::arbiter::GlobalPools;
use crate::clip::ContentPool;
use crate::clock::format_hours;
use crate::error::ConfigurationError;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Kind of programme a slot carries. Drives category content selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    Music,
    News,
    TalkShow,
    Religious,
    Sports,
    Traffic,
    Weather,
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramType::Music => write!(f, "music"),
            ProgramType::News => write!(f, "news"),
            ProgramType::TalkShow => write!(f, "talk-show"),
            ProgramType::Religious => write!(f, "religious"),
            ProgramType::Sports => write!(f, "sports"),
            ProgramType::Traffic => write!(f, "traffic"),
            ProgramType::Weather => write!(f, "weather"),
        }
    }
}

impl ProgramType {
    /// Parse a program type (case-insensitive, accepts hyphens or underscores).
    pub fn from_str_loose(s: &str) -> Result<Self, String> {
        match s.to_lowercase().replace(['_', ' '], "-").as_str() {
            "music" => Ok(ProgramType::Music),
            "news" => Ok(ProgramType::News),
            "talk-show" | "talkshow" | "talk" => Ok(ProgramType::TalkShow),
            "religious" => Ok(ProgramType::Religious),
            "sports" | "sport" => Ok(ProgramType::Sports),
            "traffic" => Ok(ProgramType::Traffic),
            "weather" => Ok(ProgramType::Weather),
            _ => Err(format!(
                "Unknown program type '{}'. Expected: music, news, talk-show, religious, sports, traffic, weather",
                s
            )),
        }
    }
}

/// A station's content libraries, one pool per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentPools {
    #[serde(default)]
    pub music: ContentPool,
    #[serde(default)]
    pub jingles: ContentPool,
    #[serde(default)]
    pub news: ContentPool,
    #[serde(default)]
    pub ads: ContentPool,
    #[serde(default)]
    pub presenters: ContentPool,
}

/// A scheduled programme occupying `[start, start + duration)` hours of a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSlot {
    pub name: String,
    /// Start hour, fractional, `0 <= start < 24`.
    pub start: f64,
    /// Length in hours, `> 0`.
    pub duration: f64,
    #[serde(rename = "type")]
    pub program_type: ProgramType,
    #[serde(default)]
    pub language: String,
    /// Programme-specific content, played when the slot begins.
    #[serde(default, skip_serializing_if = "ContentPool::is_empty")]
    pub content: ContentPool,
}

impl ProgramSlot {
    pub fn new(name: impl Into<String>, program_type: ProgramType, start: f64, duration: f64) -> Self {
        ProgramSlot {
            name: name.into(),
            start,
            duration,
            program_type,
            language: String::new(),
            content: ContentPool::default(),
        }
    }

    pub fn with_content(mut self, content: ContentPool) -> Self {
        self.content = content;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// True when `hour` falls in `[start, start + duration)`.
    pub fn contains(&self, hour: f64) -> bool {
        self.start <= hour && hour < self.end()
    }

    fn overlaps(&self, other: &ProgramSlot) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Format the slot's time range as HH:MM-HH:MM.
    pub fn time_display(&self) -> String {
        format!("{}-{}", format_hours(self.start), format_hours(self.end()))
    }
}

/// Weekly programme plan. A weekday with no entry has no schedule at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    days: HashMap<Weekday, Vec<ProgramSlot>>,
}

impl Schedule {
    pub fn new() -> Self {
        Schedule::default()
    }

    /// Set the ordered slot list for a weekday, replacing any previous entry.
    pub fn set_day(&mut self, day: Weekday, slots: Vec<ProgramSlot>) {
        self.days.insert(day, slots);
    }

    pub fn with_day(mut self, day: Weekday, slots: Vec<ProgramSlot>) -> Self {
        self.set_day(day, slots);
        self
    }

    pub fn day(&self, day: Weekday) -> Option<&[ProgramSlot]> {
        self.days.get(&day).map(|slots| slots.as_slice())
    }

    pub fn slot(&self, day: Weekday, index: usize) -> Option<&ProgramSlot> {
        self.days.get(&day).and_then(|slots| slots.get(index))
    }

    /// First slot in list order covering `hour` on `day`, with its index.
    /// Later slots that overlap an earlier match are never returned.
    pub fn slot_at(&self, day: Weekday, hour: f64) -> Option<(usize, &ProgramSlot)> {
        self.day(day)?
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.contains(hour))
    }

    /// Pairs of slot indices on `day` whose time ranges intersect.
    pub fn overlaps(&self, day: Weekday) -> Vec<(usize, usize)> {
        let Some(slots) = self.day(day) else {
            return Vec::new();
        };
        let mut pairs = Vec::new();
        for (i, a) in slots.iter().enumerate() {
            for (j, b) in slots.iter().enumerate().skip(i + 1) {
                if a.overlaps(b) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn validate(&self, station: &str) -> Result<(), ConfigurationError> {
        for day in WEEK {
            let Some(slots) = self.day(day) else {
                continue;
            };
            for slot in slots {
                if !slot.start.is_finite() || !(0.0..24.0).contains(&slot.start) {
                    return Err(ConfigurationError::InvalidSlotStart {
                        station: station.to_string(),
                        day,
                        program: slot.name.clone(),
                        start: slot.start,
                    });
                }
                if !slot.duration.is_finite() || slot.duration <= 0.0 {
                    return Err(ConfigurationError::InvalidSlotDuration {
                        station: station.to_string(),
                        day,
                        program: slot.name.clone(),
                        duration: slot.duration,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A broadcaster on a fixed frequency with its libraries and weekly plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub frequency: f32,
    #[serde(default)]
    pub pools: ContentPools,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub schedule: Schedule,
}

impl Station {
    pub fn new(name: impl Into<String>, frequency: f32) -> Self {
        Station {
            name: name.into(),
            frequency,
            pools: ContentPools::default(),
            languages: Vec::new(),
            schedule: Schedule::default(),
        }
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_music(mut self, music: ContentPool) -> Self {
        self.pools.music = music;
        self
    }

    /// Format the frequency for display, e.g. "100.3".
    pub fn frequency_display(&self) -> String {
        format!("{:.1}", self.frequency)
    }
}

/// Immutable catalogue of stations in registry order.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: Vec<Station>,
}

impl StationRegistry {
    /// Validate and take ownership of a station list.
    ///
    /// Overlapping slots on the same day are accepted; resolution stays
    /// first-match-in-order and the overlap is logged.
    pub fn new(stations: Vec<Station>) -> Result<Self, ConfigurationError> {
        if stations.is_empty() {
            return Err(ConfigurationError::NoStations);
        }
        for station in &stations {
            if !station.frequency.is_finite() || station.frequency <= 0.0 {
                return Err(ConfigurationError::InvalidFrequency {
                    station: station.name.clone(),
                    frequency: station.frequency,
                });
            }
            station.schedule.validate(&station.name)?;
            for day in WEEK {
                for (i, j) in station.schedule.overlaps(day) {
                    tracing::warn!(
                        station = %station.name,
                        day = %day,
                        "Slots {} and {} overlap; slot {} wins where both apply",
                        i,
                        j,
                        i
                    );
                }
            }
        }
        Ok(StationRegistry { stations })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn get(&self, index: usize) -> Option<&Station> {
        self.stations.get(index)
    }

    /// Find a station by name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&Station> {
        self.stations
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// Everything a receiver can pick up: the stations and the network-wide
/// news, traffic and weather pools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub stations: Vec<Station>,
    #[serde(flatten)]
    pub global: GlobalPools,
}

impl Roster {
    pub fn new(stations: Vec<Station>) -> Self {
        Roster {
            stations,
            global: GlobalPools::default(),
        }
    }

    /// Parse a roster from a JSON file. Semantic validation happens when the
    /// engine is initialized.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigurationError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
