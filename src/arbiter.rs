use crate::clip::{Clip, ContentPool};
use crate::output::AudioOutput;
use crate::station::{ProgramSlot, ProgramType, Station};
use serde::{Deserialize, Serialize};

/// Network-wide content shared by every station.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalPools {
    #[serde(default)]
    pub news: ContentPool,
    #[serde(default)]
    pub traffic: ContentPool,
    #[serde(default)]
    pub weather: ContentPool,
}

impl GlobalPools {
    /// Pool that category content comes from for a program type.
    /// Anything without a dedicated pool falls back to the station's music.
    pub fn pool_for<'a>(
        &'a self,
        program_type: Option<ProgramType>,
        station: &'a Station,
    ) -> &'a ContentPool {
        match program_type {
            Some(ProgramType::News) => &self.news,
            Some(ProgramType::Traffic) => &self.traffic,
            Some(ProgramType::Weather) => &self.weather,
            Some(ProgramType::Music)
            | Some(ProgramType::TalkShow)
            | Some(ProgramType::Religious)
            | Some(ProgramType::Sports)
            | None => &station.pools.music,
        }
    }
}

/// Decides which clip goes on air.
///
/// Two triggers: a slot coming on air (restart) and the output running dry
/// (continuation). Picks are uniform over the resolved pool.
pub struct ContentArbiter {
    global: GlobalPools,
    rng: fastrand::Rng,
    last_started: Option<Clip>,
}

impl ContentArbiter {
    pub fn new(global: GlobalPools, rng: fastrand::Rng) -> Self {
        ContentArbiter {
            global,
            rng,
            last_started: None,
        }
    }

    pub fn global(&self) -> &GlobalPools {
        &self.global
    }

    /// The most recent clip this arbiter put on the main channel.
    pub fn last_started(&self) -> Option<&Clip> {
        self.last_started.as_ref()
    }

    pub fn forget(&mut self) {
        self.last_started = None;
    }

    /// Slot just came on air. Cuts straight to its own content if it has
    /// any; otherwise leaves the current clip to run out.
    pub fn restart(&mut self, slot: Option<&ProgramSlot>, output: &mut dyn AudioOutput) -> bool {
        let Some(slot) = slot else {
            return false;
        };
        let Some(clip) = slot.content.pick(&mut self.rng).cloned() else {
            return false;
        };
        tracing::debug!(program = %slot.name, clip = %clip, "Starting programme content");
        output.stop();
        output.play(&clip);
        self.last_started = Some(clip);
        true
    }

    /// Output ran dry. Start category content for the slot's program type.
    /// An empty pool leaves the channel silent until the next check.
    pub fn continue_playback(
        &mut self,
        slot: Option<&ProgramSlot>,
        station: &Station,
        output: &mut dyn AudioOutput,
    ) -> bool {
        let program_type = slot.map(|s| s.program_type);
        let pool = self.global.pool_for(program_type, station);
        let Some(clip) = pool.pick(&mut self.rng).cloned() else {
            tracing::debug!(
                station = %station.name,
                program_type = ?program_type,
                "No content available, channel stays silent"
            );
            return false;
        };
        tracing::debug!(station = %station.name, clip = %clip, "Continuing with category content");
        output.play(&clip);
        self.last_started = Some(clip);
        true
    }
}
