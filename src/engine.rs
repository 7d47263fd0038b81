//! RadioEngine — the receiver orchestrator.
//!
//! Owns every piece of receiver state (clock, tuner, programme, content
//! choice) and the audio output. Driven by two entry points: `tick` from the
//! host loop and `tune` from user input. Both must come from the same logical
//! writer; there is no internal locking.

use crate::arbiter::ContentArbiter;
use crate::clip::Clip;
use crate::clock::{Clock, ClockSource};
use crate::config::EngineConfig;
use crate::error::ConfigurationError;
use crate::noise::{NoiseSource, ValueNoise};
use crate::output::{AudioOutput, Channel};
use crate::scheduler::ProgramScheduler;
use crate::signal::SignalModel;
use crate::station::{ProgramSlot, Roster, Station, StationRegistry};
use crate::status::Status;
use crate::tuner::{TuneOutcome, Tuner};

pub struct RadioEngine<O: AudioOutput> {
    registry: StationRegistry,
    clock: Clock,
    tuner: Tuner,
    signal: SignalModel,
    scheduler: ProgramScheduler,
    arbiter: ContentArbiter,
    output: O,
    tuning_cue: Option<Clip>,
    elapsed: f64,
}

impl<O: AudioOutput> RadioEngine<O> {
    /// Validate the roster and config, sync the clock once from
    /// `clock_source`, and start untuned (main silent, static at full).
    pub fn initialize(
        roster: Roster,
        clock_source: &dyn ClockSource,
        config: EngineConfig,
        mut output: O,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let registry = StationRegistry::new(roster.stations)?;

        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let noise = ValueNoise::new(rng.u64(..));
        let clock = Clock::from_source(clock_source);

        output.set_volume(Channel::Main, 0.0);
        output.set_volume(Channel::Static, config.static_strength);
        if let Some(clip) = &config.static_clip {
            output.play_looped(Channel::Static, clip);
        }

        tracing::info!(
            stations = registry.len(),
            clock = %clock,
            "Radio engine initialized"
        );

        Ok(RadioEngine {
            tuner: Tuner::new(config.tuning_tolerance),
            signal: SignalModel::new(&config, Box::new(noise)),
            scheduler: ProgramScheduler::new(),
            arbiter: ContentArbiter::new(roster.global, rng),
            tuning_cue: config.tuning_cue,
            registry,
            clock,
            output,
            elapsed: 0.0,
        })
    }

    /// Replace the interference noise source.
    pub fn with_noise(mut self, noise: impl NoiseSource + 'static) -> Self {
        self.signal.set_noise(Box::new(noise));
        self
    }

    /// Advance simulated time and re-evaluate reception, programme and content.
    ///
    /// Order is fixed: clock, signal, schedule, content.
    pub fn tick(&mut self, elapsed_secs: f64) {
        let dt = if elapsed_secs.is_finite() && elapsed_secs > 0.0 {
            elapsed_secs
        } else {
            0.0
        };
        self.clock.advance(dt);
        self.elapsed += dt;

        let Some(station) = self.tuner.station().and_then(|idx| self.registry.get(idx)) else {
            return;
        };

        let offset = self.tuner.offset(&self.registry).unwrap_or(f32::INFINITY);
        let quality = self.signal.quality(offset, self.elapsed);
        self.tuner.set_quality(quality);
        self.signal.apply(&mut self.output, quality);

        let day = self.clock.weekday();
        let hour = self.clock.time_of_day();
        if self.scheduler.update(&station.schedule, day, hour) {
            let slot = self.scheduler.active_slot(&station.schedule);
            if let Some(slot) = slot {
                tracing::info!(
                    station = %station.name,
                    program = %slot.name,
                    program_type = %slot.program_type,
                    "Programme change"
                );
            }
            self.arbiter.restart(slot, &mut self.output);
        }

        if !self.output.is_playing() {
            let slot = self.scheduler.active_slot(&station.schedule);
            self.arbiter.continue_playback(slot, station, &mut self.output);
        }
    }

    /// Turn the dial.
    ///
    /// Always plays the tuning cue. Locking a new station cuts current
    /// content, resets quality to 1 and resolves the programme at once.
    /// Losing reception cuts content and leaves only static.
    pub fn tune(&mut self, frequency: f32) {
        if let Some(cue) = &self.tuning_cue {
            self.output.play_one_shot(cue);
        }

        match self.tuner.tune(&self.registry, frequency) {
            TuneOutcome::Unchanged => {}
            TuneOutcome::Activated(idx) => {
                let Some(station) = self.registry.get(idx) else {
                    return;
                };
                tracing::info!(
                    station = %station.name,
                    frequency = %station.frequency_display(),
                    "Tuned"
                );
                self.output.stop();
                self.arbiter.forget();
                self.signal.apply(&mut self.output, self.tuner.quality());

                let day = self.clock.weekday();
                let hour = self.clock.time_of_day();
                self.scheduler.reset(&station.schedule, day, hour);
                let slot = self.scheduler.active_slot(&station.schedule);
                self.arbiter.restart(slot, &mut self.output);
            }
            TuneOutcome::Untuned { previous } => {
                self.signal.apply(&mut self.output, 0.0);
                self.scheduler.clear();
                if let Some(station) = previous.and_then(|idx| self.registry.get(idx)) {
                    tracing::info!(station = %station.name, frequency, "Lost reception");
                    self.output.stop();
                    self.arbiter.forget();
                }
            }
        }
    }

    pub fn active_station(&self) -> Option<&Station> {
        self.tuner.station().and_then(|idx| self.registry.get(idx))
    }

    pub fn signal_quality(&self) -> f32 {
        self.tuner.quality()
    }

    pub fn active_program(&self) -> Option<&ProgramSlot> {
        let station = self.active_station()?;
        self.scheduler.active_slot(&station.schedule)
    }

    /// Dial position as last set by `tune`.
    pub fn frequency(&self) -> f32 {
        self.tuner.frequency()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Simulated seconds since `initialize`.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    /// Clip currently on the main channel, if the output is still playing it.
    pub fn now_playing(&self) -> Option<&Clip> {
        if self.output.is_playing() {
            self.arbiter.last_started()
        } else {
            None
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn status(&self) -> Status {
        Status::from_engine(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::GlobalPools;
    use crate::clip::ContentPool;
    use crate::clock::FixedClock;
    use crate::noise::ConstantNoise;
    use crate::output::{OutputEvent, RecordingOutput};
    use crate::station::{ProgramType, Schedule};
    use chrono::Weekday;

    fn roster() -> Roster {
        let schedule = Schedule::new().with_day(
            Weekday::Mon,
            vec![
                ProgramSlot::new("Breakfast", ProgramType::Music, 6.0, 3.0),
                ProgramSlot::new("Phone-in", ProgramType::TalkShow, 9.0, 3.0)
                    .with_content(ContentPool::new(vec![Clip::new("phone-in-intro.mp3")])),
                ProgramSlot::new("Traffic Watch", ProgramType::Traffic, 12.0, 1.0),
            ],
        );
        let kiss = Station::new("Kiss FM", 100.3)
            .with_music(ContentPool::new(vec![Clip::new("kiss-song.mp3")]))
            .with_schedule(schedule);
        let classic = Station::new("Classic 105", 105.2)
            .with_music(ContentPool::new(vec![Clip::new("classic-song.mp3")]));
        Roster {
            stations: vec![kiss, classic],
            global: GlobalPools::default(),
        }
    }

    fn engine_at(hours: f64) -> RadioEngine<RecordingOutput> {
        let config = EngineConfig {
            seed: Some(3),
            tuning_cue: Some(Clip::new("cue.wav")),
            ..EngineConfig::default()
        };
        RadioEngine::initialize(
            roster(),
            &FixedClock::new(hours, Weekday::Mon),
            config,
            RecordingOutput::new(),
        )
        .unwrap()
        .with_noise(ConstantNoise(0.0))
    }

    #[test]
    fn starts_untuned_with_static() {
        let engine = engine_at(8.0);
        assert!(engine.active_station().is_none());
        assert_eq!(engine.signal_quality(), 0.0);
        assert_eq!(engine.output().volume(Channel::Main), 0.0);
        assert_eq!(engine.output().volume(Channel::Static), 1.0);
    }

    #[test]
    fn initialize_rejects_empty_roster() {
        let result = RadioEngine::initialize(
            Roster::default(),
            &FixedClock::new(0.0, Weekday::Mon),
            EngineConfig::default(),
            RecordingOutput::new(),
        );
        assert!(matches!(result, Err(ConfigurationError::NoStations)));
    }

    #[test]
    fn static_clip_looped_at_startup() {
        let config = EngineConfig {
            static_clip: Some(Clip::new("hiss.wav")),
            ..EngineConfig::default()
        };
        let engine = RadioEngine::initialize(
            roster(),
            &FixedClock::new(0.0, Weekday::Mon),
            config,
            RecordingOutput::new(),
        )
        .unwrap();
        assert_eq!(
            engine.output().events(),
            &[OutputEvent::Loop(Channel::Static, Clip::new("hiss.wav"))]
        );
    }

    #[test]
    fn tune_plays_cue_even_when_nothing_found() {
        let mut engine = engine_at(8.0);
        engine.tune(50.0);
        assert_eq!(
            engine.output().events(),
            &[OutputEvent::OneShot(Clip::new("cue.wav"))]
        );
    }

    #[test]
    fn tune_resolves_program_immediately() {
        let mut engine = engine_at(10.0);
        engine.tune(100.3);
        assert_eq!(engine.active_program().unwrap().name, "Phone-in");
        assert_eq!(engine.now_playing(), Some(&Clip::new("phone-in-intro.mp3")));
    }

    #[test]
    fn tune_without_specific_content_waits_for_tick() {
        let mut engine = engine_at(7.0);
        engine.tune(100.3);
        assert!(engine.output().played().is_empty());
        engine.tick(1.0);
        assert_eq!(engine.output().played(), vec![&Clip::new("kiss-song.mp3")]);
    }

    #[test]
    fn retune_same_station_does_not_replay() {
        let mut engine = engine_at(10.0);
        engine.tune(100.3);
        engine.tune(100.3);
        engine.tune(100.35);
        assert_eq!(engine.output().played().len(), 1);
        let stops = engine
            .output()
            .events()
            .iter()
            .filter(|e| **e == OutputEvent::Stop)
            .count();
        // one on locking the station, one from the restart path
        assert_eq!(stops, 2);
        assert!(engine.output().is_playing());
    }

    #[test]
    fn detune_stops_playback_and_clears_program() {
        let mut engine = engine_at(10.0);
        engine.tune(100.3);
        assert!(engine.output().is_playing());
        engine.tune(90.0);
        assert!(!engine.output().is_playing());
        assert!(engine.active_program().is_none());
        assert_eq!(engine.output().volume(Channel::Main), 0.0);
        assert_eq!(engine.output().volume(Channel::Static), 1.0);
    }

    #[test]
    fn untuned_tick_leaves_output_alone() {
        let mut engine = engine_at(10.0);
        engine.output_mut().clear_events();
        engine.tick(5.0);
        assert!(engine.output().events().is_empty());
        assert_eq!(engine.elapsed(), 5.0);
    }

    #[test]
    fn slot_change_restarts_content() {
        let mut engine = engine_at(8.99);
        engine.tune(100.3);
        engine.tick(0.1);
        assert_eq!(engine.active_program().unwrap().name, "Breakfast");
        engine.output_mut().clear_events();
        // 8.99h + 36s = 9.0h
        engine.tick(36.0);
        assert_eq!(engine.active_program().unwrap().name, "Phone-in");
        assert_eq!(
            engine.output().events(),
            &[
                OutputEvent::Stop,
                OutputEvent::Play(Clip::new("phone-in-intro.mp3"))
            ]
        );
    }

    #[test]
    fn quality_follows_dial_offset() {
        let mut engine = engine_at(8.0);
        engine.tune(100.45);
        assert_eq!(engine.signal_quality(), 1.0);
        engine.tick(1.0);
        // offset 0.15 on the default curve
        assert!((engine.signal_quality() - 0.6).abs() < 1e-3);
        assert!((engine.output().volume(Channel::Main) - 0.6).abs() < 1e-3);
        assert!((engine.output().volume(Channel::Static) - 0.4).abs() < 1e-3);
    }

    #[test]
    fn status_reflects_engine() {
        let mut engine = engine_at(10.0);
        engine.tune(100.3);
        let status = engine.status();
        assert_eq!(status.station.as_deref(), Some("Kiss FM"));
        assert_eq!(status.program.as_deref(), Some("Phone-in"));
        assert!(status.playing);
    }
}
