//! Audio output seam. The engine decides what plays and how loud; an
//! `AudioOutput` does the actual decoding and mixing.

use crate::clip::Clip;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Mixer channels the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Programme audio.
    Main,
    /// Reception static bed.
    Static,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Main => write!(f, "main"),
            Channel::Static => write!(f, "static"),
        }
    }
}

/// Playback capability consumed by the engine.
///
/// Calls never fail from the engine's point of view: an implementation that
/// cannot play a clip logs it and carries on, leaving `is_playing` false.
pub trait AudioOutput {
    /// Fire-and-forget cue mixed over whatever is playing.
    fn play_one_shot(&mut self, clip: &Clip);
    /// Replace the main channel's content with `clip`.
    fn play(&mut self, clip: &Clip);
    /// Halt main channel content immediately.
    fn stop(&mut self);
    /// True while main channel content is still playing.
    fn is_playing(&self) -> bool;
    fn set_volume(&mut self, channel: Channel, level: f32);
    /// Loop `clip` on a channel until stopped.
    fn play_looped(&mut self, channel: Channel, clip: &Clip);
}

// ── Rodio backend ────────────────────────────────────────────────────────────

/// Speaker output via rodio. Not `Send`; keep it on the thread that drives ticks.
pub struct RodioOutput {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    main: Sink,
    static_bed: Sink,
    one_shots: Vec<Sink>,
    main_volume: f32,
}

impl RodioOutput {
    /// Open the default audio device.
    pub fn new() -> Result<Self, String> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| format!("Failed to open audio output: {}", e))?;
        let main = Sink::try_new(&handle)
            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
        let static_bed = Sink::try_new(&handle)
            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
        Ok(RodioOutput {
            _stream: stream,
            stream_handle: handle,
            main,
            static_bed,
            one_shots: Vec::new(),
            main_volume: 1.0,
        })
    }

    fn create_sink(&self) -> Result<Sink, String> {
        Sink::try_new(&self.stream_handle).map_err(|e| format!("Failed to create sink: {}", e))
    }

    fn open(path: &Path) -> Result<BufReader<File>, String> {
        File::open(path)
            .map(BufReader::new)
            .map_err(|e| format!("Cannot open '{}': {}", path.display(), e))
    }

    fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, String> {
        Decoder::new(Self::open(path)?)
            .map_err(|e| format!("Cannot decode '{}': {}", path.display(), e))
    }

    fn start_main(&mut self, clip: &Clip) -> Result<(), String> {
        let source = Self::decode(clip.path())?;
        let sink = self.create_sink()?;
        sink.set_volume(self.main_volume);
        sink.append(source);
        sink.play();
        let old = std::mem::replace(&mut self.main, sink);
        old.stop();
        Ok(())
    }

    fn start_one_shot(&mut self, clip: &Clip) -> Result<(), String> {
        let source = Self::decode(clip.path())?;
        let sink = self.create_sink()?;
        sink.append(source);
        sink.play();
        self.one_shots.retain(|s| !s.empty());
        self.one_shots.push(sink);
        Ok(())
    }

    fn start_looped(&mut self, channel: Channel, clip: &Clip) -> Result<(), String> {
        let path = clip.path();
        let source = Decoder::new_looped(Self::open(path)?)
            .map_err(|e| format!("Cannot decode '{}': {}", path.display(), e))?;
        let sink = match channel {
            Channel::Main => &self.main,
            Channel::Static => &self.static_bed,
        };
        sink.append(source);
        sink.play();
        Ok(())
    }
}

impl AudioOutput for RodioOutput {
    fn play_one_shot(&mut self, clip: &Clip) {
        if let Err(e) = self.start_one_shot(clip) {
            tracing::warn!("One-shot failed: {}", e);
        }
    }

    fn play(&mut self, clip: &Clip) {
        if let Err(e) = self.start_main(clip) {
            tracing::warn!("Playback failed: {}", e);
            self.main.stop();
        }
    }

    fn stop(&mut self) {
        self.main.stop();
    }

    fn is_playing(&self) -> bool {
        !self.main.empty()
    }

    fn set_volume(&mut self, channel: Channel, level: f32) {
        match channel {
            Channel::Main => {
                self.main_volume = level;
                self.main.set_volume(level);
            }
            Channel::Static => self.static_bed.set_volume(level),
        }
    }

    fn play_looped(&mut self, channel: Channel, clip: &Clip) {
        if let Err(e) = self.start_looped(channel, clip) {
            tracing::warn!("Loop on {} channel failed: {}", channel, e);
        }
    }
}

// ── Recording backend ────────────────────────────────────────────────────────

/// Something the engine asked the output to do.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    OneShot(Clip),
    Play(Clip),
    Stop,
    Loop(Channel, Clip),
}

/// Output that plays nothing and remembers every request.
///
/// Content "plays" until `finish` is called, which stands in for a clip
/// reaching its natural end. Used for headless runs and tests.
#[derive(Debug, Clone)]
pub struct RecordingOutput {
    events: Vec<OutputEvent>,
    current: Option<Clip>,
    main_volume: f32,
    static_volume: f32,
}

impl RecordingOutput {
    pub fn new() -> Self {
        RecordingOutput {
            events: Vec::new(),
            current: None,
            main_volume: 1.0,
            static_volume: 1.0,
        }
    }

    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Clips started on the main channel, in order.
    pub fn played(&self) -> Vec<&Clip> {
        self.events
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Play(clip) => Some(clip),
                _ => None,
            })
            .collect()
    }

    pub fn current(&self) -> Option<&Clip> {
        self.current.as_ref()
    }

    /// Simulate the current clip reaching its end.
    pub fn finish(&mut self) {
        self.current = None;
    }

    pub fn volume(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Main => self.main_volume,
            Channel::Static => self.static_volume,
        }
    }
}

impl Default for RecordingOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for RecordingOutput {
    fn play_one_shot(&mut self, clip: &Clip) {
        self.events.push(OutputEvent::OneShot(clip.clone()));
    }

    fn play(&mut self, clip: &Clip) {
        self.current = Some(clip.clone());
        self.events.push(OutputEvent::Play(clip.clone()));
    }

    fn stop(&mut self) {
        self.current = None;
        self.events.push(OutputEvent::Stop);
    }

    fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    fn set_volume(&mut self, channel: Channel, level: f32) {
        match channel {
            Channel::Main => self.main_volume = level,
            Channel::Static => self.static_volume = level,
        }
    }

    fn play_looped(&mut self, channel: Channel, clip: &Clip) {
        self.events.push(OutputEvent::Loop(channel, clip.clone()));
    }
}
