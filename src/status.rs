use crate::engine::RadioEngine;
use crate::output::AudioOutput;
use crate::station::ProgramType;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Snapshot of what the receiver is doing, for display and now-playing export.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub weekday: String,
    pub time: String,
    pub frequency: f32,
    pub station: Option<String>,
    pub signal_quality: f32,
    pub program: Option<String>,
    pub program_type: Option<ProgramType>,
    pub language: Option<String>,
    pub now_playing: Option<String>,
    pub playing: bool,
}

impl Status {
    pub fn from_engine<O: AudioOutput>(engine: &RadioEngine<O>) -> Self {
        let program = engine.active_program();
        Status {
            weekday: engine.clock().weekday().to_string(),
            time: engine.clock().time_display(),
            frequency: engine.frequency(),
            station: engine.active_station().map(|s| s.name.clone()),
            signal_quality: engine.signal_quality(),
            program: program.map(|p| p.name.clone()),
            program_type: program.map(|p| p.program_type),
            language: program
                .map(|p| p.language.clone())
                .filter(|lang| !lang.is_empty()),
            now_playing: engine.now_playing().map(|c| c.display_name()),
            playing: engine.output().is_playing(),
        }
    }

    /// Render as a now-playing XML document.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<nowplaying>\n");
        xml.push_str(&format!(
            "  <state>{}</state>\n",
            if self.playing { "playing" } else { "stopped" }
        ));
        xml.push_str(&format!("  <frequency>{:.1}</frequency>\n", self.frequency));
        xml.push_str(&format!(
            "  <station>{}</station>\n",
            xml_escape(self.station.as_deref().unwrap_or(""))
        ));
        xml.push_str(&format!("  <signal>{:.2}</signal>\n", self.signal_quality));
        xml.push_str("  <program>\n");
        xml.push_str(&format!(
            "    <name>{}</name>\n",
            xml_escape(self.program.as_deref().unwrap_or(""))
        ));
        xml.push_str(&format!(
            "    <type>{}</type>\n",
            self.program_type.map(|t| t.to_string()).unwrap_or_default()
        ));
        xml.push_str(&format!(
            "    <language>{}</language>\n",
            xml_escape(self.language.as_deref().unwrap_or(""))
        ));
        xml.push_str("  </program>\n");
        xml.push_str(&format!(
            "  <title>{}</title>\n",
            xml_escape(self.now_playing.as_deref().unwrap_or(""))
        ));
        xml.push_str("</nowplaying>\n");
        xml
    }

    /// Write the snapshot to `path`: XML for `.xml` files, JSON otherwise.
    pub fn write_to(&self, path: &Path) -> Result<(), String> {
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        let body = if is_xml {
            self.to_xml()
        } else {
            serde_json::to_string_pretty(self).map_err(|e| format!("Serialize error: {}", e))?
        };
        fs::write(path, body)
            .map_err(|e| format!("Failed to write status to '{}': {}", path.display(), e))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {:.1} ", self.weekday, self.time, self.frequency)?;
        match &self.station {
            Some(station) => write!(
                f,
                "{} (signal {:.0}%)",
                station,
                self.signal_quality * 100.0
            )?,
            None => write!(f, "-- static --")?,
        }
        if let Some(program) = &self.program {
            write!(f, " | {}", program)?;
            if let Some(t) = self.program_type {
                write!(f, " [{}]", t)?;
            }
        }
        if let Some(title) = &self.now_playing {
            write!(f, " | ♪ {}", title)?;
        }
        Ok(())
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
