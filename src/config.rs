use crate::io::{Position, Rgb};
use std::time::Duration;
use wmidi::{Channel, Note, Velocity, U7};

/// What to do when a key would move the note outside 0..=127.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteRange {
    /// Fail before anything is sent; the note stays where it was.
    #[default]
    Reject,
    /// Pin the note to the nearest valid value and play that.
    Clamp,
}

impl NoteRange {
    /// Turns an arbitrary pitch into a playable note, or explains why it
    /// can't.
    pub fn resolve(self, pitch: i32) -> anyhow::Result<Note> {
        let pitch = match self {
            NoteRange::Reject => pitch,
            NoteRange::Clamp => pitch.clamp(0, 127),
        };
        u8::try_from(pitch)
            .ok()
            .and_then(|p| Note::try_from(p).ok())
            .ok_or_else(|| anyhow::anyhow!("note {} is outside the MIDI range 0..=127", pitch))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub channel: Channel,
    pub velocity: Velocity,
    pub initial_note: Note,
    pub note_range: NoteRange,
    pub title: String,
    pub background: Rgb,
    pub foreground: Rgb,
    pub text_position: Position,
    /// Longest time a single loop iteration waits for input.
    pub frame: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: Channel::Ch1,
            velocity: U7::from_u8_lossy(127),
            initial_note: Note::C4,
            note_range: NoteRange::Reject,
            title: "Musical Keyboard Game".to_string(),
            background: Rgb::WHITE,
            foreground: Rgb::BLACK,
            text_position: Position { x: 5, y: 4 },
            frame: Duration::from_millis(16),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.channel.index(), 0);
        assert_eq!(u8::from(config.velocity), 127);
        assert_eq!(u8::from(config.initial_note), 60);
        assert_eq!(config.note_range, NoteRange::Reject);
    }

    #[test]
    fn reject_keeps_in_range_pitches() {
        assert_eq!(u8::from(NoteRange::Reject.resolve(0).unwrap()), 0);
        assert_eq!(u8::from(NoteRange::Reject.resolve(127).unwrap()), 127);
        assert!(NoteRange::Reject.resolve(-1).is_err());
        assert!(NoteRange::Reject.resolve(128).is_err());
    }

    #[test]
    fn clamp_pins_to_the_edges() {
        assert_eq!(u8::from(NoteRange::Clamp.resolve(-3).unwrap()), 0);
        assert_eq!(u8::from(NoteRange::Clamp.resolve(131).unwrap()), 127);
        assert_eq!(u8::from(NoteRange::Clamp.resolve(64).unwrap()), 64);
    }
}
