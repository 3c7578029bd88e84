//! Capability interfaces between the instrument and the outside world. The
//! instrument only ever talks to these traits, so tests can swap in fakes for
//! the MIDI port and the terminal.

use crate::keys::Key;
use wmidi::{Channel, Note, Velocity};

/// Something that can start and stop notes.
pub trait SoundOutput {
    fn note_on(&mut self, note: Note, velocity: Velocity, channel: Channel) -> anyhow::Result<()>;

    fn note_off(&mut self, note: Note, velocity: Velocity, channel: Channel)
        -> anyhow::Result<()>;

    /// Release the backend. Called once, when the instrument stops.
    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Self = Self(255, 255, 255);
    pub const BLACK: Self = Self(0, 0, 0);
}

/// Location on the display surface, in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

/// A surface that is fully redrawn every frame.
pub trait DisplaySurface {
    fn clear(&mut self, color: Rgb) -> anyhow::Result<()>;

    fn draw_text(&mut self, text: &str, position: Position, color: Rgb) -> anyhow::Result<()>;

    fn present(&mut self) -> anyhow::Result<()>;

    /// Release the surface. Called once, when the instrument stops.
    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    Quit,
}

/// Produces the input events that arrived since the last call. Each call
/// returns a finite batch in queue order and must not block indefinitely.
pub trait InputSource {
    fn poll_events(&mut self) -> anyhow::Result<Vec<InputEvent>>;
}
