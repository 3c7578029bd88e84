//! A one-note keyboard instrument. Home-row keys move the sounding note up or
//! down by a few half steps; the note is sent to a MIDI output port and the
//! current value is shown in the terminal.

pub mod config;
pub mod instrument;
pub mod io;
pub mod keys;
pub mod midi;
pub mod terminal;

pub use config::{Config, NoteRange};
pub use instrument::{KeyboardInstrument, RunState};
pub use io::{DisplaySurface, InputEvent, InputSource, Position, Rgb, SoundOutput};
pub use keys::{Key, KeyBindings};
