use crate::{
    config::Config,
    io::{DisplaySurface, InputEvent, InputSource, SoundOutput},
    keys::{Key, KeyBindings},
};
use anyhow::Context;
use wmidi::Note;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Terminal. Entered at most once; teardown has run by the time it is
    /// observable from outside.
    Stopped,
}

/// The whole instrument: one sounding note, the key table, and the two
/// output devices it drives.
pub struct KeyboardInstrument<S, D> {
    sound: S,
    display: D,
    bindings: KeyBindings,
    config: Config,
    current_note: Note,
    last_key: Option<Key>,
    // True once a note-on has gone out; the initial note is never started.
    sounding: bool,
    state: RunState,
    quit_requested: bool,
}

impl<S: SoundOutput, D: DisplaySurface> KeyboardInstrument<S, D> {
    pub fn new(sound: S, display: D, bindings: KeyBindings, config: Config) -> Self {
        let current_note = config.initial_note;
        Self {
            sound,
            display,
            bindings,
            config,
            current_note,
            last_key: None,
            sounding: false,
            state: RunState::Running,
            quit_requested: false,
        }
    }

    pub fn current_note(&self) -> Note {
        self.current_note
    }

    pub fn last_key(&self) -> Option<Key> {
        self.last_key
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Stops the current note and starts `pitch` on the same channel and
    /// velocity. Out-of-range pitches follow the configured [`NoteRange`];
    /// on error nothing has been sent and the current note is unchanged.
    ///
    /// [`NoteRange`]: crate::config::NoteRange
    pub fn play_note(&mut self, pitch: i32) -> anyhow::Result<()> {
        let note = self.config.note_range.resolve(pitch)?;
        let Config {
            channel, velocity, ..
        } = self.config;
        self.sound
            .note_off(self.current_note, velocity, channel)
            .context("sending note off")?;
        self.sound
            .note_on(note, velocity, channel)
            .context("sending note on")?;
        log::debug!(
            "{} -> {} ({})",
            u8::from(self.current_note),
            u8::from(note),
            note.to_str()
        );
        self.current_note = note;
        self.sounding = true;
        Ok(())
    }

    pub fn handle_key_down(&mut self, key: Key) -> anyhow::Result<()> {
        if let Some(delta) = self.bindings.delta(key) {
            self.play_note(self.pitch_after(delta))?;
            self.last_key = Some(key);
        } else if let Some(last_key) = self.last_key {
            // An unmapped key re-applies the last interval on top of the note
            // that is sounding now, so repeated presses keep climbing.
            if let Some(delta) = self.bindings.delta(last_key) {
                self.play_note(self.pitch_after(delta))?;
            }
        }
        Ok(())
    }

    /// Takes effect at the end of the current loop iteration.
    pub fn handle_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn handle_event(&mut self, event: InputEvent) -> anyhow::Result<()> {
        match event {
            InputEvent::KeyDown(key) => self.handle_key_down(key),
            InputEvent::Quit => {
                self.handle_quit();
                Ok(())
            }
        }
    }

    /// Redraws the whole frame.
    pub fn render(&mut self) -> anyhow::Result<()> {
        let text = format!("Current Note: {}", u8::from(self.current_note));
        self.display.clear(self.config.background)?;
        self.display
            .draw_text(&text, self.config.text_position, self.config.foreground)?;
        self.display.present()?;
        Ok(())
    }

    /// One loop iteration: drain input, apply it in order, draw.
    pub fn step<I: InputSource>(&mut self, input: &mut I) -> anyhow::Result<()> {
        for event in input.poll_events().context("polling input")? {
            self.handle_event(event)?;
        }
        self.render().context("rendering")
    }

    /// Runs until a quit signal or the first error, then tears down. Calling
    /// this again after the instrument has stopped does nothing.
    pub fn run<I: InputSource>(&mut self, input: &mut I) -> anyhow::Result<()> {
        if self.state == RunState::Stopped {
            return Ok(());
        }
        let result = self.run_loop(input);
        match (result, self.stop()) {
            (Ok(()), teardown) => teardown,
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(teardown_error)) => {
                log::warn!("teardown after error also failed: {:#}", teardown_error);
                Err(e)
            }
        }
    }

    fn run_loop<I: InputSource>(&mut self, input: &mut I) -> anyhow::Result<()> {
        while !self.quit_requested {
            self.step(input)?;
        }
        Ok(())
    }

    /// RUNNING -> STOPPED. Silences the sounding note, then releases the sound
    /// backend and the display. Every release is attempted even if an earlier
    /// one fails; the first failure is returned.
    fn stop(&mut self) -> anyhow::Result<()> {
        if self.state == RunState::Stopped {
            return Ok(());
        }
        self.state = RunState::Stopped;
        log::info!("stopping at note {}", u8::from(self.current_note));
        let mut first_error = None;
        if self.sounding {
            let Config {
                channel, velocity, ..
            } = self.config;
            if let Err(e) = self.sound.note_off(self.current_note, velocity, channel) {
                first_error.get_or_insert(e.context("silencing final note"));
            }
            self.sounding = false;
        }
        if let Err(e) = self.sound.close() {
            first_error.get_or_insert(e.context("closing sound output"));
        }
        if let Err(e) = self.display.close() {
            first_error.get_or_insert(e.context("closing display"));
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn pitch_after(&self, delta: i8) -> i32 {
        i32::from(u8::from(self.current_note)) + i32::from(delta)
    }
}
