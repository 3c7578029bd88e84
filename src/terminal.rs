use crate::{
    io::{DisplaySurface, InputEvent, InputSource, Position, Rgb},
    keys::Key,
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use std::{
    io::{self, Stdout, Write},
    time::Duration,
};

fn color(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}

/// The controlling terminal used as a drawing surface. Raw mode and the
/// alternate screen are held from `open` until `close` or drop.
pub struct TerminalDisplay {
    out: Stdout,
    background: Rgb,
    active: bool,
}

impl TerminalDisplay {
    pub fn open(title: &str) -> anyhow::Result<Self> {
        let mut out = io::stdout();
        enable_raw_mode()?;
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide, SetTitle(title)) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        log::info!("terminal display open");
        Ok(Self {
            out,
            background: Rgb::WHITE,
            active: true,
        })
    }

    fn restore(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let screen = execute!(self.out, ResetColor, Show, LeaveAlternateScreen);
        disable_raw_mode()?;
        screen?;
        Ok(())
    }
}

impl DisplaySurface for TerminalDisplay {
    fn clear(&mut self, background: Rgb) -> anyhow::Result<()> {
        self.background = background;
        queue!(
            self.out,
            SetBackgroundColor(color(background)),
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    fn draw_text(&mut self, text: &str, position: Position, foreground: Rgb) -> anyhow::Result<()> {
        queue!(
            self.out,
            MoveTo(position.x, position.y),
            SetBackgroundColor(color(self.background)),
            SetForegroundColor(color(foreground)),
            Print(text)
        )?;
        Ok(())
    }

    fn present(&mut self) -> anyhow::Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.restore()?;
        log::info!("terminal display closed");
        Ok(())
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::warn!("failed to restore terminal: {}", e);
        }
    }
}

const MIN_FRAME: Duration = Duration::from_millis(1);

/// Keyboard input from the terminal. Each poll waits at most one frame for
/// the first event, then drains whatever else is already queued.
pub struct TerminalInput {
    frame: Duration,
}

impl TerminalInput {
    /// Frames shorter than a millisecond are raised to one so the loop never
    /// spins without waiting.
    pub fn new(frame: Duration) -> Self {
        Self {
            frame: frame.max(MIN_FRAME),
        }
    }
}

impl InputSource for TerminalInput {
    fn poll_events(&mut self) -> anyhow::Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        let mut timeout = self.frame;
        while event::poll(timeout)? {
            if let Some(event) = translate(event::read()?) {
                events.push(event);
            }
            timeout = Duration::ZERO;
        }
        Ok(events)
    }
}

fn translate(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key_event) => translate_key(key_event),
        _ => None,
    }
}

/// Presses and auto-repeats are key-downs; releases are dropped. `Esc` and
/// `Ctrl+C` quit, since raw mode swallows the interrupt signal.
fn translate_key(event: KeyEvent) -> Option<InputEvent> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    if event.code == KeyCode::Esc
        || (event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL))
    {
        return Some(InputEvent::Quit);
    }
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::F(n) => Key::Function(n),
        _ => Key::Other,
    };
    Some(InputEvent::KeyDown(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        key(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test]
    fn characters_become_key_downs() {
        assert_eq!(
            translate_key(press(KeyCode::Char('j'))),
            Some(InputEvent::KeyDown(Key::Char('j')))
        );
        assert_eq!(
            translate_key(press(KeyCode::Char(' '))),
            Some(InputEvent::KeyDown(Key::Char(' ')))
        );
        assert_eq!(
            translate_key(press(KeyCode::Home)),
            Some(InputEvent::KeyDown(Key::Other))
        );
    }

    #[test]
    fn repeats_count_and_releases_do_not() {
        assert_eq!(
            translate_key(key(
                KeyCode::Char(';'),
                KeyModifiers::NONE,
                KeyEventKind::Repeat
            )),
            Some(InputEvent::KeyDown(Key::Char(';')))
        );
        assert_eq!(
            translate_key(key(
                KeyCode::Char(';'),
                KeyModifiers::NONE,
                KeyEventKind::Release
            )),
            None
        );
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        assert_eq!(translate_key(press(KeyCode::Esc)), Some(InputEvent::Quit));
        assert_eq!(
            translate_key(key(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
                KeyEventKind::Press
            )),
            Some(InputEvent::Quit)
        );
        assert_eq!(
            translate_key(press(KeyCode::Char('c'))),
            Some(InputEvent::KeyDown(Key::Char('c')))
        );
    }

    #[test]
    fn zero_frame_still_waits() {
        assert_eq!(TerminalInput::new(Duration::ZERO).frame, MIN_FRAME);
        assert_eq!(
            TerminalInput::new(Duration::from_millis(16)).frame,
            Duration::from_millis(16)
        );
    }

    #[test]
    fn non_key_events_are_ignored() {
        assert_eq!(translate(Event::Resize(80, 24)), None);
        assert_eq!(translate(Event::FocusGained), None);
    }
}
