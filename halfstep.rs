use anyhow::Context;
use clap::Parser;
use halfstep::{
    midi::{self, MidiSound, PortSelector},
    terminal::{TerminalDisplay, TerminalInput},
    Config, KeyBindings, KeyboardInstrument, NoteRange,
};
use std::time::Duration;

/// Play one note at a time on a MIDI synth with the home-row keys.
///
/// a s d f move the note down 4, 3, 2, 1 half steps, j k l ; move it up
/// 1, 2, 3, 4, and space plays it again. Any other key repeats the last
/// move. Esc or Ctrl+C quits.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// MIDI output port, by index or by part of its name
    #[clap(short, long)]
    port: Option<String>,

    /// Print the available MIDI output ports and exit
    #[clap(long)]
    list_ports: bool,

    /// Pin notes to 0..=127 instead of stopping with an error
    #[clap(long)]
    clamp: bool,

    /// Milliseconds to wait for input each frame (at least 1)
    #[clap(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if args.list_ports {
        let names = midi::list_ports()?;
        if names.is_empty() {
            println!("No MIDI output ports found.");
        }
        for (i, name) in names.iter().enumerate() {
            println!("{}: {}", i, name);
        }
        return Ok(());
    }

    let config = Config {
        note_range: if args.clamp {
            NoteRange::Clamp
        } else {
            NoteRange::Reject
        },
        frame: Duration::from_millis(args.frame_ms),
        ..Config::default()
    };

    let selector = args.port.as_deref().map(PortSelector::parse);
    let sound = MidiSound::connect(selector.as_ref()).context("opening MIDI output")?;
    log::info!("Output port: {}", sound.port_name());

    let display = TerminalDisplay::open(&config.title).context("opening terminal")?;
    let mut input = TerminalInput::new(config.frame);
    let mut instrument = KeyboardInstrument::new(sound, display, KeyBindings::home_row(), config);
    instrument.run(&mut input)
}
