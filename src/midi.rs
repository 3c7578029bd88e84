use crate::io::SoundOutput;
use anyhow::{anyhow, Context};
use midir::{MidiOutput, MidiOutputConnection, MidiOutputPort};
use std::io::{stdin, stdout, Write};
use wmidi::{Channel, MidiMessage, Note, Velocity};

const CLIENT_NAME: &str = "halfstep";

/// How the user asked for an output port on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelector {
    Index(usize),
    /// Case-insensitive substring of the port name.
    Name(String),
}

impl PortSelector {
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<usize>() {
            Ok(i) => Self::Index(i),
            Err(_) => Self::Name(s.trim().to_string()),
        }
    }

    fn pick(&self, names: &[String]) -> anyhow::Result<usize> {
        match self {
            Self::Index(i) if *i < names.len() => Ok(*i),
            Self::Index(i) => Err(anyhow!(
                "no output port {} (found {} ports)",
                i,
                names.len()
            )),
            Self::Name(name) if name.is_empty() => Err(anyhow!("no output port selected")),
            Self::Name(name) => {
                let needle = name.to_lowercase();
                names
                    .iter()
                    .position(|n| n.to_lowercase().contains(&needle))
                    .ok_or_else(|| anyhow!("no output port matching {:?}", name))
            }
        }
    }
}

fn new_output() -> anyhow::Result<MidiOutput> {
    MidiOutput::new(CLIENT_NAME).map_err(|e| anyhow!("{}", e))
}

fn port_names(midi_out: &MidiOutput, ports: &[MidiOutputPort]) -> anyhow::Result<Vec<String>> {
    ports
        .iter()
        .map(|p| midi_out.port_name(p).map_err(|e| anyhow!("{}", e)))
        .collect()
}

/// Names of the available output ports, in index order.
pub fn list_ports() -> anyhow::Result<Vec<String>> {
    let midi_out = new_output()?;
    port_names(&midi_out, &midi_out.ports())
}

/// Encodes a message into its wire bytes.
pub fn encode(message: &MidiMessage) -> anyhow::Result<Vec<u8>> {
    let mut bytes = vec![0_u8; message.bytes_size()];
    message
        .copy_to_slice(&mut bytes)
        .map_err(|e| anyhow!("encoding {:?}: {:?}", message, e))?;
    Ok(bytes)
}

/// A connection to one MIDI output port.
pub struct MidiSound {
    port_name: String,
    connection: Option<MidiOutputConnection>,
}

impl MidiSound {
    /// Connects to an output port. With no selector: zero ports is an error,
    /// a single port is used as is, and with several the user is asked on
    /// stdin.
    pub fn connect(selector: Option<&PortSelector>) -> anyhow::Result<Self> {
        let midi_out = new_output()?;
        let ports = midi_out.ports();
        let names = port_names(&midi_out, &ports)?;
        let index = match (selector, names.len()) {
            (Some(selector), _) => selector.pick(&names)?,
            (None, 0) => anyhow::bail!("no MIDI output port found"),
            (None, 1) => {
                log::info!("Choosing the only available output port: {}", names[0]);
                0
            }
            (None, _) => prompt_for_port(&names)?,
        };
        let port_name = names[index].clone();
        let connection = midi_out
            .connect(&ports[index], "halfstep-output")
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("connecting to output port {:?}", port_name))?;
        log::info!("Output connection open on '{}'", port_name);
        Ok(Self {
            port_name,
            connection: Some(connection),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn send(&mut self, message: MidiMessage) -> anyhow::Result<()> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| anyhow!("output port '{}' is closed", self.port_name))?;
        let bytes = encode(&message)?;
        connection
            .send(&bytes)
            .map_err(|e| anyhow!("sending {:?} to '{}': {}", bytes, self.port_name, e))
    }
}

impl SoundOutput for MidiSound {
    fn note_on(&mut self, note: Note, velocity: Velocity, channel: Channel) -> anyhow::Result<()> {
        self.send(MidiMessage::NoteOn(channel, note, velocity))
    }

    fn note_off(
        &mut self,
        note: Note,
        velocity: Velocity,
        channel: Channel,
    ) -> anyhow::Result<()> {
        self.send(MidiMessage::NoteOff(channel, note, velocity))
    }

    fn close(&mut self) -> anyhow::Result<()> {
        if let Some(connection) = self.connection.take() {
            connection.close();
            log::info!("Closed output connection on '{}'", self.port_name);
        }
        Ok(())
    }
}

fn prompt_for_port(names: &[String]) -> anyhow::Result<usize> {
    println!("\nAvailable output ports:");
    for (i, name) in names.iter().enumerate() {
        println!("{}: {}", i, name);
    }
    print!("Please select output port: ");
    stdout().flush()?;
    let mut input = String::new();
    stdin().read_line(&mut input)?;
    PortSelector::parse(&input).pick(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmidi::U7;

    fn names() -> Vec<String> {
        vec![
            "Midi Through:Midi Through Port-0 14:0".to_string(),
            "FLUID Synth (1234):Synth input port 128:0".to_string(),
        ]
    }

    #[test]
    fn selector_parses_index_or_name() {
        assert_eq!(PortSelector::parse(" 1\n"), PortSelector::Index(1));
        assert_eq!(
            PortSelector::parse("fluid"),
            PortSelector::Name("fluid".to_string())
        );
    }

    #[test]
    fn selector_picks_ports() {
        assert_eq!(PortSelector::Index(1).pick(&names()).unwrap(), 1);
        assert_eq!(PortSelector::parse("FLUID").pick(&names()).unwrap(), 1);
        assert_eq!(PortSelector::parse("through").pick(&names()).unwrap(), 0);
        assert!(PortSelector::Index(2).pick(&names()).is_err());
        assert!(PortSelector::parse("timidity").pick(&names()).is_err());
    }

    #[test]
    fn blank_selection_picks_nothing() {
        assert!(PortSelector::parse("\n").pick(&names()).is_err());
        assert!(PortSelector::parse("   ").pick(&names()).is_err());
        assert!(PortSelector::parse("").pick(&names()).is_err());
    }

    #[test]
    fn note_messages_encode_to_three_bytes() {
        let velocity = U7::from_u8_lossy(127);
        let on = MidiMessage::NoteOn(Channel::Ch1, Note::C4, velocity);
        let off = MidiMessage::NoteOff(Channel::Ch1, Note::C4, velocity);
        assert_eq!(encode(&on).unwrap(), vec![0x90, 60, 127]);
        assert_eq!(encode(&off).unwrap(), vec![0x80, 60, 127]);
    }

    #[test]
    fn channel_goes_in_the_status_byte() {
        let message = MidiMessage::NoteOn(
            Channel::Ch3,
            Note::try_from(61_u8).unwrap(),
            U7::from_u8_lossy(10),
        );
        assert_eq!(encode(&message).unwrap(), vec![0x92, 61, 10]);
    }
}
