/// Identifies a key on the computer keyboard, independent of the input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable key, including space.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Function(u8),
    /// Anything else the backend reports that has no name here.
    Other,
}

/// Fixed table from key to half-step delta. Immutable once built.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    entries: [(Key, i8); 9],
}

impl KeyBindings {
    /// The home-row layout: `a s d f` go down 4..1 half steps, space stays
    /// put, `j k l ;` go up 1..4.
    pub fn home_row() -> Self {
        Self {
            entries: [
                (Key::Char('a'), -4),
                (Key::Char('s'), -3),
                (Key::Char('d'), -2),
                (Key::Char('f'), -1),
                (Key::Char(' '), 0),
                (Key::Char('j'), 1),
                (Key::Char('k'), 2),
                (Key::Char('l'), 3),
                (Key::Char(';'), 4),
            ],
        }
    }

    pub fn delta(&self, key: Key) -> Option<i8> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, delta)| delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_row_deltas() {
        let bindings = KeyBindings::home_row();
        let expected = [
            ('a', -4),
            ('s', -3),
            ('d', -2),
            ('f', -1),
            (' ', 0),
            ('j', 1),
            ('k', 2),
            ('l', 3),
            (';', 4),
        ];
        for (c, delta) in expected {
            assert_eq!(bindings.delta(Key::Char(c)), Some(delta), "key {:?}", c);
        }
    }

    #[test]
    fn other_keys_are_unmapped() {
        let bindings = KeyBindings::home_row();
        for key in [
            Key::Char('q'),
            Key::Char('A'),
            Key::Char('g'),
            Key::Enter,
            Key::Up,
            Key::Function(1),
            Key::Other,
        ] {
            assert_eq!(bindings.delta(key), None, "{:?} should be unmapped", key);
        }
    }
}
