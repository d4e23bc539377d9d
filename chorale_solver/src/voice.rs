// Voice parts and pitches on the solver's keyboard.
//
// Pitches are key numbers on a 44-key keyboard that spans the four voice
// ranges: key 0 is C2 and key 43 is G5. A key number is only an index, not a
// frequency; `MIDI_OFFSET` converts it for playback. Each voice owns a fixed,
// inclusive slice of the keyboard, and unlike a soft scoring penalty these
// ranges are hard limits the voicing search never leaves.
//
// Also holds the naming helpers used by the CLI key lookup and the interval
// helpers that the rule checks in rules.rs are built on.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A key number on the 44-key keyboard.
pub type Pitch = u8;

/// Highest key on the keyboard (G5), also the top of the soprano range.
pub const KEYBOARD_MAX: Pitch = 43;

/// Key 0 is C2, which is MIDI note 36.
pub const MIDI_OFFSET: u8 = 36;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

/// Voice index in SATB order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voice {
    Soprano = 0,
    Alto = 1,
    Tenor = 2,
    Bass = 3,
}

impl Voice {
    pub const ALL: [Voice; 4] = [Voice::Soprano, Voice::Alto, Voice::Tenor, Voice::Bass];

    /// The three parts the voicing search assigns; the bass is given.
    pub const UPPER: [Voice; 3] = [Voice::Soprano, Voice::Alto, Voice::Tenor];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Inclusive key-number range for the voice.
    pub fn range(self) -> (Pitch, Pitch) {
        match self {
            Voice::Soprano => (24, 43), // C4–G5
            Voice::Alto => (19, 36),    // G3–C5
            Voice::Tenor => (12, 31),   // C3–G4
            Voice::Bass => (0, 24),     // C2–C4
        }
    }

    pub fn contains(self, pitch: Pitch) -> bool {
        let (low, high) = self.range();
        (low..=high).contains(&pitch)
    }

    pub fn name(self) -> &'static str {
        match self {
            Voice::Soprano => "Soprano",
            Voice::Alto => "Alto",
            Voice::Tenor => "Tenor",
            Voice::Bass => "Bass",
        }
    }
}

/// Name a key number with its octave, e.g. 0 -> "C2", 13 -> "C#3".
pub fn pitch_name(pitch: Pitch) -> String {
    format!("{}{}", NOTE_NAMES[(pitch % 12) as usize], pitch / 12 + 2)
}

/// Parse a key number ("7") or a note name with octave ("G2", "f#3", "Bb2").
///
/// The result must land on the keyboard (0..=43). Bass-range and scale checks
/// happen later, in input.rs.
pub fn parse_pitch(token: &str) -> Result<Pitch, InputError> {
    let token = token.trim();
    let invalid = || InputError::InvalidNote { token: token.to_string() };

    if token.chars().all(|c| c.is_ascii_digit()) {
        let pitch: u32 = token.parse().map_err(|_| invalid())?;
        return u8::try_from(pitch)
            .ok()
            .filter(|&p| p <= KEYBOARD_MAX)
            .ok_or_else(invalid);
    }

    let mut chars = token.chars();
    let letter = chars.next().ok_or_else(invalid)?;
    let natural: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(invalid()),
    };
    let rest = chars.as_str();
    let (accidental, octave) = if let Some(octave) = rest.strip_prefix('#') {
        (1, octave)
    } else if let Some(octave) = rest.strip_prefix('b') {
        (-1, octave)
    } else {
        (0, rest)
    };
    if octave.is_empty() || !octave.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let octave: i32 = octave.parse().map_err(|_| invalid())?;

    let key = (octave - 2) * 12 + natural + accidental;
    u8::try_from(key)
        .ok()
        .filter(|&p| p <= KEYBOARD_MAX)
        .ok_or_else(invalid)
}

/// Interval helpers.
pub mod interval {
    use super::Pitch;

    /// Signed distance in semitones; positive means `to` is higher.
    pub fn semitones(from: Pitch, to: Pitch) -> i16 {
        to as i16 - from as i16
    }

    /// Distance between two pitches reduced mod 12, ignoring direction.
    pub fn class(a: Pitch, b: Pitch) -> u8 {
        a.abs_diff(b) % 12
    }

    /// Perfect fifth or compound fifth.
    pub fn is_fifth(a: Pitch, b: Pitch) -> bool {
        class(a, b) == 7
    }

    /// Unison, octave, or compound octave.
    pub fn is_octave(a: Pitch, b: Pitch) -> bool {
        class(a, b) == 0
    }

    /// Both voices move, and in the same direction.
    pub fn similar_motion(a_from: Pitch, a_to: Pitch, b_from: Pitch, b_to: Pitch) -> bool {
        let a = semitones(a_from, a_to);
        let b = semitones(b_from, b_to);
        (a > 0 && b > 0) || (a < 0 && b < 0)
    }
}
