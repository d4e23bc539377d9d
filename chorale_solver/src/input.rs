// Input boundary: turns user text into a validated `BassLine`.
//
// Everything the solvers assume about their input is enforced here, once,
// so progression.rs and voicing.rs never see a malformed line. Checks run in
// a fixed order (length, bass range, scale membership, matching ends) and
// stop at the first failure, which names the offending note.

use serde::Serialize;

use crate::error::InputError;
use crate::key::{Key, Mode};
use crate::voice::{Pitch, Voice, parse_pitch};

/// A bass line that satisfies every solver precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BassLine {
    notes: Vec<Pitch>,
    mode: Mode,
}

impl BassLine {
    pub const MIN_LEN: usize = 3;

    pub fn new(notes: Vec<Pitch>, mode: Mode) -> Result<Self, InputError> {
        if notes.len() < Self::MIN_LEN {
            return Err(InputError::TooShort { len: notes.len() });
        }
        if let Some((index, &pitch)) = notes
            .iter()
            .enumerate()
            .find(|&(_, &p)| !Voice::Bass.contains(p))
        {
            return Err(InputError::OutOfRange { index, pitch });
        }
        let key = Key::new(notes[0], mode);
        if let Some((index, &pitch)) = notes.iter().enumerate().find(|&(_, &p)| !key.contains(p)) {
            return Err(InputError::NotInScale { index, pitch });
        }
        let (first, last) = (notes[0], notes[notes.len() - 1]);
        if first % 12 != last % 12 {
            return Err(InputError::MismatchedEnds { first, last });
        }
        Ok(BassLine { notes, mode })
    }

    /// Parse and validate in one go.
    pub fn parse(text: &str, mode: Mode) -> Result<Self, InputError> {
        BassLine::new(parse_bass_line(text)?, mode)
    }

    pub fn notes(&self) -> &[Pitch] {
        &self.notes
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The key implied by the first note.
    pub fn key(&self) -> Key {
        Key::new(self.notes[0], self.mode)
    }
}

/// Split on whitespace and commas, parsing each token as a key number or
/// note name. No musical validation.
pub fn parse_bass_line(text: &str) -> Result<Vec<Pitch>, InputError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(parse_pitch)
        .collect()
}
