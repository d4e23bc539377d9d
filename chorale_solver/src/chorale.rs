// A finished four-part harmonization.
//
// `Chorale` bundles the bass line with its chord progression and the three
// solved upper voices, all the same length. It is the only output type of
// the pipeline: the CLI prints it, midi.rs and lilypond.rs export it, and
// rules::audit re-checks it.

use serde::Serialize;

use crate::error::ExportError;
use crate::key::{Degree, Key};
use crate::progression::Progression;
use crate::voice::{Pitch, Voice, pitch_name};
use crate::voicing::Voicing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chorale {
    pub key: Key,
    pub bass: Vec<Pitch>,
    pub progression: Progression,
    pub soprano: Vec<Pitch>,
    pub alto: Vec<Pitch>,
    pub tenor: Vec<Pitch>,
}

/// Flat JSON shape for `--json` output.
#[derive(Serialize)]
struct ChoraleJson<'a> {
    key: String,
    bass: &'a [Pitch],
    chords: &'a [Degree],
    numerals: Vec<String>,
    soprano: &'a [Pitch],
    alto: &'a [Pitch],
    tenor: &'a [Pitch],
}

impl Chorale {
    pub fn new(key: Key, bass: Vec<Pitch>, progression: Progression, voicing: Voicing) -> Self {
        let Voicing {
            soprano,
            alto,
            tenor,
        } = voicing;
        Chorale {
            key,
            bass,
            progression,
            soprano,
            alto,
            tenor,
        }
    }

    /// Number of chords.
    pub fn len(&self) -> usize {
        self.bass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bass.is_empty()
    }

    pub fn part(&self, voice: Voice) -> &[Pitch] {
        match voice {
            Voice::Soprano => &self.soprano,
            Voice::Alto => &self.alto,
            Voice::Tenor => &self.tenor,
            Voice::Bass => &self.bass,
        }
    }

    /// The four pitches sounding at chord `index`, in SATB order.
    pub fn vertical_slice(&self, index: usize) -> [Pitch; 4] {
        Voice::ALL.map(|voice| self.part(voice)[index])
    }

    pub fn numerals(&self) -> Vec<String> {
        self.progression.numerals(&self.bass, &self.key)
    }

    /// Text table: one column per chord, numeral row then one row per voice.
    pub fn summary(&self) -> String {
        let numerals = self.numerals();
        let width = numerals.iter().map(|n| n.chars().count()).max().unwrap_or(0).max(4) + 1;

        let mut out = format!("{}\n", self.key);
        out.push_str(&format!("{:>8}: ", "Chord"));
        for numeral in &numerals {
            out.push_str(&format!("{numeral:<width$}"));
        }
        out.push('\n');
        for voice in Voice::ALL {
            out.push_str(&format!("{:>8}: ", voice.name()));
            for &pitch in self.part(voice) {
                out.push_str(&format!("{:<width$}", pitch_name(pitch)));
            }
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        let view = ChoraleJson {
            key: self.key.to_string(),
            bass: &self.bass,
            chords: &self.progression.degrees,
            numerals: self.numerals(),
            soprano: &self.soprano,
            alto: &self.alto,
            tenor: &self.tenor,
        };
        Ok(serde_json::to_string_pretty(&view)?)
    }
}
