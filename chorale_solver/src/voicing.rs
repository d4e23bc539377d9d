// Voice-leading search: soprano, alto and tenor over a fixed progression.
//
// A seed assigns the three upper voices for the opening tonic chord. From
// there every step is deterministic: each upper voice moves to the nearest
// member of the next triad, upward when the bass falls (or rises a fourth)
// and downward otherwise, so the upper voices tend to move against the bass.
// The one exception is the leading tone: when the previous chord was V and
// the soprano holds the leading tone, a rising bass sends the soprano up a
// semitone to the tonic. That soprano is then displaced from where nearest-
// member motion would have put it, so the next step searches from a minor
// third below it and clears the flag.
//
// After each move the chord is checked against rules.rs; any violation
// abandons the seed. Only the seed is searched over:
// - Heuristic: up to four fixed spacings of the tonic triad.
// - Exhaustive: the heuristic seeds, then every other ordered tonic-triad
//   spacing that puts the third and the fifth in the upper voices, highest
//   soprano first.
//
// Consumed by harmonize.rs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::key::{DOMINANT, Degree, TONIC};
use crate::progression::Progression;
use crate::rules::{self, Violation};
use crate::triads::{Member, TriadTable, next_higher, next_lower};
use crate::voice::{Pitch, Voice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedStrategy {
    /// The fixed opening spacings only. Fast, but can miss a voicing.
    #[default]
    Heuristic,
    /// Fall back to every opening spacing of the tonic triad.
    Exhaustive,
}

/// Voicing search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicingConfig {
    pub seed_strategy: SeedStrategy,
    /// Reject parallel perfect fifths and octaves between any two voices.
    pub forbid_parallels: bool,
    /// Largest allowed soprano-alto and alto-tenor distance, in semitones.
    pub max_upper_spacing: Option<u8>,
}

impl Default for VoicingConfig {
    fn default() -> Self {
        VoicingConfig {
            seed_strategy: SeedStrategy::Heuristic,
            forbid_parallels: true,
            max_upper_spacing: None,
        }
    }
}

/// The three upper parts, aligned with the bass line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Voicing {
    pub soprano: Vec<Pitch>,
    pub alto: Vec<Pitch>,
    pub tenor: Vec<Pitch>,
}

impl Voicing {
    pub fn len(&self) -> usize {
        self.soprano.len()
    }

    pub fn is_empty(&self) -> bool {
        self.soprano.is_empty()
    }

    fn push(&mut self, chord: &[Pitch; 4]) {
        self.soprano.push(chord[Voice::Soprano.index()]);
        self.alto.push(chord[Voice::Alto.index()]);
        self.tenor.push(chord[Voice::Tenor.index()]);
    }
}

/// Opening soprano/alto/tenor pitches.
pub type Seed = [Pitch; 3];

/// The fixed opening spacings, in the order they are tried.
///
/// `tonic` is the tonic row of the triad table. Positions are chosen relative
/// to the highest root `h`: root/fifth/third stacked down from the top, the
/// third moved into the alto with the fifth in the tenor, the soprano on the
/// third, and failing that a close root-position spacing one octave lower
/// (fifth, third, root from the top). That last spacing replaces a fourth
/// fixed spacing whose soprano sat below its alto and so could never pass.
/// Spacings that would index off the table are skipped.
pub fn heuristic_seeds(tonic: &[Pitch], first_bass: Pitch) -> Vec<Seed> {
    let Some(last) = tonic.len().checked_sub(1) else {
        return Vec::new();
    };
    let below = |h: usize, n: usize| h.checked_sub(n).and_then(|i| tonic.get(i)).copied();
    let exceeds = |p: Option<Pitch>, limit: Pitch| p.is_some_and(|p| p > limit);
    let seed = |s: Option<Pitch>, a: Option<Pitch>, t: Option<Pitch>| -> Option<Seed> {
        Some([s?, a?, t?])
    };

    let (soprano_low, soprano_high) = Voice::Soprano.range();
    let alto_high = Voice::Alto.range().1;
    let (tenor_low, tenor_high) = Voice::Tenor.range();

    let mut seeds = Vec::new();
    let mut h = last / 3 * 3;

    let crowded = exceeds(below(h, 1), alto_high) || exceeds(below(h, 2), tenor_high);
    if crowded && exceeds(below(h, 3), soprano_low) {
        h -= 3;
    }
    seeds.extend(seed(below(h, 0), below(h, 1), below(h, 2)));

    if tonic.get(h + 3).is_some_and(|&p| p <= soprano_high) {
        h += 3;
    }
    let low_fifth = below(h, 4);
    if exceeds(low_fifth, first_bass) && exceeds(low_fifth, tenor_low) {
        seeds.extend(seed(below(h, 0), below(h, 2), low_fifth));
    }
    match tonic.get(h + 1).copied().filter(|&p| p <= soprano_high) {
        Some(third) => seeds.extend(seed(Some(third), below(h, 0), below(h, 1))),
        None if exceeds(low_fifth, first_bass) => {
            seeds.extend(seed(below(h, 2), below(h, 3), low_fifth));
        }
        None => {}
    }
    seeds
}

/// Every spacing with soprano >= alto >= tenor whose upper voices include the
/// third and the fifth, highest soprano first.
pub fn exhaustive_seeds(tonic: &[Pitch]) -> Vec<Seed> {
    let mut seeds = Vec::new();
    for s in (0..tonic.len()).rev() {
        for a in (0..=s).rev() {
            for t in (0..=a).rev() {
                let members = [s, a, t].map(Member::at);
                if members.contains(&Member::Third) && members.contains(&Member::Fifth) {
                    seeds.push([tonic[s], tonic[a], tonic[t]]);
                }
            }
        }
    }
    seeds
}

/// Find upper voices for `progression` over `bass`, or `None` if no seed the
/// strategy allows can be carried through to the end.
pub fn solve_voicing(
    bass: &[Pitch],
    progression: &Progression,
    table: &TriadTable,
    config: &VoicingConfig,
) -> Option<Voicing> {
    if bass.len() < 2 || progression.len() != bass.len() {
        return None;
    }
    let search = Search {
        bass,
        degrees: &progression.degrees,
        table,
        config,
    };
    let tonic = table.members(TONIC);

    let heuristic = heuristic_seeds(tonic, bass[0]);
    for &seed in &heuristic {
        if let Some(voicing) = search.attempt(seed) {
            return Some(voicing);
        }
    }
    if config.seed_strategy == SeedStrategy::Exhaustive {
        debug!("heuristic seeds exhausted, trying every spacing");
        for seed in exhaustive_seeds(tonic) {
            if heuristic.contains(&seed) {
                continue;
            }
            if let Some(voicing) = search.attempt(seed) {
                return Some(voicing);
            }
        }
    }
    None
}

struct Search<'a> {
    bass: &'a [Pitch],
    degrees: &'a [Degree],
    table: &'a TriadTable,
    config: &'a VoicingConfig,
}

impl Search<'_> {
    fn attempt(&self, seed: Seed) -> Option<Voicing> {
        match self.realize(seed) {
            Ok(voicing) => {
                debug!(?seed, "seed realized");
                Some(voicing)
            }
            Err(violation) => {
                debug!(?seed, %violation, "seed rejected");
                None
            }
        }
    }

    /// Carry a seed through every chord, stopping at the first violation.
    fn realize(&self, seed: Seed) -> Result<Voicing, Violation> {
        let [soprano, alto, tenor] = seed;
        let mut chord = [soprano, alto, tenor, self.bass[0]];
        rules::check_chord(0, &chord, self.bass.get(1).copied(), self.config)?;

        let mut voicing = Voicing::default();
        voicing.push(&chord);
        let mut raised = false;
        for index in 1..self.bass.len() {
            let (next, next_raised) = self.step(index, &chord, raised)?;
            voicing.push(&next);
            chord = next;
            raised = next_raised;
        }
        Ok(voicing)
    }

    /// Move from `prev` into chord `index`. Returns the new chord and whether
    /// the soprano was just raised off the leading tone.
    fn step(
        &self,
        index: usize,
        prev: &[Pitch; 4],
        raised: bool,
    ) -> Result<([Pitch; 4], bool), Violation> {
        let degree = self.degrees[index];
        let members = self.table.members(degree);
        let bass = self.bass[index];
        let [s, a, t, prev_bass] = *prev;

        let motion = i16::from(bass) - i16::from(prev_bass);
        let upward = motion < 0 || motion == 5;
        let find = |voice: Voice, from: i16| {
            let found = if upward {
                next_higher(members, from)
            } else {
                next_lower(members, from)
            };
            found.ok_or(Violation::NoChordTone { index, voice })
        };
        // A raised soprano searches from a minor third below.
        let origin = i16::from(s) - if raised { 3 } else { 0 };

        let resolve_leading_tone = !upward
            && self.degrees[index - 1] == DOMINANT
            && self.table.key().is_leading_tone(s);
        let soprano = if resolve_leading_tone {
            s + 1
        } else {
            find(Voice::Soprano, origin)?
        };
        let alto = find(Voice::Alto, i16::from(a))?;
        let tenor = find(Voice::Tenor, i16::from(t))?;

        let next = [soprano, alto, tenor, bass];
        rules::check_chord(index, &next, self.bass.get(index + 1).copied(), self.config)?;
        rules::check_membership(index, &next, degree, self.table)?;
        if self.config.forbid_parallels {
            rules::check_parallels(index, prev, &next)?;
        }
        Ok((next, resolve_leading_tone))
    }
}
