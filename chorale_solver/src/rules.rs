// Voice-leading rules shared by the voicing search and the chorale audit.
//
// Unlike a weighted score, every rule here is hard: a chord or a move either
// passes or yields a `Violation`. Chords are passed as `[Pitch; 4]` in SATB
// order (index with `Voice::index`).
//
// Rules:
// - Range: each voice inside its inclusive range.
// - Order: tenor <= alto <= soprano (no crossing among the upper voices).
// - Tenor lookahead: the tenor is never below the bass it sounds against, nor
//   below the next bass note.
// - Parallels: no two voices move in the same direction from a perfect fifth
//   to a perfect fifth, or from an octave/unison to an octave/unison.
//   Compound intervals count. Checked over all six voice pairs.
// - Spacing (optional): neighbouring upper voices no further apart than a
//   configured limit.
// - Membership: each upper voice sounds a member of the chord's triad.
//
// `voicing.rs` calls the per-move checks while stepping; `audit` re-runs
// them all over a finished `Chorale`.

use std::fmt;

use crate::chorale::Chorale;
use crate::triads::TriadTable;
use crate::voice::{Pitch, Voice, interval};
use crate::voicing::VoicingConfig;

/// Human-readable summary of the rules, for `chorale rules`.
pub const RULES: &[&str] = &[
    "There must be at least 3 chords in the sequence",
    "Each note in the bass line must be in the scale of the starting note",
    "The sequence must begin and end on the tonic chord",
    "The chord preceding the last one must be a V chord",
    "Root-position chords are preferred; first inversion is used only when necessary",
    "Each voice stays within its singable range",
    "Voices never cross, and the tenor never falls below the bass or the next bass note",
    "Parallel octaves and fifths are not allowed",
    "Neighbouring upper voices are no more than an octave apart (optional, see max_upper_spacing)",
    "Every upper voice sings a member of the current chord",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelKind {
    Fifths,
    Octaves,
}

/// A broken rule, located by chord index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    OutOfRange {
        index: usize,
        voice: Voice,
        pitch: Pitch,
    },
    /// No chord member lies in the search direction from the previous pitch.
    NoChordTone { index: usize, voice: Voice },
    Crossing {
        index: usize,
        upper: Voice,
        lower: Voice,
    },
    TenorBelowBass {
        index: usize,
        tenor: Pitch,
        bass: Pitch,
    },
    Parallel {
        index: usize,
        kind: ParallelKind,
        upper: Voice,
        lower: Voice,
    },
    WideSpacing {
        index: usize,
        upper: Voice,
        lower: Voice,
        semitones: u8,
    },
    NotChordTone {
        index: usize,
        voice: Voice,
        pitch: Pitch,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::OutOfRange { index, voice, pitch } => {
                write!(f, "chord {index}: {} at {pitch} is out of range", voice.name())
            }
            Violation::NoChordTone { index, voice } => {
                write!(f, "chord {index}: no chord tone for the {}", voice.name())
            }
            Violation::Crossing {
                index,
                upper,
                lower,
            } => write!(
                f,
                "chord {index}: {} crosses below the {}",
                upper.name(),
                lower.name()
            ),
            Violation::TenorBelowBass { index, tenor, bass } => {
                write!(f, "chord {index}: tenor {tenor} is below bass {bass}")
            }
            Violation::Parallel {
                index,
                kind,
                upper,
                lower,
            } => {
                let kind = match kind {
                    ParallelKind::Fifths => "fifths",
                    ParallelKind::Octaves => "octaves",
                };
                write!(
                    f,
                    "chord {index}: parallel {kind} between {} and {}",
                    upper.name(),
                    lower.name()
                )
            }
            Violation::WideSpacing {
                index,
                upper,
                lower,
                semitones,
            } => write!(
                f,
                "chord {index}: {} and {} are {semitones} semitones apart",
                upper.name(),
                lower.name()
            ),
            Violation::NotChordTone {
                index,
                voice,
                pitch,
            } => write!(
                f,
                "chord {index}: {} at {pitch} is not in the chord",
                voice.name()
            ),
        }
    }
}

/// Every voice inside its range.
pub fn check_ranges(index: usize, chord: &[Pitch; 4]) -> Result<(), Violation> {
    for voice in Voice::ALL {
        let pitch = chord[voice.index()];
        if !voice.contains(pitch) {
            return Err(Violation::OutOfRange {
                index,
                voice,
                pitch,
            });
        }
    }
    Ok(())
}

/// Soprano, alto and tenor in descending order (unisons allowed).
pub fn check_order(index: usize, chord: &[Pitch; 4]) -> Result<(), Violation> {
    for pair in Voice::UPPER.windows(2) {
        let (upper, lower) = (pair[0], pair[1]);
        if chord[upper.index()] < chord[lower.index()] {
            return Err(Violation::Crossing {
                index,
                upper,
                lower,
            });
        }
    }
    Ok(())
}

/// The tenor sits at or above the current bass and, if any, the next one.
pub fn check_tenor_above_bass(
    index: usize,
    tenor: Pitch,
    bass: Pitch,
    next_bass: Option<Pitch>,
) -> Result<(), Violation> {
    for bass in std::iter::once(bass).chain(next_bass) {
        if tenor < bass {
            return Err(Violation::TenorBelowBass { index, tenor, bass });
        }
    }
    Ok(())
}

/// Parallel fifths or octaves between any pair moving from `prev` to `next`.
/// `index` is the index of `next`.
pub fn check_parallels(
    index: usize,
    prev: &[Pitch; 4],
    next: &[Pitch; 4],
) -> Result<(), Violation> {
    for (i, &upper) in Voice::ALL.iter().enumerate() {
        for &lower in &Voice::ALL[i + 1..] {
            let (u, l) = (upper.index(), lower.index());
            if !interval::similar_motion(prev[u], next[u], prev[l], next[l]) {
                continue;
            }
            let fifths =
                interval::is_fifth(prev[u], prev[l]) && interval::is_fifth(next[u], next[l]);
            let octaves =
                interval::is_octave(prev[u], prev[l]) && interval::is_octave(next[u], next[l]);
            let kind = if fifths {
                ParallelKind::Fifths
            } else if octaves {
                ParallelKind::Octaves
            } else {
                continue;
            };
            return Err(Violation::Parallel {
                index,
                kind,
                upper,
                lower,
            });
        }
    }
    Ok(())
}

/// Soprano-alto and alto-tenor within `max` semitones.
pub fn check_spacing(index: usize, chord: &[Pitch; 4], max: u8) -> Result<(), Violation> {
    for pair in Voice::UPPER.windows(2) {
        let (upper, lower) = (pair[0], pair[1]);
        let semitones = chord[upper.index()].abs_diff(chord[lower.index()]);
        if semitones > max {
            return Err(Violation::WideSpacing {
                index,
                upper,
                lower,
                semitones,
            });
        }
    }
    Ok(())
}

/// Every upper voice is a member of the triad for `degree`.
pub fn check_membership(
    index: usize,
    chord: &[Pitch; 4],
    degree: u8,
    table: &TriadTable,
) -> Result<(), Violation> {
    for voice in Voice::UPPER {
        let pitch = chord[voice.index()];
        if !table.contains(degree, pitch) {
            return Err(Violation::NotChordTone {
                index,
                voice,
                pitch,
            });
        }
    }
    Ok(())
}

/// The rules a single chord must satisfy on its own (plus the lookahead to
/// the next bass note).
pub fn check_chord(
    index: usize,
    chord: &[Pitch; 4],
    next_bass: Option<Pitch>,
    config: &VoicingConfig,
) -> Result<(), Violation> {
    check_ranges(index, chord)?;
    check_order(index, chord)?;
    check_tenor_above_bass(
        index,
        chord[Voice::Tenor.index()],
        chord[Voice::Bass.index()],
        next_bass,
    )?;
    if let Some(max) = config.max_upper_spacing {
        check_spacing(index, chord, max)?;
    }
    Ok(())
}

/// Re-check a finished chorale against every rule. Empty means clean.
pub fn audit(chorale: &Chorale, table: &TriadTable, config: &VoicingConfig) -> Vec<Violation> {
    let mut violations = Vec::new();
    for index in 0..chorale.len() {
        let chord = chorale.vertical_slice(index);
        let next_bass = chorale.bass.get(index + 1).copied();

        violations.extend(check_ranges(index, &chord).err());
        violations.extend(check_order(index, &chord).err());
        violations.extend(
            check_tenor_above_bass(
                index,
                chord[Voice::Tenor.index()],
                chord[Voice::Bass.index()],
                next_bass,
            )
            .err(),
        );
        violations.extend(
            config
                .max_upper_spacing
                .and_then(|max| check_spacing(index, &chord, max).err()),
        );
        violations.extend(
            chorale
                .progression
                .degrees
                .get(index)
                .and_then(|&degree| check_membership(index, &chord, degree, table).err()),
        );
        if config.forbid_parallels && index > 0 {
            let prev = chorale.vertical_slice(index - 1);
            violations.extend(check_parallels(index, &prev, &chord).err());
        }
    }
    violations
}
