// Chord progression search: one chord degree per bass note.
//
// Depth-first backtracking over the bass line. The first chord is the tonic;
// at each step the next bass note is read first as the root of a chord and,
// failing that, as the third of a first-inversion chord. A candidate is only
// tried if the transition graph allows it after the current chord. The search
// succeeds when the second-to-last chord is the dominant, at which point the
// closing tonic is appended.
//
// Each recursive call extends its own copy of the prefix, so a failed branch
// leaves nothing behind to undo.
//
// Running out of candidates is a normal result (`None`), meaning the bass line
// has no rule-conformant harmonization.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::key::{
    DOMINANT, Degree, Inversion, Key, LEADING_TONE, MEDIANT, Mode, SUBTONIC, SUPERTONIC, TONIC,
    TriadQuality,
};
use crate::transitions;
use crate::voice::Pitch;

/// A chord sequence aligned one-to-one with a bass line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub degrees: Vec<Degree>,
}

impl Progression {
    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    /// Opens and closes on the tonic, has the dominant second to last, and
    /// only uses edges of the mode's transition graph.
    pub fn is_well_formed(&self, mode: Mode) -> bool {
        let n = self.degrees.len();
        n >= 3
            && self.degrees[0] == TONIC
            && self.degrees[n - 1] == TONIC
            && self.degrees[n - 2] == DOMINANT
            && self
                .degrees
                .windows(2)
                .all(|pair| transitions::is_legal(mode, pair[0], pair[1]))
    }

    /// Roman numerals, with "6"/"64" marking inversions implied by the bass.
    pub fn numerals(&self, bass: &[Pitch], key: &Key) -> Vec<String> {
        self.degrees
            .iter()
            .zip(bass)
            .map(|(&degree, &note)| numeral(degree, note, key))
            .collect()
    }
}

fn numeral(degree: Degree, bass: Pitch, key: &Key) -> String {
    const NUMERALS: [&str; 9] = ["?", "I", "II", "III", "IV", "V", "VI", "VII", "VII"];
    let base = NUMERALS.get(degree as usize).copied().unwrap_or("?");
    let mut out = match key.mode.quality(degree) {
        Some(TriadQuality::Major) | None => base.to_string(),
        Some(TriadQuality::Minor) => base.to_lowercase(),
        Some(TriadQuality::Diminished) => format!("{}°", base.to_lowercase()),
    };
    match key.inversion_of(bass, degree) {
        Some(Inversion::First) => out.push('6'),
        Some(Inversion::Second) => out.push_str("64"),
        Some(Inversion::Root) | None => {}
    }
    out
}

/// Find the first progression, in search order, that fits the bass line.
///
/// The bass line is expected to have passed input validation; a line shorter
/// than three notes simply has no progression.
pub fn solve_progression(bass: &[Pitch], key: &Key) -> Option<Progression> {
    if bass.len() < 3 {
        return None;
    }
    let found = extend(bass, key, 0, &[TONIC]);
    match &found {
        Some(degrees) => debug!(?degrees, "chord progression found"),
        None => debug!(notes = bass.len(), "no chord progression"),
    }
    found.map(|degrees| Progression { degrees })
}

/// Extend `chords` (degrees for bass notes `0..=index`) to the end of the line.
fn extend(bass: &[Pitch], key: &Key, index: usize, chords: &[Degree]) -> Option<Vec<Degree>> {
    let current = *chords.last()?;

    if index == bass.len() - 2 {
        if current != DOMINANT {
            return None;
        }
        let mut complete = chords.to_vec();
        complete.push(TONIC);
        return Some(complete);
    }

    // Leading-tone triads never stand in root position: a bass on the leading
    // tone is read as the third of V.
    let as_root = key
        .degree_of(bass[index + 1])
        .map(|degree| if degree == LEADING_TONE { DOMINANT } else { degree });
    let as_third = as_root.and_then(|degree| first_inversion_parent(degree, bass, index, key));

    for candidate in [as_root, as_third].into_iter().flatten() {
        if !transitions::is_legal(key.mode, current, candidate) {
            continue;
        }
        let mut attempt = chords.to_vec();
        attempt.push(candidate);
        if let Some(complete) = extend(bass, key, index + 1, &attempt) {
            return Some(complete);
        }
    }
    None
}

/// The chord whose third is a bass note that would root `degree`.
///
/// A third below the root is two degrees down, except that the supertonic is
/// the third of the leading-tone chord, or in minor of the borrowed VII when
/// the bass goes on to the mediant (VII resolves to III).
fn first_inversion_parent(
    degree: Degree,
    bass: &[Pitch],
    index: usize,
    key: &Key,
) -> Option<Degree> {
    match degree {
        SUPERTONIC => match key.mode {
            Mode::Major => Some(LEADING_TONE),
            Mode::Minor => {
                let after = bass.get(index + 2).and_then(|&p| key.degree_of(p));
                if after == Some(MEDIANT) {
                    Some(SUBTONIC)
                } else {
                    Some(LEADING_TONE)
                }
            }
        },
        d if d > SUPERTONIC => Some(d - 2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(bass: &[Pitch], mode: Mode) -> Option<Vec<Degree>> {
        solve_progression(bass, &Key::new(bass[0], mode)).map(|p| p.degrees)
    }

    #[test]
    fn test_mediant_before_final_fails() {
        // C-E-C: the penultimate chord cannot be a dominant
        assert_eq!(solve(&[0, 4, 0], Mode::Major), None);
    }

    #[test]
    fn test_plain_cadence() {
        assert_eq!(solve(&[0, 5, 7, 0], Mode::Major), Some(vec![1, 4, 5, 1]));
        assert_eq!(solve(&[0, 7, 0], Mode::Major), Some(vec![1, 5, 1]));
    }

    #[test]
    fn test_transposed_octave_independent() {
        assert_eq!(solve(&[12, 17, 19, 12], Mode::Major), Some(vec![1, 4, 5, 1]));
        assert_eq!(solve(&[7, 12, 14, 7], Mode::Major), Some(vec![1, 4, 5, 1]));
    }

    #[test]
    fn test_leading_tone_bass_reads_as_dominant() {
        assert_eq!(solve(&[0, 11, 12], Mode::Major), Some(vec![1, 5, 1]));
    }

    #[test]
    fn test_falls_back_to_first_inversion() {
        // Eb major: C cannot root a chord that reaches the dominant in time,
        // so it becomes the third of IV.
        assert_eq!(solve(&[3, 0, 2, 3], Mode::Major), Some(vec![1, 4, 5, 1]));
    }

    #[test]
    fn test_backtracks_out_of_dead_end() {
        // vi then V is illegal, so the A is re-read as the third of IV.
        assert_eq!(solve(&[0, 9, 7, 0], Mode::Major), Some(vec![1, 4, 5, 1]));
    }

    #[test]
    fn test_minor_subtonic_root() {
        assert_eq!(
            solve(&[0, 10, 3, 5, 7, 0], Mode::Minor),
            Some(vec![1, 8, 3, 4, 5, 1])
        );
    }

    #[test]
    fn test_minor_supertonic_pivots_through_subtonic() {
        // D read as a root (ii°) dead-ends; as a third it becomes VII because
        // the following Eb roots III.
        assert_eq!(
            solve(&[0, 2, 3, 5, 7, 0], Mode::Minor),
            Some(vec![1, 8, 3, 4, 5, 1])
        );
    }

    #[test]
    fn test_supertonic_parent_depends_on_lookahead() {
        let key = Key::new(0, Mode::Minor);
        assert_eq!(first_inversion_parent(2, &[0, 2, 3, 0], 0, &key), Some(SUBTONIC));
        assert_eq!(first_inversion_parent(2, &[0, 2, 7, 0], 0, &key), Some(LEADING_TONE));
        let major = Key::new(0, Mode::Major);
        assert_eq!(first_inversion_parent(2, &[0, 2, 4, 0], 0, &major), Some(LEADING_TONE));
        assert_eq!(first_inversion_parent(1, &[0, 0, 7, 0], 0, &major), None);
        assert_eq!(first_inversion_parent(8, &[0, 10, 3, 0], 0, &key), Some(6));
    }

    #[test]
    fn test_results_are_well_formed() {
        let lines: Vec<(Vec<Pitch>, Mode)> = vec![
            (vec![0, 5, 7, 0], Mode::Major),
            (vec![0, 7, 16, 7, 12], Mode::Major),
            (vec![3, 0, 2, 3], Mode::Major),
            (vec![0, 10, 3, 5, 7, 0], Mode::Minor),
            (vec![9, 2, 4, 9], Mode::Minor),
        ];
        for (bass, mode) in &lines {
            let (bass, mode) = (bass.as_slice(), *mode);
            let key = Key::new(bass[0], mode);
            let progression = solve_progression(bass, &key).unwrap();
            assert_eq!(progression.len(), bass.len());
            assert!(progression.is_well_formed(mode), "{:?}", progression);
        }
    }

    #[test]
    fn test_too_short_has_no_progression() {
        assert_eq!(solve_progression(&[0, 0], &Key::new(0, Mode::Major)), None);
    }

    #[test]
    fn test_numerals() {
        let key = Key::new(0, Mode::Major);
        let progression = Progression { degrees: vec![1, 4, 5, 1] };
        assert_eq!(progression.numerals(&[0, 5, 11, 12], &key), vec!["I", "IV", "V6", "I"]);

        let minor = Key::new(0, Mode::Minor);
        let progression = Progression { degrees: vec![1, 8, 3, 4, 5, 1] };
        assert_eq!(
            progression.numerals(&[0, 10, 3, 5, 7, 0], &minor),
            vec!["i", "VII", "III", "iv", "V", "i"]
        );
        let progression = Progression { degrees: vec![1, 7, 1] };
        assert_eq!(progression.numerals(&[0, 2, 0], &minor), vec!["i", "vii°6", "i"]);
    }

    #[test]
    fn test_tonic_over_its_third() {
        // E in the bass under I is a first-inversion tonic, not a new root
        let key = Key::new(0, Mode::Major);
        let bass = [0, 7, 16, 7, 12];
        let progression = solve_progression(&bass, &key).unwrap();
        assert_eq!(progression.degrees, vec![1, 5, 1, 5, 1]);
        assert_eq!(progression.numerals(&bass, &key), vec!["I", "V", "I6", "V", "I"]);
    }
}
