// Harmonization pipeline: bass line in, chorale out.
//
// Runs the two searches in order. The key is derived from the bass line on
// every call and passed down explicitly, so independent harmonizations never
// share state. The two negative outcomes are returned as `HarmonizeError`;
// when only the voicing fails, the progression travels with the error.

use tracing::{debug, info};

use crate::chorale::Chorale;
use crate::config::HarmonizerConfig;
use crate::error::HarmonizeError;
use crate::input::BassLine;
use crate::progression::solve_progression;
use crate::triads::TriadTable;
use crate::voicing::solve_voicing;

pub fn harmonize(bass: &BassLine, config: &HarmonizerConfig) -> Result<Chorale, HarmonizeError> {
    let key = bass.key();
    debug!(%key, notes = ?bass.notes(), "harmonizing");

    let progression = solve_progression(bass.notes(), &key).ok_or(HarmonizeError::NoProgression)?;

    let table = TriadTable::build(&key);
    let voicing = solve_voicing(bass.notes(), &progression, &table, &config.voicing)
        .ok_or_else(|| HarmonizeError::NoVoicing {
            progression: progression.clone(),
        })?;

    info!(%key, chords = ?progression.degrees, "chorale complete");
    Ok(Chorale::new(key, bass.notes().to_vec(), progression, voicing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Mode;
    use crate::progression::Progression;

    fn line(notes: &[u8], mode: Mode) -> BassLine {
        BassLine::new(notes.to_vec(), mode).unwrap()
    }

    #[test]
    fn test_no_progression() {
        let result = harmonize(&line(&[0, 4, 0], Mode::Major), &HarmonizerConfig::default());
        assert_eq!(result, Err(HarmonizeError::NoProgression));
    }

    #[test]
    fn test_no_voicing_keeps_progression() {
        let result = harmonize(&line(&[0, 9, 5, 7, 0], Mode::Major), &HarmonizerConfig::default());
        assert_eq!(
            result,
            Err(HarmonizeError::NoVoicing {
                progression: Progression {
                    degrees: vec![1, 6, 4, 5, 1]
                }
            })
        );
    }

    #[test]
    fn test_success() {
        let chorale =
            harmonize(&line(&[0, 7, 0], Mode::Major), &HarmonizerConfig::default()).unwrap();
        assert_eq!(chorale.progression.degrees, vec![1, 5, 1]);
        assert_eq!(chorale.soprano, vec![36, 35, 36]);
        assert_eq!(chorale.alto, vec![31, 31, 31]);
        assert_eq!(chorale.tenor, vec![28, 26, 28]);
        assert_eq!(chorale.bass, vec![0, 7, 0]);
    }

    #[test]
    fn test_independent_runs() {
        // A minor run in between must not leak into the next major run
        let config = HarmonizerConfig::default();
        let major = line(&[0, 5, 7, 0], Mode::Major);
        let first = harmonize(&major, &config).unwrap();
        harmonize(&line(&[0, 10, 3, 5, 7, 0], Mode::Minor), &config).unwrap();
        assert_eq!(harmonize(&major, &config).unwrap(), first);
    }
}
