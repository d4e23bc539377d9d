// Scale and key model for major/minor harmonization.
//
// A `Key` is a tonic pitch class plus a `Mode`. Everything here is a pure
// function of that pair: which chromatic distances belong to the scale,
// which chord degree a bass note implies when read as a root, and the
// quality and pitch classes of each diatonic triad.
//
// Minor keys admit both the natural and the raised seventh (distances 10 and
// 11). Distance 11 is the leading tone (degree 7, diminished triad); distance
// 10 roots the borrowed major VII, stored as degree 8 so it never collides
// with the leading-tone chord.
//
// Consumed by progression.rs (degree classification), triads.rs (triad
// construction), voicing.rs (leading-tone detection) and input.rs (scale
// membership at the input boundary).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::voice::Pitch;

/// A chord built on a scale degree: 1..=7, or 8 for the borrowed major VII
/// of a minor key.
pub type Degree = u8;

pub const TONIC: Degree = 1;
pub const SUPERTONIC: Degree = 2;
pub const MEDIANT: Degree = 3;
pub const DOMINANT: Degree = 5;
pub const LEADING_TONE: Degree = 7;
/// Borrowed major VII (minor keys only).
pub const SUBTONIC: Degree = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

impl Mode {
    /// Chromatic distances above the tonic that fall outside the scale.
    pub fn forbidden_distances(self) -> &'static [u8] {
        match self {
            Mode::Major => &[1, 3, 6, 8, 10],
            Mode::Minor => &[1, 4, 6, 9],
        }
    }

    /// Chord degrees that exist in this mode.
    pub fn degrees(self) -> &'static [Degree] {
        match self {
            Mode::Major => &[1, 2, 3, 4, 5, 6, 7],
            Mode::Minor => &[1, 2, 3, 4, 5, 6, 7, 8],
        }
    }

    /// Semitones from the tonic to the root of a degree's triad.
    pub fn root_offset(self, degree: Degree) -> Option<u8> {
        let offset = match (self, degree) {
            (_, 1) => 0,
            (_, 2) => 2,
            (Mode::Major, 3) => 4,
            (Mode::Minor, 3) => 3,
            (_, 4) => 5,
            (_, 5) => 7,
            (Mode::Major, 6) => 9,
            (Mode::Minor, 6) => 8,
            (_, 7) => 11,
            (Mode::Minor, 8) => 10,
            _ => return None,
        };
        Some(offset)
    }

    pub fn quality(self, degree: Degree) -> Option<TriadQuality> {
        use TriadQuality::*;
        let quality = match (self, degree) {
            (Mode::Major, 1 | 4 | 5) => Major,
            (Mode::Major, 2 | 3 | 6) => Minor,
            (Mode::Major, 7) => Diminished,
            (Mode::Minor, 3 | 5 | 6 | 8) => Major,
            (Mode::Minor, 1 | 4) => Minor,
            (Mode::Minor, 2 | 7) => Diminished,
            _ => return None,
        };
        Some(quality)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => write!(f, "major"),
            Mode::Minor => write!(f, "minor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriadQuality {
    Major,
    Minor,
    Diminished,
}

impl TriadQuality {
    /// Semitone steps root->third, third->fifth, fifth->next root.
    pub fn stack(self) -> [u8; 3] {
        match self {
            TriadQuality::Major => [4, 3, 5],
            TriadQuality::Minor => [3, 4, 5],
            TriadQuality::Diminished => [3, 3, 6],
        }
    }
}

/// Position of the bass note within its chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inversion {
    Root,
    First,
    Second,
}

/// `(candidate - tonic) mod 12`, normalized to 0..12.
pub fn normalized_distance(candidate: i32, tonic: i32) -> u8 {
    (candidate - tonic).rem_euclid(12) as u8
}

/// True if `candidate` lies in the scale built on `tonic`.
pub fn is_in_scale(candidate: Pitch, tonic: Pitch, mode: Mode) -> bool {
    let distance = normalized_distance(candidate as i32, tonic as i32);
    !mode.forbidden_distances().contains(&distance)
}

/// Classify a distance above the tonic as the degree of the chord it roots.
/// Returns `None` for distances that root no chord in the mode.
pub fn interval_to_degree(distance: i32, mode: Mode) -> Option<Degree> {
    let degree = match (mode, distance.rem_euclid(12)) {
        (_, 0) => 1,
        (_, 2) => 2,
        (Mode::Major, 4) => 3,
        (Mode::Minor, 3) => 3,
        (_, 5) => 4,
        (_, 7) => 5,
        (Mode::Major, 9) => 6,
        (Mode::Minor, 8) => 6,
        (Mode::Minor, 10) => 8,
        (_, 11) => 7,
        _ => return None,
    };
    Some(degree)
}

/// A key: tonic pitch class plus mode. Fixed for one harmonization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Pitch class of the tonic (0 = C).
    pub tonic: u8,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: Pitch, mode: Mode) -> Self {
        Key {
            tonic: tonic % 12,
            mode,
        }
    }

    pub fn contains(&self, pitch: Pitch) -> bool {
        is_in_scale(pitch, self.tonic, self.mode)
    }

    /// Degree of the chord `pitch` would root, if any.
    pub fn degree_of(&self, pitch: Pitch) -> Option<Degree> {
        interval_to_degree(pitch as i32 - self.tonic as i32, self.mode)
    }

    /// The pitch sits a semitone below the tonic.
    pub fn is_leading_tone(&self, pitch: Pitch) -> bool {
        self.degree_of(pitch) == Some(LEADING_TONE)
    }

    /// Pitch classes of root, third, and fifth of a degree's triad.
    pub fn chord_tones(&self, degree: Degree) -> Option<[u8; 3]> {
        let offset = self.mode.root_offset(degree)?;
        let [to_third, to_fifth, _] = self.mode.quality(degree)?.stack();
        let root = (self.tonic + offset) % 12;
        Some([root, (root + to_third) % 12, (root + to_third + to_fifth) % 12])
    }

    /// Which chord member the bass note is, or `None` if it is not in the triad.
    pub fn inversion_of(&self, bass: Pitch, degree: Degree) -> Option<Inversion> {
        let tones = self.chord_tones(degree)?;
        match tones.iter().position(|&pc| pc == bass % 12)? {
            0 => Some(Inversion::Root),
            1 => Some(Inversion::First),
            _ => Some(Inversion::Second),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
        ];
        write!(f, "{} {}", NAMES[self.tonic as usize % 12], self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_scale_membership() {
        let in_scale: Vec<u8> = (0..12).filter(|&p| is_in_scale(p, 0, Mode::Major)).collect();
        assert_eq!(in_scale, vec![0, 2, 4, 5, 7, 9, 11]);
    }

    #[test]
    fn test_minor_scale_keeps_both_sevenths() {
        let in_scale: Vec<u8> = (0..12).filter(|&p| is_in_scale(p, 0, Mode::Minor)).collect();
        assert_eq!(in_scale, vec![0, 2, 3, 5, 7, 8, 10, 11]);
    }

    #[test]
    fn test_scale_membership_below_tonic() {
        // A below the D tonic: distance -5 normalizes to 7
        assert!(is_in_scale(9, 14, Mode::Major));
        // C# below D is the leading tone
        assert!(is_in_scale(13, 14, Mode::Minor));
        // D# is a chromatic half step
        assert!(!is_in_scale(15, 14, Mode::Minor));
    }

    #[test]
    fn test_interval_to_degree_major() {
        let expected = [
            Some(1), None, Some(2), None, Some(3), Some(4),
            None, Some(5), None, Some(6), None, Some(7),
        ];
        for (distance, degree) in expected.iter().enumerate() {
            assert_eq!(interval_to_degree(distance as i32, Mode::Major), *degree);
        }
    }

    #[test]
    fn test_interval_to_degree_minor() {
        assert_eq!(interval_to_degree(3, Mode::Minor), Some(3));
        assert_eq!(interval_to_degree(8, Mode::Minor), Some(6));
        assert_eq!(interval_to_degree(10, Mode::Minor), Some(SUBTONIC));
        assert_eq!(interval_to_degree(11, Mode::Minor), Some(LEADING_TONE));
        assert_eq!(interval_to_degree(4, Mode::Minor), None);
        assert_eq!(interval_to_degree(9, Mode::Minor), None);
    }

    #[test]
    fn test_interval_to_degree_normalizes_negative() {
        assert_eq!(interval_to_degree(-5, Mode::Major), Some(DOMINANT));
        assert_eq!(interval_to_degree(-1, Mode::Minor), Some(LEADING_TONE));
        assert_eq!(interval_to_degree(24, Mode::Major), Some(TONIC));
    }

    #[test]
    fn test_chord_tones() {
        let c_major = Key::new(12, Mode::Major);
        assert_eq!(c_major.tonic, 0);
        assert_eq!(c_major.chord_tones(1), Some([0, 4, 7]));
        assert_eq!(c_major.chord_tones(2), Some([2, 5, 9]));
        assert_eq!(c_major.chord_tones(7), Some([11, 2, 5]));
        assert_eq!(c_major.chord_tones(8), None);

        let c_minor = Key::new(0, Mode::Minor);
        assert_eq!(c_minor.chord_tones(5), Some([7, 11, 2])); // raised third
        assert_eq!(c_minor.chord_tones(8), Some([10, 2, 5])); // Bb major
        assert_eq!(c_minor.chord_tones(2), Some([2, 5, 8])); // D diminished
    }

    #[test]
    fn test_inversion_of() {
        let key = Key::new(0, Mode::Major);
        assert_eq!(key.inversion_of(7, 5), Some(Inversion::Root));
        assert_eq!(key.inversion_of(11, 5), Some(Inversion::First));
        assert_eq!(key.inversion_of(14, 5), Some(Inversion::Second));
        assert_eq!(key.inversion_of(0, 5), None);
    }

    #[test]
    fn test_leading_tone() {
        let key = Key::new(2, Mode::Minor);
        assert!(key.is_leading_tone(13));
        assert!(key.is_leading_tone(37));
        assert!(!key.is_leading_tone(12)); // natural seventh
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::new(10, Mode::Major).to_string(), "Bb major");
        assert_eq!(Key::new(21, Mode::Minor).to_string(), "A minor");
    }
}
