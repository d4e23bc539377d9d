// Triad membership table: every keyboard pitch in each diatonic triad.
//
// For each degree of the key, the triad's interval stack (see
// `TriadQuality::stack`) is repeated upward from the root's lowest octave
// until it passes the top of the keyboard. The resulting lists are strictly
// ascending, and position mod 3 identifies the chord member: 0 is the root,
// 1 the third, 2 the fifth. The voicing search relies on both facts; it
// binary-searches the lists and picks seeds by position.
//
// Built once per harmonization from the `Key`; immutable afterwards.

use crate::key::{Degree, Key};
use crate::voice::{KEYBOARD_MAX, Pitch};

/// Chord member at a given table position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Root,
    Third,
    Fifth,
}

impl Member {
    pub fn at(position: usize) -> Member {
        match position % 3 {
            0 => Member::Root,
            1 => Member::Third,
            _ => Member::Fifth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriadTable {
    key: Key,
    /// Indexed by degree; slot 0 and degrees the mode lacks stay empty.
    members: [Vec<Pitch>; 9],
}

impl TriadTable {
    pub fn build(key: &Key) -> Self {
        let mut members: [Vec<Pitch>; 9] = Default::default();
        for &degree in key.mode.degrees() {
            members[degree as usize] = triad_pitches(key, degree);
        }
        TriadTable { key: *key, members }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Ascending pitches of a degree's triad. Empty for unknown degrees.
    pub fn members(&self, degree: Degree) -> &[Pitch] {
        self.members
            .get(degree as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, degree: Degree, pitch: Pitch) -> bool {
        self.members(degree).binary_search(&pitch).is_ok()
    }

    /// Which member of the triad `pitch` is, if it belongs at all.
    pub fn member_of(&self, degree: Degree, pitch: Pitch) -> Option<Member> {
        self.members(degree)
            .binary_search(&pitch)
            .ok()
            .map(Member::at)
    }
}

fn triad_pitches(key: &Key, degree: Degree) -> Vec<Pitch> {
    let (Some(offset), Some(quality)) = (key.mode.root_offset(degree), key.mode.quality(degree))
    else {
        return Vec::new();
    };
    let mut pitches = Vec::new();
    let mut pitch = (key.tonic + offset) % 12;
    for step in quality.stack().iter().cycle() {
        if pitch > KEYBOARD_MAX {
            break;
        }
        pitches.push(pitch);
        pitch += step;
    }
    pitches
}

/// Highest member at or below `pitch`.
pub fn next_lower(members: &[Pitch], pitch: i16) -> Option<Pitch> {
    let split = members.partition_point(|&m| i16::from(m) <= pitch);
    split.checked_sub(1).map(|i| members[i])
}

/// Lowest member at or above `pitch`.
pub fn next_higher(members: &[Pitch], pitch: i16) -> Option<Pitch> {
    let split = members.partition_point(|&m| i16::from(m) < pitch);
    members.get(split).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Mode;

    #[test]
    fn test_c_major_tonic() {
        let table = TriadTable::build(&Key::new(0, Mode::Major));
        assert_eq!(
            table.members(1),
            &[0, 4, 7, 12, 16, 19, 24, 28, 31, 36, 40, 43]
        );
        assert_eq!(table.members(6), &[9, 12, 16, 21, 24, 28, 33, 36, 40]);
        assert!(table.members(8).is_empty());
    }

    #[test]
    fn test_minor_sevenths() {
        let table = TriadTable::build(&Key::new(0, Mode::Minor));
        assert_eq!(table.members(8), &[10, 14, 17, 22, 26, 29, 34, 38, 41]);
        // Bb-D-F: the supertonic is the third, as the progression search reads it
        assert_eq!(table.member_of(8, 14), Some(Member::Third));
        assert_eq!(&table.members(7)[..4], &[11, 14, 17, 23]);
        // V has the raised third
        assert!(table.contains(5, 11));
        assert!(!table.contains(5, 10));
    }

    #[test]
    fn test_high_root_wraps_to_lowest_octave() {
        // B major: the leading-tone chord is rooted on A#, which starts at 10
        let table = TriadTable::build(&Key::new(11, Mode::Major));
        assert_eq!(table.members(7)[0], 10);
    }

    #[test]
    fn test_positions_identify_members() {
        for mode in [Mode::Major, Mode::Minor] {
            for tonic in 0..12 {
                let key = Key::new(tonic, mode);
                let table = TriadTable::build(&key);
                for &degree in mode.degrees() {
                    let tones = key.chord_tones(degree).unwrap();
                    for (i, &p) in table.members(degree).iter().enumerate() {
                        assert_eq!(p % 12, tones[i % 3], "{key} degree {degree} pos {i}");
                        assert_eq!(table.member_of(degree, p), Some(Member::at(i)));
                    }
                }
            }
        }
    }

    #[test]
    fn test_strictly_ascending_and_on_keyboard() {
        for mode in [Mode::Major, Mode::Minor] {
            for tonic in 0..12 {
                let table = TriadTable::build(&Key::new(tonic, mode));
                for &degree in mode.degrees() {
                    let members = table.members(degree);
                    assert!(members.len() >= 9);
                    assert!(members.windows(2).all(|w| w[0] < w[1]));
                    assert!(members.iter().all(|&p| p <= KEYBOARD_MAX));
                    // the next stacked pitch would leave the keyboard
                    assert!(*members.last().unwrap() + 6 > KEYBOARD_MAX);
                }
            }
        }
    }

    #[test]
    fn test_nearest_members() {
        let members = [0, 4, 7, 12, 16, 19];
        assert_eq!(next_lower(&members, 7), Some(7));
        assert_eq!(next_lower(&members, 11), Some(7));
        assert_eq!(next_lower(&members, -3), None);
        assert_eq!(next_higher(&members, 7), Some(7));
        assert_eq!(next_higher(&members, 8), Some(12));
        assert_eq!(next_higher(&members, 20), None);
        assert_eq!(next_higher(&members, -3), Some(0));
    }
}
