// Chord transition graph: which degree may follow which.
//
// Encodes common-practice tonal function. The tonic may move anywhere,
// predominants lead to the dominant, the dominant resolves to I or
// deceptively to vi. Minor keys add one chord, the borrowed major VII
// (degree 8), reachable only from the tonic and resolving only to III.
//
// The table is static; nothing here is computed per request.

use crate::key::{Degree, Mode};

/// Successors indexed by degree, shared by both modes.
const SUCCESSORS: [&[Degree]; 9] = [
    &[],
    &[1, 2, 3, 4, 5, 6, 7],
    &[5, 7],
    &[4, 6],
    &[1, 2, 5],
    &[1, 6],
    &[2, 4],
    &[1, 5],
    &[],
];

const MINOR_TONIC_SUCCESSORS: &[Degree] = &[1, 2, 3, 4, 5, 6, 7, 8];
const SUBTONIC_SUCCESSORS: &[Degree] = &[3];

/// Degrees that may follow `degree` in the given mode.
pub fn successors(mode: Mode, degree: Degree) -> &'static [Degree] {
    match (mode, degree) {
        (Mode::Minor, 1) => MINOR_TONIC_SUCCESSORS,
        (Mode::Minor, 8) => SUBTONIC_SUCCESSORS,
        _ => SUCCESSORS.get(degree as usize).copied().unwrap_or(&[]),
    }
}

pub fn is_legal(mode: Mode, from: Degree, to: Degree) -> bool {
    successors(mode, from).contains(&to)
}

/// Every edge of the graph, in degree order.
pub fn edges(mode: Mode) -> Vec<(Degree, Degree)> {
    mode.degrees()
        .iter()
        .flat_map(|&from| successors(mode, from).iter().map(move |&to| (from, to)))
        .collect()
}
