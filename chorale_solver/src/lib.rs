// Four-Part Chorale Solver
//
// Harmonizes a bass line in a major or minor key as a four-voice chorale
// (soprano, alto, tenor, bass) by common-practice rules. Two deterministic
// backtracking searches do the work: the first assigns a chord to every bass
// note under a chord transition graph, the second voices the three upper
// parts over that progression by nearest-member motion.
//
// Architecture:
// - voice.rs: Pitches on the 44-key keyboard, voice ranges, note names,
//   interval helpers
// - key.rs: Key and mode model (scale membership, degree classification,
//   triad qualities)
// - transitions.rs: Which chord degree may follow which
// - progression.rs: Chord progression search and roman numerals
// - triads.rs: Per-degree triad membership tables and nearest-member lookup
// - rules.rs: Hard voice-leading rules and the whole-chorale audit
// - voicing.rs: Upper-voice search (seeds, stepping, leading-tone handling)
// - input.rs: Bass line parsing and validation
// - chorale.rs: The finished chorale, text summary, JSON output
// - harmonize.rs: The end-to-end pipeline
// - config.rs: JSON configuration
// - midi.rs: MIDI file output
// - lilypond.rs: LilyPond sheet music output
// - error.rs: Error types
//
// Every run is a pure function of the bass line and the config; no state
// survives between harmonizations.

pub mod chorale;
pub mod config;
pub mod error;
pub mod harmonize;
pub mod input;
pub mod key;
pub mod lilypond;
pub mod midi;
pub mod progression;
pub mod rules;
pub mod transitions;
pub mod triads;
pub mod voice;
pub mod voicing;
