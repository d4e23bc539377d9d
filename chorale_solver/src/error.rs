// Error types for the chorale solver.
//
// Two families live here. `InputError` and `ConfigError` describe bad data
// coming in from outside (a malformed bass line, an unreadable config file)
// and are rejected before any search runs. `HarmonizeError` is different:
// its variants are the ordinary negative outcomes of an exhaustive search
// over a well-formed bass line, not faults. `ExportError` covers writing a
// finished chorale to disk.

use std::path::PathBuf;

use thiserror::Error;

use crate::progression::Progression;
use crate::voice::Pitch;

/// A bass line that cannot be handed to the solvers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("bass line needs at least 3 notes, got {len}")]
    TooShort { len: usize },
    #[error("note {index} ({pitch}) is outside the bass range 0..=24")]
    OutOfRange { index: usize, pitch: Pitch },
    #[error("note {index} ({pitch}) is not in the scale of the first note")]
    NotInScale { index: usize, pitch: Pitch },
    #[error("bass line must end on the tonic: first note {first}, last note {last}")]
    MismatchedEnds { first: Pitch, last: Pitch },
    #[error("cannot read {token:?} as a key number or note name")]
    InvalidNote { token: String },
}

/// The search finished without a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarmonizeError {
    #[error("no suitable chord progression found")]
    NoProgression,
    /// A progression exists but none of the tried spacings could be voiced.
    /// The progression is kept so the caller can still show it.
    #[error("no voicing found for the chord progression")]
    NoVoicing { progression: Progression },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("MIDI encode error: {0}")]
    Midi(#[source] std::io::Error),
    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
