// MIDI output for finished chorales.
//
// Writes a Standard MIDI File, format 1: a tempo track (carrying the title)
// followed by one track per voice on channels 0-3. Every chord lasts
// `ticks_per_chord` and every note is re-attacked, so held common tones are
// audible as repeated notes. Key numbers shift by `MIDI_OFFSET` (key 0 = C2 =
// MIDI 36).
//
// Uses the `midly` crate for encoding.

use std::path::Path;

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};

use crate::chorale::Chorale;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::voice::{MIDI_OFFSET, Voice};

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

const VELOCITY: u8 = 80;

/// Largest values the SMF fixed-width fields can hold.
const MAX_TEMPO: u32 = (1 << 24) - 1;
const MAX_DELTA: u32 = (1 << 28) - 1;

/// Convert a chorale to MIDI and write it to a file.
pub fn write_midi(
    chorale: &Chorale,
    export: &ExportConfig,
    path: &Path,
) -> Result<(), ExportError> {
    let smf = chorale_to_smf(chorale, export);
    smf.save(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode a chorale as SMF bytes.
pub fn to_midi_bytes(chorale: &Chorale, export: &ExportConfig) -> Result<Vec<u8>, ExportError> {
    let smf = chorale_to_smf(chorale, export);
    let mut buf = Vec::new();
    smf.write_std(&mut buf).map_err(ExportError::Midi)?;
    Ok(buf)
}

fn chorale_to_smf<'a>(chorale: &Chorale, export: &'a ExportConfig) -> Smf<'a> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let tempo_microseconds = (60_000_000 / u32::from(export.tempo_bpm.max(1))).min(MAX_TEMPO);
    smf.tracks.push(vec![
        meta(MetaMessage::TrackName(export.title.as_bytes())),
        meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
        meta(MetaMessage::EndOfTrack),
    ]);

    let program = u7::new(export.program.min(127));
    let length = u28::new(export.ticks_per_chord.min(MAX_DELTA));
    for (channel, voice) in Voice::ALL.iter().enumerate() {
        let channel = u4::new(channel as u8);
        let mut track: Track<'a> = vec![
            meta(MetaMessage::TrackName(voice.name().as_bytes())),
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::ProgramChange { program },
                },
            },
        ];
        for &pitch in chorale.part(*voice) {
            let key = u7::new((pitch + MIDI_OFFSET).min(127));
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key,
                        vel: u7::new(VELOCITY),
                    },
                },
            });
            track.push(TrackEvent {
                delta: length,
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key,
                        vel: u7::new(0),
                    },
                },
            });
        }
        track.push(meta(MetaMessage::EndOfTrack));
        smf.tracks.push(track);
    }

    smf
}

fn meta(message: MetaMessage<'_>) -> TrackEvent<'_> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{Key, Mode};
    use crate::progression::Progression;
    use crate::voicing::Voicing;

    fn cadence() -> Chorale {
        Chorale::new(
            Key::new(0, Mode::Major),
            vec![0, 5, 7, 0],
            Progression {
                degrees: vec![1, 4, 5, 1],
            },
            Voicing {
                soprano: vec![36, 36, 35, 36],
                alto: vec![31, 33, 31, 31],
                tenor: vec![28, 29, 26, 28],
            },
        )
    }

    fn note_ons(track: &Track<'_>) -> Vec<u8> {
        track
            .iter()
            .filter_map(|event| match event.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, .. },
                    ..
                } => Some(key.as_int()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_track_layout() {
        let export = ExportConfig::default();
        let smf = chorale_to_smf(&cadence(), &export);
        // 1 tempo track + 4 voice tracks
        assert_eq!(smf.tracks.len(), 5);
        assert_eq!(smf.header.format, Format::Parallel);
    }

    #[test]
    fn test_notes_shifted_to_midi() {
        let export = ExportConfig::default();
        let bytes = to_midi_bytes(&cadence(), &export).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        // Soprano C5 = key 36 = MIDI 72; bass C2 = MIDI 36
        assert_eq!(note_ons(&smf.tracks[1]), vec![72, 72, 71, 72]);
        assert_eq!(note_ons(&smf.tracks[4]), vec![36, 41, 43, 36]);
    }

    #[test]
    fn test_chord_length_and_tempo() {
        let export = ExportConfig {
            tempo_bpm: 120,
            ticks_per_chord: 480,
            ..ExportConfig::default()
        };
        let smf = chorale_to_smf(&cadence(), &export);
        let total: u32 = smf.tracks[2].iter().map(|e| e.delta.as_int()).sum();
        assert_eq!(total, 4 * 480);
        assert!(smf.tracks[0].iter().any(|e| matches!(
            e.kind,
            TrackEventKind::Meta(MetaMessage::Tempo(t)) if t.as_int() == 500_000
        )));
    }
}
