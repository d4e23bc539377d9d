// LilyPond sheet music output for finished chorales.
//
// Produces a .ly file with the four voices on separate staves of a
// ChoirStaff. Every chord is a half note in 4/4, so a bar holds two chords.
// The roman numerals are attached under the bass staff with \addlyrics, one
// syllable per chord.
//
// Uses absolute pitches (not \relative) so each note is spelled
// independently of its neighbours.

use std::fmt::Write;
use std::path::Path;

use crate::chorale::Chorale;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::key::{Key, Mode};
use crate::voice::{MIDI_OFFSET, Pitch, Voice};

/// Pitch class names in LilyPond notation (indexed by pitch class 0-11).
const LY_PITCH_NAMES: [&str; 12] = [
    "c", "cis", "d", "ees", "e", "f", "fis", "g", "aes", "a", "bes", "b",
];

/// Convert a key number to a LilyPond absolute pitch string.
///
/// LilyPond's `c` with no octave marks is MIDI 48 (C3), which is key 12.
pub fn key_to_ly_note(pitch: Pitch) -> String {
    let midi = i16::from(pitch) + i16::from(MIDI_OFFSET);
    let octave = midi / 12 - 4;
    let mut result = LY_PITCH_NAMES[(midi % 12) as usize].to_string();
    let mark = if octave > 0 { '\'' } else { ',' };
    for _ in 0..octave.unsigned_abs() {
        result.push(mark);
    }
    result
}

/// `\key` command for a key.
pub fn ly_key(key: &Key) -> String {
    let mode = match key.mode {
        Mode::Major => "major",
        Mode::Minor => "minor",
    };
    format!("\\key {} \\{}", LY_PITCH_NAMES[key.tonic as usize % 12], mode)
}

fn render_part(chorale: &Chorale, voice: Voice) -> String {
    chorale
        .part(voice)
        .iter()
        .map(|&pitch| format!("{}2", key_to_ly_note(pitch)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_numerals(chorale: &Chorale) -> String {
    chorale
        .numerals()
        .iter()
        .map(|numeral| format!("\"{numeral}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate a complete LilyPond file for a chorale.
pub fn chorale_to_lilypond(chorale: &Chorale, export: &ExportConfig) -> String {
    let mut ly = String::new();

    ly.push_str("\\version \"2.24.0\"\n\n");
    let title = export.title.replace('"', "\\\"");
    let _ = write!(
        ly,
        "\\header {{\n  title = \"{}\"\n  subtitle = \"{}\"\n}}\n\n",
        title, chorale.key
    );
    let _ = write!(
        ly,
        "global = {{\n  {} \\time 4/4 \\tempo 2 = {}\n}}\n\n",
        ly_key(&chorale.key),
        export.tempo_bpm
    );

    let variables = ["soprano", "alto", "tenor", "bass"];
    for voice in Voice::ALL {
        let _ = write!(
            ly,
            "{} = \\absolute {{\n  \\global\n  {}\n}}\n\n",
            variables[voice.index()],
            render_part(chorale, voice)
        );
    }

    ly.push_str("\\score {\n  \\new ChoirStaff <<\n");
    let clefs = ["treble", "treble", "\"treble_8\"", "bass"];
    for voice in Voice::ALL {
        let _ = writeln!(
            ly,
            concat!(
                "    \\new Staff = \"{name}\" \\with {{ instrumentName = \"{name}\" }} {{\n",
                "      \\clef {}\n",
                "      \\{}\n",
                "    }}",
            ),
            clefs[voice.index()],
            variables[voice.index()],
            name = voice.name(),
        );
    }
    let _ = writeln!(ly, "    \\addlyrics {{ {} }}", render_numerals(chorale));
    ly.push_str("  >>\n");
    ly.push_str("  \\layout { }\n");
    ly.push_str("  \\midi { }\n");
    ly.push_str("}\n");

    ly
}

/// Write a LilyPond file for a chorale.
pub fn write_lilypond(
    chorale: &Chorale,
    export: &ExportConfig,
    path: &Path,
) -> Result<(), ExportError> {
    let ly = chorale_to_lilypond(chorale, export);
    std::fs::write(path, ly).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
