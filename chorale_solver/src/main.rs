// Four-Part Chorale Solver: CLI entry point.
//
// Harmonizes a bass line given on the command line and prints the result.
// The pipeline: parse + validate → chord progression → voicing → output.
//
// Usage:
//   chorale solve 0 5 7 0 [--minor] [--config FILE] [--exhaustive]
//     [--allow-parallels] [--max-spacing N] [--json] [--midi OUT.mid]
//     [--ly OUT.ly] [--audit] [--verbose]
//   chorale lookup 13
//   chorale rules
//
// Notes are key numbers (0 = C2 .. 24 = C4 for the bass) or note names such
// as G2 or Bb2. Logs go to stderr (RUST_LOG is honoured); results go to
// stdout.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use chorale_solver::config::HarmonizerConfig;
use chorale_solver::error::HarmonizeError;
use chorale_solver::harmonize::harmonize;
use chorale_solver::input::BassLine;
use chorale_solver::key::Mode;
use chorale_solver::lilypond::write_lilypond;
use chorale_solver::midi::write_midi;
use chorale_solver::rules::{RULES, audit};
use chorale_solver::triads::TriadTable;
use chorale_solver::voice::{parse_pitch, pitch_name};
use chorale_solver::voicing::SeedStrategy;

#[derive(Parser)]
#[command(name = "chorale")]
#[command(about = "Harmonize a bass line as a four-part chorale")]
#[command(version)]
struct Cli {
    /// Log search progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harmonize a bass line
    Solve {
        /// Bass notes: key numbers or note names, first and last on the tonic
        #[arg(required = true, num_args = 1..)]
        notes: Vec<String>,

        /// Interpret the bass line in the minor mode
        #[arg(long)]
        minor: bool,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Try every opening spacing when the fixed ones fail
        #[arg(long)]
        exhaustive: bool,

        /// Permit parallel fifths and octaves
        #[arg(long)]
        allow_parallels: bool,

        /// Largest soprano-alto and alto-tenor distance in semitones
        #[arg(long)]
        max_spacing: Option<u8>,

        /// Print the chorale as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Write a MIDI file
        #[arg(long)]
        midi: Option<PathBuf>,

        /// Write a LilyPond file
        #[arg(long)]
        ly: Option<PathBuf>,

        /// Re-check the result against every rule
        #[arg(long)]
        audit: bool,
    },

    /// Show the note name for a key number (or the key number for a name)
    Lookup {
        /// Key number 0-43, or a note name such as C#3
        key: String,
    },

    /// List the harmonization rules
    Rules,
}

/// A usable RUST_LOG wins; otherwise warn. `--verbose` adds debug on top.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let from_env = rust_log
        .filter(|spec| !spec.trim().is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok());
    match (from_env, verbose) {
        (Some(filter), false) => filter,
        (Some(filter), true) => filter.add_directive(Level::DEBUG.into()),
        (None, true) => EnvFilter::new("debug"),
        (None, false) => EnvFilter::new("warn"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(cli.verbose, rust_log.as_deref()))
        .init();

    match cli.command {
        Commands::Solve {
            notes,
            minor,
            config,
            exhaustive,
            allow_parallels,
            max_spacing,
            json,
            midi,
            ly,
            audit: run_audit,
        } => {
            let mut config = match config {
                Some(path) => HarmonizerConfig::load(&path)?,
                None => HarmonizerConfig::default(),
            };
            if exhaustive {
                config.voicing.seed_strategy = SeedStrategy::Exhaustive;
            }
            if allow_parallels {
                config.voicing.forbid_parallels = false;
            }
            if max_spacing.is_some() {
                config.voicing.max_upper_spacing = max_spacing;
            }

            let mode = if minor { Mode::Minor } else { Mode::Major };
            let bass = BassLine::parse(&notes.join(" "), mode).context("invalid bass line")?;

            let chorale = match harmonize(&bass, &config) {
                Ok(chorale) => chorale,
                Err(HarmonizeError::NoProgression) => {
                    println!("No suitable chord progression found.");
                    return Ok(());
                }
                Err(HarmonizeError::NoVoicing { progression }) => {
                    let numerals = progression.numerals(bass.notes(), &bass.key());
                    println!("Chord progression: {}", numerals.join(" "));
                    println!("No voicing was found for that chord progression.");
                    return Ok(());
                }
            };

            if json {
                println!("{}", chorale.to_json()?);
            } else {
                print!("{}", chorale.summary());
            }

            if run_audit {
                let table = TriadTable::build(&chorale.key);
                let violations = audit(&chorale, &table, &config.voicing);
                eprintln!("{} violations", violations.len());
                for violation in &violations {
                    eprintln!("  {violation}");
                }
            }
            if let Some(path) = midi {
                write_midi(&chorale, &config.export, &path)?;
                eprintln!("Wrote {}", path.display());
            }
            if let Some(path) = ly {
                write_lilypond(&chorale, &config.export, &path)?;
                eprintln!("Wrote {}", path.display());
            }
        }
        Commands::Lookup { key } => {
            let Ok(pitch) = parse_pitch(&key) else {
                bail!("invalid key number {key:?}: expected 0-43 or a note name");
            };
            println!("{pitch} maps to {}", pitch_name(pitch));
        }
        Commands::Rules => {
            println!("Here are the rules used to generate harmonies:");
            for rule in RULES {
                println!("  {rule}");
            }
        }
    }

    Ok(())
}
