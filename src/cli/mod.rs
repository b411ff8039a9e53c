//! CLI interface for vectorchord

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vectorchord::engine::ScoreMove;

/// Chord synthesizer steered across a 2D modulation surface
#[derive(Parser)]
#[command(name = "vectorchord")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play live from the keyboard
    Play {
        /// Configuration file path (defaults apply when missing)
        #[arg(short, long, default_value = "vectorchord.yaml")]
        config: PathBuf,

        /// Write logs to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Render a performance to a WAV file
    Record {
        /// Configuration file path (defaults apply when missing)
        #[arg(short, long, default_value = "vectorchord.yaml")]
        config: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value = "8")]
        duration: f64,

        /// Chord key to hold for the whole take (repeatable)
        #[arg(long = "chord", value_name = "KEY")]
        chords: Vec<char>,

        /// Steer the controller to X,Y at TIME seconds (repeatable)
        #[arg(long = "move", value_name = "TIME:X,Y")]
        moves: Vec<ScoreMove>,
    },

    /// List available audio output devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "vectorchord.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
