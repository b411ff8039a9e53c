//! vectorchord - chord synthesizer steered across a 2D surface

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vectorchord::config::{self, SynthConfig};
use vectorchord::engine::{list_output_devices, Engine, Player, Recorder, Score};
use vectorchord::viz::{self, Performer};

mod cli;

use cli::{Cli, Commands};

const CONFIG_FILE: &str = "vectorchord.yaml";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { config: config_path, log_file } => {
            // The terminal belongs to the UI; logs only go to a file.
            if let Some(path) = &log_file {
                let file = File::create(path)
                    .with_context(|| format!("failed to create log file {:?}", path))?;
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter())
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .init();
            }

            let mut cfg = load_or_default(&config_path)?;
            let mut player = Player::open(&cfg.audio)?;
            cfg.audio.sample_rate = player.sample_rate();

            let mode = viz::detect_input_mode();
            let performer = Performer::new(&cfg, mode);
            let mut engine = Engine::new(cfg);
            engine.activate();
            let tap = engine
                .analyser()
                .context("output bus missing after activation")?;

            let engine = Arc::new(Mutex::new(engine));
            player.start(engine.clone())?;
            info!(device = %player.device_name(), ?mode, "playing");

            let result = viz::run_tui(engine, tap, performer);
            player.stop();
            result?;
        }

        Commands::Record {
            config: config_path,
            output,
            duration,
            chords,
            moves,
        } => {
            init_stderr_logging();
            let cfg = load_or_default(&config_path)?;

            if !(duration > 0.0 && duration.is_finite()) {
                bail!("duration must be a positive number of seconds");
            }
            let mut score = Score::new(duration);
            for key in chords {
                let binding = cfg
                    .chord(key)
                    .with_context(|| format!("no chord bound to key '{}'", key))?;
                score = score.with_chord(binding.clone());
            }
            for step in moves {
                score = score.with_move(step);
            }
            if score.chords().is_empty() {
                warn!("no --chord given, the recording will be silent");
            }

            println!("Recording {:.1} seconds to {:?}...", duration, output);
            for chord in score.chords() {
                println!("  {} {} ({})", chord.key, chord.name, chord.degree);
            }

            let sample_rate = cfg.audio.sample_rate;
            let mut engine = Engine::new(cfg);
            let mut recorder = Recorder::new(&output, sample_rate)?;
            let mut last_second = 0;

            score.render(&mut engine, |sample| {
                recorder.write_sample(sample)?;
                let second = recorder.samples_written() / u64::from(sample_rate);
                if second != last_second {
                    last_second = second;
                    print!("\r  Progress: {}s / {:.0}s", second, duration);
                    std::io::stdout().flush()?;
                }
                Ok(())
            })?;

            let peak = recorder.peak();
            let seconds = recorder.duration_secs();
            recorder.finalize()?;
            println!("\nRecorded {:.2}s to {:?} (peak {:.3})", seconds, output, peak);
        }

        Commands::Devices => {
            init_stderr_logging();
            let devices = list_output_devices()?;

            println!("Output devices:");
            if devices.is_empty() {
                println!("  (none found)");
            }
            for device in devices {
                println!(
                    "  {} {} ({} Hz, {} ch)",
                    if device.is_default { "*" } else { "-" },
                    device.name,
                    device.sample_rate,
                    device.channels
                );
            }
        }

        Commands::Check { config: config_path } => {
            init_stderr_logging();
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Buffer size: {}", cfg.audio.buffer_size);
                    if let Some(device) = &cfg.audio.device {
                        println!("  Device: {}", device);
                    }
                    println!("  Output gain: {:.0}%", cfg.bus.output_gain * 100.0);
                    println!(
                        "  Tone filter: {} Hz, Q {}",
                        cfg.bus.filter_cutoff, cfg.bus.filter_resonance
                    );
                    println!(
                        "  Envelope: attack {} ms, release {} ms",
                        cfg.voice.attack * 1000.0,
                        cfg.voice.release * 1000.0
                    );
                    println!("  Chords: {}", cfg.chords.len());
                    for chord in &cfg.chords {
                        println!(
                            "    - {} {:<5} {} ({:.2} Hz, {})",
                            chord.key, chord.degree, chord.name, chord.frequency, chord.quality
                        );
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            if Path::new(CONFIG_FILE).exists() {
                println!("{} already exists. Not overwriting.", CONFIG_FILE);
            } else {
                std::fs::write(CONFIG_FILE, config::EXAMPLE_CONFIG)?;
                println!("Created {} with example configuration.", CONFIG_FILE);
            }
        }
    }

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Load `path`, falling back to defaults when the file does not exist
fn load_or_default(path: &Path) -> Result<SynthConfig> {
    if path.exists() {
        config::load_config(path).with_context(|| format!("loading {:?}", path))
    } else {
        info!(?path, "config not found, using defaults");
        Ok(SynthConfig::default())
    }
}
