//! Configuration schema definitions

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::mapping::ChordQuality;

/// Keys reserved for the modulation controller and global toggles
pub const RESERVED_KEYS: [char; 5] = ['w', 'a', 's', 'd', 'b'];

/// Main configuration for vectorchord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Shared output chain
    #[serde(default)]
    pub bus: BusConfig,

    /// Per-voice envelope and glide settings
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Modulation controller physics
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Chord trigger bindings
    #[serde(default = "default_chords")]
    pub chords: Vec<ChordBinding>,
}

impl SynthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let audio = &self.audio;
        check(
            (8000..=192000).contains(&audio.sample_rate),
            "audio.sample_rate",
            "must be between 8000 and 192000",
        )?;
        check(
            (64..=8192).contains(&audio.buffer_size),
            "audio.buffer_size",
            "must be between 64 and 8192",
        )?;

        let bus = &self.bus;
        check(
            (0.0..=1.0).contains(&bus.output_gain),
            "bus.output_gain",
            "must be between 0.0 and 1.0",
        )?;
        check(
            bus.filter_cutoff >= 20.0 && bus.filter_cutoff < audio.sample_rate as f64 / 2.0,
            "bus.filter_cutoff",
            "must be between 20 Hz and Nyquist",
        )?;
        check(
            (0.1..=20.0).contains(&bus.filter_resonance),
            "bus.filter_resonance",
            "must be between 0.1 and 20",
        )?;
        check(
            bus.analyser_size.is_power_of_two() && (32..=32768).contains(&bus.analyser_size),
            "bus.analyser_size",
            "must be a power of two between 32 and 32768",
        )?;

        let voice = &self.voice;
        for (field, value) in [
            ("voice.attack", voice.attack),
            ("voice.release", voice.release),
            ("voice.glide", voice.glide),
            ("voice.sub_time_constant", voice.sub_time_constant),
        ] {
            check(value > 0.0 && value <= 10.0, field, "must be between 0 and 10 seconds")?;
        }
        check(
            voice.release_floor > 0.0 && voice.release_floor < 1.0,
            "voice.release_floor",
            "must be above 0.0 and below 1.0",
        )?;
        check(voice.stop_margin >= 0.0, "voice.stop_margin", "must not be negative")?;
        check(
            (0.0..=1.0).contains(&voice.harmonic_level),
            "voice.harmonic_level",
            "must be between 0.0 and 1.0",
        )?;
        check(
            (0.0..=1.0).contains(&voice.sub_level),
            "voice.sub_level",
            "must be between 0.0 and 1.0",
        )?;
        check(
            (0.0..=100.0).contains(&voice.detune_cents),
            "voice.detune_cents",
            "must be between 0 and 100",
        )?;

        let controller = &self.controller;
        check(
            controller.smoothing > 0.0 && controller.smoothing <= 1.0,
            "controller.smoothing",
            "must be above 0.0 and at most 1.0",
        )?;
        check(
            controller.snap >= 0.0 && controller.snap < 0.5,
            "controller.snap",
            "must be between 0.0 and 0.5",
        )?;
        check(
            (1..=1000).contains(&controller.rate_hz),
            "controller.rate_hz",
            "must be between 1 and 1000",
        )?;

        for (i, chord) in self.chords.iter().enumerate() {
            if chord.frequency < 20.0 || chord.frequency > 8000.0 {
                return Err(ConfigError::Invalid {
                    field: format!("chords[{}].frequency", i),
                    reason: "must be between 20 and 8000 Hz".to_string(),
                });
            }
            if chord.key.is_uppercase() {
                return Err(ConfigError::Invalid {
                    field: format!("chords[{}].key", i),
                    reason: format!("'{}' must be lowercase", chord.key),
                });
            }
            if RESERVED_KEYS.contains(&chord.key.to_ascii_lowercase()) {
                return Err(ConfigError::Invalid {
                    field: format!("chords[{}].key", i),
                    reason: format!("'{}' is reserved for the controller", chord.key),
                });
            }
            if self.chords[..i].iter().any(|c| c.key == chord.key) {
                return Err(ConfigError::Invalid {
                    field: format!("chords[{}].key", i),
                    reason: format!("'{}' is bound twice", chord.key),
                });
            }
        }

        Ok(())
    }

    /// Binding for a trigger key
    pub fn chord(&self, key: char) -> Option<&ChordBinding> {
        self.chords.iter().find(|c| c.key == key)
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            bus: BusConfig::default(),
            voice: VoiceConfig::default(),
            controller: ControllerConfig::default(),
            chords: default_chords(),
        }
    }
}

fn check(ok: bool, field: &str, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// Audio output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Buffer size in samples (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }

/// Output bus settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Fixed output level (default: 0.4)
    #[serde(default = "default_output_gain")]
    pub output_gain: f64,

    /// Tone filter cutoff in Hz (default: 3000)
    #[serde(default = "default_filter_cutoff")]
    pub filter_cutoff: f64,

    /// Tone filter Q (default: 0.707)
    #[serde(default = "default_filter_resonance")]
    pub filter_resonance: f64,

    /// Samples held by the analysis tap (default: 2048)
    #[serde(default = "default_analyser_size")]
    pub analyser_size: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            output_gain: default_output_gain(),
            filter_cutoff: default_filter_cutoff(),
            filter_resonance: default_filter_resonance(),
            analyser_size: default_analyser_size(),
        }
    }
}

fn default_output_gain() -> f64 { 0.4 }
fn default_filter_cutoff() -> f64 { 3000.0 }
fn default_filter_resonance() -> f64 { 0.707 }
fn default_analyser_size() -> usize { 2048 }

/// Voice envelope, glide and level settings (times in seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Envelope attack (default: 0.02)
    #[serde(default = "default_attack")]
    pub attack: f64,

    /// Envelope release (default: 0.2)
    #[serde(default = "default_release")]
    pub release: f64,

    /// Level the release ramp decays to (default: 0.001)
    #[serde(default = "default_release_floor")]
    pub release_floor: f64,

    /// Extra time after the release before generators stop (default: 0.05)
    #[serde(default = "default_stop_margin")]
    pub stop_margin: f64,

    /// Time constant of frequency and slot gain glides (default: 0.05)
    #[serde(default = "default_glide")]
    pub glide: f64,

    /// Gain of a sounding chord slot (default: 0.3)
    #[serde(default = "default_harmonic_level")]
    pub harmonic_level: f64,

    /// Gain of the sub generator when enabled (default: 0.35)
    #[serde(default = "default_sub_level")]
    pub sub_level: f64,

    /// Time constant of the sub gain toggle (default: 0.1)
    #[serde(default = "default_sub_time_constant")]
    pub sub_time_constant: f64,

    /// Total detune spread of the upper slots in cents (default: 15)
    #[serde(default = "default_detune_cents")]
    pub detune_cents: f64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            attack: default_attack(),
            release: default_release(),
            release_floor: default_release_floor(),
            stop_margin: default_stop_margin(),
            glide: default_glide(),
            harmonic_level: default_harmonic_level(),
            sub_level: default_sub_level(),
            sub_time_constant: default_sub_time_constant(),
            detune_cents: default_detune_cents(),
        }
    }
}

fn default_attack() -> f64 { 0.02 }
fn default_release() -> f64 { 0.2 }
fn default_release_floor() -> f64 { 0.001 }
fn default_stop_margin() -> f64 { 0.05 }
fn default_glide() -> f64 { 0.05 }
fn default_harmonic_level() -> f64 { 0.3 }
fn default_sub_level() -> f64 { 0.35 }
fn default_sub_time_constant() -> f64 { 0.1 }
fn default_detune_cents() -> f64 { 15.0 }

/// Modulation controller physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Fraction of the remaining distance covered per tick (default: 0.15)
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,

    /// Distance under which the position snaps to target (default: 0.001)
    #[serde(default = "default_snap")]
    pub snap: f64,

    /// Tick rate in Hz (default: 60)
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            smoothing: default_smoothing(),
            snap: default_snap(),
            rate_hz: default_rate_hz(),
        }
    }
}

fn default_smoothing() -> f64 { 0.15 }
fn default_snap() -> f64 { 0.001 }
fn default_rate_hz() -> u32 { 60 }

/// A trigger key bound to a chord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordBinding {
    /// Keyboard key
    pub key: char,

    /// Scale degree label, e.g. "ii"
    #[serde(default)]
    pub degree: String,

    /// Display name, e.g. "D min"
    #[serde(default)]
    pub name: String,

    /// Root frequency in Hz
    pub frequency: f64,

    /// Base chord quality
    pub quality: ChordQuality,
}

impl ChordBinding {
    fn new(key: char, degree: &str, name: &str, frequency: f64, quality: ChordQuality) -> Self {
        Self {
            key,
            degree: degree.to_string(),
            name: name.to_string(),
            frequency,
            quality,
        }
    }

    /// Trigger identity used by the engine
    pub fn trigger_key(&self) -> String {
        self.key.to_string()
    }
}

/// Diatonic triads of C major on the right-hand home and upper rows
fn default_chords() -> Vec<ChordBinding> {
    use ChordQuality::*;
    vec![
        ChordBinding::new('j', "I", "C Maj", 261.63, Major),
        ChordBinding::new('k', "ii", "D min", 293.66, Minor),
        ChordBinding::new('l', "iii", "E min", 329.63, Minor),
        ChordBinding::new(';', "IV", "F Maj", 349.23, Major),
        ChordBinding::new('u', "V", "G Maj", 392.00, Major),
        ChordBinding::new('i', "vi", "A min", 440.00, Minor),
        ChordBinding::new('o', "vii°", "B dim", 493.88, Diminished),
    ]
}
