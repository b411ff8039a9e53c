//! Voice bookkeeping: active voices by trigger key plus releasing tails

use std::collections::HashMap;

use tracing::debug;

use crate::config::VoiceConfig;
use crate::mapping::{intervals, ChordQuality};
use crate::synth::{ChordVoice, DetuneRng};

/// Seed for the detune spread
const DETUNE_SEED: u64 = 0x5eed_c40d;

/// Owns every sounding voice.
///
/// Released voices move out of the active map into `tails` immediately, so
/// the same key can be attacked again while the old chord fades.
#[derive(Debug)]
pub struct VoiceManager {
    active: HashMap<String, ChordVoice>,
    tails: Vec<ChordVoice>,
    sub_enabled: bool,
    settings: VoiceConfig,
    sample_rate: f64,
    rng: DetuneRng,
}

impl VoiceManager {
    pub fn new(settings: VoiceConfig, sample_rate: f64) -> Self {
        Self {
            active: HashMap::new(),
            tails: Vec::new(),
            sub_enabled: false,
            settings,
            sample_rate,
            rng: DetuneRng::new(DETUNE_SEED),
        }
    }

    /// Start a voice and shape it for the current modulation.
    ///
    /// Returns `false` when the key already sounds or `root` is not a
    /// positive finite frequency.
    pub fn attack(
        &mut self,
        key: &str,
        root: f64,
        quality: ChordQuality,
        modulation: (f64, f64),
        now: f64,
    ) -> bool {
        if !root.is_finite() || root <= 0.0 {
            debug!(key, root, "attack ignored, invalid root frequency");
            return false;
        }
        if self.active.contains_key(key) {
            debug!(key, "attack ignored, voice already active");
            return false;
        }
        let mut voice = ChordVoice::start(
            key,
            root,
            quality,
            self.sub_enabled,
            now,
            self.sample_rate,
            &self.settings,
            &mut self.rng,
        );
        let (x, y) = modulation;
        voice.retune(intervals(quality, x, y), now);
        debug!(key, root, %quality, "voice attack");
        self.active.insert(key.to_string(), voice);
        true
    }

    /// Release the voice bound to `key`. Returns `false` for unknown keys.
    pub fn release(&mut self, key: &str, now: f64) -> bool {
        match self.active.remove(key) {
            Some(mut voice) => {
                voice.release(now);
                debug!(key, stop = voice.stop_time(), "voice release");
                self.tails.push(voice);
                true
            }
            None => {
                debug!(key, "release ignored, no active voice");
                false
            }
        }
    }

    /// Retune every active voice for a new modulation position
    pub fn retune_all(&mut self, x: f64, y: f64, now: f64) -> usize {
        let mut changed = 0;
        for voice in self.active.values_mut() {
            if voice.retune(intervals(voice.quality(), x, y), now) {
                changed += 1;
            }
        }
        changed
    }

    /// Update the sub flag and glide every active voice's sub gain
    pub fn set_sub_enabled(&mut self, enabled: bool, now: f64) {
        self.sub_enabled = enabled;
        for voice in self.active.values_mut() {
            voice.set_sub_enabled(enabled, now);
        }
    }

    pub fn sub_enabled(&self) -> bool {
        self.sub_enabled
    }

    pub fn get(&self, key: &str) -> Option<&ChordVoice> {
        self.active.get(key)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn tail_count(&self) -> usize {
        self.tails.len()
    }

    /// Mix all voices at `time`, dropping tails that have stopped
    pub fn render(&mut self, time: f64) -> f64 {
        let mut sum: f64 = self.active.values_mut().map(|v| v.render(time)).sum();
        sum += self.tails.iter_mut().map(|v| v.render(time)).sum::<f64>();
        self.tails.retain(|v| !v.is_disposed());
        sum
    }
}
