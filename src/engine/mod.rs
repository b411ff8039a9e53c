//! Audio engine for vectorchord
//!
//! One [`Engine`] value owns the audio clock, the output bus and every voice.
//! Control code calls [`Engine::attack`], [`Engine::release`],
//! [`Engine::set_modulation`] and [`Engine::set_sub_enabled`]; the audio
//! callback calls [`Engine::process`]. None of these fail: redundant or
//! unknown triggers are logged and ignored.

mod bus;
mod clock;
mod player;
mod recorder;
mod score;
mod voices;

pub use bus::{AnalyserTap, OutputBus, SampleBuffer};
pub use clock::{AudioClock, ClockState};
pub use player::{list_output_devices, OutputDeviceInfo, Player, PlayerError};
pub use recorder::Recorder;
pub use score::{Score, ScoreError, ScoreMove};

use tracing::{debug, info};

use crate::config::SynthConfig;
use crate::control::{ModulationPort, ModulationVector};
use crate::mapping::ChordQuality;
use crate::synth::ChordVoice;
use voices::VoiceManager;

/// The synthesis engine
#[derive(Debug)]
pub struct Engine {
    config: SynthConfig,
    clock: AudioClock,
    bus: Option<OutputBus>,
    voices: VoiceManager,
    modulation: ModulationVector,
}

impl Engine {
    /// Create an engine. Nothing sounds until [`activate`](Self::activate).
    pub fn new(config: SynthConfig) -> Self {
        let sample_rate = f64::from(config.audio.sample_rate);
        let voices = VoiceManager::new(config.voice.clone(), sample_rate);
        Self {
            config,
            clock: AudioClock::new(sample_rate),
            bus: None,
            voices,
            modulation: ModulationVector::CENTER,
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f64 {
        self.clock.sample_rate()
    }

    /// Seconds of audio rendered so far
    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn is_active(&self) -> bool {
        self.bus.is_some() && self.clock.is_running()
    }

    /// Build the output bus on first call and resume the clock
    pub fn activate(&mut self) {
        if self.bus.is_none() {
            self.bus = Some(OutputBus::new(&self.config.bus, self.sample_rate()));
            info!(
                sample_rate = self.sample_rate(),
                cutoff = self.config.bus.filter_cutoff,
                "output bus created"
            );
        }
        if !self.clock.is_running() {
            self.clock.resume();
            debug!("audio clock running");
        }
    }

    /// Pause rendering; [`process`](Self::process) yields silence until reactivated
    pub fn suspend(&mut self) {
        self.clock.suspend();
        debug!("audio clock suspended");
    }

    /// Start a chord on `key`.
    ///
    /// Returns `false` if the key already sounds or `root` is not a positive
    /// finite frequency.
    pub fn attack(&mut self, key: &str, root: f64, quality: ChordQuality) -> bool {
        self.activate();
        let now = self.current_time();
        let modulation = (self.modulation.x(), self.modulation.y());
        self.voices.attack(key, root, quality, modulation, now)
    }

    /// Fade out the chord on `key`. Returns `false` if no voice is active there.
    pub fn release(&mut self, key: &str) -> bool {
        let now = self.current_time();
        self.voices.release(key, now)
    }

    /// Move the modulation position and retune every active voice.
    ///
    /// Returns `false` when the clamped position equals the current one.
    pub fn set_modulation(&mut self, x: f64, y: f64) -> bool {
        let next = ModulationVector::new(x, y);
        if next == self.modulation {
            return false;
        }
        self.modulation = next;
        let now = self.current_time();
        let retuned = self.voices.retune_all(next.x(), next.y(), now);
        if retuned > 0 {
            debug!(%next, retuned, "voices retuned");
        }
        true
    }

    pub fn modulation(&self) -> ModulationVector {
        self.modulation
    }

    /// Toggle the sub generator for every active and future voice
    pub fn set_sub_enabled(&mut self, enabled: bool) {
        let now = self.current_time();
        self.voices.set_sub_enabled(enabled, now);
        debug!(enabled, "sub toggled");
    }

    pub fn sub_enabled(&self) -> bool {
        self.voices.sub_enabled()
    }

    /// Active voice bound to `key`
    pub fn voice(&self, key: &str) -> Option<&ChordVoice> {
        self.voices.get(key)
    }

    pub fn active_count(&self) -> usize {
        self.voices.active_count()
    }

    /// Released voices still fading out
    pub fn tail_count(&self) -> usize {
        self.voices.tail_count()
    }

    /// Handle on the bus analysis tap, once activated
    pub fn analyser(&self) -> Option<AnalyserTap> {
        self.bus.as_ref().map(|bus| bus.tap().clone())
    }

    /// Render the next sample
    pub fn process(&mut self) -> f64 {
        if !self.clock.is_running() {
            return 0.0;
        }
        let Some(bus) = self.bus.as_mut() else {
            return 0.0;
        };
        let time = self.clock.tick();
        let mix = self.voices.render(time);
        bus.process(mix)
    }

    /// Fill a buffer with samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }
}

impl ModulationPort for Engine {
    fn push_modulation(&mut self, vector: ModulationVector) {
        self.set_modulation(vector.x(), vector.y());
    }
}
