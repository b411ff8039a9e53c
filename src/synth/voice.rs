//! Chord voice
//!
//! One sounding chord: a fixed bank of harmonic slots, a sub generator two
//! octaves below the root and a master envelope. Every parameter change is
//! scheduled on a [`Param`] so nothing jumps between samples.

use super::{DetuneRng, Oscillator, Param, Waveform};
use crate::config::VoiceConfig;
use crate::mapping::{ChordQuality, IntervalSet, MAX_INTERVALS};

/// Harmonic slots per voice
pub const SLOT_COUNT: usize = MAX_INTERVALS;

/// Lifecycle of a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoicePhase {
    /// Envelope ramping up
    Attacking,
    /// Envelope at full level
    Sustaining,
    /// Envelope decaying, generators stop at the end of the window
    Releasing,
    /// Generators stopped
    Disposed,
}

/// An oscillator with an automatable frequency and a start/stop window
#[derive(Debug, Clone)]
struct Generator {
    osc: Oscillator,
    frequency: Param,
    start: f64,
    stop: Option<f64>,
}

impl Generator {
    fn new(osc: Oscillator, start: f64) -> Self {
        let frequency = Param::new(osc.frequency());
        Self {
            osc,
            frequency,
            start,
            stop: None,
        }
    }

    fn render(&mut self, time: f64) -> f64 {
        if time < self.start || self.stop.is_some_and(|stop| time >= stop) {
            return 0.0;
        }
        let frequency = self.frequency.advance(time);
        self.osc.set_frequency(frequency);
        self.osc.generate()
    }
}

/// One chord-slot: generator plus its own gain
#[derive(Debug, Clone)]
struct HarmonicSlot {
    generator: Generator,
    gain: Param,
}

/// A sounding chord instance
#[derive(Debug, Clone)]
pub struct ChordVoice {
    key: String,
    root: f64,
    quality: ChordQuality,
    slots: [HarmonicSlot; SLOT_COUNT],
    sub: Generator,
    sub_gain: Param,
    envelope: Param,
    shape: Option<IntervalSet>,
    phase: VoicePhase,
    attack_end: f64,
    stop_time: Option<f64>,
    settings: VoiceConfig,
}

impl ChordVoice {
    /// Start a voice at `now`.
    ///
    /// All slots start muted at the root; call [`retune`](Self::retune) to
    /// give the voice its shape.
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        key: impl Into<String>,
        root: f64,
        quality: ChordQuality,
        sub_enabled: bool,
        now: f64,
        sample_rate: f64,
        settings: &VoiceConfig,
        rng: &mut DetuneRng,
    ) -> Self {
        let slots = std::array::from_fn(|i| {
            // Root slot is a plain triangle; the rest are spread saws.
            let osc = if i == 0 {
                Oscillator::new(Waveform::Triangle, root, sample_rate)
            } else {
                Oscillator::new(Waveform::Saw, root, sample_rate)
                    .with_detune(rng.next_offset() * settings.detune_cents)
            };
            HarmonicSlot {
                generator: Generator::new(osc, now),
                gain: Param::new(0.0),
            }
        });

        let sub = Generator::new(Oscillator::new(Waveform::Saw, root / 4.0, sample_rate), now);
        let mut sub_gain = Param::new(0.0);
        sub_gain.set_value_at_time(sub_target(sub_enabled, settings), now);

        let mut envelope = Param::new(0.0);
        envelope.set_value_at_time(0.0, now);
        envelope.linear_ramp_to_value_at_time(1.0, now + settings.attack);

        Self {
            key: key.into(),
            root,
            quality,
            slots,
            sub,
            sub_gain,
            envelope,
            shape: None,
            phase: VoicePhase::Attacking,
            attack_end: now + settings.attack,
            stop_time: None,
            settings: settings.clone(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Root frequency in Hz
    pub fn root(&self) -> f64 {
        self.root
    }

    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    pub fn phase(&self) -> VoicePhase {
        self.phase
    }

    /// Shape applied by the last retune
    pub fn shape(&self) -> Option<IntervalSet> {
        self.shape
    }

    /// Time at which the generators stop, once released
    pub fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    /// Scheduled frequency of a harmonic slot at `time`
    pub fn slot_frequency(&self, slot: usize, time: f64) -> Option<f64> {
        self.slots.get(slot).map(|s| s.generator.frequency.value_at(time))
    }

    /// Scheduled gain of a harmonic slot at `time`
    pub fn slot_gain(&self, slot: usize, time: f64) -> Option<f64> {
        self.slots.get(slot).map(|s| s.gain.value_at(time))
    }

    /// Detune of a harmonic slot in cents
    pub fn slot_detune(&self, slot: usize) -> Option<f64> {
        self.slots.get(slot).map(|s| s.generator.osc.detune())
    }

    /// Sub generator frequency
    pub fn sub_frequency(&self) -> f64 {
        self.sub.frequency.value_at(self.sub.start)
    }

    /// Scheduled sub gain at `time`
    pub fn sub_gain(&self, time: f64) -> f64 {
        self.sub_gain.value_at(time)
    }

    /// Scheduled envelope level at `time`
    pub fn envelope(&self, time: f64) -> f64 {
        self.envelope.value_at(time)
    }

    /// Apply a chord shape at `now`.
    ///
    /// Returns `false` without scheduling anything when the shape is the one
    /// already applied. The first shape places slot pitches directly; later
    /// shapes glide.
    pub fn retune(&mut self, shape: IntervalSet, now: f64) -> bool {
        if self.shape == Some(shape) {
            return false;
        }
        let first = self.shape.is_none();
        let glide = self.settings.glide;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            match shape.frequency(i, self.root) {
                Some(frequency) => {
                    if first {
                        slot.generator.frequency.set_value_at_time(frequency, now);
                    } else {
                        slot.generator.frequency.set_target_at_time(frequency, now, glide);
                    }
                    slot.gain
                        .set_target_at_time(self.settings.harmonic_level, now, glide);
                }
                None => slot.gain.set_target_at_time(0.0, now, glide),
            }
        }

        self.shape = Some(shape);
        true
    }

    /// Glide the sub gain toward its enabled or disabled level
    pub fn set_sub_enabled(&mut self, enabled: bool, now: f64) {
        let target = sub_target(enabled, &self.settings);
        self.sub_gain
            .set_target_at_time(target, now, self.settings.sub_time_constant);
    }

    /// Begin the release window at `now`.
    ///
    /// Pending envelope automation is cancelled first so nothing scheduled
    /// earlier can lift the level again.
    pub fn release(&mut self, now: f64) {
        if matches!(self.phase, VoicePhase::Releasing | VoicePhase::Disposed) {
            return;
        }
        let end = now + self.settings.release;
        self.envelope.cancel_and_hold_at_time(now);
        self.envelope
            .exponential_ramp_to_value_at_time(self.settings.release_floor, end);

        let stop = end + self.settings.stop_margin;
        for slot in &mut self.slots {
            slot.generator.stop = Some(stop);
        }
        self.sub.stop = Some(stop);
        self.stop_time = Some(stop);
        self.phase = VoicePhase::Releasing;
    }

    /// Whether the voice has stopped for good
    pub fn is_disposed(&self) -> bool {
        self.phase == VoicePhase::Disposed
    }

    /// Render one sample at `time`
    pub fn render(&mut self, time: f64) -> f64 {
        self.update_phase(time);
        if self.phase == VoicePhase::Disposed {
            return 0.0;
        }

        let mut sum = 0.0;
        for slot in &mut self.slots {
            let gain = slot.gain.advance(time);
            sum += slot.generator.render(time) * gain;
        }
        let sub_gain = self.sub_gain.advance(time);
        sum += self.sub.render(time) * sub_gain;

        sum * self.envelope.advance(time)
    }

    fn update_phase(&mut self, time: f64) {
        match self.phase {
            VoicePhase::Attacking if time >= self.attack_end => {
                self.phase = VoicePhase::Sustaining;
            }
            VoicePhase::Releasing if self.stop_time.is_some_and(|stop| time >= stop) => {
                self.phase = VoicePhase::Disposed;
            }
            _ => {}
        }
    }
}

fn sub_target(enabled: bool, settings: &VoiceConfig) -> f64 {
    if enabled {
        settings.sub_level
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{intervals, shape, Zone};

    const SR: f64 = 44100.0;

    fn voice(quality: ChordQuality, sub: bool) -> ChordVoice {
        let mut rng = DetuneRng::new(7);
        ChordVoice::start("j", 261.63, quality, sub, 0.0, SR, &VoiceConfig::default(), &mut rng)
    }

    fn render_until(voice: &mut ChordVoice, from: f64, to: f64) {
        let mut n = (from * SR) as u64;
        while (n as f64) / SR < to {
            voice.render(n as f64 / SR);
            n += 1;
        }
    }

    #[test]
    fn test_voice_starts_muted_with_sub_two_octaves_down() {
        let v = voice(ChordQuality::Major, false);
        assert_eq!(v.phase(), VoicePhase::Attacking);
        for i in 0..SLOT_COUNT {
            assert_eq!(v.slot_gain(i, 0.0), Some(0.0));
        }
        assert!((v.sub_frequency() - 261.63 / 4.0).abs() < 1e-9);
        assert_eq!(v.sub_gain(0.0), 0.0);
        assert_eq!(v.envelope(0.0), 0.0);
        assert!((v.envelope(0.01) - 0.5).abs() < 1e-9);
        assert_eq!(v.envelope(0.02), 1.0);
    }

    #[test]
    fn test_sub_level_follows_flag_at_start() {
        let v = voice(ChordQuality::Minor, true);
        assert_eq!(v.sub_gain(0.0), 0.35);
    }

    #[test]
    fn test_root_slot_is_not_detuned() {
        let v = voice(ChordQuality::Major, false);
        assert_eq!(v.slot_detune(0), Some(0.0));
        for i in 1..SLOT_COUNT {
            let cents = v.slot_detune(i).unwrap();
            assert!(cents.abs() <= 7.5);
        }
    }

    #[test]
    fn test_first_retune_places_pitches() {
        let mut v = voice(ChordQuality::Major, false);
        assert!(v.retune(intervals(ChordQuality::Major, 0.0, 0.0), 0.0));

        let f = 261.63;
        assert!((v.slot_frequency(0, 0.0).unwrap() - f).abs() < 1e-9);
        assert!((v.slot_frequency(1, 0.0).unwrap() - f * 2f64.powf(4.0 / 12.0)).abs() < 1e-9);
        assert!((v.slot_frequency(2, 0.0).unwrap() - f * 2f64.powf(7.0 / 12.0)).abs() < 1e-9);

        // Gains glide up, the unused slot stays silent
        let early = v.slot_gain(0, 0.01).unwrap();
        assert!(early > 0.0 && early < 0.3);
        assert!((v.slot_gain(0, 1.0).unwrap() - 0.3).abs() < 1e-6);
        assert!(v.slot_gain(3, 1.0).unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_retune_glides_and_skips_repeats() {
        let mut v = voice(ChordQuality::Major, false);
        v.retune(shape(ChordQuality::Major, Zone::Center), 0.0);
        assert!(!v.retune(shape(ChordQuality::Major, Zone::Center), 0.1));

        assert!(v.retune(shape(ChordQuality::Major, Zone::Right), 0.5));
        let target = 261.63 * 2f64.powf(11.0 / 12.0);
        let mid = v.slot_frequency(3, 0.52).unwrap();
        assert!(mid > 261.63 && mid < target);
        assert!((v.slot_frequency(3, 2.0).unwrap() - target).abs() < 1e-6);
        assert!((v.slot_gain(3, 2.0).unwrap() - 0.3).abs() < 1e-6);

        // Back to a triad mutes slot 3 but keeps its pitch
        v.retune(shape(ChordQuality::Major, Zone::Center), 2.0);
        assert!(v.slot_gain(3, 4.0).unwrap() < 1e-6);
        assert!((v.slot_frequency(3, 4.0).unwrap() - target).abs() < 1e-6);
    }

    #[test]
    fn test_sub_toggle_glides() {
        let mut v = voice(ChordQuality::Major, false);
        v.set_sub_enabled(true, 1.0);
        let mid = v.sub_gain(1.05);
        assert!(mid > 0.0 && mid < 0.35);
        assert!((v.sub_gain(3.0) - 0.35).abs() < 1e-6);

        v.set_sub_enabled(false, 3.0);
        let mid = v.sub_gain(3.05);
        assert!(mid > 0.0 && mid < 0.35);
        assert!(v.sub_gain(6.0) < 1e-6);
    }

    #[test]
    fn test_phase_transitions() {
        let mut v = voice(ChordQuality::Major, false);
        v.retune(intervals(ChordQuality::Major, 0.0, 0.0), 0.0);

        render_until(&mut v, 0.0, 0.03);
        assert_eq!(v.phase(), VoicePhase::Sustaining);

        v.release(0.03);
        assert_eq!(v.phase(), VoicePhase::Releasing);
        assert!((v.stop_time().unwrap() - 0.28).abs() < 1e-9);

        render_until(&mut v, 0.03, 0.2);
        assert_eq!(v.phase(), VoicePhase::Releasing);

        render_until(&mut v, 0.2, 0.3);
        assert!(v.is_disposed());
        assert_eq!(v.render(0.31), 0.0);
    }

    #[test]
    fn test_release_cancels_attack_and_decays() {
        let mut v = voice(ChordQuality::Major, false);
        // Release halfway through the attack
        v.release(0.01);
        let held = v.envelope(0.01);
        assert!((held - 0.5).abs() < 1e-9);
        assert!(v.envelope(0.1) < held);
        assert!(v.envelope(0.21) > 0.0);
        assert!((v.envelope(0.21) - 0.001).abs() < 1e-9);
        // Never revived by the cancelled attack ramp
        assert!(v.envelope(1.0) < 0.01);
    }

    #[test]
    fn test_double_release_is_ignored() {
        let mut v = voice(ChordQuality::Major, false);
        v.release(0.05);
        let stop = v.stop_time();
        v.release(0.1);
        assert_eq!(v.stop_time(), stop);
    }

    #[test]
    fn test_voice_produces_audio() {
        let mut v = voice(ChordQuality::Major, true);
        v.retune(intervals(ChordQuality::Major, 0.0, 0.0), 0.0);
        let mut peak = 0.0f64;
        for n in 0..4410 {
            peak = peak.max(v.render(n as f64 / SR).abs());
        }
        assert!(peak > 0.05, "peak {}", peak);
    }
}
