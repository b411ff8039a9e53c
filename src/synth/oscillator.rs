//! Basic oscillator implementation

use std::f64::consts::PI;

/// Waveform types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
    Saw,
    Square,
}

/// A phase-accumulating oscillator
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    phase: f64,
    frequency: f64,
    /// Fixed pitch offset in cents
    detune: f64,
    sample_rate: f64,
}

impl Oscillator {
    /// Create a new oscillator
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Self {
            waveform,
            phase: 0.0,
            frequency,
            detune: 0.0,
            sample_rate,
        }
    }

    /// Set a fixed detune in cents
    pub fn with_detune(mut self, cents: f64) -> Self {
        self.detune = cents;
        self
    }

    /// Set the frequency
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Get the current frequency (before detune)
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Detune in cents
    pub fn detune(&self) -> f64 {
        self.detune
    }

    /// Frequency actually sounding, detune applied
    pub fn effective_frequency(&self) -> f64 {
        if self.detune == 0.0 {
            self.frequency
        } else {
            self.frequency * 2f64.powf(self.detune / 1200.0)
        }
    }

    /// Generate the next sample
    pub fn generate(&mut self) -> f64 {
        let sample = match self.waveform {
            Waveform::Sine => (self.phase * 2.0 * PI).sin(),
            Waveform::Triangle => {
                let p = self.phase;
                if p < 0.25 {
                    4.0 * p
                } else if p < 0.75 {
                    2.0 - 4.0 * p
                } else {
                    4.0 * p - 4.0
                }
            }
            Waveform::Saw => 2.0 * self.phase - 1.0,
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };

        self.phase += self.effective_frequency() / self.sample_rate;
        self.phase -= self.phase.floor();

        sample
    }
}

/// Xorshift generator for per-voice detune spread
#[derive(Debug, Clone)]
pub struct DetuneRng {
    state: u64,
}

impl DetuneRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    /// Uniform value in [-0.5, 0.5)
    pub fn next_offset(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 11) as f64 / (1u64 << 53) as f64 - 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_oscillator() {
        let mut osc = Oscillator::new(Waveform::Sine, 440.0, 44100.0);

        // First sample should be 0 (sin(0))
        let sample = osc.generate();
        assert!((sample - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_square_oscillator() {
        let mut osc = Oscillator::new(Waveform::Square, 1.0, 4.0);

        assert_eq!(osc.generate(), 1.0); // phase 0.0
        assert_eq!(osc.generate(), 1.0); // phase 0.25
        assert_eq!(osc.generate(), -1.0); // phase 0.5
        assert_eq!(osc.generate(), -1.0); // phase 0.75
    }

    #[test]
    fn test_saw_oscillator() {
        let mut osc = Oscillator::new(Waveform::Saw, 1.0, 4.0);

        assert_eq!(osc.generate(), -1.0);
        assert_eq!(osc.generate(), -0.5);
        assert_eq!(osc.generate(), 0.0);
        assert_eq!(osc.generate(), 0.5);
    }

    #[test]
    fn test_triangle_range() {
        let mut osc = Oscillator::new(Waveform::Triangle, 100.0, 44100.0);
        for _ in 0..2000 {
            let s = osc.generate();
            assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_detune() {
        let osc = Oscillator::new(Waveform::Saw, 440.0, 44100.0).with_detune(1200.0);
        assert!((osc.effective_frequency() - 880.0).abs() < 1e-9);
        assert_eq!(osc.frequency(), 440.0);
    }

    #[test]
    fn test_frequency_change() {
        let mut osc = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        assert_eq!(osc.frequency(), 440.0);

        osc.set_frequency(880.0);
        assert_eq!(osc.frequency(), 880.0);
    }

    #[test]
    fn test_detune_rng_range() {
        let mut rng = DetuneRng::new(42);
        let mut sum = 0.0;
        for _ in 0..1000 {
            let v = rng.next_offset();
            assert!((-0.5..0.5).contains(&v));
            sum += v;
        }
        assert!((sum / 1000.0).abs() < 0.05);
    }
}
