//! Biquad low-pass tone filter

use std::f64::consts::PI;

/// Normalized biquad coefficients
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Second-order low-pass filter (RBJ cookbook)
#[derive(Debug, Clone)]
pub struct ToneFilter {
    sample_rate: f64,
    cutoff: f64,
    resonance: f64,

    coeffs: Coefficients,

    // Direct Form II transposed state
    z1: f64,
    z2: f64,
}

impl ToneFilter {
    /// Create a low-pass filter with the given cutoff and Q
    pub fn new(sample_rate: f64, cutoff: f64, resonance: f64) -> Self {
        let mut filter = Self {
            sample_rate,
            cutoff: 0.0,
            resonance: 0.0,
            coeffs: Coefficients {
                b0: 1.0,
                b1: 0.0,
                b2: 0.0,
                a1: 0.0,
                a2: 0.0,
            },
            z1: 0.0,
            z2: 0.0,
        };
        filter.cutoff = filter.clamp_cutoff(cutoff);
        filter.resonance = resonance.clamp(0.1, 20.0);
        filter.calculate_coefficients();
        filter
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn resonance(&self) -> f64 {
        self.resonance
    }

    fn clamp_cutoff(&self, hz: f64) -> f64 {
        hz.clamp(20.0, self.sample_rate * 0.45)
    }

    fn calculate_coefficients(&mut self) {
        let omega = 2.0 * PI * self.cutoff / self.sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * self.resonance);

        let a0 = 1.0 + alpha;
        self.coeffs = Coefficients {
            b0: (1.0 - cos_omega) / 2.0 / a0,
            b1: (1.0 - cos_omega) / a0,
            b2: (1.0 - cos_omega) / 2.0 / a0,
            a1: -2.0 * cos_omega / a0,
            a2: (1.0 - alpha) / a0,
        };
    }

    /// Process a single sample
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;

        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_creation() {
        let filter = ToneFilter::new(44100.0, 3000.0, 0.707);
        assert_eq!(filter.cutoff(), 3000.0);
        assert!((filter.resonance() - 0.707).abs() < 0.001);
    }

    #[test]
    fn test_filter_cutoff_clamping() {
        let filter = ToneFilter::new(44100.0, 5.0, 0.707);
        assert_eq!(filter.cutoff(), 20.0);

        let filter = ToneFilter::new(44100.0, 25000.0, 0.707);
        assert!(filter.cutoff() < 44100.0 * 0.5);
    }

    #[test]
    fn test_filter_resonance_clamping() {
        let filter = ToneFilter::new(44100.0, 3000.0, 0.01);
        assert_eq!(filter.resonance(), 0.1);

        let filter = ToneFilter::new(44100.0, 3000.0, 100.0);
        assert_eq!(filter.resonance(), 20.0);
    }

    #[test]
    fn test_lowpass_attenuates_high_frequencies() {
        let mut filter = ToneFilter::new(44100.0, 100.0, 0.707);

        let freq = 5000.0;
        let mut max_input = 0.0f64;
        let mut max_output = 0.0f64;

        for i in 0..1000 {
            let t = i as f64 / 44100.0;
            let input = (2.0 * PI * freq * t).sin();
            let output = filter.process(input);

            max_input = max_input.max(input.abs());
            max_output = max_output.max(output.abs());
        }

        assert!(
            max_output < max_input * 0.1,
            "Expected attenuation, got output={} input={}",
            max_output,
            max_input
        );
    }

    #[test]
    fn test_lowpass_passes_low_frequencies() {
        let mut filter = ToneFilter::new(44100.0, 3000.0, 0.707);

        let freq = 100.0;
        let mut sum_input_sq = 0.0;
        let mut sum_output_sq = 0.0;

        for i in 0..4410 {
            let t = i as f64 / 44100.0;
            let input = (2.0 * PI * freq * t).sin();
            let output = filter.process(input);

            if i > 100 {
                sum_input_sq += input * input;
                sum_output_sq += output * output;
            }
        }

        let ratio = (sum_output_sq / sum_input_sq).sqrt();
        assert!(ratio > 0.9, "Expected passthrough, got ratio={}", ratio);
    }
}
