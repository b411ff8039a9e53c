//! Output bus: master gain, tone filter and analysis tap

use std::sync::{Arc, Mutex};

use crate::config::BusConfig;
use crate::synth::ToneFilter;

/// Ring buffer of the most recent output samples
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    write_pos: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    /// Push a new sample, overwriting the oldest
    pub fn push(&mut self, sample: f32) {
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
    }

    /// All samples, oldest first
    pub fn samples(&self) -> Vec<f32> {
        let (newer, older) = self.samples.split_at(self.write_pos);
        let mut result = Vec::with_capacity(self.samples.len());
        result.extend_from_slice(older);
        result.extend_from_slice(newer);
        result
    }
}

/// Shared read-only view of the bus output.
///
/// Cloning is cheap. The render thread writes with `try_lock` and drops the
/// sample on contention, so polling from a UI thread never stalls audio.
#[derive(Debug, Clone)]
pub struct AnalyserTap {
    buffer: Arc<Mutex<SampleBuffer>>,
    size: usize,
}

impl AnalyserTap {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(SampleBuffer::new(size))),
            size: size.max(1),
        }
    }

    /// Snapshot length
    pub fn size(&self) -> usize {
        self.size
    }

    /// Time-domain snapshot, always `size()` samples long
    pub fn snapshot(&self) -> Vec<f32> {
        match self.buffer.lock() {
            Ok(buf) => buf.samples(),
            Err(poisoned) => poisoned.into_inner().samples(),
        }
    }

    fn write(&self, sample: f32) {
        if let Ok(mut buf) = self.buffer.try_lock() {
            buf.push(sample);
        }
    }
}

/// Sum of all voices → output gain → low-pass → tap
#[derive(Debug)]
pub struct OutputBus {
    gain: f64,
    filter: ToneFilter,
    tap: AnalyserTap,
}

impl OutputBus {
    pub fn new(config: &BusConfig, sample_rate: f64) -> Self {
        Self {
            gain: config.output_gain,
            filter: ToneFilter::new(sample_rate, config.filter_cutoff, config.filter_resonance),
            tap: AnalyserTap::new(config.analyser_size),
        }
    }

    pub fn tap(&self) -> &AnalyserTap {
        &self.tap
    }

    /// Run one mixed sample through the bus
    pub fn process(&mut self, input: f64) -> f64 {
        let out = self.filter.process(input * self.gain);
        self.tap.write(out as f32);
        out
    }
}
