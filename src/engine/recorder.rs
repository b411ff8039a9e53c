//! WAV file recorder

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Mono 32-bit float WAV writer
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
    sample_rate: u32,
    samples_written: u64,
    peak: f32,
}

impl Recorder {
    /// Create `path` and write the header
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            sample_rate,
            samples_written: 0,
            peak: 0.0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Largest absolute sample so far
    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / f64::from(self.sample_rate)
    }

    pub fn write_sample(&mut self, sample: f32) -> Result<()> {
        self.writer
            .write_sample(sample)
            .context("failed to write sample")?;
        self.samples_written += 1;
        self.peak = self.peak.max(sample.abs());
        Ok(())
    }

    /// Finalize the file; the header is incomplete until this runs
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}
