//! Real-time audio playback using cpal

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, Device, SampleFormat, Stream, StreamConfig, SupportedBufferSize,
    SupportedStreamConfig,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

use super::Engine;
use crate::config::AudioConfig;

/// Audio device failures
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no output device available")]
    NoDevice,

    #[error("no output device matching '{0}'")]
    DeviceNotFound(String),

    #[error("failed to enumerate devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to query output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported sample format {0:?}")]
    UnsupportedFormat(SampleFormat),
}

/// Output device summary for listings
#[derive(Debug, Clone)]
pub struct OutputDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub is_default: bool,
}

/// Real-time audio player bound to one output device
pub struct Player {
    device: Device,
    supported: SupportedStreamConfig,
    stream_config: StreamConfig,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Player {
    /// Open the configured device, or the default one when none is named.
    ///
    /// The device's own sample rate wins; build the engine with
    /// [`sample_rate`](Self::sample_rate).
    pub fn open(audio: &AudioConfig) -> Result<Self, PlayerError> {
        let host = cpal::default_host();
        let device = match audio.device.as_deref() {
            Some(wanted) => find_device(&host, wanted)?,
            None => host.default_output_device().ok_or(PlayerError::NoDevice)?,
        };

        let supported = device.default_output_config()?;
        let mut stream_config = supported.config();
        stream_config.buffer_size = buffer_size_for(supported.buffer_size(), audio.buffer_size);

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = stream_config.sample_rate.0,
            channels = stream_config.channels,
            "output device opened"
        );

        Ok(Self {
            device,
            supported,
            stream_config,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.stream_config.sample_rate.0
    }

    pub fn device_name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "Unknown".to_string())
    }

    /// Start rendering `engine` into the device
    pub fn start(&mut self, engine: Arc<Mutex<Engine>>) -> Result<(), PlayerError> {
        self.running.store(true, Ordering::SeqCst);

        let stream = match self.supported.sample_format() {
            SampleFormat::F32 => self.build_stream::<f32>(engine)?,
            SampleFormat::I16 => self.build_stream::<i16>(engine)?,
            SampleFormat::U16 => self.build_stream::<u16>(engine)?,
            other => return Err(PlayerError::UnsupportedFormat(other)),
        };

        stream.play()?;
        self.stream = Some(stream);
        Ok(())
    }

    /// Stop playback and drop the stream
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }

    fn build_stream<T>(&self, engine: Arc<Mutex<Engine>>) -> Result<Stream, PlayerError>
    where
        T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = usize::from(self.stream_config.channels);
        let running = self.running.clone();

        let stream = self.device.build_output_stream(
            &self.stream_config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if !running.load(Ordering::SeqCst) {
                    data.fill(T::from_sample(0.0f32));
                    return;
                }

                // Never block the audio thread on the control side.
                let Ok(mut engine) = engine.try_lock() else {
                    data.fill(T::from_sample(0.0f32));
                    return;
                };
                for frame in data.chunks_mut(channels) {
                    let sample = T::from_sample(engine.process() as f32);
                    frame.fill(sample);
                }
            },
            |err| {
                warn!(error = %err, "audio stream error");
            },
            None,
        )?;

        Ok(stream)
    }
}

fn find_device(host: &cpal::Host, wanted: &str) -> Result<Device, PlayerError> {
    let needle = wanted.to_lowercase();
    host.output_devices()?
        .find(|d| {
            d.name()
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .ok_or_else(|| PlayerError::DeviceNotFound(wanted.to_string()))
}

/// Fixed buffer size when the device supports it, else the device default
fn buffer_size_for(supported: &SupportedBufferSize, requested: usize) -> BufferSize {
    let Ok(frames) = u32::try_from(requested) else {
        return BufferSize::Default;
    };
    match supported {
        SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&frames) => {
            BufferSize::Fixed(frames)
        }
        _ => BufferSize::Default,
    }
}

/// List output devices with their default configuration
pub fn list_output_devices() -> Result<Vec<OutputDeviceInfo>, PlayerError> {
    let host = cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());

    let mut devices = Vec::new();
    for device in host.output_devices()? {
        let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) else {
            continue;
        };
        devices.push(OutputDeviceInfo {
            is_default: default_name.as_deref() == Some(name.as_str()),
            name,
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
        });
    }
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_within_range() {
        let supported = SupportedBufferSize::Range { min: 64, max: 4096 };
        assert_eq!(buffer_size_for(&supported, 512), BufferSize::Fixed(512));
    }

    #[test]
    fn test_buffer_size_out_of_range() {
        let supported = SupportedBufferSize::Range { min: 64, max: 256 };
        assert_eq!(buffer_size_for(&supported, 512), BufferSize::Default);
    }

    #[test]
    fn test_buffer_size_unknown() {
        assert_eq!(
            buffer_size_for(&SupportedBufferSize::Unknown, 512),
            BufferSize::Default
        );
    }

    #[test]
    fn test_player_error_messages() {
        assert_eq!(PlayerError::NoDevice.to_string(), "no output device available");
        assert_eq!(
            PlayerError::DeviceNotFound("usb".into()).to_string(),
            "no output device matching 'usb'"
        );
    }
}
