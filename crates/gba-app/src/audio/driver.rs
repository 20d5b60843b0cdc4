use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig,
    SupportedBufferSize, SupportedStreamConfig,
};
use gba_core::dsp::stereo::StereoSample;
use gba_core::hw::apu::callback::BLOCK_LEN;
use gba_core::prelude::{AudioCallback, AudioDevice, AudioDeviceError, BlockReader};
use log::{error, info, warn};

/// Default output device of the default cpal host
pub struct CpalAudioDevice {
    device: cpal::Device,
    config: SupportedStreamConfig,
    stream: Option<Stream>,
}

impl CpalAudioDevice {
    /// Opens the default output device, preferring `sample_rate` when the
    /// device offers it as f32. Otherwise the device's default config is used
    /// in whatever sample format it reports.
    pub fn init(sample_rate: u32) -> Result<Self, AudioDeviceError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioDeviceError::NoOutputDevice)?;
        let default_config = device
            .default_output_config()
            .map_err(|e| AudioDeviceError::UnsupportedConfig(e.to_string()))?;

        let config = Self::find_config(&device, sample_rate).unwrap_or_else(|| {
            if default_config.sample_rate() != sample_rate {
                warn!(
                    "Audio device does not offer {} Hz, using {} Hz",
                    sample_rate,
                    default_config.sample_rate()
                );
            }
            default_config
        });

        info!(
            "Audio device: {} Hz, {} channels, {:?}",
            config.sample_rate(),
            config.channels(),
            config.sample_format()
        );

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    fn find_config(device: &cpal::Device, sample_rate: u32) -> Option<SupportedStreamConfig> {
        device
            .supported_output_configs()
            .ok()?
            .filter(|range| range.sample_format() == SampleFormat::F32 && range.channels() >= 2)
            .find(|range| range.min_sample_rate() <= sample_rate && sample_rate <= range.max_sample_rate())
            .map(|range| range.with_sample_rate(sample_rate))
    }

    /// Stream settings, asking for one block per callback when the device
    /// allows it
    fn stream_config(&self) -> StreamConfig {
        let mut config = self.config.config();
        config.buffer_size = fixed_block_size(self.config.buffer_size());
        config
    }

    fn build_stream<T>(&self, callback: AudioCallback) -> Result<Stream, AudioDeviceError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let config = self.stream_config();
        let channels = config.channels as usize;
        let mut reader = BlockReader::new(callback);
        let mut scratch: Vec<StereoSample<i16>> = Vec::new();

        self.device
            .build_output_stream(
                &config,
                move |data: &mut [T], _| {
                    let frames = data.len() / channels;
                    if scratch.len() < frames {
                        scratch.resize(frames, StereoSample::default());
                    }
                    reader.read(&mut scratch[..frames]);
                    write_frames(data, channels, &scratch[..frames]);
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioDeviceError::BuildStream(e.to_string()))
    }
}

impl AudioDevice for CpalAudioDevice {
    fn open(&mut self, callback: AudioCallback) -> Result<(), AudioDeviceError> {
        self.close();

        let stream = match self.config.sample_format() {
            SampleFormat::F32 => self.build_stream::<f32>(callback)?,
            SampleFormat::I16 => self.build_stream::<i16>(callback)?,
            SampleFormat::U16 => self.build_stream::<u16>(callback)?,
            format => {
                return Err(AudioDeviceError::UnsupportedConfig(format!(
                    "sample format {:?}",
                    format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| AudioDeviceError::Play(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) {
        // dropping the stream stops the callback
        self.stream = None;
    }

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate()
    }
}

fn fixed_block_size(supported: &SupportedBufferSize) -> BufferSize {
    let block = BLOCK_LEN as u32;
    match supported {
        SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&block) => {
            BufferSize::Fixed(block)
        }
        _ => BufferSize::Default,
    }
}

/// Spreads stereo frames over an interleaved f32 buffer of any width.
/// Mono gets the average; channels past the second are silent.
fn write_frames<T>(data: &mut [T], channels: usize, frames: &[StereoSample<i16>])
where
    T: Sample + FromSample<f32>,
{
    for (out, sample) in data.chunks_mut(channels).zip(frames) {
        let sample = StereoSample::<f32>::from(*sample).map(|x| x / 32768.0);
        match out {
            [mono] => *mono = T::from_sample((sample.left + sample.right) * 0.5),
            [left, right, rest @ ..] => {
                *left = T::from_sample(sample.left);
                *right = T::from_sample(sample.right);
                rest.fill(T::EQUILIBRIUM);
            }
            [] => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_frames_are_interleaved() {
        let frames = [StereoSample::new(16384i16, -16384), StereoSample::new(0, 32767)];
        let mut data = [9.0f32; 4];
        write_frames(&mut data, 2, &frames);
        assert_eq!(data[..3], [0.5, -0.5, 0.0]);
        assert!((data[3] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn mono_gets_the_average() {
        let frames = [StereoSample::new(16384i16, 0)];
        let mut data = [9.0f32; 1];
        write_frames(&mut data, 1, &frames);
        assert_eq!(data, [0.25]);
    }

    #[test]
    fn integer_formats_are_converted() {
        let frames = [StereoSample::new(16384i16, -32768)];

        let mut signed = [9i16; 2];
        write_frames(&mut signed, 2, &frames);
        assert_eq!(signed, [16384, -32768]);

        let mut unsigned = [9u16; 3];
        write_frames(&mut unsigned, 3, &frames);
        assert_eq!(unsigned[1], 0);
        assert_eq!(unsigned[2], 32768);
        assert!(unsigned[0] > 49_000);
    }

    #[test]
    fn block_sized_buffer_is_requested_when_offered() {
        let offered = SupportedBufferSize::Range { min: 64, max: 4096 };
        assert_eq!(fixed_block_size(&offered), BufferSize::Fixed(1024));

        let too_small = SupportedBufferSize::Range { min: 64, max: 512 };
        assert_eq!(fixed_block_size(&too_small), BufferSize::Default);
        assert_eq!(fixed_block_size(&SupportedBufferSize::Unknown), BufferSize::Default);
    }

    #[test]
    fn surround_channels_are_silenced() {
        let frames = [StereoSample::new(-32768i16, -32768)];
        let mut data = [9.0f32; 6];
        write_frames(&mut data, 6, &frames);
        assert_eq!(data, [-1.0, -1.0, 0.0, 0.0, 0.0, 0.0]);
    }
}
