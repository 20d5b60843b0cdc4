pub mod resampler;
pub mod ring_buffer;
pub mod stereo;
