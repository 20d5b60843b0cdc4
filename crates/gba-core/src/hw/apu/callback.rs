use crate::dsp::ring_buffer::StereoRingBlockBuffer;
use crate::dsp::stereo::StereoSample;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Samples per block handed to the host in one copy
pub const BLOCK_LEN: usize = 1024;

/// Blocks of headroom between the mixer and the host
pub const BLOCK_COUNT: usize = 4;

pub type AudioBuffer = StereoRingBlockBuffer<i16, BLOCK_LEN, BLOCK_COUNT>;

/// The one piece of state shared between the emulation thread and the host
/// audio thread. `None` until the APU has been reset.
pub type SharedAudioBuffer = Arc<Mutex<Option<AudioBuffer>>>;

pub(crate) fn lock(buffer: &SharedAudioBuffer) -> MutexGuard<'_, Option<AudioBuffer>> {
    // cursors and samples are always consistent between statements
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Consumer end of the mixer output, handed to the audio device.
#[derive(Clone)]
pub struct AudioCallback {
    buffer: SharedAudioBuffer,
}

impl AudioCallback {
    pub fn new(buffer: SharedAudioBuffer) -> Self {
        Self { buffer }
    }

    /// Fills `dest` with queued samples, padding with the last one on underrun.
    /// Writes silence if the APU has not set up its buffer yet.
    pub fn fill(&self, dest: &mut [StereoSample<i16>]) {
        let mut guard = lock(&self.buffer);
        match guard.as_mut() {
            Some(buffer) => drain(buffer, dest),
            None => dest.fill(StereoSample::default()),
        }
    }

    /// Samples queued and not yet handed out
    pub fn queued(&self) -> usize {
        lock(&self.buffer).as_ref().map_or(0, |buffer| buffer.size())
    }

    /// Samples the mixer produced that the host never got to play
    pub fn dropped_samples(&self) -> u64 {
        lock(&self.buffer).as_ref().map_or(0, |buffer| buffer.dropped())
    }
}

/// Serves requests of any length from whole blocks.
///
/// [`AudioCallback::fill`] leaves the queue untouched when asked for less
/// than a block, so a host pulling a few hundred frames at a time would hear
/// the same block over and over. The reader only ever asks for `BLOCK_LEN`
/// samples and keeps what the host has not taken yet for the next call.
pub struct BlockReader {
    callback: AudioCallback,
    block: Vec<StereoSample<i16>>,
    position: usize,
}

impl BlockReader {
    pub fn new(callback: AudioCallback) -> Self {
        Self {
            callback,
            block: vec![StereoSample::default(); BLOCK_LEN],
            position: BLOCK_LEN,
        }
    }

    pub fn read(&mut self, dest: &mut [StereoSample<i16>]) {
        let mut written = 0;
        while written < dest.len() {
            if self.position == self.block.len() {
                self.callback.fill(&mut self.block);
                self.position = 0;
            }
            let count = (dest.len() - written).min(self.block.len() - self.position);
            dest[written..written + count]
                .copy_from_slice(&self.block[self.position..self.position + count]);
            written += count;
            self.position += count;
        }
    }

    /// Samples fetched from the queue but not yet handed to the host
    pub fn carried(&self) -> usize {
        self.block.len() - self.position
    }
}

/// Moves samples from `buffer` into `dest`.
///
/// Whole blocks are popped while the request still covers one. A request
/// smaller than a block that the queue can satisfy is served from the
/// current block without consuming it. If the queue runs dry everything
/// left is copied out, the tail of `dest` repeats the last sample and the
/// queue is emptied.
pub(crate) fn drain<const N: usize, const B: usize>(
    buffer: &mut StereoRingBlockBuffer<i16, N, B>,
    dest: &mut [StereoSample<i16>],
) {
    let mut written = 0;

    while written < dest.len() {
        let available = buffer.size();
        let remaining = dest.len() - written;

        if available >= remaining {
            if remaining >= N {
                dest[written..written + N].copy_from_slice(buffer.pop_block());
                written += N;
            } else {
                dest[written..].copy_from_slice(&buffer.data()[..remaining]);
                break;
            }
        } else {
            written += buffer.copy_queued(&mut dest[written..]);
            let last = *buffer.back();
            dest[written..].fill(last);
            buffer.clear();
            break;
        }
    }
}
