/// Words a sound FIFO holds (28 bytes on hardware)
pub const FIFO_CAPACITY: usize = 7;

/// DMA sound FIFO.
///
/// Words are queued by DMA or CPU writes and drained by the pipe one word at
/// a time on timer overflow.
#[derive(Debug, Default, Clone)]
pub struct Fifo {
    data: [u32; FIFO_CAPACITY],
    rd_ptr: usize,
    wr_ptr: usize,
    count: usize,

    // bytes written through the 8-bit port, assembled little-endian
    staged: u32,
}

impl Fifo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Queues a word. Writes to a full FIFO are ignored.
    pub fn write_word(&mut self, word: u32) {
        if self.count == FIFO_CAPACITY {
            return;
        }
        self.data[self.wr_ptr] = word;
        self.wr_ptr = (self.wr_ptr + 1) % FIFO_CAPACITY;
        self.count += 1;
    }

    /// Writes one byte of the data port. The word is queued when its top
    /// byte arrives.
    pub fn write_byte(&mut self, index: usize, value: u8) {
        let shift = (index & 3) * 8;
        self.staged = (self.staged & !(0xFF << shift)) | (u32::from(value) << shift);
        if index & 3 == 3 {
            self.write_word(self.staged);
            self.staged = 0;
        }
    }

    /// Dequeues the oldest word, or 0 when empty
    pub fn read_word(&mut self) -> u32 {
        if self.count == 0 {
            return 0;
        }
        let word = self.data[self.rd_ptr];
        self.rd_ptr = (self.rd_ptr + 1) % FIFO_CAPACITY;
        self.count -= 1;
        word
    }
}

/// Staging register between a FIFO and its output latch: one word whose
/// bytes are shifted out least significant first.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FifoPipe {
    word: u32,
    size: u8,
}

impl FifoPipe {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn refill(&mut self, word: u32) {
        self.word = word;
        self.size = 4;
    }

    /// Returns the low byte as a signed sample and advances if anything is
    /// left. An empty pipe keeps answering with its drained word.
    #[inline]
    pub fn shift(&mut self) -> i8 {
        let sample = self.word as u8 as i8;
        if self.size > 0 {
            self.word >>= 8;
            self.size -= 1;
        }
        sample
    }
}
