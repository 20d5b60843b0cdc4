use crate::dsp::stereo::StereoSample;

/// Fixed-capacity FIFO of `N` values.
///
/// No locking and no backpressure: pushing into a full buffer overwrites the
/// oldest value. Callers pace their pushes against [`RingBuffer::available`].
pub struct RingBuffer<T, const N: usize> {
    data: [T; N],
    head: usize,
    tail: usize,
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> RingBuffer<T, N> {
    pub fn new() -> Self {
        const { assert!(N > 0, "RingBuffer needs at least one slot") };
        Self {
            data: [T::default(); N],
            head: 0,
            tail: 0,
        }
    }

    /// Number of unread values
    #[inline]
    pub fn available(&self) -> usize {
        self.tail - self.head
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Zeroes the storage and rewinds both cursors
    pub fn reset(&mut self) {
        self.data = [T::default(); N];
        self.head = 0;
        self.tail = 0;
    }

    /// Inspects the value `offset` places after the oldest unread one
    #[inline]
    pub fn peek(&self, offset: usize) -> T {
        self.data[(self.head + offset) % N]
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.data[self.tail % N] = value;
        self.tail += 1;
        if self.tail - self.head > N {
            // overwrote the oldest value
            self.head += 1;
        }
    }

    /// Removes the oldest value. Reading an empty buffer returns whatever the
    /// slot under the read cursor holds and leaves the cursors untouched.
    #[inline]
    pub fn pop(&mut self) -> T {
        let value = self.data[self.head % N];
        if self.head < self.tail {
            self.head += 1;
        }
        value
    }

    #[inline]
    pub fn write(&mut self, value: T) {
        self.push(value);
    }

    #[inline]
    pub fn read(&mut self) -> T {
        self.pop()
    }
}

/// A ring of `B` blocks holding `N` values each.
///
/// Values go in one at a time and come out a whole block at a time, so the
/// consumer can bulk-copy a contiguous slice.
pub struct RingBlockBuffer<T, const N: usize, const B: usize = 2> {
    blocks: Box<[T]>,
    current_block: usize,
    size: usize,
    dropped: u64,
}

impl<T: Copy + Default, const N: usize, const B: usize> Default for RingBlockBuffer<T, N, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize, const B: usize> RingBlockBuffer<T, N, B> {
    const BUFFER_SIZE: usize = N * B;

    pub fn new() -> Self {
        const { assert!(N > 0 && B > 1, "RingBlockBuffer needs at least two non-empty blocks") };
        Self {
            blocks: vec![T::default(); Self::BUFFER_SIZE].into_boxed_slice(),
            current_block: 0,
            size: 0,
            dropped: 0,
        }
    }

    /// Appends one value.
    ///
    /// When every block is full the oldest block is discarded first and its
    /// values are counted in [`RingBlockBuffer::dropped`].
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.size == Self::BUFFER_SIZE {
            self.current_block = (self.current_block + 1) % B;
            self.size -= N;
            self.dropped += N as u64;
        }
        let index = (N * self.current_block + self.size) % Self::BUFFER_SIZE;
        self.blocks[index] = value;
        self.size += 1;
    }

    /// Pops the oldest full block.
    ///
    /// Callers must check `size() >= count_per_block()` first.
    pub fn pop_block(&mut self) -> &[T] {
        debug_assert!(
            self.size >= N,
            "pop_block with {} of {} values queued",
            self.size,
            N
        );
        let start = N * self.current_block;
        self.current_block = (self.current_block + 1) % B;
        self.size = self.size.saturating_sub(N);
        &self.blocks[start..start + N]
    }

    /// The current block, whether or not it has been filled yet
    #[inline]
    pub fn data(&self) -> &[T] {
        let start = N * self.current_block;
        &self.blocks[start..start + N]
    }

    /// Most recently pushed value, or the current block's first slot when empty
    #[inline]
    pub fn back(&self) -> &T {
        if self.size == 0 {
            return &self.blocks[N * self.current_block];
        }
        &self.blocks[(N * self.current_block + self.size - 1) % Self::BUFFER_SIZE]
    }

    /// Copies queued values, oldest first, into `dest` without consuming them.
    /// Returns how many were copied.
    pub fn copy_queued(&self, dest: &mut [T]) -> usize {
        let count = self.size.min(dest.len());
        let start = N * self.current_block;
        let first = count.min(Self::BUFFER_SIZE - start);
        dest[..first].copy_from_slice(&self.blocks[start..start + first]);
        dest[first..count].copy_from_slice(&self.blocks[..count - first]);
        count
    }

    /// Forgets every queued value. The write cursor restarts at the current block.
    pub fn clear(&mut self) {
        self.size = 0;
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Values discarded because the producer outran the consumer
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub const fn capacity(&self) -> usize {
        Self::BUFFER_SIZE
    }

    pub const fn count_per_block(&self) -> usize {
        N
    }

    pub const fn block_byte_size(&self) -> usize {
        N * size_of::<T>()
    }
}

pub type StereoRingBuffer<T, const N: usize> = RingBuffer<StereoSample<T>, N>;

pub type StereoRingBlockBuffer<T, const N: usize, const B: usize = 2> =
    RingBlockBuffer<StereoSample<T>, N, B>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_pops_in_push_order() {
        let mut rb = RingBuffer::<u32, 8>::new();
        for v in [3, 1, 4, 1, 5, 9] {
            rb.push(v);
        }
        assert_eq!(rb.available(), 6);

        let popped: Vec<u32> = (0..6).map(|_| rb.pop()).collect();
        assert_eq!(popped, vec![3, 1, 4, 1, 5, 9]);
        assert_eq!(rb.available(), 0);
    }

    #[test]
    fn ring_buffer_order_survives_wrap_around() {
        let mut rb = RingBuffer::<u32, 4>::new();
        let mut next = 0;
        let mut expected = 0;
        for _ in 0..10 {
            rb.write(next);
            rb.write(next + 1);
            next += 2;
            assert_eq!(rb.read(), expected);
            assert_eq!(rb.read(), expected + 1);
            expected += 2;
        }
        assert_eq!(rb.available(), 0);
    }

    #[test]
    fn ring_buffer_peek_does_not_consume() {
        let mut rb = RingBuffer::<i16, 4>::new();
        rb.push(10);
        rb.push(20);
        assert_eq!(rb.peek(0), 10);
        assert_eq!(rb.peek(1), 20);
        assert_eq!(rb.available(), 2);
        assert_eq!(rb.pop(), 10);
        assert_eq!(rb.peek(0), 20);
    }

    #[test]
    fn ring_buffer_overwrites_oldest_when_full() {
        let mut rb = RingBuffer::<u8, 3>::new();
        for v in 1..=5 {
            rb.push(v);
        }
        assert_eq!(rb.available(), 3);
        assert_eq!(rb.pop(), 3);
        assert_eq!(rb.pop(), 4);
        assert_eq!(rb.pop(), 5);
    }

    #[test]
    fn ring_buffer_reset_zeroes_and_rewinds() {
        let mut rb = RingBuffer::<u8, 3>::new();
        rb.push(7);
        rb.push(8);
        rb.reset();
        assert_eq!(rb.available(), 0);
        assert_eq!(rb.peek(0), 0);
        assert_eq!(rb.peek(1), 0);
    }

    #[test]
    fn pop_block_returns_a_full_block_and_shrinks_size() {
        let mut buf = RingBlockBuffer::<u16, 4, 3>::new();
        for v in 0..6 {
            buf.push(v);
        }
        assert!(buf.size() >= buf.count_per_block());

        let block = buf.pop_block().to_vec();
        assert_eq!(block, vec![0, 1, 2, 3]);
        assert_eq!(buf.size(), 2);
        assert_eq!(buf.data()[..2], [4, 5]);
    }

    #[test]
    fn blocks_come_out_in_order_across_the_wrap() {
        let mut buf = RingBlockBuffer::<u16, 2, 2>::new();
        let mut next = 0;
        let mut seen = Vec::new();
        for _ in 0..5 {
            buf.push(next);
            buf.push(next + 1);
            next += 2;
            seen.extend_from_slice(buf.pop_block());
        }
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        assert_eq!(buf.dropped(), 0);
    }

    #[test]
    fn back_on_empty_buffer_is_the_zeroed_block_base() {
        let buf = StereoRingBlockBuffer::<i16, 4>::new();
        assert_eq!(*buf.back(), StereoSample::new(0, 0));
    }

    #[test]
    fn back_returns_most_recent_push() {
        let mut buf = StereoRingBlockBuffer::<i16, 4>::new();
        buf.push(StereoSample::new(1, 1));
        buf.push(StereoSample::new(2, 2));
        buf.push(StereoSample::new(3, 3));
        assert_eq!(*buf.back(), StereoSample::new(3, 3));
    }

    #[test]
    fn overflow_discards_oldest_block_and_counts_it() {
        let mut buf = RingBlockBuffer::<u8, 2, 2>::new();
        for v in 1..=5 {
            buf.push(v);
        }
        assert_eq!(buf.size(), 3);
        assert_eq!(buf.dropped(), 2);
        assert!(buf.size() <= buf.capacity());
        assert_eq!(buf.pop_block(), &[3, 4]);
        assert_eq!(*buf.back(), 5);
    }

    #[test]
    fn copy_queued_wraps_without_consuming() {
        let mut buf = RingBlockBuffer::<u8, 2, 2>::new();
        buf.push(1);
        buf.push(2);
        buf.pop_block();
        buf.push(3);
        buf.push(4);
        buf.push(5);

        let mut dest = [0u8; 4];
        assert_eq!(buf.copy_queued(&mut dest), 3);
        assert_eq!(dest, [3, 4, 5, 0]);
        assert_eq!(buf.size(), 3);
    }

    #[test]
    fn block_byte_size_matches_element_layout() {
        let buf = StereoRingBlockBuffer::<i16, 16>::new();
        assert_eq!(buf.block_byte_size(), 16 * 4);
        assert_eq!(buf.capacity(), 32);
    }
}
