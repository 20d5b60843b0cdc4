use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Sub, SubAssign};

pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;

/// A left/right pair of samples.
///
/// Both lanes are always written together, so a sample is never observed
/// half-updated.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct StereoSample<T> {
    pub left: T,
    pub right: T,
}

impl<T> StereoSample<T> {
    pub const fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Applies `f` to both lanes
    #[inline]
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> StereoSample<U> {
        StereoSample {
            left: f(self.left),
            right: f(self.right),
        }
    }
}

impl<T: Copy> StereoSample<T> {
    pub const fn splat(value: T) -> Self {
        Self {
            left: value,
            right: value,
        }
    }
}

impl StereoSample<f32> {
    /// Narrows a normalized sample (-1.0..=1.0) to signed 16-bit PCM.
    #[inline]
    pub fn to_pcm16(self) -> StereoSample<i16> {
        self.map(|x| (x * 32767.5).round().clamp(-32768.0, 32767.0) as i16)
    }

    #[inline]
    pub fn clamp(self, min: f32, max: f32) -> Self {
        self.map(|x| x.clamp(min, max))
    }
}


impl From<StereoSample<i16>> for StereoSample<f32> {
    #[inline]
    fn from(sample: StereoSample<i16>) -> Self {
        sample.map(f32::from)
    }
}

impl From<StereoSample<i16>> for StereoSample<i32> {
    #[inline]
    fn from(sample: StereoSample<i16>) -> Self {
        sample.map(i32::from)
    }
}

impl<T> Index<usize> for StereoSample<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match index {
            LEFT => &self.left,
            RIGHT => &self.right,
            _ => panic!("stereo lane out of range: {index}"),
        }
    }
}

impl<T> IndexMut<usize> for StereoSample<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match index {
            LEFT => &mut self.left,
            RIGHT => &mut self.right,
            _ => panic!("stereo lane out of range: {index}"),
        }
    }
}

impl<T: Add<Output = T>> Add for StereoSample<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            left: self.left + rhs.left,
            right: self.right + rhs.right,
        }
    }
}

impl<T: AddAssign> AddAssign for StereoSample<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

impl<T: Sub<Output = T>> Sub for StereoSample<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            left: self.left - rhs.left,
            right: self.right - rhs.right,
        }
    }
}

impl<T: SubAssign> SubAssign for StereoSample<T> {
    fn sub_assign(&mut self, rhs: Self) {
        self.left -= rhs.left;
        self.right -= rhs.right;
    }
}

impl<T: Mul<Output = T>> Mul for StereoSample<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            left: self.left * rhs.left,
            right: self.right * rhs.right,
        }
    }
}

impl<T: MulAssign> MulAssign for StereoSample<T> {
    fn mul_assign(&mut self, rhs: Self) {
        self.left *= rhs.left;
        self.right *= rhs.right;
    }
}

impl Mul<f32> for StereoSample<f32> {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.map(|x| x * rhs)
    }
}

impl MulAssign<f32> for StereoSample<f32> {
    fn mul_assign(&mut self, rhs: f32) {
        self.left *= rhs;
        self.right *= rhs;
    }
}
