//! Scalar sample types storable in a [`Volume`](super::Volume)

use std::fmt::Debug;

/// A scalar voxel sample.
///
/// Integer and floating sample types both convert losslessly (or nearly so)
/// to `f64`, which is what the cost terms of the segmenters operate on.
pub trait Sample: Copy + Default + PartialOrd + Debug + Send + Sync + 'static {
    /// `true` for floating point sample types.
    const FLOATING: bool;

    /// Convert to `f64`.
    fn to_f64(self) -> f64;

    /// `true` when the sample marks a foreground voxel (strictly positive).
    #[inline]
    fn is_positive(self) -> bool {
        self.to_f64() > 0.0
    }
}

macro_rules! impl_integer_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                const FLOATING: bool = false;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_integer_sample!(u8, u16, u32, i16, i32, i64);

impl Sample for f32 {
    const FLOATING: bool = true;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    const FLOATING: bool = true;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}
