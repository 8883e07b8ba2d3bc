//! Closest-value lookup over a fixed candidate list.

use crate::error::ClosestError;

/// Absolute distance between two values of the same numeric type.
pub trait Distance: Copy {
    type Output: PartialOrd;

    fn distance(self, other: Self) -> Self::Output;
}

macro_rules! impl_distance_int {
    ($($t:ty => $u:ty),* $(,)?) => {
        $(
            impl Distance for $t {
                type Output = $u;

                fn distance(self, other: Self) -> $u {
                    self.abs_diff(other)
                }
            }
        )*
    };
}

impl_distance_int!(
    i8 => u8, i16 => u16, i32 => u32, i64 => u64, i128 => u128, isize => usize,
    u8 => u8, u16 => u16, u32 => u32, u64 => u64, u128 => u128, usize => usize,
);

macro_rules! impl_distance_float {
    ($($t:ty),*) => {
        $(
            impl Distance for $t {
                type Output = $t;

                fn distance(self, other: Self) -> $t {
                    (self - other).abs()
                }
            }
        )*
    };
}

impl_distance_float!(f32, f64);

/// Index of the candidate nearest to `target`.
///
/// Ties go to the earliest candidate: a later one wins only when strictly
/// closer. A NaN distance never compares smaller, so NaN candidates are only
/// returned when they come first.
pub fn closest_index<T: Distance>(target: T, candidates: &[T]) -> Result<usize, ClosestError> {
    let (first, rest) = candidates
        .split_first()
        .ok_or(ClosestError::EmptyCandidates)?;

    let mut best = 0;
    let mut best_distance = target.distance(*first);
    for (i, &c) in rest.iter().enumerate() {
        let d = target.distance(c);
        if d < best_distance {
            best = i + 1;
            best_distance = d;
        }
    }
    Ok(best)
}

/// The candidate nearest to `target`, first one on ties.
///
/// ```
/// use blobdrop_core::closest::closest;
///
/// assert_eq!(closest(5, &[3, 7]), Ok(3));
/// assert_eq!(closest(0.9, &[0.5, 1.0, 2.0]), Ok(1.0));
/// ```
pub fn closest<T: Distance>(target: T, candidates: &[T]) -> Result<T, ClosestError> {
    closest_index(target, candidates).map(|i| candidates[i])
}
