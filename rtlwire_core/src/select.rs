//! Bit selection.
//!
//! Selections resolve against the positions `0..bitwidth` of a wire (bit 0 is
//! the least significant) with sequence semantics: negative indices count
//! from the most significant end, out-of-range slice bounds are clamped, and
//! negative steps walk downwards.

use rtlwire_common::{WireError, WireResult};
use std::fmt::Debug;
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

/// Something that picks bit positions out of a wire.
pub trait BitSelect: Debug {
    /// Positions selected from a wire of `bitwidth` bits, in result order
    /// (first position becomes bit 0 of the result).
    ///
    /// # Errors
    /// Out-of-range single indices and zero steps. An empty result is not an
    /// error here; the caller decides.
    fn positions(&self, bitwidth: usize) -> WireResult<Vec<usize>>;
}

/// A `start:stop:step` slice with optional, possibly negative, bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Slice {
    /// First position, inclusive.
    pub start: Option<isize>,
    /// Last position, exclusive.
    pub stop: Option<isize>,
    /// Distance between positions; defaults to 1.
    pub step: Option<isize>,
}

impl Slice {
    /// A slice with all three bounds given explicitly.
    #[must_use]
    pub const fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Self { start, stop, step }
    }

    /// `[start:]`, e.g. `Slice::from_start(-4)` for the four top bits.
    #[must_use]
    pub const fn from_start(start: isize) -> Self {
        Self::new(Some(start), None, None)
    }

    /// `[:stop]`.
    #[must_use]
    pub const fn to_stop(stop: isize) -> Self {
        Self::new(None, Some(stop), None)
    }

    /// `[::-1]`, every bit in reverse order.
    #[must_use]
    pub const fn reversed() -> Self {
        Self::new(None, None, Some(-1))
    }

    /// Same bounds, different step.
    #[must_use]
    pub const fn step_by(self, step: isize) -> Self {
        Self::new(self.start, self.stop, Some(step))
    }
}

impl BitSelect for Slice {
    fn positions(&self, bitwidth: usize) -> WireResult<Vec<usize>> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(WireError::ZeroSliceStep);
        }
        let len = bitwidth as isize;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };

        let clamp = |bound: isize| {
            let bound = if bound < 0 { bound + len } else { bound };
            bound.clamp(lower, upper)
        };
        let start = self
            .start
            .map_or(if step < 0 { upper } else { lower }, clamp);
        let stop = self.stop.map_or(if step < 0 { lower } else { upper }, clamp);

        let mut selected = Vec::new();
        let mut idx = start;
        while (step > 0 && idx < stop) || (step < 0 && idx > stop) {
            selected.push(idx as usize);
            idx += step;
        }
        Ok(selected)
    }
}

impl BitSelect for isize {
    fn positions(&self, bitwidth: usize) -> WireResult<Vec<usize>> {
        let len = bitwidth as isize;
        let idx = if *self < 0 { *self + len } else { *self };
        if idx < 0 || idx >= len {
            return Err(WireError::IndexOutOfRange {
                index: *self,
                bitwidth,
            });
        }
        Ok(vec![idx as usize])
    }
}

impl BitSelect for i32 {
    fn positions(&self, bitwidth: usize) -> WireResult<Vec<usize>> {
        (*self as isize).positions(bitwidth)
    }
}

impl BitSelect for usize {
    fn positions(&self, bitwidth: usize) -> WireResult<Vec<usize>> {
        if *self >= bitwidth {
            return Err(WireError::IndexOutOfRange {
                index: isize::try_from(*self).unwrap_or(isize::MAX),
                bitwidth,
            });
        }
        Ok(vec![*self])
    }
}

/// Range bounds are never negative; anything past `isize::MAX` clamps there.
fn range_bound(bound: usize) -> isize {
    isize::try_from(bound).unwrap_or(isize::MAX)
}

impl BitSelect for Range<usize> {
    fn positions(&self, bitwidth: usize) -> WireResult<Vec<usize>> {
        Slice::new(
            Some(range_bound(self.start)),
            Some(range_bound(self.end)),
            None,
        )
        .positions(bitwidth)
    }
}

impl BitSelect for RangeInclusive<usize> {
    fn positions(&self, bitwidth: usize) -> WireResult<Vec<usize>> {
        Slice::new(
            Some(range_bound(*self.start())),
            Some(range_bound(*self.end()).saturating_add(1)),
            None,
        )
        .positions(bitwidth)
    }
}

impl BitSelect for RangeFrom<usize> {
    fn positions(&self, bitwidth: usize) -> WireResult<Vec<usize>> {
        Slice::new(Some(range_bound(self.start)), None, None).positions(bitwidth)
    }
}

impl BitSelect for RangeTo<usize> {
    fn positions(&self, bitwidth: usize) -> WireResult<Vec<usize>> {
        Slice::new(None, Some(range_bound(self.end)), None).positions(bitwidth)
    }
}

impl BitSelect for RangeFull {
    fn positions(&self, bitwidth: usize) -> WireResult<Vec<usize>> {
        Ok((0..bitwidth).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Slice::new(Some(3), Some(6), None), vec![3, 4, 5])]
    #[case(Slice::from_start(-4), vec![4, 5, 6, 7])]
    #[case(Slice::to_stop(-6), vec![0, 1])]
    #[case(Slice::reversed(), vec![7, 6, 5, 4, 3, 2, 1, 0])]
    #[case(Slice::new(Some(6), Some(1), Some(-2)), vec![6, 4, 2])]
    #[case(Slice::new(None, None, Some(3)), vec![0, 3, 6])]
    #[case(Slice::new(Some(-100), Some(100), None), vec![0, 1, 2, 3, 4, 5, 6, 7])]
    #[case(Slice::new(Some(5), Some(2), None), vec![])]
    fn slices_follow_sequence_semantics(#[case] slice: Slice, #[case] expected: Vec<usize>) {
        assert_eq!(slice.positions(8), Ok(expected));
    }

    #[test]
    fn indices_wrap_once() {
        assert_eq!((-1isize).positions(8), Ok(vec![7]));
        assert_eq!(0isize.positions(8), Ok(vec![0]));
        assert_eq!(
            8isize.positions(8),
            Err(WireError::IndexOutOfRange {
                index: 8,
                bitwidth: 8
            })
        );
        assert!((-9isize).positions(8).is_err());
    }

    #[test]
    fn ranges_clamp_like_slices() {
        assert_eq!((2..5usize).positions(8), Ok(vec![2, 3, 4]));
        assert_eq!((6..20usize).positions(8), Ok(vec![6, 7]));
        assert_eq!((1..=2usize).positions(8), Ok(vec![1, 2]));
        assert_eq!((..2usize).positions(8), Ok(vec![0, 1]));
        assert_eq!((6usize..).positions(8), Ok(vec![6, 7]));
        assert_eq!((..).positions(3), Ok(vec![0, 1, 2]));
        assert_eq!((9..12usize).positions(8), Ok(vec![]));
    }

    #[test]
    fn huge_range_bounds_clamp_instead_of_wrapping() {
        let all: Vec<usize> = (0..8).collect();
        assert_eq!((0..usize::MAX).positions(8), Ok(all.clone()));
        assert_eq!((0..=usize::MAX).positions(8), Ok(all.clone()));
        assert_eq!((..usize::MAX).positions(8), Ok(all));
        assert_eq!((usize::MAX..).positions(8), Ok(vec![]));
        assert_eq!((6..=usize::MAX).positions(8), Ok(vec![6, 7]));
    }

    quickcheck::quickcheck! {
        fn slice_positions_stay_in_range(
            start: Option<i8>,
            stop: Option<i8>,
            step: i8,
            width: u8
        ) -> bool {
            let step = if step == 0 { 1 } else { step };
            let bitwidth = usize::from(width % 64) + 1;
            let slice = Slice::new(
                start.map(isize::from),
                stop.map(isize::from),
                Some(isize::from(step)),
            );
            slice
                .positions(bitwidth)
                .is_ok_and(|positions| positions.iter().all(|&p| p < bitwidth))
        }

        fn full_reverse_is_reversed_full(width: u8) -> bool {
            let bitwidth = usize::from(width % 64) + 1;
            let mut forward = (..).positions(bitwidth).unwrap_or_default();
            forward.reverse();
            Slice::reversed().positions(bitwidth) == Ok(forward)
        }
    }

    #[test]
    fn zero_step_is_rejected() {
        assert_eq!(
            Slice::new(None, None, Some(0)).positions(4),
            Err(WireError::ZeroSliceStep)
        );
    }
}
