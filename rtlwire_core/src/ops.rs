//! Operator-driven net construction.
//!
//! Every operator coerces its operand, aligns both sides to a common width,
//! allocates a result wire and appends exactly one net. The infix operators
//! from `std::ops` are thin layers over the same builders; their output is a
//! [`WireResult`] so construction errors stay visible: `((a + b)? & c)?`.

use crate::coerce::IntoWire;
use crate::net::NetOp;
use crate::select::BitSelect;
use crate::wire::Wire;
use rtlwire_common::{WireError, WireResult};
use std::cmp::Ordering;
use std::ops::{Add, BitAnd, BitOr, BitXor, Mul, Not, Rem, Shl, Shr, Sub};

const SHIFT_HINT: &str = "To select bits use `slice` (e.g. `w.slice(2..9)` makes a 7 bit wire \
     from bits 2 through 8). For a shift at execution time use a dedicated shifter circuit.";

const MOD_HINT: &str = "To mask or select bits use `slice` (e.g. `w.slice(2..9)` makes a 7 bit \
     wire from bits 2 through 8).";

/// Which bit fills the new positions of an extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExtensionBit {
    Sign,
    Zero,
}

impl<'a> Wire<'a> {
    /// Coerce, align, then build `self <op> other`.
    ///
    /// Nothing stays in the block when any step fails.
    #[track_caller]
    pub(crate) fn binary_op(self, other: impl IntoWire<'a>, op: NetOp) -> WireResult<Wire<'a>> {
        self.bitwidth()?;
        let block = self.block();
        let checkpoint = block.checkpoint();
        let result = self.build_binary(other, op);
        block.settle(checkpoint, result)
    }

    #[track_caller]
    fn build_binary(self, other: impl IntoWire<'a>, op: NetOp) -> WireResult<Wire<'a>> {
        let block = self.block();
        let other = block.as_wire(other, None)?;
        let (a, b) = block.match_bitwidth(self, other)?;
        let width = a.bitwidth()?;
        let result_width = op.binary_result_width(width).ok_or_else(|| {
            WireError::internal(format!("{op:?} used as a two operand operator"))
        })?;
        block.driven_wire(result_width, op, None, vec![a.id(), b.id()])
    }

    /// Bitwise nand; the result keeps the common width.
    ///
    /// # Errors
    /// Coercion errors.
    #[track_caller]
    pub fn nand(self, other: impl IntoWire<'a>) -> WireResult<Wire<'a>> {
        self.binary_op(other, NetOp::Nand)
    }

    /// 1-bit `self == other` comparator.
    ///
    /// # Errors
    /// Coercion errors.
    #[track_caller]
    pub fn eq(self, other: impl IntoWire<'a>) -> WireResult<Wire<'a>> {
        self.binary_op(other, NetOp::Eq)
    }

    /// 1-bit `self != other`, built as the inverse of [`Wire::eq`].
    ///
    /// # Errors
    /// Coercion errors.
    #[track_caller]
    pub fn ne(self, other: impl IntoWire<'a>) -> WireResult<Wire<'a>> {
        self.binary_op(other, NetOp::Eq)?.invert()
    }

    /// 1-bit unsigned `self < other`.
    ///
    /// # Errors
    /// Coercion errors.
    #[track_caller]
    pub fn lt(self, other: impl IntoWire<'a>) -> WireResult<Wire<'a>> {
        self.binary_op(other, NetOp::Lt)
    }

    /// 1-bit `self <= other`, built as the inverse of `self > other`.
    ///
    /// # Errors
    /// Coercion errors.
    #[track_caller]
    pub fn le(self, other: impl IntoWire<'a>) -> WireResult<Wire<'a>> {
        self.binary_op(other, NetOp::Gt)?.invert()
    }

    /// 1-bit unsigned `self > other`.
    ///
    /// # Errors
    /// Coercion errors.
    #[track_caller]
    pub fn gt(self, other: impl IntoWire<'a>) -> WireResult<Wire<'a>> {
        self.binary_op(other, NetOp::Gt)
    }

    /// 1-bit `self >= other`, built as the inverse of `self < other`.
    ///
    /// # Errors
    /// Coercion errors.
    #[track_caller]
    pub fn ge(self, other: impl IntoWire<'a>) -> WireResult<Wire<'a>> {
        self.binary_op(other, NetOp::Lt)?.invert()
    }

    /// Bitwise invert through a single one-input net.
    ///
    /// # Errors
    /// Unknown width.
    #[track_caller]
    pub fn invert(self) -> WireResult<Wire<'a>> {
        self.block()
            .driven_wire(self.bitwidth()?, NetOp::Not, None, vec![self.id()])
    }

    /// New wire made of the selected bits of `self`.
    ///
    /// # Errors
    /// Unknown width, out-of-range indices, selections of nothing.
    #[track_caller]
    pub fn slice(self, selection: impl BitSelect) -> WireResult<Wire<'a>> {
        let bitwidth = self.bitwidth()?;
        let positions = selection.positions(bitwidth)?;
        if positions.is_empty() {
            return Err(WireError::EmptySelection(format!("{selection:?}")));
        }
        self.block().driven_wire(
            positions.len(),
            NetOp::Select,
            Some(positions),
            vec![self.id()],
        )
    }

    /// Extend to `bitwidth` bits by replicating the most significant bit.
    ///
    /// Asking for the current width returns `self` without building anything.
    ///
    /// # Errors
    /// Unknown width, or a `bitwidth` smaller than the current one.
    #[track_caller]
    pub fn sign_extended(self, bitwidth: usize) -> WireResult<Wire<'a>> {
        self.extend_with_bit(bitwidth, ExtensionBit::Sign)
    }

    /// Extend to `bitwidth` bits with zeros.
    ///
    /// Asking for the current width returns `self` without building anything.
    ///
    /// # Errors
    /// Unknown width, or a `bitwidth` smaller than the current one.
    #[track_caller]
    pub fn zero_extended(self, bitwidth: usize) -> WireResult<Wire<'a>> {
        self.extend_with_bit(bitwidth, ExtensionBit::Zero)
    }

    #[track_caller]
    fn extend_with_bit(self, bitwidth: usize, fill: ExtensionBit) -> WireResult<Wire<'a>> {
        let current = self.bitwidth()?;
        let extra = match bitwidth.cmp(&current) {
            Ordering::Equal => return Ok(self),
            Ordering::Less => {
                return Err(WireError::ExtensionShrinks {
                    name: self.name(),
                    from: current,
                    to: bitwidth,
                });
            },
            Ordering::Greater => bitwidth - current,
        };

        let block = self.block();
        let checkpoint = block.checkpoint();
        let result = self.build_extension(extra, fill);
        block.settle(checkpoint, result)
    }

    #[track_caller]
    fn build_extension(self, extra: usize, fill: ExtensionBit) -> WireResult<Wire<'a>> {
        let block = self.block();
        let fill_bit = match fill {
            ExtensionBit::Sign => self.slice(-1isize)?,
            ExtensionBit::Zero => block.constant(0u8, Some(1))?,
        };
        let extension =
            block.driven_wire(extra, NetOp::Select, Some(vec![0; extra]), vec![fill_bit.id()])?;
        block.concat(&[extension, self])
    }
}

macro_rules! wire_binary_ops {
    ($(($trait:ident, $method:ident, $op:expr)),*) => {
        $(impl<'a, T: IntoWire<'a>> $trait<T> for Wire<'a> {
            type Output = WireResult<Wire<'a>>;

            #[track_caller]
            fn $method(self, rhs: T) -> Self::Output {
                self.binary_op(rhs, $op)
            }
        })*
    };
}

wire_binary_ops!(
    (Add, add, NetOp::Add),
    (Sub, sub, NetOp::Sub),
    (Mul, mul, NetOp::Mul),
    (BitAnd, bitand, NetOp::And),
    (BitOr, bitor, NetOp::Or),
    (BitXor, bitxor, NetOp::Xor)
);

// literal on the left: `3 + w`, `3 - w`
macro_rules! literal_lhs_ops {
    ($($t:ty),*) => {
        $(
            impl<'a> Add<Wire<'a>> for $t {
                type Output = WireResult<Wire<'a>>;

                #[track_caller]
                fn add(self, rhs: Wire<'a>) -> Self::Output {
                    rhs.binary_op(self, NetOp::Add)
                }
            }

            impl<'a> Sub<Wire<'a>> for $t {
                type Output = WireResult<Wire<'a>>;

                #[track_caller]
                fn sub(self, rhs: Wire<'a>) -> Self::Output {
                    rhs.bitwidth()?;
                    let block = rhs.block();
                    let checkpoint = block.checkpoint();
                    let result = match block.as_wire(self, None) {
                        Ok(lhs) => lhs.binary_op(rhs, NetOp::Sub),
                        Err(err) => Err(err),
                    };
                    block.settle(checkpoint, result)
                }
            }

            impl<'a> Mul<Wire<'a>> for $t {
                type Output = WireResult<Wire<'a>>;

                #[track_caller]
                fn mul(self, rhs: Wire<'a>) -> Self::Output {
                    rhs.binary_op(self, NetOp::Mul)
                }
            }

            impl<'a> BitAnd<Wire<'a>> for $t {
                type Output = WireResult<Wire<'a>>;

                #[track_caller]
                fn bitand(self, rhs: Wire<'a>) -> Self::Output {
                    rhs.binary_op(self, NetOp::And)
                }
            }

            impl<'a> BitOr<Wire<'a>> for $t {
                type Output = WireResult<Wire<'a>>;

                #[track_caller]
                fn bitor(self, rhs: Wire<'a>) -> Self::Output {
                    rhs.binary_op(self, NetOp::Or)
                }
            }

            impl<'a> BitXor<Wire<'a>> for $t {
                type Output = WireResult<Wire<'a>>;

                #[track_caller]
                fn bitxor(self, rhs: Wire<'a>) -> Self::Output {
                    rhs.binary_op(self, NetOp::Xor)
                }
            }
        )*
    };
}

literal_lhs_ops!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<'a> Not for Wire<'a> {
    type Output = WireResult<Wire<'a>>;

    #[track_caller]
    fn not(self) -> Self::Output {
        self.invert()
    }
}

impl<'a, T> Shl<T> for Wire<'a> {
    type Output = WireResult<Wire<'a>>;

    fn shl(self, _rhs: T) -> Self::Output {
        Err(WireError::UnsupportedOperator {
            op: "<<",
            hint: SHIFT_HINT,
        })
    }
}

impl<'a, T> Shr<T> for Wire<'a> {
    type Output = WireResult<Wire<'a>>;

    fn shr(self, _rhs: T) -> Self::Output {
        Err(WireError::UnsupportedOperator {
            op: ">>",
            hint: SHIFT_HINT,
        })
    }
}

impl<'a, T> Rem<T> for Wire<'a> {
    type Output = WireResult<Wire<'a>>;

    fn rem(self, _rhs: T) -> Self::Output {
        Err(WireError::UnsupportedOperator {
            op: "%",
            hint: MOD_HINT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;

    #[test]
    fn sign_extension_replicates_top_bit() {
        let block = Block::new();
        let a = block.input(Some(4), Some("a")).unwrap();
        let wide = a.sign_extended(7).unwrap();
        assert_eq!(wide.bitwidth(), Ok(7));

        let nets = block.nets();
        let ops: Vec<NetOp> = nets.iter().map(|n| n.op).collect();
        assert_eq!(ops, vec![NetOp::Select, NetOp::Select, NetOp::Concat]);
        assert_eq!(nets[0].param, Some(vec![3]));
        assert_eq!(nets[1].param, Some(vec![0, 0, 0]));
        assert_eq!(nets[2].args[1], a.id());
    }

    #[test]
    fn zero_extension_uses_constant_zero() {
        let block = Block::new();
        let a = block.input(Some(2), Some("a")).unwrap();
        a.zero_extended(5).unwrap();
        let fill = block.nets()[0].args[0];
        let fill = block.wires()[fill.as_usize()];
        assert_eq!(fill.const_value(), Some(0));
        assert_eq!(fill.bitwidth(), Ok(1));
    }

    #[test]
    fn shift_and_modulo_are_rejected() {
        let block = Block::new();
        let a = block.input(Some(4), Some("a")).unwrap();
        assert!(matches!(
            a << 2,
            Err(WireError::UnsupportedOperator { op: "<<", .. })
        ));
        assert!(matches!(
            a >> 1u8,
            Err(WireError::UnsupportedOperator { op: ">>", .. })
        ));
        assert!(matches!(
            a % 3,
            Err(WireError::UnsupportedOperator { op: "%", .. })
        ));
        assert_eq!(block.net_count(), 0);
    }
}
