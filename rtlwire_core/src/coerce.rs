//! Value coercion.
//!
//! Everything an operator accepts on its right-hand side goes through
//! [`IntoWire`]: literals become constants, wires are fitted to a requested
//! width by zero-extension or truncation.

use crate::block::Block;
use crate::net::NetOp;
use crate::register::Register;
use crate::wire::Wire;
use rtlwire_common::{Literal, WireError, WireResult};
use tracing::trace;

/// Values that can stand in for a wire.
pub trait IntoWire<'a> {
    /// Turn `self` into a wire of `block`, `bitwidth` bits wide when given.
    ///
    /// # Errors
    /// Literal encoding errors, wires of another block, wires of unknown
    /// width when a width is requested.
    fn into_wire(self, block: &'a Block, bitwidth: Option<usize>) -> WireResult<Wire<'a>>;
}

impl<'a> IntoWire<'a> for Wire<'a> {
    #[track_caller]
    fn into_wire(self, block: &'a Block, bitwidth: Option<usize>) -> WireResult<Wire<'a>> {
        block.fit_wire(self, bitwidth)
    }
}

impl<'a> IntoWire<'a> for &Wire<'a> {
    #[track_caller]
    fn into_wire(self, block: &'a Block, bitwidth: Option<usize>) -> WireResult<Wire<'a>> {
        block.fit_wire(*self, bitwidth)
    }
}

impl<'a> IntoWire<'a> for Register<'a> {
    #[track_caller]
    fn into_wire(self, block: &'a Block, bitwidth: Option<usize>) -> WireResult<Wire<'a>> {
        block.fit_wire(self.wire(), bitwidth)
    }
}

impl<'a> IntoWire<'a> for &Register<'a> {
    #[track_caller]
    fn into_wire(self, block: &'a Block, bitwidth: Option<usize>) -> WireResult<Wire<'a>> {
        block.fit_wire(self.wire(), bitwidth)
    }
}

impl<'a> IntoWire<'a> for Literal {
    #[track_caller]
    fn into_wire(self, block: &'a Block, bitwidth: Option<usize>) -> WireResult<Wire<'a>> {
        match self {
            // strings carry their own width; fit afterwards
            Literal::Verilog(_) => {
                let constant = block.constant(self, None)?;
                block.fit_wire(constant, bitwidth)
            },
            other => block.constant(other, bitwidth),
        }
    }
}

impl<'a> IntoWire<'a> for &str {
    #[track_caller]
    fn into_wire(self, block: &'a Block, bitwidth: Option<usize>) -> WireResult<Wire<'a>> {
        Literal::from(self).into_wire(block, bitwidth)
    }
}

impl<'a> IntoWire<'a> for String {
    #[track_caller]
    fn into_wire(self, block: &'a Block, bitwidth: Option<usize>) -> WireResult<Wire<'a>> {
        Literal::from(self).into_wire(block, bitwidth)
    }
}

macro_rules! into_wire_for_literals {
    ($($t:ty),*) => {
        $(impl<'a> IntoWire<'a> for $t {
            #[track_caller]
            fn into_wire(self, block: &'a Block, bitwidth: Option<usize>) -> WireResult<Wire<'a>> {
                block.constant(self, bitwidth)
            }
        })*
    };
}

into_wire_for_literals!(
    bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
);

impl Block {
    /// Coerce `value` into a wire of this block.
    ///
    /// # Errors
    /// See [`IntoWire::into_wire`].
    #[track_caller]
    pub fn as_wire<'a>(
        &'a self,
        value: impl IntoWire<'a>,
        bitwidth: Option<usize>,
    ) -> WireResult<Wire<'a>> {
        value.into_wire(self, bitwidth)
    }

    /// Zero-extend or truncate `wire` to `bitwidth`; no width means no change.
    #[track_caller]
    pub(crate) fn fit_wire<'a>(
        &'a self,
        wire: Wire<'a>,
        bitwidth: Option<usize>,
    ) -> WireResult<Wire<'a>> {
        if !self.owns(&wire) {
            return Err(WireError::ForeignBlock(wire.name()));
        }
        let Some(bitwidth) = bitwidth else {
            return Ok(wire);
        };
        let current = wire.bitwidth()?;
        if bitwidth > current {
            wire.zero_extended(bitwidth)
        } else if bitwidth < current {
            trace!("[COERCE] truncate {} to {} bits", wire, bitwidth);
            wire.slice(..bitwidth)
        } else {
            Ok(wire)
        }
    }

    /// Zero-extend the narrower of two wires so both have the same width.
    ///
    /// # Errors
    /// Either width unknown, or a wire from another block.
    #[track_caller]
    pub fn match_bitwidth<'a>(
        &'a self,
        a: Wire<'a>,
        b: Wire<'a>,
    ) -> WireResult<(Wire<'a>, Wire<'a>)> {
        let a = self.fit_wire(a, None)?;
        let b = self.fit_wire(b, None)?;
        let width = a.bitwidth()?.max(b.bitwidth()?);
        Ok((self.fit_wire(a, Some(width))?, self.fit_wire(b, Some(width))?))
    }

    /// Join wires into one, the first argument ending up most significant.
    ///
    /// # Errors
    /// No wires, unknown widths, foreign wires.
    #[track_caller]
    pub fn concat<'a>(&'a self, parts: &[Wire<'a>]) -> WireResult<Wire<'a>> {
        match parts {
            [] => Err(WireError::EmptyConcat),
            [single] => self.fit_wire(*single, None),
            _ => {
                let mut bitwidth = 0;
                for part in parts {
                    self.fit_wire(*part, None)?;
                    bitwidth += part.bitwidth()?;
                }
                self.driven_wire(
                    bitwidth,
                    NetOp::Concat,
                    None,
                    parts.iter().map(Wire::id).collect(),
                )
            },
        }
    }

    /// `select ? truecase : falsecase`, with the cases widened to a common width.
    ///
    /// # Errors
    /// A selector that is not one bit wide, plus coercion errors. A failed
    /// mux leaves the block unchanged.
    #[track_caller]
    pub fn mux<'a>(
        &'a self,
        select: impl IntoWire<'a>,
        falsecase: impl IntoWire<'a>,
        truecase: impl IntoWire<'a>,
    ) -> WireResult<Wire<'a>> {
        let checkpoint = self.checkpoint();
        let result = self.build_mux(select, falsecase, truecase);
        self.settle(checkpoint, result)
    }

    #[track_caller]
    fn build_mux<'a>(
        &'a self,
        select: impl IntoWire<'a>,
        falsecase: impl IntoWire<'a>,
        truecase: impl IntoWire<'a>,
    ) -> WireResult<Wire<'a>> {
        let select = self.as_wire(select, None)?;
        let select_width = select.bitwidth()?;
        if select_width != 1 {
            return Err(WireError::ConditionWidth {
                name: select.name(),
                bitwidth: select_width,
            });
        }
        let falsecase = self.as_wire(falsecase, None)?;
        let truecase = self.as_wire(truecase, None)?;
        let (falsecase, truecase) = self.match_bitwidth(falsecase, truecase)?;
        self.driven_wire(
            falsecase.bitwidth()?,
            NetOp::Mux,
            None,
            vec![select.id(), falsecase.id(), truecase.id()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_become_minimal_constants() {
        let block = Block::new();
        let c = block.as_wire(3u8, None).unwrap();
        assert!(c.is_const());
        assert_eq!(c.bitwidth(), Ok(2));
        assert_eq!(c.const_value(), Some(3));
    }

    #[test]
    fn integers_take_the_requested_width() {
        let block = Block::new();
        let c = block.as_wire(3u8, Some(8)).unwrap();
        assert_eq!(c.bitwidth(), Ok(8));
        assert_eq!(block.net_count(), 0);
    }

    #[test]
    fn strings_are_fitted_after_encoding() {
        let block = Block::new();
        let c = block.as_wire("4'hA", Some(8)).unwrap();
        assert_eq!(c.bitwidth(), Ok(8));
        assert_eq!(block.nets().last().map(|n| n.op), Some(NetOp::Concat));
    }

    #[test]
    fn wires_from_other_blocks_are_rejected() {
        let first = Block::new();
        let second = Block::new();
        let a = first.input(Some(1), Some("a")).unwrap();
        assert_eq!(
            second.as_wire(a, None).unwrap_err(),
            WireError::ForeignBlock("a".into())
        );
    }

    #[test]
    fn match_bitwidth_extends_the_narrower() {
        let block = Block::new();
        let a = block.input(Some(3), Some("a")).unwrap();
        let b = block.input(Some(7), Some("b")).unwrap();
        let (a2, b2) = block.match_bitwidth(a, b).unwrap();
        assert_eq!(a2.bitwidth(), Ok(7));
        assert!(b2.same_wire(&b));
    }

    #[test]
    fn concat_sums_widths() {
        let block = Block::new();
        let hi = block.input(Some(3), Some("hi")).unwrap();
        let lo = block.input(Some(5), Some("lo")).unwrap();
        let both = block.concat(&[hi, lo]).unwrap();
        assert_eq!(both.bitwidth(), Ok(8));
        let net = block.drivers_of(&both).remove(0);
        assert_eq!(net.args, vec![hi.id(), lo.id()]);
        assert!(block.concat(&[hi]).unwrap().same_wire(&hi));
        assert_eq!(block.concat(&[]).unwrap_err(), WireError::EmptyConcat);
    }

    #[test]
    fn mux_needs_single_bit_select() {
        let block = Block::new();
        let sel = block.input(Some(2), Some("sel")).unwrap();
        assert!(matches!(
            block.mux(sel, 0u8, 1u8),
            Err(WireError::ConditionWidth { bitwidth: 2, .. })
        ));
        let s = block.input(Some(1), Some("s")).unwrap();
        let out = block.mux(s, 1u8, 12u8).unwrap();
        assert_eq!(out.bitwidth(), Ok(4));
    }
}
