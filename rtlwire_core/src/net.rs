//! Operation nodes.

use rtlwire_common::WireId;
use std::fmt;

/// The operator a [`LogicNet`] applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NetOp {
    /// Passthrough from one wire to another (`<<=`).
    Wire,
    /// Bitwise and.
    And,
    /// Bitwise or.
    Or,
    /// Bitwise xor.
    Xor,
    /// Bitwise nand.
    Nand,
    /// Addition with carry out.
    Add,
    /// Two's complement subtraction with borrow out.
    Sub,
    /// Unsigned multiplication.
    Mul,
    /// Unsigned less-than.
    Lt,
    /// Unsigned greater-than.
    Gt,
    /// Equality.
    Eq,
    /// Bitwise invert.
    Not,
    /// Bit selection; the net parameter lists the selected positions.
    Select,
    /// Concatenation, most significant argument first.
    Concat,
    /// Clocked register; the argument is the value for the next cycle.
    Register,
    /// Two-way multiplexer: `(select, falsecase, truecase)`.
    Mux,
}

impl NetOp {
    /// Single character tag used in textual dumps.
    #[must_use]
    pub const fn code(&self) -> char {
        match self {
            Self::Wire => 'w',
            Self::And => '&',
            Self::Or => '|',
            Self::Xor => '^',
            Self::Nand => 'n',
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Lt => '<',
            Self::Gt => '>',
            Self::Eq => '=',
            Self::Not => '~',
            Self::Select => 's',
            Self::Concat => 'c',
            Self::Register => 'r',
            Self::Mux => 'x',
        }
    }

    /// Width of the result of a two-operand op on operands of `width` bits.
    ///
    /// Returns `None` for operators that are not binary.
    #[must_use]
    pub const fn binary_result_width(&self, width: usize) -> Option<usize> {
        match self {
            Self::Add | Self::Sub => Some(width + 1),
            Self::Mul => Some(width * 2),
            Self::Lt | Self::Gt | Self::Eq => Some(1),
            Self::And | Self::Or | Self::Xor | Self::Nand => Some(width),
            _ => None,
        }
    }
}

impl fmt::Display for NetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An immutable record connecting argument wires to destination wires.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LogicNet {
    /// The operator.
    pub op: NetOp,
    /// Static parameters (selected positions for [`NetOp::Select`]).
    pub param: Option<Vec<usize>>,
    /// Ordered inputs.
    pub args: Vec<WireId>,
    /// Ordered outputs.
    pub dests: Vec<WireId>,
}

impl LogicNet {
    /// Build a net.
    pub const fn new(
        op: NetOp,
        param: Option<Vec<usize>>,
        args: Vec<WireId>,
        dests: Vec<WireId>,
    ) -> Self {
        Self {
            op,
            param,
            args,
            dests,
        }
    }

    /// True when `wire` is one of the outputs.
    #[must_use]
    pub fn drives(&self, wire: WireId) -> bool {
        self.dests.contains(&wire)
    }

    /// True when `wire` is one of the inputs.
    #[must_use]
    pub fn reads(&self, wire: WireId) -> bool {
        self.args.contains(&wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NetOp::Add, 4, 5)]
    #[case(NetOp::Sub, 4, 5)]
    #[case(NetOp::Mul, 4, 8)]
    #[case(NetOp::And, 4, 4)]
    #[case(NetOp::Nand, 7, 7)]
    #[case(NetOp::Lt, 16, 1)]
    #[case(NetOp::Eq, 3, 1)]
    fn binary_widths(#[case] op: NetOp, #[case] width: usize, #[case] expected: usize) {
        assert_eq!(op.binary_result_width(width), Some(expected));
    }

    #[test]
    fn unary_ops_have_no_binary_width() {
        assert_eq!(NetOp::Not.binary_result_width(4), None);
        assert_eq!(NetOp::Register.binary_result_width(4), None);
    }

    #[test]
    fn drives_and_reads() {
        let net = LogicNet::new(
            NetOp::Wire,
            None,
            vec![WireId::new(0)],
            vec![WireId::new(1)],
        );
        assert!(net.drives(WireId::new(1)));
        assert!(net.reads(WireId::new(0)));
        assert!(!net.drives(WireId::new(0)));
        assert_eq!(net.op.to_string(), "w");
    }
}
