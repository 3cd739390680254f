//! Error types for wire construction.
//!
//! Every failure is reported at the call that detects it and is permanent:
//! nothing is retried and nothing is registered in the block before the
//! failing check runs.

use thiserror::Error;

/// Shorthand for results produced while describing a circuit.
pub type WireResult<T> = Result<T, WireError>;

/// Broad classification of a [`WireError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input: bad widths, bad literals, empty selections.
    Shape,
    /// A value or width that does not fit where it was asked to go.
    Range,
    /// A construction rule was broken (writing an input, double commit, ...).
    Protocol,
    /// The library itself reached an inconsistent state.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shape => write!(f, "shape"),
            Self::Range => write!(f, "range"),
            Self::Protocol => write!(f, "protocol"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Errors raised while building wires and nets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    // === Shape ===
    /// Bitwidths must be positive.
    #[error("bitwidth must be a positive integer or unspecified, got {0}")]
    InvalidBitwidth(usize),

    /// An operation needed the width of a wire that has none yet.
    #[error("bitwidth of wire \"{0}\" is not yet defined")]
    UnknownBitwidth(String),

    /// Wire names cannot be empty.
    #[error("wire names must not be empty")]
    EmptyName,

    /// `clk` and `clock` belong to the implicit clock.
    #[error("\"{0}\" is reserved: clock signals should never be explicit")]
    ReservedName(String),

    /// A string constant that is not of the form `<width>'<base><digits>`.
    #[error("string \"{0}\" for a constant is not in verilog style format")]
    MalformedLiteral(String),

    /// Verilog `s` marker.
    #[error("signed integers are not supported in verilog-style constant \"{0}\"")]
    SignedLiteral(String),

    /// A verilog-style string already carries its own width.
    #[error(
        "bitwidth of constant \"{0}\" should be unspecified when created from a string \
         (use the verilog style width instead)"
    )]
    BitwidthWithStringLiteral(String),

    /// Booleans are always one bit wide.
    #[error("boolean constant has bitwidth {0}, expected 1")]
    BoolBitwidth(usize),

    /// A selection that picks no bit at all.
    #[error("selection {0} must select at least one bit")]
    EmptySelection(String),

    /// A single index past either end of the wire.
    #[error("index {index} is out of range for a wire of bitwidth {bitwidth}")]
    IndexOutOfRange {
        /// The requested index, as written by the caller.
        index: isize,
        /// Width of the indexed wire.
        bitwidth: usize,
    },

    /// Slices with a zero step.
    #[error("slice step cannot be zero")]
    ZeroSliceStep,

    /// Concatenation of nothing.
    #[error("concatenation needs at least one wire")]
    EmptyConcat,

    /// Conditions and mux selectors must be one bit wide.
    #[error("condition \"{name}\" must be 1 bit wide, got {bitwidth}")]
    ConditionWidth {
        /// Name of the offending wire.
        name: String,
        /// Its width.
        bitwidth: usize,
    },

    // === Range ===
    /// Negative constants cannot infer their width.
    #[error("negative constant {0} must have its bitwidth declared explicitly")]
    NegativeWithoutBitwidth(i128),

    /// A negative value that two's complement cannot express at this width.
    #[error("insufficient bits for negative number {value} at bitwidth {bitwidth}")]
    NegativeOverflow {
        /// The literal as written.
        value: String,
        /// The requested width.
        bitwidth: usize,
    },

    /// A constant magnitude that does not fit its width.
    #[error("constant \"{value}\" cannot fit in the specified {bitwidth} bits")]
    ConstantOverflow {
        /// The literal as written.
        value: String,
        /// The width it had to fit in.
        bitwidth: usize,
    },

    /// Negative constants are stored as a 128-bit pattern at most.
    #[error("negative constant at bitwidth {0} exceeds the 128 bit constant limit")]
    ConstantTooWide(usize),

    /// A block holds at most `u32::MAX + 1` wires and as many nets.
    #[error("block cannot hold more {0}")]
    CapacityExceeded(&'static str),

    /// `sign_extended` / `zero_extended` to a narrower width.
    #[error(
        "neither zero_extended nor sign_extended can reduce the number of bits \
         (\"{name}\" is {from} bits, {to} requested)"
    )]
    ExtensionShrinks {
        /// Wire being extended.
        name: String,
        /// Its current width.
        from: usize,
        /// The requested width.
        to: usize,
    },

    // === Protocol ===
    /// Inputs are driven from outside the description.
    #[error(
        "connection attempted on Input \"{0}\": inputs cannot have values generated \
         internally"
    )]
    AssignToInput(String),

    /// Constants are fixed at construction.
    #[error("constant wires, such as \"{0}\", should never be assigned to")]
    AssignToConst(String),

    /// Registers are written through their next value only.
    #[error("register \"{0}\" cannot be set directly, set its next value instead")]
    AssignToRegister(String),

    /// The register pending drive is write-once.
    #[error("next value of register \"{0}\" should be set once and only once")]
    NextAlreadySet(String),

    /// A staging token committed to a different register than it was made for.
    #[error("next value staged for \"{staged_for}\" cannot be committed to \"{register}\"")]
    ForeignNextCommit {
        /// Register receiving the commit.
        register: String,
        /// Register the token was produced by.
        staged_for: String,
    },

    /// Conditional assignment requires a fixed width.
    #[error("conditional assignment is only defined on wires with a predefined bitwidth (\"{0}\")")]
    ConditionalWithoutBitwidth(String),

    /// Conditional assignment outside any condition scope.
    #[error("conditional assignment to \"{0}\" made outside of a condition scope")]
    NoConditionScope(String),

    /// Wires never evaluate to host booleans.
    #[error(
        "cannot convert \"{0}\" to a compile-time boolean; comparisons build hardware, \
         use the 1-bit result wire instead"
    )]
    BoolConversion(String),

    /// Shift and modulo operators.
    #[error("the {op} operator is not supported on wires. {hint}")]
    UnsupportedOperator {
        /// The rejected operator.
        op: &'static str,
        /// Where to go instead.
        hint: &'static str,
    },

    /// Names are unique within a block.
    #[error("a wire named \"{0}\" already exists in this block")]
    DuplicateName(String),

    /// Handles only combine with handles of the same block.
    #[error("wire \"{0}\" belongs to a different block")]
    ForeignBlock(String),

    /// A non-input wire nothing drives.
    #[error("wire \"{0}\" is never driven")]
    Undriven(String),

    /// A wire driven by more than one net.
    #[error("wire \"{name}\" is driven by {drivers} nets")]
    MultiplyDriven {
        /// The wire.
        name: String,
        /// How many nets drive it.
        drivers: usize,
    },

    /// An input or constant that ended up as a net destination.
    #[error("wire \"{0}\" cannot be driven from inside the block")]
    DrivenSource(String),

    /// Conditional updates that were never folded into nets.
    #[error("{0} conditional updates were staged but never finalized")]
    PendingConditional(usize),

    // === Internal ===
    /// A broken internal invariant. Report as a defect.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WireError {
    /// The taxonomy bucket this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBitwidth(_)
            | Self::UnknownBitwidth(_)
            | Self::EmptyName
            | Self::ReservedName(_)
            | Self::MalformedLiteral(_)
            | Self::SignedLiteral(_)
            | Self::BitwidthWithStringLiteral(_)
            | Self::BoolBitwidth(_)
            | Self::EmptySelection(_)
            | Self::IndexOutOfRange { .. }
            | Self::ZeroSliceStep
            | Self::EmptyConcat
            | Self::ConditionWidth { .. } => ErrorKind::Shape,

            Self::NegativeWithoutBitwidth(_)
            | Self::NegativeOverflow { .. }
            | Self::ConstantOverflow { .. }
            | Self::ConstantTooWide(_)
            | Self::CapacityExceeded(_)
            | Self::ExtensionShrinks { .. } => ErrorKind::Range,

            Self::AssignToInput(_)
            | Self::AssignToConst(_)
            | Self::AssignToRegister(_)
            | Self::NextAlreadySet(_)
            | Self::ForeignNextCommit { .. }
            | Self::ConditionalWithoutBitwidth(_)
            | Self::NoConditionScope(_)
            | Self::BoolConversion(_)
            | Self::UnsupportedOperator { .. }
            | Self::DuplicateName(_)
            | Self::ForeignBlock(_)
            | Self::Undriven(_)
            | Self::MultiplyDriven { .. }
            | Self::DrivenSource(_)
            | Self::PendingConditional(_) => ErrorKind::Protocol,

            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for errors that indicate a bug in this library rather than misuse.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Internal)
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(WireError::InvalidBitwidth(0).kind(), ErrorKind::Shape);
        assert_eq!(WireError::EmptySelection("5..2".into()).kind(), ErrorKind::Shape);
        assert_eq!(
            WireError::ConstantOverflow {
                value: "300".into(),
                bitwidth: 8
            }
            .kind(),
            ErrorKind::Range
        );
        assert_eq!(WireError::NextAlreadySet("r".into()).kind(), ErrorKind::Protocol);
        assert_eq!(WireError::BoolConversion("a".into()).kind(), ErrorKind::Protocol);
        assert!(WireError::internal("negative constant").is_internal());
        assert!(!WireError::AssignToInput("a".into()).is_internal());
    }

    #[test]
    fn messages_name_the_wire() {
        let msg = WireError::AssignToConst("const_1_5".into()).to_string();
        assert!(msg.contains("const_1_5"));
        assert_eq!(ErrorKind::Protocol.to_string(), "protocol");
    }
}
