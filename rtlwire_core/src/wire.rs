//! Wire handles.
//!
//! A [`Wire`] is a cheap, copyable handle onto a wire stored in a [`Block`].
//! Its kind decides which assignments it accepts:
//!
//! | kind       | `assign` | `conditional_assign` |
//! |------------|----------|----------------------|
//! | `Wire`     | yes      | yes                  |
//! | `Output`   | yes      | yes                  |
//! | `Input`    | no       | no                   |
//! | `Const`    | no       | no                   |
//! | `Register` | no (use [`Register::next`]) | no |

use crate::block::{Block, wire_label};
use crate::coerce::IntoWire;
use crate::net::{LogicNet, NetOp};
use crate::register::Register;
use rtlwire_common::{MAX_MAGNITUDE_BITS, WireError, WireId, WireResult};
use std::fmt;

/// What a wire is, and so which drives it may receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireKind {
    /// General wire.
    Wire,
    /// Driven from outside the block.
    Input,
    /// Read from outside the block.
    Output,
    /// Fixed at construction.
    Const,
    /// Clocked state element.
    Register,
}

impl WireKind {
    /// Single character tag used in `name/widthCODE` labels.
    #[must_use]
    pub const fn code(&self) -> char {
        match self {
            Self::Wire => 'W',
            Self::Input => 'I',
            Self::Output => 'O',
            Self::Const => 'C',
            Self::Register => 'R',
        }
    }
}

/// Handle onto one wire of a [`Block`].
#[derive(Clone, Copy)]
pub struct Wire<'a> {
    block: &'a Block,
    id: WireId,
}

impl<'a> Wire<'a> {
    pub(crate) const fn new(block: &'a Block, id: WireId) -> Self {
        Self { block, id }
    }

    /// Index of this wire in its block.
    #[must_use]
    pub const fn id(&self) -> WireId {
        self.id
    }

    /// The owning block.
    #[must_use]
    pub const fn block(&self) -> &'a Block {
        self.block
    }

    /// Current name.
    #[must_use]
    pub fn name(&self) -> String {
        self.block.with_wire(self.id, |w| w.name.clone())
    }

    /// Kind of wire.
    #[must_use]
    pub fn kind(&self) -> WireKind {
        self.block.with_wire(self.id, |w| w.kind)
    }

    /// Width, if already known.
    #[must_use]
    pub fn try_bitwidth(&self) -> Option<usize> {
        self.block.with_wire(self.id, |w| w.bitwidth)
    }

    /// Width of the wire.
    ///
    /// # Errors
    /// [`WireError::UnknownBitwidth`] until a width is set or inferred.
    pub fn bitwidth(&self) -> WireResult<usize> {
        self.try_bitwidth()
            .ok_or_else(|| WireError::UnknownBitwidth(self.name()))
    }

    /// An integer with the low `bitwidth` bits set.
    ///
    /// # Errors
    /// Unknown width, or a width above 128 bits.
    pub fn bitmask(&self) -> WireResult<u128> {
        let bitwidth = self.bitwidth()?;
        match bitwidth {
            w if w > MAX_MAGNITUDE_BITS => Err(WireError::ConstantTooWide(w)),
            MAX_MAGNITUDE_BITS => Ok(u128::MAX),
            w => Ok((1u128 << w) - 1),
        }
    }

    /// Encoded value of a constant wire.
    #[must_use]
    pub fn const_value(&self) -> Option<u128> {
        self.block.with_wire(self.id, |w| w.const_value)
    }

    /// True for inputs.
    #[must_use]
    pub fn is_input(&self) -> bool {
        self.kind() == WireKind::Input
    }

    /// True for outputs.
    #[must_use]
    pub fn is_output(&self) -> bool {
        self.kind() == WireKind::Output
    }

    /// True for constants.
    #[must_use]
    pub fn is_const(&self) -> bool {
        self.kind() == WireKind::Const
    }

    /// True for registers.
    #[must_use]
    pub fn is_register(&self) -> bool {
        self.kind() == WireKind::Register
    }

    /// The register view of this wire, if it is one.
    #[must_use]
    pub fn as_register(&self) -> Option<Register<'a>> {
        self.is_register().then(|| Register::from_wire(*self))
    }

    /// Identity comparison: same block, same wire. Never builds hardware.
    #[must_use]
    pub fn same_wire(&self, other: &Wire<'_>) -> bool {
        std::ptr::eq(self.block, other.block) && self.id == other.id
    }

    /// Give the wire a new name.
    ///
    /// # Errors
    /// Reserved, empty or already used names.
    pub fn rename(&self, name: &str) -> WireResult<()> {
        self.block.rename_wire(self.id, name)
    }

    /// Wires have no compile-time truth value; this always fails.
    ///
    /// # Errors
    /// Always [`WireError::BoolConversion`].
    pub fn to_bool(&self) -> WireResult<bool> {
        Err(WireError::BoolConversion(self.name()))
    }

    /// Drive this wire from `source` (`<<=`).
    ///
    /// The source is coerced to this wire's width when it has one; otherwise
    /// this wire takes the width of the source.
    ///
    /// # Errors
    /// Inputs, constants and registers refuse direct drives; coercion errors
    /// are passed through.
    #[track_caller]
    pub fn assign(&self, source: impl IntoWire<'a>) -> WireResult<()> {
        self.check_drivable()?;
        let source = self.prepare_for_assignment(source)?;
        self.build_wire_net(source)
    }

    /// Drive this wire from `source` under the enclosing condition (`|=`).
    ///
    /// # Errors
    /// Same refusals as [`Wire::assign`], plus a missing width or a missing
    /// condition scope.
    #[track_caller]
    pub fn conditional_assign(&self, source: impl IntoWire<'a>) -> WireResult<()> {
        self.check_drivable()?;
        if self.try_bitwidth().is_none() {
            return Err(WireError::ConditionalWithoutBitwidth(self.name()));
        }
        self.block.require_condition_scope(self)?;
        let source = self.prepare_for_assignment(source)?;
        self.block.stage_conditional(*self, source)
    }

    fn check_drivable(&self) -> WireResult<()> {
        match self.kind() {
            WireKind::Input => Err(WireError::AssignToInput(self.name())),
            WireKind::Const => Err(WireError::AssignToConst(self.name())),
            WireKind::Register => Err(WireError::AssignToRegister(self.name())),
            WireKind::Wire | WireKind::Output => Ok(()),
        }
    }

    /// Coerce `rhs` to this wire's width, or adopt the width of `rhs`.
    #[track_caller]
    pub(crate) fn prepare_for_assignment(&self, rhs: impl IntoWire<'a>) -> WireResult<Wire<'a>> {
        let rhs = self.block.as_wire(rhs, self.try_bitwidth())?;
        if let (None, Some(bitwidth)) = (self.try_bitwidth(), rhs.try_bitwidth()) {
            self.block.set_bitwidth(self.id, bitwidth)?;
        }
        Ok(rhs)
    }

    pub(crate) fn build_wire_net(&self, source: Wire<'a>) -> WireResult<()> {
        self.block.add_net(LogicNet::new(
            NetOp::Wire,
            None,
            vec![source.id],
            vec![self.id],
        ))?;
        Ok(())
    }
}

impl fmt::Display for Wire<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", wire_label(self.block, self.id))
    }
}

impl fmt::Debug for Wire<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wire")
            .field("id", &self.id)
            .field("label", &wire_label(self.block, self.id))
            .finish()
    }
}
