//! Registers and next-value staging.
//!
//! A register's next value goes through two steps. [`Register::next`] hands
//! out a [`NextHandle`]. Assigning into the handle coerces the value and
//! produces a [`NextCommit`] token without touching the block. Binding the
//! token back with [`Register::set_next`] commits it:
//!
//! ```text
//! Unstaged --assign--> token --set_next--> Committed
//!                            \--(conditional)--> Staged --finalize--> Committed
//! ```
//!
//! A register commits exactly once, and each token is bound at most once.

use crate::block::Block;
use crate::coerce::IntoWire;
use crate::net::{LogicNet, NetOp};
use crate::wire::Wire;
use rtlwire_common::{WireError, WireId, WireResult};
use std::fmt;
use tracing::debug;

/// Commit state of a register's next value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NextState {
    /// Nothing bound yet.
    #[default]
    Unstaged,
    /// Conditional candidates are waiting for [`Block::finalize_conditionals`].
    /// More candidates may follow; an unconditional commit may not.
    Staged,
    /// A register net has been built; no further commits.
    Committed,
}

/// A clocked state element.
///
/// Reading a register as a value (any operator, `as_wire`, ...) yields its
/// current-cycle output.
#[derive(Clone, Copy, Debug)]
pub struct Register<'a> {
    wire: Wire<'a>,
}

impl<'a> Register<'a> {
    pub(crate) const fn from_wire(wire: Wire<'a>) -> Self {
        Self { wire }
    }

    /// The register output as a plain wire handle.
    #[must_use]
    pub const fn wire(&self) -> Wire<'a> {
        self.wire
    }

    /// Current name.
    #[must_use]
    pub fn name(&self) -> String {
        self.wire.name()
    }

    /// Index of the register in its block.
    #[must_use]
    pub const fn id(&self) -> WireId {
        self.wire.id()
    }

    /// The owning block.
    #[must_use]
    pub const fn block(&self) -> &'a Block {
        self.wire.block()
    }

    /// Staging handle for the next-cycle value.
    #[must_use]
    pub const fn next(&self) -> NextHandle<'a> {
        NextHandle { register: *self }
    }

    /// Commit state.
    #[must_use]
    pub fn next_state(&self) -> NextState {
        self.block().with_wire(self.id(), |w| w.next_state)
    }

    /// The committed next-cycle value, if any.
    #[must_use]
    pub fn reg_in(&self) -> Option<Wire<'a>> {
        let block = self.block();
        block
            .with_wire(self.id(), |w| w.reg_in)
            .map(|id| Wire::new(block, id))
    }

    /// Bind a staging token back onto this register.
    ///
    /// An unconditional token builds the register net right away. A
    /// conditional one is queued with the block until
    /// [`Block::finalize_conditionals`].
    ///
    /// # Errors
    /// Tokens staged for another register, a register that is already
    /// committed, or an unconditional commit after conditional candidates.
    pub fn set_next(&self, commit: NextCommit<'a>) -> WireResult<()> {
        if !commit.register.same_wire(&self.wire) {
            return Err(WireError::ForeignNextCommit {
                register: self.name(),
                staged_for: commit.register.name(),
            });
        }
        if self.next_state() == NextState::Committed {
            return Err(WireError::NextAlreadySet(self.name()));
        }
        let block = self.block();
        if commit.is_conditional {
            return block.stage_conditional(self.wire, commit.rhs);
        }
        if self.next_state() == NextState::Staged {
            return Err(WireError::NextAlreadySet(self.name()));
        }
        block.build_register(self.id(), commit.rhs.id())
    }

    /// Shorthand for `set_next(next().assign(value)?)`.
    ///
    /// # Errors
    /// See [`NextHandle::assign`] and [`Register::set_next`].
    #[track_caller]
    pub fn assign_next(&self, value: impl IntoWire<'a>) -> WireResult<()> {
        let commit = self.next().assign(value)?;
        self.set_next(commit)
    }

    /// Shorthand for `set_next(next().conditional_assign(value)?)`.
    ///
    /// # Errors
    /// See [`NextHandle::conditional_assign`] and [`Register::set_next`].
    #[track_caller]
    pub fn conditional_assign_next(&self, value: impl IntoWire<'a>) -> WireResult<()> {
        let commit = self.next().conditional_assign(value)?;
        self.set_next(commit)
    }
}

impl fmt::Display for Register<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.wire, f)
    }
}

impl Block {
    /// Check-and-set of the pending drive, then the `r` net.
    pub(crate) fn build_register(&self, register: WireId, source: WireId) -> WireResult<()> {
        self.with_inner_mut(|inner| {
            let data = &mut inner.wires[register.as_usize()];
            if data.next_state == NextState::Committed {
                return Err(WireError::NextAlreadySet(data.name.clone()));
            }
            data.reg_in = Some(source);
            data.next_state = NextState::Committed;
            debug!("[REG] commit {}", data.name);
            Ok(())
        })?;
        self.add_net(LogicNet::new(
            NetOp::Register,
            None,
            vec![source],
            vec![register],
        ))?;
        Ok(())
    }
}

/// The `.next` view of a register; only good for producing tokens.
#[derive(Clone, Copy, Debug)]
pub struct NextHandle<'a> {
    register: Register<'a>,
}

impl<'a> NextHandle<'a> {
    /// The register this handle stages for.
    #[must_use]
    pub const fn register(&self) -> Register<'a> {
        self.register
    }

    /// Stage an unconditional next value (`<<=`).
    ///
    /// The value is coerced to the register width; a register without a width
    /// takes the width of the value.
    ///
    /// # Errors
    /// Coercion errors.
    #[track_caller]
    pub fn assign(&self, value: impl IntoWire<'a>) -> WireResult<NextCommit<'a>> {
        let rhs = self.register.wire.prepare_for_assignment(value)?;
        Ok(NextCommit {
            register: self.register.wire,
            rhs,
            is_conditional: false,
        })
    }

    /// Stage a next value under the enclosing condition (`|=`).
    ///
    /// # Errors
    /// A register without a width, a missing condition scope, coercion errors.
    #[track_caller]
    pub fn conditional_assign(&self, value: impl IntoWire<'a>) -> WireResult<NextCommit<'a>> {
        let wire = self.register.wire;
        if wire.try_bitwidth().is_none() {
            return Err(WireError::ConditionalWithoutBitwidth(wire.name()));
        }
        wire.block().require_condition_scope(&wire)?;
        let rhs = wire.prepare_for_assignment(value)?;
        Ok(NextCommit {
            register: wire,
            rhs,
            is_conditional: true,
        })
    }

    /// The staged value has no truth value; this always fails.
    ///
    /// # Errors
    /// Always [`WireError::BoolConversion`].
    pub fn to_bool(&self) -> WireResult<bool> {
        Err(WireError::BoolConversion(format!(
            "{}.next",
            self.register.name()
        )))
    }
}

/// A coerced next value waiting to be bound with [`Register::set_next`].
///
/// `set_next` consumes the token, so it cannot be bound twice:
///
/// ```compile_fail
/// use rtlwire_core::Block;
///
/// let block = Block::new();
/// let r = block.register(Some(2), Some("r")).unwrap();
/// let commit = r.next().assign(1).unwrap();
/// r.set_next(commit).unwrap();
/// r.set_next(commit).unwrap();
/// ```
#[must_use = "a staged next value does nothing until passed to `Register::set_next`"]
#[derive(Debug)]
pub struct NextCommit<'a> {
    register: Wire<'a>,
    rhs: Wire<'a>,
    is_conditional: bool,
}

impl<'a> NextCommit<'a> {
    /// Register the token was staged for.
    #[must_use]
    pub const fn register(&self) -> Wire<'a> {
        self.register
    }

    /// Coerced value.
    #[must_use]
    pub const fn rhs(&self) -> Wire<'a> {
        self.rhs
    }

    /// True when staged through `conditional_assign`.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        self.is_conditional
    }
}
