//! Guarded assignment.
//!
//! [`Block::conditional`] opens a scope guarded by a 1-bit wire. Inside it,
//! `conditional_assign` on wires and registers records candidates instead of
//! building nets. [`Block::finalize_conditionals`] later folds the candidates
//! of each target into one mux chain and builds the single driving net.

use crate::block::Block;
use crate::coerce::IntoWire;
use crate::register::NextState;
use crate::wire::{Wire, WireKind};
use indexmap::IndexMap;
use rtlwire_common::{WireError, WireId, WireResult};
use tracing::debug;

/// One guarded candidate for a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ConditionalUpdate {
    pub(crate) target: WireId,
    pub(crate) value: WireId,
    pub(crate) predicate: WireId,
}

/// Open scopes and the candidates recorded under them.
#[derive(Debug, Default)]
pub(crate) struct ConditionalState {
    /// Combined predicate of each open scope, innermost last.
    predicates: Vec<WireId>,
    updates: Vec<ConditionalUpdate>,
}

impl Block {
    /// Run `body` with `condition` guarding every `conditional_assign` inside.
    ///
    /// Nested scopes combine their conditions with `&`. The scope is closed
    /// again whether or not `body` fails.
    ///
    /// # Errors
    /// A condition that is not 1 bit wide, or any error from `body`. A
    /// rejected condition leaves the block unchanged.
    #[track_caller]
    pub fn conditional<'a, R>(
        &'a self,
        condition: impl IntoWire<'a>,
        body: impl FnOnce() -> WireResult<R>,
    ) -> WireResult<R> {
        let checkpoint = self.checkpoint();
        let predicate = self.scope_predicate(condition);
        let predicate = self.settle(checkpoint, predicate)?;

        self.with_inner_mut(|inner| inner.conditional.predicates.push(predicate.id()));
        let result = body();
        self.with_inner_mut(|inner| inner.conditional.predicates.pop());
        result
    }

    /// `condition`, combined with the enclosing scope's predicate if any.
    #[track_caller]
    fn scope_predicate<'a>(&'a self, condition: impl IntoWire<'a>) -> WireResult<Wire<'a>> {
        let condition = self.as_wire(condition, None)?;
        let bitwidth = condition.bitwidth()?;
        if bitwidth != 1 {
            return Err(WireError::ConditionWidth {
                name: condition.name(),
                bitwidth,
            });
        }
        let enclosing = self.with_inner(|inner| inner.conditional.predicates.last().copied());
        match enclosing {
            Some(outer) => Wire::new(self, outer) & condition,
            None => Ok(condition),
        }
    }

    /// Fail unless a condition scope is open.
    pub(crate) fn require_condition_scope(&self, target: &Wire<'_>) -> WireResult<()> {
        let open = self.with_inner(|inner| !inner.conditional.predicates.is_empty());
        if open {
            Ok(())
        } else {
            Err(WireError::NoConditionScope(target.name()))
        }
    }

    /// Record `value` as a candidate for `target` under the innermost scope.
    /// A register target moves to [`NextState::Staged`].
    pub(crate) fn stage_conditional(&self, target: Wire<'_>, value: Wire<'_>) -> WireResult<()> {
        self.with_inner_mut(|inner| {
            let predicate = *inner
                .conditional
                .predicates
                .last()
                .ok_or_else(|| WireError::NoConditionScope(inner.wire(target.id()).name.clone()))?;
            debug!(
                "[COND] {} |= {} when {}",
                inner.wire(target.id()).name,
                inner.wire(value.id()).name,
                inner.wire(predicate).name
            );
            inner.conditional.updates.push(ConditionalUpdate {
                target: target.id(),
                value: value.id(),
                predicate,
            });
            let data = &mut inner.wires[target.id().as_usize()];
            if data.kind == WireKind::Register {
                data.next_state = NextState::Staged;
            }
            Ok(())
        })
    }

    /// Number of recorded candidates not yet folded into nets.
    #[must_use]
    pub fn pending_conditionals(&self) -> usize {
        self.with_inner(|inner| inner.conditional.updates.len())
    }

    /// Build the driving net of every target with pending candidates.
    ///
    /// Candidates are folded in the order they were recorded, so a later one
    /// wins when several predicates hold. When none holds, a register keeps
    /// its value and a wire reads zero.
    ///
    /// # Errors
    /// A register that was committed in the meantime, or a scope that is
    /// still open.
    #[track_caller]
    pub fn finalize_conditionals(&self) -> WireResult<()> {
        let updates = self.with_inner_mut(|inner| {
            if inner.conditional.predicates.is_empty() {
                Ok(std::mem::take(&mut inner.conditional.updates))
            } else {
                Err(WireError::internal(
                    "finalize_conditionals called inside an open condition scope",
                ))
            }
        })?;

        let mut by_target: IndexMap<WireId, Vec<ConditionalUpdate>> = IndexMap::new();
        for update in updates {
            by_target.entry(update.target).or_default().push(update);
        }

        for (target, candidates) in by_target {
            let target = Wire::new(self, target);
            let bitwidth = target.bitwidth()?;
            let mut selected = match target.kind() {
                WireKind::Register => target,
                _ => self.constant(0u8, Some(bitwidth))?,
            };
            for candidate in &candidates {
                selected = self.mux(
                    Wire::new(self, candidate.predicate),
                    selected,
                    Wire::new(self, candidate.value),
                )?;
            }
            debug!(
                "[COND] {} folds {} candidates",
                target.name(),
                candidates.len()
            );

            match target.kind() {
                WireKind::Register => self.build_register(target.id(), selected.id())?,
                _ => target.build_wire_net(selected)?,
            }
        }
        Ok(())
    }
}
