//! The netlist block.
//!
//! A [`Block`] owns every wire and every net of one circuit description,
//! together with the name registry and the name counters. Wire handles borrow
//! the block, so all mutation goes through a `RefCell`; each construction step
//! takes the borrow once, validates, then appends.

use crate::conditional::ConditionalState;
use crate::net::{LogicNet, NetOp};
use crate::register::{NextState, Register};
use crate::wire::{Wire, WireKind};
use indexmap::IndexMap;
use itertools::Itertools;
use rtlwire_common::*;
use std::cell::RefCell;
use std::fmt;
use std::panic::Location;
use tracing::{debug, trace};

/// Everything the block knows about one wire.
#[derive(Clone, Debug)]
pub(crate) struct WireData {
    pub(crate) name: String,
    pub(crate) bitwidth: Option<usize>,
    pub(crate) kind: WireKind,
    pub(crate) const_value: Option<u128>,
    /// Pending drive of a register, once committed.
    pub(crate) reg_in: Option<WireId>,
    pub(crate) next_state: NextState,
}

impl WireData {
    fn label(&self) -> String {
        match self.bitwidth {
            Some(w) => format!("{}/{}{}", self.name, w, self.kind.code()),
            None => format!("{}/?{}", self.name, self.kind.code()),
        }
    }
}

/// Block extent recorded by [`Block::checkpoint`].
#[derive(Debug)]
pub(crate) struct Checkpoint {
    wires: usize,
    nets: usize,
    temp_names: NameIndexer,
    const_names: NameIndexer,
}

/// How a new wire gets its name.
pub(crate) enum NameRequest<'n> {
    /// Caller supplied.
    Given(&'n str),
    /// Next temporary name.
    Temp,
    /// Next constant name, suffixed with the literal.
    Const(String),
}

#[derive(Debug)]
pub(crate) struct BlockInner {
    pub(crate) wires: Vec<WireData>,
    /// Name registry, in registration order.
    pub(crate) by_name: IndexMap<String, WireId>,
    pub(crate) nets: Vec<LogicNet>,
    temp_names: NameIndexer,
    const_names: NameIndexer,
    pub(crate) conditional: ConditionalState,
}

impl BlockInner {
    pub(crate) fn wire(&self, id: WireId) -> &WireData {
        &self.wires[id.as_usize()]
    }

    fn unregister_name(&mut self, name: &str) -> Option<WireId> {
        self.by_name.shift_remove(name)
    }

    pub(crate) fn format_net(&self, net: &LogicNet) -> String {
        let dests = net.dests.iter().map(|d| self.wire(*d).label()).join(", ");
        let args = net.args.iter().map(|a| self.wire(*a).label()).join(", ");
        match &net.param {
            Some(param) => format!(
                "{} <-- {} -- {} ({})",
                dests,
                net.op,
                args,
                param.iter().join(", ")
            ),
            None => format!("{} <-- {} -- {}", dests, net.op, args),
        }
    }
}

/// Container of all wires and nets of one circuit description.
#[derive(Debug)]
pub struct Block {
    config: BlockConfig,
    inner: RefCell<BlockInner>,
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl Block {
    /// An empty block with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BlockConfig::default())
    }

    /// An empty block.
    #[must_use]
    pub fn with_config(config: BlockConfig) -> Self {
        let inner = BlockInner {
            wires: Vec::new(),
            by_name: IndexMap::new(),
            nets: Vec::new(),
            temp_names: NameIndexer::new(config.temp_prefix.clone()),
            const_names: NameIndexer::new(config.const_prefix.clone()),
            conditional: ConditionalState::default(),
        };
        Self {
            config,
            inner: RefCell::new(inner),
        }
    }

    /// The configuration this block was built with.
    #[must_use]
    pub const fn config(&self) -> &BlockConfig {
        &self.config
    }

    // === Construction ===

    /// A general wire. Without a width, the width is taken from the first
    /// value assigned into it.
    ///
    /// # Errors
    /// Zero width, reserved or duplicate names.
    #[track_caller]
    pub fn wire(&self, bitwidth: Option<usize>, name: Option<&str>) -> WireResult<Wire<'_>> {
        self.new_wire(WireKind::Wire, bitwidth, name)
    }

    /// A wire driven from outside the block.
    ///
    /// # Errors
    /// Same as [`Block::wire`].
    #[track_caller]
    pub fn input(&self, bitwidth: Option<usize>, name: Option<&str>) -> WireResult<Wire<'_>> {
        self.new_wire(WireKind::Input, bitwidth, name)
    }

    /// A wire read from outside the block.
    ///
    /// # Errors
    /// Same as [`Block::wire`].
    #[track_caller]
    pub fn output(&self, bitwidth: Option<usize>, name: Option<&str>) -> WireResult<Wire<'_>> {
        self.new_wire(WireKind::Output, bitwidth, name)
    }

    /// A clocked state element.
    ///
    /// # Errors
    /// Same as [`Block::wire`].
    #[track_caller]
    pub fn register(
        &self,
        bitwidth: Option<usize>,
        name: Option<&str>,
    ) -> WireResult<Register<'_>> {
        let wire = self.new_wire(WireKind::Register, bitwidth, name)?;
        Ok(Register::from_wire(wire))
    }

    /// A constant wire holding `value`.
    ///
    /// The literal is encoded and checked against the width before anything
    /// is registered.
    ///
    /// # Errors
    /// Any literal error from [`checked_constant`].
    #[track_caller]
    pub fn constant(
        &self,
        value: impl Into<Literal>,
        bitwidth: Option<usize>,
    ) -> WireResult<Wire<'_>> {
        let literal = value.into();
        let encoded = checked_constant(&literal, bitwidth)?;
        let id = self.register_wire(
            WireKind::Const,
            Some(encoded.bitwidth),
            NameRequest::Const(literal.to_string()),
            Some(encoded.magnitude),
        )?;
        Ok(Wire::new(self, id))
    }

    #[track_caller]
    fn new_wire(
        &self,
        kind: WireKind,
        bitwidth: Option<usize>,
        name: Option<&str>,
    ) -> WireResult<Wire<'_>> {
        let bitwidth = validate_bitwidth(bitwidth)?;
        let request = match name {
            Some(name) => NameRequest::Given(name),
            None => NameRequest::Temp,
        };
        let id = self.register_wire(kind, bitwidth, request, None)?;
        Ok(Wire::new(self, id))
    }

    /// Add a wire to the block and its name to the registry.
    #[track_caller]
    pub(crate) fn register_wire(
        &self,
        kind: WireKind,
        bitwidth: Option<usize>,
        request: NameRequest<'_>,
        const_value: Option<u128>,
    ) -> WireResult<WireId> {
        if let NameRequest::Given(name) = &request {
            validate_wire_name(name)?;
        }
        let location = Location::caller();
        let mut inner = self.inner.borrow_mut();

        let name = match request {
            NameRequest::Given(name) => {
                if inner.by_name.contains_key(name) {
                    return Err(WireError::DuplicateName(name.to_string()));
                }
                name.to_string()
            },
            NameRequest::Temp => loop {
                let mut candidate = inner.temp_names.next_name();
                if self.config.debug_names {
                    candidate.push_str(&callsite_suffix(location));
                }
                if !inner.by_name.contains_key(&candidate) {
                    break candidate;
                }
            },
            NameRequest::Const(literal) => loop {
                let candidate = format!("{}_{}", inner.const_names.next_name(), literal);
                if !inner.by_name.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        let id = WireId::try_from(inner.wires.len())
            .map_err(|_| WireError::CapacityExceeded("wires"))?;
        trace!("[BLOCK] register {} as {} ({:?}, bitwidth {:?})", name, id, kind, bitwidth);
        inner.by_name.insert(name.clone(), id);
        inner.wires.push(WireData {
            name,
            bitwidth,
            kind,
            const_value,
            reg_in: None,
            next_state: NextState::Unstaged,
        });
        Ok(id)
    }

    /// Move a wire to a new name. The old name is removed before the new one
    /// is inserted, so no alias survives.
    pub(crate) fn rename_wire(&self, id: WireId, new_name: &str) -> WireResult<()> {
        validate_wire_name(new_name)?;
        let mut inner = self.inner.borrow_mut();
        let old_name = inner.wire(id).name.clone();
        if old_name == new_name {
            return Ok(());
        }
        if inner.by_name.contains_key(new_name) {
            return Err(WireError::DuplicateName(new_name.to_string()));
        }
        inner.unregister_name(&old_name);
        inner.wires[id.as_usize()].name = new_name.to_string();
        inner.by_name.insert(new_name.to_string(), id);
        trace!("[BLOCK] rename {} -> {}", old_name, new_name);
        Ok(())
    }

    /// Fix the width of a wire whose width is still unset.
    pub(crate) fn set_bitwidth(&self, id: WireId, bitwidth: usize) -> WireResult<()> {
        let mut inner = self.inner.borrow_mut();
        let data = &mut inner.wires[id.as_usize()];
        match data.bitwidth {
            None => {
                trace!("[BLOCK] infer bitwidth {} for {}", bitwidth, data.name);
                data.bitwidth = Some(bitwidth);
                Ok(())
            },
            Some(current) if current == bitwidth => Ok(()),
            Some(current) => Err(WireError::internal(format!(
                "bitwidth of \"{}\" is fixed at {current} and cannot become {bitwidth}",
                data.name
            ))),
        }
    }

    /// Append a net.
    pub(crate) fn add_net(&self, net: LogicNet) -> WireResult<NetId> {
        let mut inner = self.inner.borrow_mut();
        let id = NetId::try_from(inner.nets.len())
            .map_err(|_| WireError::CapacityExceeded("nets"))?;
        debug!("[NET] {} {}", id, inner.format_net(&net));
        inner.nets.push(net);
        Ok(id)
    }

    /// A new temporary wire of `bitwidth` bits, driven by one `op` net.
    #[track_caller]
    pub(crate) fn driven_wire(
        &self,
        bitwidth: usize,
        op: NetOp,
        param: Option<Vec<usize>>,
        args: Vec<WireId>,
    ) -> WireResult<Wire<'_>> {
        let checkpoint = self.checkpoint();
        let result = match self.wire(Some(bitwidth), None) {
            Ok(wire) => self
                .add_net(LogicNet::new(op, param, args, vec![wire.id()]))
                .map(|_| wire),
            Err(err) => Err(err),
        };
        self.settle(checkpoint, result)
    }

    /// Current extent of the block, to roll back to if a build step fails.
    pub(crate) fn checkpoint(&self) -> Checkpoint {
        let inner = self.inner.borrow();
        Checkpoint {
            wires: inner.wires.len(),
            nets: inner.nets.len(),
            temp_names: inner.temp_names.clone(),
            const_names: inner.const_names.clone(),
        }
    }

    /// Pass `result` through; on error, drop every wire, name and net added
    /// since `checkpoint`.
    pub(crate) fn settle<R>(&self, checkpoint: Checkpoint, result: WireResult<R>) -> WireResult<R> {
        if result.is_err() {
            let mut inner = self.inner.borrow_mut();
            let added = inner.wires.len() - checkpoint.wires;
            if added > 0 || inner.nets.len() > checkpoint.nets {
                trace!(
                    "[BLOCK] roll back {} wires, {} nets",
                    added,
                    inner.nets.len() - checkpoint.nets
                );
            }
            inner
                .by_name
                .retain(|_, id| id.as_usize() < checkpoint.wires);
            inner.wires.truncate(checkpoint.wires);
            inner.nets.truncate(checkpoint.nets);
            inner.temp_names = checkpoint.temp_names;
            inner.const_names = checkpoint.const_names;
        }
        result
    }

    pub(crate) fn with_wire<R>(&self, id: WireId, f: impl FnOnce(&WireData) -> R) -> R {
        f(self.inner.borrow().wire(id))
    }

    pub(crate) fn with_inner_mut<R>(&self, f: impl FnOnce(&mut BlockInner) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    pub(crate) fn with_inner<R>(&self, f: impl FnOnce(&BlockInner) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// True when `wire` was created by this block.
    #[must_use]
    pub fn owns(&self, wire: &Wire<'_>) -> bool {
        std::ptr::eq(self, wire.block())
    }

    // === Queries ===

    /// Look a wire up by its current name.
    #[must_use]
    pub fn wire_by_name(&self, name: &str) -> Option<Wire<'_>> {
        let id = self.inner.borrow().by_name.get(name).copied();
        id.map(|id| Wire::new(self, id))
    }

    /// All wires, in creation order.
    #[must_use]
    pub fn wires(&self) -> Vec<Wire<'_>> {
        let count = self.inner.borrow().wires.len();
        (0..count)
            .filter_map(|idx| WireId::try_from(idx).ok())
            .map(|id| Wire::new(self, id))
            .collect()
    }

    /// All registered names, in registration order.
    #[must_use]
    pub fn wire_names(&self) -> Vec<String> {
        self.inner.borrow().by_name.keys().cloned().collect()
    }

    /// A copy of every net, in creation order.
    #[must_use]
    pub fn nets(&self) -> Vec<LogicNet> {
        self.inner.borrow().nets.clone()
    }

    /// Number of wires.
    #[must_use]
    pub fn wire_count(&self) -> usize {
        self.inner.borrow().wires.len()
    }

    /// Number of nets.
    #[must_use]
    pub fn net_count(&self) -> usize {
        self.inner.borrow().nets.len()
    }

    /// Nets that have `wire` among their outputs.
    #[must_use]
    pub fn drivers_of(&self, wire: &Wire<'_>) -> Vec<LogicNet> {
        self.inner
            .borrow()
            .nets
            .iter()
            .filter(|net| self.owns(wire) && net.drives(wire.id()))
            .cloned()
            .collect()
    }

    /// `dest <-- op -- args (params)` rendering of a net of this block.
    #[must_use]
    pub fn format_net(&self, net: &LogicNet) -> String {
        self.inner.borrow().format_net(net)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        for net in &inner.nets {
            writeln!(f, "{}", inner.format_net(net))?;
        }
        Ok(())
    }
}

pub(crate) fn wire_label(block: &Block, id: WireId) -> String {
    block.with_wire(id, WireData::label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_names_are_per_block() {
        let first = Block::new();
        let second = Block::new();
        assert_eq!(first.wire(Some(1), None).unwrap().name(), "tmp1");
        assert_eq!(first.wire(Some(1), None).unwrap().name(), "tmp2");
        assert_eq!(second.wire(Some(1), None).unwrap().name(), "tmp1");
    }

    #[test]
    fn temp_names_skip_taken_names() {
        let block = Block::new();
        block.wire(Some(1), Some("tmp1")).unwrap();
        assert_eq!(block.wire(Some(1), None).unwrap().name(), "tmp2");
    }

    #[test]
    fn debug_names_carry_location() {
        let block = Block::with_config(BlockConfig::debug());
        let wire = block.wire(Some(4), None).unwrap();
        assert!(wire.name().starts_with("tmp1_"));
        assert!(wire.name().contains("blockrs_line"));
    }

    #[test]
    fn constant_names_use_their_own_counter() {
        let block = Block::new();
        block.wire(Some(1), None).unwrap();
        let c = block.constant(5u8, None).unwrap();
        assert_eq!(c.name(), "const_1_5");
    }

    #[test]
    fn failed_construction_registers_nothing() {
        let block = Block::new();
        assert!(block.wire(Some(0), Some("a")).is_err());
        assert!(block.constant(300u32, Some(8)).is_err());
        assert!(block.wire(Some(1), Some("clock")).is_err());
        assert_eq!(block.wire_count(), 0);
        assert!(block.wire_by_name("a").is_none());
    }

    #[test]
    fn rejected_operands_leave_no_constants_behind() {
        let block = Block::new();
        let w = block.wire(None, Some("w")).unwrap();
        let names = block.wire_names();

        assert_eq!(
            (w + 3u8).unwrap_err(),
            WireError::UnknownBitwidth("w".into())
        );
        assert_eq!(
            (10u8 - w).unwrap_err(),
            WireError::UnknownBitwidth("w".into())
        );
        assert_eq!(block.wire_count(), 1);
        assert_eq!(block.wire_names(), names);
        assert_eq!(block.net_count(), 0);
    }

    #[test]
    fn rejected_selectors_leave_no_constants_behind() {
        let block = Block::new();
        assert!(matches!(
            block.conditional(3u8, || Ok(())),
            Err(WireError::ConditionWidth { bitwidth: 2, .. })
        ));
        assert!(matches!(
            block.mux(2u8, 0u8, 1u8),
            Err(WireError::ConditionWidth { bitwidth: 2, .. })
        ));
        assert_eq!(block.wire_count(), 0);
        assert_eq!(block.net_count(), 0);
        assert_eq!(block.pending_conditionals(), 0);

        // still usable after the rollbacks
        let a = block.input(Some(1), Some("a")).unwrap();
        let y = (a + 1u8).unwrap();
        assert_eq!(block.wire_count(), 3);
        assert_eq!(block.sanity_check(), Ok(()));
        assert!(y.bitwidth().is_ok());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let block = Block::new();
        block.input(Some(1), Some("a")).unwrap();
        assert_eq!(
            block.wire(Some(1), Some("a")).unwrap_err(),
            WireError::DuplicateName("a".into())
        );
    }

    #[test]
    fn display_lists_nets() {
        let block = Block::new();
        let a = block.input(Some(2), Some("a")).unwrap();
        let y = block.output(Some(2), Some("y")).unwrap();
        y.assign(a).unwrap();
        assert_eq!(block.to_string(), "y/2O <-- w -- a/2I\n");
    }
}
