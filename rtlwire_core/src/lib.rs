//! Width-tracked wire handles that build a netlist as they are combined.
//!
//! A [`Block`] owns the netlist. Wires created from it are combined with
//! operators and builder methods; each operation appends one [`LogicNet`].
//!
//! ```
//! use rtlwire_core::Block;
//!
//! let block = Block::new();
//! let a = block.input(Some(4), Some("a")).unwrap();
//! let b = block.input(Some(4), Some("b")).unwrap();
//! let sum = (a + b).unwrap();
//! assert_eq!(sum.bitwidth(), Ok(5));
//!
//! let acc = block.register(Some(5), Some("acc")).unwrap();
//! acc.set_next(acc.next().assign(sum).unwrap()).unwrap();
//! assert!(acc.set_next(acc.next().assign(0u8).unwrap()).is_err());
//! ```

mod block;
mod coerce;
mod conditional;
mod net;
mod ops;
mod register;
mod sanity;
mod select;
mod wire;

pub use crate::block::Block;
pub use crate::coerce::IntoWire;
pub use crate::net::{LogicNet, NetOp};
pub use crate::register::{NextCommit, NextHandle, NextState, Register};
pub use crate::select::{BitSelect, Slice};
pub use crate::wire::{Wire, WireKind};

pub use rtlwire_common::{
    BlockConfig, ErrorKind, Literal, NetId, WireError, WireId, WireResult,
};
