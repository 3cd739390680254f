//! Common types shared across the rtlwire workspace.
//!
//! This crate holds the pieces that do not need a netlist block: the error
//! taxonomy, block configuration, identifiers, name allocation and the
//! constant encoder.

mod config;
mod constant;
mod error;
mod ids;
mod naming;

pub use crate::config::*;
pub use crate::constant::*;
pub use crate::error::*;
pub use crate::ids::*;
pub use crate::naming::*;
