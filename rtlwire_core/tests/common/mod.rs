#![allow(dead_code)]

use rtlwire_core::{Block, NetOp, Wire};
use std::sync::OnceLock;

pub fn init_test_logger() {
    static INIT: OnceLock<()> = OnceLock::new();
    let _ = INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Assert that a result failed with an error of the given kind
#[macro_export]
macro_rules! assert_err_kind {
    ($result:expr, $kind:expr) => {
        match $result {
            Ok(v) => panic!("Expected {:?} error, got Ok({:?})", $kind, v),
            Err(e) => assert_eq!(e.kind(), $kind, "Unexpected error: {}", e),
        }
    };
}

/// Operators of every net in the block, in creation order
pub fn net_ops(block: &Block) -> Vec<NetOp> {
    block.nets().iter().map(|net| net.op).collect()
}

/// The single wire driving `wire` through a net of type `op`
pub fn driver_arg<'a>(block: &'a Block, wire: &Wire<'a>, op: NetOp, arg: usize) -> Wire<'a> {
    let nets = block.drivers_of(wire);
    assert_eq!(nets.len(), 1, "{wire} should have exactly one driver");
    assert_eq!(nets[0].op, op);
    let id = nets[0].args[arg];
    block
        .wires()
        .into_iter()
        .find(|w| w.id() == id)
        .expect("argument wire should exist")
}
