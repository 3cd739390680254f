#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use rtlwire_core::{Block, ErrorKind, NetOp, NextState, WireError};

mod common;
use common::{init_test_logger, net_ops};

#[test]
fn register_commits_exactly_once() {
    init_test_logger();
    let block = Block::new();
    let a = block.input(Some(8), Some("a")).unwrap();
    let r = block.register(Some(8), Some("r")).unwrap();

    let first = r.next().assign(a).unwrap();
    let second = r.next().assign(0).unwrap();
    r.set_next(first).unwrap();
    assert_eq!(
        r.set_next(second).unwrap_err(),
        WireError::NextAlreadySet("r".into())
    );
    assert_eq!(net_ops(&block), vec![NetOp::Register]);
    assert!(r.reg_in().unwrap().same_wire(&a));
}

#[test]
fn counter_reads_current_value() {
    init_test_logger();
    let block = Block::new();
    let counter = block.register(Some(4), Some("counter")).unwrap();
    let incremented = (counter.wire() + 1).unwrap();
    assert_eq!(incremented.bitwidth(), Ok(5));
    counter.assign_next(incremented).unwrap();

    // the 5 bit sum is truncated back to the register width
    let reg_in = counter.reg_in().unwrap();
    assert_eq!(reg_in.bitwidth(), Ok(4));
    assert_eq!(block.sanity_check(), Ok(()));
}

#[test]
fn registers_as_operands() {
    let block = Block::new();
    let r = block.register(Some(3), Some("r")).unwrap();
    let a = block.input(Some(3), Some("a")).unwrap();
    let sum = (a + r).unwrap();
    assert_eq!(sum.bitwidth(), Ok(4));
    assert!(block.as_wire(&r, None).unwrap().same_wire(&r.wire()));
}

#[test]
fn conditional_staging_needs_a_width() {
    let block = Block::new();
    let sel = block.input(Some(1), Some("sel")).unwrap();
    let r = block.register(None, Some("r")).unwrap();
    let result = block.conditional(sel, || r.next().conditional_assign(1));
    assert_eq!(
        result.unwrap_err(),
        WireError::ConditionalWithoutBitwidth("r".into())
    );
}

#[test]
fn conditional_staging_needs_a_scope() {
    let block = Block::new();
    let r = block.register(Some(2), Some("r")).unwrap();
    assert_eq!(
        r.next().conditional_assign(1).unwrap_err(),
        WireError::NoConditionScope("r".into())
    );
}

#[test]
fn next_has_no_truth_value() {
    let block = Block::new();
    let r = block.register(Some(2), Some("r")).unwrap();
    assert_err_kind!(r.next().to_bool(), ErrorKind::Protocol);
}

#[test]
fn staging_token_coerces_to_register_width() {
    let block = Block::new();
    let r = block.register(Some(6), Some("r")).unwrap();
    let commit = r.next().assign("2'b11").unwrap();
    assert_eq!(commit.rhs().bitwidth(), Ok(6));
    assert!(commit.register().same_wire(&r.wire()));
    assert_eq!(r.next_state(), NextState::Unstaged);
}
