//! Whole-block consistency checks.

use crate::block::Block;
use crate::wire::WireKind;
use rtlwire_common::{WireError, WireResult};
use tracing::debug;

impl Block {
    /// Check that the block describes a complete circuit.
    ///
    /// Returns the first problem found:
    /// - conditional candidates that were never finalized,
    /// - wires whose width was never fixed,
    /// - inputs or constants that a net drives,
    /// - other wires driven by no net, or by more than one.
    ///
    /// # Errors
    /// The first violation, as a protocol error.
    pub fn sanity_check(&self) -> WireResult<()> {
        let pending = self.pending_conditionals();
        if pending > 0 {
            return Err(WireError::PendingConditional(pending));
        }

        self.with_inner(|inner| {
            let mut drivers = vec![0usize; inner.wires.len()];
            for net in &inner.nets {
                for dest in &net.dests {
                    drivers[dest.as_usize()] += 1;
                }
            }

            for (data, count) in inner.wires.iter().zip(drivers) {
                if data.bitwidth.is_none() {
                    return Err(WireError::UnknownBitwidth(data.name.clone()));
                }
                match (data.kind, count) {
                    (WireKind::Input | WireKind::Const, 0) => {},
                    (WireKind::Input | WireKind::Const, _) => {
                        return Err(WireError::DrivenSource(data.name.clone()));
                    },
                    (_, 0) => return Err(WireError::Undriven(data.name.clone())),
                    (_, 1) => {},
                    (_, drivers) => {
                        return Err(WireError::MultiplyDriven {
                            name: data.name.clone(),
                            drivers,
                        });
                    },
                }
            }
            debug!(
                "[BLOCK] sanity check passed: {} wires, {} nets",
                inner.wires.len(),
                inner.nets.len()
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_block_passes() {
        let block = Block::new();
        let a = block.input(Some(4), Some("a")).unwrap();
        let y = block.output(None, Some("y")).unwrap();
        y.assign((a + 1u8).unwrap()).unwrap();
        assert_eq!(block.sanity_check(), Ok(()));
    }

    #[test]
    fn undriven_output_fails() {
        let block = Block::new();
        block.output(Some(1), Some("y")).unwrap();
        assert_eq!(
            block.sanity_check(),
            Err(WireError::Undriven("y".into()))
        );
    }

    #[test]
    fn double_drive_fails() {
        let block = Block::new();
        let a = block.input(Some(1), Some("a")).unwrap();
        let y = block.output(Some(1), Some("y")).unwrap();
        y.assign(a).unwrap();
        y.assign(a).unwrap();
        assert_eq!(
            block.sanity_check(),
            Err(WireError::MultiplyDriven {
                name: "y".into(),
                drivers: 2
            })
        );
    }

    #[test]
    fn unsized_wire_fails() {
        let block = Block::new();
        block.wire(None, Some("w")).unwrap();
        assert_eq!(
            block.sanity_check(),
            Err(WireError::UnknownBitwidth("w".into()))
        );
    }
}
