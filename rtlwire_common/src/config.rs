//! Configuration for a netlist block.
//!
//! Quick examples
//!
//! Default naming (`tmp1`, `tmp2`, `const_1_5`, ...):
//! ```ignore
//! use rtlwire_common::BlockConfig;
//! let cfg = BlockConfig::default();
//! ```
//!
//! Append the describing source location to every synthesized name:
//! ```ignore
//! use rtlwire_common::BlockConfig;
//! let cfg = BlockConfig::debug();
//! ```

/// Per-block settings.
///
/// - debug_names:
///     - true  => synthesized temporary names carry a `_<file>_line<N>` suffix
///       naming the line that created the wire.
///     - false => plain `<prefix><counter>` names.
/// - temp_prefix / const_prefix:
///     - prefixes of the two independent name counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockConfig {
    /// Suffix synthesized names with the caller location.
    pub debug_names: bool,
    /// Prefix for unnamed temporaries.
    pub temp_prefix: String,
    /// Prefix for constants.
    pub const_prefix: String,
}

impl BlockConfig {
    /// Create a new configuration.
    pub fn new(
        debug_names: bool,
        temp_prefix: impl Into<String>,
        const_prefix: impl Into<String>,
    ) -> Self {
        Self {
            debug_names,
            temp_prefix: temp_prefix.into(),
            const_prefix: const_prefix.into(),
        }
    }

    /// Convenience: default prefixes with caller-location suffixes enabled.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            debug_names: true,
            ..Self::default()
        }
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self::new(false, "tmp", "const_")
    }
}
