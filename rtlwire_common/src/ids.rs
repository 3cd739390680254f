use contracts::*;
use std::fmt;
use std::hash::Hash;
use std::num::TryFromIntError;

macro_rules! block_index {
    ($(#[$doc:meta])* $name:ident, $tag:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            inner: u32,
        }

        impl $name {
            /// Wrap a raw index.
            #[ensures(ret.inner == id)]
            pub fn new(id: u32) -> Self {
                Self { inner: id }
            }

            /// Position in the owning block's storage.
            #[ensures(ret == self.inner as usize)]
            pub fn as_usize(self) -> usize {
                self.inner as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "{}"), self.inner)
            }
        }

        /// Fails for positions past `u32::MAX`; a block never wraps around.
        impl TryFrom<usize> for $name {
            type Error = TryFromIntError;

            fn try_from(position: usize) -> Result<Self, Self::Error> {
                u32::try_from(position).map(Self::new)
            }
        }
    };
}

block_index!(
    /// Index of a wire inside its owning block.
    ///
    /// Handed out in creation order and never reused.
    WireId,
    "w"
);

block_index!(
    /// Index of a net inside its owning block.
    NetId,
    "n"
);
