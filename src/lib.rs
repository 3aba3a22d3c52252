//! A `no_std`, no-alloc DHCPv4 option encoder driven by an external,
//! generic attribute dictionary.
//!
//! Unlike a closed `enum`-per-option encoder, this crate walks whatever
//! dictionary tree a caller hands it (see [`dict::AttrDef`]) and a cursor
//! over that dictionary's attribute-value pairs (see [`cursor::Cursor`]),
//! emitting RFC-2132-style options and RFC-3046-style TLV options
//! (`tag len value`) from whichever attribute is reachable from a caller
//! chosen root. [`encode::encode_option`] is the crate's entry point.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod cursor;
pub mod dict;
pub mod encode;
pub mod stack;
pub mod trace;
pub mod types;
pub mod value;

pub use cursor::{Av, Cursor, SliceCursor};
pub use dict::AttrDef;
pub use encode::{encode_option, Encoded, EncoderCtx, HeaderOutcome, LeafError, Skipped};
pub use stack::TlvStack;
pub use types::{Flags, SemanticType};
pub use value::Value;

/// Errors that can surface from [`encode::encode_option`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Error {
    /// A leaf value couldn't be turned into bytes; see [`LeafError`].
    Leaf(LeafError),
    /// An attribute's ancestor chain is deeper than [`stack::MAX_TLV_STACK`]
    /// can represent.
    StackOverflow,
}

impl From<LeafError> for Error {
    fn from(err: LeafError) -> Self {
        Self::Leaf(err)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Leaf(LeafError::BufferTooSmall) => write!(f, "output buffer too small"),
            Self::Leaf(LeafError::Unsupported(ty)) => {
                write!(f, "unsupported attribute type: {ty}")
            }
            Self::StackOverflow => write!(f, "attribute nesting exceeds the supported depth"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Self::Leaf(LeafError::BufferTooSmall) => defmt::write!(f, "output buffer too small"),
            Self::Leaf(LeafError::Unsupported(ty)) => {
                defmt::write!(f, "unsupported attribute type: {}", ty)
            }
            Self::StackOverflow => {
                defmt::write!(f, "attribute nesting exceeds the supported depth")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
