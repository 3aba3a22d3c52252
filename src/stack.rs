//! The fixed-capacity ancestor-chain builder used to drive header encoding
//! (spec §4.5).

use heapless::Vec;

use crate::dict::AttrDef;

/// Maximum attribute nesting depth a [`TlvStack`] can represent, counting
/// only real DHCPv4 options (the dictionary root is never pushed). DHCPv4
/// option 82 nests one level of sub-options below the option itself
/// (Circuit-ID, Remote-ID, ...), so two is the deepest the reference encoder
/// ever needs; four leaves headroom for a dictionary that nests sub-options
/// further.
pub const MAX_TLV_STACK: usize = 4;

/// The chain of ancestor attribute definitions from the outermost real
/// DHCPv4 option down to a leaf, built fresh for each `encode_option` call.
///
/// `tlv_stack[0]` is always the outermost *real* option — the dictionary's
/// abstract root (see [`AttrDef::is_root`]) is deliberately excluded, since
/// every consumer of the stack (the RFC/TLV header encoders, the dispatcher)
/// needs `tlv_stack[0].number()` to be an actual wire option number.
#[derive(Debug, Clone)]
pub struct TlvStack<D> {
    defs: Vec<D, MAX_TLV_STACK>,
}

/// A leaf's ancestor chain is deeper than [`MAX_TLV_STACK`] can represent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StackOverflow;

impl<D: AttrDef> TlvStack<D> {
    /// Builds the ancestor chain for `leaf`, stopping at (and excluding)
    /// `root`.
    pub fn build(leaf: D, root: D) -> Result<Self, StackOverflow> {
        let mut rev: Vec<D, MAX_TLV_STACK> = Vec::new();

        let mut cur = leaf;
        loop {
            if cur.id() == root.id() {
                break;
            }

            rev.push(cur).map_err(|_| StackOverflow)?;

            match cur.parent() {
                Some(parent) => cur = parent,
                None => break,
            }
        }

        let mut defs = Vec::new();
        for def in rev.into_iter().rev() {
            // Capacity was already checked above; this cannot fail.
            let _ = defs.push(def);
        }

        Ok(Self { defs })
    }

    pub fn depth(&self) -> usize {
        self.defs.len()
    }

    pub fn get(&self, depth: usize) -> Option<D> {
        self.defs.get(depth).copied()
    }

    /// The outermost real option, i.e. `tlv_stack[0]`.
    pub fn outermost(&self) -> Option<D> {
        self.get(0)
    }

    /// The leaf attribute the stack was built for, i.e. the last entry.
    pub fn leaf(&self) -> Option<D> {
        self.defs.last().copied()
    }

    pub fn as_slice(&self) -> &[D] {
        &self.defs
    }
}
