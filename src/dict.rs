//! The dictionary contract and a small built-in dictionary to exercise it.
//!
//! `spec.md` §3 treats the dictionary as an external, read-only tree of
//! attribute definitions reachable from a single root. This module defines
//! that contract as a trait (`AttrDef`) so the encoder never depends on any
//! concrete dictionary representation, and ships one concrete instance
//! (`demo`) sized for the handful of DHCPv4 options the reference FreeRADIUS
//! encoder actually special-cases.

use crate::types::{Flags, SemanticType};

/// A node in an attribute dictionary tree.
///
/// Implementations are expected to be cheap `Copy` handles (an index, a
/// `&'static` reference, ...) identified by [`AttrDef::id`] rather than by
/// address: two handles with the same `id` refer to the same attribute even
/// if they aren't the same Rust value, which is what lets [`common_ancestor`]
/// and the cursor filters in [`crate::encode`] compare attributes across
/// calls without pinning a dictionary's internal representation.
pub trait AttrDef: Copy + Eq {
    /// A stable identifier, unique within one dictionary, for this attribute.
    fn id(&self) -> u32;

    /// The dictionary-assigned option or sub-option number.
    ///
    /// Only the low 8 bits are ever written to the wire (see
    /// [`crate::encode::encode_rfc_hdr`]/[`crate::encode::encode_tlv_hdr`]);
    /// the full width is kept here so the dispatcher can tell a real DHCPv4
    /// option (1..254, or 82's sub-options) apart from some other protocol's
    /// attribute that happens to share this dictionary.
    fn number(&self) -> u32;

    fn semantic_type(&self) -> SemanticType;

    fn flags(&self) -> Flags;

    /// The attribute directly enclosing this one, or `None` at the root.
    fn parent(&self) -> Option<Self>;

    /// `true` for the dictionary's single abstract root, which has no wire
    /// representation of its own and is never pushed onto a [`crate::stack::TlvStack`].
    fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Walks up from `self` towards the root, inclusive of `self`.
    fn ancestors(self) -> Ancestors<Self> {
        Ancestors { next: Some(self) }
    }
}

/// Iterator over an attribute and its ancestors, root-ward.
pub struct Ancestors<D> {
    next: Option<D>,
}

impl<D: AttrDef> Iterator for Ancestors<D> {
    type Item = D;

    fn next(&mut self) -> Option<D> {
        let cur = self.next.take()?;
        self.next = cur.parent();
        Some(cur)
    }
}

/// The deepest attribute common to both `a`'s and `b`'s ancestor chains.
///
/// Always terminates in at least the shared root. Used by the cursor filters
/// (spec §4.1) to tell whether the next attribute-value pair in iteration
/// order is still "under" the encode call's chosen root.
pub fn common_ancestor<D: AttrDef>(a: D, b: D) -> D {
    // A dictionary tree is shallow (a handful of levels at most for DHCPv4),
    // so a quadratic walk is simpler and plenty fast.
    for x in a.ancestors() {
        for y in b.ancestors() {
            if x.id() == y.id() {
                return x;
            }
        }
    }

    unreachable!("a dictionary tree always shares a root")
}

/// A small, `'static` DHCPv4 option dictionary covering the options the
/// reference encoder special-cases, for use in tests and as a drop-in
/// dictionary for callers who don't need anything fancier.
pub mod demo {
    use super::*;

    /// A node in the demo dictionary: an index into [`TABLE`].
    ///
    /// `PartialEq`/`Eq` compare by index, never by address, matching
    /// [`AttrDef`]'s stable-identity contract.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Attr(pub(crate) usize);

    struct Node {
        number: u32,
        semantic_type: SemanticType,
        flags: Flags,
        parent: Option<usize>,
    }

    const fn leaf(number: u32, ty: SemanticType) -> Node {
        Node {
            number,
            semantic_type: ty,
            flags: Flags::NONE,
            parent: Some(0),
        }
    }

    const fn array_leaf(number: u32, ty: SemanticType) -> Node {
        Node {
            number,
            semantic_type: ty,
            flags: Flags::array(),
            parent: Some(0),
        }
    }

    // Index 0 is the abstract root; every other index's `parent` points at
    // an index, not an `Attr`, so the table can be built as a flat `const`.
    static TABLE: &[Node] = &[
        // 0: root
        Node {
            number: 0,
            semantic_type: SemanticType::Tlv,
            flags: Flags::NONE,
            parent: None,
        },
        leaf(1, SemanticType::Ipv4Addr),        // 1: Subnet-Mask
        array_leaf(3, SemanticType::Ipv4Addr),  // 2: Router
        array_leaf(6, SemanticType::Ipv4Addr),  // 3: Domain-Name-Server
        leaf(12, SemanticType::String),         // 4: Host-Name
        leaf(50, SemanticType::Ipv4Addr),       // 5: Requested-IP-Address
        leaf(51, SemanticType::Uint32),         // 6: IP-Address-Lease-Time
        Node {
            // 7: DHCP-Message-Type — assembled by the surrounding packet
            // encoder, never by the generic option loop.
            number: 53,
            semantic_type: SemanticType::Uint8,
            flags: Flags {
                already_emitted: true,
                ..Flags::NONE
            },
            parent: Some(0),
        },
        leaf(54, SemanticType::Ipv4Addr),       // 8: Server-Identifier
        leaf(55, SemanticType::Octets),         // 9: Parameter-Request-List
        leaf(56, SemanticType::String),         // 10: Message
        Node {
            // 11: Relay-Agent-Information
            number: 82,
            semantic_type: SemanticType::Tlv,
            flags: Flags::NONE,
            parent: Some(0),
        },
        Node {
            // 12: Circuit-ID, child of 11
            number: 1,
            semantic_type: SemanticType::Octets,
            flags: Flags::NONE,
            parent: Some(11),
        },
        Node {
            // 13: a non-DHCPv4 attribute sharing this dictionary's root, e.g.
            // a RADIUS-space attribute a combined dictionary also carries.
            number: 300,
            semantic_type: SemanticType::Uint8,
            flags: Flags::NONE,
            parent: Some(0),
        },
        leaf(52, SemanticType::Uint8),          // 14: Option-Overload
        Node {
            // 15: Remote-ID, child of 11, sibling of Circuit-ID
            number: 2,
            semantic_type: SemanticType::Octets,
            flags: Flags::NONE,
            parent: Some(11),
        },
    ];

    pub const ROOT: Attr = Attr(0);
    pub const SUBNET_MASK: Attr = Attr(1);
    pub const ROUTER: Attr = Attr(2);
    pub const DOMAIN_NAME_SERVER: Attr = Attr(3);
    pub const HOST_NAME: Attr = Attr(4);
    pub const REQUESTED_IP_ADDRESS: Attr = Attr(5);
    pub const IP_ADDRESS_LEASE_TIME: Attr = Attr(6);
    pub const DHCP_MESSAGE_TYPE: Attr = Attr(7);
    pub const SERVER_IDENTIFIER: Attr = Attr(8);
    pub const PARAMETER_REQUEST_LIST: Attr = Attr(9);
    pub const MESSAGE: Attr = Attr(10);
    pub const RELAY_AGENT_INFORMATION: Attr = Attr(11);
    pub const CIRCUIT_ID: Attr = Attr(12);
    /// Not a DHCPv4 option: number > 255 and not 82. Exercises the
    /// dispatcher's `Skipped::NotADhcpOption` path.
    pub const OTHER_PROTOCOL_ATTR: Attr = Attr(13);
    pub const OPTION_OVERLOAD: Attr = Attr(14);
    pub const REMOTE_ID: Attr = Attr(15);

    impl AttrDef for Attr {
        fn id(&self) -> u32 {
            self.0 as u32
        }

        fn number(&self) -> u32 {
            TABLE[self.0].number
        }

        fn semantic_type(&self) -> SemanticType {
            TABLE[self.0].semantic_type
        }

        fn flags(&self) -> Flags {
            TABLE[self.0].flags
        }

        fn parent(&self) -> Option<Self> {
            TABLE[self.0].parent.map(Attr)
        }
    }

}
