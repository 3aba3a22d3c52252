/// The wire-level encoding a dictionary assigns to an attribute's value.
///
/// The first eight variants are the types `encode_value` (see [`crate::encode`])
/// actually knows how to serialize, per the table in the DHCPv4 encoder spec.
/// `Date` and `Ipv4Prefix` exist because a real dictionary carries more generic
/// types than any single protocol's encoder understands; an attribute declared
/// with one of them is well-formed dictionary data that this encoder simply
/// can't emit, and is the trigger for [`crate::encode::LeafError::Unsupported`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Uint8,
    Uint16,
    Uint32,
    Ipv4Addr,
    Ipv6Addr,
    Ethernet,
    String,
    Octets,
    /// The value is itself a sequence of sub-options (e.g. DHCPv4 option 82).
    Tlv,
    /// A generic dictionary type with no DHCPv4 wire representation.
    Date,
    /// A generic dictionary type with no DHCPv4 wire representation.
    Ipv4Prefix,
}

impl core::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let str = match self {
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Ipv4Addr => "ipv4_addr",
            Self::Ipv6Addr => "ipv6_addr",
            Self::Ethernet => "ethernet",
            Self::String => "string",
            Self::Octets => "octets",
            Self::Tlv => "tlv",
            Self::Date => "date",
            Self::Ipv4Prefix => "ipv4_prefix",
        };

        write!(f, "{}", str)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SemanticType {
    fn format(&self, f: defmt::Formatter<'_>) {
        let str = match self {
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Ipv4Addr => "ipv4_addr",
            Self::Ipv6Addr => "ipv6_addr",
            Self::Ethernet => "ethernet",
            Self::String => "string",
            Self::Octets => "octets",
            Self::Tlv => "tlv",
            Self::Date => "date",
            Self::Ipv4Prefix => "ipv4_prefix",
        };

        defmt::write!(f, "{}", str)
    }
}

/// Per-attribute dictionary flags (spec §3).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct Flags {
    /// Never produced on the wire by this encoder.
    pub internal: bool,
    /// Consecutive same-numbered values may be coalesced into one option.
    pub array: bool,
    /// Already written to the output by some other part of the overall
    /// message encoder; a generic option pass must not emit it again.
    pub already_emitted: bool,
}

impl Flags {
    pub const NONE: Self = Self {
        internal: false,
        array: false,
        already_emitted: false,
    };

    pub const fn array() -> Self {
        Self {
            internal: false,
            array: true,
            already_emitted: false,
        }
    }
}
