//! The encoder itself: cursor filtering, leaf value encoding, RFC/TLV option
//! header encoding, and the top-level dispatcher (spec §4).

use crate::cursor::{Av, Cursor};
use crate::dict::{common_ancestor, AttrDef};
use crate::stack::{StackOverflow, TlvStack};
use crate::trace::Tracer;
use crate::types::SemanticType;
use crate::value::Value;
use crate::Error;

/// Why a leaf value couldn't be turned into bytes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LeafError {
    /// `out` had no room for this value. Never partially written.
    BufferTooSmall,
    /// The dictionary declared a type this encoder has no wire form for.
    Unsupported(SemanticType),
}

/// The result of encoding one option or sub-option header plus its value(s).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HeaderOutcome {
    /// `out[..n]` now holds a complete tag+length+value(s) option.
    Written(usize),
    /// Nothing was written; `out` had no room even for the first value.
    NoSpace,
}

/// Why [`encode_option`] declined to emit anything for the current
/// attribute-value pair, distinct from running out of output space.
///
/// Split per two different reasons the reference encoder used to funnel
/// through one shared "skip" code path: an attribute that simply isn't a
/// wire-representable DHCP option, versus one that's handled by some other
/// part of the overall message encoder and must not be emitted twice.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Skipped {
    NotADhcpOption,
    AlreadyEmitted,
}

/// The outcome of one [`encode_option`] call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Encoded {
    /// `out[..n]` holds one complete option (or nested TLV option).
    Written(usize),
    /// The current attribute-value pair was deliberately not encoded.
    Skipped(Skipped),
    /// `out` was too small to hold anything; the cursor did not move.
    NoSpace,
    /// There is nothing left under the chosen root to encode.
    Exhausted,
}

/// Per-call encoding context: which attribute is the root of this encode
/// pass, and where diagnostics go.
pub struct EncoderCtx<'t, D, T> {
    pub root: D,
    pub tracer: &'t T,
}

impl<'t, D: AttrDef, T: Tracer<D>> EncoderCtx<'t, D, T> {
    pub const fn new(root: D, tracer: &'t T) -> Self {
        Self { root, tracer }
    }
}

/// Whether `av` should be considered by this encode pass at all: not marked
/// internal, and a descendant of `root` (spec §4.1).
pub fn is_encodable<'v, D: AttrDef>(av: &Av<'v, D>, root: D) -> bool {
    !av.def.flags().internal && common_ancestor(av.def, root).id() == root.id()
}

/// The first encodable attribute-value pair at or after the cursor's current
/// position, without consuming anything past it.
pub fn first_encodable<'v, D: AttrDef, C: Cursor<'v, D>>(
    cur: &mut C,
    root: D,
) -> Option<Av<'v, D>> {
    loop {
        let av = cur.peek()?;
        if is_encodable(&av, root) {
            return Some(av);
        }
        cur.advance();
    }
}

/// The next encodable attribute-value pair strictly after the one most
/// recently returned by [`first_encodable`]/[`next_encodable`].
pub fn next_encodable<'v, D: AttrDef, C: Cursor<'v, D>>(
    cur: &mut C,
    root: D,
) -> Option<Av<'v, D>> {
    cur.advance();
    first_encodable(cur, root)
}

/// Writes a single value's raw bytes (no tag, no length) to `out`.
pub fn encode_value(value: &Value<'_>, out: &mut [u8]) -> Result<usize, LeafError> {
    match value {
        Value::Unsupported(ty) => Err(LeafError::Unsupported(*ty)),
        _ => value.write(out).ok_or(LeafError::BufferTooSmall),
    }
}

/// Encodes one RFC-3396-style option: `tag(1) len(1) value(len)`.
///
/// `def` identifies the option (and thus the cursor's current value, which
/// must match it). When `def` is array-flagged, consecutive cursor entries
/// with the same definition are coalesced into this one option's value area
/// until a value doesn't fit, the 255-byte option length cap would be
/// exceeded, or the next pair no longer matches `def`. `root` is threaded
/// through to [`first_encodable`] so a non-encodable pair (e.g. one marked
/// `internal`) sitting between two array siblings is skipped transparently,
/// the same way the top-level dispatcher skips it.
///
/// On `Ok(HeaderOutcome::NoSpace)` or `Err`, the cursor is left exactly where
/// it would need to be to retry: nothing is consumed for a value that wasn't
/// actually written, so no partial option is ever observable by a caller.
pub fn encode_rfc_hdr<'v, D: AttrDef, C: Cursor<'v, D>>(
    cur: &mut C,
    def: D,
    root: D,
    out: &mut [u8],
) -> Result<HeaderOutcome, LeafError> {
    if out.len() < 2 {
        return Ok(HeaderOutcome::NoSpace);
    }

    let tag = (def.number() & 0xff) as u8;
    let mut len = 0usize;
    let mut wrote_any = false;

    loop {
        let Some(av) = first_encodable(cur, root) else {
            break;
        };

        if av.def.id() != def.id() {
            break;
        }

        let remaining = &mut out[2 + len..];

        match encode_value(&av.value, remaining) {
            Ok(n) if len + n <= 255 => {
                len += n;
                wrote_any = true;
                cur.advance();
            }
            Ok(_) => {
                // Would overflow the 1-byte option length; leave it for the
                // next option in the same array.
                break;
            }
            Err(LeafError::Unsupported(ty)) => {
                // The reference encoder advances past a value it cannot
                // encode rather than spinning on it forever. Any values
                // already coalesced into `out` are never committed (the
                // header is only written below on success), so this stays
                // all-or-nothing regardless of how much of the array already
                // fit.
                cur.advance();
                return Err(LeafError::Unsupported(ty));
            }
            Err(LeafError::BufferTooSmall) => break,
        }

        if !def.flags().array {
            break;
        }
    }

    if !wrote_any {
        return Ok(HeaderOutcome::NoSpace);
    }

    out[0] = tag;
    out[1] = len as u8;

    Ok(HeaderOutcome::Written(2 + len))
}

/// Encodes one TLV option (e.g. DHCPv4 option 82): `tag(1) len(1)
/// sub-options(len)`.
///
/// `def` is the TLV parent currently being written. Each loop iteration
/// re-derives the cursor's current child from scratch — via a fresh
/// `TlvStack::build(av.def, def)` — rather than trusting whatever child the
/// previous iteration was built for: once one sibling has been consumed, the
/// cursor may now point at an entirely different child (spec §4.4 step 4),
/// and a stack captured before that happened would compare stale. That fresh
/// child either is itself a nested TLV (recurse one level deeper) or is the
/// leaf directly under `def` (call [`encode_rfc_hdr`]).
pub fn encode_tlv_hdr<'v, D: AttrDef, C: Cursor<'v, D>>(
    cur: &mut C,
    def: D,
    root: D,
    out: &mut [u8],
) -> Result<HeaderOutcome, Error> {
    if out.len() < 2 {
        return Ok(HeaderOutcome::NoSpace);
    }

    let tag = (def.number() & 0xff) as u8;
    let mut len = 0usize;
    let mut wrote_any = false;

    loop {
        let Some(av) = first_encodable(cur, root) else {
            break;
        };

        if common_ancestor(av.def, def).id() != def.id() {
            // The next encodable pair belongs to a different option entirely.
            break;
        }

        let child_stack =
            TlvStack::build(av.def, def).map_err(|StackOverflow| Error::StackOverflow)?;
        let Some(child) = child_stack.outermost() else {
            // `av.def` is `def` itself, which has no wire value of its own.
            break;
        };

        let body = &mut out[2 + len..];

        let outcome = if child.semantic_type() == SemanticType::Tlv {
            encode_tlv_hdr(cur, child, root, body)?
        } else {
            encode_rfc_hdr(cur, child, root, body).map_err(Error::from)?
        };

        match outcome {
            HeaderOutcome::Written(n) if len + n <= 255 => {
                len += n;
                wrote_any = true;
            }
            HeaderOutcome::Written(_) | HeaderOutcome::NoSpace => break,
        }
    }

    if !wrote_any {
        return Ok(HeaderOutcome::NoSpace);
    }

    out[0] = tag;
    out[1] = len as u8;

    Ok(HeaderOutcome::Written(2 + len))
}

/// Encodes the next option into `out`, advancing `cur` past whatever it
/// consumed.
///
/// This is the crate's main entry point: a caller drives a full message's
/// worth of options by calling this in a loop against successive output
/// regions until it returns [`Encoded::Exhausted`].
pub fn encode_option<'v, D: AttrDef, C: Cursor<'v, D>, T: Tracer<D>>(
    ctx: &EncoderCtx<'_, D, T>,
    cur: &mut C,
    out: &mut [u8],
) -> Result<Encoded, Error> {
    let Some(av) = first_encodable(cur, ctx.root) else {
        return Ok(Encoded::Exhausted);
    };

    // DHCP Message Type is assembled elsewhere in the packet and must never
    // be re-emitted through the generic option loop.
    if av.def.flags().already_emitted {
        cur.advance();
        return Ok(Encoded::Skipped(Skipped::AlreadyEmitted));
    }

    // Option 82 (Relay Agent Information) is the one recognized TLV parent
    // whose number legitimately exceeds a single byte's conventional range;
    // anything else over 255 belongs to some other protocol sharing this
    // dictionary, not to a DHCPv4 option.
    const RELAY_AGENT_INFORMATION: u32 = 82;
    if av.def.number() > 255 && av.def.number() != RELAY_AGENT_INFORMATION {
        cur.advance();
        return Ok(Encoded::Skipped(Skipped::NotADhcpOption));
    }

    let stack = TlvStack::build(av.def, ctx.root).map_err(|StackOverflow| Error::StackOverflow)?;
    ctx.tracer.trace_stack(&stack);

    // `stack.depth() > 1` and `outermost.semantic_type() == Tlv` agree in any
    // well-formed dictionary (only Tlv-typed attributes have children for
    // `TlvStack::build` to have descended into); the depth check is what
    // keeps `encode_tlv_hdr`'s recursion provably in bounds, so it's the one
    // actually tested here. `stack.outermost()` is only `None` when `av.def`
    // is `ctx.root` itself (a caller rooted the encode pass at the very leaf
    // it's now encoding); falling back to `av.def` treats it as the outermost
    // real option rather than panicking on a legitimate root choice.
    let outermost = stack.outermost().unwrap_or(av.def);
    let outcome = if stack.depth() > 1 {
        encode_tlv_hdr(cur, outermost, ctx.root, out)
    } else {
        encode_rfc_hdr(cur, outermost, ctx.root, out).map_err(Error::from)
    }?;

    match outcome {
        HeaderOutcome::Written(n) => {
            ctx.tracer.trace_hex("option", &out[..n]);
            Ok(Encoded::Written(n))
        }
        HeaderOutcome::NoSpace => Ok(Encoded::NoSpace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::SliceCursor;
    use crate::dict::demo;
    use crate::trace::NoopTracer;
    use core::net::Ipv4Addr;

    fn ctx(root: demo::Attr, tracer: &NoopTracer) -> EncoderCtx<'_, demo::Attr, NoopTracer> {
        EncoderCtx::new(root, tracer)
    }

    #[test]
    fn root_chosen_at_a_leaf_attribute_encodes_that_attribute_directly() {
        // `ctx.root` need not be the dictionary's abstract root; a caller may
        // narrow an encode pass to one attribute's own subtree. When that
        // attribute is itself a leaf with no children, `TlvStack::build`
        // returns an empty stack rather than panicking.
        let pairs = [Av::new(
            demo::SUBNET_MASK,
            Value::Ipv4Addr(Ipv4Addr::new(255, 255, 255, 0)),
        )];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = ctx(demo::SUBNET_MASK, &tracer);

        let mut out = [0u8; 6];
        let encoded = encode_option(&c, &mut cur, &mut out).unwrap();

        assert_eq!(encoded, Encoded::Written(6));
        assert_eq!(&out[..6], &[1, 4, 255, 255, 255, 0]);
    }

    #[test]
    fn encodes_a_plain_ipv4_option() {
        let pairs = [Av::new(
            demo::SUBNET_MASK,
            Value::Ipv4Addr(Ipv4Addr::new(255, 255, 255, 0)),
        )];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = ctx(demo::ROOT, &tracer);

        let mut out = [0u8; 6];
        let encoded = encode_option(&c, &mut cur, &mut out).unwrap();

        assert_eq!(encoded, Encoded::Written(6));
        assert_eq!(&out[..6], &[1, 4, 255, 255, 255, 0]);
        assert_eq!(encode_option(&c, &mut cur, &mut out).unwrap(), Encoded::Exhausted);
    }

    #[test]
    fn coalesces_consecutive_array_values_into_one_option() {
        let pairs = [
            Av::new(demo::ROUTER, Value::Ipv4Addr(Ipv4Addr::new(10, 0, 0, 1))),
            Av::new(demo::ROUTER, Value::Ipv4Addr(Ipv4Addr::new(10, 0, 0, 2))),
        ];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = ctx(demo::ROOT, &tracer);

        let mut out = [0u8; 10];
        let encoded = encode_option(&c, &mut cur, &mut out).unwrap();

        assert_eq!(encoded, Encoded::Written(10));
        assert_eq!(
            &out[..10],
            &[3, 8, 10, 0, 0, 1, 10, 0, 0, 2]
        );
    }

    #[test]
    fn buffer_exhaustion_mid_array_leaves_remainder_for_next_call() {
        let pairs = [
            Av::new(demo::ROUTER, Value::Ipv4Addr(Ipv4Addr::new(10, 0, 0, 1))),
            Av::new(demo::ROUTER, Value::Ipv4Addr(Ipv4Addr::new(10, 0, 0, 2))),
        ];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = ctx(demo::ROOT, &tracer);

        // Room for tag+len+one address only.
        let mut out = [0u8; 6];
        let encoded = encode_option(&c, &mut cur, &mut out).unwrap();

        assert_eq!(encoded, Encoded::Written(6));
        assert_eq!(&out[..6], &[3, 4, 10, 0, 0, 1]);

        let mut out2 = [0u8; 6];
        let encoded2 = encode_option(&c, &mut cur, &mut out2).unwrap();
        assert_eq!(encoded2, Encoded::Written(6));
        assert_eq!(&out2[..6], &[3, 4, 10, 0, 0, 2]);
    }

    #[test]
    fn no_space_when_output_too_small_for_even_one_value() {
        let pairs = [Av::new(demo::SUBNET_MASK, Value::Ipv4Addr(Ipv4Addr::UNSPECIFIED))];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = ctx(demo::ROOT, &tracer);

        let mut out = [0u8; 1];
        let encoded = encode_option(&c, &mut cur, &mut out).unwrap();
        assert_eq!(encoded, Encoded::NoSpace);

        // Nothing was consumed; a bigger buffer now succeeds.
        let mut out2 = [0u8; 6];
        let encoded2 = encode_option(&c, &mut cur, &mut out2).unwrap();
        assert_eq!(encoded2, Encoded::Written(6));
    }

    #[test]
    fn unsupported_type_is_reported_and_skipped() {
        let pairs = [
            Av::new(demo::HOST_NAME, Value::Unsupported(SemanticType::Date)),
            Av::new(demo::SUBNET_MASK, Value::Ipv4Addr(Ipv4Addr::UNSPECIFIED)),
        ];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = ctx(demo::ROOT, &tracer);

        let mut out = [0u8; 6];
        let err = encode_option(&c, &mut cur, &mut out).unwrap_err();
        assert_eq!(err, Error::Leaf(LeafError::Unsupported(SemanticType::Date)));

        // The cursor moved past the bad value; the next call sees the good one.
        let encoded = encode_option(&c, &mut cur, &mut out).unwrap();
        assert_eq!(encoded, Encoded::Written(6));
    }

    #[test]
    fn encodes_nested_tlv_sub_options() {
        let pairs = [Av::new(demo::CIRCUIT_ID, Value::Octets(&[0xaa, 0xbb]))];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = ctx(demo::ROOT, &tracer);

        let mut out = [0u8; 8];
        let encoded = encode_option(&c, &mut cur, &mut out).unwrap();

        // 82 len=4 [ 1 len=2 0xaa 0xbb ]
        assert_eq!(encoded, Encoded::Written(6));
        assert_eq!(&out[..6], &[82, 4, 1, 2, 0xaa, 0xbb]);
    }

    #[test]
    fn distinct_tlv_children_concatenate_into_one_option() {
        let pairs = [
            Av::new(demo::CIRCUIT_ID, Value::Octets(&[0x00, 0x01])),
            Av::new(demo::REMOTE_ID, Value::Octets(&[0xaa])),
        ];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = ctx(demo::ROOT, &tracer);

        let mut out = [0u8; 16];
        let encoded = encode_option(&c, &mut cur, &mut out).unwrap();

        // 82 len=7 [ 1 len=2 0x00 0x01 | 2 len=1 0xaa ]
        assert_eq!(encoded, Encoded::Written(9));
        assert_eq!(&out[..9], &[82, 7, 1, 2, 0x00, 0x01, 2, 1, 0xaa]);
        assert_eq!(encode_option(&c, &mut cur, &mut out).unwrap(), Encoded::Exhausted);
    }

    #[test]
    fn unsupported_type_mid_array_discards_the_whole_option() {
        let pairs = [
            Av::new(demo::ROUTER, Value::Ipv4Addr(Ipv4Addr::new(10, 0, 0, 1))),
            Av::new(demo::ROUTER, Value::Unsupported(SemanticType::Date)),
        ];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = ctx(demo::ROOT, &tracer);

        let mut out = [0xffu8; 10];
        let err = encode_option(&c, &mut cur, &mut out).unwrap_err();
        assert_eq!(err, Error::Leaf(LeafError::Unsupported(SemanticType::Date)));

        // Nothing is ever committed, not even the already-coalesced first
        // address: a header is only written once the whole array is known
        // to have succeeded.
        assert_eq!(out, [0xffu8; 10]);
        assert_eq!(encode_option(&c, &mut cur, &mut out).unwrap(), Encoded::Exhausted);
    }

    #[test]
    fn zero_length_value_still_produces_a_written_option() {
        let pairs = [Av::new(demo::PARAMETER_REQUEST_LIST, Value::Octets(&[]))];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = ctx(demo::ROOT, &tracer);

        let mut out = [0u8; 4];
        let encoded = encode_option(&c, &mut cur, &mut out).unwrap();

        assert_eq!(encoded, Encoded::Written(2));
        assert_eq!(&out[..2], &[55, 0]);
    }

    #[test]
    fn array_coalescing_skips_a_non_encodable_sibling() {
        use crate::types::Flags;

        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        enum A {
            Root,
            Router,
            Hidden,
        }

        impl AttrDef for A {
            fn id(&self) -> u32 {
                match self {
                    A::Root => 0,
                    A::Router => 1,
                    A::Hidden => 2,
                }
            }

            fn number(&self) -> u32 {
                match self {
                    A::Root => 0,
                    A::Router => 3,
                    A::Hidden => 99,
                }
            }

            fn semantic_type(&self) -> SemanticType {
                SemanticType::Ipv4Addr
            }

            fn flags(&self) -> Flags {
                match self {
                    A::Router => Flags::array(),
                    A::Hidden => Flags {
                        internal: true,
                        ..Flags::NONE
                    },
                    A::Root => Flags::NONE,
                }
            }

            fn parent(&self) -> Option<Self> {
                match self {
                    A::Root => None,
                    _ => Some(A::Root),
                }
            }
        }

        let pairs = [
            Av::new(A::Router, Value::Ipv4Addr(Ipv4Addr::new(10, 0, 0, 1))),
            Av::new(A::Hidden, Value::Ipv4Addr(Ipv4Addr::new(0, 0, 0, 0))),
            Av::new(A::Router, Value::Ipv4Addr(Ipv4Addr::new(10, 0, 0, 2))),
        ];
        let mut cur = SliceCursor::new(&pairs);
        let tracer = NoopTracer;
        let c = EncoderCtx::new(A::Root, &tracer);

        let mut out = [0u8; 10];
        let encoded = encode_option(&c, &mut cur, &mut out).unwrap();

        assert_eq!(encoded, Encoded::Written(10));
        assert_eq!(&out[..10], &[3, 8, 10, 0, 0, 1, 10, 0, 0, 2]);
    }
}
