//! A structured replacement for the reference encoder's
//! `FR_PROTO_TRACE`/`FR_PROTO_STACK_PRINT`/`FR_PROTO_HEX_DUMP` macros (spec
//! §9 Design Notes): an injectable trait instead of a thread-global state.

use crate::dict::AttrDef;
use crate::stack::TlvStack;

/// Diagnostic hooks an [`crate::encode::EncoderCtx`] can call into while
/// walking an attribute tree.
///
/// Production code passes [`NoopTracer`], which the compiler should inline
/// away entirely. Diagnostic builds can pass [`LogTracer`] (behind the `log`
/// feature) or their own implementation.
pub trait Tracer<D: AttrDef> {
    /// Called whenever a new [`TlvStack`] is built for an `encode_option` call.
    fn trace_stack(&self, _stack: &TlvStack<D>) {}

    /// Called with the raw bytes just written to an option's output region.
    fn trace_hex(&self, _label: &str, _bytes: &[u8]) {}

    /// Called with a free-form diagnostic message.
    fn trace_fmt(&self, _msg: core::fmt::Arguments<'_>) {}
}

/// A [`Tracer`] that does nothing; the default for production encoding.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopTracer;

impl<D: AttrDef> Tracer<D> for NoopTracer {}

/// A [`Tracer`] that forwards everything to the `log` crate at `trace` level.
#[cfg(feature = "log")]
#[derive(Debug, Default, Copy, Clone)]
pub struct LogTracer;

#[cfg(feature = "log")]
impl<D: AttrDef> Tracer<D> for LogTracer {
    fn trace_stack(&self, stack: &TlvStack<D>) {
        let mut numbers: heapless::Vec<u8, { crate::stack::MAX_TLV_STACK }> = heapless::Vec::new();
        for def in stack.as_slice() {
            let _ = numbers.push((def.number() & 0xff) as u8);
        }
        log::trace!("tlv stack: {:?}", numbers.as_slice());
    }

    fn trace_hex(&self, label: &str, bytes: &[u8]) {
        log::trace!("{label}: {bytes:02x?}");
    }

    fn trace_fmt(&self, msg: core::fmt::Arguments<'_>) {
        log::trace!("{msg}");
    }
}
