use seatalk_frame::Frame;
use tracing::warn;

use crate::message::MessageKind;

/// Receives decode problems that do not stop decoding.
///
/// The dispatcher reports frames that had candidate descriptors but matched
/// none; codecs report bits with no known meaning (the bits are kept in the
/// decoded value).
pub trait Diagnostics {
    fn match_failed(&self, frame: &Frame, candidates: &[&'static str]);

    fn unrecognized_bits(&self, kind: MessageKind, field: &'static str, bits: u32);
}

/// Forwards diagnostics to `tracing` at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn match_failed(&self, frame: &Frame, candidates: &[&'static str]) {
        warn!(%frame, ?candidates, "frame matched no candidate descriptor");
    }

    fn unrecognized_bits(&self, kind: MessageKind, field: &'static str, bits: u32) {
        warn!(%kind, field, bits, "unrecognized bits");
    }
}

/// Drops all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentDiagnostics;

impl Diagnostics for SilentDiagnostics {
    fn match_failed(&self, _frame: &Frame, _candidates: &[&'static str]) {}

    fn unrecognized_bits(&self, _kind: MessageKind, _field: &'static str, _bits: u32) {}
}
