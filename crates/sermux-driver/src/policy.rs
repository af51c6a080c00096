use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use sermux_frame::tag::{StreamTag, STDERR, STDOUT};

/// Tags that are always transmitted, bypassing the enabled set.
///
/// stderr is ALWAYS shipped over the serial line; stdout is enabled by
/// default but may be turned off.
pub const GUARANTEED_DELIVERY: &[StreamTag] = &[STDERR];

/// The set of stream tags currently enabled for transmission.
///
/// Enabled streams are tracked per tag, not per open handle — several
/// handles may map to one tag. Toggles are not ordered against in-flight
/// writes: a write racing an activate/deactivate may observe either
/// state. That weak consistency is accepted for this best-effort
/// transport, not a defect to tighten.
pub struct StreamPolicy {
    enabled: RwLock<HashSet<u32>>,
}

impl StreamPolicy {
    /// New registry with the default state: stdout pre-enabled.
    pub fn new() -> Self {
        let mut enabled = HashSet::new();
        enabled.insert(STDOUT.as_u32());
        Self {
            enabled: RwLock::new(enabled),
        }
    }

    /// True iff `tag` is guaranteed delivery or currently enabled.
    pub fn is_enabled(&self, tag: StreamTag) -> bool {
        if is_guaranteed(tag) {
            return true;
        }
        self.enabled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&tag.as_u32())
    }

    /// Enable transmission for `tag`. No-op for guaranteed-delivery tags.
    pub fn activate(&self, tag: StreamTag) {
        if is_guaranteed(tag) {
            return;
        }
        self.enabled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tag.as_u32());
    }

    /// Disable transmission for `tag`. No-op for guaranteed-delivery tags.
    pub fn deactivate(&self, tag: StreamTag) {
        if is_guaranteed(tag) {
            return;
        }
        self.enabled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&tag.as_u32());
    }
}

impl Default for StreamPolicy {
    fn default() -> Self {
        Self::new()
    }
}

fn is_guaranteed(tag: StreamTag) -> bool {
    GUARANTEED_DELIVERY.contains(&tag)
}
