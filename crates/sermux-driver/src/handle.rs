use std::sync::atomic::{AtomicBool, Ordering};

use sermux_frame::tag::StreamTag;

/// One open logical stream.
///
/// The four reserved handles (stdin/stdout/stderr/debug) are created once
/// at driver construction and never destroyed. Handles returned by the
/// open path are owned by the filesystem layer; the driver only reads the
/// tag and toggles the write-mode flag via the control interface.
#[derive(Debug)]
pub struct StreamHandle {
    tag: StreamTag,
    noblock_write: AtomicBool,
}

impl StreamHandle {
    /// New handle in the default (blocking-write) mode.
    pub fn new(tag: StreamTag) -> Self {
        Self {
            tag,
            noblock_write: AtomicBool::new(false),
        }
    }

    /// The stream tag this handle writes to.
    pub fn tag(&self) -> StreamTag {
        self.tag
    }

    /// Whether writes on this handle fail immediately instead of blocking.
    pub fn is_nonblocking(&self) -> bool {
        self.noblock_write.load(Ordering::Relaxed)
    }

    /// Flip the write mode in place. Takes effect for subsequent writes.
    pub fn set_nonblocking(&self, nonblocking: bool) {
        self.noblock_write.store(nonblocking, Ordering::Relaxed);
    }
}
