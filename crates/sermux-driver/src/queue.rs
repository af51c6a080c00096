use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Bounded FIFO of raw bytes awaiting transmission.
///
/// Writers append encoded frame bytes at the tail (serialized by the
/// driver's write lock); the flush path consumes from the head. The two
/// sides may run concurrently — head removal and tail append are both
/// valid under the single internal lock, and blocked pushers are woken
/// whenever the flush path frees space.
pub struct ByteQueue {
    bytes: Mutex<VecDeque<u8>>,
    space: Condvar,
    capacity: usize,
}

impl ByteQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: Mutex::new(VecDeque::with_capacity(capacity)),
            space: Condvar::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_bytes().is_empty()
    }

    /// Append bytes one at a time.
    ///
    /// Non-blocking (`block == false`): returns `false` as soon as the
    /// queue is full. Bytes appended before the refusal stay queued —
    /// a partial write counts as sent, matching the transport's
    /// best-effort semantics. Blocking: waits per byte for the flush
    /// path to free space.
    pub fn push(&self, bytes: &[u8], block: bool) -> bool {
        let mut queue = self.lock_bytes();
        for &byte in bytes {
            while queue.len() >= self.capacity {
                if !block {
                    return false;
                }
                queue = self
                    .space
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            queue.push_back(byte);
        }
        true
    }

    /// Remove up to `n` bytes from the head, waking blocked pushers.
    ///
    /// Used when the transport accepted only part of a bulk write.
    pub fn consume(&self, n: usize) -> usize {
        let mut queue = self.lock_bytes();
        let removed = n.min(queue.len());
        for _ in 0..removed {
            queue.pop_front();
        }
        drop(queue);
        if removed > 0 {
            self.space.notify_all();
        }
        removed
    }

    /// Drop all buffered bytes unconditionally, waking blocked pushers.
    ///
    /// Used when a bulk write fully succeeds, instead of per-byte removal.
    pub fn reset(&self) {
        self.lock_bytes().clear();
        self.space.notify_all();
    }

    /// Copy of the waiting bytes, head first.
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock_bytes().iter().copied().collect()
    }

    fn lock_bytes(&self) -> MutexGuard<'_, VecDeque<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
