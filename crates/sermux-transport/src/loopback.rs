use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::traits::SerialTransport;

/// In-memory serial device for tests, examples and host-less bring-up.
///
/// Outbound bytes are captured in a buffer the test can inspect; inbound
/// bytes are fed with [`feed`](Self::feed) and picked up by `read_byte`.
/// The device can be made to under-accept bulk writes (`set_accept_limit`)
/// or to report limited free space (`set_bytes_free`) to model a port
/// that is busy draining.
pub struct LoopbackTransport {
    state: Mutex<State>,
    readable: Condvar,
}

struct State {
    outbound: Vec<u8>,
    inbound: VecDeque<u8>,
    /// Per-call cap on bytes accepted by `write`. `None` = accept all.
    accept_limit: Option<usize>,
    /// Free-space figure reported by `bytes_free`. `None` = unbounded.
    bytes_free: Option<usize>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                outbound: Vec::new(),
                inbound: VecDeque::new(),
                accept_limit: None,
                bytes_free: None,
            }),
            readable: Condvar::new(),
        }
    }

    /// Queue bytes for the inbound side, waking any blocked `read_byte`.
    pub fn feed(&self, bytes: &[u8]) {
        let mut state = self.lock_state();
        state.inbound.extend(bytes.iter().copied());
        drop(state);
        self.readable.notify_all();
    }

    /// Snapshot of everything written to the device so far.
    pub fn outbound(&self) -> Vec<u8> {
        self.lock_state().outbound.clone()
    }

    /// Drain and return everything written to the device so far.
    pub fn take_outbound(&self) -> Vec<u8> {
        std::mem::take(&mut self.lock_state().outbound)
    }

    /// Cap how many bytes each `write` call accepts. `None` removes the cap.
    pub fn set_accept_limit(&self, limit: Option<usize>) {
        self.lock_state().accept_limit = limit;
    }

    /// Override the free-space figure `bytes_free` reports.
    pub fn set_bytes_free(&self, free: Option<usize>) {
        self.lock_state().bytes_free = free;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialTransport for LoopbackTransport {
    fn bytes_free(&self) -> usize {
        self.lock_state().bytes_free.unwrap_or(usize::MAX)
    }

    fn write(&self, buf: &[u8]) -> usize {
        let mut state = self.lock_state();
        let accepted = match state.accept_limit {
            Some(limit) => buf.len().min(limit),
            None => buf.len(),
        };
        state.outbound.extend_from_slice(&buf[..accepted]);
        if accepted < buf.len() {
            debug!(offered = buf.len(), accepted, "loopback under-accepted write");
        }
        accepted
    }

    fn read_byte(&self, timeout: Duration) -> Option<u8> {
        let deadline = std::time::Instant::now() + timeout;
        let mut state = self.lock_state();
        loop {
            if let Some(byte) = state.inbound.pop_front() {
                return Some(byte);
            }
            let now = std::time::Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _timed_out) = self
                .readable
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_outbound_bytes() {
        let transport = LoopbackTransport::new();
        assert_eq!(transport.write(b"abc"), 3);
        assert_eq!(transport.outbound(), b"abc");
        assert_eq!(transport.take_outbound(), b"abc");
        assert!(transport.outbound().is_empty());
    }

    #[test]
    fn accept_limit_caps_each_write() {
        let transport = LoopbackTransport::new();
        transport.set_accept_limit(Some(2));
        assert_eq!(transport.write(b"abcdef"), 2);
        assert_eq!(transport.outbound(), b"ab");

        transport.set_accept_limit(None);
        assert_eq!(transport.write(b"cdef"), 4);
        assert_eq!(transport.outbound(), b"abcdef");
    }

    #[test]
    fn bytes_free_defaults_unbounded() {
        let transport = LoopbackTransport::new();
        assert_eq!(transport.bytes_free(), usize::MAX);
        transport.set_bytes_free(Some(5));
        assert_eq!(transport.bytes_free(), 5);
    }

    #[test]
    fn zero_timeout_read_is_a_poll() {
        let transport = LoopbackTransport::new();
        assert_eq!(transport.read_byte(Duration::ZERO), None);
        transport.feed(b"x");
        assert_eq!(transport.read_byte(Duration::ZERO), Some(b'x'));
    }

    #[test]
    fn timed_read_wakes_on_feed() {
        let transport = std::sync::Arc::new(LoopbackTransport::new());
        let reader = {
            let transport = std::sync::Arc::clone(&transport);
            std::thread::spawn(move || transport.read_byte(Duration::from_secs(5)))
        };
        // Give the reader a moment to block before feeding.
        std::thread::sleep(Duration::from_millis(20));
        transport.feed(b"z");
        assert_eq!(reader.join().unwrap(), Some(b'z'));
    }

    #[test]
    fn timed_read_times_out_empty() {
        let transport = LoopbackTransport::new();
        assert_eq!(transport.read_byte(Duration::from_millis(10)), None);
    }
}
