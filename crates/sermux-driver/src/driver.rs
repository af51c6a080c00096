use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};

use sermux_frame::codec::{self, FRAME_DELIMITER};
use sermux_frame::tag::{self, StreamTag};
use sermux_transport::SerialTransport;

use crate::control::ControlRequest;
use crate::error::{DriverError, Result};
use crate::handle::StreamHandle;
use crate::policy::StreamPolicy;
use crate::queue::ByteQueue;

/// Default output queue capacity in bytes. A tuning constant, not a
/// structural invariant.
pub const SERIAL_BUFFER_SIZE: usize = 2047;

/// File type reported by `stat` for serial streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    CharDevice,
}

/// The serial multiplexer driver.
///
/// One instance exists per process, created at system initialization and
/// shared by reference with every entry point (no ambient globals). All
/// methods take `&self`; the two path locks serialize readers against
/// readers and writers against writers, while the flush path runs
/// lock-free against writers on the queue primitive.
pub struct SerialDriver<T> {
    transport: T,
    write_queue: ByteQueue,
    policy: StreamPolicy,
    /// Whether outbound writes are frame-encoded. Read per write call;
    /// a flip racing a write is tolerated on this best-effort transport.
    framing: AtomicBool,
    /// Ensures only one read is in flight system-wide.
    read_lock: Mutex<()>,
    /// Totally orders enqueues, so frames never interleave byte-by-byte.
    write_lock: Mutex<()>,
    stdin: Arc<StreamHandle>,
    stdout: Arc<StreamHandle>,
    stderr: Arc<StreamHandle>,
    dbg: Arc<StreamHandle>,
}

impl<T: SerialTransport> SerialDriver<T> {
    /// Driver with the default queue capacity and framing enabled.
    pub fn new(transport: T) -> Self {
        Self::with_capacity(transport, SERIAL_BUFFER_SIZE)
    }

    /// Driver with an explicit output queue capacity.
    pub fn with_capacity(transport: T, capacity: usize) -> Self {
        debug!(capacity, "serial driver initialized");
        Self {
            transport,
            write_queue: ByteQueue::new(capacity),
            policy: StreamPolicy::new(),
            framing: AtomicBool::new(true),
            read_lock: Mutex::new(()),
            write_lock: Mutex::new(()),
            stdin: Arc::new(StreamHandle::new(tag::STDIN)),
            stdout: Arc::new(StreamHandle::new(tag::STDOUT)),
            stderr: Arc::new(StreamHandle::new(tag::STDERR)),
            dbg: Arc::new(StreamHandle::new(tag::DEBUG)),
        }
    }

    /// The reserved standard-input handle.
    pub fn stdin(&self) -> &Arc<StreamHandle> {
        &self.stdin
    }

    /// The reserved standard-output handle.
    pub fn stdout(&self) -> &Arc<StreamHandle> {
        &self.stdout
    }

    /// The reserved standard-error handle.
    pub fn stderr(&self) -> &Arc<StreamHandle> {
        &self.stderr
    }

    /// The reserved debug-channel handle.
    pub fn debug(&self) -> &Arc<StreamHandle> {
        &self.dbg
    }

    /// The stream delivery policy registry.
    pub fn policy(&self) -> &StreamPolicy {
        &self.policy
    }

    /// Whether outbound writes are currently frame-encoded.
    pub fn framing_enabled(&self) -> bool {
        self.framing.load(Ordering::Relaxed)
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Bytes currently waiting in the output queue.
    pub fn queued(&self) -> usize {
        self.write_queue.len()
    }

    /// Open a stream by path.
    ///
    /// An empty path (after stripping one leading separator) maps to
    /// stdout; the reserved short names map to their standard handles;
    /// any other name of at most 4 bytes opens a fresh handle for that
    /// tag. The returned handle is owned by the caller.
    pub fn open(&self, path: &str) -> Result<Arc<StreamHandle>> {
        let name = path.strip_prefix('/').unwrap_or(path);
        match name {
            "" | "sout" => return Ok(Arc::clone(&self.stdout)),
            "sin" => return Ok(Arc::clone(&self.stdin)),
            "serr" => return Ok(Arc::clone(&self.stderr)),
            _ => {}
        }
        let stream_tag = StreamTag::from_name(name).map_err(|_| DriverError::NameTooLong {
            name: name.to_string(),
        })?;
        debug!(tag = %stream_tag, "opened serial stream");
        Ok(Arc::new(StreamHandle::new(stream_tag)))
    }

    /// Read a line (or a full buffer) from the inbound byte source.
    ///
    /// Serial reads aren't stream-based: there is one inbound line, so
    /// concurrent readers are strictly serialized. Bytes are pulled one
    /// at a time with a zero timeout; once at least one byte has
    /// accumulated, a dry source ends the read. Accumulation also stops
    /// after a newline (kept in the output) or a full buffer.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let _guard = self
            .read_lock
            .lock()
            .map_err(|_| DriverError::AccessDenied)?;
        let mut read = 0;
        while read < buf.len() {
            let Some(byte) = self.transport.read_byte(Duration::ZERO) else {
                if read > 0 {
                    break;
                }
                std::thread::yield_now();
                continue;
            };
            buf[read] = byte;
            read += 1;
            if byte == b'\n' {
                break;
            }
        }
        Ok(read)
    }

    /// Write a payload to the stream behind `handle`.
    ///
    /// Disabled, non-guaranteed streams report full success without
    /// transmitting anything — callers never learn delivery was
    /// policy-suppressed. On success the logical payload length is
    /// returned, not the (larger) wire length.
    pub fn write(&self, handle: &StreamHandle, payload: &[u8]) -> Result<usize> {
        let stream_tag = handle.tag();
        if !self.policy.is_enabled(stream_tag) {
            trace!(tag = %stream_tag, len = payload.len(), "write suppressed by policy");
            return Ok(payload.len());
        }

        let noblock = handle.is_nonblocking();
        let frame = if self.framing_enabled() {
            let mut buf = BytesMut::with_capacity(codec::measure(stream_tag, payload) + 1);
            codec::encode(stream_tag, payload, &mut buf);
            buf.put_u8(FRAME_DELIMITER);
            Some(buf)
        } else {
            None
        };
        let outbound: &[u8] = frame.as_deref().unwrap_or(payload);

        let _guard = self.acquire_write_lock(noblock)?;
        if !self.write_queue.push(outbound, !noblock) {
            return Err(DriverError::QueueFull);
        }
        Ok(payload.len())
    }

    /// Ship waiting bytes to the transport.
    ///
    /// Called periodically by the system daemon loop, independent of
    /// reader/writer threads. The bulk write only happens when the
    /// transport reports room for everything waiting; a shortfall in
    /// what it then actually accepts leaves the remainder at the head
    /// of the queue, in order.
    pub fn flush(&self) {
        let waiting = self.write_queue.snapshot();
        if waiting.is_empty() || waiting.len() > self.transport.bytes_free() {
            return;
        }
        let accepted = self.transport.write(&waiting);
        if accepted == waiting.len() {
            self.write_queue.reset();
        } else {
            trace!(
                attempted = waiting.len(),
                accepted,
                "transport accepted partial flush"
            );
            self.write_queue.consume(accepted);
        }
    }

    /// Close a stream handle. Reserved handles outlive every close.
    pub fn close(&self, _handle: &Arc<StreamHandle>) -> Result<()> {
        Ok(())
    }

    /// File metadata: every serial stream is a character device.
    pub fn stat(&self, _handle: &StreamHandle) -> FileKind {
        FileKind::CharDevice
    }

    /// Serial streams are always interactive.
    pub fn is_interactive(&self, _handle: &StreamHandle) -> bool {
        true
    }

    /// Seeking has no meaning on a serial line; always fails.
    pub fn seek(&self, _handle: &StreamHandle, _pos: std::io::SeekFrom) -> Result<u64> {
        Err(DriverError::Unsupported)
    }

    /// Apply a decoded control verb.
    pub fn control(&self, handle: &StreamHandle, request: ControlRequest) -> Result<()> {
        debug!(request = ?request, "serial control");
        match request {
            ControlRequest::Activate(stream_tag) => self.policy.activate(stream_tag),
            ControlRequest::Deactivate(stream_tag) => self.policy.deactivate(stream_tag),
            ControlRequest::SetBlocking => handle.set_nonblocking(false),
            ControlRequest::SetNonblocking => handle.set_nonblocking(true),
            ControlRequest::EnableFraming => self.framing.store(true, Ordering::Relaxed),
            ControlRequest::DisableFraming => self.framing.store(false, Ordering::Relaxed),
        }
        Ok(())
    }

    /// Apply an ioctl-style `(action, parameter)` pair from the
    /// filesystem boundary. Unknown actions fail with no side effects.
    pub fn control_raw(&self, handle: &StreamHandle, action: u32, parameter: u32) -> Result<()> {
        let request = ControlRequest::from_raw(action, parameter)
            .ok_or(DriverError::UnknownAction { action })?;
        self.control(handle, request)
    }

    /// Write lock acquisition respects the handle's non-blocking flag
    /// uniformly, whether or not framing is enabled.
    fn acquire_write_lock(&self, noblock: bool) -> Result<MutexGuard<'_, ()>> {
        if noblock {
            self.write_lock
                .try_lock()
                .map_err(|_| DriverError::AccessDenied)
        } else {
            self.write_lock.lock().map_err(|_| DriverError::AccessDenied)
        }
    }
}
