use std::time::Duration;

/// A byte-oriented serial device.
///
/// Methods take `&self` because device I/O is inherently shared-state;
/// implementations synchronize internally. The driver calls `bytes_free`
/// and `write` from its flush path and `read_byte` from its read path,
/// possibly from different threads at the same time.
pub trait SerialTransport {
    /// Bytes the device can currently accept without dropping any.
    fn bytes_free(&self) -> usize;

    /// Write up to `buf.len()` bytes, returning the number actually
    /// accepted. Acceptance may fall short of `bytes_free` under load.
    fn write(&self, buf: &[u8]) -> usize;

    /// Read one inbound byte, waiting at most `timeout`.
    ///
    /// Returns `None` when no byte arrives within the timeout. A zero
    /// timeout is a pure poll.
    fn read_byte(&self, timeout: Duration) -> Option<u8>;
}

impl<T: SerialTransport + ?Sized> SerialTransport for &T {
    fn bytes_free(&self) -> usize {
        (**self).bytes_free()
    }

    fn write(&self, buf: &[u8]) -> usize {
        (**self).write(buf)
    }

    fn read_byte(&self, timeout: Duration) -> Option<u8> {
        (**self).read_byte(timeout)
    }
}
