//! Serial stream multiplexer driver.
//!
//! This is the stateful layer of sermux: it owns the output byte queue,
//! the stream delivery policy, and the read/write path locks, and it
//! exposes the dispatch surface the virtual filesystem layer calls
//! (open/read/write/close/stat/seek) plus the runtime control verbs.
//!
//! Data flow: write path → frame codec → output queue → flush → physical
//! transport. The read path pulls inbound bytes straight from the
//! transport; no inbound buffering lives here.

pub mod control;
pub mod driver;
pub mod error;
pub mod handle;
pub mod policy;
pub mod queue;

pub use control::{
    ControlRequest, SERCTL_ACTIVATE, SERCTL_BLKWRITE, SERCTL_DEACTIVATE, SERCTL_DISABLE_COBS,
    SERCTL_ENABLE_COBS, SERCTL_NOBLKWRITE,
};
pub use driver::{FileKind, SerialDriver, SERIAL_BUFFER_SIZE};
pub use error::{DriverError, Result};
pub use handle::StreamHandle;
pub use policy::{StreamPolicy, GUARANTEED_DELIVERY};
pub use queue::ByteQueue;
