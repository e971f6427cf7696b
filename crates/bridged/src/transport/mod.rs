//! Line-delimited JSON transport over standard I/O.
//!
//! The bridge reads one request per line and writes one response per line.
//! Both halves are generic over tokio's async I/O traits so sessions can be
//! driven from in-memory buffers as easily as from the process's stdin and
//! stdout.

mod errors;
mod reader;
mod writer;


pub use self::errors::TransportError;
pub use self::reader::{Frame, LineReader};
pub use self::writer::LineWriter;

/// Maximum size of a single request line in bytes.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
