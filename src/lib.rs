#![forbid(unsafe_code)]
//! Fixed-capacity FIFO ring buffer.
//!
//! Storage is allocated once; `write` fails on a full buffer, `read` fails on
//! an empty one, and `force_write` evicts the oldest element instead of
//! failing.
//!
//! ```
//! use ringq::{InvalidOperation, RingBuffer};
//!
//! let mut rb = RingBuffer::new(3);
//! rb.write(1).unwrap();
//! rb.write(2).unwrap();
//! rb.write(3).unwrap();
//! assert_eq!(rb.write(4), Err(InvalidOperation::Full));
//!
//! rb.force_write(4);
//! assert_eq!(rb.len(), 3);
//! assert_eq!(rb.read(), Ok(2));
//! ```

pub mod config;
pub mod error;
pub mod script;
pub mod util;

pub use error::InvalidOperation;
pub use util::ring_buffer::{OverflowPolicy, RingBuffer};
