//! Serialized command delivery to a graph engine over a named pipe.
//!
//! A presentation layer (web handler, CLI, test harness) submits graph
//! commands such as `add Node1`; graphpipe validates them, serializes
//! concurrent submissions, and writes each as one newline-terminated line to
//! the engine's FIFO with a bounded wait for the engine to attach.
//!
//! # Crate Structure
//!
//! - [`transport`]: FIFO creation, bounded write-end open, read-end handles
//! - [`command`]: verb/label validation and line encoding
//! - [`bridge`]: `CommandBridge`, the serialized submit entry point
//!
//! ```no_run
//! use graphpipe::bridge::{BridgeConfig, CommandBridge, Verb};
//!
//! let bridge = CommandBridge::new(BridgeConfig::default());
//! match bridge.submit(Verb::Add, "Node1") {
//!     Ok(ack) => println!("delivered {} bytes", ack.bytes_written),
//!     Err(err) => eprintln!("not delivered: {err}"),
//! }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use graphpipe_transport::*;
}

/// Re-export command encoding types.
pub mod command {
    pub use graphpipe_command::*;
}

/// Re-export bridge types.
pub mod bridge {
    pub use graphpipe_bridge::*;
}
