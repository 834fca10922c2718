//! Dataflow primitives shared by the registry and its background peer
//!
//! # Core Components
//!
//! - **[`Relay`]** - Type-safe, fire-and-forget event streaming over an unbounded channel
//!
//! # Conventions
//!
//! 1. **Event-Source Naming** - Relays follow `{source}_{event}_relay` pattern
//! 2. **Fire and Forget** - Senders never wait for, or observe, the receiver's work

pub mod relay;

pub use relay::{Relay, RelayError, relay};
