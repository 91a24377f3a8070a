//! Ephemeral object registry for Chute.
//!
//! The registry is the authoritative mapping from file handle to stored blob:
//! - `register` creates a record with a fixed expiry and arms its deletion timer
//! - `list` / `get` read live records and lazily evict expired ones
//! - `delete` removes a record through the same idempotent deletion routine
//!   the timer and lazy expiry use
//!
//! Every record is guaranteed to be deleted eventually even if no read path
//! ever touches it: registration arms a one-shot timer at lifetime plus a
//! small grace period, and whichever of {timer fire, manual delete, lazy
//! expiry on read} happens first wins. The losers observe an absent entry and
//! do nothing.

pub mod record;
pub mod registry;

pub use record::{FileEntry, FileInfo, Record, RegisteredFile};
pub use registry::Registry;
