//! An educational simulator of a small shared-memory machine running the
//! MOESI cache coherence protocol: one main memory, four private
//! fully-associative caches, and FIFO replacement.
//!
//! The coherence engine lives in [`system`]; everything else (addresses,
//! lines, caches, main memory, rendering, the flower-name vocabulary) is
//! support for it.

pub mod address;
pub mod cache;
pub mod error;
pub mod line;
pub mod main_memory;
pub mod render;
pub mod state;
pub mod system;
pub mod vocabulary;

pub use address::{Address, BlockId, CacheId};
pub use error::EngineError;
pub use state::CoherenceState;
pub use system::{System, SystemView};
