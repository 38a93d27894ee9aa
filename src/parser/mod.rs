//! PDF parsing module.
//!
//! Turns documents into per-page positioned blocks for the outline engine.

mod backend;
mod layout;
mod memory;
mod options;

pub use backend::{BlockProvider, LopdfBackend};
pub use memory::MemoryProvider;
pub use options::{ErrorMode, ExtractOptions};
