//! Frame filtering for tsframe
//!
//! This crate provides pattern compilation, the policy that combines
//! per-pattern results, the per-frame match engine, and the driver that
//! filters a frame stream into an output sink.

mod driver;
mod engine;
mod error;
mod pattern;
mod policy;

pub use driver::{FilterDriver, FilterStats};
pub use engine::{FilterOptions, MatchEngine, Verdict};
pub use error::{FilterError, Result};
pub use pattern::CompiledPattern;
pub use policy::MatchPolicy;

// Re-export types used in our public API
pub use tsframe_codec::{FrameReader, RenderOptions};
