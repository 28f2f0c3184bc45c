//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod matching;
mod trees;

pub use matching::{FrameMatch, MatchingService};
pub use trees::TreeService;
