//! Application layer: resolving examples and syncing code blocks.

pub mod fence;
pub mod resolve;
pub mod sync;
