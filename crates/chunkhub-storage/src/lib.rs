//! # chunkhub-storage
//!
//! Server-side storage engine for ChunkHub: the on-disk staging layout,
//! byte-offset chunk reception, resume planning, and the concurrent merge
//! that reconstructs the final file.

pub mod merger;
pub mod planner;
pub mod receiver;
pub mod store;

pub use merger::ChunkMerger;
pub use planner::ResumePlanner;
pub use receiver::{ChunkReceiver, ReceiveOutcome};
pub use store::{ByteStream, ChunkStore};
