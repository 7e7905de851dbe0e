//! Index ownership, mutation, and lifecycle notifications

mod observer;
mod writer;

pub use observer::{CountingObserver, IndexingObserver};
pub use writer::{FacetedIndex, IndexStats};
