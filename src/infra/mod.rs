//! Infrastructure: queue storage.

pub mod queue;
