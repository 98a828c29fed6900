//! Queue backends.

pub mod depth;

pub use depth::DepthQueue;
