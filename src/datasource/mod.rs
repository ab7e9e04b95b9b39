//! Sample storage and lookup.
//!
//! The data layer is optimized for sustained streaming writes: appends and
//! range queries are amortized O(1), nearest lookups are logarithmic.

pub mod nearest;
mod ring;

pub use nearest::{NearestSample, SearchStrategy, bisect_nearest, nearest_by_x, scan_nearest};
pub use ring::{RingBuffer2D, Samples};

/// Errors raised when sizing a sample store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    /// A store must hold at least one sample.
    #[error("sample store capacity must be at least 1")]
    Zero,
}
