//! Error type for heap operations.

use std::fmt;

/// Error returned by fallible heap operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The operation requires a non-empty heap.
    Empty,
    /// The handle does not currently refer to an entry of this heap:
    /// it is stale (the entry was extracted, or the heap was dropped)
    /// or it was minted by a different heap.
    NotInHeap,
    /// `decrease_key` was called with a key greater than the current key.
    KeyIncreased,
    /// `meld` was attempted between heaps whose comparators report
    /// themselves incompatible.
    ComparatorMismatch,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::Empty => write!(f, "heap is empty"),
            HeapError::NotInHeap => write!(f, "node is not in this heap"),
            HeapError::KeyIncreased => {
                write!(f, "new key is greater than the current key")
            }
            HeapError::ComparatorMismatch => {
                write!(f, "heaps were built with incompatible comparators")
            }
        }
    }
}

impl std::error::Error for HeapError {}
