//! A mergeable Fibonacci heap with decrease-key and stable node handles.
//!
//! This crate provides a min-ordered priority queue backed by the classical
//! Fibonacci heap structure: a forest of heap-ordered trees whose roots and
//! sibling groups are kept in circular doubly-linked lists. The layout buys
//! the well-known amortized bounds:
//!
//! - **Insert**: O(1) — splice a singleton tree into the root ring
//! - **Find-min**: O(1) — the root ring carries a minimum pointer
//! - **Meld**: O(1) — concatenate two root rings
//! - **Decrease-key**: O(1) amortized — cut the node, cascade up marked parents
//! - **Extract-min / remove**: O(log n) amortized — consolidate roots by degree
//!
//! Unlike `std::collections::BinaryHeap`, every insertion returns a
//! [`NodeRef`] handle that stays valid across arbitrary heap restructuring,
//! so priorities can later be lowered ([`FibonacciHeap::decrease_key`]) or
//! entries deleted in place ([`FibonacciHeap::remove`]). A handle outlives
//! its entry: after extraction, or after the heap itself is dropped, the
//! handle still reads the last observed key and payload and simply reports
//! that it is no longer attached.
//!
//! The ordering of keys is a capability supplied per heap: the [`KeyOrder`]
//! trait, implemented by the default [`NaturalOrder`] (ascending `Ord`) and
//! by any `Fn(&K, &K) -> bool` strict-less closure.
//!
//! # Example
//!
//! ```rust
//! use fibheap::FibonacciHeap;
//!
//! let mut heap: FibonacciHeap<u32, &str> = FibonacciHeap::new();
//! let write = heap.insert(5, "write");
//! heap.insert(3, "fetch");
//!
//! assert_eq!(*heap.top().unwrap().key(), 3);
//!
//! heap.decrease_key(&write, 1).unwrap();
//! assert_eq!(*heap.top().unwrap().key(), 1);
//!
//! let first = heap.extract_min().unwrap();
//! assert_eq!(*first.payload(), "write");
//! assert!(!first.is_attached());
//! ```
//!
//! Heaps are single-threaded by design; wrap one in a mutex if it must be
//! shared. Cloning a heap deep-copies the whole forest — handles into the
//! original are rejected by the copy.

mod duplicate;
mod error;
mod handle;
mod heap;
mod order;


pub use error::HeapError;
pub use handle::NodeRef;
pub use heap::FibonacciHeap;
pub use order::{KeyOrder, NaturalOrder};
