//! The Fibonacci heap proper: forest structure and mutating operations.
//!
//! # Structure
//!
//! The heap is a forest of heap-ordered multi-way trees. Tree roots are
//! linked into a circular doubly-linked list (the root ring), and the
//! children of every node form their own circular list anchored by the
//! parent's `child` pointer. The heap object holds a pointer to a root
//! with minimal key and the entry count; everything else is reachable
//! from there.
//!
//! Circular lists make the O(1) operations O(1): inserting splices a
//! singleton into the root ring, and melding concatenates two rings with
//! four pointer writes.
//!
//! # Consolidation
//!
//! `extract_min` is where deferred work is paid off. After the minimum
//! root is unlinked and its children promoted, roots of equal degree are
//! linked pairwise (the larger key becoming a child of the smaller) until
//! all root degrees are distinct — the same carry propagation as binary
//! addition, indexed by a small degree table. The Fibonacci bound (a tree
//! of degree d holds at least F(d+2) nodes) keeps the table at O(log n)
//! entries.
//!
//! # Cascading cuts
//!
//! `decrease_key` may violate heap order; the violating node is then cut
//! to the root ring. The `marked` flag records that a node has lost a
//! child since it last became a child itself: cutting a node from a
//! marked parent cuts the parent too, cascading upward until an unmarked
//! node or a root. This discipline is what preserves the Fibonacci bound
//! — no node loses two children while staying a child — and it is why
//! `marked` is cleared every time a node becomes a root or a child.
//!
//! # Nodes and cells
//!
//! Structure nodes are heap-owned `Box`es wired with raw pointers; each
//! owns one shared payload cell (`handle.rs`). Extraction hands the cell
//! to the caller and frees the node. Teardown walks the forest with an
//! explicit worklist — never recursion — neutralizing every cell's
//! back-link so that outstanding handles observe detachment.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::error::HeapError;
use crate::handle::{HeapBrand, NodeRef, Slot};
use crate::order::{KeyOrder, NaturalOrder};

/// One tree node. `left`/`right` chain the circular sibling list this
/// node currently lives in (root ring or a child ring); `child` anchors
/// the ring of direct children; `degree` counts them.
pub(crate) struct Node<K, T> {
    pub(crate) slot: Rc<RefCell<Slot<K, T>>>,
    pub(crate) parent: Option<NonNull<Node<K, T>>>,
    pub(crate) child: Option<NonNull<Node<K, T>>>,
    pub(crate) left: NonNull<Node<K, T>>,
    pub(crate) right: NonNull<Node<K, T>>,
    pub(crate) degree: usize,
    pub(crate) marked: bool,
}

/// Collects the members of a circular sibling list into a flat vector.
///
/// Callers restructure rings while iterating; snapshotting first keeps
/// the traversal independent of the splicing.
pub(crate) unsafe fn ring_nodes<K, T>(anchor: NonNull<Node<K, T>>) -> Vec<NonNull<Node<K, T>>> {
    let mut nodes = vec![anchor];
    let mut cursor = (*anchor.as_ptr()).right;
    while cursor != anchor {
        nodes.push(cursor);
        cursor = (*cursor.as_ptr()).right;
    }
    nodes
}

/// Frees a structure node, detaching and returning its payload cell.
pub(crate) unsafe fn detach_slot<K, T>(node: NonNull<Node<K, T>>) -> Rc<RefCell<Slot<K, T>>> {
    let boxed = Box::from_raw(node.as_ptr());
    let slot = boxed.slot;
    slot.borrow_mut().node = None;
    slot
}

/// Scratch-table size for consolidation: the largest degree reachable
/// among `len` nodes is `log_phi(len)`, plus one slot for the link in
/// flight.
fn scratch_len(len: usize) -> usize {
    const PHI: f64 = 1.618_033_988_749_895;
    ((len.max(1) as f64).ln() / PHI.ln()).floor() as usize + 2
}

/// A mergeable min-heap with O(1) amortized insert, meld and
/// decrease-key, and O(log n) amortized extract-min and remove.
///
/// `K` is the key type, `T` the payload carried alongside each key, and
/// `C` the comparator capability (defaults to [`NaturalOrder`], ascending
/// by `Ord`). See the crate docs for an overview and an example.
pub struct FibonacciHeap<K, T, C = NaturalOrder> {
    pub(crate) min: Option<NonNull<Node<K, T>>>,
    pub(crate) len: usize,
    pub(crate) order: C,
    pub(crate) brand: Rc<HeapBrand>,
    _marker: PhantomData<Box<Node<K, T>>>,
}

impl<K, T, C> FibonacciHeap<K, T, C> {
    /// Creates an empty heap ordered by `order`.
    pub fn with_order(order: C) -> Self {
        FibonacciHeap {
            min: None,
            len: 0,
            order,
            brand: HeapBrand::new(),
            _marker: PhantomData,
        }
    }

    /// Number of entries in the heap.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the heap holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry. Outstanding handles detach but keep their last
    /// observed key and payload.
    pub fn clear(&mut self) {
        if let Some(min) = self.min.take() {
            unsafe {
                let mut worklist = ring_nodes(min);
                while let Some(node) = worklist.pop() {
                    if let Some(child) = (*node.as_ptr()).child {
                        worklist.extend(ring_nodes(child));
                    }
                    drop(detach_slot(node));
                }
            }
        }
        self.len = 0;
    }
}

impl<K, T, C: Default> FibonacciHeap<K, T, C> {
    /// Creates an empty heap with the comparator's default value.
    pub fn new() -> Self {
        Self::with_order(C::default())
    }
}

impl<K, T, C: Default> Default for FibonacciHeap<K, T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T, C: KeyOrder<K>> FibonacciHeap<K, T, C> {
    /// Creates a heap holding the given `(key, payload)` pairs.
    pub fn from_pairs<I>(pairs: I, order: C) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
    {
        let mut heap = Self::with_order(order);
        for (key, payload) in pairs {
            heap.insert(key, payload);
        }
        heap
    }

    /// Inserts an entry, returning a stable handle to it.
    ///
    /// Amortized O(1): the new node joins the root ring as a singleton
    /// tree.
    pub fn insert(&mut self, key: K, payload: T) -> NodeRef<K, T> {
        let slot = Rc::new(RefCell::new(Slot {
            key,
            payload,
            node: None,
            brand: Rc::clone(&self.brand),
        }));
        let node = Box::into_raw(Box::new(Node {
            slot: Rc::clone(&slot),
            parent: None,
            child: None,
            left: NonNull::dangling(),
            right: NonNull::dangling(),
            degree: 0,
            marked: false,
        }));
        let node = unsafe { NonNull::new_unchecked(node) };
        unsafe {
            match self.min {
                Some(min) => {
                    self.splice_root(node);
                    if self.key_less(node, min) {
                        self.min = Some(node);
                    }
                }
                None => {
                    (*node.as_ptr()).left = node;
                    (*node.as_ptr()).right = node;
                    self.min = Some(node);
                }
            }
        }
        slot.borrow_mut().node = Some(node);
        self.len += 1;
        NodeRef::new(slot)
    }

    /// Returns a handle to a minimal entry without removing it.
    ///
    /// Fails with [`HeapError::Empty`] on an empty heap.
    pub fn top(&self) -> Result<NodeRef<K, T>, HeapError> {
        let min = self.min.ok_or(HeapError::Empty)?;
        Ok(NodeRef::new(unsafe { Rc::clone(&(*min.as_ptr()).slot) }))
    }

    /// Moves every entry of `other` into `self`, leaving `other` empty
    /// but usable. O(1): the two root rings are concatenated.
    ///
    /// Handles minted by `other` remain valid and now resolve against
    /// `self`. Fails with [`HeapError::ComparatorMismatch`] when the two
    /// comparators report themselves incompatible; nothing is moved in
    /// that case.
    pub fn meld(&mut self, other: &mut Self) -> Result<(), HeapError> {
        if !self.order.compatible(&other.order) {
            return Err(HeapError::ComparatorMismatch);
        }
        let Some(other_min) = other.min.take() else {
            return Ok(());
        };
        other.brand.forward_to(&self.brand);
        other.brand = HeapBrand::new();
        match self.min {
            Some(self_min) => unsafe {
                let self_left = (*self_min.as_ptr()).left;
                let other_left = (*other_min.as_ptr()).left;
                (*self_left.as_ptr()).right = other_min;
                (*other_min.as_ptr()).left = self_left;
                (*other_left.as_ptr()).right = self_min;
                (*self_min.as_ptr()).left = other_left;
                if self.key_less(other_min, self_min) {
                    self.min = Some(other_min);
                }
            },
            None => {
                self.min = Some(other_min);
            }
        }
        self.len += other.len;
        other.len = 0;
        Ok(())
    }

    /// Lowers the key of the entry behind `handle` to `new_key`.
    ///
    /// Amortized O(1). An equal key validates residency and is otherwise
    /// a no-op. Fails with [`HeapError::NotInHeap`] when the handle is
    /// stale or from another heap, and with [`HeapError::KeyIncreased`]
    /// when `new_key` is greater than the current key.
    pub fn decrease_key(&mut self, handle: &NodeRef<K, T>, new_key: K) -> Result<(), HeapError> {
        let node = self.resolve(handle)?;
        {
            let slot = handle.slot.borrow();
            if self.order.less(&slot.key, &new_key) {
                return Err(HeapError::KeyIncreased);
            }
            if !self.order.less(&new_key, &slot.key) {
                return Ok(());
            }
        }
        handle.slot.borrow_mut().key = new_key;
        unsafe {
            if let Some(parent) = (*node.as_ptr()).parent {
                if self.key_less(node, parent) {
                    self.cut(node);
                    self.cascading_cut(parent);
                }
            }
            if let Some(min) = self.min {
                if self.key_less(node, min) {
                    self.min = Some(node);
                }
            }
        }
        Ok(())
    }

    /// Removes a minimal entry and returns its (now detached) handle.
    ///
    /// Amortized O(log n): the minimum's children are promoted to roots
    /// with their marks cleared, and the root ring is consolidated.
    /// Fails with [`HeapError::Empty`] on an empty heap.
    pub fn extract_min(&mut self) -> Result<NodeRef<K, T>, HeapError> {
        let min = self.min.ok_or(HeapError::Empty)?;
        unsafe {
            if let Some(child) = (*min.as_ptr()).child.take() {
                for node in ring_nodes(child) {
                    (*node.as_ptr()).parent = None;
                    (*node.as_ptr()).marked = false;
                    self.splice_root(node);
                }
            }
            let left = (*min.as_ptr()).left;
            let right = (*min.as_ptr()).right;
            self.len -= 1;
            if left == min {
                self.min = None;
                debug_assert_eq!(self.len, 0);
            } else {
                (*left.as_ptr()).right = right;
                (*right.as_ptr()).left = left;
                self.min = Some(right);
                self.consolidate();
            }
            Ok(NodeRef::new(detach_slot(min)))
        }
    }

    /// Removes the entry behind `handle` from the heap, wherever it
    /// sits, and returns its (now detached) handle.
    ///
    /// Amortized O(log n). Fails with [`HeapError::NotInHeap`] when the
    /// handle is stale or from another heap.
    pub fn remove(&mut self, handle: &NodeRef<K, T>) -> Result<NodeRef<K, T>, HeapError> {
        let node = self.resolve(handle)?;
        if Some(node) == self.min {
            return self.extract_min();
        }
        unsafe {
            if let Some(parent) = (*node.as_ptr()).parent {
                self.cut(node);
                self.cascading_cut(parent);
            }
            if let Some(child) = (*node.as_ptr()).child.take() {
                for promoted in ring_nodes(child) {
                    (*promoted.as_ptr()).parent = None;
                    (*promoted.as_ptr()).marked = false;
                    self.splice_root(promoted);
                }
            }
            // `node` is a root distinct from `min`, so the ring stays
            // non-empty after unlinking it.
            let left = (*node.as_ptr()).left;
            let right = (*node.as_ptr()).right;
            (*left.as_ptr()).right = right;
            (*right.as_ptr()).left = left;
            self.len -= 1;
            let slot = detach_slot(node);
            if let Some(min) = self.min {
                let tied = {
                    let removed = slot.borrow();
                    let current = (*min.as_ptr()).slot.borrow();
                    !self.order.less(&removed.key, &current.key)
                        && !self.order.less(&current.key, &removed.key)
                };
                if tied {
                    self.consolidate();
                }
            }
            Ok(NodeRef::new(slot))
        }
    }

    /// Strict key comparison between two nodes.
    unsafe fn key_less(&self, a: NonNull<Node<K, T>>, b: NonNull<Node<K, T>>) -> bool {
        let sa = (*a.as_ptr()).slot.borrow();
        let sb = (*b.as_ptr()).slot.borrow();
        self.order.less(&sa.key, &sb.key)
    }

    /// Maps a handle to its structure node, verifying that the entry is
    /// currently resident in this heap.
    fn resolve(&self, handle: &NodeRef<K, T>) -> Result<NonNull<Node<K, T>>, HeapError> {
        let slot = handle.slot.borrow();
        let node = slot.node.ok_or(HeapError::NotInHeap)?;
        if !HeapBrand::same(&slot.brand, &self.brand) {
            return Err(HeapError::NotInHeap);
        }
        Ok(node)
    }

    /// Splices `node` into the root ring next to `min`; the caller fixes
    /// up the minimum pointer if needed.
    unsafe fn splice_root(&mut self, node: NonNull<Node<K, T>>) {
        match self.min {
            Some(min) => {
                let min_left = (*min.as_ptr()).left;
                (*node.as_ptr()).right = min;
                (*node.as_ptr()).left = min_left;
                (*min_left.as_ptr()).right = node;
                (*min.as_ptr()).left = node;
            }
            None => {
                (*node.as_ptr()).left = node;
                (*node.as_ptr()).right = node;
                self.min = Some(node);
            }
        }
    }

    /// Detaches `node` from its parent's child ring and promotes it to
    /// the root ring with its mark cleared.
    unsafe fn cut(&mut self, node: NonNull<Node<K, T>>) {
        let Some(parent) = (*node.as_ptr()).parent else {
            return;
        };
        let left = (*node.as_ptr()).left;
        let right = (*node.as_ptr()).right;
        if (*parent.as_ptr()).child == Some(node) {
            (*parent.as_ptr()).child = if left == node { None } else { Some(left) };
        }
        (*left.as_ptr()).right = right;
        (*right.as_ptr()).left = left;
        (*parent.as_ptr()).degree -= 1;
        (*node.as_ptr()).parent = None;
        (*node.as_ptr()).marked = false;
        self.splice_root(node);
    }

    /// Walks up from a node that just lost a child: an unmarked non-root
    /// is marked and the walk stops; a marked one is cut and the walk
    /// continues from its former parent. Roots are never marked.
    unsafe fn cascading_cut(&mut self, mut node: NonNull<Node<K, T>>) {
        while let Some(parent) = (*node.as_ptr()).parent {
            if !(*node.as_ptr()).marked {
                (*node.as_ptr()).marked = true;
                break;
            }
            self.cut(node);
            node = parent;
        }
    }

    /// Links roots of equal degree until all root degrees are distinct,
    /// then rebuilds the root ring and recomputes the minimum.
    unsafe fn consolidate(&mut self) {
        let Some(start) = self.min else {
            return;
        };
        let mut table: Vec<Option<NonNull<Node<K, T>>>> = vec![None; scratch_len(self.len)];
        for root in ring_nodes(start) {
            let mut x = root;
            let mut d = (*x.as_ptr()).degree;
            while let Some(mut y) = table[d] {
                if self.key_less(y, x) {
                    mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                table[d] = None;
                d += 1;
            }
            table[d] = Some(x);
        }
        self.min = None;
        for root in table.into_iter().flatten() {
            match self.min {
                Some(min) => {
                    self.splice_root(root);
                    if self.key_less(root, min) {
                        self.min = Some(root);
                    }
                }
                None => {
                    (*root.as_ptr()).left = root;
                    (*root.as_ptr()).right = root;
                    self.min = Some(root);
                }
            }
        }
    }

    /// Makes `child` (a root) a child of `parent`: out of the root ring,
    /// into `parent`'s child ring, mark cleared, degree bumped.
    unsafe fn link(&mut self, child: NonNull<Node<K, T>>, parent: NonNull<Node<K, T>>) {
        let left = (*child.as_ptr()).left;
        let right = (*child.as_ptr()).right;
        (*left.as_ptr()).right = right;
        (*right.as_ptr()).left = left;
        (*child.as_ptr()).parent = Some(parent);
        (*child.as_ptr()).marked = false;
        match (*parent.as_ptr()).child {
            Some(anchor) => {
                let anchor_left = (*anchor.as_ptr()).left;
                (*child.as_ptr()).right = anchor;
                (*child.as_ptr()).left = anchor_left;
                (*anchor_left.as_ptr()).right = child;
                (*anchor.as_ptr()).left = child;
            }
            None => {
                (*parent.as_ptr()).child = Some(child);
                (*child.as_ptr()).left = child;
                (*child.as_ptr()).right = child;
            }
        }
        (*parent.as_ptr()).degree += 1;
    }
}

impl<K, T, C: KeyOrder<K>> Extend<(K, T)> for FibonacciHeap<K, T, C> {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        for (key, payload) in iter {
            self.insert(key, payload);
        }
    }
}

impl<K, T, C: KeyOrder<K> + Default> FromIterator<(K, T)> for FibonacciHeap<K, T, C> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self::from_pairs(iter, C::default())
    }
}

impl<K, T, C> Drop for FibonacciHeap<K, T, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, T, C> fmt::Debug for FibonacciHeap<K, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FibonacciHeap")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}
