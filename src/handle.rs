//! Payload cells and the external handles that point at them.
//!
//! Every entry of a heap is split in two: the structure node (owned by the
//! heap, see `heap.rs`) and the payload cell defined here. The cell holds
//! the key and the payload and is shared — the structure node keeps one
//! strong reference, and every [`NodeRef`] the user holds keeps another.
//! Re-parenting a node during consolidation or cutting never touches the
//! cell, which is what keeps handles valid across structural churn; and
//! when the node is destroyed (extraction, removal, heap drop) the cell
//! simply loses its back-link and lives on for as long as any handle does.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::heap::Node;

/// The payload cell: key, payload, and a back-link to the structure node
/// currently carrying this cell (`None` once detached).
pub(crate) struct Slot<K, T> {
    pub(crate) key: K,
    pub(crate) payload: T,
    pub(crate) node: Option<NonNull<Node<K, T>>>,
    pub(crate) brand: Rc<HeapBrand>,
}

/// Identity token of a live heap, used to answer "does this handle belong
/// to this heap" in O(1) even though meld moves whole forests between
/// heaps without visiting their cells.
///
/// Each heap owns one brand. A cell records the brand of the heap that
/// minted it. When heap `b` is melded into heap `a`, `b`'s brand is
/// forwarded to `a`'s and `b` receives a fresh one; resolving a cell's
/// brand chases the forwarding chain (compressing it on the way), so
/// cells minted by `b` now resolve to `a`. A cloned heap mints a fresh
/// brand, which is why handles into the original are rejected by the copy.
pub(crate) struct HeapBrand {
    forward: RefCell<Option<Rc<HeapBrand>>>,
}

impl HeapBrand {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(HeapBrand {
            forward: RefCell::new(None),
        })
    }

    /// Follows the meld-forwarding chain to the representative brand,
    /// re-pointing every link on the path directly at it.
    fn canonical(this: &Rc<Self>) -> Rc<Self> {
        let Some(next) = this.forward.borrow().clone() else {
            return Rc::clone(this);
        };
        let root = Self::canonical(&next);
        *this.forward.borrow_mut() = Some(Rc::clone(&root));
        root
    }

    pub(crate) fn same(a: &Rc<Self>, b: &Rc<Self>) -> bool {
        Rc::ptr_eq(&Self::canonical(a), &Self::canonical(b))
    }

    /// Hands this brand's identity over to `target`. Only ever called on
    /// the brand of a heap being emptied by meld, which immediately
    /// replaces it with a fresh one.
    pub(crate) fn forward_to(&self, target: &Rc<Self>) {
        *self.forward.borrow_mut() = Some(Rc::clone(target));
    }
}

/// A stable reference to one entry of a [`FibonacciHeap`].
///
/// Handles are returned by [`insert`], [`top`], [`extract_min`] and
/// [`remove`], and are the currency of [`decrease_key`] and [`remove`].
/// A handle stays valid across every non-destructive heap operation —
/// consolidation, cuts, melds — and keeps working (read-only) after its
/// entry has left the heap: it then reports the last observed key and
/// payload, and [`is_attached`](NodeRef::is_attached) turns false.
///
/// Cloning a handle is cheap and yields a second reference to the same
/// entry. Holding or dropping handles never mutates the heap.
///
/// The accessors return `RefCell` guards; do not hold one across a call
/// that mutates the heap, or that call may panic on a conflicting borrow.
///
/// [`FibonacciHeap`]: crate::FibonacciHeap
/// [`insert`]: crate::FibonacciHeap::insert
/// [`top`]: crate::FibonacciHeap::top
/// [`extract_min`]: crate::FibonacciHeap::extract_min
/// [`remove`]: crate::FibonacciHeap::remove
/// [`decrease_key`]: crate::FibonacciHeap::decrease_key
pub struct NodeRef<K, T> {
    pub(crate) slot: Rc<RefCell<Slot<K, T>>>,
}

impl<K, T> NodeRef<K, T> {
    pub(crate) fn new(slot: Rc<RefCell<Slot<K, T>>>) -> Self {
        NodeRef { slot }
    }

    /// Read access to the key. Keys can only be changed through
    /// [`decrease_key`](crate::FibonacciHeap::decrease_key).
    pub fn key(&self) -> Ref<'_, K> {
        Ref::map(self.slot.borrow(), |s| &s.key)
    }

    /// Read access to the payload.
    pub fn payload(&self) -> Ref<'_, T> {
        Ref::map(self.slot.borrow(), |s| &s.payload)
    }

    /// Mutable access to the payload. The payload never participates in
    /// ordering, so mutating it cannot disturb the heap.
    pub fn payload_mut(&self) -> RefMut<'_, T> {
        RefMut::map(self.slot.borrow_mut(), |s| &mut s.payload)
    }

    /// Whether this entry is still inside some heap.
    pub fn is_attached(&self) -> bool {
        self.slot.borrow().node.is_some()
    }
}

impl<K, T> Clone for NodeRef<K, T> {
    fn clone(&self) -> Self {
        NodeRef {
            slot: Rc::clone(&self.slot),
        }
    }
}

/// Two handles are equal when they refer to the same entry.
impl<K, T> PartialEq for NodeRef<K, T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<K, T> Eq for NodeRef<K, T> {}

impl<K: fmt::Debug, T> fmt::Debug for NodeRef<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("NodeRef")
            .field("key", &slot.key)
            .field("attached", &slot.node.is_some())
            .finish()
    }
}
