//! Deep-copy builder behind `Clone`.
//!
//! Cloning a heap rebuilds an isomorphic forest: fresh structure nodes,
//! fresh payload cells, same ring order, same degrees and marks, with the
//! copy's minimum pointing at the image of the source's minimum. The
//! source forest is only read. Handles into the source are rejected by
//! the copy — the copy mints its own brand and its cells carry it.

use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::handle::{HeapBrand, Slot};
use crate::heap::{ring_nodes, FibonacciHeap, Node};

impl<K, T, C> Clone for FibonacciHeap<K, T, C>
where
    K: Clone,
    T: Clone,
    C: Clone,
{
    fn clone(&self) -> Self {
        let mut copy = Self::with_order(self.order.clone());
        if let Some(min) = self.min {
            copy.min = Some(unsafe { mirror_ring(min, None, &copy.brand) });
            copy.len = self.len;
        }
        copy
    }
}

/// Mirrors one sibling ring (and, recursively, every child ring below
/// it), returning the image of `anchor`. New nodes are wired in source
/// ring order; `parent` is the already-built image of the source ring's
/// parent.
unsafe fn mirror_ring<K: Clone, T: Clone>(
    anchor: NonNull<Node<K, T>>,
    parent: Option<NonNull<Node<K, T>>>,
    brand: &Rc<HeapBrand>,
) -> NonNull<Node<K, T>> {
    let sources = ring_nodes(anchor);
    let mut images = Vec::with_capacity(sources.len());
    for source in &sources {
        let (key, payload) = {
            let slot = (*source.as_ptr()).slot.borrow();
            (slot.key.clone(), slot.payload.clone())
        };
        let slot = Rc::new(RefCell::new(Slot {
            key,
            payload,
            node: None,
            brand: Rc::clone(brand),
        }));
        let image = NonNull::new_unchecked(Box::into_raw(Box::new(Node {
            slot: Rc::clone(&slot),
            parent,
            child: None,
            left: NonNull::dangling(),
            right: NonNull::dangling(),
            degree: (*source.as_ptr()).degree,
            marked: (*source.as_ptr()).marked,
        })));
        slot.borrow_mut().node = Some(image);
        if let Some(child) = (*source.as_ptr()).child {
            (*image.as_ptr()).child = Some(mirror_ring(child, Some(image), brand));
        }
        images.push(image);
    }
    let count = images.len();
    for (i, &image) in images.iter().enumerate() {
        (*image.as_ptr()).right = images[(i + 1) % count];
        (*image.as_ptr()).left = images[(i + count - 1) % count];
    }
    images[0]
}
