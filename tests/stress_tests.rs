//! Stress tests that push large operation volumes through the heap to
//! shake out edge cases in consolidation and cutting.

use fibheap::FibonacciHeap;

type IntHeap = FibonacciHeap<i32, i32>;

#[test]
fn massive_insert_then_drain() {
    let mut heap = IntHeap::new();
    for i in 0..1000 {
        heap.insert(i, i);
    }
    assert_eq!(heap.len(), 1000);
    for i in 0..1000 {
        let out = heap.extract_min().unwrap();
        assert_eq!(*out.key(), i);
        assert_eq!(*out.payload(), i);
    }
    assert!(heap.is_empty());
}

#[test]
fn decrease_key_storm() {
    let mut heap = IntHeap::new();
    let mut handles = Vec::new();
    for i in 0..500 {
        handles.push(heap.insert(10_000 + i, i));
    }
    for (i, handle) in handles.iter().enumerate() {
        heap.decrease_key(handle, i as i32).unwrap();
    }
    for i in 0..500 {
        let out = heap.extract_min().unwrap();
        assert_eq!(*out.key(), i);
    }
    assert!(heap.is_empty());
}

#[test]
fn alternating_insert_and_extract() {
    let mut heap = IntHeap::new();
    for i in 0..200 {
        heap.insert(i * 2, i);
        heap.insert(i * 2 + 1, i + 1000);
        assert!(heap.extract_min().is_ok());
    }
    let mut last = i32::MIN;
    let mut count = 0;
    while let Ok(out) = heap.extract_min() {
        assert!(*out.key() >= last);
        last = *out.key();
        count += 1;
    }
    assert_eq!(count, 200);
    assert!(heap.is_empty());
}

#[test]
fn large_meld_drains_sorted() {
    let mut a = IntHeap::new();
    let mut b = IntHeap::new();
    for i in 0..500 {
        a.insert(i * 2, i);
        b.insert(i * 2 + 1, i);
    }
    a.meld(&mut b).unwrap();
    assert_eq!(a.len(), 1000);
    assert!(b.is_empty());
    for i in 0..1000 {
        assert_eq!(*a.extract_min().unwrap().key(), i);
    }
}

#[test]
fn interleaved_remove_and_decrease() {
    let mut heap = IntHeap::new();
    let mut handles = Vec::new();
    for i in 0..400 {
        handles.push(heap.insert(i, i));
    }
    for (i, handle) in handles.iter().enumerate() {
        if i % 3 == 0 {
            heap.remove(handle).unwrap();
        } else if i % 5 == 0 {
            heap.decrease_key(handle, -(i as i32)).unwrap();
        }
    }
    let mut expected: Vec<i32> = (0..400)
        .filter(|i| i % 3 != 0)
        .map(|i| if i % 5 == 0 { -i } else { i })
        .collect();
    expected.sort_unstable();
    let mut drained = Vec::new();
    while let Ok(out) = heap.extract_min() {
        drained.push(*out.key());
    }
    assert_eq!(drained, expected);
}

#[test]
fn repeated_meld_of_small_batches() {
    let mut heap = IntHeap::new();
    for batch in 0..100 {
        let mut other = IntHeap::new();
        for i in 0..10 {
            other.insert(batch * 10 + i, 0);
        }
        heap.meld(&mut other).unwrap();
        // keep consolidation honest while melding
        if batch % 7 == 0 {
            heap.extract_min().unwrap();
        }
    }
    let mut last = i32::MIN;
    while let Ok(out) = heap.extract_min() {
        assert!(*out.key() >= last);
        last = *out.key();
    }
}
