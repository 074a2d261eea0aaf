//! Unit tests for the product construction.

use crate::fsa::Fsa;
use crate::product::product;

/// One-transition machine over the byte range `[lo, hi)`.
fn span(lo: u8, hi: u8) -> Fsa {
    let mut fsa = Fsa {
        start: 0,
        finals: vec![1],
        adj: vec![Vec::new(); 2],
    };
    fsa.insert_edge(0, lo as u32, hi as u32 + 1, 1);
    fsa
}

#[test]
fn intersection_keeps_the_overlap() {
    let a = span(b'a', b'c');
    let b = span(b'b', b'd');
    let p = product(&a, &b, |x, y| x && y, |_, _| {});
    p.check();
    assert!(!p.accepts(b"a"));
    assert!(p.accepts(b"b"));
    assert!(p.accepts(b"c"));
    assert!(!p.accepts(b"d"));
}

#[test]
fn difference_removes_the_overlap() {
    let a = span(b'a', b'd');
    let b = span(b'b', b'c');
    let p = product(&a, &b, |x, y| x && !y, |_, _| {});
    assert!(p.accepts(b"a"));
    assert!(!p.accepts(b"b"));
    assert!(!p.accepts(b"c"));
    assert!(p.accepts(b"d"));
}

#[test]
fn dead_b_side_counts_as_nonfinal() {
    // a accepts "ab"; b accepts "a". Difference keeps "ab" because b has
    // nowhere to go on the second byte.
    let mut a = Fsa {
        start: 0,
        finals: vec![2],
        adj: vec![Vec::new(); 3],
    };
    a.insert_edge(0, 97, 98, 1);
    a.insert_edge(1, 98, 99, 2);
    let b = span(b'a', b'a');

    let p = product(&a, &b, |x, y| x && !y, |_, _| {});
    assert!(p.accepts(b"ab"));
    assert!(!p.accepts(b"a"));
}

#[test]
fn relate_reports_underlying_pairs() {
    let a = span(b'a', b'a');
    let b = span(b'a', b'a');
    let mut pairs = Vec::new();
    let p = product(&a, &b, |x, y| x && y, |ua, ub| pairs.push((ua, ub)));
    assert_eq!(pairs.len(), p.n());
    assert_eq!(pairs[0], (0, Some(0)));
    assert_eq!(pairs[1], (1, Some(1)));
}

#[test]
fn ranges_split_at_b_boundaries() {
    // a moves on [a, e]; b only on [b, c]. The product must keep the parts
    // of the range where b is dead.
    let a = span(b'a', b'e');
    let b = span(b'b', b'c');
    let p = product(&a, &b, |x, y| x && !y, |_, _| {});
    assert!(p.accepts(b"a"));
    assert!(!p.accepts(b"c"));
    assert!(p.accepts(b"d"));
    assert!(p.accepts(b"e"));
}
