//! Unit tests for the automaton representation and its basic queries.

use crate::fsa::{insert_sorted, Edge, Fsa};
use crate::{AB, EPSILON};

fn chain(bytes: &[u8]) -> Fsa {
    let mut fsa = Fsa {
        start: 0,
        finals: vec![bytes.len()],
        adj: vec![Vec::new(); bytes.len() + 1],
    };
    for (i, &b) in bytes.iter().enumerate() {
        fsa.insert_edge(i, b as u32, b as u32 + 1, i + 1);
    }
    fsa
}

#[test]
fn insert_sorted_orders_and_dedups() {
    let mut row = Vec::new();
    insert_sorted(&mut row, Edge::new(98, 99, 1));
    insert_sorted(&mut row, Edge::new(97, 98, 0));
    insert_sorted(&mut row, Edge::new(98, 99, 1));
    insert_sorted(&mut row, Edge::new(98, 99, 0));
    assert_eq!(
        row,
        vec![
            Edge::new(97, 98, 0),
            Edge::new(98, 99, 0),
            Edge::new(98, 99, 1),
        ]
    );
}

#[test]
fn epsilon_edge_is_recognized() {
    assert!(Edge::epsilon(3).is_epsilon());
    assert!(!Edge::new(97, 98, 0).is_epsilon());
    // A collapse marker above epsilon is not an epsilon edge.
    assert!(!Edge::new(AB + 1, AB + 2, 0).is_epsilon());
}

#[test]
fn has_special_sees_collapse_markers_only() {
    let mut fsa = Fsa {
        start: 0,
        finals: vec![1],
        adj: vec![Vec::new(); 2],
    };
    fsa.insert_edge(0, 97, 98, 1);
    assert!(!fsa.has_special(0));
    fsa.adj[0].push(Edge::epsilon(1));
    assert!(!fsa.has_special(0));
    fsa.insert_edge(0, AB + 2, AB + 3, 1);
    assert!(fsa.has_special(0));
}

#[test]
fn accepts_follows_epsilon_edges() {
    // 0 --eps--> 1 --a--> 2
    let mut fsa = Fsa {
        start: 0,
        finals: vec![2],
        adj: vec![Vec::new(); 3],
    };
    fsa.adj[0].push(Edge::epsilon(1));
    fsa.insert_edge(1, 97, 98, 2);
    assert!(fsa.accepts(b"a"));
    assert!(!fsa.accepts(b""));
    assert!(!fsa.accepts(b"aa"));
}

#[test]
fn accepts_chain() {
    let fsa = chain(b"ab");
    assert!(fsa.accepts(b"ab"));
    assert!(!fsa.accepts(b"a"));
    assert!(!fsa.accepts(b"abc"));
}

#[test]
fn totalize_completes_every_state() {
    let mut fsa = chain(b"a");
    let sink = fsa.totalize();
    assert_eq!(sink, 2);
    for s in 0..fsa.n() {
        let mut at = 0;
        for e in fsa.adj[s].iter().filter(|e| e.lo < AB) {
            assert_eq!(e.lo, at, "gap before {e:?} in state {s}");
            at = e.hi;
        }
        assert_eq!(at, AB, "state {s} not total");
    }
    // The original language is unchanged.
    assert!(fsa.accepts(b"a"));
    assert!(!fsa.accepts(b"b"));
    fsa.check();
}

#[test]
fn check_passes_on_well_formed_machines() {
    let mut fsa = chain(b"ab");
    fsa.adj[0].push(Edge::new(EPSILON, EPSILON + 1, 2));
    fsa.check();
}
