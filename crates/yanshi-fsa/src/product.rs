//! Product construction for intersection and difference.

use indexmap::IndexMap;

use crate::fsa::{Edge, Fsa, State};

/// Product of two deterministic machines, following `a`'s transitions.
///
/// The `b` side may go dead when `a` moves on a symbol `b` has no edge for;
/// a dead `b` side counts as non-final. `accept(a_final, b_final)` decides
/// which product states are final — `|x, y| x && y` yields intersection,
/// `|x, y| x && !y` difference. `relate` is invoked once per new state, in
/// state-id order, with the underlying `(a, b)` pair.
pub fn product<A, R>(a: &Fsa, b: &Fsa, accept: A, mut relate: R) -> Fsa
where
    A: Fn(bool, bool) -> bool,
    R: FnMut(State, Option<State>),
{
    let mut memo: IndexMap<(State, Option<State>), State> = IndexMap::new();
    relate(a.start, Some(b.start));
    memo.insert((a.start, Some(b.start)), 0);

    let mut adj: Vec<Vec<Edge>> = vec![Vec::new()];
    let mut finals: Vec<State> = Vec::new();
    let mut u = 0;
    while u < memo.len() {
        let (ua, ub) = *memo.get_index(u).expect("pair ids are dense").0;
        let fa = a.is_final(ua);
        let fb = ub.is_some_and(|s| b.is_final(s));
        if accept(fa, fb) {
            finals.push(u);
        }

        let b_row: &[Edge] = ub.map_or(&[], |s| b.adj[s].as_slice());
        for ea in &a.adj[ua] {
            // Split a's range wherever b's edges cut it.
            let mut cuts = vec![ea.lo, ea.hi];
            for eb in b_row {
                for x in [eb.lo, eb.hi] {
                    if ea.lo < x && x < ea.hi {
                        cuts.push(x);
                    }
                }
            }
            cuts.sort_unstable();
            cuts.dedup();
            for w in cuts.windows(2) {
                let (lo, hi) = (w[0], w[1]);
                let vb = b_row
                    .iter()
                    .find(|e| e.lo <= lo && hi <= e.hi)
                    .map(|e| e.to);
                let key = (ea.to, vb);
                let v = match memo.get(&key) {
                    Some(&v) => v,
                    None => {
                        let v = memo.len();
                        relate(ea.to, vb);
                        memo.insert(key, v);
                        adj.push(Vec::new());
                        v
                    }
                };
                match adj[u].last_mut() {
                    Some(last) if last.hi == lo && last.to == v => last.hi = hi,
                    _ => adj[u].push(Edge::new(lo, hi, v)),
                }
            }
        }
        u += 1;
    }

    Fsa {
        start: 0,
        finals,
        adj,
    }
}
