//! Subset construction over half-open symbol ranges.

use indexmap::IndexMap;

use crate::fsa::{Edge, Fsa, State};
use crate::EPSILON;

impl Fsa {
    /// Classical subset construction. Epsilon closure follows edges whose
    /// range contains `EPSILON`; every other symbol, including the reserved
    /// collapse markers above it, is treated as ordinary input.
    ///
    /// `relate` is invoked exactly once per new state, in state-id order,
    /// with the sorted subset of old states it stands for. The new state 0
    /// is always the closure of the old start.
    pub fn determinize<F: FnMut(&[State])>(&self, mut relate: F) -> Fsa {
        let mut memo: IndexMap<Vec<State>, State> = IndexMap::new();
        let start = self.epsilon_closure(vec![self.start]);
        relate(&start);
        memo.insert(start, 0);

        let mut adj: Vec<Vec<Edge>> = vec![Vec::new()];
        let mut finals: Vec<State> = Vec::new();
        let mut u = 0;
        while u < memo.len() {
            let subset = memo
                .get_index(u)
                .expect("subset ids are dense")
                .0
                .clone();
            if subset.iter().any(|&s| self.is_final(s)) {
                finals.push(u);
            }

            // Gather the subset's edges, cutting the epsilon symbol out of
            // any range that contains it.
            let mut edges: Vec<Edge> = Vec::new();
            for &s in &subset {
                for e in &self.adj[s] {
                    if !e.is_epsilon() {
                        edges.push(*e);
                    } else {
                        if e.lo < EPSILON {
                            edges.push(Edge::new(e.lo, EPSILON, e.to));
                        }
                        if e.hi > EPSILON + 1 {
                            edges.push(Edge::new(EPSILON + 1, e.hi, e.to));
                        }
                    }
                }
            }

            // Split at every boundary; each elementary interval maps to one
            // destination subset.
            let mut bounds: Vec<u32> = edges.iter().flat_map(|e| [e.lo, e.hi]).collect();
            bounds.sort_unstable();
            bounds.dedup();
            for w in bounds.windows(2) {
                let (lo, hi) = (w[0], w[1]);
                let mut dests: Vec<State> = edges
                    .iter()
                    .filter(|e| e.lo <= lo && hi <= e.hi)
                    .map(|e| e.to)
                    .collect();
                if dests.is_empty() {
                    continue;
                }
                dests.sort_unstable();
                dests.dedup();
                let dests = self.epsilon_closure(dests);
                let v = match memo.get(&dests) {
                    Some(&v) => v,
                    None => {
                        let v = memo.len();
                        relate(&dests);
                        memo.insert(dests, v);
                        adj.push(Vec::new());
                        v
                    }
                };
                // Contiguous intervals with the same destination coalesce.
                match adj[u].last_mut() {
                    Some(last) if last.hi == lo && last.to == v => last.hi = hi,
                    _ => adj[u].push(Edge::new(lo, hi, v)),
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
}
