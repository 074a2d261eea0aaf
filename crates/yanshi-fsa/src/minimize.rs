//! Hopcroft partition refinement over distinguishing ranges.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::fsa::{Edge, Fsa, State};

impl Fsa {
    /// Minimize a deterministic machine by partition refinement.
    ///
    /// `classes[s]` is the initial class of state `s`; ids must be dense
    /// starting at 0. Callers must already separate finals from non-finals
    /// in the initial partition (plus any further distinctions that have to
    /// survive merging — the compiler uses this for annotation bags). Two
    /// states end up merged only if they started in the same class and no
    /// distinguishing range tells them apart.
    ///
    /// The distinguishing ranges are the elementary intervals between every
    /// edge boundary across the whole machine. `relate` is invoked once per
    /// new state, in state-id order, with the sorted members of its class.
    pub fn minimize<F: FnMut(&[State])>(&self, classes: &[usize], mut relate: F) -> Fsa {
        let n = self.n();
        debug_assert_eq!(classes.len(), n);

        // Letters: elementary intervals between all edge boundaries.
        let mut bounds: Vec<u32> = self
            .adj
            .iter()
            .flatten()
            .flat_map(|e| [e.lo, e.hi])
            .collect();
        bounds.sort_unstable();
        bounds.dedup();
        let letters = bounds.len().saturating_sub(1);

        // Dense transition table: delta[s][t] for letter interval t.
        let mut delta: Vec<Vec<Option<State>>> = vec![vec![None; letters]; n];
        for (s, row) in self.adj.iter().enumerate() {
            for e in row {
                let a = bounds.partition_point(|&b| b < e.lo);
                let b = bounds.partition_point(|&b| b < e.hi);
                for t in a..b {
                    delta[s][t] = Some(e.to);
                }
            }
        }

        // Partition as member lists plus per-state class index.
        let mut class_of = classes.to_vec();
        let nclasses = class_of.iter().copied().max().map_or(0, |m| m + 1);
        let mut part: Vec<Vec<State>> = vec![Vec::new(); nclasses];
        for (s, &c) in class_of.iter().enumerate() {
            part[c].push(s);
        }

        let mut work: VecDeque<(usize, usize)> = VecDeque::new();
        let mut in_work: HashSet<(usize, usize)> = HashSet::new();
        for c in 0..part.len() {
            for t in 0..letters {
                work.push_back((c, t));
                in_work.insert((c, t));
            }
        }

        while let Some((a, t)) = work.pop_front() {
            in_work.remove(&(a, t));
            // States whose letter-t successor lies in class a, grouped by
            // their current class.
            let mut touched: IndexMap<usize, Vec<State>> = IndexMap::new();
            for u in 0..n {
                if let Some(v) = delta[u][t]
                    && class_of[v] == a
                {
                    touched.entry(class_of[u]).or_default().push(u);
                }
            }
            for (c, movers) in touched {
                if movers.len() == part[c].len() {
                    continue;
                }
                let newc = part.len();
                part[c].retain(|s| movers.binary_search(s).is_err());
                for &s in &movers {
                    class_of[s] = newc;
                }
                part.push(movers);
                for b in 0..letters {
                    if in_work.contains(&(c, b)) {
                        work.push_back((newc, b));
                        in_work.insert((newc, b));
                    } else {
                        let smaller = if part[c].len() <= part[newc].len() { c } else { newc };
                        work.push_back((smaller, b));
                        in_work.insert((smaller, b));
                    }
                }
            }
        }

        // Renumber classes by their first state, so equal inputs yield equal
        // outputs.
        let mut renum = vec![usize::MAX; part.len()];
        let mut order: Vec<usize> = Vec::new();
        for s in 0..n {
            let c = class_of[s];
            if renum[c] == usize::MAX {
                renum[c] = order.len();
                order.push(c);
            }
        }

        let mut adj: Vec<Vec<Edge>> = vec![Vec::new(); order.len()];
        for (newc, &c) in order.iter().enumerate() {
            relate(&part[c]);
            let rep = part[c][0];
            for e in &self.adj[rep] {
                let to = renum[class_of[e.to]];
                match adj[newc].last_mut() {
                    Some(last) if last.hi == e.lo && last.to == to => last.hi = e.hi,
                    _ => adj[newc].push(Edge::new(e.lo, e.hi, to)),
                }
            }
        }
        let mut finals: Vec<State> = self.finals.iter().map(|&f| renum[class_of[f]]).collect();
        finals.sort_unstable();
        finals.dedup();

        Fsa {
            start: renum[class_of[self.start]],
            finals,
            adj,
        }
    }
}
