//! Accessibility pruning: forward from the start, backward from the finals.

use crate::fsa::{Edge, Fsa, State};

impl Fsa {
    /// Drop states unreachable from `start` and renumber densely, preserving
    /// relative order. Returns the kept old ids in new-id order so callers
    /// can remap per-state payloads.
    pub fn accessible(&mut self) -> Vec<State> {
        let n = self.n();
        let mut seen = vec![false; n];
        let mut stack = vec![self.start];
        seen[self.start] = true;
        while let Some(s) = stack.pop() {
            for e in &self.adj[s] {
                if !seen[e.to] {
                    seen[e.to] = true;
                    stack.push(e.to);
                }
            }
        }
        self.compact(&seen)
    }

    /// Drop states from which no final is reachable. When the start itself
    /// cannot reach a final, the machine collapses to the canonical empty
    /// one: a lone start state with no edges and no finals.
    pub fn co_accessible(&mut self) -> Vec<State> {
        let n = self.n();
        let mut preds: Vec<Vec<State>> = vec![Vec::new(); n];
        for (s, row) in self.adj.iter().enumerate() {
            for e in row {
                preds[e.to].push(s);
            }
        }
        let mut seen = vec![false; n];
        let mut stack: Vec<State> = Vec::new();
        for &f in &self.finals {
            if !seen[f] {
                seen[f] = true;
                stack.push(f);
            }
        }
        while let Some(s) = stack.pop() {
            for &p in &preds[s] {
                if !seen[p] {
                    seen[p] = true;
                    stack.push(p);
                }
            }
        }
        if !seen[self.start] {
            let old_start = self.start;
            *self = Fsa {
                start: 0,
                finals: Vec::new(),
                adj: vec![Vec::new()],
            };
            return vec![old_start];
        }
        self.compact(&seen)
    }

    /// Keep exactly the marked states, renumbering densely in old-id order.
    /// Edges into dropped states are discarded.
    fn compact(&mut self, seen: &[bool]) -> Vec<State> {
        let n = self.n();
        let kept: Vec<State> = (0..n).filter(|&s| seen[s]).collect();
        let mut newid = vec![usize::MAX; n];
        for (i, &s) in kept.iter().enumerate() {
            newid[s] = i;
        }
        self.start = newid[self.start];
        self.finals = self
            .finals
            .iter()
            .filter(|&&f| seen[f])
            .map(|&f| newid[f])
            .collect();
        self.adj = kept
            .iter()
            .map(|&s| {
                self.adj[s]
                    .iter()
                    .filter(|e| seen[e.to])
                    .map(|e| Edge::new(e.lo, e.hi, newid[e.to]))
                    .collect()
            })
            .collect();
        kept
    }
}
