//! Annotated finite-state automata.
//!
//! An `FsaAnno` is a machine whose states each carry a bag of
//! `(expression, role)` pairs recording which sub-expressions the state lives
//! inside. Every combinator builds its machine, then appends its own
//! expression to every state's bag with the state's role in the sub-machine.
//! The bags ride along through determinization (union), minimization (merged
//! states are forced to have equal bags), and pruning.

use bitflags::bitflags;

use yanshi_fsa::{product, Edge, Fsa, State, AB, EPSILON};

use crate::ast::ExprId;

bitflags! {
    /// A state's role within one sub-expression's machine. `INNER` is set
    /// exactly when the state is neither the start nor a final.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ExprTag: u8 {
        const FINAL = 1;
        const INNER = 2;
        const START = 4;
    }
}

/// One state's annotation bag: sorted, with at most one entry per
/// `(expression, tag)` pair.
pub type Assoc = Vec<(ExprId, ExprTag)>;

/// The reserved symbol owned by collapse expression `e`. Distinct collapse
/// sites never share a symbol, and none of them equals `EPSILON`.
pub fn collapse_symbol(e: ExprId) -> u32 {
    AB + 1 + e.0
}

/// The collapse expression owning the reserved symbol `sym`.
pub fn collapse_expr_of(sym: u32) -> ExprId {
    debug_assert!(sym > EPSILON);
    ExprId(sym - AB - 1)
}

/// Merge two sorted bags, dropping exact duplicates.
pub fn merge_bags(a: &Assoc, b: &Assoc) -> Assoc {
    let mut out = Assoc::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = if j == b.len() || (i < a.len() && a[i] <= b[j]) {
            if i < a.len() && j < b.len() && a[i] == b[j] {
                j += 1;
            }
            let x = a[i];
            i += 1;
            x
        } else {
            let x = b[j];
            j += 1;
            x
        };
        out.push(next);
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct FsaAnno {
    pub fsa: Fsa,
    pub assoc: Vec<Assoc>,
    pub deterministic: bool,
}

impl FsaAnno {
    fn with_states(n: usize, finals: Vec<State>, deterministic: bool) -> Self {
        FsaAnno {
            fsa: Fsa {
                start: 0,
                finals,
                adj: vec![Vec::new(); n],
            },
            assoc: vec![Assoc::new(); n],
            deterministic,
        }
    }

    /// Chain of `bytes.len() + 1` states, one edge per byte.
    pub fn literal(bytes: &[u8], e: ExprId) -> Self {
        let mut anno = Self::with_states(bytes.len() + 1, vec![bytes.len()], true);
        for (i, &b) in bytes.iter().enumerate() {
            anno.fsa.insert_edge(i, b as u32, b as u32 + 1, i + 1);
        }
        anno.add_assoc(e);
        anno
    }

    /// Two states with one edge per range of the class. Overlapping or
    /// touching ranges are normalized first.
    pub fn bracket(ranges: &[(u32, u32)], e: ExprId) -> Self {
        let mut sorted: Vec<(u32, u32)> = ranges.to_vec();
        sorted.sort_unstable();
        let mut anno = Self::with_states(2, vec![1], true);
        let mut it = sorted.into_iter().filter(|&(lo, hi)| lo < hi);
        if let Some((mut lo, mut hi)) = it.next() {
            for (l, h) in it {
                if l <= hi {
                    hi = hi.max(h);
                } else {
                    anno.fsa.insert_edge(0, lo, hi, 1);
                    (lo, hi) = (l, h);
                }
            }
            anno.fsa.insert_edge(0, lo, hi, 1);
        }
        anno.add_assoc(e);
        anno
    }

    /// Two states joined by the full byte alphabet.
    pub fn dot(e: ExprId) -> Self {
        let mut anno = Self::with_states(2, vec![1], true);
        anno.fsa.insert_edge(0, 0, AB, 1);
        anno.add_assoc(e);
        anno
    }

    /// A single state that is both start and final.
    pub fn epsilon(e: ExprId) -> Self {
        let mut anno = Self::with_states(1, vec![0], true);
        anno.add_assoc(e);
        anno
    }

    /// Copy of an externally supplied machine.
    pub fn embed(fsa: &Fsa, e: ExprId) -> Self {
        let mut anno = FsaAnno {
            fsa: fsa.clone(),
            assoc: vec![Assoc::new(); fsa.n()],
            deterministic: false,
        };
        anno.add_assoc(e);
        anno
    }

    /// Two states joined by the collapse site's reserved symbol; the edge is
    /// rewritten into epsilon links at export time.
    pub fn collapse(e: ExprId) -> Self {
        let sym = collapse_symbol(e);
        let mut anno = Self::with_states(2, vec![1], true);
        anno.fsa.insert_edge(0, sym, sym + 1, 1);
        anno.add_assoc(e);
        anno
    }

    /// Append `other`'s states after this machine's, leaving start and
    /// finals untouched. Returns the offset of the copy.
    fn append(&mut self, other: &FsaAnno) -> usize {
        let off = self.fsa.n();
        for row in &other.fsa.adj {
            self.fsa
                .adj
                .push(row.iter().map(|e| Edge::new(e.lo, e.hi, e.to + off)).collect());
        }
        self.assoc.extend(other.assoc.iter().cloned());
        off
    }

    /// Add a fresh state with no edges and an empty bag.
    fn push_state(&mut self) -> State {
        self.fsa.adj.push(Vec::new());
        self.assoc.push(Assoc::new());
        self.fsa.n() - 1
    }

    fn mark_start_final(&mut self) {
        let start = self.fsa.start;
        if let Err(i) = self.fsa.finals.binary_search(&start) {
            self.fsa.finals.insert(i, start);
        }
    }

    fn concat_raw(&mut self, rhs: &FsaAnno) {
        let off = self.append(rhs);
        for f in std::mem::take(&mut self.fsa.finals) {
            self.fsa.insert_edge(f, EPSILON, EPSILON + 1, rhs.fsa.start + off);
        }
        self.fsa.finals = rhs.fsa.finals.iter().map(|&f| f + off).collect();
        self.deterministic = false;
    }

    /// `self` followed by `rhs`.
    pub fn concat(&mut self, rhs: FsaAnno, e: ExprId) {
        self.concat_raw(&rhs);
        self.add_assoc(e);
    }

    /// `self` or `rhs`: a fresh start with epsilons to both operands.
    pub fn union_(&mut self, rhs: FsaAnno, e: ExprId) {
        let off = self.append(&rhs);
        let s = self.push_state();
        self.fsa.insert_edge(s, EPSILON, EPSILON + 1, self.fsa.start);
        self.fsa.insert_edge(s, EPSILON, EPSILON + 1, rhs.fsa.start + off);
        let mut finals = self.fsa.finals.clone();
        finals.extend(rhs.fsa.finals.iter().map(|&f| f + off));
        finals.sort_unstable();
        finals.dedup();
        self.fsa.finals = finals;
        self.fsa.start = s;
        self.deterministic = false;
        self.add_assoc(e);
    }

    /// Zero or more repetitions: a fresh accepting start plus loop-back
    /// epsilons from every final.
    pub fn star(&mut self, e: ExprId) {
        let old_start = self.fsa.start;
        for f in self.fsa.finals.clone() {
            self.fsa.insert_edge(f, EPSILON, EPSILON + 1, old_start);
        }
        let s = self.push_state();
        self.fsa.insert_edge(s, EPSILON, EPSILON + 1, old_start);
        self.fsa.start = s;
        self.mark_start_final();
        self.deterministic = false;
        self.add_assoc(e);
    }

    /// One or more repetitions: loop-back epsilons from every final.
    pub fn plus(&mut self, e: ExprId) {
        let start = self.fsa.start;
        for f in self.fsa.finals.clone() {
            self.fsa.insert_edge(f, EPSILON, EPSILON + 1, start);
        }
        self.deterministic = false;
        self.add_assoc(e);
    }

    /// Zero or one: the start becomes accepting.
    pub fn question(&mut self, e: ExprId) {
        self.mark_start_final();
        self.add_assoc(e);
    }

    /// `m` to `n` repetitions: `m` mandatory copies followed by an optional
    /// tail of `n - m` copies, each cut short by an accepting start.
    pub fn repeat(&mut self, m: u32, n: u32, e: ExprId) {
        debug_assert!(m <= n);
        let unit = self.clone();
        let mut tail = Self::with_states(1, vec![0], true);
        for _ in 0..n - m {
            let mut t = unit.clone();
            t.concat_raw(&tail);
            t.mark_start_final();
            tail = t;
        }
        let mut res = Self::with_states(1, vec![0], true);
        for _ in 0..m {
            res.concat_raw(&unit);
        }
        res.concat_raw(&tail);
        *self = res;
        self.deterministic = false;
        self.add_assoc(e);
    }

    /// Product with `rhs` keeping states final when both sides are.
    pub fn intersect(&mut self, mut rhs: FsaAnno, e: ExprId) {
        self.product_with(&mut rhs, |x, y| x && y, e);
    }

    /// Product with `rhs` keeping states final when only the left side is.
    pub fn difference(&mut self, mut rhs: FsaAnno, e: ExprId) {
        self.product_with(&mut rhs, |x, y| x && !y, e);
    }

    fn product_with(&mut self, rhs: &mut FsaAnno, accept: fn(bool, bool) -> bool, e: ExprId) {
        self.determinize_if();
        rhs.determinize_if();
        let mut assoc = Vec::new();
        let fsa = product(&self.fsa, &rhs.fsa, accept, |ua, ub| {
            let bag = match ub {
                Some(ub) => merge_bags(&self.assoc[ua], &rhs.assoc[ub]),
                None => self.assoc[ua].clone(),
            };
            assoc.push(bag);
        });
        self.fsa = fsa;
        self.assoc = assoc;
        self.deterministic = true;
        self.add_assoc(e);
    }

    /// Determinize, complete over the byte alphabet, and flip the finals.
    pub fn complement(&mut self, e: ExprId) {
        self.determinize_if();
        self.fsa.totalize();
        self.assoc.push(Assoc::new());
        self.fsa.finals = (0..self.fsa.n())
            .filter(|&s| !self.fsa.is_final(s))
            .collect();
        self.add_assoc(e);
    }

    /// Make every state both initial and accepting, so the machine accepts
    /// every substring of its former language.
    pub fn substring_grammar(&mut self) {
        let n = self.fsa.n();
        let s = self.push_state();
        for t in 0..n {
            self.fsa.insert_edge(s, EPSILON, EPSILON + 1, t);
        }
        self.fsa.start = s;
        self.fsa.finals = (0..=n).collect();
        self.deterministic = false;
    }

    fn determinize_if(&mut self) {
        if !self.deterministic {
            self.determinize();
        }
    }

    /// Subset construction; each subset state's bag is the union of its
    /// constituents' bags.
    pub fn determinize(&mut self) {
        let mut assoc: Vec<Assoc> = Vec::new();
        let fsa = self.fsa.determinize(|subset| {
            let mut bag = Assoc::new();
            for &s in subset {
                bag = merge_bags(&bag, &self.assoc[s]);
            }
            assoc.push(bag);
        });
        self.fsa = fsa;
        self.assoc = assoc;
        self.deterministic = true;
    }

    /// Hopcroft minimization. The initial partition separates finals from
    /// non-finals and states with differing bags, so merged states always
    /// share their annotations.
    pub fn minimize(&mut self) {
        debug_assert!(self.deterministic, "minimize requires a deterministic machine");
        let classes = {
            let mut key2class: indexmap::IndexMap<(bool, &Assoc), usize> = indexmap::IndexMap::new();
            let mut classes = Vec::with_capacity(self.fsa.n());
            for s in 0..self.fsa.n() {
                let next = key2class.len();
                let c = *key2class
                    .entry((self.fsa.is_final(s), &self.assoc[s]))
                    .or_insert(next);
                classes.push(c);
            }
            classes
        };
        let mut assoc: Vec<Assoc> = Vec::new();
        let fsa = self.fsa.minimize(&classes, |members| {
            assoc.push(self.assoc[members[0]].clone());
        });
        self.fsa = fsa;
        self.assoc = assoc;
    }

    /// Keep states reachable from the start, remapping bags.
    pub fn accessible(&mut self) {
        let kept = self.fsa.accessible();
        self.assoc = kept
            .iter()
            .map(|&s| std::mem::take(&mut self.assoc[s]))
            .collect();
    }

    /// Keep states that can reach a final, remapping bags.
    pub fn co_accessible(&mut self) {
        let kept = self.fsa.co_accessible();
        self.assoc = kept
            .iter()
            .map(|&s| std::mem::take(&mut self.assoc[s]))
            .collect();
    }

    /// Record `e` in every state's bag with the state's role in the machine
    /// just built.
    pub fn add_assoc(&mut self, e: ExprId) {
        for s in 0..self.fsa.n() {
            let mut tag = ExprTag::empty();
            if s == self.fsa.start {
                tag |= ExprTag::START;
            }
            if self.fsa.is_final(s) {
                tag |= ExprTag::FINAL;
            }
            if tag.is_empty() {
                tag = ExprTag::INNER;
            }
            let entry = (e, tag);
            if let Err(i) = self.assoc[s].binary_search(&entry) {
                self.assoc[s].insert(i, entry);
            }
        }
    }
}
