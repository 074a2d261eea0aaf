//! Export-time expansion of collapse references.
//!
//! Each collapse site's reserved-symbol edge is rewritten into epsilon
//! links: one from the site into the referenced machine's start, and one
//! from each of its finals back to the site's completion state. The
//! reserved symbol identifies the collapse expression, so enter and return
//! links of one site always wire up the same inlined copy.
//!
//! Allocation is memoized along the active expansion path: a statement
//! referenced by its own (possibly indirect) expansion links back to the
//! copy already being laid out, turning recursion into an epsilon cycle,
//! while sibling references each get their own copy so concatenated
//! references keep their exact language.

use indexmap::IndexMap;
use log::debug;

use yanshi_fsa::{insert_sorted, Edge, State, AB, EPSILON};

use crate::anno::{collapse_expr_of, Assoc};
use crate::ast::{ExprKind, StmtId};
use crate::Result;

use super::compiler::compile;
use super::context::CompileCtx;

/// Expand every collapse reference in `stmt`'s cached machine, then apply
/// the optional substring-grammar transform, determinize, minimize, and
/// prune. The cache entry is replaced in place.
pub fn compile_export(ctx: &mut CompileCtx, stmt: StmtId) -> Result<()> {
    compile(ctx, stmt)?;
    let module = ctx.module;
    let def = module.define(stmt).expect("compile checked this");
    debug!("exporting {}", def.lhs);

    let mut exp = Expander::default();
    exp.allocate(ctx, stmt)?;
    debug!("expanded to {} states", exp.adj.len());

    let anno = ctx.compiled.get_mut(&stmt).expect("compiled above");
    // The exported statement was allocated first, so its start and finals
    // keep their ids.
    anno.fsa.adj = exp.adj;
    anno.assoc = exp.assoc;
    anno.deterministic = false;

    if ctx.options.substring_grammar && !def.intact {
        anno.substring_grammar();
        debug!("substring grammar: {} states", anno.fsa.n());
    }
    anno.determinize();
    debug!("determinized: {} states", anno.fsa.n());
    anno.minimize();
    debug!("minimized: {} states", anno.fsa.n());
    anno.accessible();
    anno.co_accessible();
    debug!("trimmed: {} states", anno.fsa.n());
    Ok(())
}

/// Whether a row still carries a collapse-site edge. Rows are sorted and
/// epsilon sits just above the byte range, so only the last edge can reach
/// past it.
fn has_collapse(row: &[Edge]) -> bool {
    row.last().is_some_and(|e| e.hi > EPSILON + 1)
}

/// Composite machine under construction.
#[derive(Default)]
struct Expander {
    adj: Vec<Vec<Edge>>,
    assoc: Vec<Assoc>,
    /// Offsets of the statements on the active expansion path.
    active: IndexMap<StmtId, usize>,
}

impl Expander {
    /// Inline `stmt`'s machine at a fresh offset and rewire its collapse
    /// sites, returning the offset.
    fn allocate(&mut self, ctx: &mut CompileCtx, stmt: StmtId) -> Result<usize> {
        if let Some(&off) = self.active.get(&stmt) {
            return Ok(off);
        }
        compile(ctx, stmt)?;
        let n = ctx.compiled[&stmt].fsa.n();
        let off = self.adj.len();
        self.active.insert(stmt, off);
        debug!(
            "allocate {} at {}",
            ctx.module.define(stmt).expect("definition").lhs,
            off
        );

        {
            let anno = &ctx.compiled[&stmt];
            for row in &anno.fsa.adj {
                self.adj.push(
                    row.iter()
                        .map(|e| Edge::new(e.lo, e.hi, e.to + off))
                        .collect(),
                );
            }
            self.assoc.extend(anno.assoc.iter().cloned());
        }

        for i in off..off + n {
            if !has_collapse(&self.adj[i]) {
                continue;
            }
            // Strip the reserved-symbol portions, splitting any range that
            // crosses AB so only real bytes survive. Epsilon links wired by
            // earlier sites stay put.
            let mut sites: Vec<(u32, u32, State)> = Vec::new();
            let mut kept: Vec<Edge> = Vec::new();
            for e in &self.adj[i] {
                if e.hi <= EPSILON + 1 {
                    kept.push(*e);
                    continue;
                }
                sites.push((e.lo.max(EPSILON + 1), e.hi, e.to));
                if e.lo < AB {
                    kept.push(Edge::new(e.lo, AB, e.to));
                } else if e.is_epsilon() {
                    kept.push(Edge::new(e.lo, EPSILON + 1, e.to));
                }
            }
            self.adj[i] = kept;

            // Each reserved symbol names one collapse expression; wire the
            // entering and returning epsilons of that site.
            for (lo, hi, completion) in sites {
                for sym in lo..hi {
                    let cexpr = collapse_expr_of(sym);
                    if cexpr.index() >= ctx.module.exprs.len() {
                        continue;
                    }
                    let ExprKind::Collapse(target) = &ctx.module.exprs[cexpr].kind else {
                        continue;
                    };
                    let target = *target;
                    let toff = self.allocate(ctx, target)?;
                    let callee = &ctx.compiled[&target].fsa;
                    insert_sorted(&mut self.adj[i], Edge::epsilon(toff + callee.start));
                    let finals = callee.finals.clone();
                    for f in finals {
                        insert_sorted(&mut self.adj[toff + f], Edge::epsilon(completion));
                    }
                }
            }
        }

        self.active.swap_remove(&stmt);
        Ok(off)
    }
}
