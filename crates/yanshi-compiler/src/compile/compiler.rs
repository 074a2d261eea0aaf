//! Post-order compilation of one definition into an annotated machine.

use log::{debug, trace};

use crate::anno::FsaAnno;
use crate::ast::{ExprId, ExprKind, StmtId};
use crate::{CompileError, Result};

use super::context::{CompileCtx, NodeNums};

/// Compile `stmt`'s expression tree into a determinized, minimized machine
/// and cache it. Subsequent calls for the same statement short-circuit.
pub fn compile(ctx: &mut CompileCtx, stmt: StmtId) -> Result<()> {
    if ctx.compiled.contains_key(&stmt) {
        return Ok(());
    }
    let module = ctx.module;
    let def = module
        .define(stmt)
        .ok_or(CompileError::NotADefinition(stmt.index()))?;

    let mut walker = Walker {
        ctx: &mut *ctx,
        st: Vec::new(),
        path: Vec::new(),
    };
    walker.visit(def.rhs)?;
    let mut anno = walker.st.pop().expect("visit leaves exactly one machine");
    debug_assert!(walker.st.is_empty());

    anno.determinize();
    anno.minimize();
    debug!(
        "size({}::{}) = {}",
        module.filename,
        def.lhs,
        anno.fsa.n()
    );
    ctx.compiled.insert(stmt, anno);
    Ok(())
}

/// Depth-first walker: assigns Euler-tour numbers and binary-lifted
/// ancestors on the way down, builds machines on a value stack on the way
/// up. Binary combinators visit their right operand first, stash its
/// machine, then combine after the left operand.
struct Walker<'a, 'm> {
    ctx: &'a mut CompileCtx<'m>,
    st: Vec<FsaAnno>,
    path: Vec<ExprId>,
}

impl Walker<'_, '_> {
    fn visit(&mut self, e: ExprId) -> Result<()> {
        self.pre_expr(e);
        let module = self.ctx.module;
        match &module.exprs[e].kind {
            ExprKind::Bracket(ranges) => self.st.push(FsaAnno::bracket(ranges, e)),
            ExprKind::Literal(bytes) => self.st.push(FsaAnno::literal(bytes, e)),
            ExprKind::Dot => self.st.push(FsaAnno::dot(e)),
            ExprKind::Epsilon => self.st.push(FsaAnno::epsilon(e)),
            ExprKind::Embed(fsa) => self.st.push(FsaAnno::embed(fsa, e)),
            ExprKind::Collapse(target) => {
                if module.define(*target).is_none() {
                    return Err(CompileError::DanglingCollapse(target.index()));
                }
                self.st.push(FsaAnno::collapse(e));
            }
            ExprKind::Star(inner) => {
                self.visit(*inner)?;
                self.top().star(e);
            }
            ExprKind::Plus(inner) => {
                self.visit(*inner)?;
                self.top().plus(e);
            }
            ExprKind::Question(inner) => {
                self.visit(*inner)?;
                self.top().question(e);
            }
            ExprKind::Repeat(inner, m, n) => {
                let (m, n) = (*m, *n);
                self.visit(*inner)?;
                self.top().repeat(m, n, e);
            }
            ExprKind::Complement(inner) => {
                self.visit(*inner)?;
                self.top().complement(e);
            }
            ExprKind::Concat(lhs, rhs) => {
                self.visit(*rhs)?;
                let rhs = self.st.pop().expect("rhs machine");
                self.visit(*lhs)?;
                self.top().concat(rhs, e);
            }
            ExprKind::Union(lhs, rhs) => {
                self.visit(*rhs)?;
                let rhs = self.st.pop().expect("rhs machine");
                self.visit(*lhs)?;
                self.top().union_(rhs, e);
            }
            ExprKind::Intersect(lhs, rhs) => {
                self.visit(*rhs)?;
                let rhs = self.st.pop().expect("rhs machine");
                self.visit(*lhs)?;
                self.top().intersect(rhs, e);
            }
            ExprKind::Difference(lhs, rhs) => {
                self.visit(*rhs)?;
                let rhs = self.st.pop().expect("rhs machine");
                self.visit(*lhs)?;
                self.top().difference(rhs, e);
            }
        }
        self.post_expr(e);
        Ok(())
    }

    fn top(&mut self) -> &mut FsaAnno {
        self.st.last_mut().expect("value stack is non-empty here")
    }

    fn pre_expr(&mut self, e: ExprId) {
        let expr = &self.ctx.module.exprs[e];
        trace!("{}({}-{})", expr.kind.name(), expr.loc.start, expr.loc.end);
        let depth = self.path.len() as u32;
        let pre = self.ctx.tick;
        self.ctx.tick += 1;
        let anc = match self.path.last() {
            Some(&parent) => {
                let mut anc = vec![Some(parent)];
                let mut k = 1;
                while 1u32 << k <= depth {
                    let up = anc[k - 1]
                        .and_then(|p| self.ctx.nums[p.index()].anc.get(k - 1).copied().flatten());
                    anc.push(up);
                    k += 1;
                }
                anc
            }
            None => vec![None],
        };
        self.ctx.nums[e.index()] = NodeNums {
            pre,
            post: 0,
            depth,
            anc,
        };
        self.path.push(e);
    }

    fn post_expr(&mut self, e: ExprId) {
        self.path.pop();
        self.ctx.nums[e.index()].post = self.ctx.tick;
        #[cfg(debug_assertions)]
        if let Some(top) = self.st.last() {
            top.fsa.check();
        }
    }
}
