//! Shared test helpers: terse expression and module builders.

use crate::ast::{
    Action, DefineStmt, ExprId, ExprKind, Module, Span, Stmt, StmtId,
};

pub fn module(name: &str) -> Module {
    Module {
        filename: name.to_string(),
        ..Module::default()
    }
}

pub fn lit(m: &mut Module, s: &str) -> ExprId {
    m.exprs
        .alloc(ExprKind::Literal(s.as_bytes().to_vec()), Span::default())
}

/// Character class over inclusive byte ranges, `[a-z]` style.
pub fn bracket(m: &mut Module, ranges: &[(u8, u8)]) -> ExprId {
    let ranges = ranges
        .iter()
        .map(|&(lo, hi)| (lo as u32, hi as u32 + 1))
        .collect();
    m.exprs.alloc(ExprKind::Bracket(ranges), Span::default())
}

pub fn dot(m: &mut Module) -> ExprId {
    m.exprs.alloc(ExprKind::Dot, Span::default())
}

pub fn eps(m: &mut Module) -> ExprId {
    m.exprs.alloc(ExprKind::Epsilon, Span::default())
}

pub fn collapse(m: &mut Module, target: StmtId) -> ExprId {
    m.exprs.alloc(ExprKind::Collapse(target), Span::default())
}

pub fn star(m: &mut Module, inner: ExprId) -> ExprId {
    m.exprs.alloc(ExprKind::Star(inner), Span::default())
}

pub fn plus(m: &mut Module, inner: ExprId) -> ExprId {
    m.exprs.alloc(ExprKind::Plus(inner), Span::default())
}

pub fn question(m: &mut Module, inner: ExprId) -> ExprId {
    m.exprs.alloc(ExprKind::Question(inner), Span::default())
}

pub fn repeat(m: &mut Module, inner: ExprId, lo: u32, hi: u32) -> ExprId {
    m.exprs
        .alloc(ExprKind::Repeat(inner, lo, hi), Span::default())
}

pub fn complement(m: &mut Module, inner: ExprId) -> ExprId {
    m.exprs.alloc(ExprKind::Complement(inner), Span::default())
}

pub fn concat(m: &mut Module, lhs: ExprId, rhs: ExprId) -> ExprId {
    m.exprs.alloc(ExprKind::Concat(lhs, rhs), Span::default())
}

pub fn union(m: &mut Module, lhs: ExprId, rhs: ExprId) -> ExprId {
    m.exprs.alloc(ExprKind::Union(lhs, rhs), Span::default())
}

pub fn intersect(m: &mut Module, lhs: ExprId, rhs: ExprId) -> ExprId {
    m.exprs.alloc(ExprKind::Intersect(lhs, rhs), Span::default())
}

pub fn difference(m: &mut Module, lhs: ExprId, rhs: ExprId) -> ExprId {
    m.exprs.alloc(ExprKind::Difference(lhs, rhs), Span::default())
}

pub fn entering(m: &mut Module, e: ExprId, code: &str) -> ExprId {
    m.exprs[e].entering.push(Action::Inline(code.to_string()));
    e
}

pub fn leaving(m: &mut Module, e: ExprId, code: &str) -> ExprId {
    m.exprs[e].leaving.push(Action::Inline(code.to_string()));
    e
}

pub fn define(m: &mut Module, lhs: &str, rhs: ExprId) -> StmtId {
    let id = StmtId(m.stmts.len() as u32);
    m.stmts.push(Stmt::Define(DefineStmt {
        lhs: lhs.to_string(),
        rhs,
        export: false,
        intact: false,
    }));
    id
}

pub fn export(m: &mut Module, lhs: &str, rhs: ExprId) -> StmtId {
    let id = define(m, lhs, rhs);
    let Some(Stmt::Define(d)) = m.stmts.get_mut(id.index()) else {
        unreachable!()
    };
    d.export = true;
    id
}

/// All strings over `alphabet` of length at most `max_len`, for comparing a
/// compiled machine against a membership oracle.
pub fn strings_upto(alphabet: &[u8], max_len: usize) -> Vec<Vec<u8>> {
    let mut all: Vec<Vec<u8>> = vec![Vec::new()];
    let mut frontier: Vec<Vec<u8>> = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for s in &frontier {
            for &b in alphabet {
                let mut t = s.clone();
                t.push(b);
                next.push(t);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}
