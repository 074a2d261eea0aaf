//! Per-transition action programs from annotation bags.
//!
//! A state's bag names the expressions whose machines produced it; walking
//! the expression-tree ancestors fills in the full covering set. Sorting the
//! bag in pre-order and stopping each ancestor walk at the LCA with the
//! previous entry visits every covering expression exactly once; entries for
//! the same expression merge their role tags.
//!
//! A covering entry whose only role is `START` marks a state standing at an
//! expression's entry, before any of its input has been consumed; such
//! entries do not count as being inside the expression yet. A transition
//! that stays inside an expression while stepping from one of its finals
//! back onto its start wraps around: it leaves and re-enters in one step.

use log::warn;

use yanshi_fsa::State;

use indexmap::IndexMap;

use crate::anno::{Assoc, ExprTag, FsaAnno};
use crate::ast::{Action, ExprId, Module};

use super::context::CompileCtx;
use super::lca::find_lca;

/// Compute the covering set of every state of `anno`.
pub(crate) fn compute_withins(ctx: &CompileCtx, anno: &FsaAnno) -> Vec<Assoc> {
    anno.assoc
        .iter()
        .map(|bag| find_within(ctx, bag))
        .collect()
}

fn find_within(ctx: &CompileCtx, bag: &Assoc) -> Assoc {
    let mut entries = bag.clone();
    entries.sort_unstable_by_key(|&(e, tag)| (ctx.nums(e).pre, tag.bits(), e));

    let mut within: IndexMap<ExprId, ExprTag> = IndexMap::new();
    let mut last: Option<ExprId> = None;
    for &(e, tag) in &entries {
        let stop = last.and_then(|l| find_lca(&ctx.nums, l, e));
        last = Some(e);
        *within.entry(e).or_insert(ExprTag::empty()) |= tag;
        if stop == Some(e) {
            // Same expression as the previous entry; its ancestors are
            // already present.
            continue;
        }
        let mut x = ctx.nums(e).parent();
        while let Some(cur) = x {
            if Some(cur) == stop {
                break;
            }
            *within.entry(cur).or_insert(ExprTag::empty()) |= tag;
            x = ctx.nums(cur).parent();
        }
    }

    let mut out: Assoc = within.into_iter().collect();
    out.sort_unstable_by_key(|&(e, _)| e);
    out
}

/// Whether a covering tag means the state is actually inside the
/// expression, rather than merely standing at its entry.
pub(crate) fn covers(tag: ExprTag) -> bool {
    tag.intersects(ExprTag::INNER | ExprTag::FINAL)
}

/// Whether the step from a `u`-side role to a `v`-side role wraps around
/// the expression: off one of its finals and back onto its start.
fn wraps(tu: ExprTag, tv: ExprTag) -> bool {
    tu.contains(ExprTag::FINAL) && tv.contains(ExprTag::START)
}

fn lookup(w: &Assoc, e: ExprId) -> Option<ExprTag> {
    w.binary_search_by_key(&e, |p| p.0)
        .ok()
        .map(|i| w[i].1)
        .filter(|&t| covers(t))
}

/// The expressions of one transition, bucketed by how the step relates to
/// them. A wrap-around step lists its expression under both `leaving` and
/// `entering`.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Classified {
    pub leaving: Vec<ExprId>,
    pub entering: Vec<ExprId>,
    pub transiting: Vec<ExprId>,
    pub finishing: Vec<ExprId>,
}

/// Classify the transition `u -> v` against the covering sets.
pub(crate) fn classify(withins: &[Assoc], u: State, v: State) -> Classified {
    let (wu, wv) = (&withins[u], &withins[v]);
    let mut out = Classified::default();
    for &(e, tu) in wu {
        if !covers(tu) {
            continue;
        }
        match lookup(wv, e) {
            None => out.leaving.push(e),
            Some(tv) if wraps(tu, tv) => out.leaving.push(e),
            Some(_) => {}
        }
    }
    for &(e, tv) in wv {
        if !covers(tv) {
            continue;
        }
        match lookup(wu, e) {
            None => out.entering.push(e),
            Some(tu) if wraps(tu, tv) => out.entering.push(e),
            Some(_) => out.transiting.push(e),
        }
        if tv.contains(ExprTag::FINAL) {
            out.finishing.push(e);
        }
    }
    out
}

fn push_code(body: &mut String, module: &Module, actions: &[Action]) {
    for a in actions {
        let code = match a {
            Action::Inline(code) => code.as_str(),
            Action::Ref(name) => match module.actions.get(name) {
                Some(code) => code.as_str(),
                None => {
                    warn!("undefined action `{name}` treated as empty");
                    ""
                }
            },
        };
        body.push('{');
        body.push_str(code);
        body.push_str("}\n");
    }
}

/// The action program of the transition `u -> v`: leaving actions of the
/// expressions the step exits, then entering actions of those it enters,
/// then transiting and finishing actions.
pub(crate) fn transition_body(
    module: &Module,
    withins: &[Assoc],
    u: State,
    v: State,
) -> String {
    let classes = classify(withins, u, v);
    let mut body = String::new();
    for &e in &classes.leaving {
        push_code(&mut body, module, &module.exprs[e].leaving);
    }
    for &e in &classes.entering {
        push_code(&mut body, module, &module.exprs[e].entering);
    }
    for &e in &classes.transiting {
        push_code(&mut body, module, &module.exprs[e].transiting);
    }
    for &e in &classes.finishing {
        push_code(&mut body, module, &module.exprs[e].finishing);
    }
    body
}
