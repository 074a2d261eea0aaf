//! Unit tests for action classification and synthesis.

use crate::anno::ExprTag;
use crate::ast::Action;
use crate::test_utils::*;
use crate::CompileOptions;

use super::actions::{classify, compute_withins, covers, transition_body};
use super::{compile_export, CompileCtx};

#[test]
fn s3_loop_fires_enter_then_leave_and_reenter() {
    // main = ("a" >enter %leave)+
    let mut m = module("s3.ys");
    let a = lit(&mut m, "a");
    entering(&mut m, a, "e();");
    leaving(&mut m, a, "l();");
    let p = plus(&mut m, a);
    let main = export(&mut m, "main", p);

    let mut ctx = CompileCtx::new(&m, CompileOptions::default());
    compile_export(&mut ctx, main).unwrap();
    let anno = ctx.compiled(main).unwrap();
    assert_eq!(anno.fsa.n(), 2);
    let start = anno.fsa.start;
    let fin = anno.fsa.adj[start][0].to;
    assert_ne!(start, fin);
    assert!(anno.fsa.is_final(fin));

    let withins = compute_withins(&ctx, anno);
    // First 'a': we enter the literal.
    let first = transition_body(ctx.module, &withins, start, fin);
    assert_eq!(first, "{e();}\n");
    // Each further 'a': leave the finished literal, then re-enter it.
    let again = transition_body(ctx.module, &withins, fin, fin);
    assert_eq!(again, "{l();}\n{e();}\n");
}

#[test]
fn sequential_literals_enter_and_leave_at_the_boundary() {
    // main = ("ab" >in_x %out_x) ("cd" >in_y)
    let mut m = module("seq.ys");
    let x = lit(&mut m, "ab");
    entering(&mut m, x, "in_x();");
    leaving(&mut m, x, "out_x();");
    let y = lit(&mut m, "cd");
    entering(&mut m, y, "in_y();");
    let both = concat(&mut m, x, y);
    let main = export(&mut m, "main", both);

    let mut ctx = CompileCtx::new(&m, CompileOptions::default());
    compile_export(&mut ctx, main).unwrap();
    let anno = ctx.compiled(main).unwrap();
    let withins = compute_withins(&ctx, anno);

    // Walk the DFA along "abcd".
    let step = |s: usize, c: u8| {
        anno.fsa.adj[s]
            .iter()
            .find(|e| e.lo <= c as u32 && (c as u32) < e.hi)
            .map(|e| e.to)
            .unwrap()
    };
    let s0 = anno.fsa.start;
    let s1 = step(s0, b'a');
    let s2 = step(s1, b'b');
    let s3 = step(s2, b'c');
    let s4 = step(s3, b'd');

    assert_eq!(transition_body(ctx.module, &withins, s0, s1), "{in_x();}\n");
    assert_eq!(transition_body(ctx.module, &withins, s1, s2), "");
    // Consuming 'c' exits x and enters y, in that order.
    assert_eq!(
        transition_body(ctx.module, &withins, s2, s3),
        "{out_x();}\n{in_y();}\n"
    );
    assert_eq!(transition_body(ctx.module, &withins, s3, s4), "");
    assert!(anno.fsa.is_final(s4));
}

#[test]
fn named_actions_resolve_through_the_module_table() {
    let mut m = module("ref.ys");
    let a = lit(&mut m, "a");
    m.exprs[a].entering.push(Action::Ref("on_a".into()));
    m.exprs[a].entering.push(Action::Ref("missing".into()));
    m.actions.insert("on_a".into(), "on_a_code();".into());
    let main = export(&mut m, "main", a);

    let mut ctx = CompileCtx::new(&m, CompileOptions::default());
    compile_export(&mut ctx, main).unwrap();
    let anno = ctx.compiled(main).unwrap();
    let withins = compute_withins(&ctx, anno);
    let body = transition_body(ctx.module, &withins, anno.fsa.start, 1);
    // The defined reference resolves; the missing one degrades to empty.
    assert_eq!(body, "{on_a_code();}\n{}\n");
}

#[test]
fn t7_classification_law() {
    // ("ab" | "a")* gives overlapping roles and a wrap-around loop.
    let mut m = module("t7.ys");
    let ab = lit(&mut m, "ab");
    let a = lit(&mut m, "a");
    let u = union(&mut m, ab, a);
    let s = star(&mut m, u);
    let main = export(&mut m, "main", s);

    let mut ctx = CompileCtx::new(&m, CompileOptions::default());
    compile_export(&mut ctx, main).unwrap();
    let anno = ctx.compiled(main).unwrap();
    let withins = compute_withins(&ctx, anno);

    for (uu, row) in anno.fsa.adj.iter().enumerate() {
        for e in row {
            let c = classify(&withins, uu, e.to);
            let cov = |w: &crate::anno::Assoc| {
                w.iter()
                    .filter(|&&(_, t)| covers(t))
                    .map(|&(x, _)| x)
                    .collect::<Vec<_>>()
            };
            let wu = cov(&withins[uu]);
            let wv = cov(&withins[e.to]);

            // leaving ∪ transiting covers exactly within(u).
            let mut lt = c.leaving.clone();
            lt.extend(c.transiting.iter().copied());
            lt.sort_unstable();
            lt.dedup();
            assert_eq!(lt, wu, "u={uu} v={}", e.to);

            // entering ∪ transiting covers exactly within(v).
            let mut et = c.entering.clone();
            et.extend(c.transiting.iter().copied());
            et.sort_unstable();
            et.dedup();
            assert_eq!(et, wv, "u={uu} v={}", e.to);

            // leaving ∩ entering holds only wrap-around expressions: at u
            // the expression is at a final, at v back on its start.
            for x in c.leaving.iter().filter(|x| c.entering.contains(x)) {
                let tu = withins[uu].iter().find(|p| p.0 == *x).unwrap().1;
                let tv = withins[e.to].iter().find(|p| p.0 == *x).unwrap().1;
                assert!(tu.contains(ExprTag::FINAL) && tv.contains(ExprTag::START));
            }
        }
    }
}

#[test]
fn finishing_fires_on_final_roles() {
    // main = ("ab" @done)+
    let mut m = module("fin.ys");
    let ab = lit(&mut m, "ab");
    m.exprs[ab]
        .finishing
        .push(Action::Inline("done();".into()));
    let p = plus(&mut m, ab);
    let main = export(&mut m, "main", p);

    let mut ctx = CompileCtx::new(&m, CompileOptions::default());
    compile_export(&mut ctx, main).unwrap();
    let anno = ctx.compiled(main).unwrap();
    let withins = compute_withins(&ctx, anno);

    let step = |s: usize, c: u8| {
        anno.fsa.adj[s]
            .iter()
            .find(|e| e.lo <= c as u32 && (c as u32) < e.hi)
            .map(|e| e.to)
            .unwrap()
    };
    let s0 = anno.fsa.start;
    let s1 = step(s0, b'a');
    let s2 = step(s1, b'b');
    assert!(anno.fsa.is_final(s2));

    assert_eq!(transition_body(ctx.module, &withins, s0, s1), "");
    // Landing on the literal's final fires its finishing actions.
    assert_eq!(transition_body(ctx.module, &withins, s1, s2), "{done();}\n");
}
