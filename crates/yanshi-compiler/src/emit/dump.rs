//! Human-readable dumps of exported machines, behind the dump options.

use std::fmt::Write as _;

use yanshi_fsa::Fsa;

use crate::anno::FsaAnno;
use crate::ast::Module;

/// Render start, finals, and the edge list with coalesced ranges.
pub fn dump_automaton(fsa: &Fsa) -> String {
    let mut out = String::from("=== Automaton\n");
    let _ = writeln!(out, "start: {}", fsa.start);
    let finals: Vec<String> = fsa.finals.iter().map(|f| f.to_string()).collect();
    let _ = writeln!(out, "finals: {}", finals.join(" "));
    out.push_str("edges:\n");
    for (u, row) in fsa.adj.iter().enumerate() {
        let _ = write!(out, "{u}:");
        let mut i = 0;
        while i < row.len() {
            let (lo, mut hi, to) = (row[i].lo, row[i].hi, row[i].to);
            i += 1;
            while i < row.len() && row[i].lo == hi && row[i].to == to {
                hi = row[i].hi;
                i += 1;
            }
            if hi == lo + 1 {
                let _ = write!(out, " ({lo},{to})");
            } else {
                let _ = write!(out, " ({lo}-{},{to})", hi - 1);
            }
        }
        out.push('\n');
    }
    out
}

/// Render each state's annotation bag: expression kind, source span, and
/// the number of attached actions per bucket.
///
/// Buckets print as `>` entering, `%` leaving, `@` finishing, `$`
/// transiting.
pub fn dump_assoc(module: &Module, anno: &FsaAnno) -> String {
    let mut out = String::from("=== Associated Expr of each state\n");
    for (s, bag) in anno.assoc.iter().enumerate() {
        let _ = write!(out, "{s}:");
        for &(e, _) in bag {
            let expr = &module.exprs[e];
            let _ = write!(out, " {}({}-{}", expr.kind.name(), expr.loc.start, expr.loc.end);
            if !expr.entering.is_empty() {
                let _ = write!(out, ",>{}", expr.entering.len());
            }
            if !expr.leaving.is_empty() {
                let _ = write!(out, ",%{}", expr.leaving.len());
            }
            if !expr.finishing.is_empty() {
                let _ = write!(out, ",@{}", expr.finishing.len());
            }
            if !expr.transiting.is_empty() {
                let _ = write!(out, ",${}", expr.transiting.len());
            }
            out.push(')');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use crate::compile::CompileCtx;
    use crate::test_utils::*;
    use crate::CompileOptions;

    use super::{dump_assoc, dump_automaton};

    #[test]
    fn automaton_dump_coalesces_ranges() {
        let mut m = module("dump.ys");
        let cls = bracket(&mut m, &[(b'a', b'z')]);
        let main = export(&mut m, "main", cls);
        let mut ctx = CompileCtx::new(&m, CompileOptions::default());
        crate::compile_export(&mut ctx, main).unwrap();

        let out = dump_automaton(&ctx.compiled(main).unwrap().fsa);
        let expected = indoc! {"
            === Automaton
            start: 0
            finals: 1
            edges:
            0: (97-122,1)
            1:
        "};
        assert_eq!(out, expected);
    }

    #[test]
    fn assoc_dump_counts_actions() {
        let mut m = module("dump2.ys");
        let a = lit(&mut m, "a");
        entering(&mut m, a, "e();");
        let main = export(&mut m, "main", a);
        let mut ctx = CompileCtx::new(&m, CompileOptions::default());
        crate::compile_export(&mut ctx, main).unwrap();

        let out = dump_assoc(&m, ctx.compiled(main).unwrap());
        let expected = indoc! {"
            === Associated Expr of each state
            0: Literal(0-0,>1)
            1: Literal(0-0,>1)
        "};
        assert_eq!(out, expected);
    }
}
