//! Graphviz dot renderer: one digraph per exported statement.

use std::fmt::Write as _;

use indexmap::IndexMap;

use yanshi_fsa::State;

use crate::ast::StmtId;
use crate::compile::{compile_export, CompileCtx};
use crate::Result;

/// Render every exported statement as a directed graph: doublecircle
/// finals, a distinctly colored start, and edges labeled with their
/// coalesced ranges.
pub fn generate_graphviz(ctx: &mut CompileCtx, out: &mut String) -> Result<()> {
    let module = ctx.module;
    let _ = writeln!(out, "// Generated by yanshi, {}", module.filename);
    let exports: Vec<StmtId> = module.exports().collect();
    for stmt in exports {
        compile_export(ctx, stmt)?;
        let def = module.define(stmt).expect("exports are definitions");
        let anno = ctx.compiled(stmt).expect("compiled by compile_export");
        let fsa = &anno.fsa;

        let _ = writeln!(out, "digraph \"{}\" {{", def.lhs);

        let start_is_final = fsa.is_final(fsa.start);
        let _ = write!(
            out,
            "  node[shape=doublecircle,color=olivedrab1,style=filled,fontname=Monospace];"
        );
        for &f in &fsa.finals {
            if f != fsa.start {
                let _ = write!(out, " {f}");
            }
        }
        out.push('\n');

        if start_is_final {
            let _ = write!(out, "  node[shape=doublecircle,color=orchid];");
        } else {
            let _ = write!(out, "  node[shape=circle,color=orchid];");
        }
        let _ = writeln!(out, " {}", fsa.start);

        out.push_str("  node[shape=circle,color=black,style=\"\"]\n");

        for (u, row) in fsa.adj.iter().enumerate() {
            let mut labels: IndexMap<State, String> = IndexMap::new();
            let mut i = 0;
            while i < row.len() {
                let (lo, mut hi, to) = (row[i].lo, row[i].hi, row[i].to);
                i += 1;
                while i < row.len() && row[i].lo == hi && row[i].to == to {
                    hi = row[i].hi;
                    i += 1;
                }
                let label = labels.entry(to).or_default();
                if !label.is_empty() {
                    label.push(',');
                }
                if hi == lo + 1 {
                    let _ = write!(label, "{lo}");
                } else {
                    let _ = write!(label, "{lo}-{}", hi - 1);
                }
            }
            for (to, label) in &labels {
                let _ = writeln!(out, "  {u} -> {to}[label=\"{label}\"]");
            }
        }
        out.push_str("}\n");
    }
    Ok(())
}
