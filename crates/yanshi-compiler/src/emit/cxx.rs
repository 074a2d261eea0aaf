//! C++ renderer: one init/transit pair per exported statement.

use std::fmt::Write as _;

use indexmap::IndexMap;

use yanshi_fsa::State;

use crate::ast::{Stmt, StmtId};
use crate::compile::{compile_export, compute_withins, transition_body, CompileCtx};
use crate::emit::dump::{dump_assoc, dump_automaton};
use crate::Result;

/// Generate the C++ output for every exported statement of the module, with
/// opaque code blocks passed through in toplevel order. Declarations mirror
/// into `header` when one is given.
pub fn generate_cxx(
    ctx: &mut CompileCtx,
    out: &mut String,
    mut header: Option<&mut String>,
) -> Result<()> {
    let module = ctx.module;
    let _ = writeln!(out, "// Generated by yanshi, {}", module.filename);
    out.push_str("#include <vector>\nusing std::vector;\n");
    if ctx.options.standalone {
        out.push_str("#include <algorithm>\n#include <cstdio>\nusing namespace std;\n");
    }
    if let Some(h) = header.as_deref_mut() {
        h.push_str("#pragma once\n#include <vector>\nusing std::vector;\n");
    }
    out.push('\n');

    for (i, stmt) in module.stmts.iter().enumerate() {
        match stmt {
            Stmt::Define(d) if d.export => {
                generate_cxx_export(ctx, StmtId(i as u32), out, header.as_deref_mut())?;
            }
            Stmt::Code(code) => out.push_str(code),
            Stmt::Define(_) => {}
        }
    }

    if ctx.options.standalone {
        out.push_str(DRIVER);
    }
    Ok(())
}

fn generate_cxx_export(
    ctx: &mut CompileCtx,
    stmt: StmtId,
    out: &mut String,
    header: Option<&mut String>,
) -> Result<()> {
    compile_export(ctx, stmt)?;
    let module = ctx.module;
    let def = module.define(stmt).expect("exports are definitions");
    let anno = ctx.compiled(stmt).expect("compiled by compile_export");

    if ctx.options.dump_automaton {
        println!("{}", dump_automaton(&anno.fsa));
    }
    if ctx.options.dump_assoc {
        println!("{}", dump_assoc(module, anno));
    }

    if let Some(h) = header {
        let _ = writeln!(h, "void yanshi_{}_init(long& start, vector<long>& finals);", def.lhs);
        let _ = writeln!(h, "long yanshi_{}_transit(long u, long c);", def.lhs);
    }

    let _ = writeln!(out, "void yanshi_{}_init(long& start, vector<long>& finals)", def.lhs);
    out.push_str("{\n");
    let _ = writeln!(out, "  start = {};", anno.fsa.start);
    let finals: Vec<String> = anno.fsa.finals.iter().map(|f| f.to_string()).collect();
    let _ = writeln!(out, "  finals = {{{}}};", finals.join(","));
    out.push_str("}\n\n");

    let withins = compute_withins(ctx, anno);

    let _ = writeln!(out, "long yanshi_{}_transit(long u, long c)", def.lhs);
    out.push_str("{\n");
    out.push_str("  long v = -1;\n");
    out.push_str("  switch (u) {\n");
    for u in 0..anno.fsa.n() {
        let row = &anno.fsa.adj[u];
        if row.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  case {u}:");
        out.push_str("    switch (c) {\n");

        // Coalesce contiguous ranges and group them per destination.
        let mut cases: IndexMap<State, (Vec<(u32, u32)>, String)> = IndexMap::new();
        let mut i = 0;
        while i < row.len() {
            let (lo, mut hi, to) = (row[i].lo, row[i].hi, row[i].to);
            i += 1;
            while i < row.len() && row[i].lo == hi && row[i].to == to {
                hi = row[i].hi;
                i += 1;
            }
            let entry = cases
                .entry(to)
                .or_insert_with(|| (Vec::new(), transition_body(module, &withins, u, to)));
            entry.0.push((lo, hi));
        }

        for (to, (ranges, body)) in &cases {
            for &(lo, hi) in ranges {
                if hi == lo + 1 {
                    let _ = writeln!(out, "    case {lo}:");
                } else {
                    let _ = writeln!(out, "    case {lo} ... {}:", hi - 1);
                }
            }
            let _ = write!(out, "      v = {to};\n{body}");
            out.push_str("      break;\n");
        }

        out.push_str("    }\n");
        out.push_str("    break;\n");
    }
    out.push_str("  }\n");
    out.push_str("  return v;\n");
    out.push_str("}\n\n");
    Ok(())
}

/// Byte-by-byte standalone driver over `argv[1]` or stdin.
const DRIVER: &str = r#"
int main(int argc, char* argv[])
{
  long u, len = 0;
  vector<long> finals;
  yanshi_main_init(u, finals);
  if (argc > 1)
    for (char* c = argv[1]; *c; c++) {
      u = yanshi_main_transit(u, *(unsigned char*)c);
      if (u < 0) break;
      len++;
    }
  else {
    int c;
    while (u >= 0 && (c = getchar()) != EOF) {
      u = yanshi_main_transit(u, c);
      if (u < 0) break;
      len++;
    }
  }
  printf("len: %ld\nstate: %ld\nfinal: %s\n", len, u, binary_search(finals.begin(), finals.end(), u) ? "true" : "false");
}
"#;
