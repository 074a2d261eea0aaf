//! Compilation context bundling all per-run state.

use indexmap::IndexMap;

use crate::anno::FsaAnno;
use crate::ast::{ExprId, Module, StmtId};
use crate::options::CompileOptions;

/// Euler-tour numbering of one expression node, filled in during its
/// statement's compilation. `anc[k]` is the `2^k`-th ancestor; `anc[0]` is
/// `None` at a tree root.
#[derive(Debug, Clone, Default)]
pub struct NodeNums {
    pub pre: i64,
    pub post: i64,
    pub depth: u32,
    pub anc: Vec<Option<ExprId>>,
}

impl NodeNums {
    pub fn parent(&self) -> Option<ExprId> {
        self.anc.first().copied().flatten()
    }
}

/// Compilation context owned by the driver: the module under compilation,
/// the options, the statement cache, and the expression numbering tables.
/// There is no hidden global state; everything lives here.
pub struct CompileCtx<'m> {
    pub module: &'m Module,
    pub options: CompileOptions,
    /// Machine cache, one entry per compiled statement. `compile` inserts
    /// each entry once; `compile_export` replaces it with the expanded and
    /// re-minimized machine.
    pub(crate) compiled: IndexMap<StmtId, FsaAnno>,
    /// Numbering table parallel to the module's expression arena.
    pub(crate) nums: Vec<NodeNums>,
    /// Pre-order tick, shared across all statements so `pre` totally orders
    /// every expression of the module.
    pub(crate) tick: i64,
}

impl<'m> CompileCtx<'m> {
    pub fn new(module: &'m Module, options: CompileOptions) -> Self {
        CompileCtx {
            module,
            options,
            compiled: IndexMap::new(),
            nums: vec![NodeNums::default(); module.exprs.len()],
            tick: 0,
        }
    }

    /// The cached machine for `stmt`, if it has been compiled.
    pub fn compiled(&self, stmt: StmtId) -> Option<&FsaAnno> {
        self.compiled.get(&stmt)
    }

    pub fn nums(&self, e: ExprId) -> &NodeNums {
        &self.nums[e.index()]
    }
}
