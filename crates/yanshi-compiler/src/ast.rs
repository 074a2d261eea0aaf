//! Expression trees, statements, and modules as handed over by the parser.
//!
//! Expressions live in an arena; tree identity is index equality and parent
//! links are indices, so the binary-lifted ancestor tables never form owning
//! cycles. The compiler borrows all of this read-only.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use yanshi_fsa::Fsa;

/// Byte span of a node in the grammar source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

/// A side-effect action attached to an expression: either an inline code
/// literal or a named reference resolved through the module's action table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Inline(String),
    Ref(String),
}

/// Arena index of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExprId(pub u32);

impl ExprId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a toplevel statement within its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StmtId(pub u32);

impl StmtId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Character class: a union of byte ranges `[lo, hi)`.
    Bracket(Vec<(u32, u32)>),
    /// Byte string.
    Literal(Vec<u8>),
    /// Any single byte.
    Dot,
    /// The empty string.
    Epsilon,
    /// An externally supplied machine, copied verbatim.
    Embed(Fsa),
    /// Reference to another nonterminal, expanded at export time.
    Collapse(StmtId),
    Star(ExprId),
    Plus(ExprId),
    Question(ExprId),
    /// `inner{m,n}` with `m <= n`.
    Repeat(ExprId, u32, u32),
    Complement(ExprId),
    Concat(ExprId, ExprId),
    Union(ExprId, ExprId),
    Intersect(ExprId, ExprId),
    Difference(ExprId, ExprId),
}

impl ExprKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Bracket(_) => "Bracket",
            ExprKind::Literal(_) => "Literal",
            ExprKind::Dot => "Dot",
            ExprKind::Epsilon => "Epsilon",
            ExprKind::Embed(_) => "Embed",
            ExprKind::Collapse(_) => "Collapse",
            ExprKind::Star(_) => "Star",
            ExprKind::Plus(_) => "Plus",
            ExprKind::Question(_) => "Question",
            ExprKind::Repeat(..) => "Repeat",
            ExprKind::Complement(_) => "Complement",
            ExprKind::Concat(..) => "Concat",
            ExprKind::Union(..) => "Union",
            ExprKind::Intersect(..) => "Intersect",
            ExprKind::Difference(..) => "Difference",
        }
    }
}

/// One expression node with its source span and action lists.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Span,
    pub entering: Vec<Action>,
    pub leaving: Vec<Action>,
    pub transiting: Vec<Action>,
    pub finishing: Vec<Action>,
}

impl Expr {
    pub fn new(kind: ExprKind, loc: Span) -> Self {
        Expr {
            kind,
            loc,
            entering: Vec::new(),
            leaving: Vec::new(),
            transiting: Vec::new(),
            finishing: Vec::new(),
        }
    }
}

/// Append-only expression arena.
#[derive(Debug, Default)]
pub struct ExprArena {
    nodes: Vec<Expr>,
}

impl ExprArena {
    pub fn alloc(&mut self, kind: ExprKind, loc: Span) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(Expr::new(kind, loc));
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Index<ExprId> for ExprArena {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }
}

impl IndexMut<ExprId> for ExprArena {
    fn index_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.nodes[id.index()]
    }
}

/// A nonterminal definition.
#[derive(Debug, Clone)]
pub struct DefineStmt {
    pub lhs: String,
    pub rhs: ExprId,
    pub export: bool,
    pub intact: bool,
}

/// A toplevel statement: a definition or an opaque code block passed through
/// to the generated output verbatim.
#[derive(Debug, Clone)]
pub enum Stmt {
    Define(DefineStmt),
    Code(String),
}

/// A parsed, name-resolved module.
#[derive(Debug, Default)]
pub struct Module {
    pub filename: String,
    pub stmts: Vec<Stmt>,
    pub exprs: ExprArena,
    /// Named actions usable through `Action::Ref`.
    pub actions: HashMap<String, String>,
}

impl Module {
    /// The definition behind `id`, if that statement is one.
    pub fn define(&self, id: StmtId) -> Option<&DefineStmt> {
        match self.stmts.get(id.index()) {
            Some(Stmt::Define(d)) => Some(d),
            _ => None,
        }
    }

    /// Toplevel definitions marked for export, in order.
    pub fn exports(&self) -> impl Iterator<Item = StmtId> + '_ {
        self.stmts.iter().enumerate().filter_map(|(i, s)| match s {
            Stmt::Define(d) if d.export => Some(StmtId(i as u32)),
            _ => None,
        })
    }
}
