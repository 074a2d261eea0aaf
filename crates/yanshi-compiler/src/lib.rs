//! yanshi compiler core: annotated automata, collapse expansion, and code
//! emission for a regular-grammar DSL.
//!
//! The pipeline, fed with a parsed and name-resolved [`ast::Module`]:
//! - `anno` - annotated-FSA combinators over [`yanshi_fsa`]
//! - `compile` - expression-tree compilation, collapse expansion, action
//!   synthesis
//! - `emit` - C++ transition functions and Graphviz rendering

pub mod anno;
pub mod ast;
pub mod compile;
pub mod emit;
pub mod options;

#[cfg(test)]
pub mod test_utils;

pub use compile::{compile, compile_export, CompileCtx};
pub use emit::{generate_cxx, generate_graphviz};
pub use options::CompileOptions;

/// Errors that can occur while compiling a module.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    /// A collapse expression points at a statement that is not a definition.
    #[error("collapse target (statement #{0}) is not a definition")]
    DanglingCollapse(usize),

    /// A statement without a right-hand side was handed to the compiler.
    #[error("statement #{0} is not a definition")]
    NotADefinition(usize),
}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;
