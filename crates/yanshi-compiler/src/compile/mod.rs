//! Expression-tree compilation.
//!
//! The phases, in pipeline order:
//! - `context`: per-run state (cache, numbering tables, options)
//! - `compiler`: post-order visit producing one annotated machine per
//!   definition, determinized and minimized
//! - `lca`: binary-lifted lowest-common-ancestor queries over the tree
//! - `collapse`: export-time inlining of cross references
//! - `actions`: per-transition action programs from annotation bags

mod actions;
mod collapse;
mod compiler;
mod context;
mod lca;

#[cfg(test)]
mod actions_tests;

pub use compiler::compile;
pub use collapse::compile_export;
pub use context::{CompileCtx, NodeNums};

pub(crate) use actions::{compute_withins, transition_body};
pub(crate) use lca::find_lca;
