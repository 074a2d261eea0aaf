//! Finite-state automaton primitives for the yanshi compiler.
//!
//! This crate knows nothing about expression trees or annotations: it holds
//! the plain automaton representation (`Fsa`) and the transforms the compiler
//! chains together (subset construction, Hopcroft minimization, reachability
//! pruning, products, totalization). Every transform that renumbers states
//! reports the old states behind each new one, so callers can carry their own
//! per-state payloads in parallel.
//!
//! Symbols are half-open `u32` ranges. Real input bytes occupy `[0, AB)`;
//! `EPSILON` and the per-collapse specials live above.

mod determinize;
mod fsa;
mod minimize;
mod product;
mod reach;

#[cfg(test)]
mod fsa_tests;
#[cfg(test)]
mod product_tests;

pub use fsa::{insert_sorted, Edge, Fsa, State};
pub use product::product;

/// End of the byte alphabet. Edges below `AB` consume real input bytes.
pub const AB: u32 = 256;

/// The epsilon symbol, stored as the singleton range `[EPSILON, EPSILON + 1)`.
pub const EPSILON: u32 = AB;
