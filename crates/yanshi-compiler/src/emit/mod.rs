//! Code emission: the C++ transition functions and the Graphviz rendering,
//! plus the opt-in human-readable dumps.

mod cxx;
mod dump;
mod graphviz;


pub use cxx::generate_cxx;
pub use dump::{dump_assoc, dump_automaton};
pub use graphviz::generate_graphviz;
