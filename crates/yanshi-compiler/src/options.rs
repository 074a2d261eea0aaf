//! Compilation options.

/// Switches controlling export-time transforms and emission, as chosen by
/// the driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// After expansion, make every state both start and final (unless the
    /// statement is marked `intact`).
    pub substring_grammar: bool,
    /// Dump the exported automaton in human-readable form.
    pub dump_automaton: bool,
    /// Dump per-state annotation bags.
    pub dump_assoc: bool,
    /// Emit a standalone `main` driver alongside the generated functions.
    pub standalone: bool,
}
