//! Lowers a typed, CFG-based MidIR module to LLVM IR in SSA form.
//!
//! The entry point is [`to_llvm`]. It materialises named MidIR types,
//! emits global and GC-descriptor declarations, emits accessor/modifier
//! declarations for GC-tracked aggregates, and lowers every function body
//! by computing phi placement and threading a per-block value map through
//! a depth-first CFG traversal.

/// LLVM attribute sets and small closed integer enumerations
pub mod attrs;
/// Accessor/modifier declaration emission for GC-tracked aggregates
pub mod accessor;
/// Global and function declaration emission
pub mod decls;
/// Fatal lowering errors
pub mod error;
/// Per-function SSA construction (the DFS lowering core)
pub mod function;
/// GC type-descriptor global emission
pub mod gc_header;
/// The MidIR data model this crate lowers from
pub mod ir;
/// The `toLLVM` entry point
pub mod lower;
/// Named-type materialisation with cyclic resolution
pub mod materialize;
/// Module-level lowering configuration
pub mod options;
/// Dominance-frontier-based phi placement
pub mod phi;
/// The per-variable value map threaded through function lowering
pub mod valmap;

pub use error::{LowerError, Result};
pub use lower::{to_llvm, LoweredModule};
pub use options::LowerOptions;
