use std::{error, fmt};

use inkwell::builder::BuilderError;

/// Errors produced while lowering a MidIR module to LLVM IR.
///
/// Every variant is fatal: lowering trusts its input and aborts the current
/// module rather than attempting local recovery.
#[derive(Debug, Clone)]
pub enum LowerError {
    /// A named type's body encodes an integer width LLVM cannot represent
    /// in the canonical set, or a float size outside {32, 64, 128}.
    UnsupportedWidth { type_index: u32, width: u32 },
    /// A `Named(i)` type reference, or a GC header's target type index,
    /// points outside the type table. `referrer` identifies the
    /// referencing entity (a type index, a GC-header index, or
    /// `u32::MAX` when no more specific entity is available).
    DanglingTypeIndex { referrer: u32, index: u32 },
    /// A non-struct named type was reached while still unresolved, i.e. a
    /// type cycle that does not pass through a struct's named-opaque
    /// fix-point.
    UnbrokenTypeCycle { index: u32 },
    /// A statement or terminator referenced a variable id with no binding.
    UndefinedVariable { function: String, var_id: u32 },
    /// A terminator names a CFG node absent from the function's node set.
    UnknownSuccessor { function: String, node: u32 },
    /// Two φ-incoming values for the same id disagree in LLVM type.
    PhiTypeMismatch {
        function: String,
        block: u32,
        var_id: u32,
    },
    /// An `extractvalue`/`insertvalue` path did not match the aggregate's
    /// declared shape.
    StructureMismatch { function: String, var_id: u32 },
    /// A ValMap lookup failed after seeding, meaning an invariant the
    /// seeding step is supposed to establish did not hold.
    ValMapMiss { function: String, var_id: u32 },
    /// PhiPlanner named a variable id at a block that never defines it.
    PhiOnNonDef {
        function: String,
        block: u32,
        var_id: u32,
    },
    /// Propagated from `inkwell`'s builder, the one fallible LLVM binding
    /// surface this crate calls directly.
    Builder(String),
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedWidth { type_index, width } => write!(
                f,
                "type #{type_index} has an unsupported width `{width}`"
            ),
            Self::DanglingTypeIndex { referrer, index } => write!(
                f,
                "entity #{referrer} references dangling type index `{index}`"
            ),
            Self::UnbrokenTypeCycle { index } => write!(
                f,
                "type #{index} participates in a cycle with no intervening struct"
            ),
            Self::UndefinedVariable { function, var_id } => write!(
                f,
                "function `{function}`: reference to undefined variable %{var_id}"
            ),
            Self::UnknownSuccessor { function, node } => write!(
                f,
                "function `{function}`: terminator names unknown block L{node}"
            ),
            Self::PhiTypeMismatch {
                function,
                block,
                var_id,
            } => write!(
                f,
                "function `{function}`: incoming type mismatch for %{var_id}'s phi in L{block}"
            ),
            Self::StructureMismatch { function, var_id } => write!(
                f,
                "function `{function}`: aggregate structure mismatch for %{var_id}"
            ),
            Self::ValMapMiss { function, var_id } => write!(
                f,
                "function `{function}`: value map has no binding for %{var_id} after seeding"
            ),
            Self::PhiOnNonDef {
                function,
                block,
                var_id,
            } => write!(
                f,
                "function `{function}`: phi plan for L{block} names %{var_id}, which it never defines"
            ),
            Self::Builder(msg) => write!(f, "LLVM builder error: {msg}"),
        }
    }
}

impl error::Error for LowerError {}

impl From<BuilderError> for LowerError {
    fn from(err: BuilderError) -> Self {
        Self::Builder(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LowerError>;
