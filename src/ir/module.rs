use super::cfg::Function;
use super::types::{Mobility, Mutability, NamedType, Type};

/// A global declaration: either a function (with a body, or declared only)
/// or a variable.
#[derive(Debug, Clone)]
pub enum Global {
    Function(FunctionDecl),
    Variable(VariableDecl),
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    /// `None` means an LLVM `void` return type. Not a `Type` variant —
    /// `void` has no MidIR value representation — but every real LLVM
    /// function signature needs it, so it is threaded as the absence of a
    /// return type rather than inventing a `Type::Void`.
    pub return_ty: Option<Type>,
    /// Only consulted when `body` is absent (a declared-only external
    /// function). When a body is present, DeclEmitter resolves parameter
    /// types through `body.var_types` instead (spec §4.3), so this field
    /// cannot silently drift from what `ValueMap::seed` assumes about the
    /// body's own parameter ids.
    pub param_types: Vec<Type>,
    pub body: Option<Function>,
}

#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    pub ty: Type,
}

/// One entry in the module's GC-header table: the target named type, its
/// mobility, and its mutability.
#[derive(Debug, Clone)]
pub struct GcHeader {
    pub type_index: u32,
    pub mobility: Mobility,
    pub mutability: Mutability,
}

/// A MidIR module: name, indexed named-type table, indexed global table,
/// indexed GC-header table.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: String,
    pub types: Vec<NamedType>,
    pub globals: Vec<Global>,
    pub gc_headers: Vec<GcHeader>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            types: Vec::new(),
            globals: Vec::new(),
            gc_headers: Vec::new(),
        }
    }

    /// `None` if `index` is out of range of `self.types` — a dangling
    /// type index, which callers turn into `LowerError::DanglingTypeIndex`.
    pub fn type_display_name(&self, index: u32) -> Option<&str> {
        self.types.get(index as usize).map(|t| t.display_name.as_str())
    }
}
