//! The MidIR data model this crate lowers from.
//!
//! MidIR parsing itself is an external collaborator; this module
//! only defines the shape the parser is expected to hand us.

pub mod cfg;
pub mod collaborators;
pub mod module;
pub mod types;

pub use cfg::{BinOp, Block, Cfg, ConstExpr, Expr, Function, Statement, Terminator};
pub use collaborators::{Collaborators, ConstLowerer, GcMetadataLowerer, MemAccessLowerer, NoopCollaborators};
pub use module::{FunctionDecl, GcHeader, Global, Module, VariableDecl};
pub use types::{Effective, FloatWidth, Mobility, Mutability, NamedType, PtrTarget, StructField, StructType, Type};
