use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module as LlvmModule;
use inkwell::values::{BasicValueEnum, PointerValue};

use crate::decls::DeclTable;
use crate::error::Result;
use crate::ir::cfg::ConstExpr;
use crate::ir::module::Module;
use crate::ir::types::{Mutability, Type};
use crate::materialize::TypeTable;

/// Contract for the excluded constant-expression lowering collaborator.
/// This crate never inspects a `ConstExpr`'s payload itself; it only
/// routes it here.
pub trait ConstLowerer {
    fn gen_const<'ctx>(
        &self,
        module: &LlvmModule<'ctx>,
        ctx: &'ctx Context,
        type_table: &TypeTable<'ctx>,
        decl_table: &DeclTable<'ctx>,
        expr: &ConstExpr,
    ) -> Result<(BasicValueEnum<'ctx>, Type)>;
}

/// Contract for the excluded memory-access primitive lowering collaborator.
pub trait MemAccessLowerer {
    fn gen_load<'ctx>(
        &self,
        ctx: &'ctx Context,
        builder: &Builder<'ctx>,
        addr: PointerValue<'ctx>,
        mutability: &Mutability,
        ty: &Type,
        type_table: &TypeTable<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>>;

    fn gen_store<'ctx>(
        &self,
        ctx: &'ctx Context,
        builder: &Builder<'ctx>,
        value: BasicValueEnum<'ctx>,
        addr: PointerValue<'ctx>,
        mutability: &Mutability,
        ty: &Type,
        type_table: &TypeTable<'ctx>,
    ) -> Result<()>;
}

/// Contract for the excluded GC-runtime metadata collaborator: populates `core.gc.typedesc`'s body and any
/// module-level metadata nodes. Invoked once, after GCHeaderEmitter has
/// created the named opaque struct and before the module is returned.
pub trait GcMetadataLowerer {
    fn gen_metadata<'ctx>(&self, module: &LlvmModule<'ctx>, ctx: &'ctx Context) -> Result<()>;
}

/// Bundles the three excluded collaborators `toLLVM` needs. A
/// caller with no constants, loads/stores, or GC types in a given module
/// may supply [`NoopCollaborators`].
pub trait Collaborators: ConstLowerer + MemAccessLowerer + GcMetadataLowerer {}
impl<T: ConstLowerer + MemAccessLowerer + GcMetadataLowerer> Collaborators for T {}

/// A do-nothing set of collaborators for modules that use none of their
/// features: no `Expr::Const`, no `Load`/`Store`, no GC headers.
pub struct NoopCollaborators;

impl ConstLowerer for NoopCollaborators {
    fn gen_const<'ctx>(
        &self,
        _module: &LlvmModule<'ctx>,
        _ctx: &'ctx Context,
        _type_table: &TypeTable<'ctx>,
        _decl_table: &DeclTable<'ctx>,
        _expr: &ConstExpr,
    ) -> Result<(BasicValueEnum<'ctx>, Type)> {
        unimplemented!("NoopCollaborators cannot lower constant expressions")
    }
}

impl MemAccessLowerer for NoopCollaborators {
    fn gen_load<'ctx>(
        &self,
        _ctx: &'ctx Context,
        _builder: &Builder<'ctx>,
        _addr: PointerValue<'ctx>,
        _mutability: &Mutability,
        _ty: &Type,
        _type_table: &TypeTable<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>> {
        unimplemented!("NoopCollaborators cannot lower loads")
    }

    fn gen_store<'ctx>(
        &self,
        _ctx: &'ctx Context,
        _builder: &Builder<'ctx>,
        _value: BasicValueEnum<'ctx>,
        _addr: PointerValue<'ctx>,
        _mutability: &Mutability,
        _ty: &Type,
        _type_table: &TypeTable<'ctx>,
    ) -> Result<()> {
        unimplemented!("NoopCollaborators cannot lower stores")
    }
}

impl GcMetadataLowerer for NoopCollaborators {
    fn gen_metadata<'ctx>(&self, _module: &LlvmModule<'ctx>, _ctx: &'ctx Context) -> Result<()> {
        Ok(())
    }
}
