use inkwell::context::Context;
use inkwell::module::Module as LlvmModule;
use inkwell::types::BasicType;
use inkwell::values::FunctionValue;
use inkwell::AddressSpace;
use tracing::trace;

use crate::attrs::{apply_function_attrs, AccessorAttrs};
use crate::error::{LowerError, Result};
use crate::ir::module::Module;
use crate::ir::types::{Effective, StructType as MidStructType, Type};
use crate::materialize::TypeTable;

/// One `.read`/`.write` declaration pair for a scalar leaf field, as
/// produced by [`emit_accessors`].
pub struct AccessorDecl<'ctx> {
    pub path: String,
    pub read: FunctionValue<'ctx>,
    pub write: Option<FunctionValue<'ctx>>,
}

/// Walks every named type with a body and emits `.read`/`.write` function
/// declarations for each scalar leaf field. Only declarations are
/// emitted — the accessor bodies are synthesised by codegen stages this
/// crate does not own (load/store lowering is an external collaborator).
pub fn emit_accessors<'ctx>(
    ctx: &'ctx Context,
    llvm_module: &LlvmModule<'ctx>,
    module: &Module,
    types: &TypeTable<'ctx>,
) -> Result<Vec<AccessorDecl<'ctx>>> {
    let mut out = Vec::new();
    for (i, entry) in module.types.iter().enumerate() {
        let Some(body) = &entry.body else { continue };
        walk(
            ctx,
            llvm_module,
            module,
            types,
            body,
            "core.types".to_string(),
            Vec::new(),
            Effective::Mutable,
            i as u32,
            &mut out,
        )?;
    }
    Ok(out)
}

/// `indices` accumulates one entry per array level crossed, in descent
/// order (outermost first). Prepending at each crossing and reversing
/// before emission would describe the same list; appending directly
/// during descent produces the identical outermost-first,
/// innermost-last order without the extra reversal step.
#[allow(clippy::too_many_arguments)]
fn walk<'ctx>(
    ctx: &'ctx Context,
    llvm_module: &LlvmModule<'ctx>,
    module: &Module,
    types: &TypeTable<'ctx>,
    ty: &Type,
    path: String,
    indices: Vec<()>,
    effective: Effective,
    origin: u32,
    out: &mut Vec<AccessorDecl<'ctx>>,
) -> Result<()> {
    match ty {
        Type::Struct(s) => walk_struct(ctx, llvm_module, module, types, s, path, indices, effective, origin, out),
        Type::Array { element, .. } => {
            let mut next = indices;
            next.push(());
            walk(ctx, llvm_module, module, types, element, path, next, effective, origin, out)
        }
        Type::Named(i) => {
            let entry = module
                .types
                .get(*i as usize)
                .ok_or(LowerError::DanglingTypeIndex { referrer: origin, index: *i })?;
            match &entry.body {
                Some(inner) => walk(ctx, llvm_module, module, types, inner, path, indices, effective, origin, out),
                None => emit_leaf(ctx, llvm_module, module, types, ty, path, indices, effective, out),
            }
        }
        Type::Int { .. } | Type::Float(_) | Type::Ptr(_) => {
            emit_leaf(ctx, llvm_module, module, types, ty, path, indices, effective, out)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_struct<'ctx>(
    ctx: &'ctx Context,
    llvm_module: &LlvmModule<'ctx>,
    module: &Module,
    types: &TypeTable<'ctx>,
    s: &MidStructType,
    path: String,
    indices: Vec<()>,
    effective: Effective,
    origin: u32,
    out: &mut Vec<AccessorDecl<'ctx>>,
) -> Result<()> {
    for field in &s.fields {
        let field_path = format!("{path}.{}", field.name);
        let field_effective = effective.combine(&field.mutability);
        walk(
            ctx,
            llvm_module,
            module,
            types,
            &field.ty,
            field_path,
            indices.clone(),
            field_effective,
            origin,
            out,
        )?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn emit_leaf<'ctx>(
    ctx: &'ctx Context,
    llvm_module: &LlvmModule<'ctx>,
    _module: &Module,
    types: &TypeTable<'ctx>,
    leaf_ty: &Type,
    path: String,
    indices: Vec<()>,
    effective: Effective,
    out: &mut Vec<AccessorDecl<'ctx>>,
) -> Result<()> {
    let leaf = types.translate(ctx, leaf_ty)?;
    let obj_ptr = ctx.ptr_type(AddressSpace::default());
    let i32_ty = ctx.i32_type();

    let mut read_params: Vec<inkwell::types::BasicMetadataTypeEnum> = vec![obj_ptr.into()];
    for _ in &indices {
        read_params.push(i32_ty.into());
    }
    let read_fn_ty = leaf.fn_type(&read_params, false);
    let read_name = format!("{path}.read");
    let read = llvm_module.add_function(&read_name, read_fn_ty, None);
    apply_function_attrs(ctx, read, AccessorAttrs::read());
    trace!(name = %read_name, "emitted accessor read declaration");

    let write = if effective == Effective::Const {
        None
    } else {
        let mut write_params = read_params;
        write_params.push(leaf.into());
        let write_fn_ty = ctx.void_type().fn_type(&write_params, false);
        let write_name = format!("{path}.write");
        let write = llvm_module.add_function(&write_name, write_fn_ty, None);
        apply_function_attrs(ctx, write, AccessorAttrs::write());
        trace!(name = %write_name, "emitted accessor write declaration");
        Some(write)
    };

    out.push(AccessorDecl { path, read, write });
    Ok(())
}
