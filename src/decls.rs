use inkwell::context::Context;
use inkwell::module::{Linkage, Module as LlvmModule};
use inkwell::values::{FunctionValue, GlobalValue};
use tracing::debug;

use crate::error::{LowerError, Result};
use crate::ir::module::{FunctionDecl, Global, Module};
use crate::materialize::TypeTable;

/// One emitted global: either a declared/defined function or a declared
/// variable.
#[derive(Clone, Copy)]
pub enum DeclValue<'ctx> {
    Function(FunctionValue<'ctx>),
    Variable(GlobalValue<'ctx>),
}

/// `global-index → LLVM value`, as returned by DeclEmitter.
pub struct DeclTable<'ctx> {
    values: Vec<DeclValue<'ctx>>,
}

impl<'ctx> DeclTable<'ctx> {
    pub fn get(&self, index: u32) -> DeclValue<'ctx> {
        self.values[index as usize]
    }

    pub fn function(&self, index: u32) -> FunctionValue<'ctx> {
        match self.values[index as usize] {
            DeclValue::Function(f) => f,
            DeclValue::Variable(_) => panic!("global #{index} is a variable, not a function"),
        }
    }
}

/// Resolves a function global's parameter types. Spec §4.3: "translates
/// parameter types by resolving each parameter id through the function's
/// variable-type table" — when a body is present, `function.var_types` is
/// that table and is the single source of truth, so `decl.param_types` is
/// never consulted and cannot drift from what `ValueMap::seed` assumes
/// about each parameter id's type. `decl.param_types` is used as-is only
/// for a body-less (declared-only) function, which has no variable table
/// to resolve through.
fn resolve_param_types<'ctx>(
    ctx: &'ctx Context,
    types: &TypeTable<'ctx>,
    decl: &FunctionDecl,
) -> Result<Vec<inkwell::types::BasicMetadataTypeEnum<'ctx>>> {
    match &decl.body {
        Some(function) => {
            let mut param_tys = Vec::with_capacity(function.params.len());
            for &param_id in &function.params {
                let ty = function.var_type(param_id).ok_or_else(|| LowerError::UndefinedVariable {
                    function: decl.name.clone(),
                    var_id: param_id,
                })?;
                param_tys.push(types.translate(ctx, ty)?.into());
            }
            Ok(param_tys)
        }
        None => {
            let mut param_tys = Vec::with_capacity(decl.param_types.len());
            for ty in &decl.param_types {
                param_tys.push(types.translate(ctx, ty)?.into());
            }
            Ok(param_tys)
        }
    }
}

/// Emits an LLVM `declare`/global for every entry of `module.globals`.
/// Function bodies, if present, are left for
/// `FunctionLowerer` to fill in; this pass only establishes signatures so
/// mutually-recursive call sites can resolve each other.
pub fn emit_decls<'ctx>(
    ctx: &'ctx Context,
    llvm_module: &LlvmModule<'ctx>,
    module: &Module,
    types: &TypeTable<'ctx>,
) -> Result<DeclTable<'ctx>> {
    let mut values = Vec::with_capacity(module.globals.len());

    for (i, global) in module.globals.iter().enumerate() {
        let value = match global {
            Global::Function(decl) => {
                let param_tys = resolve_param_types(ctx, types, decl)?;
                let fn_ty = match &decl.return_ty {
                    Some(ret) => {
                        let ret = types.translate(ctx, ret)?;
                        ret.fn_type(&param_tys, false)
                    }
                    None => ctx.void_type().fn_type(&param_tys, false),
                };
                let f = llvm_module.add_function(&decl.name, fn_ty, None);
                debug!(index = i, name = %decl.name, "declared function");
                DeclValue::Function(f)
            }
            Global::Variable(decl) => {
                let ty = types.translate(ctx, &decl.ty)?;
                let g = llvm_module.add_global(ty, None, &decl.name);
                g.set_linkage(Linkage::External);
                debug!(index = i, name = %decl.name, "declared variable");
                DeclValue::Variable(g)
            }
        };
        values.push(value);
    }

    Ok(DeclTable { values })
}
