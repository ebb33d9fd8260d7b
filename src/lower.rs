use inkwell::context::Context;
use inkwell::module::Module as LlvmModule;
use tracing::{info, info_span};

use crate::accessor::{self, AccessorDecl};
use crate::decls::{self, DeclTable, DeclValue};
use crate::error::Result;
use crate::function;
use crate::gc_header::{self, GcHeaderTable};
use crate::ir::collaborators::Collaborators;
use crate::ir::module::{Global, Module};
use crate::materialize::{self, TypeTable};
use crate::options::LowerOptions;

/// Everything produced while lowering a module, in case a caller needs to
/// inspect the intermediate tables (the GC header table, the accessor
/// declarations) rather than only the final `LLVMModuleRef`.
pub struct LoweredModule<'ctx> {
    pub llvm_module: LlvmModule<'ctx>,
    pub types: TypeTable<'ctx>,
    pub decls: DeclTable<'ctx>,
    pub gc_headers: GcHeaderTable<'ctx>,
    pub accessors: Vec<AccessorDecl<'ctx>>,
}

/// `toLLVM(module) → LLVMModuleRef`: the crate's single exposed
/// entry point. Materialises types, emits global/GC/accessor
/// declarations, then lowers every function body to SSA form.
pub fn to_llvm<'ctx, C: Collaborators>(
    ctx: &'ctx Context,
    module: &Module,
    options: &LowerOptions,
    collaborators: &C,
) -> Result<LoweredModule<'ctx>> {
    let span = info_span!("to_llvm", module = %module.name);
    let _enter = span.enter();

    let llvm_module = ctx.create_module(&module.name);
    if let Some(triple) = &options.target_triple {
        llvm_module.set_triple(&inkwell::targets::TargetTriple::create(triple));
    }
    if let Some(layout) = &options.data_layout {
        llvm_module.set_data_layout(&inkwell::targets::TargetData::create(layout).get_data_layout());
    }

    let types = materialize::materialize_types(ctx, module)?;
    info!(count = module.types.len(), "materialised named types");

    let gc_headers = gc_header::emit_gc_headers(ctx, &llvm_module, module)?;
    info!(count = module.gc_headers.len(), "emitted GC type descriptors");

    let decls = decls::emit_decls(ctx, &llvm_module, module, &types)?;
    info!(count = module.globals.len(), "emitted global declarations");

    let accessors = if options.emit_accessors {
        let a = accessor::emit_accessors(ctx, &llvm_module, module, &types)?;
        info!(count = a.len(), "emitted accessor declarations");
        a
    } else {
        Vec::new()
    };

    collaborators.gen_metadata(&llvm_module, ctx)?;

    for (i, global) in module.globals.iter().enumerate() {
        let Global::Function(decl) = global else { continue };
        let Some(body) = &decl.body else { continue };
        let DeclValue::Function(llvm_function) = decls.get(i as u32) else {
            unreachable!("global #{i} is a FunctionDecl, so DeclEmitter produced DeclValue::Function")
        };
        function::lower_function(
            ctx,
            &llvm_module,
            &types,
            &decls,
            collaborators,
            module,
            llvm_function,
            &decl.name,
            body,
        )?;
    }

    Ok(LoweredModule {
        llvm_module,
        types,
        decls,
        gc_headers,
        accessors,
    })
}
