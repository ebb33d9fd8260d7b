use inkwell::context::Context;
use inkwell::module::{Linkage, Module as LlvmModule};
use inkwell::values::GlobalValue;
use tracing::debug;

use crate::error::{LowerError, Result};
use crate::ir::module::Module;

/// Name of the named opaque struct every GC type-descriptor global is
/// typed as. Its body is populated by the excluded GC-metadata
/// collaborator.
pub const GC_TYPEDESC_STRUCT_NAME: &str = "core.gc.typedesc";

/// `gc-header-index → LLVM global value`, as returned by GCHeaderEmitter.
pub struct GcHeaderTable<'ctx> {
    globals: Vec<GlobalValue<'ctx>>,
}

impl<'ctx> GcHeaderTable<'ctx> {
    pub fn get(&self, index: u32) -> GlobalValue<'ctx> {
        self.globals[index as usize]
    }
}

fn descriptor_name(module: &Module, header_index: u32) -> Result<String> {
    let header = &module.gc_headers[header_index as usize];
    let display_name = module.type_display_name(header.type_index).ok_or(LowerError::DanglingTypeIndex {
        referrer: header_index,
        index: header.type_index,
    })?;
    Ok(format!(
        "core.gc.typedesc.{}.{}.{}",
        display_name,
        header.mobility.mnemonic(),
        header.mutability.mnemonic(),
    ))
}

/// Creates the `core.gc.typedesc` named opaque struct and one private
/// constant global per GC header. The struct body is left for
/// the GC-metadata collaborator to fill in.
pub fn emit_gc_headers<'ctx>(
    ctx: &'ctx Context,
    llvm_module: &LlvmModule<'ctx>,
    module: &Module,
) -> Result<GcHeaderTable<'ctx>> {
    let typedesc_ty = ctx.opaque_struct_type(GC_TYPEDESC_STRUCT_NAME);

    let mut globals = Vec::with_capacity(module.gc_headers.len());
    for (i, _header) in module.gc_headers.iter().enumerate() {
        let name = descriptor_name(module, i as u32)?;
        let global = llvm_module.add_global(typedesc_ty, None, &name);
        global.set_constant(true);
        global.set_linkage(Linkage::Private);
        debug!(index = i, name = %name, "emitted GC type descriptor global");
        globals.push(global);
    }

    Ok(GcHeaderTable { globals })
}
