mod common;

use inkwell::context::Context;
use inkwell::module::Linkage;
use midir_llvm_lower::ir::{GcHeader, Mobility, Mutability, Module, NoopCollaborators};
use midir_llvm_lower::{to_llvm, LowerOptions};

use common::named_type;

/// One named opaque type with a single GC header over it: asserts the
/// emitted descriptor global is named, constant, and privately linked per
/// spec §4.2.
#[test]
fn gc_header_emits_named_private_constant_global() {
    let mut module = Module::new("gc_headers");
    module.types.push(named_type("Cons", None));
    module.gc_headers.push(GcHeader {
        type_index: 0,
        mobility: Mobility::Mobile,
        mutability: Mutability::Mutable,
    });

    let ctx = Context::create();
    let lowered = to_llvm(&ctx, &module, &LowerOptions::default(), &NoopCollaborators).unwrap();

    let descriptor = lowered
        .llvm_module
        .get_global("core.gc.typedesc.Cons.mobile.mutable")
        .expect("GC type descriptor global declared under its §4.2 name");

    assert!(descriptor.is_constant(), "a GC type descriptor must be constant");
    assert_eq!(descriptor.get_linkage(), Linkage::Private);

    // GCHeaderTable indexes by GC-header index, returning the same global.
    let indexed = lowered.gc_headers.get(0);
    assert_eq!(indexed.get_name(), descriptor.get_name());
}
