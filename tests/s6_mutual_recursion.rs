mod common;

use inkwell::context::Context;
use midir_llvm_lower::ir::{PtrTarget, StructField, StructType, Type};
use midir_llvm_lower::materialize::materialize_types;
use midir_llvm_lower::ir::{Module, Mutability};

use common::{i32_ty, named_type};

fn ptr_to(index: u32) -> Type {
    Type::Ptr(PtrTarget::BasicObj(Box::new(Type::Named(index))))
}

fn field(name: &str, ty: Type) -> StructField {
    StructField {
        name: name.to_string(),
        mutability: Mutability::Mutable,
        ty,
    }
}

/// `A = {i32, *B}`, `B = {i32, *A}`. TypeMaterialiser must seed
/// both as opaque named structs in phase 1 before either body is filled,
/// so A's body (filled second if visited index-order-first... here A is
/// index 0) can reference B's still-opaque handle and vice versa without
/// the slot table ever seeing a `Pending`/`InProgress` struct body.
#[test]
fn mutually_recursive_structs_resolve_without_panicking() {
    let mut module = Module::new("mutual");
    module.types.push(named_type(
        "A",
        Some(Type::Struct(StructType {
            packed: false,
            fields: vec![field("n", i32_ty()), field("next", ptr_to(1))],
        })),
    ));
    module.types.push(named_type(
        "B",
        Some(Type::Struct(StructType {
            packed: false,
            fields: vec![field("n", i32_ty()), field("next", ptr_to(0))],
        })),
    ));

    let ctx = Context::create();
    let table = materialize_types(&ctx, &module).expect("mutual recursion resolves via opaque structs");

    let a = table.get_struct(0).expect("A is a named struct");
    let b = table.get_struct(1).expect("B is a named struct");
    assert!(!a.is_opaque(), "A's body must be filled");
    assert!(!b.is_opaque(), "B's body must be filled");
    assert_eq!(a.count_fields(), 2);
    assert_eq!(b.count_fields(), 2);
}
