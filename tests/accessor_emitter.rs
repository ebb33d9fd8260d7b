mod common;

use inkwell::context::Context;
use midir_llvm_lower::ir::{Module, Mutability, NoopCollaborators, StructField, StructType, Type};
use midir_llvm_lower::{to_llvm, LowerOptions};

use common::{i32_ty, named_type};

fn field(name: &str, mutability: Mutability, ty: Type) -> StructField {
    StructField {
        name: name.to_string(),
        mutability,
        ty,
    }
}

/// `Leaf = { v: i32 (mutable) }`, `Outer = { tag: i32 (const), items:
/// [3 x Leaf] (mutable) }`. Exercises a const scalar leaf (read only, no
/// index params) and a mutable array-of-struct leaf (read+write, one `i32`
/// index param for the array level crossed).
#[test]
fn accessor_coverage_matches_effective_constancy_and_array_descent() {
    let mut module = Module::new("accessors");
    let leaf_index = 0u32;
    module.types.push(named_type(
        "Leaf",
        Some(Type::Struct(StructType {
            packed: false,
            fields: vec![field("v", Mutability::Mutable, i32_ty())],
        })),
    ));
    module.types.push(named_type(
        "Outer",
        Some(Type::Struct(StructType {
            packed: false,
            fields: vec![
                field("tag", Mutability::Immutable, i32_ty()),
                field(
                    "items",
                    Mutability::Mutable,
                    Type::Array {
                        size: Some(3),
                        element: Box::new(Type::Named(leaf_index)),
                    },
                ),
            ],
        })),
    ));

    let ctx = Context::create();
    let lowered = to_llvm(&ctx, &module, &LowerOptions::default(), &NoopCollaborators).unwrap();

    // Const scalar leaf: read-only, object pointer only.
    let tag_read = lowered
        .llvm_module
        .get_function("core.types.tag.read")
        .expect("tag.read declared");
    assert_eq!(tag_read.count_params(), 1);
    assert!(
        lowered.llvm_module.get_function("core.types.tag.write").is_none(),
        "a const leaf must not get a write accessor"
    );

    // Mutable array-of-struct leaf: one index param for the array level
    // crossed, both read and write declared.
    let items_read = lowered
        .llvm_module
        .get_function("core.types.items.v.read")
        .expect("items.v.read declared");
    assert_eq!(items_read.count_params(), 2, "object pointer + one array index");

    let items_write = lowered
        .llvm_module
        .get_function("core.types.items.v.write")
        .expect("a mutable path must get a write accessor");
    assert_eq!(
        items_write.count_params(),
        3,
        "object pointer + one array index + the value being written"
    );
}
