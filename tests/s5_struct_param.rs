mod common;

use std::collections::BTreeMap;

use inkwell::context::Context;
use inkwell::values::InstructionOpcode;
use midir_llvm_lower::ir::{
    BinOp, Expr, Function, Mutability, NoopCollaborators, StructField, StructType, Terminator, Type,
};
use midir_llvm_lower::{to_llvm, LowerOptions};

use common::{cfg, block, i32_ty, single_function_module};

fn pair_ty() -> Type {
    Type::Struct(StructType {
        packed: false,
        fields: vec![
            StructField {
                name: "a".to_string(),
                mutability: Mutability::Mutable,
                ty: i32_ty(),
            },
            StructField {
                name: "b".to_string(),
                mutability: Mutability::Mutable,
                ty: i32_ty(),
            },
        ],
    })
}

/// A single `{i32, i32}` parameter. FunctionLowerer must expand
/// it into two fresh per-field ids on entry (ValueMap::seed), and a `Move`
/// that adds the two fields together must reach those synthetic ids via
/// `Expr::Field` projection, producing two `extractvalue`s and no phi for
/// the struct id itself (it is never redefined by a `Move`).
#[test]
fn struct_param_fields_reach_through_extractvalue() {
    const PARAM: u32 = 0;
    const SUM: u32 = 1;

    let function = Function {
        params: vec![PARAM],
        var_types: BTreeMap::from([(PARAM, pair_ty()), (SUM, i32_ty())]),
        cfg: cfg(
            0,
            vec![(
                0,
                block(
                    vec![midir_llvm_lower::ir::Statement::Move(
                        SUM,
                        Expr::BinOp(
                            BinOp::Add,
                            Box::new(Expr::Field { base_id: PARAM, index: 0 }),
                            Box::new(Expr::Field { base_id: PARAM, index: 1 }),
                        ),
                    )],
                    Terminator::Return(Some(Expr::Var(SUM))),
                ),
            )],
        ),
    };
    let module = single_function_module("sum_pair", vec![pair_ty()], Some(i32_ty()), function);

    let ctx = Context::create();
    let lowered = to_llvm(&ctx, &module, &LowerOptions::default(), &NoopCollaborators).unwrap();

    let f = lowered.llvm_module.get_function("sum_pair").expect("declared");
    assert_eq!(f.count_params(), 1);

    let mut extract_count = 0;
    let mut phi_count = 0;
    for bb in f.get_basic_blocks() {
        for inst in bb.get_instructions() {
            match inst.get_opcode() {
                InstructionOpcode::ExtractValue => extract_count += 1,
                InstructionOpcode::Phi => phi_count += 1,
                _ => {}
            }
        }
    }
    assert_eq!(extract_count, 2, "each field reached once via extractvalue");
    assert_eq!(phi_count, 0, "struct param has a single definition site, no phi needed");
}
