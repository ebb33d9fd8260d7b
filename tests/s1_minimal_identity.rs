mod common;

use std::collections::BTreeMap;

use inkwell::context::Context;
use inkwell::values::InstructionOpcode;
use midir_llvm_lower::ir::{Expr, Function, NoopCollaborators, Terminator};
use midir_llvm_lower::{to_llvm, LowerOptions};

use common::{cfg, block, i32_ty, single_function_module};

/// `id(i32) -> i32`, single block, `Return(Var 0)`.
#[test]
fn minimal_identity_function() {
    let function = Function {
        params: vec![0],
        var_types: BTreeMap::from([(0, i32_ty())]),
        cfg: cfg(1, vec![(1, block(vec![], Terminator::Return(Some(Expr::Var(0)))))]),
    };
    let module = single_function_module("id", vec![i32_ty()], Some(i32_ty()), function);

    let ctx = Context::create();
    let lowered = to_llvm(&ctx, &module, &LowerOptions::default(), &NoopCollaborators).unwrap();

    let f = lowered.llvm_module.get_function("id").expect("id declared");
    assert_eq!(f.count_params(), 1);
    assert_eq!(f.count_basic_blocks(), 2, "entry + L1");

    let blocks: Vec<_> = f.get_basic_blocks();
    assert_eq!(blocks[0].get_name().to_str().unwrap(), "entry");
    assert_eq!(blocks[1].get_name().to_str().unwrap(), "L1");

    let entry_term = blocks[0].get_terminator().expect("entry has a terminator");
    assert_eq!(entry_term.get_opcode(), InstructionOpcode::Br);

    let l1_term = blocks[1].get_terminator().expect("L1 has a terminator");
    assert_eq!(l1_term.get_opcode(), InstructionOpcode::Return);
}
