mod common;

use std::collections::BTreeMap;

use inkwell::context::Context;
use inkwell::values::{InstructionOpcode, PhiValue};
use midir_llvm_lower::ir::{BinOp, Expr, Function, NoopCollaborators, Statement, Terminator};
use midir_llvm_lower::{to_llvm, LowerOptions};

use common::{block, bool_ty, cfg, i32_ty, single_function_module};

/// Entry -> header; header branches to body or exit; body
/// jumps back to header and increments `i`. Expect one phi for `i` in
/// the header with incomings `(initial, entry)` and `(incremented, body)`.
#[test]
fn loop_header_phi() {
    const ENTRY: u32 = 0;
    const HEADER: u32 = 1;
    const BODY: u32 = 2;
    const EXIT: u32 = 3;
    const I: u32 = 10;
    const COND: u32 = 11;

    let function = Function {
        params: vec![],
        var_types: BTreeMap::from([(I, i32_ty()), (COND, bool_ty())]),
        cfg: cfg(
            ENTRY,
            vec![
                (
                    ENTRY,
                    block(
                        vec![Statement::Move(I, Expr::IntLit { value: 0, width: 32 })],
                        Terminator::Jump(HEADER),
                    ),
                ),
                (
                    HEADER,
                    block(
                        vec![],
                        Terminator::Branch {
                            cond: Expr::Var(COND),
                            if_true: BODY,
                            if_false: EXIT,
                        },
                    ),
                ),
                (
                    BODY,
                    block(
                        vec![Statement::Move(
                            I,
                            Expr::BinOp(
                                BinOp::Add,
                                Box::new(Expr::Var(I)),
                                Box::new(Expr::IntLit { value: 1, width: 32 }),
                            ),
                        )],
                        Terminator::Jump(HEADER),
                    ),
                ),
                (EXIT, block(vec![], Terminator::Return(Some(Expr::Var(I))))),
            ],
        ),
    };
    // COND is never assigned by a Move (it is treated as live-in garbage
    // for this structural test); bind it via an undef-seeded variable,
    // which `ValueMap::seed` provides for any declared id with no Move.
    let module = single_function_module("loop", vec![], Some(i32_ty()), function);

    let ctx = Context::create();
    let lowered = to_llvm(&ctx, &module, &LowerOptions::default(), &NoopCollaborators).unwrap();

    let f = lowered.llvm_module.get_function("loop").expect("declared");
    let header_block = f
        .get_basic_blocks()
        .into_iter()
        .find(|b| b.get_name().to_str().unwrap() == "L1")
        .expect("L1 (header) exists");

    let phis: Vec<_> = header_block
        .get_instructions()
        .filter(|i| i.get_opcode() == InstructionOpcode::Phi)
        .collect();
    assert_eq!(phis.len(), 1, "header should have exactly one phi, for i");

    let phi = PhiValue::try_from(phis[0]).expect("is a phi");
    assert_eq!(phi.count_incoming(), 2);
    let mut incoming_blocks: Vec<String> = (0..phi.count_incoming())
        .map(|i| phi.get_incoming(i).unwrap().1.get_name().to_str().unwrap().to_string())
        .collect();
    incoming_blocks.sort();
    assert_eq!(incoming_blocks, vec!["L0".to_string(), "L2".to_string()]);
}
