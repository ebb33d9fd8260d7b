mod common;

use std::collections::BTreeMap;

use inkwell::context::Context;
use midir_llvm_lower::ir::{Expr, Function, NoopCollaborators, Terminator};
use midir_llvm_lower::{to_llvm, LowerOptions};
use tracing_subscriber::EnvFilter;

use common::{block, cfg, i32_ty, single_function_module};

/// Installs an `env-filter`/`fmt` subscriber — the same shape
/// `kani-compiler` installs around its own compilation passes — around one
/// `to_llvm` call and checks lowering still runs to completion while every
/// `debug!`/`trace!` span this crate emits is actually being collected by a
/// live subscriber, not just a no-op default.
#[test]
fn lowering_runs_under_an_installed_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("trace"))
        .with_test_writer()
        .finish();

    let function = Function {
        params: vec![0],
        var_types: BTreeMap::from([(0, i32_ty())]),
        cfg: cfg(1, vec![(1, block(vec![], Terminator::Return(Some(Expr::Var(0)))))]),
    };
    let module = single_function_module("id", vec![i32_ty()], Some(i32_ty()), function);

    let ctx = Context::create();
    let result = tracing::subscriber::with_default(subscriber, || {
        to_llvm(&ctx, &module, &LowerOptions::default(), &NoopCollaborators)
    });

    assert!(result.is_ok(), "lowering must succeed while a subscriber is installed");
}
