use std::collections::BTreeMap;

use midir_llvm_lower::ir::{
    Block, Cfg, Function, FunctionDecl, Global, Module, NamedType, Statement, Terminator, Type,
};

pub fn i32_ty() -> Type {
    Type::Int {
        signed: true,
        width: 32,
    }
}

pub fn bool_ty() -> Type {
    Type::Int {
        signed: false,
        width: 1,
    }
}

pub fn block(statements: Vec<Statement>, terminator: Terminator) -> Block {
    Block {
        statements,
        terminator,
    }
}

/// Builds a one-function module: a single declared global whose body is
/// `function`, with parameter/return types inferred from `param_tys` and
/// `return_ty`.
pub fn single_function_module(
    name: &str,
    param_tys: Vec<Type>,
    return_ty: Option<Type>,
    function: Function,
) -> Module {
    let mut module = Module::new("test");
    module.globals.push(Global::Function(FunctionDecl {
        name: name.to_string(),
        return_ty,
        param_types: param_tys,
        body: Some(function),
    }));
    module
}

pub fn cfg(entry: u32, nodes: Vec<(u32, Block)>) -> Cfg {
    Cfg {
        entry,
        nodes: nodes.into_iter().collect(),
    }
}

pub fn var_types(entries: Vec<(u32, Type)>) -> BTreeMap<u32, Type> {
    entries.into_iter().collect()
}

pub fn named_type(display_name: &str, body: Option<Type>) -> NamedType {
    NamedType {
        display_name: display_name.to_string(),
        body,
    }
}
