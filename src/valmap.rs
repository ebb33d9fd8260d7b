use im::HashMap;
use inkwell::builder::Builder;
use inkwell::values::{BasicValue, BasicValueEnum, FunctionValue, PointerValue};
use tracing::trace;

use crate::error::{LowerError, Result};
use crate::ir::cfg::Function;
use crate::ir::types::{Mutability, Type};
use crate::materialize::TypeTable;

/// The representation decision for one MidIR variable at one program point.
#[derive(Clone)]
pub enum Location<'ctx> {
    Bind(BasicValueEnum<'ctx>),
    Mem {
        ty: Type,
        mutability: Mutability,
        addr: PointerValue<'ctx>,
    },
    /// Field index (declaration order) → the synthetic or source variable
    /// id holding that field's value.
    Struct(Vec<u32>),
}

/// A persistent `variable-id → Location` snapshot, threaded through the
/// DFS lowering. Cloning a `ValMap` is O(1) amortised — `im::HashMap`
/// is a HAMT, the same persistent-map device used elsewhere in this
/// codebase's lineage for cheaply forked state.
#[derive(Clone)]
pub struct ValMap<'ctx> {
    bindings: HashMap<u32, Location<'ctx>>,
    next_id: u32,
}

impl<'ctx> ValMap<'ctx> {
    fn new(next_id: u32) -> Self {
        ValMap {
            bindings: HashMap::new(),
            next_id,
        }
    }

    pub fn lookup(&self, function: &str, id: u32) -> Result<&Location<'ctx>> {
        self.bindings
            .get(&id)
            .ok_or_else(|| LowerError::ValMapMiss {
                function: function.to_string(),
                var_id: id,
            })
    }

    pub fn bind(&self, id: u32, loc: Location<'ctx>) -> ValMap<'ctx> {
        let mut next = self.clone();
        next.bindings.insert(id, loc);
        next
    }

    /// Mints a fresh synthetic variable id, used when expanding an
    /// aggregate into independent per-field ids.
    pub fn fresh_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Recursively binds `id` (of MidIR type `ty`) to an `undef` value,
/// expanding structs into fresh synthetic field ids whose leaves are
/// themselves `undef`.
fn bind_undef<'ctx>(
    map: &mut ValMap<'ctx>,
    types: &TypeTable<'ctx>,
    ctx: &'ctx inkwell::context::Context,
    id: u32,
    ty: &Type,
) -> Result<()> {
    match ty {
        Type::Struct(s) => {
            let mut field_ids = Vec::with_capacity(s.fields.len());
            for field in &s.fields {
                let fid = map.fresh_id();
                bind_undef(map, types, ctx, fid, &field.ty)?;
                field_ids.push(fid);
            }
            *map = map.bind(id, Location::Struct(field_ids));
        }
        other => {
            let llvm_ty = types.translate(ctx, other)?;
            let undef = match llvm_ty {
                inkwell::types::BasicTypeEnum::ArrayType(t) => t.get_undef().as_basic_value_enum(),
                inkwell::types::BasicTypeEnum::FloatType(t) => t.get_undef().as_basic_value_enum(),
                inkwell::types::BasicTypeEnum::IntType(t) => t.get_undef().as_basic_value_enum(),
                inkwell::types::BasicTypeEnum::PointerType(t) => t.get_undef().as_basic_value_enum(),
                inkwell::types::BasicTypeEnum::StructType(t) => t.get_undef().as_basic_value_enum(),
                inkwell::types::BasicTypeEnum::VectorType(t) => t.get_undef().as_basic_value_enum(),
                #[allow(unreachable_patterns)]
                _ => unreachable!("BasicTypeEnum is exhaustively matched above"),
            };
            *map = map.bind(id, Location::Bind(undef));
        }
    }
    Ok(())
}

/// Recursively binds `id` (of MidIR type `ty`) to `value`, expanding
/// struct-typed values into fresh per-field synthetic ids via
/// `extractvalue`, depth-first left-to-right over the declared field
/// order.
pub(crate) fn bind_value<'ctx>(
    map: &mut ValMap<'ctx>,
    types: &TypeTable<'ctx>,
    ctx: &'ctx inkwell::context::Context,
    builder: &Builder<'ctx>,
    id: u32,
    value: BasicValueEnum<'ctx>,
    ty: &Type,
) -> Result<()> {
    match ty {
        Type::Struct(s) => {
            let agg = value.into_struct_value();
            let mut field_ids = Vec::with_capacity(s.fields.len());
            for (idx, field) in s.fields.iter().enumerate() {
                let field_val = builder.build_extract_value(agg, idx as u32, &field.name)?;
                let fid = map.fresh_id();
                bind_value(map, types, ctx, builder, fid, field_val, &field.ty)?;
                field_ids.push(fid);
            }
            *map = map.bind(id, Location::Struct(field_ids));
        }
        _ => {
            *map = map.bind(id, Location::Bind(value));
        }
    }
    Ok(())
}

/// Seeds a fresh `ValMap` for one function: expands struct-typed
/// parameters into per-field synthetic ids, then fills every remaining
/// declared variable id with `undef`.
pub fn seed<'ctx>(
    ctx: &'ctx inkwell::context::Context,
    builder: &Builder<'ctx>,
    types: &TypeTable<'ctx>,
    llvm_function: FunctionValue<'ctx>,
    function: &Function,
) -> Result<ValMap<'ctx>> {
    let next_id = function.max_var_id() + 1;
    let mut map = ValMap::new(next_id);

    for (i, &param_id) in function.params.iter().enumerate() {
        let ty = function
            .var_type(param_id)
            .expect("every parameter id has a declared type");
        let raw = llvm_function
            .get_nth_param(i as u32)
            .expect("DeclEmitter's signature has exactly function.params.len() parameters");

        bind_value(&mut map, types, ctx, builder, param_id, raw, ty)?;
        trace!(param_id, "seeded parameter");
    }

    for (&id, ty) in &function.var_types {
        if map.bindings.contains_key(&id) {
            continue;
        }
        bind_undef(&mut map, types, ctx, id, ty)?;
    }

    Ok(map)
}
