use std::collections::{BTreeMap, HashSet};

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module as LlvmModule;
use inkwell::values::{BasicValue, BasicValueEnum, FunctionValue, PhiValue};
use tracing::{debug, trace};

use crate::decls::DeclTable;
use crate::error::{LowerError, Result};
use crate::ir::cfg::{BinOp, Expr, Function, Statement, Terminator};
use crate::ir::collaborators::Collaborators;
use crate::ir::module::Module;
use crate::ir::types::Type;
use crate::materialize::TypeTable;
use crate::phi::{self, PhiPlan};
use crate::valmap::{self, bind_value, Location, ValMap};

struct Lowering<'a, 'ctx, C: Collaborators> {
    ctx: &'ctx Context,
    builder: &'a Builder<'ctx>,
    llvm_module: &'a LlvmModule<'ctx>,
    types: &'a TypeTable<'ctx>,
    decls: &'a DeclTable<'ctx>,
    collaborators: &'a C,
    function_name: &'a str,
    function: &'a Function,
    llvm_blocks: BTreeMap<u32, BasicBlock<'ctx>>,
    block_phis: BTreeMap<u32, Vec<(u32, PhiValue<'ctx>)>>,
    visited: HashSet<u32>,
}

/// Resolves a variable's current value, reconstructing a struct-typed
/// aggregate via `insertvalue` if its `Location` is `Struct(...)`.
fn materialize_value<'ctx>(
    ctx: &'ctx Context,
    builder: &Builder<'ctx>,
    types: &TypeTable<'ctx>,
    valmap: &ValMap<'ctx>,
    function_name: &str,
    id: u32,
    ty: &Type,
) -> Result<BasicValueEnum<'ctx>> {
    match valmap.lookup(function_name, id)? {
        Location::Bind(v) => Ok(*v),
        Location::Struct(field_ids) => {
            let Type::Struct(s) = ty else {
                return Err(LowerError::StructureMismatch {
                    function: function_name.to_string(),
                    var_id: id,
                });
            };
            if field_ids.len() != s.fields.len() {
                return Err(LowerError::StructureMismatch {
                    function: function_name.to_string(),
                    var_id: id,
                });
            }
            let struct_ty = types.translate(ctx, ty)?.into_struct_type();
            let mut agg = struct_ty.get_undef();
            for (idx, (field_id, field)) in field_ids.iter().zip(&s.fields).enumerate() {
                let field_val =
                    materialize_value(ctx, builder, types, valmap, function_name, *field_id, &field.ty)?;
                agg = builder
                    .build_insert_value(agg, field_val, idx as u32, &field.name)?
                    .into_struct_value();
            }
            Ok(agg.into())
        }
        Location::Mem { .. } => Err(LowerError::StructureMismatch {
            function: function_name.to_string(),
            var_id: id,
        }),
    }
}

impl<'a, 'ctx, C: Collaborators> Lowering<'a, 'ctx, C> {
    fn var_type(&self, id: u32) -> Result<&'a Type> {
        self.function.var_type(id).ok_or_else(|| LowerError::UndefinedVariable {
            function: self.function_name.to_string(),
            var_id: id,
        })
    }

    fn eval(&self, valmap: &ValMap<'ctx>, expr: &Expr) -> Result<BasicValueEnum<'ctx>> {
        match expr {
            Expr::Var(id) => {
                let ty = self.var_type(*id)?;
                materialize_value(self.ctx, self.builder, self.types, valmap, self.function_name, *id, ty)
            }
            Expr::IntLit { value, width } => {
                let ity = self
                    .types
                    .translate(self.ctx, &Type::Int { signed: true, width: *width })?
                    .into_int_type();
                Ok(ity.const_int(*value as u64, *value < 0).into())
            }
            Expr::Const(c) => {
                let (val, _ty) = self
                    .collaborators
                    .gen_const(self.llvm_module, self.ctx, self.types, self.decls, c)?;
                Ok(val)
            }
            Expr::BinOp(op, lhs, rhs) => {
                let l = self.eval(valmap, lhs)?.into_int_value();
                let r = self.eval(valmap, rhs)?.into_int_value();
                Ok(match op {
                    BinOp::Add => self.builder.build_int_add(l, r, "add")?,
                    BinOp::Sub => self.builder.build_int_sub(l, r, "sub")?,
                    BinOp::Mul => self.builder.build_int_mul(l, r, "mul")?,
                }
                .into())
            }
            Expr::Load { addr, mutability, ty } => {
                let addr_val = self.eval(valmap, addr)?.into_pointer_value();
                self.collaborators
                    .gen_load(self.ctx, self.builder, addr_val, mutability, ty, self.types)
            }
            Expr::Field { base_id, index } => {
                let base_ty = self.var_type(*base_id)?;
                let Type::Struct(s) = base_ty else {
                    return Err(LowerError::StructureMismatch {
                        function: self.function_name.to_string(),
                        var_id: *base_id,
                    });
                };
                let field = s.fields.get(*index).ok_or_else(|| LowerError::StructureMismatch {
                    function: self.function_name.to_string(),
                    var_id: *base_id,
                })?;
                let Location::Struct(field_ids) = valmap.lookup(self.function_name, *base_id)? else {
                    return Err(LowerError::StructureMismatch {
                        function: self.function_name.to_string(),
                        var_id: *base_id,
                    });
                };
                let field_id = *field_ids.get(*index).ok_or_else(|| LowerError::StructureMismatch {
                    function: self.function_name.to_string(),
                    var_id: *base_id,
                })?;
                materialize_value(self.ctx, self.builder, self.types, valmap, self.function_name, field_id, &field.ty)
            }
        }
    }

    fn lower_statement(&self, valmap: ValMap<'ctx>, stmt: &Statement) -> Result<ValMap<'ctx>> {
        match stmt {
            Statement::Move(id, expr) => {
                let val = self.eval(&valmap, expr)?;
                let ty = self.var_type(*id)?;
                let mut next = valmap;
                bind_value(&mut next, self.types, self.ctx, self.builder, *id, val, ty)?;
                Ok(next)
            }
            Statement::Store {
                addr,
                value,
                mutability,
                ty,
            } => {
                let addr_val = self.eval(&valmap, addr)?.into_pointer_value();
                let value_val = self.eval(&valmap, value)?;
                self.collaborators.gen_store(
                    self.ctx,
                    self.builder,
                    value_val,
                    addr_val,
                    mutability,
                    ty,
                    self.types,
                )?;
                Ok(valmap)
            }
        }
    }

    fn lower_terminator(&self, valmap: &ValMap<'ctx>, terminator: &Terminator) -> Result<()> {
        match terminator {
            Terminator::Return(None) => {
                self.builder.build_return(None)?;
            }
            Terminator::Return(Some(expr)) => {
                let val = self.eval(valmap, expr)?;
                self.builder.build_return(Some(&val as &dyn BasicValue))?;
            }
            Terminator::Jump(target) => {
                let target_block = *self.llvm_blocks.get(target).ok_or_else(|| LowerError::UnknownSuccessor {
                    function: self.function_name.to_string(),
                    node: *target,
                })?;
                self.builder.build_unconditional_branch(target_block)?;
            }
            Terminator::Branch {
                cond,
                if_true,
                if_false,
            } => {
                let cond_val = self.eval(valmap, cond)?.into_int_value();
                let t = *self.llvm_blocks.get(if_true).ok_or_else(|| LowerError::UnknownSuccessor {
                    function: self.function_name.to_string(),
                    node: *if_true,
                })?;
                let f = *self.llvm_blocks.get(if_false).ok_or_else(|| LowerError::UnknownSuccessor {
                    function: self.function_name.to_string(),
                    node: *if_false,
                })?;
                self.builder.build_conditional_branch(cond_val, t, f)?;
            }
        }
        Ok(())
    }

    /// Adds one incoming `(value, from_block)` edge to every phi planned
    /// at `succ_node`, for the variables it names.
    fn wire_incoming(&self, succ_node: u32, from_block: BasicBlock<'ctx>, vout: &ValMap<'ctx>) -> Result<()> {
        let Some(phis) = self.block_phis.get(&succ_node) else {
            return Ok(());
        };
        for &(id, phi) in phis {
            match vout.lookup(self.function_name, id)? {
                Location::Bind(v) => {
                    phi.add_incoming(&[(v as &dyn BasicValue, from_block)]);
                }
                _ => {
                    return Err(LowerError::PhiTypeMismatch {
                        function: self.function_name.to_string(),
                        block: succ_node,
                        var_id: id,
                    })
                }
            }
        }
        Ok(())
    }

    /// The DFS lowering core: visits `node` exactly once,
    /// wires phi-incoming edges for every successor on every visit that
    /// reaches it (including repeat reaches along back edges), and
    /// recurses only into successors not yet in the DFS tree.
    fn visit(&mut self, node: u32, vin: ValMap<'ctx>) -> Result<()> {
        self.visited.insert(node);
        let block = self.function.cfg.nodes.get(&node).ok_or_else(|| LowerError::UnknownSuccessor {
            function: self.function_name.to_string(),
            node,
        })?;
        let llvm_block = self.llvm_blocks[&node];
        self.builder.position_at_end(llvm_block);

        // Step 1: phi values are authoritative for ids planned at this block.
        let mut v = vin;
        if let Some(phis) = self.block_phis.get(&node) {
            for &(id, phi) in phis {
                v = v.bind(id, Location::Bind(phi.as_basic_value()));
            }
        }

        // Step 2: fold statements left-to-right.
        for stmt in &block.statements {
            v = self.lower_statement(v, stmt)?;
        }

        // Step 3: lower the terminator.
        self.lower_terminator(&v, &block.terminator)?;

        // Step 4 + 5: wire successors, then recurse into unvisited ones.
        let successors = block.terminator.successors();
        for &succ in &successors {
            self.wire_incoming(succ, llvm_block, &v)?;
        }
        for succ in successors {
            if !self.visited.contains(&succ) {
                self.visit(succ, v.clone())?;
            }
        }
        Ok(())
    }
}

/// Lowers one function body to a well-formed SSA LLVM function: allocates
/// blocks, seeds the ValMap, plans and creates phis, then DFS-lowers the
/// CFG.
pub fn lower_function<'ctx, C: Collaborators>(
    ctx: &'ctx Context,
    llvm_module: &LlvmModule<'ctx>,
    types: &TypeTable<'ctx>,
    decls: &DeclTable<'ctx>,
    collaborators: &C,
    _module: &Module,
    llvm_function: FunctionValue<'ctx>,
    function_name: &str,
    function: &Function,
) -> Result<()> {
    debug!(function = function_name, "lowering function body");
    let builder = ctx.create_builder();

    let entry_block = ctx.append_basic_block(llvm_function, "entry");
    let mut llvm_blocks = BTreeMap::new();
    for node in function.cfg.node_ids() {
        let label = format!("L{node}");
        llvm_blocks.insert(node, ctx.append_basic_block(llvm_function, &label));
    }

    builder.position_at_end(entry_block);
    let seeded = valmap::seed(ctx, &builder, types, llvm_function, function)?;
    let cfg_entry_block = *llvm_blocks.get(&function.cfg.entry).ok_or_else(|| LowerError::UnknownSuccessor {
        function: function_name.to_string(),
        node: function.cfg.entry,
    })?;
    builder.build_unconditional_branch(cfg_entry_block)?;

    let phi_plan: PhiPlan = phi::plan_phis(&function.cfg);
    let mut block_phis: BTreeMap<u32, Vec<(u32, PhiValue<'ctx>)>> = BTreeMap::new();
    for (&block_id, ids) in &phi_plan {
        let llvm_block = llvm_blocks[&block_id];
        builder.position_at_end(llvm_block);
        let mut entries = Vec::with_capacity(ids.len());
        for &id in ids {
            let ty = function.var_type(id).ok_or_else(|| LowerError::PhiOnNonDef {
                function: function_name.to_string(),
                block: block_id,
                var_id: id,
            })?;
            let llvm_ty = types.translate(ctx, ty)?;
            let phi = builder.build_phi(llvm_ty, &format!("phi{id}"))?;
            trace!(block = block_id, var_id = id, "created phi");
            entries.push((id, phi));
        }
        block_phis.insert(block_id, entries);
    }

    let mut lowering = Lowering {
        ctx,
        builder: &builder,
        llvm_module,
        types,
        decls,
        collaborators,
        function_name,
        function,
        llvm_blocks,
        block_phis,
        visited: HashSet::new(),
    };

    // Pre-step: the synthetic `entry` block's branch into the CFG's entry
    // node is itself an incoming edge for any phi planted there.
    lowering.wire_incoming(function.cfg.entry, entry_block, &seeded)?;
    lowering.visit(function.cfg.entry, seeded)?;

    Ok(())
}
