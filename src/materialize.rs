use inkwell::context::Context;
use inkwell::types::{AnyTypeEnum, BasicType, BasicTypeEnum};
use inkwell::AddressSpace;
use tracing::{debug, trace};

use crate::attrs::CanonicalIntWidth;
use crate::error::{LowerError, Result};
use crate::ir::module::Module;
use crate::ir::types::{FloatWidth, NamedType, Type};

#[derive(Clone, Copy)]
enum Slot<'ctx> {
    /// Struct-or-absent bodies are seeded with a named opaque struct in
    /// phase 1; `structSetBody` mutates the same handle in place, so this
    /// variant also represents the post-phase-2 filled state.
    Struct(inkwell::types::StructType<'ctx>),
    /// Non-struct bodies have no phase-1 representative.
    Pending,
    /// Currently being resolved; seeing this again means a type cycle with
    /// no intervening struct.
    InProgress,
    /// Non-struct bodies after phase 2.
    Filled(AnyTypeEnum<'ctx>),
}

/// The read-only table TypeMaterialiser produces: one LLVM type per MidIR
/// named-type index.
pub struct TypeTable<'ctx> {
    slots: Vec<Slot<'ctx>>,
}

impl<'ctx> TypeTable<'ctx> {
    /// The LLVM type for named-type index `i`, as an `AnyTypeEnum`. May be
    /// an opaque (body-less) struct if `i` is a forward declaration that
    /// was never filled — pointers through an opaque type are the only
    /// guaranteed-safe use of such a type.
    pub fn get(&self, i: u32) -> Result<AnyTypeEnum<'ctx>> {
        let slot = *self
            .slots
            .get(i as usize)
            .ok_or(LowerError::DanglingTypeIndex { referrer: u32::MAX, index: i })?;
        match slot {
            Slot::Struct(s) => Ok(s.into()),
            Slot::Filled(t) => Ok(t),
            Slot::Pending | Slot::InProgress => {
                unreachable!("type #{i} was read before being filled by phase 2")
            }
        }
    }

    pub fn get_struct(&self, i: u32) -> Option<inkwell::types::StructType<'ctx>> {
        match self.slots.get(i as usize) {
            Some(Slot::Struct(s)) => Some(*s),
            _ => None,
        }
    }

    /// Translates an arbitrary MidIR `Type` to its LLVM `BasicTypeEnum`,
    /// for on-demand use outside the named-type table (function parameter
    /// and return types, GC header targets, accessor leaf/index types).
    pub fn translate(&self, ctx: &'ctx Context, ty: &Type) -> Result<BasicTypeEnum<'ctx>> {
        any_to_basic(self.translate_any(ctx, ty)?)
    }

    fn translate_any(&self, ctx: &'ctx Context, ty: &Type) -> Result<AnyTypeEnum<'ctx>> {
        Ok(match ty {
            Type::Int { width, .. } => AnyTypeEnum::IntType(int_type(ctx, *width)?),
            Type::Float(w) => AnyTypeEnum::FloatType(float_type(ctx, *w)),
            Type::Array { size, element } => {
                let elem = any_to_basic(self.translate_any(ctx, element)?)?;
                let n = size.unwrap_or(0);
                AnyTypeEnum::ArrayType(elem.array_type(n as u32))
            }
            Type::Ptr(_) => AnyTypeEnum::PointerType(ctx.ptr_type(AddressSpace::default())),
            Type::Named(i) => self.get(*i)?,
            Type::Struct(s) => {
                let mut fields = Vec::with_capacity(s.fields.len());
                for f in &s.fields {
                    fields.push(any_to_basic(self.translate_any(ctx, &f.ty)?)?);
                }
                AnyTypeEnum::StructType(ctx.struct_type(&fields, s.packed))
            }
        })
    }
}

fn any_to_basic(t: AnyTypeEnum<'_>) -> Result<BasicTypeEnum<'_>> {
    BasicTypeEnum::try_from(t).map_err(|_| LowerError::StructureMismatch {
        function: "<type translation>".into(),
        var_id: 0,
    })
}

fn int_type<'ctx>(ctx: &'ctx Context, width: u32) -> Result<inkwell::types::IntType<'ctx>> {
    const MAX_INT_WIDTH: u32 = 1 << 23;
    Ok(match CanonicalIntWidth::try_from(width) {
        Ok(CanonicalIntWidth::W1) => ctx.bool_type(),
        Ok(CanonicalIntWidth::W8) => ctx.i8_type(),
        Ok(CanonicalIntWidth::W16) => ctx.i16_type(),
        Ok(CanonicalIntWidth::W32) => ctx.i32_type(),
        Ok(CanonicalIntWidth::W64) => ctx.i64_type(),
        Err(_) if width > 0 && width <= MAX_INT_WIDTH => ctx.custom_width_int_type(width),
        Err(_) => {
            return Err(LowerError::UnsupportedWidth {
                type_index: u32::MAX,
                width,
            })
        }
    })
}

fn float_type<'ctx>(ctx: &'ctx Context, w: FloatWidth) -> inkwell::types::FloatType<'ctx> {
    match w {
        FloatWidth::F32 => ctx.f32_type(),
        FloatWidth::F64 => ctx.f64_type(),
        FloatWidth::F128 => ctx.f128_type(),
    }
}

/// Resolves `index`, recursively filling its slot on demand if it is still
/// `Pending`. Used by phase 2 so struct/alias bodies may reference a
/// not-yet-visited later index in the table.
fn resolve<'ctx>(ctx: &'ctx Context, module: &Module, slots: &mut [Slot<'ctx>], index: u32) -> Result<()> {
    match slots[index as usize] {
        Slot::Struct(_) | Slot::Filled(_) => Ok(()),
        Slot::InProgress => Err(LowerError::UnbrokenTypeCycle { index }),
        Slot::Pending => {
            slots[index as usize] = Slot::InProgress;
            let body = module.types[index as usize]
                .body
                .as_ref()
                .expect("Pending slots only exist for entries with a non-struct body");
            let resolved = translate_filling(ctx, module, slots, body, index)?;
            slots[index as usize] = Slot::Filled(resolved);
            Ok(())
        }
    }
}

/// Like `TypeTable::translate_any`, but resolves `Named` references through
/// `resolve` rather than assuming phase 1/2 already visited them in index
/// order — the mechanism that lets phase 2 tolerate forward references.
fn translate_filling<'ctx>(
    ctx: &'ctx Context,
    module: &Module,
    slots: &mut [Slot<'ctx>],
    ty: &Type,
    origin: u32,
) -> Result<AnyTypeEnum<'ctx>> {
    let map_width_err = |e: LowerError| match e {
        LowerError::UnsupportedWidth { width, .. } => LowerError::UnsupportedWidth {
            type_index: origin,
            width,
        },
        other => other,
    };
    Ok(match ty {
        Type::Int { width, .. } => AnyTypeEnum::IntType(int_type(ctx, *width).map_err(map_width_err)?),
        Type::Float(w) => AnyTypeEnum::FloatType(float_type(ctx, *w)),
        Type::Array { size, element } => {
            let elem = any_to_basic(translate_filling(ctx, module, slots, element, origin)?)?;
            AnyTypeEnum::ArrayType(elem.array_type(size.unwrap_or(0) as u32))
        }
        Type::Ptr(_) => AnyTypeEnum::PointerType(ctx.ptr_type(AddressSpace::default())),
        Type::Named(i) => {
            if *i as usize >= module.types.len() {
                return Err(LowerError::DanglingTypeIndex { referrer: origin, index: *i });
            }
            resolve(ctx, module, slots, *i)?;
            match slots[*i as usize] {
                Slot::Struct(s) => s.into(),
                Slot::Filled(t) => t,
                Slot::Pending | Slot::InProgress => unreachable!("resolve() guarantees this is filled"),
            }
        }
        Type::Struct(s) => {
            let mut fields = Vec::with_capacity(s.fields.len());
            for f in &s.fields {
                fields.push(any_to_basic(translate_filling(ctx, module, slots, &f.ty, origin)?)?);
            }
            AnyTypeEnum::StructType(ctx.struct_type(&fields, s.packed))
        }
    })
}

/// Materialises every named type in `module.types` into an LLVM type,
/// resolving mutual recursion by seeding named opaque structs before
/// filling any body.
pub fn materialize_types<'ctx>(ctx: &'ctx Context, module: &Module) -> Result<TypeTable<'ctx>> {
    let mut slots = Vec::with_capacity(module.types.len());

    // Phase 1 — seeding.
    for (i, entry) in module.types.iter().enumerate() {
        let slot = match &entry.body {
            None => Slot::Struct(seed_opaque(ctx, entry)),
            Some(Type::Struct(_)) => Slot::Struct(seed_opaque(ctx, entry)),
            Some(_) => Slot::Pending,
        };
        trace!(index = i, name = %entry.display_name, "seeded type");
        slots.push(slot);
    }

    // Phase 2 — filling, in index order; `resolve` recurses on demand for
    // forward references so order within the pass is not load-bearing.
    for (i, entry) in module.types.iter().enumerate() {
        let i = i as u32;
        match (&entry.body, slots[i as usize]) {
            (Some(Type::Struct(s)), Slot::Struct(opaque)) if opaque.is_opaque() => {
                let mut field_tys = Vec::with_capacity(s.fields.len());
                for f in &s.fields {
                    field_tys.push(any_to_basic(translate_filling(
                        ctx, module, &mut slots, &f.ty, i,
                    )?)?);
                }
                opaque.set_body(&field_tys, s.packed);
            }
            (Some(_), Slot::Pending) => resolve(ctx, module, &mut slots, i)?,
            _ => {}
        }
        debug!(index = i, name = %entry.display_name, "filled type");
    }

    for (i, slot) in slots.iter().enumerate() {
        if matches!(slot, Slot::Pending | Slot::InProgress) {
            return Err(LowerError::UnbrokenTypeCycle { index: i as u32 });
        }
    }

    Ok(TypeTable { slots })
}

fn seed_opaque<'ctx>(ctx: &'ctx Context, entry: &NamedType) -> inkwell::types::StructType<'ctx> {
    ctx.opaque_struct_type(&entry.display_name)
}
