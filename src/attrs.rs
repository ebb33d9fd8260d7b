use bitflags::bitflags;
use inkwell::attributes::AttributeLoc;
use inkwell::context::Context;
use inkwell::values::FunctionValue;
use num_enum::TryFromPrimitive;

bitflags! {
    /// The LLVM function attributes AccessorEmitter applies. Kept as a
    /// bitflags set so a caller can combine read/write attribute sets with
    /// ordinary `|`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessorAttrs: u8 {
        const NOUNWIND     = 0b001;
        const READONLY     = 0b010;
        const ALWAYSINLINE = 0b100;
    }
}

impl AccessorAttrs {
    pub fn read() -> Self {
        AccessorAttrs::NOUNWIND | AccessorAttrs::READONLY | AccessorAttrs::ALWAYSINLINE
    }

    pub fn write() -> Self {
        AccessorAttrs::NOUNWIND | AccessorAttrs::ALWAYSINLINE
    }

    fn names(self) -> impl Iterator<Item = &'static str> {
        [
            (AccessorAttrs::NOUNWIND, "nounwind"),
            (AccessorAttrs::READONLY, "readonly"),
            (AccessorAttrs::ALWAYSINLINE, "alwaysinline"),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
    }
}

/// Applies `attrs` to `function` as LLVM enum attributes on the function
/// itself (not a parameter or the return value).
pub fn apply_function_attrs<'ctx>(ctx: &'ctx Context, function: FunctionValue<'ctx>, attrs: AccessorAttrs) {
    for name in attrs.names() {
        let kind_id = inkwell::attributes::Attribute::get_named_enum_kind_id(name);
        let attr = ctx.create_enum_attribute(kind_id, 0);
        function.add_attribute(AttributeLoc::Function, attr);
    }
}

/// The canonical LLVM integer widths that map to LLVM's built-in sized
/// integer types. Any other width falls back to
/// `ctx.custom_width_int_type(width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum CanonicalIntWidth {
    W1 = 1,
    W8 = 8,
    W16 = 16,
    W32 = 32,
    W64 = 64,
}
