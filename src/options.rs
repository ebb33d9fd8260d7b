/// Module-level knobs for a single `toLLVM` run. These are properties of
/// the *run*, not of the MidIR module itself, so they live outside the
/// module data model.
#[derive(Debug, Clone)]
pub struct LowerOptions {
    pub target_triple: Option<String>,
    pub data_layout: Option<String>,
    /// Whether AccessorEmitter runs at all. Callers lowering a
    /// module with no GC-tracked types may disable this to skip emitting
    /// declarations no call site will ever reference.
    pub emit_accessors: bool,
}

impl Default for LowerOptions {
    fn default() -> Self {
        LowerOptions {
            target_triple: None,
            data_layout: None,
            emit_accessors: true,
        }
    }
}
