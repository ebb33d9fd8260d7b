use midir_llvm_lower::ir::{Effective, Mutability};

/// `mutable ∧ Immutable = const`; once const, stays const
/// regardless of what follows; anything else along the path is mutable.
#[test]
fn combine_rules() {
    assert_eq!(Effective::Mutable.combine(&Mutability::Immutable), Effective::Const);
    assert_eq!(Effective::Mutable.combine(&Mutability::Mutable), Effective::Mutable);
    assert_eq!(Effective::Mutable.combine(&Mutability::WriteOnce), Effective::Mutable);
    assert_eq!(
        Effective::Mutable.combine(&Mutability::Custom("frozen".to_string())),
        Effective::Mutable
    );

    // Const is absorbing: once reached, further fields cannot undo it.
    assert_eq!(Effective::Const.combine(&Mutability::Mutable), Effective::Const);
    assert_eq!(Effective::Const.combine(&Mutability::Immutable), Effective::Const);
}
