//! Comparison rules between a desired spec and an observed upstream state.
//!
//! Every resource kind spells out its own comparison instead of walking
//! struct fields generically, so renaming or reordering fields can never
//! silently change what counts as drift.

/// Canonical form of a value before comparison.
///
/// Typically strips upstream-owned fields and folds equivalent
/// representations together.
pub trait Normalize: Sized {
    fn normalize(self) -> Self;
}

/// Partial ("contains") equality: every field the desired value sets must
/// match the observed value. Unset fields are wildcards.
pub trait Subset {
    fn is_subset_of(&self, observed: &Self) -> bool;
}

/// One tri-state field of a [`Subset`] comparison.
///
/// `None` on the desired side matches anything; `Some` requires an equal,
/// present observed value.
pub fn field_matches<T: PartialEq>(desired: &Option<T>, observed: &Option<T>) -> bool {
    match desired {
        None => true,
        Some(want) => observed.as_ref() == Some(want),
    }
}

/// Whole-value containment. A missing desired value is always in sync; a
/// desired value against a missing observed value never is.
pub fn contained_in<T: Subset>(desired: Option<&T>, observed: Option<&T>) -> bool {
    match (desired, observed) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(want), Some(have)) => want.is_subset_of(have),
    }
}

/// Full equality after normalizing both sides.
pub fn semantic_eq<T: Normalize + Clone + PartialEq>(this: &T, that: &T) -> bool {
    this.clone().normalize() == that.clone().normalize()
}
