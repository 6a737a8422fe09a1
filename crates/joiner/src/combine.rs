//! Merging configuration layers.

use std::path::PathBuf;

/// A value that can be layered over a lower precedence one.
pub trait Combine {
    /// Combine two values, preferring the values in `self`.
    ///
    /// Scalars from the higher precedence layer (`self`) win; an unset optional value falls
    /// through to the lower precedence layer (`other`).
    #[must_use]
    fn combine(self, other: Self) -> Self;
}

macro_rules! impl_combine_or {
    ($name:ty) => {
        impl Combine for Option<$name> {
            fn combine(self, other: Option<$name>) -> Option<$name> {
                self.or(other)
            }
        }
    };
}

impl_combine_or!(bool);
impl_combine_or!(PathBuf);
