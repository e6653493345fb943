//! A small error-accumulating applicative.
//!
//! Every combine-family operation in this crate (`ProjectRecord::combine_modules`,
//! `Dependencies::combine`, `Replacements::combine`, `Model::combine`) needs to
//! report *every* independent failure it finds, not just the first one. A plain
//! `Result<T, E>` short-circuits on the first `Err` and throws away the rest, so
//! we use this instead: it behaves like `Result` for the happy path but merges
//! error lists when combining two failed values.
//!
//! The fold across a non-empty list of `Model`s (`spec.md` §4.5) is the one
//! place that *does* want short-circuiting: it stops at the first failing
//! pairwise combine. That's plain `Result`-style `?` over `Validated::into_result`.

use crate::error::DepModelError;

/// Either a value, or a non-empty list of errors collected independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated<T> {
    Valid(T),
    Invalid(Vec<DepModelError>),
}

impl<T> Validated<T> {
    pub fn valid(value: T) -> Self {
        Validated::Valid(value)
    }

    pub fn invalid(error: DepModelError) -> Self {
        Validated::Invalid(vec![error])
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid(_))
    }

    pub fn errors(&self) -> &[DepModelError] {
        match self {
            Validated::Valid(_) => &[],
            Validated::Invalid(errs) => errs,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        match self {
            Validated::Valid(v) => Validated::Valid(f(v)),
            Validated::Invalid(errs) => Validated::Invalid(errs),
        }
    }

    /// Convert to `Result`, collapsing all accumulated errors into one
    /// `Err` that a caller can short-circuit on with `?`.
    pub fn into_result(self) -> Result<T, Vec<DepModelError>> {
        match self {
            Validated::Valid(v) => Ok(v),
            Validated::Invalid(errs) => Err(errs),
        }
    }

    /// Combine `self` with `other`, keeping `f(a, b)` only if both sides are
    /// valid; otherwise accumulate errors from *both* sides.
    pub fn combine_with<U, R>(self, other: Validated<U>, f: impl FnOnce(T, U) -> R) -> Validated<R> {
        match (self, other) {
            (Validated::Valid(a), Validated::Valid(b)) => Validated::Valid(f(a, b)),
            (Validated::Valid(_), Validated::Invalid(e)) => Validated::Invalid(e),
            (Validated::Invalid(e), Validated::Valid(_)) => Validated::Invalid(e),
            (Validated::Invalid(mut e1), Validated::Invalid(e2)) => {
                e1.extend(e2);
                Validated::Invalid(e1)
            }
        }
    }
}

/// Accumulate a batch of independent `Validated` computations into one
/// `Validated<Vec<T>>`, collecting every error across the whole batch rather
/// than stopping at the first.
pub fn sequence<T>(items: impl IntoIterator<Item = Validated<T>>) -> Validated<Vec<T>> {
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for item in items {
        match item {
            Validated::Valid(v) => {
                if errors.is_empty() {
                    values.push(v);
                }
            }
            Validated::Invalid(e) => errors.extend(e),
        }
    }
    if errors.is_empty() {
        Validated::Valid(values)
    } else {
        Validated::Invalid(errors)
    }
}
