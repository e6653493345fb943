//! Conflict-resolution policies: `VersionConflictPolicy` (a semilattice over
//! strictness) and `Transitivity` (a monoid over how transitive deps are
//! exposed).

use serde::{Deserialize, Serialize};

use crate::error::DepModelError;
use crate::version::Version;

/// How to resolve two declarations of the same coordinate with different
/// versions.
///
/// Forms a semilattice under [`VersionConflictPolicy::combine`] with
/// `Highest` as the identity: combining two policies keeps whichever is
/// stricter (`Fail` beats `Fixed` beats `Highest`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VersionConflictPolicy {
    #[default]
    Highest,
    Fixed,
    Fail,
}

impl VersionConflictPolicy {
    fn rank(self) -> u8 {
        match self {
            VersionConflictPolicy::Highest => 0,
            VersionConflictPolicy::Fixed => 1,
            VersionConflictPolicy::Fail => 2,
        }
    }

    /// The stricter of the two policies wins; `Highest` is the identity.
    pub fn combine(self, other: Self) -> Self {
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }

    /// Resolve two optionally-declared versions of the same coordinate under
    /// this policy. `coordinate` names the key, for error messages only.
    ///
    /// `Fixed(root, s)` only ever returns an element when `root` is present
    /// or `|s| == 1` (`spec.md` §4.8); the dependency merge always calls this
    /// with no root, so two genuinely distinct declared versions under
    /// `Fixed` is a conflict, not a silent "keep the left one".
    pub fn resolve(self, a: Option<&Version>, b: Option<&Version>, coordinate: &str) -> Result<Option<Version>, DepModelError> {
        match (a, b) {
            (None, None) => Ok(None),
            (Some(v), None) | (None, Some(v)) => Ok(Some(v.clone())),
            (Some(x), Some(y)) if x == y => Ok(Some(x.clone())),
            (Some(x), Some(y)) => match self {
                VersionConflictPolicy::Highest => Ok(Some(std::cmp::max(x, y).clone())),
                VersionConflictPolicy::Fixed => {
                    let mut found = [x.clone(), y.clone()];
                    found.sort();
                    let found = found.iter().map(Version::to_string).collect::<Vec<_>>().join(", ");
                    Err(DepModelError::VersionConflict(format!(
                        "{coordinate}: fixed requires 1, or a declared version, found: {found}"
                    )))
                }
                VersionConflictPolicy::Fail => Err(DepModelError::VersionConflict(format!(
                    "{coordinate}: conflicting versions {x} and {y}"
                ))),
            },
        }
    }
}

/// How transitive dependencies of a declared artifact are exposed to its
/// dependents.
///
/// Forms a monoid under [`Transitivity::combine`] with `RuntimeDeps` as the
/// identity: once any side asks for `Exports`, the combined value exposes
/// exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transitivity {
    #[default]
    RuntimeDeps,
    Exports,
}

impl Transitivity {
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Transitivity::Exports, _) | (_, Transitivity::Exports) => Transitivity::Exports,
            _ => Transitivity::RuntimeDeps,
        }
    }
}
