//! `Model`: the top-level value this crate produces — options, the
//! dependency map, and replacements, combined as one unit.

use serde::{Deserialize, Serialize};

use crate::dependencies::Dependencies;
use crate::error::DepModelError;
use crate::options::Options;
use crate::replacements::Replacements;
use crate::validated::Validated;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub options: Options,
    pub dependencies: Dependencies,
    pub replacements: Replacements,
}

impl Model {
    pub fn new(options: Options, dependencies: Dependencies, replacements: Replacements) -> Self {
        Self {
            options,
            dependencies,
            replacements,
        }
    }

    /// Combine two models (`spec.md` §4.5): options combine first (always
    /// succeeds, and its result supplies the version-conflict policy the
    /// dependency merge needs), then dependencies, then replacements —
    /// errors from the dependency and replacement merges are accumulated
    /// together rather than stopping at the first.
    pub fn combine(&self, other: &Model) -> Validated<Model> {
        let options = self.options.combine(&other.options);
        let policy = options.effective_version_conflict_policy();
        tracing::debug!("combining two models under {:?}", policy);
        let deps = self.dependencies.combine(&other.dependencies, policy);
        let reps = self.replacements.combine(&other.replacements);
        deps.combine_with(reps, |dependencies, replacements| Model {
            options,
            dependencies,
            replacements,
        })
    }

    /// Fold `combine` across a non-empty sequence of models, left to right.
    /// Unlike a single `combine`, this short-circuits at the first failing
    /// pairwise merge rather than accumulating errors across the whole
    /// sequence.
    pub fn combine_all(models: &[Model]) -> Result<Model, Vec<DepModelError>> {
        let mut iter = models.iter();
        let Some(first) = iter.next() else {
            return Ok(Model::default());
        };
        let mut acc = first.clone();
        for next in iter {
            acc = acc.combine(next).into_result()?;
        }
        Ok(acc)
    }
}
