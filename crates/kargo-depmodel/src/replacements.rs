//! `Replacements`: redirects from a Maven coordinate to an in-repo build
//! target, merged by strict equality rather than any conflict policy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coordinate::{BazelTarget, UnversionedCoordinate};
use crate::error::DepModelError;
use crate::language::Language;
use crate::validated::{sequence, Validated};

/// One redirect: the language the replaced coordinate was declared under,
/// and the build target it should resolve to instead of a generated
/// `3rdparty` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRecord {
    pub lang: Language,
    pub target: BazelTarget,
}

impl ReplacementRecord {
    pub fn new(lang: Language, target: BazelTarget) -> Self {
        Self { lang, target }
    }
}

/// The full redirect map, keyed by the unversioned coordinate being
/// replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacements {
    entries: BTreeMap<UnversionedCoordinate, ReplacementRecord>,
}

impl Replacements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (UnversionedCoordinate, ReplacementRecord)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, coord: &UnversionedCoordinate) -> Option<&ReplacementRecord> {
        self.entries.get(coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnversionedCoordinate, &ReplacementRecord)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge two replacement maps. A key on only one side passes through
    /// unchanged. A key on both sides must carry strictly equal records; a
    /// mismatch is a `ReplacementCollision`, accumulated alongside every
    /// other collision rather than stopping at the first.
    pub fn combine(&self, other: &Replacements) -> Validated<Replacements> {
        let mut keys: Vec<&UnversionedCoordinate> = self.entries.keys().collect();
        for k in other.entries.keys() {
            if !self.entries.contains_key(k) {
                keys.push(k);
            }
        }
        keys.sort();
        tracing::debug!("merging {} replacement keys", keys.len());

        let merged: Vec<Validated<(UnversionedCoordinate, ReplacementRecord)>> = keys
            .into_iter()
            .map(|key| match (self.entries.get(key), other.entries.get(key)) {
                (Some(a), None) => Validated::valid((key.clone(), a.clone())),
                (None, Some(b)) => Validated::valid((key.clone(), b.clone())),
                (Some(a), Some(b)) if a == b => Validated::valid((key.clone(), a.clone())),
                (Some(a), Some(b)) => Validated::invalid(DepModelError::ReplacementCollision {
                    a: format!("{key} -> {}", a.target),
                    b: format!("{key} -> {}", b.target),
                }),
                (None, None) => unreachable!("key came from one of the two maps"),
            })
            .collect();

        let result = sequence(merged).map(Replacements::from_entries);
        if !result.is_valid() {
            tracing::warn!("replacements merge found {} colliding key(s)", result.errors().len());
        }
        result
    }
}
