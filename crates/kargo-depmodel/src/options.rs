//! `Options`: global knobs that aren't a dependency declaration by
//! themselves but govern how the rest of the model combines and renders.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DepModelError;
use crate::language::Language;
use crate::policy::{Transitivity, VersionConflictPolicy};
use crate::version::Version;

/// The repo-relative directory generated build rules are written under,
/// e.g. `3rdparty/jvm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryName(pub String);

impl DirectoryName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DirectoryName {
    fn default() -> Self {
        DirectoryName("3rdparty/jvm".to_string())
    }
}

impl fmt::Display for DirectoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Into<String>> From<S> for DirectoryName {
    fn from(s: S) -> Self {
        DirectoryName(s.into())
    }
}

/// A Maven server consulted when resolving coordinates, e.g. Maven Central.
/// Out of scope here beyond carrying the declared shape through combine and
/// rendering (`spec.md` §1: network resolution itself is an external
/// collaborator's concern).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolver {
    pub id: String,
    pub kind: String,
    pub url: String,
}

impl Resolver {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            url: url.into(),
        }
    }

    fn central() -> Self {
        Resolver::new("central", "default", "http://central.maven.org/maven2/")
    }
}

/// Options shared across an entire model. Every field is absent by default;
/// `Options::default()` is a true identity for `combine`, and the
/// documented defaults (`spec.md` §3) are applied only when *reading* a
/// field, via the `effective_*` accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub directory: Option<DirectoryName>,
    pub version_conflict_policy: Option<VersionConflictPolicy>,
    pub transitivity: Option<Transitivity>,
    pub default_scala_version: Option<Version>,
    pub default_scala_mangle: Option<bool>,
    pub resolvers: Vec<Resolver>,
    pub build_header: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            directory: None,
            version_conflict_policy: None,
            transitivity: None,
            default_scala_version: None,
            default_scala_mangle: None,
            resolvers: Vec::new(),
            build_header: Vec::new(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// The directory generated build rules are written under when unset:
    /// `3rdparty/jvm`.
    pub fn effective_directory(&self) -> DirectoryName {
        self.directory.clone().unwrap_or_default()
    }

    /// The version-conflict policy applied when unset: `Highest`, the
    /// laxest policy.
    pub fn effective_version_conflict_policy(&self) -> VersionConflictPolicy {
        self.version_conflict_policy.unwrap_or_default()
    }

    /// The transitivity applied when unset. This is `Exports`
    /// (`spec.md` §3's reading default), which is *not* the same as
    /// `Transitivity::default()` (`RuntimeDeps`, the monoid identity used
    /// by [`Transitivity::combine`]).
    pub fn effective_transitivity(&self) -> Transitivity {
        self.transitivity.unwrap_or(Transitivity::Exports)
    }

    /// Whether generated Scala artifact names are mangled when unset: `true`.
    pub fn effective_default_scala_mangle(&self) -> bool {
        self.default_scala_mangle.unwrap_or(true)
    }

    /// The resolvers consulted when none were declared: Maven Central alone.
    pub fn effective_resolvers(&self) -> Vec<Resolver> {
        if self.resolvers.is_empty() {
            vec![Resolver::central()]
        } else {
            self.resolvers.clone()
        }
    }

    /// Resolve a language name (`"java"`, `"scala"`) to a constructed
    /// `Language` using this set of options' defaults. `"scala"` falls back
    /// to `2.11.11` when `default_scala_version` is unset (`spec.md` §3's
    /// default language set is `{Java, Scala(2.11.11, mangle=true)}`).
    pub fn language_by_name(&self, name: &str) -> Result<Language, DepModelError> {
        match name {
            "java" => Ok(Language::java()),
            "scala" => {
                let version = self.default_scala_version.clone().unwrap_or_else(|| Version::new("2.11.11"));
                Language::scala(version, self.effective_default_scala_mangle())
            }
            other => Err(DepModelError::UnsupportedScalaVersion(format!("unknown language {other}"))),
        }
    }

    /// Combine two option sets (`spec.md` §8): the right-hand directory
    /// wins when declared, the stricter version-conflict policy wins when
    /// both sides declare one, transitivity combines as a monoid when both
    /// sides declare one, and `resolvers`/`build_header` are concatenated
    /// then deduplicated, preserving first occurrence. A field absent on
    /// both sides stays absent, so `Options::default()` is a true identity.
    pub fn combine(&self, other: &Options) -> Options {
        Options {
            directory: other.directory.clone().or_else(|| self.directory.clone()),
            version_conflict_policy: match (self.version_conflict_policy, other.version_conflict_policy) {
                (Some(a), Some(b)) => Some(a.combine(b)),
                (a, None) => a,
                (None, b) => b,
            },
            transitivity: match (self.transitivity, other.transitivity) {
                (Some(a), Some(b)) => Some(a.combine(b)),
                (a, None) => a,
                (None, b) => b,
            },
            default_scala_version: other.default_scala_version.clone().or_else(|| self.default_scala_version.clone()),
            default_scala_mangle: other.default_scala_mangle.or(self.default_scala_mangle),
            resolvers: dedup_concat(&self.resolvers, &other.resolvers),
            build_header: dedup_concat(&self.build_header, &other.build_header),
        }
    }
}

/// Concatenate `a` then `b`, dropping later duplicates so the first
/// occurrence of an equal value wins its position (`spec.md` §8).
fn dedup_concat<T: Clone + PartialEq>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for s in a.iter().chain(b.iter()) {
        if !out.contains(s) {
            out.push(s.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directory_is_3rdparty_jvm() {
        assert_eq!(Options::default().effective_directory().as_str(), "3rdparty/jvm");
    }

    #[test]
    fn combine_right_hand_directory_wins() {
        let a = Options {
            directory: Some(DirectoryName::from("a")),
            ..Options::default()
        };
        let b = Options {
            directory: Some(DirectoryName::from("b")),
            ..Options::default()
        };
        assert_eq!(a.combine(&b).directory, Some(DirectoryName::from("b")));
    }

    #[test]
    fn combine_right_hand_directory_passes_through_when_unset() {
        let a = Options {
            directory: Some(DirectoryName::from("a")),
            ..Options::default()
        };
        let b = Options::default();
        assert_eq!(a.combine(&b).directory, Some(DirectoryName::from("a")));
    }

    #[test]
    fn combine_stricter_policy_wins() {
        let a = Options {
            version_conflict_policy: Some(VersionConflictPolicy::Highest),
            ..Options::default()
        };
        let b = Options {
            version_conflict_policy: Some(VersionConflictPolicy::Fail),
            ..Options::default()
        };
        assert_eq!(a.combine(&b).version_conflict_policy, Some(VersionConflictPolicy::Fail));
    }

    #[test]
    fn combine_dedups_resolvers_preserving_first_occurrence() {
        let sonatype = Resolver::new("sonatype", "default", "https://oss.sonatype.org/content/repositories/snapshots/");
        let jcenter = Resolver::new("jcenter", "default", "https://jcenter.bintray.com/");
        let a = Options {
            resolvers: vec![Resolver::central(), sonatype.clone()],
            ..Options::default()
        };
        let b = Options {
            resolvers: vec![sonatype.clone(), jcenter.clone()],
            ..Options::default()
        };
        assert_eq!(a.combine(&b).resolvers, vec![Resolver::central(), sonatype, jcenter]);
    }

    #[test]
    fn default_resolvers_is_maven_central() {
        assert_eq!(Options::default().effective_resolvers(), vec![Resolver::central()]);
    }

    #[test]
    fn default_transitivity_reading_default_is_exports() {
        // `spec.md` §3's reading default for transitivity is `Exports`, distinct
        // from `Transitivity::default()` (`RuntimeDeps`), which is only the
        // monoid combine-identity.
        assert_eq!(Options::default().effective_transitivity(), Transitivity::Exports);
        assert_eq!(Transitivity::default(), Transitivity::RuntimeDeps);
    }

    #[test]
    fn language_by_name_scala_falls_back_to_2_11_11_when_unset() {
        // `spec.md` §3's default language set is `{Java, Scala(2.11.11, mangle=true)}`.
        assert!(Options::default().language_by_name("scala").is_ok());
        let scala = Options::default().language_by_name("scala").unwrap();
        assert_eq!(scala, Language::scala(Version::new("2.11.11"), true).unwrap());
    }

    #[test]
    fn language_by_name_java_always_succeeds() {
        assert!(Options::default().language_by_name("java").is_ok());
    }

    #[test]
    fn default_is_a_combine_identity() {
        let opts = Options {
            directory: Some(DirectoryName::from("custom")),
            version_conflict_policy: Some(VersionConflictPolicy::Fail),
            transitivity: Some(Transitivity::Exports),
            default_scala_version: Some(Version::new("2.12.8")),
            default_scala_mangle: Some(false),
            resolvers: vec![Resolver::new("sonatype", "default", "https://oss.sonatype.org/")],
            build_header: vec!["load(...)".to_string()],
        };
        assert_eq!(opts.combine(&Options::default()), opts);
        assert_eq!(Options::default().combine(&opts), opts);
    }
}
