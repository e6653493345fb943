//! Language-aware artifact id mangling.
//!
//! Java artifacts pass through untouched. Scala artifacts are suffixed with
//! the binary-compatible major version (`_2.11`, `_2.12`, ...) when mangling
//! is enabled, matching Maven Central's convention for cross-built Scala
//! artifacts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coordinate::{ArtifactOrProject, MavenCoordinate, MavenGroup, Subproject, UnversionedCoordinate};
use crate::error::DepModelError;
use crate::version::Version;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Java,
    Scala { version: Version, mangle: bool, major: String },
}

impl Language {
    pub fn java() -> Self {
        Language::Java
    }

    /// Construct a Scala language marker, deriving the binary-compatible
    /// major (`"2.X"`) from `version`. Only `2.X` or `2.X.Y` with `X >= 10`
    /// are supported; anything else is `UnsupportedScalaVersion`.
    pub fn scala(version: Version, mangle: bool) -> Result<Self, DepModelError> {
        let major = scala_major(&version)?;
        Ok(Language::Scala { version, mangle, major })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Scala { .. } => "scala",
        }
    }

    /// Mangle a bare artifact id (project, optionally joined with a
    /// subproject) according to this language.
    fn mangle_id(&self, base: &str) -> String {
        match self {
            Language::Java => base.to_string(),
            Language::Scala { mangle: false, .. } => base.to_string(),
            Language::Scala { mangle: true, major, .. } => format!("{base}_{major}"),
        }
    }

    /// Build the unversioned coordinate for `group` + `project[-subproject]`,
    /// mangled per this language.
    pub fn unversioned(
        &self,
        group: impl Into<MavenGroup>,
        project: &ArtifactOrProject,
        subproject: Option<&Subproject>,
    ) -> UnversionedCoordinate {
        let base = match subproject {
            Some(s) if !s.is_bare() => format!("{project}-{s}"),
            _ => project.to_string(),
        };
        UnversionedCoordinate::new(group.into(), self.mangle_id(&base))
    }

    pub fn maven_coord(
        &self,
        group: impl Into<MavenGroup>,
        project: &ArtifactOrProject,
        subproject: Option<&Subproject>,
        version: Version,
    ) -> MavenCoordinate {
        self.unversioned(group, project, subproject).with_version(version)
    }

    /// Strip this language's mangling suffix from an artifact id, if present.
    /// Java has no mangling, so this is always `None` for `Language::Java`.
    pub fn remove_suffix(&self, artifact: &str) -> Option<String> {
        match self {
            Language::Java => None,
            Language::Scala { major, .. } => artifact.strip_suffix(&format!("_{major}")).map(str::to_string),
        }
    }

    /// Does this unversioned coordinate's artifact already carry this
    /// language's mangling suffix?
    pub fn ends_with_scala_version(&self, coord: &UnversionedCoordinate) -> bool {
        match self {
            Language::Java => false,
            Language::Scala { major, .. } => coord.artifact.as_str().ends_with(&format!("_{major}")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn scala_major(version: &Version) -> Result<String, DepModelError> {
    let raw = version.as_str();
    let parts: Vec<&str> = raw.split('.').collect();
    if !(parts.len() == 2 || parts.len() == 3) || parts[0] != "2" {
        return Err(DepModelError::UnsupportedScalaVersion(raw.to_string()));
    }
    let minor: u32 = parts[1]
        .parse()
        .map_err(|_| DepModelError::UnsupportedScalaVersion(raw.to_string()))?;
    if minor < 10 {
        return Err(DepModelError::UnsupportedScalaVersion(raw.to_string()));
    }
    Ok(format!("2.{minor}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scala_mangles_with_major_version() {
        let lang = Language::scala(Version::new("2.11.11"), true).unwrap();
        let uv = lang.unversioned("g", &ArtifactOrProject::from("a"), None);
        assert_eq!(uv.artifact.as_str(), "a_2.11");
    }

    #[test]
    fn scala_without_mangle_leaves_artifact_bare() {
        let lang = Language::scala(Version::new("2.11.11"), false).unwrap();
        let uv = lang.unversioned("g", &ArtifactOrProject::from("a"), None);
        assert_eq!(uv.artifact.as_str(), "a");
    }

    #[test]
    fn java_never_mangles() {
        let uv = Language::java().unversioned("g", &ArtifactOrProject::from("a"), None);
        assert_eq!(uv.artifact.as_str(), "a");
    }

    #[test]
    fn remove_suffix_strips_major_version() {
        let lang = Language::scala(Version::new("2.12.0"), true).unwrap();
        assert_eq!(lang.remove_suffix("foo_2.12"), Some("foo".to_string()));
        assert_eq!(lang.remove_suffix("foo"), None);
    }

    #[test]
    fn java_remove_suffix_is_always_none() {
        assert_eq!(Language::java().remove_suffix("foo_2.12"), None);
    }

    #[test]
    fn scala_version_below_ten_is_unsupported() {
        assert!(Language::scala(Version::new("2.9.3"), true).is_err());
    }

    #[test]
    fn non_2x_scala_version_is_unsupported() {
        assert!(Language::scala(Version::new("3.1.0"), true).is_err());
        assert!(Language::scala(Version::new("2"), true).is_err());
    }

    #[test]
    fn ends_with_scala_version_checks_suffix() {
        let lang = Language::scala(Version::new("2.11.11"), true).unwrap();
        let coord = UnversionedCoordinate::new("g", "a_2.11");
        assert!(lang.ends_with_scala_version(&coord));
        let coord2 = UnversionedCoordinate::new("g", "a");
        assert!(!lang.ends_with_scala_version(&coord2));
    }
}
