//! Maven coordinate identities: groups, artifacts, subprojects, and the
//! versioned/unversioned coordinate pairs the rest of the crate keys on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DepModelError;
use crate::version::Version;

/// A dotted Maven group identifier, e.g. `com.google.guava`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MavenGroup(pub String);

impl MavenGroup {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MavenGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Into<String>> From<S> for MavenGroup {
    fn from(s: S) -> Self {
        MavenGroup(s.into())
    }
}

/// An artifact or project identifier that may carry a `-`-delimited
/// subproject suffix, e.g. `akka-actor` read as project `akka` + subproject
/// `actor`, or as one opaque artifact `akka-actor` with no subproject at all.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactOrProject(pub String);

impl ArtifactOrProject {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// All ways to split `a-b-c-d` into a leading project and a trailing
    /// subproject: `(a, b-c-d)`, `(a-b, c-d)`, `(a-b-c, d)`. The split never
    /// produces an empty project or an empty subproject, and a string with
    /// no `-` yields no splits at all.
    pub fn split_subprojects(&self) -> Vec<(ArtifactOrProject, Subproject)> {
        let parts: Vec<&str> = self.0.split('-').collect();
        let mut out = Vec::new();
        for i in 1..parts.len() {
            let project = parts[..i].join("-");
            let subproject = parts[i..].join("-");
            out.push((ArtifactOrProject(project), Subproject(subproject)));
        }
        out
    }
}

impl fmt::Display for ArtifactOrProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Into<String>> From<S> for ArtifactOrProject {
    fn from(s: S) -> Self {
        ArtifactOrProject(s.into())
    }
}

/// One member of a module group, e.g. the `actor` in `akka-actor`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subproject(pub String);

impl Subproject {
    /// The sentinel subproject representing "the bare artifact, no module
    /// suffix", used by `ProjectRecord::combine_modules` when fusing a
    /// moduled record with a bare one (`spec.md` §4.2).
    pub const BARE: &'static str = "";

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_bare(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Subproject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Into<String>> From<S> for Subproject {
    fn from(s: S) -> Self {
        Subproject(s.into())
    }
}

/// A fully mangled Maven artifact id: a project, optionally joined with a
/// subproject by `-`, optionally suffixed by a language mangler (e.g.
/// `_2.11` for Scala).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MavenArtifactId(pub String);

impl MavenArtifactId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MavenArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Maven coordinate without a version: `group:artifactId`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnversionedCoordinate {
    pub group: MavenGroup,
    pub artifact: MavenArtifactId,
}

impl UnversionedCoordinate {
    pub fn new(group: impl Into<MavenGroup>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: MavenArtifactId(artifact.into()),
        }
    }

    pub fn with_version(&self, version: Version) -> MavenCoordinate {
        MavenCoordinate {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            version,
        }
    }

    /// A filesystem/Bazel-repository-safe name: `.`, `-`, `:` become `_`.
    pub fn repo_name(&self) -> String {
        sanitize(&format!("{}:{}", self.group, self.artifact), &['.', '-', ':'])
    }

    /// The `jar/<group-as-path>/<artifact>` Bazel binding name, fully
    /// sanitized (`.`, `-`, `/` all become `_`).
    pub fn binding_name(&self) -> String {
        let path = format!("jar/{}/{}", self.group.as_str().replace('.', "/"), self.artifact);
        sanitize(&path, &['.', '-', '/'])
    }
}

fn sanitize(s: &str, targets: &[char]) -> String {
    s.chars()
        .map(|c| if targets.contains(&c) { '_' } else { c })
        .collect()
}

impl fmt::Display for UnversionedCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

impl FromStr for UnversionedCoordinate {
    type Err = DepModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact] => Ok(UnversionedCoordinate::new(*group, *artifact)),
            _ => Err(DepModelError::CoordinateShape(s.to_string())),
        }
    }
}

/// A full Maven coordinate: `group:artifactId:version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MavenCoordinate {
    pub group: MavenGroup,
    pub artifact: MavenArtifactId,
    pub version: Version,
}

impl MavenCoordinate {
    pub fn unversioned(&self) -> UnversionedCoordinate {
        UnversionedCoordinate {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
        }
    }
}

impl fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl FromStr for MavenCoordinate {
    type Err = DepModelError;

    /// `MavenCoordinate::parse(s)`: split on `:`; exactly three parts is
    /// valid, anything else is a `CoordinateShape` error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version] => Ok(MavenCoordinate {
                group: MavenGroup(group.to_string()),
                artifact: MavenArtifactId(artifact.to_string()),
                version: Version::new(*version),
            }),
            _ => Err(DepModelError::CoordinateShape(s.to_string())),
        }
    }
}

impl PartialEq for MavenCoordinate {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group && self.artifact == other.artifact && self.version == other.version
    }
}

impl Eq for MavenCoordinate {}

impl PartialOrd for MavenCoordinate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MavenCoordinate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.group, &self.artifact, &self.version).cmp(&(&other.group, &other.artifact, &other.version))
    }
}

/// An in-repo build target a coordinate is redirected to, e.g.
/// `//3rdparty/jvm/com/google/guava:guava`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BazelTarget(pub String);

impl BazelTarget {
    pub fn parse(s: impl Into<String>) -> Result<Self, DepModelError> {
        let s = s.into();
        if s.starts_with("//") && s.contains(':') {
            Ok(BazelTarget(s))
        } else {
            Err(DepModelError::InvalidBuildTarget(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BazelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
