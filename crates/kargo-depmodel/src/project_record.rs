//! `ProjectRecord`: a single declared artifact (or module group of
//! artifacts) under one `group:project` key.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::coordinate::{ArtifactOrProject, MavenCoordinate, MavenGroup, Subproject, UnversionedCoordinate};
use crate::language::Language;
use crate::version::Version;

/// A `(group, artifact)` pair as referenced by `exports`/`exclude` — these
/// name another declared project, not yet resolved to a mangled artifact id.
pub type GroupArtifact = (MavenGroup, ArtifactOrProject);

/// A declared third-party dependency: one artifact, or (if `modules` is
/// set) the cross-product of one project with several subproject suffixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub lang: Language,
    pub version: Option<Version>,
    pub modules: Option<BTreeSet<Subproject>>,
    pub exports: BTreeSet<GroupArtifact>,
    pub exclude: BTreeSet<GroupArtifact>,
}

impl ProjectRecord {
    pub fn new(lang: Language) -> Self {
        Self {
            lang,
            version: None,
            modules: None,
            exports: BTreeSet::new(),
            exclude: BTreeSet::new(),
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_modules(mut self, modules: BTreeSet<Subproject>) -> Self {
        self.modules = if modules.is_empty() { None } else { Some(modules) };
        self
    }

    /// The declared module set, or a single sentinel "bare artifact" member
    /// if no `modules` were declared. Every iteration site that needs to walk
    /// "the artifacts this record denotes" goes through this.
    fn modules_or_bare(&self) -> Vec<Subproject> {
        match &self.modules {
            None => vec![Subproject::from(Subproject::BARE)],
            Some(mods) => mods.iter().cloned().collect(),
        }
    }

    /// Expand a record with `modules` set into one record per module, each
    /// keyed by `<ap>-<module>` and with `modules` cleared. A record with no
    /// `modules` flattens to itself under its own key.
    pub fn flatten(&self, ap: &ArtifactOrProject) -> Vec<(ArtifactOrProject, ProjectRecord)> {
        match &self.modules {
            None => vec![(ap.clone(), self.clone())],
            Some(mods) => mods
                .iter()
                .map(|m| {
                    let key = ArtifactOrProject(format!("{ap}-{m}"));
                    let mut rec = self.clone();
                    rec.modules = None;
                    (key, rec)
                })
                .collect(),
        }
    }

    /// Fold this record under a new leading module `m`: if it had no
    /// modules, it becomes `{m}`; otherwise every existing module `s`
    /// becomes `m-s`.
    pub fn with_module(&self, m: &Subproject) -> ProjectRecord {
        let mut rec = self.clone();
        rec.modules = Some(match &rec.modules {
            None => BTreeSet::from([m.clone()]),
            Some(existing) => existing
                .iter()
                .map(|s| Subproject(format!("{m}-{s}")))
                .collect(),
        });
        rec
    }

    /// Fuse two records describing different subprojects of the same
    /// project into one, iff `lang`, `exports`, and `exclude` all match and
    /// the versions are either both absent or both equal (`spec.md` §4.2).
    ///
    /// When exactly one side declared no `modules`, the merged set gains the
    /// bare sentinel subproject so the artifact-sans-subproject member isn't
    /// lost when fusing.
    pub fn combine_modules(&self, other: &ProjectRecord) -> Option<ProjectRecord> {
        if self.lang != other.lang || self.exports != other.exports || self.exclude != other.exclude {
            return None;
        }
        let version = match (&self.version, &other.version) {
            (None, None) => None,
            (Some(a), Some(b)) if a == b => Some(a.clone()),
            _ => return None,
        };

        let modules = match (&self.modules, &other.modules) {
            (None, None) => None,
            (Some(a), None) => Some(bare_union(a, None)),
            (None, Some(b)) => Some(bare_union(b, None)),
            (Some(a), Some(b)) => Some(bare_union(a, Some(b))),
        };

        Some(ProjectRecord {
            lang: self.lang.clone(),
            version,
            modules,
            exports: self.exports.clone(),
            exclude: self.exclude.clone(),
        })
    }

    /// Every versioned Maven coordinate this record denotes under
    /// `group:ap[-module]`. Empty if no version was declared.
    pub fn versioned_dependencies(&self, group: &MavenGroup, ap: &ArtifactOrProject) -> Vec<MavenCoordinate> {
        let Some(version) = &self.version else {
            return Vec::new();
        };
        self.modules_or_bare()
            .into_iter()
            .map(|m| self.lang.maven_coord(group.clone(), ap, Some(&m), version.clone()))
            .collect()
    }

    /// Every unversioned coordinate this record denotes. Always non-empty.
    pub fn all_dependencies(&self, group: &MavenGroup, ap: &ArtifactOrProject) -> Vec<UnversionedCoordinate> {
        self.modules_or_bare()
            .into_iter()
            .map(|m| self.lang.unversioned(group.clone(), ap, Some(&m)))
            .collect()
    }
}

fn bare_union(base: &BTreeSet<Subproject>, other: Option<&BTreeSet<Subproject>>) -> BTreeSet<Subproject> {
    let mut out: BTreeSet<Subproject> = base.clone();
    match other {
        Some(b) => out.extend(b.iter().cloned()),
        None => {
            out.insert(Subproject::from(Subproject::BARE));
        }
    }
    out
}
