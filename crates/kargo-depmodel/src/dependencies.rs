//! `Dependencies`: the full group → artifact → `ProjectRecord` map, its merge
//! rule, and the derived indices/queries built on top of it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coordinate::{ArtifactOrProject, MavenCoordinate, MavenGroup, UnversionedCoordinate};
use crate::error::{DepModelError, ExportUnresolved};
use crate::language::Language;
use crate::policy::VersionConflictPolicy;
use crate::project_record::ProjectRecord;
use crate::validated::{sequence, Validated};

/// The full set of declared third-party dependencies, keyed by group then
/// by artifact-or-project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    groups: BTreeMap<MavenGroup, BTreeMap<ArtifactOrProject, ProjectRecord>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a `Dependencies` straight from a flat list of declarations, with
    /// no merge step — later entries for the same key overwrite earlier ones.
    /// Used by callers (fixtures, doc deserialization) that already hold flat
    /// `(group, artifact, record)` triples and don't need the accumulating
    /// combine logic.
    pub fn from_records(records: impl IntoIterator<Item = (MavenGroup, ArtifactOrProject, ProjectRecord)>) -> Self {
        let mut groups: BTreeMap<MavenGroup, BTreeMap<ArtifactOrProject, ProjectRecord>> = BTreeMap::new();
        for (group, ap, record) in records {
            groups.entry(group).or_default().insert(ap, record);
        }
        Self { groups }
    }

    pub fn get(&self, group: &MavenGroup, ap: &ArtifactOrProject) -> Option<&ProjectRecord> {
        self.groups.get(group)?.get(ap)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MavenGroup, &ArtifactOrProject, &ProjectRecord)> {
        self.groups
            .iter()
            .flat_map(|(g, arts)| arts.iter().map(move |(ap, rec)| (g, ap, rec)))
    }

    fn flatten_all(&self) -> Vec<(MavenGroup, ArtifactOrProject, ProjectRecord)> {
        self.iter()
            .flat_map(|(g, ap, rec)| {
                rec.flatten(ap)
                    .into_iter()
                    .map(move |(flat_ap, flat_rec)| (g.clone(), flat_ap, flat_rec))
            })
            .collect()
    }

    /// Merge two dependency sets (`spec.md` §4.3):
    ///
    /// 1. Flatten both sides so every record's `modules` is `None`.
    /// 2. Union the `(group, artifact)` keys. A key present on only one side
    ///    passes through unchanged.
    /// 3. For a key present on both sides, `lang`/`exports`/`exclude` must
    ///    match exactly (mismatches are accumulated as errors, not
    ///    short-circuited); the version is resolved with `policy`.
    pub fn combine(&self, other: &Dependencies, policy: VersionConflictPolicy) -> Validated<Dependencies> {
        let mut left: BTreeMap<(MavenGroup, ArtifactOrProject), ProjectRecord> = BTreeMap::new();
        for (g, ap, rec) in self.flatten_all() {
            left.insert((g, ap), rec);
        }
        let mut right: BTreeMap<(MavenGroup, ArtifactOrProject), ProjectRecord> = BTreeMap::new();
        for (g, ap, rec) in other.flatten_all() {
            right.insert((g, ap), rec);
        }

        let mut keys: Vec<(MavenGroup, ArtifactOrProject)> = left.keys().cloned().collect();
        for k in right.keys() {
            if !left.contains_key(k) {
                keys.push(k.clone());
            }
        }
        keys.sort();
        tracing::debug!(
            "merging dependency sets: {} keys on the left, {} on the right, {} shared, policy {policy:?}",
            left.len(),
            right.len(),
            keys.iter().filter(|k| left.contains_key(k) && right.contains_key(k)).count(),
        );

        let merged: Vec<Validated<((MavenGroup, ArtifactOrProject), ProjectRecord)>> = keys
            .into_iter()
            .map(|key| match (left.get(&key), right.get(&key)) {
                (Some(a), None) => Validated::valid((key, a.clone())),
                (None, Some(b)) => Validated::valid((key, b.clone())),
                (Some(a), Some(b)) => merge_record(&key, a, b, policy).map(|rec| (key, rec)),
                (None, None) => unreachable!("key came from one of the two maps"),
            })
            .collect();

        let result = sequence(merged).map(Dependencies::from_records_tupled);
        if !result.is_valid() {
            tracing::warn!("dependency merge produced {} error(s)", result.errors().len());
        }
        result
    }

    fn from_records_tupled(records: Vec<((MavenGroup, ArtifactOrProject), ProjectRecord)>) -> Dependencies {
        Dependencies::from_records(records.into_iter().map(|((g, ap), rec)| (g, ap, rec)))
    }

    /// Every versioned root coordinate declared across the whole map.
    pub fn roots(&self) -> Vec<MavenCoordinate> {
        self.iter().flat_map(|(g, ap, rec)| rec.versioned_dependencies(g, ap)).collect()
    }

    /// Every unversioned root coordinate declared across the whole map.
    pub fn unversioned_roots(&self) -> Vec<UnversionedCoordinate> {
        self.iter().flat_map(|(g, ap, rec)| rec.all_dependencies(g, ap)).collect()
    }

    /// The `(group, artifact)` key that declares `coord`, if any.
    pub fn coord_to_project(&self, coord: &MavenCoordinate) -> Option<(MavenGroup, ArtifactOrProject)> {
        self.iter()
            .find(|(g, ap, rec)| rec.versioned_dependencies(g, ap).contains(coord))
            .map(|(g, ap, _)| (g.clone(), ap.clone()))
    }

    /// The `(group, artifact)` key that declares `coord`, if any.
    pub fn unversioned_to_project(&self, coord: &UnversionedCoordinate) -> Option<(MavenGroup, ArtifactOrProject)> {
        self.iter()
            .find(|(g, ap, rec)| rec.all_dependencies(g, ap).contains(coord))
            .map(|(g, ap, _)| (g.clone(), ap.clone()))
    }

    /// The unique unversioned coordinate implied by `(group, ap)` (`spec.md`
    /// §4.4). The candidate set is the union of:
    ///
    /// - if `ap` itself keys a record, that record's own mangled unversioned
    ///   coordinate (its `modules`, if any, are not consulted here — this
    ///   asks whether `ap` names a coordinate in its own right, not whether
    ///   it denotes a module group);
    /// - for each `(project, subproject)` split of `ap`, the mangled
    ///   coordinate of `project`'s record if that record declares `subproject`
    ///   as one of its `modules`.
    ///
    /// `None` if the union is empty or has more than one member — silently,
    /// with no diagnostic, matching the documented behavior of this query.
    pub fn unversioned_coordinates_of(&self, group: &MavenGroup, ap: &ArtifactOrProject) -> Option<UnversionedCoordinate> {
        let mut candidates: std::collections::BTreeSet<UnversionedCoordinate> = std::collections::BTreeSet::new();
        if let Some(rec) = self.get(group, ap) {
            candidates.insert(rec.lang.unversioned(group.clone(), ap, None));
        }
        for (project, subproject) in ap.split_subprojects() {
            if let Some(rec) = self.get(group, &project) {
                if rec.modules.as_ref().is_some_and(|mods| mods.contains(&subproject)) {
                    candidates.insert(rec.lang.unversioned(group.clone(), &project, Some(&subproject)));
                }
            }
        }
        if candidates.len() == 1 {
            candidates.into_iter().next()
        } else {
            None
        }
    }

    /// Resolve every `(group, artifact)` named in the `exports` of the
    /// record declaring `uv` to its unique unversioned coordinate, falling
    /// back to `replacements` for exports that redirect to a local build
    /// target instead of another declared third-party artifact. Entries that
    /// resolve in neither source are collected and returned as `Err` instead
    /// of silently dropped (`spec.md` §4.4).
    pub fn exported_unversioned(
        &self,
        uv: &UnversionedCoordinate,
        replacements: &crate::replacements::Replacements,
    ) -> Result<Vec<UnversionedCoordinate>, ExportUnresolved> {
        let Some((g, ap)) = self.unversioned_to_project(uv) else {
            return Ok(Vec::new());
        };
        let Some(rec) = self.get(&g, &ap) else {
            return Ok(Vec::new());
        };
        let mut resolved = Vec::new();
        let mut unresolved: ExportUnresolved = Vec::new();
        for (eg, ea) in &rec.exports {
            if let Some(coord) = self.unversioned_coordinates_of(eg, ea) {
                resolved.push(coord);
                continue;
            }
            let naive = UnversionedCoordinate::new(eg.clone(), ea.to_string());
            if replacements.get(&naive).is_some() {
                resolved.push(naive);
            } else {
                unresolved.push(naive);
            }
        }
        if unresolved.is_empty() {
            Ok(resolved)
        } else {
            Err(unresolved)
        }
    }

    /// The language of the record declaring `coord`, if any.
    pub fn language_of(&self, coord: &UnversionedCoordinate) -> Option<Language> {
        let (g, ap) = self.unversioned_to_project(coord)?;
        self.get(&g, &ap).map(|rec| rec.lang.clone())
    }

    /// Every coordinate excluded by the record declaring `uv`, resolved via
    /// [`Dependencies::unversioned_coordinates_of`] where possible and
    /// falling back to the naive unmangled `UnversionedCoordinate(g, a)`
    /// otherwise (`spec.md` §4.4).
    pub fn excludes(&self, uv: &UnversionedCoordinate) -> Vec<UnversionedCoordinate> {
        let Some((g, ap)) = self.unversioned_to_project(uv) else {
            return Vec::new();
        };
        let Some(rec) = self.get(&g, &ap) else {
            return Vec::new();
        };
        rec.exclude
            .iter()
            .map(|(eg, ea)| {
                self.unversioned_coordinates_of(eg, ea)
                    .unwrap_or_else(|| UnversionedCoordinate::new(eg.clone(), ea.to_string()))
            })
            .collect()
    }
}

fn merge_record(
    key: &(MavenGroup, ArtifactOrProject),
    a: &ProjectRecord,
    b: &ProjectRecord,
    policy: VersionConflictPolicy,
) -> Validated<ProjectRecord> {
    if a.lang != b.lang || a.exports != b.exports || a.exclude != b.exclude {
        return Validated::invalid(DepModelError::VersionConflict(format!(
            "{}:{} declared with incompatible lang/exports/exclude",
            key.0, key.1
        )));
    }
    match policy.resolve(a.version.as_ref(), b.version.as_ref(), &format!("{}:{}", key.0, key.1)) {
        Ok(version) => Validated::valid(ProjectRecord {
            lang: a.lang.clone(),
            version,
            modules: None,
            exports: a.exports.clone(),
            exclude: a.exclude.clone(),
        }),
        Err(e) => Validated::invalid(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    fn rec(version: &str) -> ProjectRecord {
        ProjectRecord::new(Language::java()).with_version(Version::new(version))
    }

    #[test]
    fn disjoint_keys_pass_through_unchanged() {
        let a = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), rec("1.0"))]);
        let b = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("b"), rec("2.0"))]);
        let merged = a.combine(&b, VersionConflictPolicy::Highest).into_result().unwrap();
        assert_eq!(merged.roots().len(), 2);
    }

    #[test]
    fn highest_policy_resolves_shared_key_to_max_version() {
        let a = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), rec("1.0"))]);
        let b = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), rec("2.0"))]);
        let merged = a.combine(&b, VersionConflictPolicy::Highest).into_result().unwrap();
        let version = merged.get(&MavenGroup::from("g"), &ArtifactOrProject::from("a")).unwrap().version.clone();
        assert_eq!(version, Some(Version::new("2.0")));
    }

    #[test]
    fn fail_policy_errors_on_differing_versions() {
        let a = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), rec("1.0"))]);
        let b = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), rec("2.0"))]);
        let merged = a.combine(&b, VersionConflictPolicy::Fail);
        assert!(!merged.is_valid());
    }

    #[test]
    fn fixed_policy_errors_on_differing_versions() {
        // The merge never has a declared root to fall back on, so `Fixed`
        // must error here exactly like `Fail` rather than silently keeping
        // the left-hand version.
        let a = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), rec("1.0"))]);
        let b = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), rec("2.0"))]);
        let merged = a.combine(&b, VersionConflictPolicy::Fixed);
        assert!(!merged.is_valid());
    }

    #[test]
    fn mismatched_lang_is_a_merge_error() {
        let a = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), rec("1.0"))]);
        let scala_rec = ProjectRecord::new(Language::scala(Version::new("2.11.11"), true).unwrap()).with_version(Version::new("1.0"));
        let b = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), scala_rec)]);
        let merged = a.combine(&b, VersionConflictPolicy::Highest);
        assert!(!merged.is_valid());
    }

    #[test]
    fn combine_is_idempotent() {
        let a = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), rec("1.0"))]);
        let merged = a.combine(&a, VersionConflictPolicy::Highest).into_result().unwrap();
        assert_eq!(merged, a);
    }

    #[test]
    fn unversioned_coordinates_of_resolves_the_module_group_key_itself() {
        // The key "akka" names a record in its own right, independent of
        // what `modules` it declares — the first candidate-set bullet in
        // spec.md §4.4 doesn't consult `modules` at all.
        let moduled = ProjectRecord::new(Language::java()).with_modules(std::collections::BTreeSet::from([
            crate::coordinate::Subproject::from("x"),
            crate::coordinate::Subproject::from("y"),
        ]));
        let deps = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("akka"), moduled)]);
        assert_eq!(
            deps.unversioned_coordinates_of(&MavenGroup::from("g"), &ArtifactOrProject::from("akka")),
            Some(UnversionedCoordinate::new("g", "akka"))
        );
    }

    #[test]
    fn unversioned_coordinates_of_resolves_a_module_via_split_subprojects() {
        let moduled = ProjectRecord::new(Language::java()).with_modules(std::collections::BTreeSet::from([
            crate::coordinate::Subproject::from("x"),
            crate::coordinate::Subproject::from("y"),
        ]));
        let deps = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("akka"), moduled)]);
        assert_eq!(
            deps.unversioned_coordinates_of(&MavenGroup::from("g"), &ArtifactOrProject::from("akka-x")),
            Some(UnversionedCoordinate::new("g", "akka-x"))
        );
        assert!(deps
            .unversioned_coordinates_of(&MavenGroup::from("g"), &ArtifactOrProject::from("akka-missing"))
            .is_none());
    }

    #[test]
    fn unversioned_coordinates_of_is_some_for_bare_artifact() {
        let deps = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), rec("1.0"))]);
        assert!(deps
            .unversioned_coordinates_of(&MavenGroup::from("g"), &ArtifactOrProject::from("a"))
            .is_some());
    }

    #[test]
    fn exported_unversioned_reports_unresolved_exports() {
        let mut r = rec("1.0");
        r.exports.insert((MavenGroup::from("g"), ArtifactOrProject::from("missing")));
        let deps = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), r)]);
        let uv = UnversionedCoordinate::new("g", "a");
        let result = deps.exported_unversioned(&uv, &crate::replacements::Replacements::new());
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), vec![UnversionedCoordinate::new("g", "missing")]);
    }

    #[test]
    fn exported_unversioned_falls_back_to_replacements() {
        use crate::coordinate::BazelTarget;
        use crate::replacements::{ReplacementRecord, Replacements};

        let mut r = rec("1.0");
        r.exports.insert((MavenGroup::from("g"), ArtifactOrProject::from("local")));
        let deps = Dependencies::from_records([(MavenGroup::from("g"), ArtifactOrProject::from("a"), r)]);
        let replacements = Replacements::from_entries([(
            UnversionedCoordinate::new("g", "local"),
            ReplacementRecord::new(Language::java(), BazelTarget::parse("//local:local").unwrap()),
        )]);
        let uv = UnversionedCoordinate::new("g", "a");
        let resolved = deps.exported_unversioned(&uv, &replacements).unwrap();
        assert_eq!(resolved, vec![UnversionedCoordinate::new("g", "local")]);
    }

    #[test]
    fn excludes_resolves_known_coordinates_and_defaults_unresolved_ones() {
        let mut r = rec("1.0");
        r.exclude.insert((MavenGroup::from("g"), ArtifactOrProject::from("b")));
        r.exclude.insert((MavenGroup::from("g"), ArtifactOrProject::from("unknown")));
        let deps = Dependencies::from_records([
            (MavenGroup::from("g"), ArtifactOrProject::from("a"), r),
            (MavenGroup::from("g"), ArtifactOrProject::from("b"), rec("2.0")),
        ]);
        let excluded = deps.excludes(&UnversionedCoordinate::new("g", "a"));
        assert_eq!(
            excluded,
            vec![UnversionedCoordinate::new("g", "b"), UnversionedCoordinate::new("g", "unknown")]
        );
    }
}
