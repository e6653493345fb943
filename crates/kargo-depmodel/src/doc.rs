//! Canonical serialization: a small, fully deterministic text grammar for a
//! [`Model`], used for fixtures and round-trip tests.
//!
//! This is *not* a general YAML front end — it has no support for comments,
//! anchors, flow collections, or any of the authoring conveniences a
//! human-edited manifest would want. It exists purely so that `render` and
//! `parse` are exact inverses of each other on the values this crate
//! produces, with a deterministic top-level key order (`options`,
//! `dependencies`, `replacements`), groups and artifacts sorted, and a fixed
//! per-record field order (`exclude`, `exports`, `lang`, `modules`,
//! `version`).

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::coordinate::{ArtifactOrProject, BazelTarget, MavenGroup, Subproject, UnversionedCoordinate};
use crate::dependencies::Dependencies;
use crate::error::DepModelError;
use crate::language::Language;
use crate::model::Model;
use crate::options::{DirectoryName, Options, Resolver};
use crate::policy::{Transitivity, VersionConflictPolicy};
use crate::project_record::{GroupArtifact, ProjectRecord};
use crate::replacements::{ReplacementRecord, Replacements};
use crate::version::Version;

const INDENT: &str = "  ";

/// Render `model` to its canonical text form.
pub fn render(model: &Model) -> String {
    let mut out = String::new();
    render_options(&mut out, &model.options);
    render_dependencies(&mut out, &model.dependencies);
    render_replacements(&mut out, &model.replacements);
    out
}

fn render_options(out: &mut String, options: &Options) {
    writeln!(out, "options:").unwrap();
    if let Some(directory) = &options.directory {
        writeln!(out, "{INDENT}directory: {}", escape(directory.as_str())).unwrap();
    }
    if let Some(policy) = options.version_conflict_policy {
        writeln!(out, "{INDENT}versionConflictPolicy: {}", policy_name(policy)).unwrap();
    }
    if let Some(transitivity) = options.transitivity {
        writeln!(out, "{INDENT}transitivity: {}", transitivity_name(transitivity)).unwrap();
    }
    if let Some(v) = &options.default_scala_version {
        writeln!(out, "{INDENT}scalaVersion: {}", escape(v.as_str())).unwrap();
    }
    if let Some(mangle) = options.default_scala_mangle {
        writeln!(out, "{INDENT}scalaMangle: {}", mangle).unwrap();
    }
    if !options.resolvers.is_empty() {
        writeln!(out, "{INDENT}resolvers:").unwrap();
        for r in &options.resolvers {
            writeln!(
                out,
                "{INDENT}{INDENT}- {}:{}:{}",
                escape(&r.id),
                escape(&r.kind),
                escape(&r.url)
            )
            .unwrap();
        }
    }
    if !options.build_header.is_empty() {
        writeln!(out, "{INDENT}buildHeader:").unwrap();
        for line in &options.build_header {
            writeln!(out, "{INDENT}{INDENT}- {}", escape(line)).unwrap();
        }
    }
}

fn render_dependencies(out: &mut String, deps: &Dependencies) {
    writeln!(out, "dependencies:").unwrap();
    let mut by_group: std::collections::BTreeMap<&MavenGroup, Vec<(&ArtifactOrProject, &ProjectRecord)>> = std::collections::BTreeMap::new();
    for (g, ap, rec) in deps.iter() {
        by_group.entry(g).or_default().push((ap, rec));
    }
    for (group, mut artifacts) in by_group {
        artifacts.sort_by(|a, b| a.0.cmp(b.0));
        writeln!(out, "{INDENT}{}:", escape(group.as_str())).unwrap();
        for (ap, rec) in artifacts {
            render_record(out, 2, ap, rec);
        }
    }
}

fn render_record(out: &mut String, depth: usize, ap: &ArtifactOrProject, rec: &ProjectRecord) {
    let pad = INDENT.repeat(depth);
    let field_pad = INDENT.repeat(depth + 1);
    writeln!(out, "{pad}{}:", escape(ap.as_str())).unwrap();
    if !rec.exclude.is_empty() {
        writeln!(out, "{field_pad}exclude:").unwrap();
        render_group_artifact_set(out, depth + 2, &rec.exclude);
    }
    if !rec.exports.is_empty() {
        writeln!(out, "{field_pad}exports:").unwrap();
        render_group_artifact_set(out, depth + 2, &rec.exports);
    }
    writeln!(out, "{field_pad}lang: {}", lang_spelling(&rec.lang)).unwrap();
    if let Some(modules) = &rec.modules {
        writeln!(out, "{field_pad}modules:").unwrap();
        for m in modules {
            writeln!(out, "{}- {}", INDENT.repeat(depth + 2), escape(m.as_str())).unwrap();
        }
    }
    if let Some(version) = &rec.version {
        writeln!(out, "{field_pad}version: {}", escape(version.as_str())).unwrap();
    }
}

fn render_group_artifact_set(out: &mut String, depth: usize, set: &BTreeSet<GroupArtifact>) {
    let pad = INDENT.repeat(depth);
    for (g, a) in set {
        writeln!(out, "{pad}- {}:{}", escape(g.as_str()), escape(a.as_str())).unwrap();
    }
}

fn render_replacements(out: &mut String, reps: &Replacements) {
    writeln!(out, "replacements:").unwrap();
    for (coord, rec) in reps.iter() {
        writeln!(out, "{INDENT}{}:", escape(&coord.to_string())).unwrap();
        writeln!(out, "{INDENT}{INDENT}lang: {}", lang_spelling(&rec.lang)).unwrap();
        writeln!(out, "{INDENT}{INDENT}target: {}", escape(rec.target.as_str())).unwrap();
    }
}

fn lang_spelling(lang: &Language) -> String {
    match lang {
        Language::Java => "java".to_string(),
        Language::Scala { version, mangle, .. } => format!("scala:{}:{}", version.as_str(), mangle),
    }
}

fn policy_name(p: VersionConflictPolicy) -> &'static str {
    match p {
        VersionConflictPolicy::Highest => "highest",
        VersionConflictPolicy::Fixed => "fixed",
        VersionConflictPolicy::Fail => "fail",
    }
}

fn transitivity_name(t: Transitivity) -> &'static str {
    match t {
        Transitivity::RuntimeDeps => "runtimeDeps",
        Transitivity::Exports => "exports",
    }
}

/// Escape `\` and `"` and wrap in quotes whenever the value would otherwise
/// be ambiguous with the grammar's own punctuation (`:`, leading `-`,
/// leading/trailing whitespace).
fn escape(s: &str) -> String {
    let needs_quoting = s.is_empty()
        || s.contains(':')
        || s.contains('"')
        || s.contains('\\')
        || s.starts_with('-')
        || s.starts_with(' ')
        || s.ends_with(' ');
    if !needs_quoting {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn unescape(s: &str) -> String {
    if let Some(inner) = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else {
                out.push(ch);
            }
        }
        out
    } else {
        s.to_string()
    }
}

struct Line {
    depth: usize,
    text: String,
}

fn lines_of(input: &str) -> Vec<Line> {
    input
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let indent = l.chars().take_while(|c| *c == ' ').count();
            Line {
                depth: indent / 2,
                text: l.trim().to_string(),
            }
        })
        .collect()
}

/// Parse canonical text produced by [`render`] back into a [`Model`].
pub fn parse(input: &str) -> Result<Model, DepModelError> {
    let lines = lines_of(input);
    let mut options = Options::default();
    let mut records: Vec<(MavenGroup, ArtifactOrProject, ProjectRecord)> = Vec::new();
    let mut reps: Vec<(UnversionedCoordinate, ReplacementRecord)> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        if line.depth != 0 {
            return Err(DepModelError::Parse(format!("unexpected top-level indent: {}", line.text)));
        }
        match line.text.trim_end_matches(':') {
            "options" => {
                i += 1;
                i = parse_options(&lines, i, &mut options)?;
            }
            "dependencies" => {
                i += 1;
                i = parse_dependencies(&lines, i, &mut records)?;
            }
            "replacements" => {
                i += 1;
                i = parse_replacements(&lines, i, &mut reps)?;
            }
            other => return Err(DepModelError::Parse(format!("unknown top-level section: {other}"))),
        }
    }

    Ok(Model::new(options, Dependencies::from_records(records), Replacements::from_entries(reps)))
}

fn kv(text: &str) -> Option<(&str, &str)> {
    text.split_once(':').map(|(k, v)| (k.trim(), v.trim()))
}

fn parse_options(lines: &[Line], mut i: usize, options: &mut Options) -> Result<usize, DepModelError> {
    while i < lines.len() && lines[i].depth >= 1 {
        let line = &lines[i];
        if line.depth != 1 {
            i += 1;
            continue;
        }
        let Some((key, value)) = kv(&line.text) else {
            i += 1;
            continue;
        };
        match key {
            "directory" => options.directory = Some(DirectoryName::from(unescape(value))),
            "versionConflictPolicy" => {
                options.version_conflict_policy = Some(match value {
                    "highest" => VersionConflictPolicy::Highest,
                    "fixed" => VersionConflictPolicy::Fixed,
                    "fail" => VersionConflictPolicy::Fail,
                    other => return Err(DepModelError::Parse(format!("unknown versionConflictPolicy: {other}"))),
                });
            }
            "transitivity" => {
                options.transitivity = Some(match value {
                    "runtimeDeps" => Transitivity::RuntimeDeps,
                    "exports" => Transitivity::Exports,
                    other => return Err(DepModelError::Parse(format!("unknown transitivity: {other}"))),
                });
            }
            "scalaVersion" => options.default_scala_version = Some(Version::new(unescape(value))),
            "scalaMangle" => options.default_scala_mangle = Some(value == "true"),
            "resolvers" => {
                let (items, next) = parse_resolver_list(lines, i + 1, 2);
                options.resolvers = items;
                i = next;
                continue;
            }
            "buildHeader" => {
                let (items, next) = parse_list(lines, i + 1, 2);
                options.build_header = items;
                i = next;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    Ok(i)
}

fn parse_list(lines: &[Line], mut i: usize, depth: usize) -> (Vec<String>, usize) {
    let mut items = Vec::new();
    while i < lines.len() && lines[i].depth == depth && lines[i].text.starts_with("- ") {
        items.push(unescape(lines[i].text.trim_start_matches("- ").trim()));
        i += 1;
    }
    (items, i)
}

fn parse_resolver_list(lines: &[Line], mut i: usize, depth: usize) -> (Vec<Resolver>, usize) {
    let mut items = Vec::new();
    while i < lines.len() && lines[i].depth == depth && lines[i].text.starts_with("- ") {
        let entry = lines[i].text.trim_start_matches("- ").trim();
        if let Some((id, kind, url)) = split_resolver_fields(entry) {
            items.push(Resolver::new(id, kind, url));
        }
        i += 1;
    }
    (items, i)
}

/// Split a rendered `id:kind:url` resolver entry at the first two colons
/// that fall outside a quoted segment, then unescape each field. The `url`
/// field is almost always quoted (it contains its own `://`), so a naive
/// `split(':')` would cut it apart; this tracks quote state instead.
fn split_resolver_fields(s: &str) -> Option<(String, String, String)> {
    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in s.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            current.push(ch);
        } else if ch == ':' && !in_quotes && parts.len() < 2 {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    parts.push(current);
    match parts.as_slice() {
        [id, kind, url] => Some((unescape(id), unescape(kind), unescape(url))),
        _ => None,
    }
}

fn parse_group_artifact_set(lines: &[Line], mut i: usize, depth: usize) -> (BTreeSet<GroupArtifact>, usize) {
    let mut set = BTreeSet::new();
    while i < lines.len() && lines[i].depth == depth && lines[i].text.starts_with("- ") {
        let entry = lines[i].text.trim_start_matches("- ").trim();
        if let Some((g, a)) = entry.split_once(':') {
            set.insert((MavenGroup::from(unescape(g)), ArtifactOrProject::from(unescape(a))));
        }
        i += 1;
    }
    (set, i)
}

fn parse_dependencies(lines: &[Line], mut i: usize, records: &mut Vec<(MavenGroup, ArtifactOrProject, ProjectRecord)>) -> Result<usize, DepModelError> {
    while i < lines.len() && lines[i].depth >= 1 {
        let group_line = &lines[i];
        if group_line.depth != 1 {
            i += 1;
            continue;
        }
        let group = MavenGroup::from(unescape(group_line.text.trim_end_matches(':')));
        i += 1;
        while i < lines.len() && lines[i].depth == 2 {
            let ap = ArtifactOrProject::from(unescape(lines[i].text.trim_end_matches(':')));
            i += 1;
            let (record, next) = parse_record(lines, i)?;
            records.push((group.clone(), ap, record));
            i = next;
        }
    }
    Ok(i)
}

fn parse_record(lines: &[Line], mut i: usize) -> Result<(ProjectRecord, usize), DepModelError> {
    let mut lang: Option<Language> = None;
    let mut version = None;
    let mut modules = None;
    let mut exports = BTreeSet::new();
    let mut exclude = BTreeSet::new();

    while i < lines.len() && lines[i].depth == 3 {
        let Some((key, value)) = kv(&lines[i].text) else {
            i += 1;
            continue;
        };
        match key {
            "exclude" => {
                let (set, next) = parse_group_artifact_set(lines, i + 1, 4);
                exclude = set;
                i = next;
                continue;
            }
            "exports" => {
                let (set, next) = parse_group_artifact_set(lines, i + 1, 4);
                exports = set;
                i = next;
                continue;
            }
            "lang" => lang = Some(parse_lang(value)?),
            "modules" => {
                let (items, next) = parse_list(lines, i + 1, 4);
                modules = Some(items.into_iter().map(Subproject::from).collect::<BTreeSet<_>>());
                i = next;
                continue;
            }
            "version" => version = Some(Version::new(unescape(value))),
            _ => {}
        }
        i += 1;
    }

    let lang = lang.ok_or_else(|| DepModelError::Parse("record missing lang".to_string()))?;
    let mut rec = ProjectRecord::new(lang);
    rec.version = version;
    rec.modules = modules;
    rec.exports = exports;
    rec.exclude = exclude;
    Ok((rec, i))
}

fn parse_lang(value: &str) -> Result<Language, DepModelError> {
    if value == "java" {
        return Ok(Language::java());
    }
    let parts: Vec<&str> = value.splitn(3, ':').collect();
    match parts.as_slice() {
        ["scala", version, mangle] => Language::scala(Version::new(*version), *mangle == "true"),
        _ => Err(DepModelError::Parse(format!("unknown lang: {value}"))),
    }
}

fn parse_replacements(lines: &[Line], mut i: usize, reps: &mut Vec<(UnversionedCoordinate, ReplacementRecord)>) -> Result<usize, DepModelError> {
    while i < lines.len() && lines[i].depth >= 1 {
        let line = &lines[i];
        if line.depth != 1 {
            i += 1;
            continue;
        }
        let coord: UnversionedCoordinate = unescape(line.text.trim_end_matches(':')).parse()?;
        i += 1;
        let mut lang = None;
        let mut target = None;
        while i < lines.len() && lines[i].depth == 2 {
            if let Some((key, value)) = kv(&lines[i].text) {
                match key {
                    "lang" => lang = Some(parse_lang(value)?),
                    "target" => target = Some(BazelTarget::parse(unescape(value))?),
                    _ => {}
                }
            }
            i += 1;
        }
        let lang = lang.ok_or_else(|| DepModelError::Parse(format!("replacement for {coord} missing lang")))?;
        let target = target.ok_or_else(|| DepModelError::Parse(format!("replacement for {coord} missing target")))?;
        reps.push((coord, ReplacementRecord::new(lang, target)));
    }
    Ok(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn sample_model() -> Model {
        let rec = ProjectRecord::new(Language::java()).with_version(Version::new("27.0-jre"));
        let deps = Dependencies::from_records([(MavenGroup::from("com.google.guava"), ArtifactOrProject::from("guava"), rec)]);
        Model::new(Options::default(), deps, Replacements::default())
    }

    #[test]
    fn render_then_parse_round_trips() {
        let model = sample_model();
        let rendered = render(&model);
        let parsed = parse(&rendered).unwrap();
        assert_eq!(parsed, model);
    }

    #[test]
    fn render_is_deterministic_across_calls() {
        let model = sample_model();
        assert_eq!(render(&model), render(&model));
    }

    #[test]
    fn escape_quotes_values_containing_colons() {
        assert_eq!(escape("has:colon"), "\"has:colon\"");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn round_trips_scala_language_and_modules() {
        let rec = ProjectRecord::new(Language::scala(Version::new("2.12.10"), true).unwrap())
            .with_version(Version::new("2.6.0"))
            .with_modules(BTreeSet::from([Subproject::from("actor"), Subproject::from("stream")]));
        let deps = Dependencies::from_records([(MavenGroup::from("com.typesafe.akka"), ArtifactOrProject::from("akka"), rec)]);
        let model = Model::new(Options::default(), deps, Replacements::default());
        let rendered = render(&model);
        let parsed = parse(&rendered).unwrap();
        assert_eq!(parsed, model);
    }

    #[test]
    fn round_trips_multiple_resolvers_including_colon_bearing_urls() {
        let mut model = sample_model();
        model.options.resolvers = vec![
            Resolver::new("central", "default", "http://central.maven.org/maven2/"),
            Resolver::new("sonatype", "default", "https://oss.sonatype.org/content/repositories/snapshots/"),
        ];
        let rendered = render(&model);
        let parsed = parse(&rendered).unwrap();
        assert_eq!(parsed, model);
    }

    #[test]
    fn round_trips_replacements() {
        let mut model = sample_model();
        model.replacements = Replacements::from_entries([(
            UnversionedCoordinate::new("com.google.guava", "guava"),
            ReplacementRecord::new(Language::java(), BazelTarget::parse("//3rdparty/jvm/com/google/guava:guava").unwrap()),
        )]);
        let rendered = render(&model);
        let parsed = parse(&rendered).unwrap();
        assert_eq!(parsed, model);
    }
}
