use miette::Diagnostic;
use thiserror::Error;

use crate::coordinate::UnversionedCoordinate;

/// Errors raised while building or merging the third-party dependency model.
///
/// These never cross the crate boundary as panics or exceptions: every
/// combine-family operation returns a [`crate::validated::Validated`] that
/// accumulates these instead of short-circuiting.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum DepModelError {
    /// A coordinate string didn't split into exactly `group:artifact[:version]`.
    #[error("expected exactly three :, got {0}")]
    CoordinateShape(String),

    /// Two or more versions of the same coordinate were declared and the
    /// active [`crate::policy::VersionConflictPolicy`] could not pick one.
    #[error("{0}")]
    #[diagnostic(help("declare a single version, or relax versionConflictPolicy"))]
    VersionConflict(String),

    /// The same `group:artifact` replacement key was declared twice with
    /// different targets.
    #[error("in replacements combine: {a} != {b}")]
    ReplacementCollision { a: String, b: String },

    /// A `Language::Scala` variant was constructed from a version string that
    /// doesn't have a recognizable `2.X` or `2.X.Y` major.
    #[error("unsupported Scala version: {0}")]
    UnsupportedScalaVersion(String),

    /// A `BazelTarget` string didn't have the `//path:name` shape.
    #[error("not a valid build target: {0}")]
    InvalidBuildTarget(String),

    /// The canonical doc grammar (`crate::doc`) rejected malformed input.
    #[error("{0}")]
    Parse(String),
}

/// The left-side payload of [`crate::dependencies::Dependencies::exported_unversioned`]:
/// the list of exports that could not be resolved against either the
/// declared dependencies or the replacements map.
pub type ExportUnresolved = Vec<UnversionedCoordinate>;

impl From<DepModelError> for kargo_util::errors::KargoError {
    fn from(e: DepModelError) -> Self {
        kargo_util::errors::KargoError::Model {
            message: e.to_string(),
        }
    }
}
