//! Turns an environment selection into the ordered list of files to read.
//!
//! Location is pure: [`locate`] never touches the filesystem, so the cascade
//! for a given environment can be computed, logged, or displayed without any
//! files existing yet. Whether a file is present is only discovered when the
//! source is loaded.

use crate::environment::Environment;
use crate::error::Result;
use crate::sources::parser;
use crate::sources::role::{SourceRole, SOURCE_ORDER};
use crate::sources::SourceMap;
use std::path::{Path, PathBuf};

/// One concrete configuration file participating in a resolution.
///
/// Carries the role, the file name derived from it, the full path under the
/// base directory, and the source's rank: its zero-based position in the
/// cascade, where a higher rank overrides a lower one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    role: SourceRole,
    file_name: String,
    path: PathBuf,
    rank: usize,
}

impl ConfigSource {
    /// The role this file plays in the cascade.
    pub fn role(&self) -> SourceRole {
        self.role
    }

    /// The bare file name, e.g. `.env.shared.local`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The full path the file is expected at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Zero-based position in the cascade; higher ranks override lower ones.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Whether resolution fails if this file is absent.
    pub fn required(&self) -> bool {
        self.role.required()
    }

    /// Whether this file may hold hand-managed secret material.
    pub fn allows_secrets(&self) -> bool {
        self.role.allows_secrets()
    }

    /// Name of the committed `-example` counterpart documenting this file's
    /// expected contents, for files excluded from version control.
    pub fn example_file_name(&self) -> Option<String> {
        self.allows_secrets()
            .then(|| format!("{}-example", self.file_name))
    }

    /// Read and parse the file into a name/value map.
    ///
    /// An absent optional file yields an empty map; an absent required file
    /// is an error. See the parsing rules on [`crate::sources`].
    pub fn load(&self) -> Result<SourceMap> {
        parser::load_source(self)
    }
}

/// Lazy sequence of the [`ConfigSource`]s for one environment.
///
/// Produced by [`locate`]. The iterator is `Clone`, so a caller can keep a
/// copy to walk the cascade again without recomputing the selection.
#[derive(Debug, Clone)]
pub struct Locations {
    base_dir: PathBuf,
    environment: Environment,
    next_role: usize,
    rank: usize,
}

impl Iterator for Locations {
    type Item = ConfigSource;

    fn next(&mut self) -> Option<ConfigSource> {
        while self.next_role < SOURCE_ORDER.len() {
            let role = SOURCE_ORDER[self.next_role];
            self.next_role += 1;
            if let Some(file_name) = role.file_name(self.environment) {
                let rank = self.rank;
                self.rank += 1;
                return Some(ConfigSource {
                    role,
                    path: self.base_dir.join(&file_name),
                    file_name,
                    rank,
                });
            }
        }
        None
    }
}

/// Enumerate the cascade for `environment` under `base_dir`, lowest
/// precedence first.
///
/// Non-production environments yield seven sources; production yields eight,
/// ending with the variant file. Ranks are assigned in iteration order and
/// are identical for every call with the same environment.
///
/// # Examples
///
/// ```
/// use envcascade::prelude::*;
/// use envcascade::sources::locate;
///
/// let names: Vec<String> = locate("config", Environment::Dev)
///     .map(|source| source.file_name().to_string())
///     .collect();
/// assert_eq!(names[0], ".env");
/// assert_eq!(names[6], ".env.dev.local");
/// ```
pub fn locate(base_dir: impl AsRef<Path>, environment: Environment) -> Locations {
    Locations {
        base_dir: base_dir.as_ref().to_path_buf(),
        environment,
        next_role: 0,
        rank: 0,
    }
}

/// Report local-override sources whose committed `-example` counterpart is
/// absent from `base_dir`.
///
/// Purely diagnostic: a missing example never fails resolution, but it
/// usually means an uncommitted file's expected contents are undocumented.
pub fn missing_example_files(
    base_dir: impl AsRef<Path>,
    environment: Environment,
) -> Vec<ConfigSource> {
    let base_dir = base_dir.as_ref();
    locate(base_dir, environment)
        .filter(|source| {
            source
                .example_file_name()
                .is_some_and(|example| !base_dir.join(example).exists())
        })
        .collect()
}
