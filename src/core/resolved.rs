//! The immutable result of one resolution.

use crate::environment::Environment;
use crate::sources::SourceRole;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Where a resolved variable's value last came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Last assigned by an on-disk source file.
    File {
        /// The file's role within the cascade.
        role: SourceRole,
        /// The concrete file name, e.g. `.env.dev.local`.
        file_name: String,
    },
    /// Fetched from the secret provider.
    SecretProvider,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { file_name, .. } => f.write_str(file_name),
            Self::SecretProvider => f.write_str("secret-provider"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ResolvedVariable {
    pub(crate) value: String,
    pub(crate) provenance: Provenance,
}

impl ResolvedVariable {
    fn is_secret(&self) -> bool {
        matches!(self.provenance, Provenance::SecretProvider)
    }
}

/// A fully merged configuration for one environment.
///
/// The value is immutable: later edits to the underlying files are invisible
/// until a caller resolves again (see [`ConfigHandle`] for a shared view that
/// can be refreshed in place). Every variable records which source supplied
/// its final value, so "where did this come from?" is answerable without
/// re-reading the cascade.
///
/// The `Debug` implementation redacts values fetched from the secret
/// provider; use [`get`](Self::get) to read them deliberately.
///
/// [`ConfigHandle`]: crate::core::ConfigHandle
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    environment: Environment,
    variables: BTreeMap<String, ResolvedVariable>,
}

impl ResolvedConfiguration {
    pub(crate) fn new(
        environment: Environment,
        variables: BTreeMap<String, ResolvedVariable>,
    ) -> Self {
        Self {
            environment,
            variables,
        }
    }

    /// The environment this configuration was resolved for.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Look up a variable's final value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(|var| var.value.as_str())
    }

    /// Look up which source supplied a variable's final value.
    pub fn provenance(&self, name: &str) -> Option<&Provenance> {
        self.variables.get(name).map(|var| &var.provenance)
    }

    /// Number of resolved variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the configuration holds no variables at all.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterate variable names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Iterate `(name, value)` pairs in sorted name order.
    ///
    /// Secret-sourced values are included in the clear; callers exporting the
    /// configuration (into a child process environment, say) need them.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|(name, var)| (name.as_str(), var.value.as_str()))
    }

    /// Build a serializable description of this configuration.
    ///
    /// The report lists every variable with the source its value came from.
    /// Values fetched from the secret provider are omitted, so the report is
    /// safe to log or write to disk.
    pub fn report(&self) -> ResolutionReport {
        let variables = self
            .variables
            .iter()
            .map(|(name, var)| ReportEntry {
                name: name.clone(),
                value: (!var.is_secret()).then(|| var.value.clone()),
                source: var.provenance.to_string(),
            })
            .collect();
        ResolutionReport {
            environment: self.environment,
            variables,
        }
    }
}

impl fmt::Debug for ResolvedConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Redacted<'a>(&'a BTreeMap<String, ResolvedVariable>);

        impl fmt::Debug for Redacted<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut map = f.debug_map();
                for (name, var) in self.0 {
                    if var.is_secret() {
                        map.entry(name, &"<redacted>");
                    } else {
                        map.entry(name, &var.value);
                    }
                }
                map.finish()
            }
        }

        f.debug_struct("ResolvedConfiguration")
            .field("environment", &self.environment)
            .field("variables", &Redacted(&self.variables))
            .finish()
    }
}

/// Serializable, secret-free description of a resolution.
///
/// Produced by [`ResolvedConfiguration::report`]; useful for startup logging
/// and for auditing which file won each variable.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    /// The environment the configuration was resolved for.
    pub environment: Environment,
    /// One entry per resolved variable, in sorted name order.
    pub variables: Vec<ReportEntry>,
}

/// One variable within a [`ResolutionReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    /// The variable name.
    pub name: String,
    /// The final value, or `None` for values fetched from the secret
    /// provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Display name of the winning source.
    pub source: String,
}
