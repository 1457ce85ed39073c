//! Merging parsed sources into a [`ResolvedConfiguration`].

use crate::core::resolved::{Provenance, ResolvedConfiguration, ResolvedVariable};
use crate::environment::Environment;
use crate::error::{ResolveError, Result};
use crate::secrets::SecretBindings;
use crate::sources::{ConfigSource, SourceMap};
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use tracing::debug;

/// Merge the parsed cascade and the fetched secrets, lowest precedence first.
///
/// `layers` must already be in cascade order; the fold is last-write-wins, so
/// each later layer overrides earlier ones for the names it defines, and the
/// secrets are applied after every on-disk layer. Before anything is merged
/// the layers are scanned for literal assignments to secret-bound names,
/// which fail the whole resolution: those values must only ever enter through
/// the provider.
pub(crate) fn merge(
    environment: Environment,
    layers: Vec<(ConfigSource, SourceMap)>,
    secrets: BTreeMap<String, SecretString>,
    bindings: &SecretBindings,
) -> Result<ResolvedConfiguration> {
    for (source, map) in &layers {
        for name in map.keys() {
            if bindings.contains(name) {
                return Err(ResolveError::SecretLeakDetected {
                    name: name.clone(),
                    file_name: source.file_name().to_string(),
                });
            }
        }
    }

    let mut variables: BTreeMap<String, ResolvedVariable> = BTreeMap::new();
    for (source, map) in layers {
        for (name, value) in map {
            let provenance = Provenance::File {
                role: source.role(),
                file_name: source.file_name().to_string(),
            };
            if let Some(previous) = variables.insert(name.clone(), ResolvedVariable { value, provenance }) {
                debug!(
                    name = %name,
                    source = source.file_name(),
                    overridden = %previous.provenance,
                    "variable overridden"
                );
            }
        }
    }
    for (name, value) in secrets {
        variables.insert(
            name,
            ResolvedVariable {
                value: value.expose_secret().to_string(),
                provenance: Provenance::SecretProvider,
            },
        );
    }

    Ok(ResolvedConfiguration::new(environment, variables))
}
