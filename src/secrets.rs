//! Secret bindings and the provider boundary.
//!
//! Variables whose values live in an external secret store are declared as
//! *bindings*: the resolver never invents secret names, it fetches exactly the
//! bound set through an injected [`SecretProvider`] and layers the results on
//! top of every on-disk source. Fetched values travel as
//! [`secrecy::SecretString`] so they are redacted from `Debug` output until a
//! consumer explicitly exposes them.

use crate::error::{ResolveError, Result};
use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

/// Error type returned by secret providers.
///
/// Providers report failures in their own terms; the resolver wraps whatever
/// comes back into [`ResolveError::SecretResolutionFailed`] along with the
/// variable name being fetched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// External store for secret-bound variable values.
///
/// Implement this trait to pull secrets from a vault, a cloud secret manager,
/// or an encrypted file. The resolver treats the provider as opaque: it calls
/// [`fetch`](SecretProvider::fetch) once per bound name and attaches no
/// meaning to the values beyond carrying them into the resolved
/// configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use envcascade::secrets::{BoxError, SecretProvider};
/// use async_trait::async_trait;
/// use secrecy::SecretString;
///
/// struct VaultClient { /* ... */ }
///
/// #[async_trait]
/// impl SecretProvider for VaultClient {
///     async fn fetch(&self, name: &str) -> Result<SecretString, BoxError> {
///         // Look `name` up in the vault here.
///         Err(format!("no secret named {name:?}").into())
///     }
/// }
/// ```
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch the value for one secret-bound variable.
    ///
    /// # Errors
    ///
    /// Returns an error when the secret does not exist or the store cannot be
    /// reached. The error's `Display` text becomes the failure reason shown
    /// to the caller, so it should not contain secret material.
    async fn fetch(&self, name: &str) -> std::result::Result<SecretString, BoxError>;
}

/// The set of variable names whose values must come from the provider.
///
/// Bound names are held in sorted order, which fixes the sequence of provider
/// calls and makes failures deterministic. A bound name must not appear with
/// a literal value in any on-disk source; the merge step rejects such files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretBindings {
    names: BTreeSet<String>,
}

impl SecretBindings {
    /// Create an empty binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to the secret provider.
    pub fn bind(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names are bound.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate the bound names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SecretBindings {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for SecretBindings {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

/// In-memory provider for tests and local development.
///
/// # Examples
///
/// ```
/// use envcascade::secrets::StaticProvider;
///
/// let provider = StaticProvider::new()
///     .with_secret("DATABASE_PASSWORD", "hunter2")
///     .with_secret("API_TOKEN", "tok-123");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    values: BTreeMap<String, String>,
}

impl StaticProvider {
    /// Create a provider with no secrets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret, replacing any previous value for `name`.
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretProvider for StaticProvider {
    async fn fetch(&self, name: &str) -> std::result::Result<SecretString, BoxError> {
        match self.values.get(name) {
            Some(value) => Ok(SecretString::new(value.clone().into())),
            None => Err(format!("no secret named {name:?}").into()),
        }
    }
}

/// Fetch every bound secret through `provider`, sequentially, under one
/// overall deadline.
///
/// The timeout covers the whole batch rather than each call, so a slow store
/// cannot stretch resolution by the number of bindings. The first failure
/// aborts the batch. A timeout too large for the clock to represent (such as
/// [`Duration::MAX`]) is treated as unbounded.
pub(crate) async fn fetch_secrets(
    provider: Option<&dyn SecretProvider>,
    bindings: &SecretBindings,
    timeout: Duration,
) -> Result<BTreeMap<String, SecretString>> {
    let Some(first) = bindings.iter().next() else {
        return Ok(BTreeMap::new());
    };
    let Some(provider) = provider else {
        return Err(ResolveError::SecretResolutionFailed {
            name: first.to_string(),
            reason: "no secret provider configured".to_string(),
        });
    };

    let now = Instant::now();
    // Unrepresentable timeouts degrade to a deadline roughly 30 years out;
    // larger offsets overflow `Instant` on some platforms.
    let deadline = now
        .checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(86400 * 365 * 30));
    let mut secrets = BTreeMap::new();
    for name in bindings.iter() {
        match timeout_at(deadline, provider.fetch(name)).await {
            Ok(Ok(value)) => {
                debug!(name, "secret resolved");
                secrets.insert(name.to_string(), value);
            }
            Ok(Err(source)) => {
                return Err(ResolveError::SecretResolutionFailed {
                    name: name.to_string(),
                    reason: source.to_string(),
                });
            }
            Err(_) => {
                return Err(ResolveError::SecretResolutionFailed {
                    name: name.to_string(),
                    reason: format!(
                        "secret provider exceeded the {}s overall timeout",
                        timeout.as_secs_f64()
                    ),
                });
            }
        }
    }
    Ok(secrets)
}
