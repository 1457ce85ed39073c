//! The resolution pipeline and its builder.

use crate::core::merger::merge;
use crate::core::resolved::ResolvedConfiguration;
use crate::environment::Environment;
use crate::error::{ResolveError, Result};
use crate::secrets::{fetch_secrets, SecretBindings, SecretProvider};
use crate::sources::locate;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// How long the resolver waits for the whole batch of secret fetches.
const DEFAULT_SECRET_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for constructing a [`Resolver`].
///
/// Provides a fluent interface over everything a resolution depends on: the
/// directory the files live in, the environment to resolve for, and the
/// secret bindings with their provider.
///
/// # Examples
///
/// ```rust,no_run
/// use envcascade::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let resolver = Resolver::builder()
///     .with_base_dir("config")
///     .with_environment(Environment::Dev)
///     .with_secret_binding("DATABASE_PASSWORD")
///     .with_secret_provider(StaticProvider::new().with_secret("DATABASE_PASSWORD", "hunter2"))
///     .build()?;
/// let resolved = resolver.resolve().await?;
/// # Ok(())
/// # }
/// ```
pub struct ResolverBuilder {
    base_dir: PathBuf,
    environment: Option<Environment>,
    environment_name: Option<String>,
    production_variant: Option<String>,
    bindings: SecretBindings,
    provider: Option<Arc<dyn SecretProvider>>,
    secret_timeout: Duration,
}

impl ResolverBuilder {
    /// Create a builder with default settings: files are looked up in the
    /// current directory and no secrets are bound.
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            environment: None,
            environment_name: None,
            production_variant: None,
            bindings: SecretBindings::new(),
            provider: None,
            secret_timeout: DEFAULT_SECRET_TIMEOUT,
        }
    }

    /// Set the directory the configuration files live in.
    pub fn with_base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = path.into();
        self
    }

    /// Select the environment to resolve for.
    ///
    /// Overrides any raw name given through
    /// [`with_environment_name`](Self::with_environment_name).
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Select the environment by its raw name, e.g. from a command-line flag.
    ///
    /// The name is checked against the closed environment set when
    /// [`build`](Self::build) runs; production additionally needs a variant
    /// from [`with_production_variant`](Self::with_production_variant).
    pub fn with_environment_name(mut self, name: impl Into<String>) -> Self {
        self.environment_name = Some(name.into());
        self
    }

    /// Supply the production variant (`backend` or `frontend`) accompanying a
    /// raw environment name.
    pub fn with_production_variant(mut self, variant: impl Into<String>) -> Self {
        self.production_variant = Some(variant.into());
        self
    }

    /// Bind one variable name to the secret provider.
    pub fn with_secret_binding(mut self, name: impl Into<String>) -> Self {
        self.bindings.bind(name);
        self
    }

    /// Bind every name in `bindings`, keeping any already bound.
    pub fn with_secret_bindings(mut self, bindings: SecretBindings) -> Self {
        self.bindings.extend(bindings.iter().map(str::to_string));
        self
    }

    /// Set the provider that secret-bound names are fetched through.
    pub fn with_secret_provider<P: SecretProvider + 'static>(mut self, provider: P) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Set the overall deadline for the batch of secret fetches.
    ///
    /// The default is ten seconds for the whole batch, not per call.
    pub fn with_secret_timeout(mut self, timeout: Duration) -> Self {
        self.secret_timeout = timeout;
        self
    }

    /// Validate the selection and produce a [`Resolver`].
    ///
    /// # Errors
    ///
    /// Returns an error if no environment was given, the raw name is outside
    /// the closed environment set, or `production` was named without a
    /// variant. No files are read at this point.
    pub fn build(self) -> Result<Resolver> {
        let environment = match (self.environment, self.environment_name) {
            (Some(environment), _) => environment,
            (None, Some(name)) => {
                Environment::select(&name, self.production_variant.as_deref())?
            }
            (None, None) => return Err(ResolveError::MissingEnvironment),
        };
        Ok(Resolver {
            base_dir: self.base_dir,
            environment,
            bindings: self.bindings,
            provider: self.provider,
            secret_timeout: self.secret_timeout,
        })
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the configuration cascade for one environment.
///
/// A resolver is cheap to keep around and can resolve repeatedly; each call
/// re-reads the files and re-fetches the bound secrets, producing a fresh
/// [`ResolvedConfiguration`].
pub struct Resolver {
    base_dir: PathBuf,
    environment: Environment,
    bindings: SecretBindings,
    provider: Option<Arc<dyn SecretProvider>>,
    secret_timeout: Duration,
}

impl Resolver {
    /// Create a new builder for constructing a resolver.
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// The environment this resolver was built for.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// The directory the configuration files are looked up in.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Run the pipeline once: read the cascade, fetch the bound secrets, and
    /// merge everything into a [`ResolvedConfiguration`].
    ///
    /// The pipeline fails fast: the first error from any stage aborts the
    /// resolution and nothing partial is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the base directory is not a directory, a required
    /// file is missing, any file has a malformed line, a secret cannot be
    /// fetched, or a secret-bound name carries a literal value on disk.
    pub async fn resolve(&self) -> Result<ResolvedConfiguration> {
        if !self.base_dir.is_dir() {
            return Err(ResolveError::BaseDirUnavailable {
                path: self.base_dir.clone(),
            });
        }

        let mut layers = Vec::new();
        for source in locate(&self.base_dir, self.environment) {
            let map = source.load()?;
            layers.push((source, map));
        }
        let source_count = layers.len();

        let secrets = fetch_secrets(
            self.provider.as_deref(),
            &self.bindings,
            self.secret_timeout,
        )
        .await?;

        let resolved = merge(self.environment, layers, secrets, &self.bindings)?;
        info!(
            environment = %self.environment,
            sources = source_count,
            variables = resolved.len(),
            "configuration resolved"
        );
        Ok(resolved)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("base_dir", &self.base_dir)
            .field("environment", &self.environment)
            .field("bindings", &self.bindings)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn SecretProvider>"))
            .field("secret_timeout", &self.secret_timeout)
            .finish()
    }
}

/// Resolve in one call from a raw environment name.
///
/// Covers the common case of wiring a command-line or CI-provided name
/// straight to a configuration, without secret bindings. Use
/// [`Resolver::builder`] when secrets are involved.
///
/// # Examples
///
/// ```rust,no_run
/// use envcascade::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let resolved = resolve_configuration("config", "production", Some("backend")).await?;
/// println!("{} variables", resolved.len());
/// # Ok(())
/// # }
/// ```
pub async fn resolve_configuration(
    base_dir: impl Into<PathBuf>,
    environment_name: &str,
    production_variant: Option<&str>,
) -> Result<ResolvedConfiguration> {
    let mut builder = Resolver::builder()
        .with_base_dir(base_dir)
        .with_environment_name(environment_name);
    if let Some(variant) = production_variant {
        builder = builder.with_production_variant(variant);
    }
    builder.build()?.resolve().await
}
