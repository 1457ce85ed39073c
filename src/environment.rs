//! Environment selection.
//!
//! Environments form a closed set; representing them as an enum (rather than
//! free-form strings) makes `UnknownEnvironment` impossible once a value of
//! this type exists. Production splits into a backend and a frontend variant,
//! which are mutually exclusive within one resolution.

use crate::error::{ResolveError, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Deployment variant of the production environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductionVariant {
    /// Server-side deployment (`.env.production.backend`)
    Backend,
    /// Client-bundle deployment (`.env.production.frontend`)
    Frontend,
}

impl ProductionVariant {
    /// The lowercase identifier used in file names and raw input.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Frontend => "frontend",
        }
    }
}

impl fmt::Display for ProductionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of environments a configuration can be resolved for.
///
/// # Examples
///
/// ```rust
/// use envcascade::environment::{Environment, ProductionVariant};
///
/// let env = Environment::select("dev", None).unwrap();
/// assert_eq!(env, Environment::Dev);
///
/// let env = Environment::select("production", Some("backend")).unwrap();
/// assert_eq!(env, Environment::Production(ProductionVariant::Backend));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Local development
    Dev,
    /// Test runs (local or otherwise)
    Test,
    /// Continuous integration
    Ci,
    /// Production, split into mutually exclusive variants
    Production(ProductionVariant),
}

impl Environment {
    /// Select an environment from a raw name and an optional production
    /// variant.
    ///
    /// Names are matched exactly and case-sensitively against the closed set
    /// `dev`, `test`, `ci`, `production`. A variant is required for
    /// `production` and ignored (with a warning) for everything else.
    ///
    /// # Errors
    ///
    /// - `UnknownEnvironment` when the name is outside the closed set, or
    ///   when a supplied production variant is neither `backend` nor
    ///   `frontend`
    /// - `MissingProductionVariant` when `production` is selected without a
    ///   variant
    pub fn select(name: &str, variant: Option<&str>) -> Result<Self> {
        let environment = match name {
            "dev" => Self::Dev,
            "test" => Self::Test,
            "ci" => Self::Ci,
            "production" => {
                return match variant {
                    None => Err(ResolveError::MissingProductionVariant),
                    Some("backend") => Ok(Self::Production(ProductionVariant::Backend)),
                    Some("frontend") => Ok(Self::Production(ProductionVariant::Frontend)),
                    Some(other) => Err(ResolveError::UnknownEnvironment(format!(
                        "production.{other}"
                    ))),
                };
            }
            other => return Err(ResolveError::UnknownEnvironment(other.to_string())),
        };

        if let Some(variant) = variant {
            warn!(environment = name, variant, "variant ignored for non-production environment");
        }

        Ok(environment)
    }

    /// Read the environment from a process environment variable.
    ///
    /// The value may use the dotted form (e.g. `production.backend`). An
    /// unset, empty, or whitespace-only variable counts as unspecified.
    ///
    /// # Errors
    ///
    /// `MissingEnvironment` when the variable is effectively unset, plus the
    /// same errors as [`Environment::select`] for invalid values.
    pub fn from_env_var(key: &str) -> Result<Self> {
        match std::env::var(key) {
            Ok(raw) if !raw.trim().is_empty() => raw.trim().parse(),
            _ => Err(ResolveError::MissingEnvironment),
        }
    }

    /// The lowercase base name (`dev`, `test`, `ci`, `production`), without
    /// any variant suffix.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Ci => "ci",
            Self::Production(_) => "production",
        }
    }

    /// The production variant, when this is a production environment.
    pub fn variant(&self) -> Option<ProductionVariant> {
        match self {
            Self::Production(variant) => Some(*variant),
            _ => None,
        }
    }

    /// Whether this is one of the production variants.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production(_))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production(variant) => write!(f, "production.{variant}"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Environment {
    type Err = ResolveError;

    /// Parse the dotted form: `dev`, `test`, `ci`, `production.backend`,
    /// `production.frontend`.
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((name, variant)) => Self::select(name, Some(variant)),
            None => Self::select(s, None),
        }
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
