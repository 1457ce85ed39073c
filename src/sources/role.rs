//! Source roles and the fixed precedence order of the cascade.

use crate::environment::Environment;
use std::fmt;

/// The role a configuration file plays within one resolution.
///
/// Roles form a fixed, total precedence order, which is the declaration
/// order of the variants below: later roles override earlier ones for
/// variables they both define. Secret values retrieved from the provider are
/// applied after every on-disk role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceRole {
    /// The entry-point file, `.env`
    EntryPoint,
    /// Cross-environment settings, `.env.common`
    Common,
    /// Uncommitted local overrides for the common file, `.env.common.local`
    CommonLocal,
    /// The required cross-environment baseline, `.env.shared`
    Shared,
    /// Uncommitted local overrides for the shared file, `.env.shared.local`
    SharedLocal,
    /// The file for the selected environment, e.g. `.env.test`
    Environment,
    /// Uncommitted local overrides for the environment file, e.g. `.env.test.local`
    EnvironmentLocal,
    /// The production backend or frontend file; only present when resolving
    /// production
    ProductionVariant,
}

/// The fixed precedence order, lowest first.
///
/// The list is a compile-time constant so ranks are stable across calls and
/// cannot drift between the locator and the merger.
pub(crate) const SOURCE_ORDER: [SourceRole; 8] = [
    SourceRole::EntryPoint,
    SourceRole::Common,
    SourceRole::CommonLocal,
    SourceRole::Shared,
    SourceRole::SharedLocal,
    SourceRole::Environment,
    SourceRole::EnvironmentLocal,
    SourceRole::ProductionVariant,
];

impl SourceRole {
    /// Whether the file must exist for resolution to succeed.
    ///
    /// Only the shared baseline is required; every other file, including the
    /// selected environment's own file, may be absent.
    pub fn required(&self) -> bool {
        matches!(self, Self::Shared)
    }

    /// Whether the file is permitted to contain secret material.
    ///
    /// True exactly for the `.local` roles, which are excluded from version
    /// control and documented through committed `-example` counterparts.
    /// Note that this covers hand-managed secrets only: variables bound to
    /// the secret provider must not appear with a literal value in any file.
    pub fn allows_secrets(&self) -> bool {
        matches!(self, Self::CommonLocal | Self::SharedLocal | Self::EnvironmentLocal)
    }

    /// The concrete file name for this role under the given environment.
    ///
    /// Returns `None` when the role does not participate in the environment's
    /// cascade (the production-variant role outside production).
    pub fn file_name(&self, environment: Environment) -> Option<String> {
        match self {
            Self::EntryPoint => Some(".env".to_string()),
            Self::Common => Some(".env.common".to_string()),
            Self::CommonLocal => Some(".env.common.local".to_string()),
            Self::Shared => Some(".env.shared".to_string()),
            Self::SharedLocal => Some(".env.shared.local".to_string()),
            Self::Environment => Some(format!(".env.{}", environment.name())),
            Self::EnvironmentLocal => Some(format!(".env.{}.local", environment.name())),
            Self::ProductionVariant => environment
                .variant()
                .map(|variant| format!(".env.production.{variant}")),
        }
    }

    /// Stable kebab-case identifier, e.g. `shared-local`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntryPoint => "entry-point",
            Self::Common => "common",
            Self::CommonLocal => "common-local",
            Self::Shared => "shared",
            Self::SharedLocal => "shared-local",
            Self::Environment => "environment",
            Self::EnvironmentLocal => "environment-local",
            Self::ProductionVariant => "production-variant",
        }
    }
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::ProductionVariant;

    #[test]
    fn test_only_shared_is_required() {
        let required: Vec<SourceRole> =
            SOURCE_ORDER.into_iter().filter(SourceRole::required).collect();
        assert_eq!(required, vec![SourceRole::Shared]);
    }

    #[test]
    fn test_local_roles_allow_secrets() {
        for role in SOURCE_ORDER {
            let is_local = matches!(
                role,
                SourceRole::CommonLocal | SourceRole::SharedLocal | SourceRole::EnvironmentLocal
            );
            assert_eq!(role.allows_secrets(), is_local);
        }
    }

    #[test]
    fn test_file_names_for_test_environment() {
        let env = Environment::Test;
        assert_eq!(SourceRole::EntryPoint.file_name(env).unwrap(), ".env");
        assert_eq!(SourceRole::Environment.file_name(env).unwrap(), ".env.test");
        assert_eq!(
            SourceRole::EnvironmentLocal.file_name(env).unwrap(),
            ".env.test.local"
        );
        assert_eq!(SourceRole::ProductionVariant.file_name(env), None);
    }

    #[test]
    fn test_file_names_for_production() {
        let env = Environment::Production(ProductionVariant::Frontend);
        assert_eq!(
            SourceRole::Environment.file_name(env).unwrap(),
            ".env.production"
        );
        assert_eq!(
            SourceRole::EnvironmentLocal.file_name(env).unwrap(),
            ".env.production.local"
        );
        assert_eq!(
            SourceRole::ProductionVariant.file_name(env).unwrap(),
            ".env.production.frontend"
        );
    }
}
