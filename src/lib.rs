//! # envcascade
//!
//! Layered environment-file resolution with fixed precedence, provenance
//! tracking, and provider-backed secrets.
//!
//! ## Overview
//!
//! `envcascade` merges a fixed cascade of dotenv-style files into one
//! configuration for a selected environment:
//! - A closed environment set: `dev`, `test`, `ci`, and `production` with a
//!   `backend` or `frontend` variant
//! - Deterministic last-write-wins precedence over a fixed file order
//! - Per-variable provenance: every value knows which file (or the secret
//!   provider) supplied it
//! - Secret-bound variables fetched through an injected [`SecretProvider`],
//!   never stored in files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use envcascade::prelude::*;
//!
//! # async fn example() -> envcascade::error::Result<()> {
//! // Resolve for an environment named on the command line or in CI
//! let resolved = resolve_configuration("config", "dev", None).await?;
//!
//! println!("DATABASE_URL = {:?}", resolved.get("DATABASE_URL"));
//! if let Some(provenance) = resolved.provenance("DATABASE_URL") {
//!     println!("  set by {provenance}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## The cascade
//!
//! Files are read from the base directory in a fixed order; later files
//! override earlier ones. For environment `dev`:
//!
//! | Rank | File | Notes |
//! |------|------|-------|
//! | 0 | `.env` | entry point |
//! | 1 | `.env.common` | |
//! | 2 | `.env.common.local` | uncommitted |
//! | 3 | `.env.shared` | **required** |
//! | 4 | `.env.shared.local` | uncommitted |
//! | 5 | `.env.dev` | |
//! | 6 | `.env.dev.local` | uncommitted |
//!
//! Production resolutions append `.env.production.backend` or
//! `.env.production.frontend` after the environment's own files. Every file
//! except `.env.shared` is optional.
//!
//! ## Secrets
//!
//! Bind the names whose values live in an external store and hand the
//! resolver a [`SecretProvider`]; bound names must never appear with a
//! literal value in any file:
//!
//! ```rust,no_run
//! use envcascade::prelude::*;
//!
//! # async fn example() -> envcascade::error::Result<()> {
//! let resolver = Resolver::builder()
//!     .with_base_dir("config")
//!     .with_environment(Environment::Production(ProductionVariant::Backend))
//!     .with_secret_binding("DATABASE_PASSWORD")
//!     .with_secret_provider(StaticProvider::new().with_secret("DATABASE_PASSWORD", "hunter2"))
//!     .build()?;
//!
//! let resolved = resolver.resolve().await?;
//! # Ok(())
//! # }
//! ```
//!
//! For long-running services, wrap the resolver in a
//! [`ConfigHandle`](crate::core::ConfigHandle) to share the latest resolution
//! across tasks with lock-free reads and atomic refreshes.
//!
//! [`SecretProvider`]: crate::secrets::SecretProvider

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod environment;
pub mod error;
pub mod secrets;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        resolve_configuration, ConfigHandle, ResolvedConfiguration, Resolver, ResolverBuilder,
    };
    pub use crate::environment::{Environment, ProductionVariant};
    pub use crate::error::{ResolveError, Result};
    pub use crate::secrets::{SecretBindings, SecretProvider, StaticProvider};
}
