//! Core resolution types: the pipeline, its output, and the shared handle.

mod handle;
mod merger;
mod resolved;
mod resolver;

pub use handle::ConfigHandle;
pub use resolved::{Provenance, ReportEntry, ResolutionReport, ResolvedConfiguration};
pub use resolver::{resolve_configuration, Resolver, ResolverBuilder};
