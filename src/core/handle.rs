//! A shared, refreshable view of the latest resolved configuration.

use crate::core::resolved::ResolvedConfiguration;
use crate::core::resolver::Resolver;
use crate::error::Result;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Lock-free handle over the most recent [`ResolvedConfiguration`].
///
/// Each resolution produces an immutable value; the handle lets many readers
/// share the latest one and lets any holder swap in a fresh resolution
/// without coordinating with the readers. Reads never block, and a reader
/// keeps whichever configuration it loaded even while a refresh lands.
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
///     .build()?;
/// let handle = ConfigHandle::initialize(resolver).await?;
///
/// // Lock-free read
/// let current = handle.current();
/// println!("{:?}", current.get("PORT"));
///
/// // Later, pick up file edits
/// handle.refresh().await?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigHandle {
    current: Arc<ArcSwap<ResolvedConfiguration>>,
    resolver: Arc<Resolver>,
}

impl ConfigHandle {
    /// Resolve once and wrap the result in a handle.
    ///
    /// # Errors
    ///
    /// Fails if the initial resolution fails; no handle exists until one
    /// configuration has resolved successfully.
    pub async fn initialize(resolver: Resolver) -> Result<Self> {
        let initial = resolver.resolve().await?;
        Ok(Self {
            current: Arc::new(ArcSwap::new(Arc::new(initial))),
            resolver: Arc::new(resolver),
        })
    }

    /// Get a reference-counted handle to the latest configuration.
    ///
    /// Lock-free; the returned `Arc` stays valid (and unchanged) however
    /// many refreshes happen after it is loaded.
    pub fn current(&self) -> Arc<ResolvedConfiguration> {
        self.current.load_full()
    }

    /// Re-run the resolution and atomically swap in the result.
    ///
    /// On failure the previous configuration stays in place, so readers
    /// never observe a partially resolved state.
    ///
    /// # Errors
    ///
    /// Propagates any resolution failure; see [`Resolver::resolve`].
    pub async fn refresh(&self) -> Result<()> {
        let next = self.resolver.resolve().await?;
        self.current.store(Arc::new(next));
        Ok(())
    }

    /// The resolver refreshes run through.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

impl Clone for ConfigHandle {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            resolver: Arc::clone(&self.resolver),
        }
    }
}
