use std::sync::OnceLock;

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::registry::BlockStateRegistry;

static REGISTRY: OnceLock<BlockStateRegistry> = OnceLock::new();

/// Loads the process-wide registry. Fails with `AlreadyInitialized` on any
/// call after the first successful one.
pub fn initialize(config: &RegistryConfig) -> Result<&'static BlockStateRegistry> {
    if REGISTRY.get().is_some() {
        return Err(RegistryError::AlreadyInitialized);
    }
    let registry = BlockStateRegistry::load(config)?;
    REGISTRY
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInitialized)?;
    REGISTRY.get().ok_or(RegistryError::AlreadyInitialized)
}

pub fn global() -> Option<&'static BlockStateRegistry> {
    REGISTRY.get()
}
