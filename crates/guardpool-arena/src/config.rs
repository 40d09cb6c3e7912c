//! Arena configuration parameters.

use crate::error::ConfigError;
use crate::layout::{ALIGN, BLOCK_OVERHEAD};
use crate::provider::{BumpProvider, FreeListProvider, StorageProvider};

/// Which built-in [`StorageProvider`] backs an arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProviderKind {
    /// [`BumpProvider`]: space is reclaimed only from the top.
    Bump,
    /// [`FreeListProvider`]: first-fit reuse of released ranges.
    #[default]
    FreeList,
}

impl ProviderKind {
    /// Build a provider of this kind over `capacity` bytes.
    pub fn build(self, capacity: u32) -> Box<dyn StorageProvider> {
        match self {
            Self::Bump => Box::new(BumpProvider::new(capacity)),
            Self::FreeList => Box::new(FreeListProvider::new(capacity)),
        }
    }
}

/// Configuration for an [`Arena`](crate::Arena).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Size of the arena buffer in bytes.
    ///
    /// Default: 2048. Must be a multiple of 4 and large enough for one
    /// 4-byte block plus its bookkeeping.
    pub capacity: u32,

    /// Placement strategy. Default: [`ProviderKind::FreeList`].
    pub provider: ProviderKind,
}

impl ArenaConfig {
    /// Default arena size in bytes.
    pub const DEFAULT_CAPACITY: u32 = 2048;

    /// Smallest capacity that fits one block with a 4-byte payload.
    pub const MIN_CAPACITY: u32 = BLOCK_OVERHEAD + ALIGN;

    /// Create a config for `capacity` bytes with the default provider.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            provider: ProviderKind::default(),
        }
    }

    /// Replace the provider kind.
    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity % ALIGN != 0 {
            return Err(ConfigError::CapacityNotAligned {
                capacity: self.capacity,
            });
        }
        if self.capacity < Self::MIN_CAPACITY {
            return Err(ConfigError::CapacityTooSmall {
                capacity: self.capacity,
                minimum: Self::MIN_CAPACITY,
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_2k_free_list() {
        let config = ArenaConfig::default();
        assert_eq!(config.capacity, 2048);
        assert_eq!(config.provider, ProviderKind::FreeList);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unaligned_capacity_rejected() {
        let err = ArenaConfig::new(2047).validate().unwrap_err();
        assert_eq!(err, ConfigError::CapacityNotAligned { capacity: 2047 });
    }

    #[test]
    fn tiny_capacity_rejected() {
        let err = ArenaConfig::new(8).validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::CapacityTooSmall {
                capacity: 8,
                minimum: 12
            }
        );
        assert!(ArenaConfig::new(12).validate().is_ok());
    }

    #[test]
    fn provider_kind_builds_matching_provider() {
        assert_eq!(ProviderKind::Bump.build(64).name(), "bump");
        assert_eq!(ProviderKind::FreeList.build(64).name(), "free-list");
        assert_eq!(ProviderKind::FreeList.build(64).capacity(), 64);
    }
}
