//! Fixed-capacity collection of bridge-chip configurations handled by the
//! multi-instance adapter.
use crate::config::InstanceConfig;
use crate::error::ConfigError;

/// Maximum number of bridge chips in one bundle.
pub const MAX_INSTANCES: usize = 8;

//==================================================================================BUNDLE_CONFIG
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Ordered instance configurations plus an explicit count.
///
/// Only the first `count` entries are meaningful; the remaining slots hold
/// default values and are never read.
pub struct BundleConfig {
    count: usize,
    instances: [InstanceConfig; MAX_INSTANCES],
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleConfig {
    /// Create an empty bundle. It does not pass [`validate`](Self::validate) until
    /// at least one instance has been pushed.
    pub fn new() -> Self {
        Self {
            count: 0,
            instances: [InstanceConfig::default(); MAX_INSTANCES],
        }
    }

    /// Copy `instances` into a bundle, rejecting an empty or oversized slice.
    pub fn from_slice(instances: &[InstanceConfig]) -> Result<Self, ConfigError> {
        if instances.is_empty() || instances.len() > MAX_INSTANCES {
            return Err(ConfigError::InvalidCount {
                count: instances.len(),
            });
        }
        let mut bundle = Self::new();
        bundle.instances[..instances.len()].copy_from_slice(instances);
        bundle.count = instances.len();
        Ok(bundle)
    }

    /// Append an instance.
    pub fn push(&mut self, instance: InstanceConfig) -> Result<(), ConfigError> {
        if self.count >= MAX_INSTANCES {
            return Err(ConfigError::CapacityExceeded);
        }
        self.instances[self.count] = instance;
        self.count += 1;
        Ok(())
    }

    /// Number of configured instances.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// View over the configured instances.
    #[inline]
    pub fn as_slice(&self) -> &[InstanceConfig] {
        &self.instances[..self.count.min(MAX_INSTANCES)]
    }

    /// Configuration of instance `index`, if present.
    pub fn get(&self, index: usize) -> Option<&InstanceConfig> {
        self.as_slice().get(index)
    }

    /// Count bounds, per-instance fields, and `(host, chip-select)` uniqueness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count > MAX_INSTANCES {
            return Err(ConfigError::InvalidCount { count: self.count });
        }
        validate_instances(self.as_slice())
    }
}

/// Checks a list of instances as `init` receives it.
///
/// Fails with `InvalidCount` outside `1..=MAX_INSTANCES`, with the
/// per-instance error of the first bad entry, then with `DuplicateResource`
/// for the first pair of instances sharing host and chip-select.
pub fn validate_instances(instances: &[InstanceConfig]) -> Result<(), ConfigError> {
    let count = instances.len();
    if count == 0 || count > MAX_INSTANCES {
        return Err(ConfigError::InvalidCount { count });
    }
    for (index, instance) in instances.iter().enumerate() {
        instance.validate(index)?;
    }
    for (first, a) in instances.iter().enumerate() {
        for (offset, b) in instances[first + 1..].iter().enumerate() {
            if a.resource() == b.resource() {
                return Err(ConfigError::DuplicateResource {
                    first,
                    second: first + 1 + offset,
                });
            }
        }
    }
    Ok(())
}
