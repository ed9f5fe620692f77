use xmltab_core::EmptyContainerPolicy;

/// Where the intermediate result store keeps Pass 1 output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBacking {
    /// An anonymous temporary file, removed when the run ends.
    #[cfg(feature = "tempfile")]
    TempFile,
    /// An in-memory buffer.
    Memory,
}

impl Default for StoreBacking {
    /// `TempFile` on native builds, `Memory` otherwise.
    fn default() -> Self {
        #[cfg(feature = "tempfile")]
        {
            StoreBacking::TempFile
        }
        #[cfg(not(feature = "tempfile"))]
        {
            StoreBacking::Memory
        }
    }
}

/// Run-level settings of a [`Converter`](super::coordinator::Converter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Strip leading and trailing whitespace from extracted values.
    pub trim_whitespace: bool,
    pub empty_container_policy: EmptyContainerPolicy,
    pub store_backing: StoreBacking,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            trim_whitespace: true,
            empty_container_policy: EmptyContainerPolicy::default(),
            store_backing: StoreBacking::default(),
        }
    }
}

impl ConverterConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    pub fn with_empty_container_policy(mut self, policy: EmptyContainerPolicy) -> Self {
        self.empty_container_policy = policy;
        self
    }

    pub fn with_store_backing(mut self, backing: StoreBacking) -> Self {
        self.store_backing = backing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::new();
        assert!(config.trim_whitespace);
        assert_eq!(config.empty_container_policy, EmptyContainerPolicy::BlankRow);
        #[cfg(feature = "tempfile")]
        assert_eq!(config.store_backing, StoreBacking::TempFile);
    }

    #[test]
    fn test_with_methods() {
        let config = ConverterConfig::new()
            .with_trim_whitespace(false)
            .with_empty_container_policy(EmptyContainerPolicy::NoRow)
            .with_store_backing(StoreBacking::Memory);
        assert!(!config.trim_whitespace);
        assert_eq!(config.empty_container_policy, EmptyContainerPolicy::NoRow);
        assert_eq!(config.store_backing, StoreBacking::Memory);
    }
}
