//! Upstream dependency resolution

use super::{DependencySet, FileMetadata};
use std::path::Path;

/// Derives the upstream archives a file's content depends on
pub trait DependencyResolver: Send + Sync {
    fn dependencies(&self, path: &Path, metadata: &FileMetadata) -> DependencySet;
}

/// No upstream archives
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDependencies;

impl DependencyResolver for NoDependencies {
    fn dependencies(&self, _path: &Path, _metadata: &FileMetadata) -> DependencySet {
        DependencySet::new()
    }
}

/// The same dependency set for every file in the batch
#[derive(Debug, Clone, Default)]
pub struct StaticDependencies {
    dependencies: DependencySet,
}

impl StaticDependencies {
    pub fn new(dependencies: DependencySet) -> Self {
        Self { dependencies }
    }
}

impl DependencyResolver for StaticDependencies {
    fn dependencies(&self, _path: &Path, _metadata: &FileMetadata) -> DependencySet {
        self.dependencies.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(NoDependencies
            .dependencies(Path::new("a.nc"), &FileMetadata::new())
            .is_empty());
    }

    #[test]
    fn test_static_dependencies() {
        let mut declared = DependencySet::new();
        declared.insert("GCP/climate/baseline.nc".to_string(), None);
        declared.insert("GCP/climate/weights.nc".to_string(), Some("1.2.0".to_string()));

        let resolver = StaticDependencies::new(declared.clone());
        assert_eq!(resolver.dependencies(Path::new("a.nc"), &FileMetadata::new()), declared);
        assert_eq!(resolver.dependencies(Path::new("b.nc"), &FileMetadata::new()), declared);
    }
}
