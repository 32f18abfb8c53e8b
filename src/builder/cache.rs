//! Checking whether a package is already built.

use tracing::warn;

use crate::builder::manager::PackageManager;
use crate::core::QualifiedPackageRef;

/// Answers whether a built artifact already exists for a package.
pub trait PackageCache {
    /// Never fails: anything that prevents an answer counts as "not built".
    fn has_built_artifact(&self, pkg: &QualifiedPackageRef) -> bool;
}

/// Cache backed by the package manager's local store.
///
/// Every call queries the store afresh.
pub struct StoreCache<'a> {
    store: &'a dyn PackageManager,
}

impl<'a> StoreCache<'a> {
    pub fn new(store: &'a dyn PackageManager) -> Self {
        StoreCache { store }
    }
}

impl PackageCache for StoreCache<'_> {
    fn has_built_artifact(&self, pkg: &QualifiedPackageRef) -> bool {
        match self.store.search(pkg) {
            Ok(found) => found,
            Err(e) => {
                warn!("could not query the package store for {}: {:#}", pkg, e);
                false
            }
        }
    }
}

/// A cache that never has anything, used when every package is rebuilt.
pub struct NoCache;

impl PackageCache for NoCache {
    fn has_built_artifact(&self, _pkg: &QualifiedPackageRef) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ns, pkg, MockPackageManager};

    #[test]
    fn test_store_hit_and_miss() {
        let store = MockPackageManager::new().with_cached("libbar/1.0");
        let cache = StoreCache::new(&store);

        assert!(cache.has_built_artifact(&pkg("libbar/1.0").qualify(&ns())));
        assert!(!cache.has_built_artifact(&pkg("libfoo/1.0").qualify(&ns())));
    }

    #[test]
    fn test_search_failure_is_a_miss() {
        let store = MockPackageManager::new()
            .with_cached("libbar/1.0")
            .fail_search("libbar/1.0");
        let cache = StoreCache::new(&store);

        assert!(!cache.has_built_artifact(&pkg("libbar/1.0").qualify(&ns())));
        assert_eq!(store.calls(), vec!["search libbar/1.0@foundry/stable"]);
    }

    #[test]
    fn test_no_cache() {
        assert!(!NoCache.has_built_artifact(&pkg("libbar/1.0").qualify(&ns())));
    }
}
