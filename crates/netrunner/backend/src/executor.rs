//! Executor registry
//!
//! Maps a symbolic executor kind (for example `"normal"`) to the launch target
//! a backend consumes: a binary path for local processes, an image reference
//! for containers. Populated once and read-only afterwards.

use std::collections::BTreeMap;

/// Immutable executor kind to launch target mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorRegistry {
    executors: BTreeMap<String, String>,
}

impl ExecutorRegistry {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            executors: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Resolve an executor kind to its launch target.
    pub fn resolve(&self, kind: &str) -> Option<&str> {
        self.executors.get(kind).map(String::as_str)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.executors.keys().map(String::as_str)
    }

    /// Distinct launch targets, in kind order.
    pub fn targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = Vec::new();
        for target in self.executors.values() {
            if !targets.contains(&target.as_str()) {
                targets.push(target);
            }
        }
        targets
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let registry = ExecutorRegistry::new([("normal", "/usr/local/bin/avalanchego")]);

        assert_eq!(registry.resolve("normal"), Some("/usr/local/bin/avalanchego"));
        assert_eq!(registry.resolve("byzantine"), None);
        assert_eq!(registry.kinds().collect::<Vec<_>>(), vec!["normal"]);
    }

    #[test]
    fn test_targets_are_deduplicated() {
        let registry = ExecutorRegistry::new([
            ("normal", "avaplatform/avalanchego:latest"),
            ("archive", "avaplatform/avalanchego:latest"),
            ("next", "avaplatform/avalanchego:next"),
        ]);

        assert_eq!(
            registry.targets(),
            vec!["avaplatform/avalanchego:latest", "avaplatform/avalanchego:next"]
        );
    }
}
