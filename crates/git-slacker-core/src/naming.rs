//! Logical name resolution shared by the command and event factories.
//!
//! A logical name such as `"slack/sendMessage"` or `"GitHub\\WebHook"` is
//! normalized to `"Slack/SendMessage"` and resolved through an override map
//! first and the static catalogue second. Resolutions are memoized.

use std::collections::HashMap;
use std::sync::Mutex;

/// Resolves logical names to catalogue entries of type `K`.
pub(crate) struct NameResolver<K: Copy> {
    overrides: HashMap<String, K>,
    catalogue: fn(&str) -> Option<K>,
    cache: Mutex<HashMap<String, Option<K>>>,
}

impl<K: Copy> NameResolver<K> {
    pub(crate) fn new(catalogue: fn(&str) -> Option<K>) -> Self {
        Self {
            overrides: HashMap::new(),
            catalogue,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Bind `alias` to `entry`, taking precedence over the naming convention.
    pub(crate) fn register(&mut self, alias: &str, entry: K) {
        let alias = normalize(alias);
        self.cache
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        self.overrides.insert(alias, entry);
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<K> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(entry) = cache.get(name) {
            return *entry;
        }

        let normalized = normalize(name);
        let entry = self
            .overrides
            .get(&normalized)
            .copied()
            .or_else(|| (self.catalogue)(&normalized));

        cache.insert(name.to_string(), entry);
        entry
    }

    #[cfg(test)]
    pub(crate) fn cached_names(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// Upper-case the first letter of every `/`- or `\`-separated segment.
pub(crate) fn normalize(name: &str) -> String {
    name.split(|c: char| c == '/' || c == '\\')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
