// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::LevelFilter;
use crate::Observer;

/// An immutable snapshot of registered observers, in registration order.
pub type Observers = Arc<Vec<Arc<dyn Observer>>>;

/// A copy-on-write set of observers.
///
/// Readers take a snapshot with a single atomic load and walk it without holding any lock, while
/// writers publish a fresh vector. A snapshot never changes after it is taken.
#[derive(Debug)]
pub struct Registry {
    observers: ArcSwap<Vec<Arc<dyn Observer>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            observers: ArcSwap::from_pointee(vec![]),
        }
    }

    /// Add an observer. Registering the same observer twice makes it notified twice.
    pub fn register(&self, observer: Arc<dyn Observer>) {
        self.observers.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(observer.clone());
            next
        });
    }

    /// Remove the first registration of `observer`, compared by identity.
    ///
    /// Returns `false` if the observer was not registered.
    pub fn unregister<O: Observer + ?Sized>(&self, observer: &Arc<O>) -> bool {
        if !self.observers.load().iter().any(|o| same(o, observer)) {
            return false;
        }

        let mut removed = false;
        self.observers.rcu(|current| {
            let mut next = Vec::clone(current);
            removed = match next.iter().position(|o| same(o, observer)) {
                Some(index) => {
                    next.remove(index);
                    true
                }
                None => false,
            };
            next
        });
        removed
    }

    /// The observers registered at the time of the call.
    pub fn snapshot(&self) -> Observers {
        self.observers.load_full()
    }

    /// Remove every observer.
    pub fn clear(&self) {
        self.observers.store(Arc::new(vec![]));
    }

    /// The number of registrations.
    pub fn len(&self) -> usize {
        self.observers.load().len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.observers.load().is_empty()
    }

    /// The union of all observer thresholds, or `Off` when there is no observer.
    pub fn max_level(&self) -> LevelFilter {
        self.observers
            .load()
            .iter()
            .fold(LevelFilter::Off, |acc, o| acc.union(o.level()))
    }
}

fn same<O: Observer + ?Sized>(a: &Arc<dyn Observer>, b: &Arc<O>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use crate::observer::Capture;

    #[test]
    fn duplicates_are_kept_and_removed_one_at_a_time() {
        let registry = Registry::new();
        let observer: Arc<dyn Observer> = Arc::new(Capture::new(Level::Info));

        registry.register(observer.clone());
        registry.register(observer.clone());
        assert_eq!(registry.len(), 2);

        assert!(registry.unregister(&observer));
        assert_eq!(registry.len(), 1);
        assert!(registry.unregister(&observer));
        assert!(!registry.unregister(&observer));
        assert!(registry.is_empty());
    }

    #[test]
    fn removal_is_by_identity() {
        let registry = Registry::new();
        let first: Arc<dyn Observer> = Arc::new(Capture::new(Level::Info));
        let second: Arc<dyn Observer> = Arc::new(Capture::new(Level::Info));
        registry.register(first.clone());

        assert!(!registry.unregister(&second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn snapshot_survives_mutation() {
        let registry = Registry::new();
        let observer: Arc<dyn Observer> = Arc::new(Capture::new(Level::Warn));
        registry.register(observer.clone());

        let snapshot = registry.snapshot();
        registry.clear();
        registry.register(Arc::new(Capture::new(Level::Debug)));

        assert_eq!(snapshot.len(), 1);
        assert!(same(&snapshot[0], &observer));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn max_level_is_the_most_verbose_threshold() {
        let registry = Registry::new();
        assert_eq!(registry.max_level(), LevelFilter::Off);

        registry.register(Arc::new(Capture::new(Level::Error)));
        registry.register(Arc::new(Capture::new(Level::Debug)));
        assert_eq!(registry.max_level(), LevelFilter::MoreSevereEqual(Level::Debug));
    }
}
