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

use crate::Backend;
use crate::Observer;
use crate::StatusConfig;
use crate::StatusRecorder;
use crate::config::DEFAULT_MAX_ENTRIES;
use crate::observer::Console;

/// A builder for a [`StatusRecorder`].
///
/// # Examples
///
/// ```
/// use logstatus::StatusRecorder;
///
/// let recorder = StatusRecorder::builder()
///     .max_entries(50)
///     .no_fallback()
///     .build();
/// assert_eq!(recorder.max_entries(), 50);
/// ```
#[must_use = "call `build` to create the status recorder"]
#[derive(Debug)]
pub struct StatusRecorderBuilder {
    max_entries: usize,
    fallback: Option<Arc<dyn Observer>>,
    backend: Option<Box<dyn Backend>>,
    debug: bool,
}

impl Default for StatusRecorderBuilder {
    fn default() -> Self {
        Self::from_config(&StatusConfig::default())
    }
}

impl StatusRecorderBuilder {
    /// A builder initialized from resolved start-up values.
    ///
    /// The fallback output is a stderr [`Console`] at the configured fallback level, dropping
    /// the configured origin prefixes.
    pub fn from_config(config: &StatusConfig) -> Self {
        let fallback = Console::stderr()
            .with_level(config.effective_fallback_level())
            .with_excludes(config.exclude_prefixes.iter().cloned())
            .with_layout(config.layout());

        Self {
            max_entries: config.max_entries,
            fallback: Some(Arc::new(fallback)),
            backend: None,
            debug: config.debug,
        }
    }

    /// Set the maximum number of retained records. Default to 200.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set the observer notified while no listener is registered.
    ///
    /// Default to a stderr [`Console`] at `ERROR`.
    pub fn fallback(mut self, fallback: Arc<dyn Observer>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Disable the fallback output.
    pub fn no_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    /// Install a backend for enablement checks.
    pub fn backend(mut self, backend: impl Into<Box<dyn Backend>>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Turn debug mode on or off.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the recorder.
    pub fn build(self) -> StatusRecorder {
        StatusRecorder::new(self.max_entries, self.fallback, self.backend, self.debug)
    }
}

impl StatusRecorder {
    /// Build a recorder from resolved start-up values.
    pub fn from_config(config: &StatusConfig) -> StatusRecorder {
        StatusRecorderBuilder::from_config(config).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LevelFilter;

    #[test]
    fn defaults_follow_default_config() {
        let recorder = StatusRecorder::builder().build();
        assert_eq!(recorder.max_entries(), DEFAULT_MAX_ENTRIES);
        assert!(!recorder.is_debug());
    }

    #[test]
    fn debug_config_opens_the_fallback() {
        let config = StatusConfig {
            debug: true,
            max_entries: 3,
            ..StatusConfig::default()
        };
        let builder = StatusRecorderBuilder::from_config(&config);
        let fallback = builder.fallback.as_ref().unwrap();
        assert_eq!(fallback.level(), LevelFilter::All);

        let recorder = builder.build();
        assert!(recorder.is_debug());
        assert_eq!(recorder.max_entries(), 3);
    }
}
