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

//! Enablement checks delegated to an installed logging backend.

use std::fmt;

use crate::Level;
use crate::LevelFilter;

/// A logging backend the recorder consults in [`is_enabled`](crate::StatusRecorder::is_enabled).
///
/// Until a backend is installed, every level counts as enabled.
pub trait Backend: fmt::Debug + Send + Sync + 'static {
    /// Whether status records at `level` should be produced.
    fn enabled(&self, level: Level) -> bool;
}

impl<T: Backend> From<T> for Box<dyn Backend> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// A backend with a fixed threshold.
#[derive(Debug, Clone, Copy)]
pub struct LevelBackend(pub LevelFilter);

impl Backend for LevelBackend {
    fn enabled(&self, level: Level) -> bool {
        self.0.test(level)
    }
}

/// A backend that asks the global [`log`] logger.
///
/// # Examples
///
/// ```
/// use logstatus::backend::LogCrateBackend;
///
/// logstatus::status().set_backend(LogCrateBackend::default());
/// ```
#[derive(Debug, Clone)]
pub struct LogCrateBackend {
    target: String,
}

impl Default for LogCrateBackend {
    fn default() -> Self {
        Self::new("logstatus")
    }
}

impl LogCrateBackend {
    /// Create a backend that checks the given `log` target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Backend for LogCrateBackend {
    fn enabled(&self, level: Level) -> bool {
        let metadata = log::Metadata::builder()
            .level(level.into())
            .target(&self.target)
            .build();
        log::max_level() >= log::Level::from(level) && log::logger().enabled(&metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_backend_uses_threshold() {
        let backend = LevelBackend(LevelFilter::MoreSevereEqual(Level::Error));
        assert!(backend.enabled(Level::Fatal));
        assert!(!backend.enabled(Level::Warn));
    }

    #[test]
    fn log_crate_backend_without_logger_is_disabled() {
        // no global logger is installed in unit tests, and the default max level is `Off`
        let backend = LogCrateBackend::default();
        assert!(!backend.enabled(Level::Error));
    }
}
