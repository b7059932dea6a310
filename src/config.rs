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

//! Start-up configuration of the status recorder.

use std::env;

use crate::Level;
use crate::LevelFilter;
use crate::layout::TextLayout;
use crate::observer::Console;

/// Environment variable holding the maximum number of history entries.
pub const ENTRIES_ENV: &str = "LOGSTATUS_ENTRIES";
/// Environment variable holding the threshold of the default console observer.
pub const LEVEL_ENV: &str = "LOGSTATUS_LEVEL";
/// Environment variable turning debug mode on.
pub const DEBUG_ENV: &str = "LOGSTATUS_DEBUG";
/// Environment variable holding comma separated origin prefixes excluded from console output.
pub const EXCLUDE_ENV: &str = "LOGSTATUS_EXCLUDE";
/// Environment variable holding the `strftime` format of console timestamps.
pub const DATE_FORMAT_ENV: &str = "LOGSTATUS_DATE_FORMAT";

/// Default maximum number of history entries.
pub const DEFAULT_MAX_ENTRIES: usize = 200;

/// Already resolved start-up values for the status recorder.
///
/// The values are read once, before the recorder exists. Invalid input never fails: it falls
/// back to the documented default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusConfig {
    /// Maximum number of records kept in history. Default to 200.
    pub max_entries: usize,
    /// Threshold of the default console observer. Default to `WARN`.
    pub listener_level: LevelFilter,
    /// Threshold of the fallback output used while no listener is registered. Default to `ERROR`.
    pub fallback_level: LevelFilter,
    /// Report everything: the fallback prints every record and every level counts as enabled.
    pub debug: bool,
    /// Origin prefixes the default console observer drops.
    pub exclude_prefixes: Vec<String>,
    /// `strftime` format of console timestamps.
    pub date_format: Option<String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            listener_level: LevelFilter::MoreSevereEqual(Level::Warn),
            fallback_level: LevelFilter::MoreSevereEqual(Level::Error),
            debug: false,
            exclude_prefixes: vec![],
            date_format: None,
        }
    }
}

impl StatusConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StatusConfig::default();

        if let Some(entries) = lookup(ENTRIES_ENV) {
            if let Ok(entries) = entries.trim().parse() {
                config.max_entries = entries;
            }
        }

        if let Some(level) = lookup(LEVEL_ENV) {
            config.listener_level = LevelFilter::parse_or(&level, config.listener_level);
        }

        if let Some(debug) = lookup(DEBUG_ENV) {
            config.debug = parse_flag(&debug);
        }

        if let Some(excludes) = lookup(EXCLUDE_ENV) {
            config.exclude_prefixes = excludes
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(format) = lookup(DATE_FORMAT_ENV) {
            if !format.trim().is_empty() {
                config.date_format = Some(format);
            }
        }

        config
    }

    /// The threshold of the fallback output, taking debug mode into account.
    pub fn effective_fallback_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::All
        } else {
            self.fallback_level
        }
    }

    /// Build the console observer described by this configuration, writing to standard error.
    pub fn console(&self) -> Console {
        Console::stderr()
            .with_level(self.listener_level)
            .with_excludes(self.exclude_prefixes.iter().cloned())
            .with_layout(self.layout())
    }

    pub(crate) fn layout(&self) -> TextLayout {
        #[cfg(feature = "jiff")]
        if let Some(format) = &self.date_format {
            return TextLayout::default().date_format(format.clone());
        }
        TextLayout::default()
    }
}

// a flag that is present but empty counts as set
fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value == "1"
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("on")
}
