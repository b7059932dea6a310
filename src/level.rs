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

//! Severity levels and thresholds.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The severity of a status record.
///
/// Levels are ordered the way the `log` crate orders them: a more severe level compares less
/// than a more verbose one, so `Level::Fatal < Level::Trace`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// The logging system cannot continue.
    Fatal,
    /// Designates very serious errors, such as a configuration that failed to load.
    Error,
    /// Designates hazardous situations.
    Warn,
    /// Designates useful information.
    Info,
    /// Designates lower priority information.
    Debug,
    /// Designates very low priority, often extremely verbose, information.
    Trace,
}

impl Level {
    /// All levels, most severe first.
    pub const ALL: [Level; 6] = [
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Level, Self::Err> {
        let s = s.trim();
        for (name, level) in [
            ("fatal", Level::Fatal),
            ("crit", Level::Fatal),
            ("error", Level::Error),
            ("warn", Level::Warn),
            ("warning", Level::Warn),
            ("info", Level::Info),
            ("debug", Level::Debug),
            ("trace", Level::Trace),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(Error::new("malformed status level").with_context("input", format!("{s:?}")))
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug => Level::Debug,
            log::Level::Trace => Level::Trace,
        }
    }
}

impl From<Level> for log::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Fatal | Level::Error => log::Level::Error,
            Level::Warn => log::Level::Warn,
            Level::Info => log::Level::Info,
            Level::Debug => log::Level::Debug,
            Level::Trace => log::Level::Trace,
        }
    }
}

/// A threshold deciding which levels an observer receives.
///
/// `Off` and `All` are sentinels: they appear only in comparisons and never in a record.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum LevelFilter {
    /// Admits nothing.
    Off,
    /// Admits the given level and every level more severe than it.
    MoreSevereEqual(Level),
    /// Admits everything.
    All,
}

impl LevelFilter {
    /// Checks whether the given level passes this threshold.
    ///
    /// # Examples
    ///
    /// ```
    /// use logstatus::Level;
    /// use logstatus::LevelFilter;
    ///
    /// let filter = LevelFilter::MoreSevereEqual(Level::Warn);
    ///
    /// assert!(!filter.test(Level::Info));
    /// assert!(filter.test(Level::Warn));
    /// assert!(filter.test(Level::Fatal));
    /// ```
    pub fn test(&self, level: Level) -> bool {
        match self {
            LevelFilter::Off => false,
            LevelFilter::MoreSevereEqual(l) => level <= *l,
            LevelFilter::All => true,
        }
    }

    /// Parse a threshold, falling back to `default` when the input is not a known level name.
    pub fn parse_or(s: &str, default: LevelFilter) -> LevelFilter {
        s.parse().unwrap_or(default)
    }

    /// Return the threshold that admits everything either `self` or `other` admits.
    pub fn union(self, other: LevelFilter) -> LevelFilter {
        match (self, other) {
            (LevelFilter::All, _) | (_, LevelFilter::All) => LevelFilter::All,
            (LevelFilter::Off, f) | (f, LevelFilter::Off) => f,
            (LevelFilter::MoreSevereEqual(a), LevelFilter::MoreSevereEqual(b)) => {
                LevelFilter::MoreSevereEqual(a.max(b))
            }
        }
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        LevelFilter::MoreSevereEqual(level)
    }
}

impl From<log::LevelFilter> for LevelFilter {
    fn from(filter: log::LevelFilter) -> Self {
        match filter.to_level() {
            Some(level) => LevelFilter::MoreSevereEqual(level.into()),
            None => LevelFilter::Off,
        }
    }
}

impl FromStr for LevelFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<LevelFilter, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("off") {
            Ok(LevelFilter::Off)
        } else if trimmed.eq_ignore_ascii_case("all") {
            Ok(LevelFilter::All)
        } else {
            trimmed.parse().map(LevelFilter::MoreSevereEqual)
        }
    }
}
