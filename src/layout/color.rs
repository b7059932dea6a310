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

use colored::Color;
use colored::ColoredString;
use colored::Colorize;

use crate::Level;

/// Colors for the level column of [`TextLayout`](super::TextLayout).
#[derive(Debug, Clone)]
pub struct LevelColor {
    /// Color for fatal records.
    pub fatal: Color,
    /// Color for error records.
    pub error: Color,
    /// Color for warning records.
    pub warn: Color,
    /// Color for info records.
    pub info: Color,
    /// Color for debug records.
    pub debug: Color,
    /// Color for trace records.
    pub trace: Color,
}

impl Default for LevelColor {
    fn default() -> Self {
        Self {
            fatal: Color::BrightRed,
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Green,
            debug: Color::Blue,
            trace: Color::Magenta,
        }
    }
}

impl LevelColor {
    /// Pad the level name to five columns and colorize it.
    pub fn colorize(&self, no_color: bool, level: Level) -> ColoredString {
        let padded = format!("{level:>5}");
        if no_color {
            return ColoredString::from(padded);
        }

        let color = match level {
            Level::Fatal => self.fatal,
            Level::Error => self.error,
            Level::Warn => self.warn,
            Level::Info => self.info,
            Level::Debug => self.debug,
            Level::Trace => self.trace,
        };
        padded.as_str().color(color)
    }
}
