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

use std::fmt;
use std::io;
use std::io::Write;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::Error;
use crate::Level;
use crate::LevelFilter;
use crate::Observer;
use crate::StatusRecord;
use crate::layout::Layout;
use crate::layout::TextLayout;

/// An observer that writes records as text lines to a stream.
///
/// Records whose origin starts with one of the excluded prefixes are dropped silently.
///
/// # Examples
///
/// ```
/// use logstatus::Level;
/// use logstatus::observer::Console;
///
/// let console = Console::stderr()
///     .with_level(Level::Info)
///     .exclude("app::noisy");
/// ```
pub struct Console {
    level: LevelFilter,
    excludes: Vec<String>,
    layout: Box<dyn Layout>,
    target: Target,
}

enum Target {
    Stdout,
    Stderr,
    Writer(Mutex<Box<dyn Write + Send>>),
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match self.target {
            Target::Stdout => "stdout",
            Target::Stderr => "stderr",
            Target::Writer(_) => "writer",
        };
        f.debug_struct("Console")
            .field("level", &self.level)
            .field("excludes", &self.excludes)
            .field("layout", &self.layout)
            .field("target", &target)
            .finish()
    }
}

impl Console {
    fn with_target(target: Target) -> Self {
        Self {
            level: LevelFilter::MoreSevereEqual(Level::Warn),
            excludes: vec![],
            layout: Box::new(TextLayout::default()),
            target,
        }
    }

    /// A console observer writing to standard output.
    pub fn stdout() -> Self {
        Self::with_target(Target::Stdout)
    }

    /// A console observer writing to standard error.
    pub fn stderr() -> Self {
        Self::with_target(Target::Stderr)
    }

    /// A console observer writing to an arbitrary stream.
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        Self::with_target(Target::Writer(Mutex::new(Box::new(writer))))
    }

    /// Set the threshold. Default to `WARN`.
    pub fn with_level(mut self, level: impl Into<LevelFilter>) -> Self {
        self.level = level.into();
        self
    }

    /// Drop records whose origin starts with `prefix`.
    pub fn exclude(mut self, prefix: impl Into<String>) -> Self {
        self.excludes.push(prefix.into());
        self
    }

    /// Drop records whose origin starts with any of `prefixes`.
    pub fn with_excludes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Set the layout. Default to [`TextLayout`].
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }

    fn excluded(&self, record: &StatusRecord) -> bool {
        match record.origin() {
            Some(origin) => self.excludes.iter().any(|p| origin.starts_with(p.as_str())),
            None => false,
        }
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        match &self.target {
            Target::Stdout => io::stdout().lock().write_all(bytes),
            Target::Stderr => io::stderr().lock().write_all(bytes),
            Target::Writer(writer) => {
                let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
                writer.write_all(bytes)?;
                writer.flush()
            }
        }
    }
}

impl Observer for Console {
    fn level(&self) -> LevelFilter {
        self.level
    }

    fn notify(&self, record: &StatusRecord) -> Result<(), Error> {
        if self.excluded(record) {
            return Ok(());
        }

        let mut bytes = self.layout.format(record)?;
        bytes.push(b'\n');
        self.write(&bytes).map_err(Error::from_io_error)
    }
}
