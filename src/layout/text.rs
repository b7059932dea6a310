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

use std::fmt::Write;
use std::time::SystemTime;

#[cfg(feature = "jiff")]
use jiff::tz::TimeZone;

use crate::Error;
use crate::StatusRecord;
use crate::layout::Layout;
#[cfg(feature = "colored")]
use crate::layout::LevelColor;

#[cfg(feature = "jiff")]
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6f%:z";

/// A layout that renders a status record as one line of text.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00 ERROR [main] app::config(src/config.rs:42) cannot load: file missing
/// 2024-08-11T22:44:57.172219+08:00  WARN [main] plugin scan found no plugins
/// ```
///
/// The thread name and call site columns are omitted when unknown. A captured error is appended
/// after the message with its whole cause chain.
///
/// # Examples
///
/// ```
/// use logstatus::layout::TextLayout;
///
/// let layout = TextLayout::default().without_timestamp();
/// ```
#[derive(Debug, Clone)]
pub struct TextLayout {
    timestamp: bool,
    #[cfg_attr(not(feature = "colored"), allow(dead_code))]
    no_color: bool,
    #[cfg(feature = "colored")]
    colors: LevelColor,
    #[cfg(feature = "jiff")]
    date_format: Option<String>,
    #[cfg(feature = "jiff")]
    tz: Option<TimeZone>,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            timestamp: true,
            no_color: false,
            #[cfg(feature = "colored")]
            colors: LevelColor::default(),
            #[cfg(feature = "jiff")]
            date_format: None,
            #[cfg(feature = "jiff")]
            tz: None,
        }
    }
}

impl TextLayout {
    /// Omit the timestamp column.
    pub fn without_timestamp(mut self) -> Self {
        self.timestamp = false;
        self
    }

    /// Disable level colors. Levels are never colored without the `colored` feature.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Customize the level colors.
    #[cfg(feature = "colored")]
    pub fn colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }

    /// Set a `strftime` format for the timestamp column.
    ///
    /// Default to `%Y-%m-%dT%H:%M:%S.%6f%:z`. An invalid format makes rendering fail.
    #[cfg(feature = "jiff")]
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Set the time zone of the timestamp column. Default to the system time zone.
    #[cfg(feature = "jiff")]
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    #[cfg(feature = "jiff")]
    fn write_time(&self, text: &mut String, time: SystemTime) -> Result<(), Error> {
        let timestamp = jiff::Timestamp::try_from(time)
            .map_err(|err| Error::new("status record time out of range").with_source(err))?;
        let tz = self.tz.clone().unwrap_or_else(TimeZone::system);
        let format = self.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
        write!(text, "{}", timestamp.to_zoned(tz).strftime(format)).map_err(Error::from_fmt_error)
    }

    #[cfg(not(feature = "jiff"))]
    fn write_time(&self, text: &mut String, time: SystemTime) -> Result<(), Error> {
        let written = match time.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(dur) => write!(text, "{}", dur.as_nanos()),
            Err(err) => write!(text, "-{}", err.duration().as_nanos()),
        };
        written.map_err(Error::from_fmt_error)
    }

    fn write_level(&self, text: &mut String, record: &StatusRecord) -> Result<(), Error> {
        #[cfg(feature = "colored")]
        let level = self.colors.colorize(self.no_color, record.level());
        #[cfg(not(feature = "colored"))]
        let level = format!("{:>5}", record.level());

        write!(text, "{level}").map_err(Error::from_fmt_error)
    }
}

impl Layout for TextLayout {
    fn format(&self, record: &StatusRecord) -> Result<Vec<u8>, Error> {
        let mut text = String::new();

        if self.timestamp {
            self.write_time(&mut text, record.time())?;
            text.push(' ');
        }
        self.write_level(&mut text, record)?;

        let mut fields = || -> std::fmt::Result {
            if let Some(thread) = record.thread() {
                write!(&mut text, " [{thread}]")?;
            }
            if let Some(call_site) = record.call_site() {
                write!(&mut text, " {call_site}")?;
            }
            write!(&mut text, " {}", record.message())?;
            if let Some(error) = record.error() {
                write!(&mut text, ": {error:#}")?;
            }
            Ok(())
        };
        fields().map_err(Error::from_fmt_error)?;

        Ok(text.into_bytes())
    }
}
