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

//! Logstatus records the diagnostics of a logging system about itself.
//!
//! # Overview
//!
//! A logging system cannot report its own configuration errors through itself. Logstatus is the
//! side channel it uses instead: any thread can record a status event at any time, including
//! before the logging system is configured. Recent events are kept in a bounded history, and
//! registered observers receive them synchronously as they happen.
//!
//! Recording never fails. An observer that returns an error or panics is silenced, and the
//! remaining observers still receive the event.
//!
//! # Examples
//!
//! Report through the process-wide recorder:
//!
//! ```
//! use logstatus::Level;
//!
//! logstatus::status_warn!("no configuration file found, using defaults");
//!
//! let err = std::io::Error::other("permission denied");
//! logstatus::status_error!(error = err; "cannot open {}", "app.log");
//!
//! let history = logstatus::status().history();
//! assert_eq!(history.last().unwrap().level(), Level::Error);
//! ```
//!
//! Capture diagnostics programmatically:
//!
//! ```
//! use std::sync::Arc;
//!
//! use logstatus::Level;
//! use logstatus::StatusRecorder;
//! use logstatus::observer::Capture;
//! use logstatus::observer::Console;
//!
//! let recorder = StatusRecorder::builder().max_entries(10).build();
//! let capture = Arc::new(Capture::new(Level::Info));
//! recorder.register_listener(capture.clone());
//! recorder.register_listener(Arc::new(Console::stderr().with_level(Level::Error)));
//!
//! recorder.record(Level::Info, "reconfigured", None, None);
//! assert_eq!(capture.messages(), vec!["reconfigured"]);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod backend;
pub mod callsite;
pub mod config;
pub mod layout;
pub mod observer;

mod error;
mod history;
mod level;
mod record;
mod recorder;
mod registry;

pub use self::backend::Backend;
pub use self::callsite::CallSite;
pub use self::config::StatusConfig;
pub use self::error::Error;
pub use self::history::History;
pub use self::layout::Layout;
pub use self::level::Level;
pub use self::level::LevelFilter;
pub use self::observer::Observer;
pub use self::record::StatusRecord;
pub use self::record::StatusRecordBuilder;
pub use self::recorder::StatusRecorder;
pub use self::recorder::StatusRecorderBuilder;
pub use self::recorder::init;
pub use self::recorder::status;
pub use self::registry::Observers;
pub use self::registry::Registry;

/// Record a status event on the process-wide recorder.
///
/// The call site is the invoking module, file, and line. The message is only formatted when
/// [`StatusRecorder::is_enabled`] admits the level. An error can be attached with a leading
/// `error = expr;` clause; it is converted with `Into<anyhow::Error>`.
///
/// # Examples
///
/// ```
/// use logstatus::Level;
///
/// logstatus::status!(Level::Info, "loaded {} plugins", 3);
/// logstatus::status!(Level::Error, error = std::fmt::Error; "cannot render pattern");
/// ```
#[macro_export]
macro_rules! status {
    ($lvl:expr, error = $err:expr; $($arg:tt)+) => {{
        let recorder = $crate::status();
        let lvl = $lvl;
        if recorder.is_enabled(lvl) {
            recorder.record_at(
                lvl,
                ::std::option::Option::Some(
                    $crate::CallSite::new(::std::module_path!())
                        .with_location(::std::file!(), ::std::line!()),
                ),
                ::std::format!($($arg)+),
                ::std::option::Option::Some(::std::convert::Into::into($err)),
            );
        }
    }};
    ($lvl:expr, $($arg:tt)+) => {{
        let recorder = $crate::status();
        let lvl = $lvl;
        if recorder.is_enabled(lvl) {
            recorder.record_at(
                lvl,
                ::std::option::Option::Some(
                    $crate::CallSite::new(::std::module_path!())
                        .with_location(::std::file!(), ::std::line!()),
                ),
                ::std::format!($($arg)+),
                ::std::option::Option::None,
            );
        }
    }};
}

/// Record a `FATAL` status event. See [`status!`].
#[macro_export]
macro_rules! status_fatal {
    ($($arg:tt)+) => { $crate::status!($crate::Level::Fatal, $($arg)+) };
}

/// Record an `ERROR` status event. See [`status!`].
#[macro_export]
macro_rules! status_error {
    ($($arg:tt)+) => { $crate::status!($crate::Level::Error, $($arg)+) };
}

/// Record a `WARN` status event. See [`status!`].
#[macro_export]
macro_rules! status_warn {
    ($($arg:tt)+) => { $crate::status!($crate::Level::Warn, $($arg)+) };
}

/// Record an `INFO` status event. See [`status!`].
#[macro_export]
macro_rules! status_info {
    ($($arg:tt)+) => { $crate::status!($crate::Level::Info, $($arg)+) };
}

/// Record a `DEBUG` status event. See [`status!`].
#[macro_export]
macro_rules! status_debug {
    ($($arg:tt)+) => { $crate::status!($crate::Level::Debug, $($arg)+) };
}

/// Record a `TRACE` status event. See [`status!`].
#[macro_export]
macro_rules! status_trace {
    ($($arg:tt)+) => { $crate::status!($crate::Level::Trace, $($arg)+) };
}
