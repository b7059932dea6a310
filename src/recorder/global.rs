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

use std::sync::OnceLock;

use crate::Error;
use crate::StatusConfig;
use crate::StatusRecorder;

static RECORDER: OnceLock<StatusRecorder> = OnceLock::new();

/// The process-wide status recorder.
///
/// Created on first access from [`StatusConfig::from_env`] unless [`init`] installed one before.
/// Usable at any time, including before the logging system is configured.
///
/// # Examples
///
/// ```
/// use logstatus::Level;
///
/// logstatus::status().record(Level::Warn, "no configuration found, using defaults", None, None);
/// ```
pub fn status() -> &'static StatusRecorder {
    RECORDER.get_or_init(|| StatusRecorder::from_config(&StatusConfig::from_env()))
}

/// Install the process-wide status recorder.
///
/// This should be called early, before anything records a status event.
///
/// # Errors
///
/// Return an error if the process-wide recorder already exists, either from an earlier `init`
/// or because [`status()`] was already called.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logstatus::StatusConfig;
/// use logstatus::StatusRecorder;
///
/// let config = StatusConfig::from_env();
/// logstatus::init(StatusRecorder::from_config(&config)).unwrap();
/// logstatus::status().register_listener(Arc::new(config.console()));
/// ```
pub fn init(recorder: StatusRecorder) -> Result<(), Error> {
    RECORDER
        .set(recorder)
        .map_err(|_| Error::new("status recorder has already been initialized"))
}
