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

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::Error;
use crate::LevelFilter;
use crate::Observer;
use crate::StatusRecord;

/// An observer that keeps every record it receives in memory.
///
/// Meant for tests and for embedders that inspect diagnostics programmatically.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logstatus::Level;
/// use logstatus::StatusRecorder;
/// use logstatus::observer::Capture;
///
/// let recorder = StatusRecorder::builder().build();
/// let capture = Arc::new(Capture::new(Level::Warn));
/// recorder.register_listener(capture.clone());
///
/// recorder.record(Level::Error, "config not found", None, None);
/// assert_eq!(capture.len(), 1);
/// ```
#[derive(Debug)]
pub struct Capture {
    level: LevelFilter,
    records: Mutex<Vec<StatusRecord>>,
}

impl Capture {
    /// Create a capturing observer with the given threshold.
    pub fn new(level: impl Into<LevelFilter>) -> Self {
        Self {
            level: level.into(),
            records: Mutex::new(vec![]),
        }
    }

    /// A copy of the captured records, in arrival order.
    pub fn records(&self) -> Vec<StatusRecord> {
        self.lock().clone()
    }

    /// The captured messages, in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.message().to_string()).collect()
    }

    /// Remove and return the captured records.
    pub fn take(&self) -> Vec<StatusRecord> {
        std::mem::take(&mut *self.lock())
    }

    /// Drop the captured records.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// The number of captured records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StatusRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Observer for Capture {
    fn level(&self) -> LevelFilter {
        self.level
    }

    fn notify(&self, record: &StatusRecord) -> Result<(), Error> {
        self.lock().push(record.clone());
        Ok(())
    }
}
