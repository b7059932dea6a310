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

//! Status records.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::CallSite;
use crate::Level;

/// One internal diagnostic occurrence of the logging system.
///
/// A record is immutable once built. Cloning is cheap and yields a handle to the same instance,
/// so the copy kept in history and the one handed to each observer are identical; use
/// [`StatusRecord::ptr_eq`] to check.
#[derive(Clone)]
pub struct StatusRecord {
    inner: Arc<Inner>,
}

struct Inner {
    // the observed time
    now: SystemTime,
    level: Level,
    thread: Option<String>,
    call_site: Option<CallSite>,

    // the payload
    message: String,
    error: Option<anyhow::Error>,
}

impl StatusRecord {
    /// Returns a new builder.
    pub fn builder() -> StatusRecordBuilder {
        StatusRecordBuilder::default()
    }

    /// The observed time.
    pub fn time(&self) -> SystemTime {
        self.inner.now
    }

    /// The severity of this record.
    pub fn level(&self) -> Level {
        self.inner.level
    }

    /// The rendered message.
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// The captured failure, if any.
    pub fn error(&self) -> Option<&anyhow::Error> {
        self.inner.error.as_ref()
    }

    /// The code that triggered this record, if known.
    pub fn call_site(&self) -> Option<&CallSite> {
        self.inner.call_site.as_ref()
    }

    /// The owner of the call site, used to filter by originating component.
    pub fn origin(&self) -> Option<&str> {
        self.call_site().and_then(CallSite::owner)
    }

    /// The name of the thread that created this record, if it had one.
    pub fn thread(&self) -> Option<&str> {
        self.inner.thread.as_deref()
    }

    /// Whether both handles refer to the same record instance.
    pub fn ptr_eq(this: &StatusRecord, other: &StatusRecord) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }
}

impl fmt::Debug for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusRecord")
            .field("time", &self.inner.now)
            .field("level", &self.inner.level)
            .field("thread", &self.inner.thread)
            .field("call_site", &self.inner.call_site)
            .field("message", &self.inner.message)
            .field("error", &self.inner.error)
            .finish()
    }
}

/// Builder for [`StatusRecord`].
#[derive(Debug)]
pub struct StatusRecordBuilder {
    now: SystemTime,
    level: Level,
    thread: Option<String>,
    call_site: Option<CallSite>,
    message: String,
    error: Option<anyhow::Error>,
}

impl Default for StatusRecordBuilder {
    fn default() -> Self {
        Self {
            now: SystemTime::now(),
            level: Level::Info,
            thread: std::thread::current().name().map(str::to_string),
            call_site: None,
            message: String::new(),
            error: None,
        }
    }
}

impl StatusRecordBuilder {
    /// Set [`level`](StatusRecord::level).
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set [`message`](StatusRecord::message).
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set [`error`](StatusRecord::error).
    pub fn error(mut self, error: Option<anyhow::Error>) -> Self {
        self.error = error;
        self
    }

    /// Set [`call_site`](StatusRecord::call_site).
    pub fn call_site(mut self, call_site: Option<CallSite>) -> Self {
        self.call_site = call_site;
        self
    }

    /// Set [`time`](StatusRecord::time). Defaults to the time the builder was created.
    pub fn time(mut self, now: SystemTime) -> Self {
        self.now = now;
        self
    }

    /// Set [`thread`](StatusRecord::thread). Defaults to the name of the current thread.
    pub fn thread(mut self, thread: Option<String>) -> Self {
        self.thread = thread;
        self
    }

    /// Invoke the builder and return a `StatusRecord`.
    pub fn build(self) -> StatusRecord {
        StatusRecord {
            inner: Arc::new(Inner {
                now: self.now,
                level: self.level,
                thread: self.thread,
                call_site: self.call_site,
                message: self.message,
                error: self.error,
            }),
        }
    }
}
