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

//! Observers receive status records as they are recorded.

use std::fmt;

use crate::Error;
use crate::LevelFilter;
use crate::StatusRecord;

mod capture;
mod console;

pub use self::capture::Capture;
pub use self::console::Console;

/// A recipient of status records.
///
/// The recorder calls [`notify`](Observer::notify) synchronously on the recording thread for
/// every record whose level passes [`level`](Observer::level). Errors returned from `notify`,
/// and panics raised by it, are swallowed by the recorder and never reported again.
pub trait Observer: fmt::Debug + Send + Sync + 'static {
    /// The threshold of records this observer wants to receive.
    fn level(&self) -> LevelFilter;

    /// Handle one status record.
    fn notify(&self, record: &StatusRecord) -> Result<(), Error>;
}
