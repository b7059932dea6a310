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

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::StatusRecord;

/// A bounded FIFO of the most recent status records.
///
/// Appending never fails: once the buffer holds more than `capacity` records, the oldest ones
/// are dropped. The bound is re-checked on every append, so a capacity change takes effect on
/// the next append.
#[derive(Debug)]
pub struct History {
    capacity: AtomicUsize,
    records: Mutex<VecDeque<StatusRecord>>,
}

impl History {
    /// Create an empty history that retains at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: AtomicUsize::new(capacity),
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    /// The maximum number of retained records.
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    /// Change the maximum number of retained records.
    pub fn set_capacity(&self, capacity: usize) {
        self.capacity.store(capacity, Ordering::Relaxed);
    }

    /// Append a record, evicting the oldest ones while over capacity.
    pub fn append(&self, record: StatusRecord) {
        let mut records = self.lock();
        records.push_back(record);
        let capacity = self.capacity();
        while records.len() > capacity {
            records.pop_front();
        }
    }

    /// A point-in-time copy of the retained records, oldest first.
    pub fn snapshot(&self) -> Vec<StatusRecord> {
        self.lock().iter().cloned().collect()
    }

    /// Drop all retained records.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// The number of retained records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no record is retained.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // nothing inside the critical section can leave the deque inconsistent
    fn lock(&self) -> MutexGuard<'_, VecDeque<StatusRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
