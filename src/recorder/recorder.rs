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

use std::cell::RefCell;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::panic::Location;
use std::sync::Arc;

use arc_swap::ArcSwap;
use arc_swap::ArcSwapOption;

use crate::Backend;
use crate::CallSite;
use crate::Level;
use crate::LevelFilter;
use crate::Observer;
use crate::StatusRecord;
use crate::callsite;
use crate::history::History;
use crate::recorder::StatusRecorderBuilder;
use crate::registry::Observers;
use crate::registry::Registry;

thread_local! {
    // addresses of the recorders currently fanning out on this thread
    static DISPATCHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Records the logging system's own diagnostics and fans them out to observers.
///
/// Every operation is synchronous and short: recording appends to a bounded history under a
/// mutex, then walks a lock-free snapshot of the registered observers on the calling thread.
/// Nothing here fails from the caller's point of view; observer errors and panics are swallowed.
///
/// Most code reaches the process-wide instance through [`status()`](crate::status). Separate
/// instances can be built with [`StatusRecorder::builder`], for example in tests.
#[derive(Debug)]
pub struct StatusRecorder {
    history: History,
    registry: Registry,
    backend: ArcSwapOption<Box<dyn Backend>>,
    fallback: Option<Arc<dyn Observer>>,
    fallback_level: ArcSwap<LevelFilter>,
    debug: bool,
}

impl StatusRecorder {
    /// Create a new empty [`StatusRecorderBuilder`].
    pub fn builder() -> StatusRecorderBuilder {
        StatusRecorderBuilder::default()
    }

    pub(super) fn new(
        max_entries: usize,
        fallback: Option<Arc<dyn Observer>>,
        backend: Option<Box<dyn Backend>>,
        debug: bool,
    ) -> Self {
        let fallback_level = fallback.as_ref().map_or(LevelFilter::Off, |f| f.level());
        Self {
            history: History::new(max_entries),
            registry: Registry::new(),
            backend: ArcSwapOption::new(backend.map(Arc::new)),
            fallback,
            fallback_level: ArcSwap::from_pointee(fallback_level),
            debug,
        }
    }

    /// The process-wide recorder. Same as [`status()`](crate::status).
    pub fn global() -> &'static StatusRecorder {
        super::status()
    }

    /// Record a status event.
    ///
    /// When `boundary` names the module or type that issues records on behalf of its caller, the
    /// current stack is captured and the first frame past the boundary becomes the call site.
    /// Capturing is slow; pass `None` on hot paths.
    ///
    /// The stack only shows frames the compiler kept. Optimized builds inline and tail-call
    /// through small functions, so the resolved call site may be a std frame or missing, and
    /// origin exclusion then misses it. Use the `status_*!` macros or the `#[track_caller]`
    /// helpers such as [`warn`](StatusRecorder::warn) when the call site must be exact.
    pub fn record(
        &self,
        level: Level,
        message: impl Into<String>,
        error: Option<anyhow::Error>,
        boundary: Option<&str>,
    ) {
        let call_site = boundary.and_then(callsite::capture);
        self.record_at(level, call_site, message, error);
    }

    /// Record a status event with a known call site.
    pub fn record_at(
        &self,
        level: Level,
        call_site: Option<CallSite>,
        message: impl Into<String>,
        error: Option<anyhow::Error>,
    ) {
        let record = StatusRecord::builder()
            .level(level)
            .call_site(call_site)
            .message(message)
            .error(error)
            .build();
        self.dispatch(record);
    }

    /// Store a prebuilt record and notify observers.
    pub fn dispatch(&self, record: StatusRecord) {
        self.history.append(record.clone());

        // records issued back into this recorder during its own fan-out are kept in history only
        let Some(_guard) = DispatchGuard::enter(self) else {
            return;
        };

        let observers = self.registry.snapshot();
        for observer in observers.iter() {
            if observer.level().test(record.level()) {
                notify_silently(observer.as_ref(), &record);
            }
        }

        if let Some(fallback) = &self.fallback {
            let admitted = self.fallback_level.load().test(record.level());
            if (observers.is_empty() || self.debug) && admitted {
                notify_silently(fallback.as_ref(), &record);
            }
        }
    }

    /// Whether records at `level` should be produced.
    ///
    /// Always `true` in debug mode or while no backend is installed, so that nothing is lost
    /// before the logging system is configured.
    pub fn is_enabled(&self, level: Level) -> bool {
        if self.debug {
            return true;
        }

        match &*self.backend.load() {
            Some(backend) => backend.enabled(level),
            None => true,
        }
    }

    /// Install the backend consulted by [`is_enabled`](StatusRecorder::is_enabled).
    pub fn set_backend(&self, backend: impl Into<Box<dyn Backend>>) {
        self.backend.store(Some(Arc::new(backend.into())));
    }

    /// Uninstall the backend; every level counts as enabled again.
    pub fn clear_backend(&self) {
        self.backend.store(None);
    }

    /// Whether debug mode is on.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// The threshold of the fallback output. `Off` when there is no fallback.
    pub fn fallback_level(&self) -> LevelFilter {
        **self.fallback_level.load()
    }

    /// Change the threshold of the fallback output, for example once configuration asks for
    /// more verbose status output. Has no effect when the recorder was built without a fallback.
    pub fn set_fallback_level(&self, level: impl Into<LevelFilter>) {
        if self.fallback.is_some() {
            self.fallback_level.store(Arc::new(level.into()));
        }
    }

    /// Register an observer. Registering the same observer twice makes it notified twice.
    pub fn register_listener(&self, observer: Arc<dyn Observer>) {
        self.registry.register(observer);
    }

    /// Remove the first registration of `observer`, compared by identity.
    ///
    /// The observer is not closed or flushed. Returns `false` if it was not registered.
    pub fn remove_listener<O: Observer + ?Sized>(&self, observer: &Arc<O>) -> bool {
        self.registry.unregister(observer)
    }

    /// The currently registered observers, in registration order.
    pub fn listeners(&self) -> Observers {
        self.registry.snapshot()
    }

    /// The union of the registered observers' thresholds.
    pub fn listeners_level(&self) -> LevelFilter {
        self.registry.max_level()
    }

    /// The retained records, oldest first.
    pub fn history(&self) -> Vec<StatusRecord> {
        self.history.snapshot()
    }

    /// The maximum number of retained records.
    pub fn max_entries(&self) -> usize {
        self.history.capacity()
    }

    /// Change the maximum number of retained records. Takes effect on the next record.
    pub fn set_max_entries(&self, max_entries: usize) {
        self.history.set_capacity(max_entries);
    }

    /// Drop the retained records. Observers stay registered.
    pub fn clear(&self) {
        self.history.clear();
    }

    /// Drop the retained records and unregister every observer.
    pub fn reset(&self) {
        self.registry.clear();
        self.history.clear();
    }

    /// Record a `TRACE` event at the caller's location.
    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.record_here(Level::Trace, message, Location::caller());
    }

    /// Record a `DEBUG` event at the caller's location.
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.record_here(Level::Debug, message, Location::caller());
    }

    /// Record an `INFO` event at the caller's location.
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.record_here(Level::Info, message, Location::caller());
    }

    /// Record a `WARN` event at the caller's location.
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.record_here(Level::Warn, message, Location::caller());
    }

    /// Record an `ERROR` event at the caller's location.
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.record_here(Level::Error, message, Location::caller());
    }

    /// Record a `FATAL` event at the caller's location.
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.record_here(Level::Fatal, message, Location::caller());
    }

    fn record_here(&self, level: Level, message: impl Into<String>, location: &Location<'_>) {
        let call_site = CallSite::from_location(location);
        self.record_at(level, Some(call_site), message, None);
    }
}

fn notify_silently(observer: &dyn Observer, record: &StatusRecord) {
    // neither the error nor the panic payload is reported, there is no one left to report to
    let _ = panic::catch_unwind(AssertUnwindSafe(|| observer.notify(record)));
}

struct DispatchGuard {
    recorder: usize,
}

impl DispatchGuard {
    fn enter(recorder: &StatusRecorder) -> Option<DispatchGuard> {
        let recorder = std::ptr::from_ref(recorder) as usize;
        DISPATCHING.with_borrow_mut(|active| {
            if active.contains(&recorder) {
                None
            } else {
                active.push(recorder);
                Some(DispatchGuard { recorder })
            }
        })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with_borrow_mut(|active| {
            if let Some(i) = active.iter().rposition(|r| *r == self.recorder) {
                active.remove(i);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::Error;
    use crate::backend::LevelBackend;
    use crate::observer::Capture;

    fn recorder(max_entries: usize) -> StatusRecorder {
        StatusRecorder::builder()
            .max_entries(max_entries)
            .no_fallback()
            .build()
    }

    fn messages(records: &[StatusRecord]) -> Vec<&str> {
        records.iter().map(|r| r.message()).collect()
    }

    #[derive(Debug)]
    struct Failing;

    impl Observer for Failing {
        fn level(&self) -> LevelFilter {
            LevelFilter::All
        }

        fn notify(&self, _: &StatusRecord) -> Result<(), Error> {
            Err(Error::new("destination unavailable"))
        }
    }

    #[derive(Debug)]
    struct Panicking;

    impl Observer for Panicking {
        fn level(&self) -> LevelFilter {
            LevelFilter::All
        }

        fn notify(&self, _: &StatusRecord) -> Result<(), Error> {
            panic!("observer bug");
        }
    }

    // records every notification into a shared journal, tagged with its name
    #[derive(Debug)]
    struct Journal {
        name: &'static str,
        entries: Arc<Mutex<Vec<(&'static str, StatusRecord)>>>,
    }

    impl Observer for Journal {
        fn level(&self) -> LevelFilter {
            LevelFilter::All
        }

        fn notify(&self, record: &StatusRecord) -> Result<(), Error> {
            self.entries.lock().unwrap().push((self.name, record.clone()));
            Ok(())
        }
    }

    // re-records everything it sees into another recorder
    #[derive(Debug)]
    struct Forward {
        target: Arc<StatusRecorder>,
    }

    impl Observer for Forward {
        fn level(&self) -> LevelFilter {
            LevelFilter::All
        }

        fn notify(&self, record: &StatusRecord) -> Result<(), Error> {
            let message = format!("forwarded: {}", record.message());
            self.target.record(record.level(), message, None, None);
            Ok(())
        }
    }

    #[test]
    fn keeps_the_most_recent_records() {
        let recorder = recorder(2);
        for message in ["A", "B", "C"] {
            recorder.record(Level::Info, message, None, None);
        }
        assert_eq!(messages(&recorder.history()), vec!["B", "C"]);
    }

    #[test]
    fn notifies_admitted_listeners() {
        let recorder = recorder(10);
        let info = Arc::new(Capture::new(Level::Info));
        let error = Arc::new(Capture::new(Level::Error));
        recorder.register_listener(info.clone());
        recorder.register_listener(error.clone());

        recorder.record(Level::Debug, "debug", None, None);
        recorder.record(Level::Info, "info", None, None);
        recorder.record(Level::Error, "error", None, None);

        assert_eq!(messages(&recorder.history()), vec!["debug", "info", "error"]);
        assert_eq!(info.messages(), vec!["info", "error"]);
        assert_eq!(error.messages(), vec!["error"]);
    }

    #[test]
    fn fans_out_in_registration_order_with_the_same_record() {
        let recorder = recorder(10);
        let entries = Arc::new(Mutex::new(vec![]));
        recorder.register_listener(Arc::new(Journal {
            name: "first",
            entries: entries.clone(),
        }));
        recorder.register_listener(Arc::new(Journal {
            name: "second",
            entries: entries.clone(),
        }));

        recorder.record(Level::Warn, "shared", None, None);

        let entries = entries.lock().unwrap();
        let names: Vec<_> = entries.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(StatusRecord::ptr_eq(&entries[0].1, &entries[1].1));
        assert!(StatusRecord::ptr_eq(&entries[0].1, &recorder.history()[0]));
    }

    #[test]
    fn failing_listeners_do_not_stop_delivery() {
        let recorder = recorder(10);
        let capture = Arc::new(Capture::new(LevelFilter::All));
        recorder.register_listener(Arc::new(Failing));
        recorder.register_listener(Arc::new(Panicking));
        recorder.register_listener(capture.clone());

        recorder.record(Level::Error, "still delivered", None, None);

        assert_eq!(recorder.history().len(), 1);
        assert_eq!(capture.messages(), vec!["still delivered"]);
    }

    #[test]
    fn reset_clears_history_and_listeners() {
        let recorder = recorder(10);
        let capture = Arc::new(Capture::new(Level::Trace));
        recorder.register_listener(capture.clone());
        recorder.record(Level::Info, "before", None, None);

        recorder.reset();
        recorder.reset();
        assert!(recorder.history().is_empty());
        assert!(recorder.listeners().is_empty());

        recorder.record(Level::Info, "after", None, None);
        assert_eq!(messages(&recorder.history()), vec!["after"]);
        assert_eq!(capture.messages(), vec!["before"]);
    }

    #[test]
    fn clear_keeps_listeners() {
        let recorder = recorder(10);
        recorder.register_listener(Arc::new(Capture::new(Level::Trace)));
        recorder.record(Level::Info, "gone", None, None);

        recorder.clear();
        assert!(recorder.history().is_empty());
        assert_eq!(recorder.listeners().len(), 1);
    }

    #[test]
    fn removed_listener_stops_receiving() {
        let recorder = recorder(10);
        let capture = Arc::new(Capture::new(Level::Trace));
        recorder.register_listener(capture.clone());
        recorder.record(Level::Info, "seen", None, None);

        assert!(recorder.remove_listener(&capture));
        assert!(!recorder.remove_listener(&capture));
        recorder.record(Level::Info, "unseen", None, None);

        assert_eq!(capture.messages(), vec!["seen"]);
        assert_eq!(recorder.listeners_level(), LevelFilter::Off);
    }

    #[test]
    fn fallback_only_speaks_without_listeners() {
        let fallback = Arc::new(Capture::new(Level::Error));
        let recorder = StatusRecorder::builder().fallback(fallback.clone()).build();

        recorder.record(Level::Warn, "below fallback level", None, None);
        recorder.record(Level::Error, "no listener yet", None, None);
        recorder.register_listener(Arc::new(Capture::new(Level::Trace)));
        recorder.record(Level::Error, "listener present", None, None);

        assert_eq!(fallback.messages(), vec!["no listener yet"]);
    }

    #[test]
    fn debug_mode_prints_everything_and_enables_everything() {
        let fallback = Arc::new(Capture::new(LevelFilter::All));
        let recorder = StatusRecorder::builder()
            .fallback(fallback.clone())
            .backend(LevelBackend(LevelFilter::Off))
            .debug(true)
            .build();
        recorder.register_listener(Arc::new(Capture::new(Level::Trace)));

        recorder.record(Level::Trace, "verbose", None, None);

        assert_eq!(fallback.messages(), vec!["verbose"]);
        assert!(recorder.is_enabled(Level::Trace));
    }

    #[test]
    fn enablement_fails_open_until_a_backend_is_installed() {
        let recorder = recorder(10);
        assert!(recorder.is_enabled(Level::Trace));

        recorder.set_backend(LevelBackend(LevelFilter::MoreSevereEqual(Level::Warn)));
        assert!(!recorder.is_enabled(Level::Info));
        assert!(recorder.is_enabled(Level::Error));

        recorder.clear_backend();
        assert!(recorder.is_enabled(Level::Trace));
    }

    #[test]
    fn track_caller_helpers_attach_location() {
        let recorder = recorder(10);
        recorder.warn("here");

        let history = recorder.history();
        let call_site = history[0].call_site().unwrap();
        assert_eq!(history[0].level(), Level::Warn);
        assert_eq!(call_site.file(), Some(file!()));
        assert_eq!(call_site.owner(), None);
    }

    #[test]
    fn capacity_can_change_at_runtime() {
        let recorder = recorder(4);
        for message in ["a", "b", "c", "d"] {
            recorder.record(Level::Info, message, None, None);
        }
        recorder.set_max_entries(1);
        recorder.record(Level::Info, "e", None, None);

        assert_eq!(recorder.max_entries(), 1);
        assert_eq!(messages(&recorder.history()), vec!["e"]);
    }

    #[test]
    fn duplicate_registration_is_notified_twice() {
        let recorder = recorder(10);
        let capture = Arc::new(Capture::new(LevelFilter::All));
        recorder.register_listener(capture.clone());
        recorder.register_listener(capture.clone());

        recorder.record(Level::Info, "twice", None, None);
        assert_eq!(capture.messages(), vec!["twice", "twice"]);

        assert!(recorder.remove_listener(&capture));
        recorder.record(Level::Info, "once", None, None);
        assert_eq!(capture.messages(), vec!["twice", "twice", "once"]);
    }

    #[test]
    fn records_forwarded_to_another_recorder_are_dispatched() {
        let upstream = recorder(10);
        let downstream = Arc::new(recorder(10));
        let capture = Arc::new(Capture::new(LevelFilter::All));
        downstream.register_listener(capture.clone());
        upstream.register_listener(Arc::new(Forward {
            target: downstream.clone(),
        }));

        upstream.record(Level::Warn, "plugin missing", None, None);

        assert_eq!(messages(&downstream.history()), vec!["forwarded: plugin missing"]);
        assert_eq!(capture.messages(), vec!["forwarded: plugin missing"]);
    }

    #[test]
    fn forwarding_cycles_stop_at_the_recorder_already_dispatching() {
        let first = Arc::new(recorder(10));
        let second = Arc::new(recorder(10));
        let seen_by_first = Arc::new(Capture::new(LevelFilter::All));
        first.register_listener(seen_by_first.clone());
        first.register_listener(Arc::new(Forward {
            target: second.clone(),
        }));
        second.register_listener(Arc::new(Forward {
            target: first.clone(),
        }));

        first.record(Level::Info, "ping", None, None);

        assert_eq!(
            messages(&first.history()),
            vec!["ping", "forwarded: forwarded: ping"]
        );
        assert_eq!(messages(&second.history()), vec!["forwarded: ping"]);
        assert_eq!(seen_by_first.messages(), vec!["ping"]);

        // the guard is released once fan-out returns
        first.record(Level::Info, "pong", None, None);
        assert_eq!(seen_by_first.messages(), vec!["ping", "pong"]);
    }

    #[test]
    fn fallback_level_can_change_at_runtime() {
        let fallback = Arc::new(Capture::new(LevelFilter::All));
        let recorder = StatusRecorder::builder().fallback(fallback.clone()).build();
        recorder.set_fallback_level(Level::Error);
        assert_eq!(recorder.fallback_level(), LevelFilter::MoreSevereEqual(Level::Error));

        recorder.record(Level::Debug, "hidden", None, None);
        recorder.set_fallback_level(Level::Debug);
        recorder.record(Level::Debug, "shown", None, None);
        recorder.set_fallback_level(LevelFilter::Off);
        recorder.record(Level::Fatal, "silenced", None, None);

        assert_eq!(fallback.messages(), vec!["shown"]);
        assert_eq!(recorder.history().len(), 3);
    }

    #[test]
    fn fallback_level_without_fallback_stays_off() {
        let recorder = recorder(10);
        recorder.set_fallback_level(Level::Trace);
        assert_eq!(recorder.fallback_level(), LevelFilter::Off);
    }
}
