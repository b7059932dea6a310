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

//! Call sites and their resolution from a captured stack.
//!
//! A call site names the code that triggered a status record. It can be supplied directly (the
//! `status_*!` macros capture `module_path!()`, `file!()` and `line!()`), taken from
//! [`std::panic::Location`] through `#[track_caller]`, or resolved from the current stack by
//! walking past a *boundary*: the module or type that issues records on behalf of its caller.

use std::backtrace::Backtrace;
use std::backtrace::BacktraceStatus;
use std::fmt;
use std::panic::Location;

/// The code location that triggered a status record.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    owner: Option<String>,
    function: Option<String>,
    file: Option<String>,
    line: Option<u32>,
}

impl CallSite {
    /// Create a call site owned by the given module or type path.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            function: None,
            file: None,
            line: None,
        }
    }

    /// Set the function name of this call site.
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Set the source location of this call site.
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Build a call site from a `#[track_caller]` location.
    ///
    /// Such a call site carries no owner, so origin based filtering never applies to it.
    pub fn from_location(location: &Location<'_>) -> Self {
        Self {
            owner: None,
            function: None,
            file: Some(location.file().to_string()),
            line: Some(location.line()),
        }
    }

    /// The module or type path that owns the call site, used for origin filtering.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The function name, when resolved from a stack frame.
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// The source file.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// The source line.
    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.owner, &self.file) {
            (Some(owner), file) => {
                f.write_str(owner)?;
                if let Some(function) = &self.function {
                    write!(f, "::{function}")?;
                }
                if let Some(file) = file {
                    write!(f, "({file}:{})", self.line.unwrap_or_default())?;
                }
                Ok(())
            }
            (None, Some(file)) => write!(f, "{file}:{}", self.line.unwrap_or_default()),
            (None, None) => f.write_str("?"),
        }
    }
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// One frame of a captured stack.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// The demangled symbol, `None` when it could not be resolved.
    pub symbol: Option<String>,
    /// The source file, if known.
    pub file: Option<String>,
    /// The source line, if known.
    pub line: Option<u32>,
}

impl Frame {
    /// Create a frame for the given symbol without a source location.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            file: None,
            line: None,
        }
    }

    /// The module or type path that declares this frame's function.
    ///
    /// Trait implementations (`<T as Trait>::f`) resolve to `T`; closures resolve to the owner of
    /// their enclosing function.
    pub fn owner(&self) -> Option<String> {
        self.symbol.as_deref().and_then(|s| split_symbol(s).0)
    }

    fn into_call_site(self) -> CallSite {
        let (owner, function) = match self.symbol.as_deref() {
            Some(symbol) => split_symbol(symbol),
            None => (None, None),
        };
        CallSite {
            owner,
            function,
            file: self.file,
            line: self.line,
        }
    }
}

/// Find the caller of `boundary` among `frames`.
///
/// A frame belongs to the boundary when its owner equals `boundary` or is nested inside it. The
/// call site is the first frame after a run of boundary frames that does not belong to the
/// boundary. Returns `None` if the boundary never appears, or if an unresolved frame is reached
/// before it.
pub fn resolve<I>(boundary: &str, frames: I) -> Option<CallSite>
where
    I: IntoIterator<Item = Frame>,
{
    let mut seen = false;
    for frame in frames {
        let owner = frame.owner();
        let inside = owner.as_deref().is_some_and(|o| belongs_to(o, boundary));
        if seen && !inside {
            return Some(frame.into_call_site());
        }
        if inside {
            seen = true;
        } else if owner.is_none() {
            break;
        }
    }
    None
}

/// Capture the current stack and resolve the caller of `boundary`.
///
/// Capturing symbolizes the whole stack, which is slow; it only happens when a boundary is given.
///
/// Only frames that survived compilation are visible. In optimized builds the real caller is often
/// inlined or tail-called away, and the frame found past the boundary is whatever called it, for
/// example `core::ops::function::FnOnce::call_once`. Prefer a call site built from
/// `module_path!()` or [`CallSite::from_location`] when it has to be exact.
pub fn capture(boundary: &str) -> Option<CallSite> {
    let backtrace = Backtrace::force_capture();
    if backtrace.status() != BacktraceStatus::Captured {
        return None;
    }
    resolve(boundary, parse_frames(&backtrace.to_string()))
}

/// Parse the textual form of a [`Backtrace`] into frames.
///
/// The expected shape is one `N: symbol` line per frame, optionally followed by inlined symbols on
/// their own lines, each optionally followed by an `at file:line:column` line.
pub fn parse_frames(text: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = vec![];

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                let (file, line) = parse_location(location);
                frame.file = Some(file.to_string());
                frame.line = line;
            }
            continue;
        }

        let symbol = match line.split_once(": ") {
            Some((index, rest)) if index.bytes().all(|b| b.is_ascii_digit()) => rest,
            _ => line,
        };
        frames.push(Frame {
            symbol: (symbol != "<unknown>").then(|| symbol.to_string()),
            file: None,
            line: None,
        });
    }

    frames
}

fn parse_location(location: &str) -> (&str, Option<u32>) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next();
    let middle = parts.next();
    let rest = parts.next();
    match (rest, middle, last) {
        // file:line:column
        (Some(file), Some(line), Some(_)) if line.parse::<u32>().is_ok() => {
            (file, line.parse().ok())
        }
        // file:line
        _ => match location.rsplit_once(':') {
            Some((file, line)) if line.parse::<u32>().is_ok() => (file, line.parse().ok()),
            _ => (location, None),
        },
    }
}

fn belongs_to(owner: &str, boundary: &str) -> bool {
    owner == boundary
        || owner
            .strip_prefix(boundary)
            .is_some_and(|rest| rest.starts_with("::"))
}

// returns (owner, function)
fn split_symbol(symbol: &str) -> (Option<String>, Option<String>) {
    let segments = split_path(strip_hash(symbol));
    let mut segments = segments.into_iter().enumerate().filter_map(|(i, s)| {
        // drop closures and turbofish generics, keep a leading qualified self type
        if s.starts_with("{{") || (i > 0 && s.starts_with('<')) {
            None
        } else {
            Some(s)
        }
    });

    let Some(first) = segments.next() else {
        return (None, None);
    };
    let rest: Vec<&str> = segments.collect();

    if let Some(self_ty) = qualified_self(first) {
        let owner = strip_generics(self_ty).to_string();
        return (Some(owner), rest.last().map(|s| s.to_string()));
    }

    match rest.split_last() {
        None => (Some(first.to_string()), Some(first.to_string())),
        Some((function, middle)) => {
            let mut owner = strip_generics(first).to_string();
            for s in middle {
                owner.push_str("::");
                owner.push_str(strip_generics(s));
            }
            (Some(owner), Some(function.to_string()))
        }
    }
}

// `<T as Trait>` or `<T>` yields `T`
fn qualified_self(segment: &str) -> Option<&str> {
    let inner = segment.strip_prefix('<')?.strip_suffix('>')?;
    let mut depth = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ' ' if depth == 0 && inner[i..].starts_with(" as ") => return Some(&inner[..i]),
            _ => {}
        }
    }
    Some(inner)
}

fn strip_generics(segment: &str) -> &str {
    match segment.find('<') {
        Some(i) => &segment[..i],
        None => segment,
    }
}

fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::") {
        Some((head, tail))
            if tail.len() == 17
                && tail.starts_with('h')
                && tail[1..].bytes().all(|b| b.is_ascii_hexdigit()) =>
        {
            head
        }
        _ => symbol,
    }
}

// split on `::` outside of angle brackets
fn split_path(path: &str) -> Vec<&str> {
    let mut segments = vec![];
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&path[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(symbols: &[&str]) -> Vec<Frame> {
        symbols.iter().map(|s| Frame::new(*s)).collect()
    }

    #[test]
    fn owner_of_plain_function_is_its_module() {
        let frame = Frame::new("app::config::load");
        assert_eq!(frame.owner().as_deref(), Some("app::config"));
    }

    #[test]
    fn owner_of_trait_impl_is_self_type() {
        let frame = Frame::new("<app::config::Loader as core::ops::Drop>::drop");
        assert_eq!(frame.owner().as_deref(), Some("app::config::Loader"));

        let frame = Frame::new("<alloc::vec::Vec<T> as core::clone::Clone>::clone");
        assert_eq!(frame.owner().as_deref(), Some("alloc::vec::Vec"));
    }

    #[test]
    fn owner_skips_closures_and_hashes() {
        let frame = Frame::new("app::config::load::{{closure}}::h0123456789abcdef");
        assert_eq!(frame.owner().as_deref(), Some("app::config"));

        let frame = Frame::new("app::config::parse::<u32>");
        assert_eq!(frame.owner().as_deref(), Some("app::config"));
    }

    #[test]
    fn resolves_frame_after_single_boundary_frame() {
        let stack = frames(&[
            "std::backtrace::Backtrace::force_capture",
            "logstatus::recorder::StatusRecorder::record",
            "app::config::report",
            "app::main",
        ]);
        let site = resolve("app::config", stack).unwrap();
        assert_eq!(site.owner(), Some("app"));
        assert_eq!(site.function(), Some("main"));
    }

    #[test]
    fn resolves_past_consecutive_boundary_frames() {
        let stack = frames(&[
            "logstatus::recorder::StatusRecorder::record",
            "app::config::Reporter::report",
            "app::config::Reporter::report_error",
            "<app::config::Reporter as core::fmt::Debug>::fmt",
            "app::plugins::Loader::load",
        ]);
        let site = resolve("app::config", stack).unwrap();
        assert_eq!(site.owner(), Some("app::plugins::Loader"));
        assert_eq!(site.function(), Some("load"));
    }

    #[test]
    fn elided_caller_resolves_to_the_next_surviving_frame() {
        // the caller of the boundary was inlined into the test harness
        let stack = frames(&[
            "logstatus::callsite::capture",
            "app::config::report",
            "core::ops::function::FnOnce::call_once",
            "std::rt::lang_start_internal",
        ]);
        let site = resolve("app::config", stack).unwrap();
        assert_eq!(site.owner(), Some("core::ops::function::FnOnce"));
        assert_eq!(site.function(), Some("call_once"));
    }

    #[test]
    fn missing_boundary_yields_no_call_site() {
        let stack = frames(&["app::config::report", "app::main"]);
        assert!(resolve("app::plugins", stack).is_none());
    }

    #[test]
    fn unresolved_frame_before_boundary_stops_search() {
        let mut stack = frames(&["app::main"]);
        stack.push(Frame::default());
        stack.extend(frames(&["app::config::report", "app::run"]));
        assert!(resolve("app::config", stack).is_none());
    }

    #[test]
    fn boundary_matches_whole_segments_only() {
        let stack = frames(&["app::configs::report", "app::main"]);
        assert!(resolve("app::config", stack).is_none());
    }

    #[test]
    fn parses_backtrace_text() {
        let text = "   0: std::backtrace::Backtrace::force_capture
             at /rustc/abc/library/std/src/backtrace.rs:312:13
   1: app::config::report
             at ./src/config.rs:42:9
      app::config::report_inlined
   2: app::main
             at ./src/main.rs:7:5
   3: <unknown>
";
        let frames = parse_frames(text);
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[1].file.as_deref(), Some("./src/config.rs"));
        assert_eq!(frames[1].line, Some(42));
        assert_eq!(frames[2].symbol.as_deref(), Some("app::config::report_inlined"));
        assert_eq!(frames[2].file, None);
        assert_eq!(frames[3].line, Some(7));
        assert_eq!(frames[4].symbol, None);

        let site = resolve("app::config", frames).unwrap();
        assert_eq!(site.to_string(), "app::main(./src/main.rs:7)");
    }

    #[test]
    fn display_forms() {
        let site = CallSite::new("app::config").with_location("src/config.rs", 3);
        assert_eq!(site.to_string(), "app::config(src/config.rs:3)");

        let site = CallSite::new("app::config").with_function("load");
        assert_eq!(site.to_string(), "app::config::load");

        let site = CallSite::from_location(Location::caller());
        assert!(site.to_string().starts_with("src/callsite.rs:"));
        assert_eq!(site.owner(), None);
    }
}
