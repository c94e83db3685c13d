// packages/engine/src/invocation/location.rs
//! Call-site locator
//!
//! Captures where in caller code an intercepted call came from. Used only for
//! diagnostics; nothing in the engine inspects it beyond display.

use chrono::{DateTime, Utc};
use std::fmt;
use std::panic::Location;
use std::thread::{self, ThreadId};

/// Opaque, display-only description of a call site
#[derive(Debug, Clone)]
pub struct CallSiteLocator {
    site: &'static Location<'static>,
    thread: ThreadId,
    captured_at: DateTime<Utc>,
}

impl CallSiteLocator {
    /// Capture the location of the caller
    ///
    /// The reported site is the first caller up the stack that is not
    /// itself `#[track_caller]`, i.e. the surrogate method body or the test
    /// code calling it when the surrogate method is annotated too.
    #[track_caller]
    pub fn capture() -> Self {
        Self::at(Location::caller())
    }

    /// Locator for an already-known site
    pub fn at(site: &'static Location<'static>) -> Self {
        Self {
            site,
            thread: thread::current().id(),
            captured_at: Utc::now(),
        }
    }

    pub fn file(&self) -> &'static str {
        self.site.file()
    }

    pub fn line(&self) -> u32 {
        self.site.line()
    }

    pub fn column(&self) -> u32 {
        self.site.column()
    }

    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

impl fmt::Display for CallSiteLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-> at {}:{}:{}", self.file(), self.line(), self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_points_at_caller() {
        let expected_line = line!() + 1;
        let locator = CallSiteLocator::capture();
        assert!(locator.file().ends_with("location.rs"));
        assert_eq!(locator.line(), expected_line);
        assert_eq!(locator.thread(), thread::current().id());
    }

    #[test]
    fn test_display() {
        let locator = CallSiteLocator::capture();
        let shown = locator.to_string();
        assert!(shown.starts_with("-> at "));
        assert!(shown.contains("location.rs"));
    }

    #[track_caller]
    fn captured_through_helper() -> CallSiteLocator {
        CallSiteLocator::capture()
    }

    #[test]
    fn test_track_caller_propagates() {
        let expected_line = line!() + 1;
        let locator = captured_through_helper();
        assert_eq!(locator.line(), expected_line);
    }
}
