//! Contains a helper for checking long runs of writer calls at once.
//!
//! Writing a document node by node means a lot of `?`. Since the writer keeps
//! returning its first sink failure anyway, it is often enough to only remember
//! where the first problem happened:
//!
//! ```rust
//! use xmlwriter::{Element, ErrorCollector, NodeKind, Writer};
//!
//! let mut w = Writer::new(Vec::new());
//! let mut ec = ErrorCollector::new();
//! ec.collect(w.start(Element::new("a")));
//! ec.collect(w.write("text"));
//! ec.collect(w.end(NodeKind::Element));
//! ec.collect(w.end(NodeKind::Element)); // nothing left to end
//!
//! let err = ec.finish().unwrap_err();
//! assert_eq!(err.index, 4);
//! ```

use std::panic::Location;

use thiserror::Error;

use crate::writer::{Error, Result};

/// The first error seen by an [`ErrorCollector`], with the place it came from.
#[derive(Error, Debug, Clone)]
#[error("error at {file}:{line} #{index} - {cause}")]
pub struct CollectedError {
    pub file: &'static str,
    pub line: u32,
    /// 1-based number of the collecting call which saw the error.
    pub index: usize,
    #[source]
    pub cause: Error,
}

/// Remembers the first failed result out of any number of writer calls.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    calls: usize,
    first: Option<CollectedError>,
}

impl ErrorCollector {
    pub fn new() -> ErrorCollector {
        ErrorCollector::default()
    }

    /// Records `result` and returns its value, if any.
    #[track_caller]
    pub fn collect<T>(&mut self, result: Result<T>) -> Option<T> {
        self.calls += 1;
        match result {
            Ok(value) => Some(value),
            Err(cause) => {
                if self.first.is_none() {
                    let location = Location::caller();
                    self.first = Some(CollectedError {
                        file: location.file(),
                        line: location.line(),
                        index: self.calls,
                        cause,
                    });
                }
                None
            }
        }
    }

    /// Records every result of `results`.
    #[track_caller]
    pub fn collect_all<T, I: IntoIterator<Item = Result<T>>>(&mut self, results: I) {
        for result in results {
            self.collect(result);
        }
    }

    /// Returns the value of `result`, panicking with its location if it failed.
    #[track_caller]
    pub fn must<T>(&mut self, result: Result<T>) -> T {
        self.calls += 1;
        match result {
            Ok(value) => value,
            Err(cause) => {
                let location = Location::caller();
                panic!(
                    "{}",
                    CollectedError {
                        file: location.file(),
                        line: location.line(),
                        index: self.calls,
                        cause,
                    }
                )
            }
        }
    }

    #[inline]
    pub fn first_error(&self) -> Option<&CollectedError> {
        self.first.as_ref()
    }

    /// Number of results seen so far.
    #[inline]
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn finish(self) -> std::result::Result<(), CollectedError> {
        match self.first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Panics with the first error, if there was one.
    pub fn panic_if_failed(self) {
        if let Some(err) = self.first {
            panic!("{}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::StructureError;

    fn failure() -> Result<()> {
        Err(StructureError::EmptyStack.into())
    }

    #[test]
    fn test_keeps_first_error() {
        let mut ec = ErrorCollector::new();
        assert_eq!(ec.collect(Ok(1)), Some(1));
        ec.collect(failure());
        ec.collect::<()>(Err(StructureError::AttributeAfterStartTag.into()));

        let err = ec.first_error().unwrap();
        assert_eq!(err.index, 2);
        assert!(err.file.ends_with("collector.rs"));
        assert!(err.to_string().ends_with("#2 - structure error: could not pop node"), "{}", err);
        assert_eq!(ec.calls(), 3);
    }

    #[test]
    fn test_collect_all() {
        let mut ec = ErrorCollector::new();
        ec.collect_all(vec![Ok(()), Ok(()), failure()]);
        assert_eq!(ec.finish().unwrap_err().index, 3);
    }

    #[test]
    fn test_clean_finish() {
        let mut ec = ErrorCollector::new();
        ec.collect(Ok(()));
        assert!(ec.finish().is_ok());
    }

    #[test]
    #[should_panic(expected = "could not pop node")]
    fn test_must_panics() {
        let mut ec = ErrorCollector::new();
        ec.must(failure());
    }

    #[test]
    #[should_panic(expected = "#1")]
    fn test_panic_if_failed() {
        let mut ec = ErrorCollector::new();
        ec.collect(failure());
        ec.panic_if_failed();
    }
}
