//! Proof that an error diagnostic was emitted.

use std::fmt;

/// Only obtainable from [`DiagnosticQueue`](crate::DiagnosticQueue) after an
/// error was recorded.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// `Some` when at least one error was counted.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error(s) emitted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_error_count() {
        assert!(ErrorGuaranteed::from_error_count(1).is_some());
        assert!(ErrorGuaranteed::from_error_count(0).is_none());
    }

    #[test]
    fn display() {
        let g = ErrorGuaranteed::from_error_count(3).unwrap();
        assert_eq!(g.to_string(), "error(s) emitted");
    }
}
