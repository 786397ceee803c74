//! Diagnostics reported by the xtc type passes.
//!
//! - Error codes for searchability
//! - Messages that render the offending type
//! - Notes for context
//!
//! # Error Guarantees
//!
//! `ErrorGuaranteed` is type-level proof that at least one error was emitted.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! fn validate_all() -> Result<(), ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
