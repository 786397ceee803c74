//! Error codes for type-model diagnostics.
//!
//! Each code is a stable identifier (e.g. `E2001`) whose first digit names the
//! phase that reported it.

use std::fmt;

/// Error codes for all type-model diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E1xxx: Construction / validation errors
/// - E2xxx: Effective-view synthesis errors
/// - E3xxx: Resolution errors
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Validation Errors (E1xxx)
    /// `service` and `immutable` applied to the same type
    E1001,
    /// Access modifier not applicable to the qualified type
    E1002,
    /// Annotation type is not a mixin
    E1003,
    /// More type parameters than the class declares
    E1004,
    /// Type parameter does not satisfy its constraint
    E1005,
    /// Virtual child does not exist on the parent
    E1006,
    /// Name could not be resolved
    E1007,
    /// Immutable modifier applied to a service class
    E1008,

    // Synthesis Errors (E2xxx)
    /// Ambiguous property contribution
    E2001,
    /// Ambiguous method contribution
    E2002,
    /// Static and instance members share a name
    E2003,
    /// Override with nothing to override
    E2004,
    /// Circular contribution chain
    E2005,
    /// Override narrows more than one base method
    E2006,
    /// Property override with an incompatible type
    E2007,
    /// Effective view requested for a type that is not ready
    E2008,

    // Resolution Errors (E3xxx)
    /// Recursion limit reached while resolving
    E3001,
    /// Placeholder still unresolved where a resolved type is required
    E3002,
    /// Typedef refers to nothing
    E3003,

    // Internal Errors (E9xxx)
    /// Internal error
    E9001,
    /// Too many errors
    E9002,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// Short description used when a diagnostic has no message of its own.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "a type cannot be both service and immutable",
            ErrorCode::E1002 => "access modifier not applicable here",
            ErrorCode::E1003 => "annotation is not a mixin",
            ErrorCode::E1004 => "too many type parameters",
            ErrorCode::E1005 => "type parameter violates its constraint",
            ErrorCode::E1006 => "no such virtual child",
            ErrorCode::E1007 => "unresolvable name",
            ErrorCode::E1008 => "a service cannot be immutable",
            ErrorCode::E2001 => "ambiguous property",
            ErrorCode::E2002 => "ambiguous method",
            ErrorCode::E2003 => "static and instance members collide",
            ErrorCode::E2004 => "override without a super member",
            ErrorCode::E2005 => "circular contribution",
            ErrorCode::E2006 => "ambiguous override narrowing",
            ErrorCode::E2007 => "incompatible property override",
            ErrorCode::E2008 => "type is not ready",
            ErrorCode::E3001 => "recursion limit reached",
            ErrorCode::E3002 => "unresolved placeholder",
            ErrorCode::E3003 => "undefined typedef",
            ErrorCode::E9001 => "internal error",
            ErrorCode::E9002 => "too many errors",
        }
    }

    /// Check if this is a validation error (E1xxx range).
    pub fn is_validation_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a synthesis error (E2xxx range).
    pub fn is_synthesis_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Check if this is a resolution error (E3xxx range).
    pub fn is_resolution_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    /// Check if this is an internal error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
