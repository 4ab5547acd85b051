//! Error kinds for typegraph operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// The CLI maps every kind to exit status 2; the kind exists so callers and
/// tests can tell failures apart without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // Option errors
    // =========================================================================
    /// Invalid option value
    InvalidArgument,

    // =========================================================================
    // Criteria errors
    // =========================================================================
    /// An include/exclude pattern is not a valid regular expression
    PatternCompileFailed,

    // =========================================================================
    // Introspection errors
    // =========================================================================
    /// The requested namespaces could not be loaded
    LoadFailed,

    /// A source file could not be parsed
    ParseFailed,

    // =========================================================================
    // Graph errors
    // =========================================================================
    /// No entity survived discovery
    EmptyGraph,

    // =========================================================================
    // Output errors
    // =========================================================================
    /// The external graph renderer failed
    RenderFailed,

    /// Serialization of the graph description failed
    SerializationFailed,

    // =========================================================================
    // File/IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}
