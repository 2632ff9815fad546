// ---------------------------------------------------------------------------
// LayoutError: failures surfaced by the road layout builder
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can stop a road layout build.
///
/// Degenerate inputs (fewer than two POIs) are not errors; they produce an
/// empty layout.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A tunable is out of range (e.g. non-positive intersection spacing).
    InvalidParams(String),
    /// A parameter override file could not be parsed.
    ParseParams(String),
    /// The build observed a cancellation request and stopped early.
    Cancelled,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::InvalidParams(msg) => write!(f, "Invalid road layout parameters: {msg}"),
            LayoutError::ParseParams(msg) => {
                write!(f, "Failed to parse road layout parameters: {msg}")
            }
            LayoutError::Cancelled => write!(f, "Road layout build was cancelled"),
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        LayoutError::ParseParams(e.to_string())
    }
}
