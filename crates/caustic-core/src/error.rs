//! Error types for caustic design operations.
//!
//! Every fallible operation in this crate returns [`CausticResult`]. Errors
//! carry a stable [`CausticErrorCode`] for programmatic handling and a
//! `miette` diagnostic code plus help text for human-readable reports.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Stable error codes for programmatic error identification.
///
/// Codes in the 1000 range are input and shape validation failures, codes in
/// the 2000 range are computation failures, codes in the 3000 range are file
/// I/O failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CausticErrorCode {
    /// Two fields were combined element-wise but their shapes differ.
    ShapeMismatch,
    /// A velocity field does not fit the lens it should deform.
    MarchSizeMismatch,
    /// An aggregate was requested on a field with no elements.
    EmptyField,
    /// A field is too small for the requested stencil operation.
    FieldTooSmall,
    /// A CSV document could not be parsed back into a field.
    MalformedCsv,
    /// No triangle of the lens bounds the march step.
    UnconstrainedMarch,
    /// A CSV file could not be read.
    IoRead,
    /// A CSV file could not be written.
    IoWrite,
}

impl CausticErrorCode {
    /// Returns the error code as a stable string identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            CausticErrorCode::ShapeMismatch => "CAUSTIC-1001",
            CausticErrorCode::MarchSizeMismatch => "CAUSTIC-1002",
            CausticErrorCode::EmptyField => "CAUSTIC-1003",
            CausticErrorCode::FieldTooSmall => "CAUSTIC-1004",
            CausticErrorCode::MalformedCsv => "CAUSTIC-1005",
            CausticErrorCode::UnconstrainedMarch => "CAUSTIC-2001",
            CausticErrorCode::IoRead => "CAUSTIC-3001",
            CausticErrorCode::IoWrite => "CAUSTIC-3002",
        }
    }
}

impl std::fmt::Display for CausticErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors produced by field arithmetic, CSV parsing and the lens pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum CausticError {
    /// Element-wise combination of two fields with different shapes.
    #[error("fields have mismatched shapes: {left:?} vs {right:?} (width x height)")]
    #[diagnostic(
        code(caustic::field::shape_mismatch),
        help("Element-wise operations require both fields to have identical width and height.")
    )]
    ShapeMismatch {
        /// Shape of the left operand as `[width, height]`.
        left: [usize; 2],
        /// Shape of the right operand as `[width, height]`.
        right: [usize; 2],
    },

    /// Velocity field shape does not match the lens cell grid.
    #[error("velocity field {velocity:?} does not fit the {lens:?} lens vertex grid")]
    #[diagnostic(
        code(caustic::lens::march_size),
        help(
            "A lens with W x H vertices marches along a (W-1) x (H-1) velocity field, \
             one vector per cell."
        )
    )]
    MarchSizeMismatch {
        /// Lens vertex grid shape as `[width, height]`.
        lens: [usize; 2],
        /// Velocity field shape as `[width, height]`.
        velocity: [usize; 2],
    },

    /// Aggregate such as a maximum requested on a field with no elements.
    #[error("cannot compute {operation} of an empty field")]
    #[diagnostic(
        code(caustic::field::empty),
        help("Construct the field with nonzero width and height before aggregating it.")
    )]
    EmptyField {
        /// Name of the aggregate that was requested.
        operation: &'static str,
    },

    /// Field too small for a finite-difference stencil.
    #[error("field is {width}x{height} but the operation needs at least {min_side} cells per axis")]
    #[diagnostic(
        code(caustic::field::too_small),
        help("Three-point stencils need at least three cells along every axis.")
    )]
    FieldTooSmall {
        /// Actual field width.
        width: usize,
        /// Actual field height.
        height: usize,
        /// Minimum number of cells required per axis.
        min_side: usize,
    },

    /// CSV text that does not describe a well-formed field.
    #[error("malformed CSV record at line {line}: {details}")]
    #[diagnostic(
        code(caustic::csv::malformed),
        help(
            "Scalar fields are rows of comma-separated numbers; vector fields are \
             `x, y, vx, vy` records."
        )
    )]
    MalformedCsv {
        /// One-based line number of the offending record.
        line: usize,
        /// Description of what failed to parse.
        details: String,
    },

    /// March step on a lens whose triangles never collapse under the
    /// given velocity even though the velocity is nonzero.
    #[error("no triangle constrains the march step")]
    #[diagnostic(
        code(caustic::lens::unconstrained_march),
        help(
            "Every nonzero march must be bounded by the first triangle collapse. \
             An unbounded march indicates degenerate lens geometry."
        )
    )]
    UnconstrainedMarch,

    /// Error reading a field CSV file.
    #[error("failed to read field CSV from {}", path.display())]
    #[diagnostic(
        code(caustic::io::read),
        help("Check that the file exists and is readable.")
    )]
    IoRead {
        /// Path that could not be read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a field CSV file.
    #[error("failed to write field CSV to {}", path.display())]
    #[diagnostic(
        code(caustic::io::write),
        help("Check that the directory exists and is writable.")
    )]
    IoWrite {
        /// Path that could not be written.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CausticError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> CausticErrorCode {
        match self {
            CausticError::ShapeMismatch { .. } => CausticErrorCode::ShapeMismatch,
            CausticError::MarchSizeMismatch { .. } => CausticErrorCode::MarchSizeMismatch,
            CausticError::EmptyField { .. } => CausticErrorCode::EmptyField,
            CausticError::FieldTooSmall { .. } => CausticErrorCode::FieldTooSmall,
            CausticError::MalformedCsv { .. } => CausticErrorCode::MalformedCsv,
            CausticError::UnconstrainedMarch => CausticErrorCode::UnconstrainedMarch,
            CausticError::IoRead { .. } => CausticErrorCode::IoRead,
            CausticError::IoWrite { .. } => CausticErrorCode::IoWrite,
        }
    }

    /// Creates a shape mismatch error from two `[width, height]` shapes.
    pub fn shape_mismatch(left: [usize; 2], right: [usize; 2]) -> Self {
        CausticError::ShapeMismatch { left, right }
    }

    /// Creates a march size mismatch error.
    pub fn march_size_mismatch(lens: [usize; 2], velocity: [usize; 2]) -> Self {
        CausticError::MarchSizeMismatch { lens, velocity }
    }

    /// Creates an empty field error for the named aggregate.
    pub fn empty_field(operation: &'static str) -> Self {
        CausticError::EmptyField { operation }
    }

    /// Creates a field too small error.
    pub fn field_too_small(width: usize, height: usize, min_side: usize) -> Self {
        CausticError::FieldTooSmall {
            width,
            height,
            min_side,
        }
    }

    /// Creates a malformed CSV error for the given one-based line.
    pub fn malformed_csv(line: usize, details: impl Into<String>) -> Self {
        CausticError::MalformedCsv {
            line,
            details: details.into(),
        }
    }

    /// Creates an unconstrained march error.
    pub fn unconstrained_march() -> Self {
        CausticError::UnconstrainedMarch
    }

    /// Creates an I/O read error for the given path.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CausticError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Creates an I/O write error for the given path.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CausticError::IoWrite {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for caustic design operations.
pub type CausticResult<T> = std::result::Result<T, CausticError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(CausticErrorCode::ShapeMismatch.as_str(), "CAUSTIC-1001");
        assert_eq!(CausticErrorCode::MarchSizeMismatch.as_str(), "CAUSTIC-1002");
        assert_eq!(CausticErrorCode::EmptyField.as_str(), "CAUSTIC-1003");
        assert_eq!(CausticErrorCode::FieldTooSmall.as_str(), "CAUSTIC-1004");
        assert_eq!(CausticErrorCode::MalformedCsv.as_str(), "CAUSTIC-1005");
        assert_eq!(CausticErrorCode::UnconstrainedMarch.as_str(), "CAUSTIC-2001");
        assert_eq!(CausticErrorCode::IoRead.as_str(), "CAUSTIC-3001");
        assert_eq!(CausticErrorCode::IoWrite.as_str(), "CAUSTIC-3002");
    }

    #[test]
    fn test_errors_map_to_codes() {
        let err = CausticError::shape_mismatch([4, 3], [5, 3]);
        assert_eq!(err.code(), CausticErrorCode::ShapeMismatch);

        let err = CausticError::march_size_mismatch([3, 3], [3, 3]);
        assert_eq!(err.code(), CausticErrorCode::MarchSizeMismatch);

        let err = CausticError::empty_field("maximum");
        assert_eq!(err.code(), CausticErrorCode::EmptyField);

        let err = CausticError::field_too_small(2, 5, 3);
        assert_eq!(err.code(), CausticErrorCode::FieldTooSmall);

        let err = CausticError::malformed_csv(7, "expected 4 values");
        assert_eq!(err.code(), CausticErrorCode::MalformedCsv);

        let err = CausticError::unconstrained_march();
        assert_eq!(err.code(), CausticErrorCode::UnconstrainedMarch);

        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = CausticError::io_read("loss0.csv", not_found);
        assert_eq!(err.code(), CausticErrorCode::IoRead);

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only");
        let err = CausticError::io_write("lens0.csv", denied);
        assert_eq!(err.code(), CausticErrorCode::IoWrite);
    }

    #[test]
    fn test_error_messages_name_the_problem() {
        let err = CausticError::shape_mismatch([4, 3], [5, 3]);
        let message = err.to_string();
        assert!(message.contains("[4, 3]"));
        assert!(message.contains("[5, 3]"));

        let err = CausticError::malformed_csv(7, "expected 4 values, got 3");
        let message = err.to_string();
        assert!(message.contains("line 7"));
        assert!(message.contains("expected 4 values"));

        let err = CausticError::field_too_small(2, 5, 3);
        assert!(err.to_string().contains("2x5"));
    }
}
