// ⚠️ Error taxonomy - every core failure is a value, never a panic

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RentalError {
    #[error("Failed to open the car catalog file: '{}' not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Car catalog I/O error on '{}': {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed catalog row at line {line}: {reason}")]
    Parse { line: u64, reason: String },

    #[error("Car not found: {0}")]
    CarNotFound(String),

    #[error("Renter legal name must not be empty")]
    InvalidRenterName,

    #[error("Days must be a positive whole number, got '{0}'")]
    InvalidDayCount(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl RentalError {
    /// Map an I/O failure on `path`, splitting out the not-found case
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            RentalError::FileNotFound { path }
        } else {
            RentalError::FileIo { path, source }
        }
    }

    /// Map a csv failure that happened while touching `path`
    pub fn from_csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(source) => RentalError::from_io(path, source),
            csv::ErrorKind::Utf8 { err, .. } => RentalError::Parse {
                line,
                reason: err.to_string(),
            },
            other => RentalError::Unexpected(format!("{:?}", other)),
        }
    }

    /// True for the booking-input errors the user can fix and retry
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            RentalError::CarNotFound(_)
                | RentalError::InvalidRenterName
                | RentalError::InvalidDayCount(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RentalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_split_out() {
        let err = RentalError::from_io(
            "missing.csv",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, RentalError::FileNotFound { .. }));
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let err = RentalError::from_io(
            "catalog.csv",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, RentalError::FileIo { .. }));
    }

    #[test]
    fn test_invalid_input_classification() {
        assert!(RentalError::InvalidRenterName.is_invalid_input());
        assert!(RentalError::InvalidDayCount("0".to_string()).is_invalid_input());
        assert!(RentalError::CarNotFound("ZZZ".to_string()).is_invalid_input());
        assert!(!RentalError::Unexpected("boom".to_string()).is_invalid_input());
    }
}
