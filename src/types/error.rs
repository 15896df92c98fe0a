use thiserror::Error;

/// studiopulse error types
#[derive(Error, Debug)]
pub enum StudioError {
    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a CSV export
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// No usable session data found
    #[error("data error: {0}")]
    Data(String),
}

/// Result type alias for studiopulse
pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StudioError::Data("no csv files under ./exports".into());
        assert_eq!(err.to_string(), "data error: no csv files under ./exports");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StudioError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }
}
