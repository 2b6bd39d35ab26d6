use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `PandemicError` and maps other errors to
/// convert to a `PandemicError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum PandemicError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    ConfigError(String),
    ReportError(String),
    PandemicError(String),
}

impl From<io::Error> for PandemicError {
    fn from(error: io::Error) -> Self {
        PandemicError::IoError(error)
    }
}

impl From<serde_json::Error> for PandemicError {
    fn from(error: serde_json::Error) -> Self {
        PandemicError::JsonError(error)
    }
}

impl From<csv::Error> for PandemicError {
    fn from(error: csv::Error) -> Self {
        PandemicError::CSVError(error)
    }
}

impl From<String> for PandemicError {
    fn from(error: String) -> Self {
        PandemicError::PandemicError(error)
    }
}

impl From<&str> for PandemicError {
    fn from(error: &str) -> Self {
        PandemicError::PandemicError(error.to_string())
    }
}

impl std::error::Error for PandemicError {}

impl Display for PandemicError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PandemicError::ConfigError(message) => write!(f, "Configuration error: {message}"),
            PandemicError::ReportError(message) => write!(f, "Report error: {message}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = PandemicError::ConfigError("too many infected".to_string());
        assert_eq!(error.to_string(), "Configuration error: too many infected");
    }

    #[test]
    fn converts_from_str() {
        let error: PandemicError = "boom".into();
        assert!(matches!(error, PandemicError::PandemicError(ref m) if m == "boom"));
    }

    #[test]
    fn converts_from_io() {
        let error: PandemicError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(error, PandemicError::IoError(_)));
    }
}
