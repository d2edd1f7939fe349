//! Error types for the BioDataFuse CLI
//!
//! Library errors are sorted into user-facing categories, each with a hint on what to
//! change before trying again.

use bdf_common::BdfError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The identifier list or file could not be used
    #[error("{0}. Check the identifiers passed with --ids or --file and the --id-type.")]
    Input(BdfError),

    /// A --source value names nothing the registry knows
    #[error("{0}. Run 'bdf sources' to see the available sources and options.")]
    Selection(BdfError),

    /// BridgeDb could not be used
    #[error("{0}. Check your internet connection and BDF_BRIDGEDB_URL.")]
    Upstream(BdfError),

    /// Configuration is missing or invalid
    #[error("{0}. Check your BDF_* environment variables or .env file.")]
    Config(BdfError),

    /// Writing the exported files failed
    #[error("{0}. Check that the output directory is writable.")]
    Export(BdfError),

    #[error(transparent)]
    Library(BdfError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<BdfError> for CliError {
    fn from(err: BdfError) -> Self {
        match err {
            BdfError::EmptyInput | BdfError::UnsupportedFormat(_) | BdfError::Unmapped(_) => Self::Input(err),
            BdfError::UnknownSource(_)
            | BdfError::UnknownOption { .. }
            | BdfError::MissingOption(_)
            | BdfError::NoSelection => Self::Selection(err),
            BdfError::UpstreamService(_) => Self::Upstream(err),
            BdfError::Config(_) => Self::Config(err),
            BdfError::Export(_) | BdfError::Io(_) => Self::Export(err),
            other => Self::Library(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_errors_point_to_sources_command() {
        let err = CliError::from(BdfError::UnknownSource("KEGG".into()));
        assert!(matches!(err, CliError::Selection(_)));
        assert_eq!(
            err.to_string(),
            "Unknown data source: KEGG. Run 'bdf sources' to see the available sources and options."
        );
    }

    #[test]
    fn test_input_errors() {
        assert!(matches!(CliError::from(BdfError::EmptyInput), CliError::Input(_)));
        assert!(matches!(CliError::from(BdfError::Unmapped(3)), CliError::Input(_)));
    }

    #[test]
    fn test_other_errors_keep_library_message() {
        let err = CliError::from(BdfError::Merge("kind conflict".into()));
        assert_eq!(err.to_string(), "Merge error: kind conflict");
    }
}
