//! Error types for BioDataFuse
//!
//! Only a handful of these stop a request. Per-source fetch failures and visualization
//! failures are recovered by the caller and reported alongside the results.

use thiserror::Error;

/// Result type alias for BioDataFuse operations
pub type Result<T> = std::result::Result<T, BdfError>;

/// Main error type for BioDataFuse
#[derive(Error, Debug)]
pub enum BdfError {
    /// Neither free text nor a file carried any identifier.
    #[error("No identifiers supplied")]
    EmptyInput,

    #[error("Unsupported file format: {0}. Upload a plain-text (.txt) or delimited (.csv, .tsv) file")]
    UnsupportedFormat(String),

    /// The identifier cross-reference service failed or answered with malformed data.
    #[error("Identifier mapping service error: {0}")]
    UpstreamService(String),

    /// No input identifier resolved to any target.
    #[error("The input is not valid: none of the {0} identifiers could be mapped")]
    Unmapped(usize),

    #[error("Annotation fetch failed for {}: {message}", display_query(.datasource, .option.as_deref()))]
    AnnotationFetch {
        datasource: String,
        option: Option<String>,
        message: String,
    },

    #[error("Unknown data source: {0}")]
    UnknownSource(String),

    #[error("Unknown option '{option}' for data source {datasource}")]
    UnknownOption { datasource: String, option: String },

    #[error("Data source {0} requires at least one option")]
    MissingOption(String),

    #[error("No data source selected")]
    NoSelection,

    #[error("Merge error: {0}")]
    Merge(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BdfError {
    /// Create an annotation fetch error for a source and optional sub-option
    pub fn annotation_fetch(
        datasource: impl Into<String>,
        option: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self::AnnotationFetch {
            datasource: datasource.into(),
            option: option.map(str::to_string),
            message: message.into(),
        }
    }

    /// Create an upstream service error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamService(msg.into())
    }

    /// Create an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Create a visualization error
    pub fn visualization(msg: impl Into<String>) -> Self {
        Self::Visualization(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error ends the current request.
    ///
    /// Annotation fetch failures are isolated per (source, option) and visualization
    /// failures are downgraded to warnings; everything else halts.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            BdfError::AnnotationFetch { .. } | BdfError::Visualization(_)
        )
    }
}

fn display_query(datasource: &str, option: Option<&str>) -> String {
    match option {
        Some(option) => format!("{datasource} (option: {option})"),
        None => datasource.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_propagation_policy() {
        assert!(BdfError::EmptyInput.is_fatal());
        assert!(BdfError::UnsupportedFormat("x.pdf".into()).is_fatal());
        assert!(BdfError::upstream("timeout").is_fatal());
        assert!(BdfError::UnknownSource("STRING-DB".into()).is_fatal());
        assert!(!BdfError::annotation_fetch("DisGeNet", None, "503").is_fatal());
        assert!(!BdfError::visualization("connection refused").is_fatal());
    }

    #[test]
    fn test_annotation_fetch_message_names_option() {
        let err = BdfError::annotation_fetch("OpenTarget", Some("Gene location"), "HTTP 500");
        assert_eq!(
            err.to_string(),
            "Annotation fetch failed for OpenTarget (option: Gene location): HTTP 500"
        );

        let err = BdfError::annotation_fetch("WikiPathway", None, "timed out");
        assert_eq!(err.to_string(), "Annotation fetch failed for WikiPathway: timed out");
    }
}
