//! Identifier loader
//!
//! Turns a free-text block and/or an uploaded file into an ordered, de-duplicated list of
//! [`IdentifierRecord`]s. One identifier per line; a line may also carry a comma- or
//! tab-separated list, which is flattened.

use crate::model::IdentifierRecord;
use bdf_common::{BdfError, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// MIME types accepted for uploaded identifier files
const ACCEPTED_MIME_TYPES: &[&str] = &[
    "text/plain",
    "text/csv",
    "text/tab-separated-values",
    "application/csv",
    "application/vnd.ms-excel",
];

/// File extensions accepted when no content type is supplied
const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "csv", "tsv"];

/// An uploaded identifier file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    /// Declared content type; when absent the extension of `name` decides
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            content: content.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk. The content type is inferred from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, content))
    }

    fn check_format(&self) -> Result<()> {
        let accepted = match &self.content_type {
            Some(content_type) => content_type
                .parse::<mime::Mime>()
                .map(|m| ACCEPTED_MIME_TYPES.contains(&m.essence_str()))
                .unwrap_or(false),
            None => Path::new(&self.name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false),
        };

        if accepted {
            Ok(())
        } else {
            Err(BdfError::UnsupportedFormat(match &self.content_type {
                Some(content_type) => format!("{} ({})", self.name, content_type),
                None => self.name.clone(),
            }))
        }
    }

    fn text(&self) -> Result<&str> {
        let text = std::str::from_utf8(&self.content).map_err(|e| {
            BdfError::UnsupportedFormat(format!("{} is not UTF-8 text: {}", self.name, e))
        })?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
    }
}

/// Parse identifiers from free text and/or a file.
///
/// Free-text identifiers come first, then identifiers from the file; duplicates are
/// removed keeping the first occurrence. A file of the wrong type is rejected even if the
/// free text alone would have been enough.
pub fn load(file: Option<&InputFile>, free_text: Option<&str>) -> Result<Vec<IdentifierRecord>> {
    if let Some(file) = file {
        file.check_format()?;
    }

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    let mut push_all = |text: &str| {
        for identifier in split_identifiers(text) {
            if seen.insert(identifier.to_string()) {
                records.push(IdentifierRecord::new(identifier));
            }
        }
    };

    if let Some(text) = free_text {
        push_all(text);
    }
    if let Some(file) = file {
        push_all(file.text()?);
    }

    if records.is_empty() {
        return Err(BdfError::EmptyInput);
    }

    debug!(count = records.len(), "Loaded identifiers");
    Ok(records)
}

/// Split text into trimmed, unquoted, non-empty identifiers
fn split_identifiers(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .flat_map(|line| line.split([',', '\t']))
        .map(|token| token.trim().trim_matches('"').trim())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn identifiers(records: &[IdentifierRecord]) -> Vec<&str> {
        records.iter().map(|r| r.identifier.as_str()).collect()
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert!(matches!(load(None, Some("")), Err(BdfError::EmptyInput)));
        assert!(matches!(load(None, Some("   ")), Err(BdfError::EmptyInput)));
        assert!(matches!(load(None, None), Err(BdfError::EmptyInput)));
        assert!(matches!(load(None, Some("\n , \n\t")), Err(BdfError::EmptyInput)));
    }

    #[test]
    fn test_lines_and_comma_lists_are_flattened() {
        let records = load(None, Some("  BRCA1 \nTP53, EGFR\n\nBRCA1\n\"MYC\"\tKRAS\r\n")).unwrap();
        assert_eq!(identifiers(&records), vec!["BRCA1", "TP53", "EGFR", "MYC", "KRAS"]);
        assert!(records.iter().all(|r| r.identifier_source.is_none()));
    }

    #[test]
    fn test_free_text_comes_before_file() {
        let file = InputFile::new("genes.csv", "TP53\nAPOE\nBRCA1\n");
        let records = load(Some(&file), Some("BRCA1\nEGFR")).unwrap();
        assert_eq!(identifiers(&records), vec!["BRCA1", "EGFR", "TP53", "APOE"]);
    }

    #[test]
    fn test_file_format_by_extension_or_content_type() {
        let file = InputFile::new("genes.TXT", "BRCA1");
        assert_eq!(load(Some(&file), None).unwrap().len(), 1);

        let file = InputFile::new("upload", "BRCA1").with_content_type("application/vnd.ms-excel");
        assert_eq!(load(Some(&file), None).unwrap().len(), 1);

        let file = InputFile::new("upload", "BRCA1").with_content_type("text/plain; charset=utf-8");
        assert_eq!(load(Some(&file), None).unwrap().len(), 1);

        let file = InputFile::new("genes.xlsx", "BRCA1");
        assert!(matches!(load(Some(&file), Some("TP53")), Err(BdfError::UnsupportedFormat(_))));

        let file = InputFile::new("genes.txt", "BRCA1").with_content_type("application/pdf");
        assert!(matches!(load(Some(&file), None), Err(BdfError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_non_utf8_file_is_rejected() {
        let file = InputFile::new("genes.txt", vec![0xff, 0xfe, 0x00, 0x42]);
        assert!(matches!(load(Some(&file), None), Err(BdfError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let file = InputFile::new("genes.csv", "\u{feff}BRCA1\nTP53");
        let records = load(Some(&file), None).unwrap();
        assert_eq!(identifiers(&records), vec!["BRCA1", "TP53"]);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.tsv");
        std::fs::write(&path, "ENSG00000012048\tENSG00000141510\n").unwrap();

        let file = InputFile::from_path(&path).unwrap();
        assert_eq!(file.name, "ids.tsv");
        assert_eq!(load(Some(&file), None).unwrap().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_no_duplicates_and_first_seen_order(
            ids in prop::collection::vec("[A-Z][A-Z0-9]{0,7}", 1..40)
        ) {
            let text = ids.join("\n");
            let records = load(None, Some(&text)).unwrap();
            let loaded = identifiers(&records);

            let mut expected: Vec<&str> = Vec::new();
            for id in &ids {
                if !expected.contains(&id.as_str()) {
                    expected.push(id);
                }
            }
            prop_assert_eq!(loaded, expected);
        }
    }
}
