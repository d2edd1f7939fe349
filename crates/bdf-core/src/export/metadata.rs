//! Metadata document export

use crate::model::MetadataDocument;
use bdf_common::Result;
use std::io::Write;

/// Write the metadata document as pretty-printed UTF-8 JSON
pub fn write_metadata<W: Write>(metadata: &MetadataDocument, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, metadata)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
