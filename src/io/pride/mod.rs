//! Writing PRIDE XML 2.1 documents.
//!
//! PRIDE XML embeds the identified spectra in an `mzData` block and reports one
//! `GelFreeIdentification` per protein group. Documents are encoded as ISO-8859-1.
use std::path::Path;

use crate::identification::IdentificationContext;
use crate::progress::ProgressHandle;
use crate::settings::ExportSettings;

use super::{CompressedWriter, ExportError, ExportOutcome};

mod identification;
mod writer;

pub use writer::{PrideXMLWriter, PrideXMLWriterState};

/// Write a PRIDE XML document to `path`, gzip compressed when the settings ask for it.
///
/// A cancelled export leaves a truncated file behind that the caller should remove.
pub fn create_file<'a, P: AsRef<Path>>(
    path: P,
    context: IdentificationContext<'a>,
    settings: &'a ExportSettings,
    progress: Option<&'a dyn ProgressHandle>,
) -> Result<ExportOutcome, ExportError> {
    let handle = CompressedWriter::create(path, settings.compression)?;
    let mut writer = PrideXMLWriter::new(handle, context, settings);
    if let Some(progress) = progress {
        writer = writer.with_progress(progress);
    }
    let outcome = writer.write_document()?;
    writer.into_inner()?.finish()?;
    Ok(outcome)
}
