//! Writing mzIdentML 1.1 and 1.2 documents.
//!
//! The document is streamed section by section. The sequence collection hands
//! out the peptide and peptide evidence identifiers that the spectrum
//! identification and protein detection lists refer back to.
use std::path::Path;

use crate::identification::IdentificationContext;
use crate::progress::ProgressHandle;
use crate::settings::ExportSettings;

use super::{CompressedWriter, ExportError, ExportOutcome};

mod protein_detection;
mod protocol;
mod sequence_collection;
mod spectrum_identification;
mod version;
mod writer;

pub use version::{MzIdentMLVersion, VersionProfile};
pub use writer::{MzIdentMLWriter, MzIdentMLWriterState};

pub(crate) const SOFTWARE_ID: &str = "ID_software";
pub(crate) const SEARCH_DATABASE_ID: &str = "SearchDB_1";
pub(crate) const SEARCH_PROTOCOL_ID: &str = "SearchProtocol_1";
pub(crate) const PROTEIN_DETECTION_PROTOCOL_ID: &str = "PeptideShaker_1";
pub(crate) const SPECTRUM_IDENTIFICATION_LIST_ID: &str = "SIL_1";
pub(crate) const PROTEIN_DETECTION_LIST_ID: &str = "Protein_groups";

/// Write an mzIdentML document to `path`, gzip compressed when the settings ask for it.
///
/// A cancelled export leaves a truncated file behind that the caller should remove.
pub fn create_file<'a, P: AsRef<Path>>(
    path: P,
    context: IdentificationContext<'a>,
    settings: &'a ExportSettings,
    version: MzIdentMLVersion,
    progress: Option<&'a dyn ProgressHandle>,
) -> Result<ExportOutcome, ExportError> {
    let handle = CompressedWriter::create(path, settings.compression)?;
    let mut writer = MzIdentMLWriter::new(handle, context, settings, version);
    if let Some(progress) = progress {
        writer = writer.with_progress(progress);
    }
    let outcome = writer.write_document()?;
    writer.into_inner()?.finish()?;
    Ok(outcome)
}
