//! Writing identification results to mzIdentML and PRIDE XML.
//!
//! Both writers stream their document in a fixed section order, resolving
//! cross references through an [`IdentifierRegistry`] owned by the export.
use std::io;

use thiserror::Error;

mod compression;
mod encoding;
pub mod mzidentml;
pub mod pride;
mod registry;
mod session;
mod xml;

pub use crate::io::compression::{is_gzipped_extension, CompressedWriter};
pub use crate::io::encoding::Latin1Writer;
pub use crate::io::mzidentml::{MzIdentMLVersion, MzIdentMLWriter, VersionProfile};
pub use crate::io::pride::PrideXMLWriter;
pub use crate::io::registry::{IdentifierRegistry, ModificationIndex, SpectrumItemIds};
pub use crate::io::session::ExportSession;
pub use crate::io::xml::{Dialect, XmlSink};

use crate::identification::SourceError;

/// Everything that can go wrong while writing a document
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An XML error occurred: {0}")]
    XMLError(#[from] quick_xml::Error),
    #[error("An error occurred while writing: {0}")]
    IOError(#[from] io::Error),
    #[error("An error occurred while reading identification results: {0}")]
    Source(#[from] SourceError),
    #[error("No peptide evidence was registered for {peptide} at {start} in {accession}")]
    MissingPeptideEvidence {
        accession: String,
        start: usize,
        peptide: String,
    },
    #[error("No peptide was written for peptide match {0}")]
    MissingPeptide(String),
    #[error("No spectrum identification item was written for {0}")]
    MissingSpectrumItem(String),
    #[error("No spectrum was written for {0}")]
    MissingSpectrumIndex(String),
    #[error("Spectrum match {0} is not supported by any peptide match")]
    MissingPeptideForSpectrum(String),
    #[error("Spectrum file {0} is not among the input spectra")]
    UnknownSpectrumFile(String),
    #[error("Modification {0} is not among the searched modifications")]
    UnknownModification(String),
    #[error("mzIdentML version {0} is not supported")]
    UnsupportedVersion(String),
    #[error("Invalid digestion configuration: {0}")]
    InvalidDigestion(String),
    #[error("Ion {ion} carries {found} neutral losses, at most {allowed} can be written")]
    NeutralLossLimitExceeded {
        ion: String,
        found: usize,
        allowed: usize,
    },
    #[error("The document ended with {depth} elements left open")]
    UnbalancedDocument { depth: usize },
    #[error("Cannot transition from {from} to {to}")]
    InvalidState { from: String, to: String },
    #[error("The export was cancelled")]
    Cancelled,
}

impl From<ExportError> for io::Error {
    fn from(value: ExportError) -> Self {
        match value {
            ExportError::IOError(e) => e,
            ExportError::Source(e) => e.into(),
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

pub type ExportResult = Result<(), ExportError>;

/// Counts of what a completed export wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub proteins: usize,
    pub peptides: usize,
    pub peptide_evidences: usize,
    pub spectrum_results: usize,
    /// Spectrum matches left out because they had no best assumption
    pub skipped_spectra: usize,
    pub protein_groups: usize,
    /// Protein groups left out because none of their members had an identified spectrum
    pub skipped_protein_groups: usize,
    /// Spectra written with their peaks, PRIDE XML only
    pub spectra: usize,
}

/// How an export ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Complete(ExportSummary),
    /// The export was cancelled with `depth` elements still open. The output
    /// is truncated and must be discarded.
    Cancelled { depth: usize },
}

impl ExportOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn summary(&self) -> Option<&ExportSummary> {
        match self {
            Self::Complete(summary) => Some(summary),
            Self::Cancelled { .. } => None,
        }
    }
}
