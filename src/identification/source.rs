//! The interfaces the exporters read identification results through.
//!
//! Each trait is a blocking view over some store. Any error returned by an
//! implementation aborts the export it occurred in.
use std::io;
use std::path::Path;

use thiserror::Error;

use super::fragment::{AnnotationSettings, IonMatch};
use super::peptide::{PeptideMatch, Peptidoform};
use super::protein::{ProteinGroup, ProteinRecord};
use super::spectrum_match::SpectrumMatch;
use super::validation::{PtmScores, ValidationParams};

/// Errors an identification store may report
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("The requested protein {0} was not found")]
    ProteinNotFound(String),
    #[error("The requested peptide match {0} was not found")]
    PeptideNotFound(String),
    #[error("The requested spectrum {0} was not found")]
    SpectrumNotFound(String),
    #[error("No validation parameters were found for {0}")]
    ValidationNotFound(String),
    #[error("I/O error occurred while reading: {0}")]
    IOError(#[from] io::Error),
}

impl From<SourceError> for io::Error {
    fn from(value: SourceError) -> Self {
        let s = value.to_string();
        match value {
            SourceError::IOError(e) => e,
            _ => io::Error::new(io::ErrorKind::NotFound, s),
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A boxed, one-shot sequence of entities drawn from a store
pub type EntityIter<'a, T> = Box<dyn Iterator<Item = SourceResult<T>> + 'a>;

/// The store of validated identification results
pub trait IdentificationSource {
    fn protein_groups(&self) -> EntityIter<'_, ProteinGroup>;

    fn peptide_matches(&self) -> EntityIter<'_, PeptideMatch>;

    fn spectrum_matches(&self) -> EntityIter<'_, SpectrumMatch>;

    fn peptide_match(&self, key: &str) -> SourceResult<PeptideMatch>;

    fn spectrum_match(&self, key: &str) -> SourceResult<SpectrumMatch>;

    fn psm_validation(&self, spectrum_key: &str) -> SourceResult<ValidationParams>;

    fn peptide_validation(&self, peptide_key: &str) -> SourceResult<ValidationParams>;

    fn protein_group_validation(&self, group_key: &str) -> SourceResult<ValidationParams>;

    /// Modification localization scores for a spectrum match, if any were computed
    fn ptm_scores(&self, spectrum_key: &str) -> Option<PtmScores>;

    fn count_protein_groups(&self) -> usize {
        self.protein_groups().count()
    }

    fn count_peptide_matches(&self) -> usize {
        self.peptide_matches().count()
    }

    fn count_spectrum_matches(&self) -> usize {
        self.spectrum_matches().count()
    }
}

/// The protein sequence database
pub trait SequenceProvider {
    fn accessions(&self) -> Vec<String>;

    fn protein(&self, accession: &str) -> SourceResult<ProteinRecord>;
}

/// A peak list file the identified spectra were read from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectrumFile {
    /// The file name, as used in spectrum keys
    pub name: String,
    pub location: String,
}

impl SpectrumFile {
    pub fn new<N: Into<String>, L: Into<String>>(name: N, location: L) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    /// The lowercase file extension, if there is one
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrecursorInfo {
    pub mz: f64,
    pub intensity: f64,
    /// Retention time in seconds
    pub retention_time: Option<f64>,
    /// Candidate charge states, possibly empty
    pub charges: Vec<i32>,
}

/// Metadata of one spectrum in a peak list file
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectrumInfo {
    pub file: String,
    pub title: String,
    /// The 0-based position of the spectrum in its file
    pub index: usize,
    pub precursor: PrecursorInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Peak {
    pub mz: f64,
    pub intensity: f64,
}

impl Peak {
    pub fn new(mz: f64, intensity: f64) -> Self {
        Self { mz, intensity }
    }
}

/// The spectrum store
pub trait SpectrumProvider {
    fn spectrum_files(&self) -> Vec<SpectrumFile>;

    fn spectrum_info(&self, spectrum_key: &str) -> SourceResult<SpectrumInfo>;

    fn peaks(&self, spectrum_key: &str) -> SourceResult<Vec<Peak>>;
}

/// Matches theoretical fragment ions of a peptide against a spectrum's peaks.
///
/// The returned sequence is finite and may only be consumed once. Implementations
/// must not report ions carrying more neutral losses than the settings allow.
pub trait SpectrumAnnotator {
    fn annotate<'a>(
        &'a self,
        spectrum_key: &str,
        peptide: &Peptidoform,
        charge: i32,
        settings: &AnnotationSettings,
    ) -> SourceResult<Box<dyn Iterator<Item = IonMatch> + 'a>>;
}

/// Everything an export reads from
#[derive(Clone, Copy)]
pub struct IdentificationContext<'a> {
    pub identifications: &'a dyn IdentificationSource,
    pub sequences: &'a dyn SequenceProvider,
    pub spectra: &'a dyn SpectrumProvider,
    pub annotator: &'a dyn SpectrumAnnotator,
}

impl<'a> IdentificationContext<'a> {
    pub fn new(
        identifications: &'a dyn IdentificationSource,
        sequences: &'a dyn SequenceProvider,
        spectra: &'a dyn SpectrumProvider,
        annotator: &'a dyn SpectrumAnnotator,
    ) -> Self {
        Self {
            identifications,
            sequences,
            spectra,
            annotator,
        }
    }
}

impl std::fmt::Debug for IdentificationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentificationContext").finish_non_exhaustive()
    }
}
