//! In-memory implementations of the identification interfaces, for small
//! datasets assembled programmatically.
use std::collections::HashMap;

use indexmap::IndexMap;

use super::fragment::{AnnotationSettings, IonMatch};
use super::peptide::{PeptideMatch, Peptidoform};
use super::protein::{ProteinGroup, ProteinRecord};
use super::source::{
    EntityIter, IdentificationSource, Peak, SequenceProvider, SourceError, SourceResult,
    SpectrumAnnotator, SpectrumFile, SpectrumInfo, SpectrumProvider,
};
use super::spectrum_match::SpectrumMatch;
use super::validation::{PtmScores, ValidationParams};

/// Identification results, protein sequences and spectra held in memory.
///
/// Entities are iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentifications {
    proteins: IndexMap<String, ProteinRecord>,
    peptides: IndexMap<String, PeptideMatch>,
    spectrum_matches: IndexMap<String, SpectrumMatch>,
    protein_groups: IndexMap<String, ProteinGroup>,
    psm_validation: HashMap<String, ValidationParams>,
    peptide_validation: HashMap<String, ValidationParams>,
    group_validation: HashMap<String, ValidationParams>,
    ptm_scores: HashMap<String, PtmScores>,
    files: Vec<SpectrumFile>,
    spectra: HashMap<String, (SpectrumInfo, Vec<Peak>)>,
}

impl MemoryIdentifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_protein(&mut self, protein: ProteinRecord) -> &mut Self {
        self.proteins.insert(protein.accession.clone(), protein);
        self
    }

    pub fn add_peptide(&mut self, peptide: PeptideMatch, validation: ValidationParams) -> &mut Self {
        self.peptide_validation.insert(peptide.key.clone(), validation);
        self.peptides.insert(peptide.key.clone(), peptide);
        self
    }

    pub fn add_spectrum_match(
        &mut self,
        spectrum_match: SpectrumMatch,
        validation: ValidationParams,
    ) -> &mut Self {
        self.psm_validation
            .insert(spectrum_match.key.clone(), validation);
        self.spectrum_matches
            .insert(spectrum_match.key.clone(), spectrum_match);
        self
    }

    pub fn add_protein_group(&mut self, group: ProteinGroup, validation: ValidationParams) -> &mut Self {
        self.group_validation.insert(group.key.clone(), validation);
        self.protein_groups.insert(group.key.clone(), group);
        self
    }

    pub fn add_ptm_scores<S: Into<String>>(&mut self, spectrum_key: S, scores: PtmScores) -> &mut Self {
        self.ptm_scores.insert(spectrum_key.into(), scores);
        self
    }

    pub fn add_spectrum_file(&mut self, file: SpectrumFile) -> &mut Self {
        if !self.files.contains(&file) {
            self.files.push(file);
        }
        self
    }

    /// Store a spectrum under the key derived from its file and title
    pub fn add_spectrum(&mut self, info: SpectrumInfo, peaks: Vec<Peak>) -> &mut Self {
        let key = SpectrumMatch::spectrum_key(&info.file, &info.title);
        self.spectra.insert(key, (info, peaks));
        self
    }
}

impl IdentificationSource for MemoryIdentifications {
    fn protein_groups(&self) -> EntityIter<'_, ProteinGroup> {
        Box::new(self.protein_groups.values().cloned().map(Ok))
    }

    fn peptide_matches(&self) -> EntityIter<'_, PeptideMatch> {
        Box::new(self.peptides.values().cloned().map(Ok))
    }

    fn spectrum_matches(&self) -> EntityIter<'_, SpectrumMatch> {
        Box::new(self.spectrum_matches.values().cloned().map(Ok))
    }

    fn peptide_match(&self, key: &str) -> SourceResult<PeptideMatch> {
        self.peptides
            .get(key)
            .cloned()
            .ok_or_else(|| SourceError::PeptideNotFound(key.to_string()))
    }

    fn spectrum_match(&self, key: &str) -> SourceResult<SpectrumMatch> {
        self.spectrum_matches
            .get(key)
            .cloned()
            .ok_or_else(|| SourceError::SpectrumNotFound(key.to_string()))
    }

    fn psm_validation(&self, spectrum_key: &str) -> SourceResult<ValidationParams> {
        self.psm_validation
            .get(spectrum_key)
            .copied()
            .ok_or_else(|| SourceError::ValidationNotFound(spectrum_key.to_string()))
    }

    fn peptide_validation(&self, peptide_key: &str) -> SourceResult<ValidationParams> {
        self.peptide_validation
            .get(peptide_key)
            .copied()
            .ok_or_else(|| SourceError::ValidationNotFound(peptide_key.to_string()))
    }

    fn protein_group_validation(&self, group_key: &str) -> SourceResult<ValidationParams> {
        self.group_validation
            .get(group_key)
            .copied()
            .ok_or_else(|| SourceError::ValidationNotFound(group_key.to_string()))
    }

    fn ptm_scores(&self, spectrum_key: &str) -> Option<PtmScores> {
        self.ptm_scores.get(spectrum_key).cloned()
    }

    fn count_protein_groups(&self) -> usize {
        self.protein_groups.len()
    }

    fn count_peptide_matches(&self) -> usize {
        self.peptides.len()
    }

    fn count_spectrum_matches(&self) -> usize {
        self.spectrum_matches.len()
    }
}

impl SequenceProvider for MemoryIdentifications {
    fn accessions(&self) -> Vec<String> {
        self.proteins.keys().cloned().collect()
    }

    fn protein(&self, accession: &str) -> SourceResult<ProteinRecord> {
        self.proteins
            .get(accession)
            .cloned()
            .ok_or_else(|| SourceError::ProteinNotFound(accession.to_string()))
    }
}

impl SpectrumProvider for MemoryIdentifications {
    fn spectrum_files(&self) -> Vec<SpectrumFile> {
        self.files.clone()
    }

    fn spectrum_info(&self, spectrum_key: &str) -> SourceResult<SpectrumInfo> {
        self.spectra
            .get(spectrum_key)
            .map(|(info, _)| info.clone())
            .ok_or_else(|| SourceError::SpectrumNotFound(spectrum_key.to_string()))
    }

    fn peaks(&self, spectrum_key: &str) -> SourceResult<Vec<Peak>> {
        self.spectra
            .get(spectrum_key)
            .map(|(_, peaks)| peaks.clone())
            .ok_or_else(|| SourceError::SpectrumNotFound(spectrum_key.to_string()))
    }
}

/// Replays previously recorded ion matches per spectrum.
///
/// The recorded matches are returned as-is, without regard to the peptide,
/// charge or settings of the request.
#[derive(Debug, Clone, Default)]
pub struct MemoryAnnotator {
    matches: HashMap<String, Vec<IonMatch>>,
}

impl MemoryAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_matches<S: Into<String>>(&mut self, spectrum_key: S, matches: Vec<IonMatch>) -> &mut Self {
        self.matches
            .entry(spectrum_key.into())
            .or_default()
            .extend(matches);
        self
    }
}

impl SpectrumAnnotator for MemoryAnnotator {
    fn annotate<'a>(
        &'a self,
        spectrum_key: &str,
        _peptide: &Peptidoform,
        _charge: i32,
        _settings: &AnnotationSettings,
    ) -> SourceResult<Box<dyn Iterator<Item = IonMatch> + 'a>> {
        match self.matches.get(spectrum_key) {
            Some(matches) => Ok(Box::new(matches.iter().cloned())),
            None => Ok(Box::new(std::iter::empty())),
        }
    }
}
