//! Identifiers invented while writing a document, and the cross references between them.
//!
//! One registry belongs to exactly one export. Sections that define an identifier
//! register it; later sections look it up and treat a miss as fatal, since it means
//! the document would contain a dangling reference.
use std::collections::HashMap;

use indexmap::IndexMap;

use super::ExportError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EvidenceKey {
    accession: String,
    start: usize,
    peptide_key: String,
}

impl EvidenceKey {
    fn new(accession: &str, start: usize, peptide_key: &str) -> Self {
        Self {
            accession: accession.to_string(),
            start,
            peptide_key: peptide_key.to_string(),
        }
    }
}

/// The identifiers of a spectrum identification result and its single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectrumItemIds {
    pub result: String,
    pub item: String,
}

/// Assigns 0-based indices to modification masses in the order they are first seen.
///
/// Masses are compared at a resolution of 10⁻⁶ Da, so two modifications with the same
/// mass always share an index.
#[derive(Debug, Clone, Default)]
pub struct ModificationIndex {
    indices: IndexMap<i64, usize>,
}

impl ModificationIndex {
    fn mass_key(mass: f64) -> i64 {
        (mass * 1e6).round() as i64
    }

    /// The index of `mass`, assigning the next one if it has not been seen
    pub fn assign(&mut self, mass: f64) -> usize {
        let next = self.indices.len();
        *self.indices.entry(Self::mass_key(mass)).or_insert(next)
    }

    pub fn get(&self, mass: f64) -> Option<usize> {
        self.indices.get(&Self::mass_key(mass)).copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    peptide_evidence: HashMap<EvidenceKey, String>,
    peptide_ids: HashMap<String, String>,
    spectrum_peptides: HashMap<String, String>,
    spectrum_items: HashMap<String, SpectrumItemIds>,
    peptide_items: HashMap<String, Vec<String>>,
    spectrum_indices: HashMap<String, usize>,
    spectra_data: IndexMap<String, String>,
    modifications: ModificationIndex,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier of the occurrence of `peptide_key` at the 0-based `start` of `accession`,
    /// created on first use
    pub fn register_peptide_evidence(&mut self, accession: &str, start: usize, peptide_key: &str) -> &str {
        let next = self.peptide_evidence.len() + 1;
        self.peptide_evidence
            .entry(EvidenceKey::new(accession, start, peptide_key))
            .or_insert_with(|| format!("PepEv_{next}"))
            .as_str()
    }

    pub fn peptide_evidence(&self, accession: &str, start: usize, peptide_key: &str) -> Result<&str, ExportError> {
        self.peptide_evidence
            .get(&EvidenceKey::new(accession, start, peptide_key))
            .map(|s| s.as_str())
            .ok_or_else(|| ExportError::MissingPeptideEvidence {
                accession: accession.to_string(),
                start,
                peptide: peptide_key.to_string(),
            })
    }

    pub fn peptide_evidence_count(&self) -> usize {
        self.peptide_evidence.len()
    }

    pub fn register_peptide(&mut self, peptide_key: &str) -> &str {
        let next = self.peptide_ids.len() + 1;
        self.peptide_ids
            .entry(peptide_key.to_string())
            .or_insert_with(|| format!("Pep_{next}"))
            .as_str()
    }

    pub fn peptide_id(&self, peptide_key: &str) -> Result<&str, ExportError> {
        self.peptide_ids
            .get(peptide_key)
            .map(|s| s.as_str())
            .ok_or_else(|| ExportError::MissingPeptide(peptide_key.to_string()))
    }

    /// Record that a spectrum supports a peptide match
    pub fn map_spectrum_to_peptide(&mut self, spectrum_key: &str, peptide_key: &str) {
        self.spectrum_peptides
            .insert(spectrum_key.to_string(), peptide_key.to_string());
    }

    pub fn peptide_for_spectrum(&self, spectrum_key: &str) -> Result<&str, ExportError> {
        self.spectrum_peptides
            .get(spectrum_key)
            .map(|s| s.as_str())
            .ok_or_else(|| ExportError::MissingPeptideForSpectrum(spectrum_key.to_string()))
    }

    /// Create the result and item identifiers for a spectrum supporting `peptide_key`.
    /// Registering the same spectrum again returns its existing identifiers.
    pub fn register_spectrum_item(&mut self, spectrum_key: &str, peptide_key: &str) -> SpectrumItemIds {
        if let Some(ids) = self.spectrum_items.get(spectrum_key) {
            return ids.clone();
        }
        let n = self.spectrum_items.len() + 1;
        let ids = SpectrumItemIds {
            result: format!("SIR_{n}"),
            item: format!("SII_{n}_1"),
        };
        self.spectrum_items
            .insert(spectrum_key.to_string(), ids.clone());
        self.peptide_items
            .entry(peptide_key.to_string())
            .or_default()
            .push(ids.item.clone());
        ids
    }

    pub fn spectrum_item(&self, spectrum_key: &str) -> Result<&SpectrumItemIds, ExportError> {
        self.spectrum_items
            .get(spectrum_key)
            .ok_or_else(|| ExportError::MissingSpectrumItem(spectrum_key.to_string()))
    }

    /// The spectrum identification items written for a peptide match, in the order written
    pub fn spectrum_items_for_peptide(&self, peptide_key: &str) -> &[String] {
        self.peptide_items
            .get(peptide_key)
            .map(|v| v.as_slice())
            .unwrap_or_default()
    }

    /// The 1-based position of a spectrum in a PRIDE XML spectrum list
    pub fn register_spectrum_index(&mut self, spectrum_key: &str) -> usize {
        let next = self.spectrum_indices.len() + 1;
        *self
            .spectrum_indices
            .entry(spectrum_key.to_string())
            .or_insert(next)
    }

    pub fn spectrum_index(&self, spectrum_key: &str) -> Result<usize, ExportError> {
        self.spectrum_indices
            .get(spectrum_key)
            .copied()
            .ok_or_else(|| ExportError::MissingSpectrumIndex(spectrum_key.to_string()))
    }

    pub fn register_spectra_data(&mut self, file_name: &str) -> &str {
        let next = self.spectra_data.len() + 1;
        self.spectra_data
            .entry(file_name.to_string())
            .or_insert_with(|| format!("SpectraData_{next}"))
            .as_str()
    }

    pub fn spectra_data(&self, file_name: &str) -> Result<&str, ExportError> {
        self.spectra_data
            .get(file_name)
            .map(|s| s.as_str())
            .ok_or_else(|| ExportError::UnknownSpectrumFile(file_name.to_string()))
    }

    pub fn spectra_data_ids(&self) -> impl Iterator<Item = (&str, &str)> {
        self.spectra_data
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn modifications(&self) -> &ModificationIndex {
        &self.modifications
    }

    pub fn modifications_mut(&mut self) -> &mut ModificationIndex {
        &mut self.modifications
    }
}
