use std::fmt::Display;

use indexmap::IndexMap;

/// A named modification placed on a residue of a peptide.
///
/// The site is the 1-based index of the modified residue in the unmodified
/// sequence. Terminal modifications sit on the first or last residue; the
/// terminal location written to a file is decided by the modification's
/// definition, not by the site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModificationOccurrence {
    pub name: String,
    pub site: usize,
}

impl ModificationOccurrence {
    pub fn new<S: Into<String>>(name: S, site: usize) -> Self {
        Self {
            name: name.into(),
            site,
        }
    }
}

/// An amino acid sequence with its modifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Peptidoform {
    pub sequence: String,
    pub modifications: Vec<ModificationOccurrence>,
}

impl Peptidoform {
    pub fn new<S: Into<String>>(sequence: S) -> Self {
        Self {
            sequence: sequence.into(),
            modifications: Vec::new(),
        }
    }

    pub fn with_modification<S: Into<String>>(mut self, name: S, site: usize) -> Self {
        self.modifications.push(ModificationOccurrence::new(name, site));
        self
    }

    /// The number of residues in the unmodified sequence
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// A key identifying the sequence together with its modification state,
    /// independent of the order the modifications were recorded in.
    pub fn matching_key(&self) -> String {
        let mut mods: Vec<_> = self.modifications.iter().collect();
        mods.sort();
        let mut key = self.sequence.clone();
        for m in mods {
            key.push('_');
            key.push_str(&m.name);
            key.push('@');
            key.push_str(&m.site.to_string());
        }
        key
    }

    /// Whether `other` carries the same sequence and modification state
    pub fn same_signature(&self, other: &Peptidoform) -> bool {
        if self.sequence != other.sequence || self.modifications.len() != other.modifications.len()
        {
            return false;
        }
        let mut mine: Vec<_> = self.modifications.iter().collect();
        let mut theirs: Vec<_> = other.modifications.iter().collect();
        mine.sort();
        theirs.sort();
        mine == theirs
    }

    /// The distinct modification names on this peptide, in the order first seen
    pub fn modification_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for m in self.modifications.iter() {
            if !names.contains(&m.name.as_str()) {
                names.push(&m.name);
            }
        }
        names
    }
}

impl Display for Peptidoform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.matching_key())
    }
}

/// A validated peptide, where it occurs in the protein database and which spectra support it.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeptideMatch {
    /// A unique key for this peptide match, used as its identifier in the output
    pub key: String,
    pub peptide: Peptidoform,
    /// Protein accession to the 0-based start offsets of the peptide in that protein
    pub protein_mapping: IndexMap<String, Vec<usize>>,
    /// The keys of the spectrum matches whose best assumption is this peptide
    pub spectrum_keys: Vec<String>,
}

impl PeptideMatch {
    pub fn new<S: Into<String>>(key: S, peptide: Peptidoform) -> Self {
        Self {
            key: key.into(),
            peptide,
            protein_mapping: IndexMap::new(),
            spectrum_keys: Vec::new(),
        }
    }

    pub fn with_protein<S: Into<String>>(mut self, accession: S, offsets: Vec<usize>) -> Self {
        self.protein_mapping
            .entry(accession.into())
            .or_default()
            .extend(offsets);
        self
    }

    pub fn with_spectrum<S: Into<String>>(mut self, spectrum_key: S) -> Self {
        self.spectrum_keys.push(spectrum_key.into());
        self
    }

    /// The 0-based offsets of this peptide in `accession`, empty if it does not map there
    pub fn offsets_in(&self, accession: &str) -> &[usize] {
        self.protein_mapping
            .get(accession)
            .map(|v| v.as_slice())
            .unwrap_or_default()
    }

    /// Iterate over every `(accession, offset)` occurrence of this peptide
    pub fn occurrences(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.protein_mapping
            .iter()
            .flat_map(|(acc, offsets)| offsets.iter().map(move |o| (acc.as_str(), *o)))
    }

    pub fn is_shared(&self) -> bool {
        self.protein_mapping.len() > 1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_signature_ignores_order() {
        let a = Peptidoform::new("PEPTMIDEK")
            .with_modification("Oxidation of M", 5)
            .with_modification("Acetylation of peptide N-term", 1);
        let b = Peptidoform::new("PEPTMIDEK")
            .with_modification("Acetylation of peptide N-term", 1)
            .with_modification("Oxidation of M", 5);
        assert!(a.same_signature(&b));
        assert_eq!(a.matching_key(), b.matching_key());

        let c = Peptidoform::new("PEPTMIDEK").with_modification("Oxidation of M", 5);
        assert!(!a.same_signature(&c));
        let d = Peptidoform::new("PEPTMIDEK")
            .with_modification("Oxidation of M", 5)
            .with_modification("Oxidation of M", 5);
        assert!(!a.same_signature(&d));
    }

    #[test]
    fn test_occurrences() {
        let pep = PeptideMatch::new("PEPTIDE", Peptidoform::new("PEPTIDE"))
            .with_protein("PROT1", vec![1])
            .with_protein("PROT2", vec![4, 20]);
        let occ: Vec<_> = pep.occurrences().collect();
        assert_eq!(occ, vec![("PROT1", 1), ("PROT2", 4), ("PROT2", 20)]);
        assert!(pep.is_shared());
        assert_eq!(pep.offsets_in("PROT3"), &[] as &[usize]);
    }
}
