/// A protein entry from the searched sequence database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProteinRecord {
    pub accession: String,
    pub description: Option<String>,
    pub sequence: String,
    pub is_decoy: bool,
}

impl ProteinRecord {
    pub fn new<A: Into<String>, S: Into<String>>(accession: A, sequence: S) -> Self {
        Self {
            accession: accession.into(),
            description: None,
            sequence: sequence.into(),
            is_decoy: false,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn as_decoy(mut self) -> Self {
        self.is_decoy = true;
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The residues immediately before and after a peptide of `length` residues
    /// starting at the 0-based `offset`, `-` past either end of the sequence.
    pub fn flanking_residues(&self, offset: usize, length: usize) -> (char, char) {
        let bytes = self.sequence.as_bytes();
        let pre = if offset == 0 {
            '-'
        } else {
            bytes.get(offset - 1).map(|b| *b as char).unwrap_or('-')
        };
        let post = bytes
            .get(offset + length)
            .map(|b| *b as char)
            .unwrap_or('-');
        (pre, post)
    }

    /// The percentage of residues covered by at least one of the `(offset, length)` spans
    pub fn sequence_coverage<I: IntoIterator<Item = (usize, usize)>>(&self, spans: I) -> f64 {
        let n = self.len();
        if n == 0 {
            return 0.0;
        }
        let mut covered = vec![false; n];
        for (offset, length) in spans {
            let end = (offset + length).min(n);
            if offset < end {
                covered[offset..end].iter_mut().for_each(|c| *c = true);
            }
        }
        let count = covered.iter().filter(|c| **c).count();
        100.0 * count as f64 / n as f64
    }
}

/// A set of proteins that cannot be told apart by the peptides observed for them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProteinGroup {
    pub key: String,
    /// Every member accession, the main accession included
    pub accessions: Vec<String>,
    /// The accession representing the group
    pub main_accession: String,
    /// The peptide matches supporting this group
    pub peptide_keys: Vec<String>,
}

impl ProteinGroup {
    pub fn new<K: Into<String>, A: Into<String>>(key: K, main_accession: A) -> Self {
        let main_accession = main_accession.into();
        Self {
            key: key.into(),
            accessions: vec![main_accession.clone()],
            main_accession,
            peptide_keys: Vec::new(),
        }
    }

    pub fn with_member<A: Into<String>>(mut self, accession: A) -> Self {
        let accession = accession.into();
        if !self.accessions.contains(&accession) {
            self.accessions.push(accession);
        }
        self
    }

    pub fn with_peptide<K: Into<String>>(mut self, peptide_key: K) -> Self {
        self.peptide_keys.push(peptide_key.into());
        self
    }

    pub fn is_leading(&self, accession: &str) -> bool {
        self.main_accession == accession
    }
}
