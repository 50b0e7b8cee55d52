//! Export configuration.
//!
//! Everything the writers need to know beyond the identification results themselves:
//! the search parameters to report, validation thresholds, localization scoring
//! settings, document metadata and output options. With the `serde` feature
//! enabled the whole configuration can be read from JSON.
use std::fmt::Display;

use chrono::{DateTime, FixedOffset};

use crate::identification::SearchEngine;
use crate::impl_param_described;
use crate::params::{Param, ParamCow, ParamList, Unit};
use crate::terms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToleranceUnit {
    #[default]
    Ppm,
    Da,
}

/// A symmetric mass tolerance
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance {
    pub value: f64,
    pub unit: ToleranceUnit,
}

impl Tolerance {
    pub fn ppm(value: f64) -> Self {
        Self {
            value,
            unit: ToleranceUnit::Ppm,
        }
    }

    pub fn da(value: f64) -> Self {
        Self {
            value,
            unit: ToleranceUnit::Da,
        }
    }

    pub fn unit_param(&self) -> Unit {
        match self.unit {
            ToleranceUnit::Ppm => Unit::PartsPerMillion,
            ToleranceUnit::Da => Unit::Dalton,
        }
    }
}

/// Where on a peptide a modification may occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModificationPosition {
    #[default]
    Anywhere,
    PeptideNTerm,
    PeptideCTerm,
    ProteinNTerm,
    ProteinCTerm,
}

impl ModificationPosition {
    pub fn is_n_term(&self) -> bool {
        matches!(self, Self::PeptideNTerm | Self::ProteinNTerm)
    }

    pub fn is_c_term(&self) -> bool {
        matches!(self, Self::PeptideCTerm | Self::ProteinCTerm)
    }

    pub fn specificity_term(&self) -> Option<ParamCow<'static>> {
        match self {
            Self::Anywhere => None,
            Self::PeptideNTerm => Some(terms::SPECIFICITY_PEPTIDE_N_TERM),
            Self::PeptideCTerm => Some(terms::SPECIFICITY_PEPTIDE_C_TERM),
            Self::ProteinNTerm => Some(terms::SPECIFICITY_PROTEIN_N_TERM),
            Self::ProteinCTerm => Some(terms::SPECIFICITY_PROTEIN_C_TERM),
        }
    }
}

/// A modification searched for
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModificationDefinition {
    pub name: String,
    /// Monoisotopic mass shift in Dalton
    pub mass: f64,
    /// The residues targeted, empty for any residue
    pub residues: Vec<char>,
    pub position: ModificationPosition,
    pub fixed: bool,
    /// Unimod accession number and name
    pub unimod: Option<(u32, String)>,
}

impl ModificationDefinition {
    pub fn new<S: Into<String>>(name: S, mass: f64) -> Self {
        Self {
            name: name.into(),
            mass,
            ..Default::default()
        }
    }

    pub fn on_residues(mut self, residues: &str) -> Self {
        self.residues = residues.chars().collect();
        self
    }

    pub fn at(mut self, position: ModificationPosition) -> Self {
        self.position = position;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn with_unimod<S: Into<String>>(mut self, accession: u32, name: S) -> Self {
        self.unimod = Some((accession, name.into()));
        self
    }

    /// The `residues` attribute value, `.` standing for any residue
    pub fn residues_str(&self) -> String {
        if self.residues.is_empty() {
            ".".to_string()
        } else {
            self.residues
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        }
    }

    /// The vocabulary term naming this modification
    pub fn cv_term(&self) -> Param {
        match &self.unimod {
            Some((acc, name)) => crate::params::ControlledVocabulary::UNIMOD.param(*acc, name.as_str()),
            None => terms::UNKNOWN_MODIFICATION.with_value(&self.name),
        }
    }

    /// The location written for an occurrence at the 1-based residue `site` of a
    /// peptide of `peptide_length` residues: 0 for N-terminal modifications,
    /// `peptide_length + 1` for C-terminal ones, the site otherwise.
    pub fn location(&self, site: usize, peptide_length: usize) -> usize {
        if self.position.is_n_term() {
            0
        } else if self.position.is_c_term() {
            peptide_length + 1
        } else {
            site
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CleavageSpecificity {
    #[default]
    Specific,
    SemiSpecific,
    NTermSpecific,
    CTermSpecific,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Enzyme {
    pub name: String,
    pub specificity: CleavageSpecificity,
    pub missed_cleavages: usize,
}

impl Enzyme {
    pub fn new<S: Into<String>>(name: S, missed_cleavages: usize) -> Self {
        Self {
            name: name.into(),
            specificity: CleavageSpecificity::Specific,
            missed_cleavages,
        }
    }

    pub fn trypsin() -> Self {
        Self::new("Trypsin", 2)
    }

    pub fn with_specificity(mut self, specificity: CleavageSpecificity) -> Self {
        self.specificity = specificity;
        self
    }

    /// The PSI-MS term naming this enzyme, if one exists
    pub fn cv_term(&self) -> Option<ParamCow<'static>> {
        use crate::params::ControlledVocabulary::MS;
        let term = match self.name.to_ascii_lowercase().as_str() {
            "trypsin" => MS.const_param_ident("Trypsin", 1001251),
            "trypsin/p" | "trypsin (no p rule)" => MS.const_param_ident("Trypsin/P", 1001313),
            "arg-c" => MS.const_param_ident("Arg-C", 1001303),
            "asp-n" => MS.const_param_ident("Asp-N", 1001304),
            "asp-n_ambic" => MS.const_param_ident("Asp-N_ambic", 1001305),
            "chymotrypsin" => MS.const_param_ident("Chymotrypsin", 1001306),
            "cnbr" => MS.const_param_ident("CNBr", 1001307),
            "formic acid" | "formic_acid" => MS.const_param_ident("Formic_acid", 1001308),
            "lys-c" => MS.const_param_ident("Lys-C", 1001309),
            "lys-c/p" => MS.const_param_ident("Lys-C/P", 1001310),
            "pepsina" | "pepsin a" => MS.const_param_ident("PepsinA", 1001311),
            "tryp-chymo" => MS.const_param_ident("TrypChymo", 1001312),
            "v8-de" => MS.const_param_ident("V8-DE", 1001314),
            "v8-e" | "glu-c" => MS.const_param_ident("V8-E", 1001315),
            "leukocyte elastase" => MS.const_param_ident("leukocyte elastase", 1001915),
            "proline endopeptidase" => MS.const_param_ident("proline endopeptidase", 1001916),
            "glutamyl endopeptidase" => {
                MS.const_param_ident("glutamyl endopeptidase", 1001917)
            }
            "lys-n" => MS.const_param_ident("Lys-N", 1003093),
            _ => return None,
        };
        Some(term)
    }
}

/// How proteins were digested in silico. Exactly one mode applies to a search.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Digestion {
    /// Cleavage at any residue
    Unspecific,
    /// Proteins were searched undigested
    WholeProtein,
    /// One or more named enzymes. `independent` indicates the enzymes cleaved separately
    Enzymes {
        enzymes: Vec<Enzyme>,
        independent: bool,
    },
}

impl Default for Digestion {
    fn default() -> Self {
        Self::Enzymes {
            enzymes: vec![Enzyme::trypsin()],
            independent: false,
        }
    }
}

/// The protein sequence database searched
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchDatabase {
    pub name: String,
    pub location: String,
    pub version: Option<String>,
    /// The accession tag marking decoy sequences, when the database is target-decoy
    pub decoy_tag: Option<String>,
}

/// The parameters the identification search was run with
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchParameters {
    pub digestion: Digestion,
    pub precursor_tolerance: Tolerance,
    pub fragment_tolerance: Tolerance,
    pub min_charge: i32,
    pub max_charge: i32,
    pub modifications: Vec<ModificationDefinition>,
    pub search_engines: Vec<SearchEngine>,
    pub database: SearchDatabase,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            digestion: Digestion::default(),
            precursor_tolerance: Tolerance::ppm(10.0),
            fragment_tolerance: Tolerance::da(0.02),
            min_charge: 2,
            max_charge: 4,
            modifications: Vec::new(),
            search_engines: Vec::new(),
            database: SearchDatabase::default(),
        }
    }
}

impl SearchParameters {
    pub fn modification(&self, name: &str) -> Option<&ModificationDefinition> {
        self.modifications.iter().find(|m| m.name == name)
    }
}

/// False discovery rate thresholds in percent
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationThresholds {
    pub psm_fdr: f64,
    pub peptide_fdr: f64,
    pub protein_fdr: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            psm_fdr: 1.0,
            peptide_fdr: 1.0,
            protein_fdr: 1.0,
        }
    }
}

/// Probabilistic modification localization methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProbabilisticPtmScore {
    PhosphoRs,
    AScore,
}

impl ProbabilisticPtmScore {
    /// Only PhosphoRS site probabilities are written out
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::PhosphoRs)
    }
}

impl Display for ProbabilisticPtmScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PhosphoRs => f.write_str("PhosphoRS"),
            Self::AScore => f.write_str("A-score"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PtmScoringSettings {
    /// A site's delta score must reach this value for the site to be considered confidently localized
    pub delta_threshold: f64,
    pub probabilistic: Option<ProbabilisticPtmScore>,
    pub probabilistic_threshold: f64,
}

impl Default for PtmScoringSettings {
    fn default() -> Self {
        Self {
            delta_threshold: 95.0,
            probabilistic: None,
            probabilistic_threshold: 95.0,
        }
    }
}

impl PtmScoringSettings {
    /// The probabilistic method to report, if one is configured and supported
    pub fn reported_probabilistic(&self) -> Option<ProbabilisticPtmScore> {
        self.probabilistic.filter(|p| p.is_supported())
    }
}

/// The software the document is attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftwareInfo {
    pub name: String,
    pub version: String,
    pub uri: Option<String>,
    /// The organization developing the software
    pub vendor: Option<String>,
}

impl Default for SoftwareInfo {
    fn default() -> Self {
        Self {
            name: "PeptideShaker".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uri: Some("https://compomics.github.io/projects/peptide-shaker.html".to_string()),
            vendor: None,
        }
    }
}

impl SoftwareInfo {
    pub fn name_param(&self) -> Param {
        if self.name == terms::PEPTIDESHAKER.name {
            terms::PEPTIDESHAKER.into()
        } else {
            Param::new_key_value(self.name.as_str(), "")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Organization {
    pub name: String,
    pub email: String,
    pub address: String,
}

/// The person providing the document and their organization
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub organization: Organization,
}

impl ContactInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputCompression {
    /// Compress when the output path ends with `.gz`
    #[default]
    Auto,
    Gzip,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrideSample {
    pub name: String,
    pub params: ParamList,
}

impl_param_described!(PrideSample);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstrumentDescription {
    pub name: String,
    pub source: Option<Param>,
    pub analyzers: ParamList,
    pub detector: Option<Param>,
}

/// Experiment annotation only PRIDE XML carries
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrideMetadata {
    pub title: String,
    pub short_label: String,
    pub protocol_name: String,
    pub protocol_steps: ParamList,
    pub references: Vec<String>,
    pub sample: PrideSample,
    pub instrument: InstrumentDescription,
    pub params: ParamList,
}

impl_param_described!(PrideMetadata);

/// The complete export configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExportSettings {
    /// Write protein sequences into the document. Large databases inflate
    /// the file considerably.
    pub include_protein_sequences: bool,
    /// Annotate fragment ions for every written spectrum match
    pub include_fragment_ions: bool,
    pub compression: OutputCompression,
    pub search: SearchParameters,
    pub thresholds: ValidationThresholds,
    pub ptm_scoring: PtmScoringSettings,
    pub software: SoftwareInfo,
    pub contact: Option<ContactInfo>,
    /// A fixed document creation date, otherwise the current time is used
    pub creation_date: Option<DateTime<FixedOffset>>,
    pub pride: PrideMetadata,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            include_protein_sequences: false,
            include_fragment_ions: true,
            compression: OutputCompression::Auto,
            search: SearchParameters::default(),
            thresholds: ValidationThresholds::default(),
            ptm_scoring: PtmScoringSettings::default(),
            software: SoftwareInfo::default(),
            contact: None,
            creation_date: None,
            pride: PrideMetadata::default(),
        }
    }
}

impl ExportSettings {
    pub fn with_protein_sequences(mut self, include: bool) -> Self {
        self.include_protein_sequences = include;
        self
    }

    pub fn with_fragment_ions(mut self, include: bool) -> Self {
        self.include_fragment_ions = include;
        self
    }

    pub fn with_compression(mut self, compression: OutputCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_search(mut self, search: SearchParameters) -> Self {
        self.search = search;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ValidationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_ptm_scoring(mut self, ptm_scoring: PtmScoringSettings) -> Self {
        self.ptm_scoring = ptm_scoring;
        self
    }

    pub fn with_software(mut self, software: SoftwareInfo) -> Self {
        self.software = software;
        self
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn with_creation_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.creation_date = Some(date);
        self
    }

    pub fn with_pride_metadata(mut self, pride: PrideMetadata) -> Self {
        self.pride = pride;
        self
    }

    /// The document creation timestamp in `xs:dateTime` form
    pub fn creation_timestamp(&self) -> String {
        match &self.creation_date {
            Some(date) => date.format("%Y-%m-%dT%H:%M:%S").to_string(),
            None => chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Read settings from a JSON document, with missing fields taking their defaults
    #[cfg(feature = "serde")]
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}
