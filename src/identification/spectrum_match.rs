use std::fmt::Display;

use indexmap::IndexMap;

use crate::params::ParamCow;
use crate::terms;

use super::peptide::Peptidoform;

/// The search engines whose scores can be reported
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchEngine {
    Mascot,
    Omssa,
    XTandem,
    MsGfPlus,
    MsAmanda,
    Comet,
    Tide,
    Andromeda,
    MyriMatch,
    MetaMorpheus,
    Other(String),
}

impl SearchEngine {
    pub fn name(&self) -> &str {
        match self {
            Self::Mascot => "Mascot",
            Self::Omssa => "OMSSA",
            Self::XTandem => "X!Tandem",
            Self::MsGfPlus => "MS-GF+",
            Self::MsAmanda => "MS Amanda",
            Self::Comet => "Comet",
            Self::Tide => "Tide",
            Self::Andromeda => "Andromeda",
            Self::MyriMatch => "MyriMatch",
            Self::MetaMorpheus => "MetaMorpheus",
            Self::Other(name) => name,
        }
    }

    pub fn software_term(&self) -> Option<ParamCow<'static>> {
        match self {
            Self::Mascot => Some(terms::MASCOT),
            Self::Omssa => Some(terms::OMSSA),
            Self::XTandem => Some(terms::XTANDEM),
            Self::MsGfPlus => Some(terms::MSGF_PLUS),
            Self::MsAmanda => Some(terms::MS_AMANDA),
            Self::Comet => Some(terms::COMET),
            Self::Tide => Some(terms::TIDE),
            Self::Andromeda => Some(terms::ANDROMEDA),
            Self::MyriMatch => Some(terms::MYRIMATCH),
            Self::MetaMorpheus => Some(terms::METAMORPHEUS),
            Self::Other(_) => None,
        }
    }

    /// The term an engine's e-value is reported under, `None` for engines
    /// whose e-value has no dedicated term
    pub fn e_value_term(&self) -> Option<ParamCow<'static>> {
        match self {
            Self::Mascot => Some(terms::MASCOT_EXPECTATION),
            Self::Omssa => Some(terms::OMSSA_EVALUE),
            Self::XTandem => Some(terms::XTANDEM_EXPECT),
            Self::MsGfPlus => Some(terms::MSGF_EVALUE),
            Self::Comet => Some(terms::COMET_EXPECTATION),
            Self::Andromeda => Some(terms::ANDROMEDA_PEP),
            _ => None,
        }
    }

    /// Engines with a native higher-is-better score reported next to the e-value
    pub fn raw_score_term(&self) -> Option<ParamCow<'static>> {
        match self {
            Self::Mascot => Some(terms::MASCOT_SCORE),
            Self::MsAmanda => Some(terms::AMANDA_SCORE),
            _ => None,
        }
    }

    /// The identifier of this engine's `AnalysisSoftware` element
    pub fn software_id(&self) -> String {
        let name: String = self
            .name()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        format!("ID_software_{name}")
    }
}

impl Display for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A peptide assigned to a spectrum at a given charge
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeptideAssumption {
    pub peptide: Peptidoform,
    pub charge: i32,
    pub theoretical_mz: f64,
}

impl PeptideAssumption {
    pub fn new(peptide: Peptidoform, charge: i32, theoretical_mz: f64) -> Self {
        Self {
            peptide,
            charge,
            theoretical_mz,
        }
    }
}

/// One candidate reported by a search engine, with its e-value (lower is better)
/// and optionally the engine's native score (higher is better)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineHit {
    pub peptide: Peptidoform,
    pub charge: i32,
    pub e_value: f64,
    pub raw_score: Option<f64>,
}

impl EngineHit {
    pub fn new(peptide: Peptidoform, charge: i32, e_value: f64) -> Self {
        Self {
            peptide,
            charge,
            e_value,
            raw_score: None,
        }
    }

    pub fn with_raw_score(mut self, score: f64) -> Self {
        self.raw_score = Some(score);
        self
    }
}

/// The best scores a single engine gave the winning peptide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineScore {
    pub e_value: f64,
    pub raw_score: Option<f64>,
}

/// The identification state of one spectrum
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectrumMatch {
    pub key: String,
    /// The name of the spectrum file
    pub file: String,
    /// The spectrum title within the file
    pub title: String,
    pub best_assumption: Option<PeptideAssumption>,
    pub engine_hits: IndexMap<SearchEngine, Vec<EngineHit>>,
}

impl SpectrumMatch {
    pub fn new<F: Into<String>, T: Into<String>>(file: F, title: T) -> Self {
        let file = file.into();
        let title = title.into();
        Self {
            key: Self::spectrum_key(&file, &title),
            file,
            title,
            best_assumption: None,
            engine_hits: IndexMap::new(),
        }
    }

    /// The key a spectrum is stored under
    pub fn spectrum_key(file: &str, title: &str) -> String {
        format!("{file}_cus_{title}")
    }

    pub fn with_best_assumption(mut self, assumption: PeptideAssumption) -> Self {
        self.best_assumption = Some(assumption);
        self
    }

    pub fn with_hit(mut self, engine: SearchEngine, hit: EngineHit) -> Self {
        self.engine_hits.entry(engine).or_default().push(hit);
        self
    }

    /// For each engine, the lowest e-value and highest native score among its
    /// hits carrying the same peptide signature as the best assumption.
    ///
    /// Engines without such a hit are left out. Returns an empty map when there
    /// is no best assumption.
    pub fn best_engine_scores(&self) -> IndexMap<SearchEngine, EngineScore> {
        let mut scores = IndexMap::new();
        let best = match &self.best_assumption {
            Some(best) => best,
            None => return scores,
        };
        for (engine, hits) in self.engine_hits.iter() {
            let mut entry: Option<EngineScore> = None;
            for hit in hits.iter().filter(|h| h.peptide.same_signature(&best.peptide)) {
                match entry.as_mut() {
                    Some(score) => {
                        if hit.e_value < score.e_value {
                            score.e_value = hit.e_value;
                        }
                        score.raw_score = match (score.raw_score, hit.raw_score) {
                            (Some(a), Some(b)) => Some(a.max(b)),
                            (a, b) => a.or(b),
                        };
                    }
                    None => {
                        entry = Some(EngineScore {
                            e_value: hit.e_value,
                            raw_score: hit.raw_score,
                        })
                    }
                }
            }
            if let Some(score) = entry {
                scores.insert(engine.clone(), score);
            }
        }
        scores
    }
}
