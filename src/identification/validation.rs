use std::collections::BTreeMap;
use std::fmt::Display;

use indexmap::IndexMap;

/// How confidently a protein, peptide or spectrum match was validated.
///
/// The levels are ordered from least to most confident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchValidationLevel {
    #[default]
    None,
    NotValidated,
    Doubtful,
    Confident,
}

impl MatchValidationLevel {
    pub fn is_validated(&self) -> bool {
        matches!(self, Self::Doubtful | Self::Confident)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::NotValidated => "Not Validated",
            Self::Doubtful => "Doubtful",
            Self::Confident => "Confident",
        }
    }
}

impl Display for MatchValidationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The score, confidence and validation level assigned to a match by the validation step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationParams {
    pub score: f64,
    /// Confidence in percent
    pub confidence: f64,
    pub level: MatchValidationLevel,
}

impl ValidationParams {
    pub fn new(score: f64, confidence: f64, level: MatchValidationLevel) -> Self {
        Self {
            score,
            confidence,
            level,
        }
    }

    pub fn is_validated(&self) -> bool {
        self.level.is_validated()
    }
}

/// Localization scores for one residue site
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SiteScore {
    pub delta: f64,
    /// Only present when a probabilistic localization method was run
    pub probabilistic: Option<f64>,
}

/// Per-site localization scores of every modification of a spectrum match,
/// keyed by modification name and then by 1-based residue site.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PtmScores {
    pub modifications: IndexMap<String, BTreeMap<usize, SiteScore>>,
}

impl PtmScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site<S: Into<String>>(
        mut self,
        modification: S,
        site: usize,
        delta: f64,
        probabilistic: Option<f64>,
    ) -> Self {
        self.modifications
            .entry(modification.into())
            .or_default()
            .insert(site, SiteScore { delta, probabilistic });
        self
    }

    pub fn sites(&self, modification: &str) -> Option<&BTreeMap<usize, SiteScore>> {
        self.modifications.get(modification)
    }
}
