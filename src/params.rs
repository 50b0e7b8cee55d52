//! The controlled vocabulary term model shared by every output dialect.
//!
//! A term is a `(vocabulary, accession, name)` triple with an optional value and unit.
//! Terms that have no vocabulary mapping are "user parameters", carrying only a name
//! and a value.
use std::borrow::Cow;
use std::fmt::Display;

/// A parameter-like value, which may or may not belong to a controlled vocabulary
pub trait ParamLike {
    fn name(&self) -> &str;
    fn value(&self) -> &str;
    fn accession(&self) -> Option<u32>;
    fn controlled_vocabulary(&self) -> Option<ControlledVocabulary>;
    fn unit(&self) -> Unit;

    fn is_controlled(&self) -> bool {
        self.accession().is_some() && self.controlled_vocabulary().is_some()
    }

    /// Render the accession as a compact URI, e.g. `MS:1001088` or `UNIMOD:35`
    fn curie(&self) -> Option<String> {
        let cv = self.controlled_vocabulary()?;
        self.accession().map(|acc| cv.format_accession(acc))
    }
}

macro_rules! param_like_fields {
    ($t:ty) => {
        impl ParamLike for $t {
            fn name(&self) -> &str {
                &self.name
            }

            fn value(&self) -> &str {
                &self.value
            }

            fn accession(&self) -> Option<u32> {
                self.accession
            }

            fn controlled_vocabulary(&self) -> Option<ControlledVocabulary> {
                self.controlled_vocabulary
            }

            fn unit(&self) -> Unit {
                self.unit
            }
        }
    };
}

/// A term whose strings may be borrowed, so that it can be declared `const`.
///
/// The named terms in [`crate::terms`] are all `ParamCow<'static>` values with an
/// empty value. [`ParamCow::with_value`] turns one into an owned [`Param`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamCow<'a> {
    pub name: Cow<'a, str>,
    pub value: Cow<'a, str>,
    pub accession: Option<u32>,
    pub controlled_vocabulary: Option<ControlledVocabulary>,
    pub unit: Unit,
}

impl<'a> ParamCow<'a> {
    const fn term(name: &'a str, accession: u32, cv: ControlledVocabulary, unit: Unit) -> Self {
        Self {
            name: Cow::Borrowed(name),
            value: Cow::Borrowed(""),
            accession: Some(accession),
            controlled_vocabulary: Some(cv),
            unit,
        }
    }

    /// An owned copy of this term carrying `value`
    pub fn with_value<V: ToString>(&self, value: V) -> Param {
        Param {
            value: value.to_string(),
            ..Param::from(self.clone())
        }
    }

    pub fn with_unit_t(&self, unit: Unit) -> ParamCow<'a> {
        ParamCow {
            unit,
            ..self.clone()
        }
    }
}

param_like_fields!(ParamCow<'_>);

impl From<ParamCow<'_>> for Param {
    fn from(term: ParamCow<'_>) -> Self {
        Param {
            name: term.name.into_owned(),
            value: term.value.into_owned(),
            accession: term.accession,
            controlled_vocabulary: term.controlled_vocabulary,
            unit: term.unit,
        }
    }
}

/// An owned parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    pub name: String,
    pub value: String,
    pub accession: Option<u32>,
    pub controlled_vocabulary: Option<ControlledVocabulary>,
    pub unit: Unit,
}

impl Param {
    /// Create a user parameter, a named value without a vocabulary mapping
    pub fn new_key_value<K: Into<String>, V: ToString>(name: K, value: V) -> Param {
        Param {
            name: name.into(),
            value: value.to_string(),
            ..Default::default()
        }
    }

    pub fn with_unit_t(self, unit: Unit) -> Param {
        Param { unit, ..self }
    }
}

param_like_fields!(Param);

impl Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.curie() {
            Some(curie) if self.value.is_empty() => write!(f, "[{curie}, {}]", self.name),
            Some(curie) => write!(f, "[{curie}, {}, {}]", self.name, self.value),
            None => write!(f, "[{}, {}]", self.name, self.value),
        }
    }
}

/// The vocabularies terms are drawn from.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlledVocabulary {
    /// The PSI-MS vocabulary
    MS,
    /// The Unimod modification database
    UNIMOD,
    /// The unit ontology
    UO,
    /// The PRIDE vocabulary
    PRIDE,
    /// The legacy PSI vocabulary used by mzData sections of PRIDE XML
    PSI,
}

impl ControlledVocabulary {
    /// The prefix used in accession numbers drawn from this vocabulary. This is
    /// also the `cvLabel` it is declared under in a PRIDE XML `cvLookup`.
    pub const fn pride_label(&self) -> &'static str {
        match self {
            Self::MS => "MS",
            Self::UNIMOD => "UNIMOD",
            Self::UO => "UO",
            Self::PRIDE => "PRIDE",
            Self::PSI => "PSI",
        }
    }

    /// The `cvRef` identifier this vocabulary is declared under in an mzIdentML `cvList`
    pub const fn mzidentml_ref(&self) -> &'static str {
        match self {
            Self::MS | Self::PSI => "PSI-MS",
            _ => self.pride_label(),
        }
    }

    /// Unimod accessions are not zero-padded, every other vocabulary uses seven digits.
    pub fn format_accession(&self, accession: u32) -> String {
        match self {
            Self::UNIMOD => format!("{}:{}", self.pride_label(), accession),
            _ => format!("{}:{:07}", self.pride_label(), accession),
        }
    }

    pub const fn const_param_ident(&self, name: &'static str, accession: u32) -> ParamCow<'static> {
        ParamCow::term(name, accession, *self, Unit::Unknown)
    }

    pub const fn const_param_ident_unit(
        &self,
        name: &'static str,
        accession: u32,
        unit: Unit,
    ) -> ParamCow<'static> {
        ParamCow::term(name, accession, *self, unit)
    }

    /// A valueless term built at runtime, e.g. from a Unimod lookup
    pub fn param<S: Into<String>>(&self, accession: u32, name: S) -> Param {
        Param {
            name: name.into(),
            accession: Some(accession),
            controlled_vocabulary: Some(*self),
            ..Default::default()
        }
    }
}

pub type ParamList = Vec<Param>;

/// Types which carry a free-form list of extra parameters
pub trait ParamDescribed {
    fn params(&self) -> &ParamList;
    fn params_mut(&mut self) -> &mut ParamList;

    fn add_param(&mut self, param: Param) {
        self.params_mut().push(param);
    }
}

#[macro_export]
macro_rules! impl_param_described {
    ($($t:ty), +) => {$(
        impl $crate::params::ParamDescribed for $t {
            fn params(&self) -> &$crate::params::ParamList {
                &self.params
            }

            fn params_mut(&mut self) -> &mut $crate::params::ParamList {
                &mut self.params
            }
        }
    )+};
}

/// Units a term's value might be given in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    MZ,
    Dalton,
    PartsPerMillion,
    Second,
    DetectorCounts,
    Percent,
    #[default]
    Unknown,
}

impl Unit {
    /// The `(accession, name)` pair written as `unitAccession` and `unitName`
    pub fn for_param(&self) -> (&'static str, &'static str) {
        match self {
            Self::MZ => ("MS:1000040", "m/z"),
            Self::Dalton => ("UO:0000221", "dalton"),
            Self::PartsPerMillion => ("UO:0000169", "parts per million"),
            Self::Second => ("UO:0000010", "second"),
            Self::DetectorCounts => ("MS:1000131", "number of detector counts"),
            Self::Percent => ("UO:0000187", "percent"),
            Self::Unknown => ("", ""),
        }
    }

    /// The vocabulary a unit's accession is drawn from
    pub fn vocabulary(&self) -> Option<ControlledVocabulary> {
        match self {
            Self::MZ | Self::DetectorCounts => Some(ControlledVocabulary::MS),
            Self::Unknown => None,
            _ => Some(ControlledVocabulary::UO),
        }
    }
}
