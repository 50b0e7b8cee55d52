//! Fragment ions matched against spectrum peaks.
use std::fmt::Display;

use crate::params::{Param, ParamCow};
use crate::settings::Tolerance;
use crate::terms;

/// The peptide backbone fragment series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FragmentSeries {
    A,
    B,
    C,
    X,
    Y,
    Z,
    ZPlusOne,
    ZPlusTwo,
}

impl FragmentSeries {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::ZPlusOne => "z+1",
            Self::ZPlusTwo => "z+2",
        }
    }

    pub const fn cv_term(&self) -> ParamCow<'static> {
        match self {
            Self::A => terms::FRAG_A_ION,
            Self::B => terms::FRAG_B_ION,
            Self::C => terms::FRAG_C_ION,
            Self::X => terms::FRAG_X_ION,
            Self::Y => terms::FRAG_Y_ION,
            Self::Z => terms::FRAG_Z_ION,
            Self::ZPlusOne => terms::FRAG_Z_PLUS_1_ION,
            Self::ZPlusTwo => terms::FRAG_Z_PLUS_2_ION,
        }
    }
}

/// The kinds of ion a spectrum annotator may report
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ion {
    /// A backbone fragment with its 1-based fragment number
    PeptideFragment { series: FragmentSeries, number: usize },
    Immonium { residue: char },
    Precursor,
    Reporter { label: String },
    Related { label: String },
    /// Glycan fragments have no PSI-MS ion type and are never written
    Glycan { label: String },
}

impl Ion {
    pub fn fragment(series: FragmentSeries, number: usize) -> Self {
        Self::PeptideFragment { series, number }
    }

    /// The ion type name, without fragment number or losses
    pub fn name(&self) -> String {
        match self {
            Self::PeptideFragment { series, .. } => series.label().to_string(),
            Self::Immonium { residue } => format!("immonium {residue}"),
            Self::Precursor => "precursor".to_string(),
            Self::Reporter { label } => format!("reporter {label}"),
            Self::Related { label } => format!("related {label}"),
            Self::Glycan { label } => format!("glycan {label}"),
        }
    }

    /// The position this ion reports in an `IonType` index list for a peptide
    /// with the given `sequence`.
    ///
    /// Backbone fragments report their fragment number, immonium ions the first
    /// 1-based position of their residue, precursors the peptide length, and
    /// reporter or related ions 0.
    pub fn index(&self, sequence: &str) -> usize {
        match self {
            Self::PeptideFragment { number, .. } => *number,
            Self::Immonium { residue } => sequence
                .chars()
                .position(|c| c == *residue)
                .map(|i| i + 1)
                .unwrap_or_default(),
            Self::Precursor => sequence.len(),
            Self::Reporter { .. } | Self::Related { .. } | Self::Glycan { .. } => 0,
        }
    }

    /// The PSI-MS ion type term, `None` when no mapping exists
    pub fn cv_term(&self) -> Option<ParamCow<'static>> {
        match self {
            Self::PeptideFragment { series, .. } => Some(series.cv_term()),
            Self::Immonium { .. } => Some(terms::FRAG_IMMONIUM_ION),
            Self::Precursor => Some(terms::FRAG_PRECURSOR_ION),
            Self::Reporter { .. } => Some(terms::FRAG_REPORTER_ION),
            Self::Related { .. } => Some(terms::FRAG_RELATED_ION),
            Self::Glycan { .. } => None,
        }
    }

    /// The PRIDE vocabulary term for this ion with the given losses, `None`
    /// when the legacy vocabulary has no such ion type
    pub fn pride_term(&self, losses: &[NeutralLoss]) -> Option<ParamCow<'static>> {
        let loss = match losses {
            [] => None,
            [single] => Some(single.name.as_str()),
            _ => return None,
        };
        match (self, loss) {
            (Self::PeptideFragment { series, .. }, None) => match series {
                FragmentSeries::A => Some(terms::PRIDE_A_ION),
                FragmentSeries::B => Some(terms::PRIDE_B_ION),
                FragmentSeries::C => Some(terms::PRIDE_C_ION),
                FragmentSeries::X => Some(terms::PRIDE_X_ION),
                FragmentSeries::Y => Some(terms::PRIDE_Y_ION),
                FragmentSeries::Z => Some(terms::PRIDE_Z_ION),
                _ => None,
            },
            (Self::PeptideFragment { series, .. }, Some(loss)) => match (series, loss) {
                (FragmentSeries::B, NeutralLoss::H2O) => Some(terms::PRIDE_B_ION_H2O),
                (FragmentSeries::B, NeutralLoss::NH3) => Some(terms::PRIDE_B_ION_NH3),
                (FragmentSeries::Y, NeutralLoss::H2O) => Some(terms::PRIDE_Y_ION_H2O),
                (FragmentSeries::Y, NeutralLoss::NH3) => Some(terms::PRIDE_Y_ION_NH3),
                _ => None,
            },
            (Self::Immonium { .. }, None) => Some(terms::PRIDE_IMMONIUM_ION),
            (Self::Precursor, None) => Some(terms::PRIDE_PRECURSOR_ION),
            _ => None,
        }
    }
}

impl Display for Ion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PeptideFragment { series, number } => write!(f, "{}{}", series.label(), number),
            _ => f.write_str(&self.name()),
        }
    }
}

/// A neutral loss from a fragment ion
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeutralLoss {
    pub name: String,
    /// Monoisotopic mass lost in Dalton
    pub mass: f64,
}

impl Eq for NeutralLoss {}

impl std::hash::Hash for NeutralLoss {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.mass.to_bits().hash(state);
    }
}

impl NeutralLoss {
    pub const H2O: &'static str = "H2O";
    pub const NH3: &'static str = "NH3";
    pub const H3PO4: &'static str = "H3PO4";

    pub fn new<S: Into<String>>(name: S, mass: f64) -> Self {
        Self {
            name: name.into(),
            mass,
        }
    }

    pub fn water() -> Self {
        Self::new(Self::H2O, 18.010565)
    }

    pub fn ammonia() -> Self {
        Self::new(Self::NH3, 17.026549)
    }

    pub fn phosphoric_acid() -> Self {
        Self::new(Self::H3PO4, 97.976896)
    }

    /// Water and ammonia have dedicated terms, any other loss is described by its mass
    pub fn cv_term(&self) -> Param {
        match self.name.as_str() {
            Self::H2O => terms::FRAG_WATER_LOSS.into(),
            Self::NH3 => terms::FRAG_AMMONIA_LOSS.into(),
            _ => terms::FRAG_NEUTRAL_LOSS.with_value(self.mass),
        }
    }
}

/// A theoretical ion matched to an observed peak
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IonMatch {
    pub ion: Ion,
    pub charge: i32,
    pub neutral_losses: Vec<NeutralLoss>,
    pub theoretical_mz: f64,
    pub peak_mz: f64,
    pub peak_intensity: f64,
}

impl IonMatch {
    pub fn new(ion: Ion, charge: i32, theoretical_mz: f64, peak_mz: f64, peak_intensity: f64) -> Self {
        Self {
            ion,
            charge,
            neutral_losses: Vec::new(),
            theoretical_mz,
            peak_mz,
            peak_intensity,
        }
    }

    pub fn with_loss(mut self, loss: NeutralLoss) -> Self {
        self.neutral_losses.push(loss);
        self
    }

    /// The observed minus the theoretical m/z
    pub fn mz_error(&self) -> f64 {
        self.peak_mz - self.theoretical_mz
    }

    /// The ion type name with its losses, the unit matches are grouped by
    /// together with the charge
    pub fn group_label(&self) -> String {
        let mut label = self.ion.name();
        for loss in self.neutral_losses.iter() {
            label.push('-');
            label.push_str(&loss.name);
        }
        label
    }
}

/// The parameters a spectrum annotator is asked to honor
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSettings {
    pub fragment_tolerance: Tolerance,
    /// The most neutral losses a single reported ion may carry
    pub max_neutral_losses: usize,
    /// Fragment charges up to this value are considered
    pub max_fragment_charge: i32,
}

impl AnnotationSettings {
    pub fn new(fragment_tolerance: Tolerance, max_neutral_losses: usize, precursor_charge: i32) -> Self {
        Self {
            fragment_tolerance,
            max_neutral_losses,
            max_fragment_charge: (precursor_charge - 1).max(1),
        }
    }
}
