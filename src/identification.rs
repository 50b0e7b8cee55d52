//! The identification result model the exporters consume.
//!
//! These types are read-only views of what an identification store holds:
//! proteins and their groups, peptides and where they occur, spectrum matches
//! with the hits of each search engine, fragment ion annotations and the
//! scores assigned by validation.
mod fragment;
mod memory;
mod peptide;
mod protein;
mod source;
mod spectrum_match;
mod validation;

pub use fragment::{AnnotationSettings, FragmentSeries, Ion, IonMatch, NeutralLoss};
pub use memory::{MemoryAnnotator, MemoryIdentifications};
pub use peptide::{ModificationOccurrence, PeptideMatch, Peptidoform};
pub use protein::{ProteinGroup, ProteinRecord};
pub use source::{
    EntityIter, IdentificationContext, IdentificationSource, Peak, PrecursorInfo,
    SequenceProvider, SourceError, SourceResult, SpectrumAnnotator, SpectrumFile, SpectrumInfo,
    SpectrumProvider,
};
pub use spectrum_match::{EngineHit, EngineScore, PeptideAssumption, SearchEngine, SpectrumMatch};
pub use validation::{MatchValidationLevel, PtmScores, SiteScore, ValidationParams};
