//! `mzidexport` writes peptide and protein identification results as
//! mzIdentML 1.1/1.2 or PRIDE XML 2.1 documents.
//!
//! Results are read through the traits in [`identification`] and streamed
//! section by section, so documents of any size can be written without holding
//! the results in memory.
//!
//! ```no_run
//! use mzidexport::identification::{MemoryAnnotator, MemoryIdentifications};
//! use mzidexport::io::mzidentml;
//! use mzidexport::{ExportSettings, IdentificationContext, MzIdentMLVersion};
//!
//! let store = MemoryIdentifications::new();
//! let annotator = MemoryAnnotator::new();
//! let settings = ExportSettings::default();
//! let context = IdentificationContext::new(&store, &store, &store, &annotator);
//! let outcome = mzidentml::create_file(
//!     "results.mzid.gz",
//!     context,
//!     &settings,
//!     MzIdentMLVersion::V1_2,
//!     None,
//! )?;
//! assert!(outcome.is_complete());
//! # Ok::<(), mzidexport::ExportError>(())
//! ```
pub mod identification;
pub mod io;
pub mod params;
pub mod progress;
pub mod settings;
pub mod terms;

pub use crate::identification::{
    IdentificationContext, IdentificationSource, SequenceProvider, SpectrumAnnotator,
    SpectrumProvider,
};
pub use crate::io::{ExportError, ExportOutcome, ExportSummary};
pub use crate::io::{MzIdentMLVersion, MzIdentMLWriter, PrideXMLWriter};
pub use crate::progress::{CancellationToken, NoProgress, ProgressHandle};
pub use crate::settings::ExportSettings;
