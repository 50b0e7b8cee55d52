use std::io::{self, Write};

use log::info;

use crate::identification::IdentificationContext;
use crate::io::xml::{attrib, bstart};
use crate::io::{Dialect, ExportError, ExportOutcome, ExportResult, ExportSession, XmlSink};
use crate::progress::ProgressHandle;
use crate::settings::ExportSettings;
use crate::terms;

use super::protein_detection::write_protein_detection_list;
use super::protocol::{write_analysis_collection, write_analysis_protocol_collection};
use super::sequence_collection::write_sequence_collection;
use super::spectrum_identification::write_spectrum_identification_list;
use super::{MzIdentMLVersion, VersionProfile, SEARCH_DATABASE_ID, SOFTWARE_ID};

const PROVIDER_ID: &str = "PROVIDER";
const DOCUMENT_OWNER_ID: &str = "ORG_DOC_OWNER";
const VENDOR_ID: &str = "PS_DEV";

/// The sections of an mzIdentML document, in the order they are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MzIdentMLWriterState {
    Start,
    Header,
    SequenceCollection,
    AnalysisCollection,
    AnalysisProtocolCollection,
    DataCollection,
    End,
}

/**
Writes a complete mzIdentML document from an [`IdentificationContext`].

Results are streamed as they are read, nothing but the identifiers handed out
so far is kept in memory. A writer produces exactly one document.
*/
pub struct MzIdentMLWriter<'a, W: Write> {
    sink: XmlSink<W>,
    session: ExportSession<'a>,
    profile: VersionProfile,
    state: MzIdentMLWriterState,
}

impl<'a, W: Write> MzIdentMLWriter<'a, W> {
    pub fn new(
        inner: W,
        context: IdentificationContext<'a>,
        settings: &'a ExportSettings,
        version: MzIdentMLVersion,
    ) -> Self {
        Self {
            sink: XmlSink::new(inner, Dialect::MzIdentML),
            session: ExportSession::new(context, settings),
            profile: version.profile(),
            state: MzIdentMLWriterState::Start,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressHandle) -> Self {
        self.session.set_progress(progress);
        self
    }

    pub fn state(&self) -> MzIdentMLWriterState {
        self.state
    }

    pub fn profile(&self) -> &VersionProfile {
        &self.profile
    }

    /// The number of elements currently open
    pub fn depth(&self) -> usize {
        self.sink.depth()
    }

    fn transition_err(&self, to: MzIdentMLWriterState) -> ExportResult {
        Err(ExportError::InvalidState {
            from: format!("{:?}", self.state),
            to: format!("{:?}", to),
        })
    }

    /// Move to the next section, stopping first if the export was cancelled
    fn advance(&mut self, to: MzIdentMLWriterState) -> ExportResult {
        if to <= self.state {
            return self.transition_err(to);
        }
        self.session.checkpoint()?;
        self.state = to;
        Ok(())
    }

    /// Write the whole document.
    ///
    /// Cancellation is reported as [`ExportOutcome::Cancelled`], with the output
    /// truncated where the export stopped.
    pub fn write_document(&mut self) -> Result<ExportOutcome, ExportError> {
        if self.state != MzIdentMLWriterState::Start {
            self.transition_err(MzIdentMLWriterState::Header)?;
        }
        info!(
            "Writing mzIdentML {} document",
            self.profile.version_string
        );
        match self.write_sections() {
            Ok(()) => {
                self.sink.flush()?;
                if self.sink.depth() != 0 {
                    return Err(ExportError::UnbalancedDocument {
                        depth: self.sink.depth(),
                    });
                }
                let summary = self.session.summary;
                info!(
                    "Wrote {} proteins, {} peptides, {} peptide evidences, {} spectrum results and {} protein groups ({} spectrum matches and {} protein groups skipped)",
                    summary.proteins,
                    summary.peptides,
                    summary.peptide_evidences,
                    summary.spectrum_results,
                    summary.protein_groups,
                    summary.skipped_spectra,
                    summary.skipped_protein_groups,
                );
                Ok(ExportOutcome::Complete(summary))
            }
            Err(ExportError::Cancelled) => {
                self.sink.flush()?;
                info!(
                    "mzIdentML export cancelled with {} elements open",
                    self.sink.depth()
                );
                Ok(ExportOutcome::Cancelled {
                    depth: self.sink.depth(),
                })
            }
            Err(e) => Err(e),
        }
    }

    fn write_sections(&mut self) -> ExportResult {
        self.advance(MzIdentMLWriterState::Header)?;
        self.write_header()?;
        self.write_cv_list()?;
        self.write_software_list()?;
        self.write_provider()?;
        self.write_audit_collection()?;

        self.advance(MzIdentMLWriterState::SequenceCollection)?;
        write_sequence_collection(&mut self.sink, &mut self.session)?;

        self.advance(MzIdentMLWriterState::AnalysisCollection)?;
        write_analysis_collection(&mut self.sink, &mut self.session)?;

        self.advance(MzIdentMLWriterState::AnalysisProtocolCollection)?;
        write_analysis_protocol_collection(&mut self.sink, &mut self.session, &self.profile)?;

        self.advance(MzIdentMLWriterState::DataCollection)?;
        self.write_data_collection()?;

        self.sink.end("MzIdentML")?;
        self.state = MzIdentMLWriterState::End;
        Ok(())
    }

    fn write_header(&mut self) -> ExportResult {
        let settings = self.session.settings;
        self.sink.declaration("UTF-8")?;
        let mut elt = bstart!("MzIdentML");
        attrib!(
            "id",
            format!("{} v{}", settings.software.name, settings.software.version),
            elt
        );
        attrib!("version", self.profile.version_string, elt);
        attrib!("xmlns", self.profile.namespace, elt);
        attrib!("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance", elt);
        attrib!("xsi:schemaLocation", self.profile.schema_location, elt);
        attrib!("creationDate", settings.creation_timestamp(), elt);
        self.sink.start(elt)
    }

    fn write_cv_list(&mut self) -> ExportResult {
        let vocabularies = [
            (
                "PSI-MS",
                "PSI-MS",
                "https://raw.githubusercontent.com/HUPO-PSI/psi-ms-CV/master/psi-ms.obo",
            ),
            ("UNIMOD", "UNIMOD", "http://www.unimod.org/obo/unimod.obo"),
            (
                "UO",
                "UNIT-ONTOLOGY",
                "https://raw.githubusercontent.com/bio-ontology-research-group/unit-ontology/master/unit.obo",
            ),
            (
                "PRIDE",
                "PRIDE Controlled Vocabulary",
                "https://github.com/PRIDE-Utilities/pride-ontology/blob/master/pride_cv.obo",
            ),
        ];
        self.sink.element(bstart!("cvList"), |sink| {
            for (id, full_name, uri) in vocabularies {
                let mut cv = bstart!("cv");
                attrib!("id", id, cv);
                attrib!("fullName", full_name, cv);
                attrib!("uri", uri, cv);
                sink.empty(cv)?;
            }
            Ok(())
        })
    }

    fn write_software_list(&mut self) -> ExportResult {
        let settings = self.session.settings;
        let software = &settings.software;
        self.sink.element(bstart!("AnalysisSoftwareList"), |sink| {
            let mut elt = bstart!("AnalysisSoftware");
            attrib!("name", software.name, elt);
            attrib!("version", software.version, elt);
            if let Some(uri) = software.uri.as_ref() {
                attrib!("uri", uri, elt);
            }
            attrib!("id", SOFTWARE_ID, elt);
            sink.element(elt, |sink| {
                if software.vendor.is_some() {
                    let mut role = bstart!("ContactRole");
                    attrib!("contact_ref", VENDOR_ID, role);
                    sink.element(role, |sink| {
                        sink.element(bstart!("Role"), |sink| {
                            sink.cv_param(&terms::SOFTWARE_VENDOR)
                        })
                    })?;
                }
                sink.element(bstart!("SoftwareName"), |sink| {
                    sink.param(&software.name_param())
                })?;
                sink.simple("Customizations", "No customisations")
            })?;

            for engine in settings.search.search_engines.iter() {
                let mut elt = bstart!("AnalysisSoftware");
                attrib!("name", engine.name(), elt);
                attrib!("id", engine.software_id(), elt);
                sink.element(elt, |sink| {
                    sink.element(bstart!("SoftwareName"), |sink| match engine.software_term() {
                        Some(term) => sink.cv_param(&term),
                        None => sink.user_param(engine.name(), None),
                    })
                })?;
            }
            Ok(())
        })
    }

    fn write_provider(&mut self) -> ExportResult {
        if self.session.settings.contact.is_none() {
            return Ok(());
        }
        let mut elt = bstart!("Provider");
        attrib!("id", PROVIDER_ID, elt);
        self.sink.element(elt, |sink| {
            let mut role = bstart!("ContactRole");
            attrib!("contact_ref", PROVIDER_ID, role);
            sink.element(role, |sink| {
                sink.element(bstart!("Role"), |sink| sink.cv_param(&terms::RESEARCHER))
            })
        })
    }

    fn write_audit_collection(&mut self) -> ExportResult {
        let settings = self.session.settings;
        let contact = settings.contact.as_ref();
        let vendor = settings.software.vendor.as_ref();
        if contact.is_none() && vendor.is_none() {
            return Ok(());
        }
        self.sink.element(bstart!("AuditCollection"), |sink| {
            if let Some(contact) = contact {
                let mut person = bstart!("Person");
                attrib!("firstName", contact.first_name, person);
                attrib!("lastName", contact.last_name, person);
                attrib!("id", PROVIDER_ID, person);
                sink.element(person, |sink| {
                    sink.cv_param(&terms::CONTACT_ADDRESS.with_value(&contact.address))?;
                    sink.cv_param(&terms::CONTACT_EMAIL.with_value(&contact.email))?;
                    let mut affiliation = bstart!("Affiliation");
                    attrib!("organization_ref", DOCUMENT_OWNER_ID, affiliation);
                    sink.empty(affiliation)
                })?;

                let organization = &contact.organization;
                let mut elt = bstart!("Organization");
                attrib!("name", organization.name, elt);
                attrib!("id", DOCUMENT_OWNER_ID, elt);
                sink.element(elt, |sink| {
                    sink.cv_param(&terms::CONTACT_ADDRESS.with_value(&organization.address))?;
                    sink.cv_param(&terms::CONTACT_EMAIL.with_value(&organization.email))
                })?;
            }
            if let Some(vendor) = vendor {
                let mut elt = bstart!("Organization");
                attrib!("name", vendor, elt);
                attrib!("id", VENDOR_ID, elt);
                sink.empty(elt)?;
            }
            Ok(())
        })
    }

    fn write_inputs(&mut self) -> ExportResult {
        let context = self.session.context;
        let database = &self.session.settings.search.database;
        let registry = &self.session.registry;
        let n_sequences = context.sequences.accessions().len();
        let files = context.spectra.spectrum_files();

        self.sink.element(bstart!("Inputs"), |sink| {
            let mut elt = bstart!("SearchDatabase");
            attrib!("location", database.location, elt);
            if let Some(version) = database.version.as_ref() {
                attrib!("version", version, elt);
            }
            attrib!("numDatabaseSequences", n_sequences.to_string(), elt);
            attrib!("name", database.name, elt);
            attrib!("id", SEARCH_DATABASE_ID, elt);
            sink.element(elt, |sink| {
                sink.element(bstart!("FileFormat"), |sink| {
                    sink.cv_param(&terms::FASTA_FORMAT)
                })?;
                sink.element(bstart!("DatabaseName"), |sink| {
                    sink.user_param(&database.name, None)
                })?;
                sink.cv_param(&terms::DATABASE_TYPE_AMINO_ACID)?;
                if let Some(tag) = database.decoy_tag.as_ref() {
                    sink.cv_param(&terms::TARGET_DECOY_COMPOSITION)?;
                    sink.cv_param(&terms::DECOY_ACCESSION_REGEXP.with_value(tag))?;
                }
                Ok(())
            })?;

            for file in files.iter() {
                let mut elt = bstart!("SpectraData");
                attrib!("location", file.location, elt);
                attrib!("id", registry.spectra_data(&file.name)?, elt);
                attrib!("name", file.name, elt);
                let format = match file.extension().as_deref() {
                    Some("mzml") => terms::MZML_FORMAT,
                    Some("mzxml") => terms::MZXML_FORMAT,
                    _ => terms::MGF_FORMAT,
                };
                sink.element(elt, |sink| {
                    sink.element(bstart!("FileFormat"), |sink| sink.cv_param(&format))?;
                    sink.element(bstart!("SpectrumIDFormat"), |sink| {
                        sink.cv_param(&terms::MULTIPLE_PEAK_LIST_NATIVE_ID)
                    })
                })?;
            }
            Ok(())
        })
    }

    fn write_data_collection(&mut self) -> ExportResult {
        self.sink.start(bstart!("DataCollection"))?;
        self.write_inputs()?;
        self.sink.start(bstart!("AnalysisData"))?;
        write_spectrum_identification_list(&mut self.sink, &mut self.session, &self.profile)?;
        write_protein_detection_list(&mut self.sink, &mut self.session)?;
        self.sink.end("AnalysisData")?;
        self.sink.end("DataCollection")
    }

    /// Flush the document and recover the wrapped stream
    pub fn into_inner(self) -> io::Result<W> {
        self.sink.into_inner()
    }
}
