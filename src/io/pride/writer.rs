use std::io::{self, Write};

use log::{debug, info};

use crate::identification::{IdentificationContext, Peak, SpectrumInfo};
use crate::io::xml::{attrib, bstart};
use crate::io::{
    Dialect, ExportError, ExportOutcome, ExportResult, ExportSession, Latin1Writer, XmlSink,
};
use crate::params::ParamDescribed;
use crate::progress::ProgressHandle;
use crate::settings::ExportSettings;
use crate::terms;

use super::identification::write_gel_free_identifications;

/// The parts of a PRIDE XML document, in the order they are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrideXMLWriterState {
    Start,
    Experiment,
    MzData,
    Identifications,
    End,
}

/// Encode 64-bit floats as little-endian base64
pub(crate) fn encode_array(values: impl Iterator<Item = f64>) -> String {
    let mut bytes = Vec::new();
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    base64_simd::STANDARD.encode_to_string(&bytes)
}

/**
Writes a PRIDE XML 2.1 experiment from an [`IdentificationContext`].

The document is transcoded to ISO-8859-1 as it is written. Spectra are
numbered in the order they are written, and peptide items refer to them by
that number.
*/
pub struct PrideXMLWriter<'a, W: Write> {
    sink: XmlSink<Latin1Writer<W>>,
    session: ExportSession<'a>,
    state: PrideXMLWriterState,
}

impl<'a, W: Write> PrideXMLWriter<'a, W> {
    pub fn new(inner: W, context: IdentificationContext<'a>, settings: &'a ExportSettings) -> Self {
        Self {
            sink: XmlSink::new(Latin1Writer::new(inner), Dialect::Pride),
            session: ExportSession::new(context, settings),
            state: PrideXMLWriterState::Start,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressHandle) -> Self {
        self.session.set_progress(progress);
        self
    }

    pub fn state(&self) -> PrideXMLWriterState {
        self.state
    }

    pub fn depth(&self) -> usize {
        self.sink.depth()
    }

    fn transition_err(&self, to: PrideXMLWriterState) -> ExportResult {
        Err(ExportError::InvalidState {
            from: format!("{:?}", self.state),
            to: format!("{:?}", to),
        })
    }

    fn advance(&mut self, to: PrideXMLWriterState) -> ExportResult {
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
        if self.state != PrideXMLWriterState::Start {
            self.transition_err(PrideXMLWriterState::Experiment)?;
        }
        info!("Writing PRIDE XML document");
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
                    "Wrote {} spectra and {} protein groups ({} spectrum matches skipped)",
                    summary.spectra, summary.protein_groups, summary.skipped_spectra
                );
                Ok(ExportOutcome::Complete(summary))
            }
            Err(ExportError::Cancelled) => {
                self.sink.flush()?;
                info!(
                    "PRIDE XML export cancelled with {} elements open",
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
        self.advance(PrideXMLWriterState::Experiment)?;
        self.sink.declaration("ISO-8859-1")?;
        let mut collection = bstart!("ExperimentCollection");
        attrib!("version", "2.1", collection);
        self.sink.start(collection)?;
        self.sink.start(bstart!("Experiment"))?;
        self.write_experiment_header()?;

        self.advance(PrideXMLWriterState::MzData)?;
        self.write_mz_data()?;

        self.advance(PrideXMLWriterState::Identifications)?;
        write_gel_free_identifications(&mut self.sink, &mut self.session)?;

        let pride = &self.session.settings.pride;
        if !pride.params().is_empty() {
            self.sink.element(bstart!("additional"), |sink| {
                sink.params(pride.params().iter())
            })?;
        }
        self.sink.end("Experiment")?;
        self.sink.end("ExperimentCollection")?;
        self.state = PrideXMLWriterState::End;
        Ok(())
    }

    fn write_experiment_header(&mut self) -> ExportResult {
        let pride = &self.session.settings.pride;
        self.sink.simple("Title", &pride.title)?;
        for reference in pride.references.iter() {
            self.sink.element(bstart!("Reference"), |sink| {
                sink.simple("RefLine", reference)
            })?;
        }
        self.sink.simple("ShortLabel", &pride.short_label)?;
        self.sink.element(bstart!("Protocol"), |sink| {
            sink.simple("ProtocolName", &pride.protocol_name)?;
            if !pride.protocol_steps.is_empty() {
                sink.element(bstart!("ProtocolSteps"), |sink| {
                    for step in pride.protocol_steps.iter() {
                        sink.element(bstart!("StepDescription"), |sink| sink.param(step))?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })
    }

    fn write_cv_lookup(&mut self) -> ExportResult {
        let vocabularies = [
            (
                "MS",
                "PSI Mass Spectrometry Ontology",
                "https://raw.githubusercontent.com/HUPO-PSI/psi-ms-CV/master/psi-ms.obo",
            ),
            (
                "PRIDE",
                "PRIDE Controlled Vocabulary",
                "https://github.com/PRIDE-Utilities/pride-ontology",
            ),
            ("PSI", "PSI mzData Controlled Vocabulary", "http://psidev.info/index.php?q=node/80"),
            ("UNIMOD", "UNIMOD", "http://www.unimod.org/obo/unimod.obo"),
        ];
        for (label, full_name, address) in vocabularies {
            let mut elt = bstart!("cvLookup");
            attrib!("cvLabel", label, elt);
            attrib!("fullName", full_name, elt);
            attrib!("version", "1.0", elt);
            attrib!("address", address, elt);
            self.sink.empty(elt)?;
        }
        Ok(())
    }

    fn write_description(&mut self) -> ExportResult {
        let settings = self.session.settings;
        let pride = &settings.pride;
        self.sink.element(bstart!("description"), |sink| {
            sink.element(bstart!("admin"), |sink| {
                sink.simple("sampleName", &pride.sample.name)?;
                if !pride.sample.params().is_empty() {
                    sink.element(bstart!("sampleDescription"), |sink| {
                        sink.params(pride.sample.params().iter())
                    })?;
                }
                sink.element(bstart!("contact"), |sink| match settings.contact.as_ref() {
                    Some(contact) => {
                        sink.simple("name", &contact.full_name())?;
                        sink.simple("institution", &contact.organization.name)?;
                        sink.simple("contactInfo", &contact.email)
                    }
                    None => {
                        sink.simple("name", &settings.software.name)?;
                        sink.simple(
                            "institution",
                            settings.software.vendor.as_deref().unwrap_or_default(),
                        )
                    }
                })
            })?;

            let instrument = &pride.instrument;
            sink.element(bstart!("instrument"), |sink| {
                sink.simple("instrumentName", &instrument.name)?;
                sink.element(bstart!("source"), |sink| {
                    sink.params(instrument.source.iter())
                })?;
                let mut analyzers = bstart!("analyzerList");
                attrib!("count", instrument.analyzers.len().to_string(), analyzers);
                sink.element(analyzers, |sink| {
                    for analyzer in instrument.analyzers.iter() {
                        sink.element(bstart!("analyzer"), |sink| sink.param(analyzer))?;
                    }
                    Ok(())
                })?;
                sink.element(bstart!("detector"), |sink| {
                    sink.params(instrument.detector.iter())
                })
            })?;

            sink.element(bstart!("dataProcessing"), |sink| {
                sink.element(bstart!("software"), |sink| {
                    sink.simple("name", &settings.software.name)?;
                    sink.simple("version", &settings.software.version)
                })
            })
        })
    }

    fn write_spectrum(&mut self, id: usize, info: &SpectrumInfo, peaks: &[Peak]) -> ExportResult {
        let mut elt = bstart!("spectrum");
        attrib!("id", id.to_string(), elt);
        self.sink.element(elt, |sink| {
            sink.element(bstart!("spectrumDesc"), |sink| {
                sink.element(bstart!("spectrumSettings"), |sink| {
                    let mut instrument = bstart!("spectrumInstrument");
                    attrib!("msLevel", "2", instrument);
                    sink.empty(instrument)
                })?;
                let mut list = bstart!("precursorList");
                attrib!("count", "1", list);
                sink.element(list, |sink| {
                    let mut precursor = bstart!("precursor");
                    attrib!("msLevel", "1", precursor);
                    attrib!("spectrumRef", "0", precursor);
                    sink.element(precursor, |sink| {
                        sink.element(bstart!("ionSelection"), |sink| {
                            let precursor = &info.precursor;
                            sink.cv_param(&terms::PSI_MASS_TO_CHARGE.with_value(precursor.mz))?;
                            for charge in precursor.charges.iter() {
                                sink.cv_param(&terms::PSI_CHARGE_STATE.with_value(charge))?;
                            }
                            sink.cv_param(&terms::PSI_INTENSITY.with_value(precursor.intensity))?;
                            if let Some(rt) = precursor.retention_time {
                                sink.cv_param(&terms::PSI_TIME_IN_SECONDS.with_value(rt))?;
                            }
                            Ok(())
                        })?;
                        sink.empty(bstart!("activation"))
                    })
                })
            })?;

            for (tag, encoded) in [
                ("mzArrayBinary", encode_array(peaks.iter().map(|p| p.mz))),
                ("intenArrayBinary", encode_array(peaks.iter().map(|p| p.intensity))),
            ] {
                sink.element(bstart!(tag), |sink| {
                    let mut data = bstart!("data");
                    attrib!("precision", "64", data);
                    attrib!("endian", "little", data);
                    attrib!("length", peaks.len().to_string(), data);
                    sink.text_element(data, &encoded)
                })?;
            }
            Ok(())
        })
    }

    /// Write every spectrum with a best peptide assumption, numbering them from 1
    fn write_spectrum_list(&mut self) -> ExportResult {
        let context = self.session.context;
        let identifications = context.identifications;

        let mut count = 0;
        for spectrum_match in identifications.spectrum_matches() {
            if spectrum_match?.best_assumption.is_some() {
                count += 1;
            }
        }
        self.session
            .begin_phase(identifications.count_spectrum_matches());

        let mut list = bstart!("spectrumList");
        attrib!("count", count.to_string(), list);
        self.sink.start(list)?;
        for spectrum_match in identifications.spectrum_matches() {
            self.session.checkpoint()?;
            let spectrum_match = spectrum_match?;
            if spectrum_match.best_assumption.is_none() {
                debug!(
                    "Skipping spectrum match {} without a best peptide assumption",
                    spectrum_match.key
                );
                self.session.summary.skipped_spectra += 1;
                self.session.tick();
                continue;
            }
            let info = context.spectra.spectrum_info(&spectrum_match.key)?;
            let peaks = context.spectra.peaks(&spectrum_match.key)?;
            let id = self
                .session
                .registry
                .register_spectrum_index(&spectrum_match.key);
            self.write_spectrum(id, &info, &peaks)?;
            self.session.summary.spectra += 1;
            self.session.tick();
        }
        self.sink.end("spectrumList")
    }

    fn write_mz_data(&mut self) -> ExportResult {
        let mut elt = bstart!("mzData");
        attrib!("version", "1.05", elt);
        attrib!("accessionNumber", "0", elt);
        self.sink.start(elt)?;
        self.write_cv_lookup()?;
        self.write_description()?;
        self.write_spectrum_list()?;
        self.sink.end("mzData")
    }

    /// Flush the document and recover the wrapped stream
    pub fn into_inner(self) -> io::Result<W> {
        self.sink.into_inner()?.finish()
    }
}
