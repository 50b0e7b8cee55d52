//! The analysis collection and the protocols the analyses were run with.
use std::io::Write;

use crate::io::xml::{attrib, bstart};
use crate::io::{ExportError, ExportResult, ExportSession, XmlSink};
use crate::params::Param;
use crate::settings::{CleavageSpecificity, Digestion, Enzyme, SearchParameters, Tolerance};
use crate::terms;

use super::{
    VersionProfile, PROTEIN_DETECTION_LIST_ID, PROTEIN_DETECTION_PROTOCOL_ID, SEARCH_DATABASE_ID,
    SEARCH_PROTOCOL_ID, SOFTWARE_ID, SPECTRUM_IDENTIFICATION_LIST_ID,
};

pub(crate) fn write_analysis_collection<W: Write>(
    sink: &mut XmlSink<W>,
    session: &mut ExportSession<'_>,
) -> ExportResult {
    let files = session.context.spectra.spectrum_files();
    for file in files.iter() {
        session.registry.register_spectra_data(&file.name);
    }
    let registry = &session.registry;
    sink.element(bstart!("AnalysisCollection"), |sink| {
        let mut elt = bstart!("SpectrumIdentification");
        attrib!("spectrumIdentificationList_ref", SPECTRUM_IDENTIFICATION_LIST_ID, elt);
        attrib!("spectrumIdentificationProtocol_ref", SEARCH_PROTOCOL_ID, elt);
        attrib!("id", "SpecIdent_1", elt);
        sink.element(elt, |sink| {
            for (_, spectra_data_id) in registry.spectra_data_ids() {
                let mut input = bstart!("InputSpectra");
                attrib!("spectraData_ref", spectra_data_id, input);
                sink.empty(input)?;
            }
            let mut db = bstart!("SearchDatabaseRef");
            attrib!("searchDatabase_ref", SEARCH_DATABASE_ID, db);
            sink.empty(db)
        })?;

        let mut elt = bstart!("ProteinDetection");
        attrib!("proteinDetectionList_ref", PROTEIN_DETECTION_LIST_ID, elt);
        attrib!("proteinDetectionProtocol_ref", PROTEIN_DETECTION_PROTOCOL_ID, elt);
        attrib!("id", "PD_1", elt);
        sink.element(elt, |sink| {
            let mut input = bstart!("InputSpectrumIdentifications");
            attrib!("spectrumIdentificationList_ref", SPECTRUM_IDENTIFICATION_LIST_ID, input);
            sink.empty(input)
        })
    })
}

/// Write the search and protein inference protocols.
///
/// With a modification index, every searched modification mass is assigned its
/// index before any modification is written.
pub(crate) fn write_analysis_protocol_collection<W: Write>(
    sink: &mut XmlSink<W>,
    session: &mut ExportSession<'_>,
    profile: &VersionProfile,
) -> ExportResult {
    let settings = session.settings;
    let search = &settings.search;
    if profile.modification_index {
        let index = session.registry.modifications_mut();
        for definition in search.modifications.iter() {
            index.assign(definition.mass);
        }
    }
    let registry = &session.registry;

    sink.element(bstart!("AnalysisProtocolCollection"), |sink| {
        let mut elt = bstart!("SpectrumIdentificationProtocol");
        attrib!("analysisSoftware_ref", SOFTWARE_ID, elt);
        attrib!("id", SEARCH_PROTOCOL_ID, elt);
        sink.element(elt, |sink| {
            sink.element(bstart!("SearchType"), |sink| {
                sink.cv_param(&terms::MS_MS_SEARCH)
            })?;
            write_additional_search_params(sink, search, profile)?;

            if !search.modifications.is_empty() {
                sink.element(bstart!("ModificationParams"), |sink| {
                    for definition in search.modifications.iter() {
                        let mut elt = bstart!("SearchModification");
                        attrib!("fixedMod", definition.fixed.to_string(), elt);
                        attrib!("massDelta", definition.mass.to_string(), elt);
                        attrib!("residues", definition.residues_str(), elt);
                        sink.element(elt, |sink| {
                            if let Some(term) = definition.position.specificity_term() {
                                sink.element(bstart!("SpecificityRules"), |sink| {
                                    sink.cv_param(&term)
                                })?;
                            }
                            sink.cv_param(&definition.cv_term())?;
                            if profile.modification_index {
                                if let Some(index) = registry.modifications().get(definition.mass) {
                                    sink.cv_param(&terms::MODIFICATION_INDEX.with_value(index))?;
                                }
                            }
                            Ok(())
                        })?;
                    }
                    Ok(())
                })?;
            }

            write_enzymes(sink, &search.digestion)?;

            sink.element(bstart!("FragmentTolerance"), |sink| {
                write_tolerance(sink, &search.fragment_tolerance)
            })?;
            sink.element(bstart!("ParentTolerance"), |sink| {
                write_tolerance(sink, &search.precursor_tolerance)
            })?;
            sink.element(bstart!("Threshold"), |sink| {
                sink.cv_param(&terms::PSM_FDR_THRESHOLD.with_value(settings.thresholds.psm_fdr))
            })
        })?;

        let mut elt = bstart!("ProteinDetectionProtocol");
        attrib!("analysisSoftware_ref", SOFTWARE_ID, elt);
        attrib!("id", PROTEIN_DETECTION_PROTOCOL_ID, elt);
        sink.element(elt, |sink| {
            sink.element(bstart!("Threshold"), |sink| {
                sink.cv_param(&terms::PEPTIDE_FDR_THRESHOLD.with_value(settings.thresholds.peptide_fdr))?;
                sink.cv_param(
                    &terms::PROTEIN_GROUP_FDR_THRESHOLD.with_value(settings.thresholds.protein_fdr),
                )
            })
        })
    })
}

fn write_additional_search_params<W: Write>(
    sink: &mut XmlSink<W>,
    search: &SearchParameters,
    profile: &VersionProfile,
) -> ExportResult {
    sink.element(bstart!("AdditionalSearchParams"), |sink| {
        sink.cv_param(&terms::PARENT_MASS_TYPE_MONO)?;
        sink.cv_param(&terms::FRAGMENT_MASS_TYPE_MONO)?;
        if profile.localization_scoring {
            sink.cv_param(&terms::MODIFICATION_LOCALIZATION_SCORING)?;
        }
        if profile.consensus_scoring && search.search_engines.len() > 1 {
            sink.cv_param(&terms::CONSENSUS_SCORING)?;
        }
        sink.user_param("Minimum precursor charge", Some(&search.min_charge.to_string()))?;
        sink.user_param("Maximum precursor charge", Some(&search.max_charge.to_string()))
    })
}

fn write_tolerance<W: Write>(sink: &mut XmlSink<W>, tolerance: &Tolerance) -> ExportResult {
    let unit = tolerance.unit_param();
    sink.cv_param(&terms::TOLERANCE_PLUS.with_value(tolerance.value).with_unit_t(unit))?;
    sink.cv_param(&terms::TOLERANCE_MINUS.with_value(tolerance.value).with_unit_t(unit))
}

fn write_enzyme_name<W: Write>(sink: &mut XmlSink<W>, term: Param) -> ExportResult {
    sink.element(bstart!("EnzymeName"), |sink| sink.param(&term))
}

fn named_enzyme_term(enzyme: &Enzyme) -> Param {
    match enzyme.cv_term() {
        Some(term) => term.into(),
        None => Param::new_key_value(enzyme.name.as_str(), ""),
    }
}

/// Write the single digestion mode of the search
pub(crate) fn write_enzymes<W: Write>(sink: &mut XmlSink<W>, digestion: &Digestion) -> ExportResult {
    match digestion {
        Digestion::Unspecific => sink.element(bstart!("Enzymes"), |sink| {
            let mut elt = bstart!("Enzyme");
            attrib!("id", "Enz_1", elt);
            sink.element(elt, |sink| write_enzyme_name(sink, terms::UNSPECIFIC_CLEAVAGE.into()))
        }),
        Digestion::WholeProtein => sink.element(bstart!("Enzymes"), |sink| {
            let mut elt = bstart!("Enzyme");
            attrib!("id", "Enz_1", elt);
            sink.element(elt, |sink| write_enzyme_name(sink, terms::NO_CLEAVAGE.into()))
        }),
        Digestion::Enzymes {
            enzymes,
            independent,
        } => {
            if enzymes.is_empty() {
                return Err(ExportError::InvalidDigestion(
                    "enzymatic digestion without any enzyme".to_string(),
                ));
            }
            let mut outer = bstart!("Enzymes");
            attrib!("independent", independent.to_string(), outer);
            sink.element(outer, |sink| {
                for (i, enzyme) in enzymes.iter().enumerate() {
                    let mut elt = bstart!("Enzyme");
                    attrib!("missedCleavages", enzyme.missed_cleavages.to_string(), elt);
                    let semi = !matches!(enzyme.specificity, CleavageSpecificity::Specific);
                    attrib!("semiSpecific", semi.to_string(), elt);
                    attrib!("id", format!("Enz_{}", i + 1), elt);
                    sink.element(elt, |sink| write_enzyme_name(sink, named_enzyme_term(enzyme)))?;
                }
                Ok(())
            })
        }
    }
}
