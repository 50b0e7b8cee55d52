//! Protein identifications of a PRIDE XML experiment.
use std::io::Write;

use log::{debug, warn};

use crate::identification::{
    AnnotationSettings, PeptideMatch, ProteinGroup, ProteinRecord, SpectrumMatch,
};
use crate::io::xml::bstart;
use crate::io::{ExportError, ExportResult, ExportSession, XmlSink};
use crate::params::{ControlledVocabulary, Param, ParamLike};
use crate::settings::ExportSettings;
use crate::terms;

/// PRIDE XML can only describe ions with a single neutral loss
const MAX_NEUTRAL_LOSSES: usize = 1;

fn write_modifications<W: Write>(
    sink: &mut XmlSink<W>,
    settings: &ExportSettings,
    peptide_match: &PeptideMatch,
) -> ExportResult {
    let peptide = &peptide_match.peptide;
    for occurrence in peptide.modifications.iter() {
        let definition = settings
            .search
            .modification(&occurrence.name)
            .ok_or_else(|| ExportError::UnknownModification(occurrence.name.clone()))?;
        let term = definition.cv_term();
        let database = match term.controlled_vocabulary() {
            Some(ControlledVocabulary::UNIMOD) => "UNIMOD",
            _ => "PSI-MS",
        };
        let location = definition.location(occurrence.site, peptide.len());
        sink.element(bstart!("ModificationItem"), |sink| {
            sink.simple("ModLocation", &location.to_string())?;
            sink.simple("ModAccession", &term.curie().unwrap_or_default())?;
            sink.simple("ModDatabase", database)?;
            sink.simple("ModMonoDelta", &definition.mass.to_string())?;
            sink.element(bstart!("additional"), |sink| sink.cv_param(&term))
        })?;
    }
    Ok(())
}

fn write_fragment_ions<W: Write>(
    sink: &mut XmlSink<W>,
    session: &ExportSession<'_>,
    spectrum_match: &SpectrumMatch,
) -> ExportResult {
    let settings = session.settings;
    let best = match (settings.include_fragment_ions, spectrum_match.best_assumption.as_ref()) {
        (true, Some(best)) => best,
        _ => return Ok(()),
    };
    let annotation = AnnotationSettings::new(
        settings.search.fragment_tolerance,
        MAX_NEUTRAL_LOSSES,
        best.charge,
    );
    let matches = session.context.annotator.annotate(
        &spectrum_match.key,
        &best.peptide,
        best.charge,
        &annotation,
    )?;
    for ion_match in matches {
        if ion_match.ion.pride_term(&[]).is_none() {
            debug!("No PRIDE ion type for {}, it is not written", ion_match.group_label());
            continue;
        }
        if ion_match.neutral_losses.len() > MAX_NEUTRAL_LOSSES {
            return Err(ExportError::NeutralLossLimitExceeded {
                ion: ion_match.group_label(),
                found: ion_match.neutral_losses.len(),
                allowed: MAX_NEUTRAL_LOSSES,
            });
        }
        let term = match ion_match.ion.pride_term(&ion_match.neutral_losses) {
            Some(term) => term,
            None => {
                warn!(
                    "No PRIDE term for fragment ion {}, it is not written",
                    ion_match.group_label()
                );
                continue;
            }
        };
        let number = ion_match.ion.index(&best.peptide.sequence);
        sink.element(bstart!("FragmentIon"), |sink| {
            sink.cv_param(&term.with_value(number))?;
            sink.cv_param(&terms::PRIDE_PRODUCT_ION_MZ.with_value(ion_match.peak_mz))?;
            sink.cv_param(&terms::PRIDE_PRODUCT_ION_INTENSITY.with_value(ion_match.peak_intensity))?;
            sink.cv_param(&terms::PRIDE_PRODUCT_ION_MASS_ERROR.with_value(ion_match.mz_error()))?;
            sink.cv_param(&terms::PRIDE_PRODUCT_ION_CHARGE.with_value(ion_match.charge))
        })?;
    }
    Ok(())
}

/// The scores of a spectrum match and the best score of every search engine
fn peptide_item_params(
    session: &ExportSession<'_>,
    spectrum_match: &SpectrumMatch,
) -> Result<Vec<Param>, ExportError> {
    let validation = session
        .context
        .identifications
        .psm_validation(&spectrum_match.key)?;
    let mut params = vec![
        terms::PSM_SCORE.with_value(validation.score),
        terms::PSM_CONFIDENCE.with_value(validation.confidence),
        terms::PSM_CONFIDENCE_TYPE.with_value(validation.level),
    ];
    for (engine, score) in spectrum_match.best_engine_scores() {
        match engine.e_value_term() {
            Some(term) => params.push(term.with_value(score.e_value)),
            None => params.push(Param::new_key_value(
                format!("{} e-value", engine.name()),
                score.e_value,
            )),
        }
    }
    Ok(params)
}

fn write_peptide_item<W: Write>(
    sink: &mut XmlSink<W>,
    session: &ExportSession<'_>,
    main_protein: &ProteinRecord,
    peptide_match: &PeptideMatch,
    spectrum_key: &str,
) -> ExportResult {
    let spectrum_index = session.registry.spectrum_index(spectrum_key)?;
    let spectrum_match = session.context.identifications.spectrum_match(spectrum_key)?;
    let params = peptide_item_params(session, &spectrum_match)?;
    let length = peptide_match.peptide.len();
    let offset = peptide_match
        .offsets_in(&main_protein.accession)
        .first()
        .copied();

    sink.element(bstart!("PeptideItem"), |sink| {
        sink.simple("Sequence", &peptide_match.peptide.sequence)?;
        if let Some(offset) = offset {
            sink.simple("Start", &(offset + 1).to_string())?;
            sink.simple("End", &(offset + length).to_string())?;
        }
        sink.simple("SpectrumReference", &spectrum_index.to_string())?;
        write_modifications(sink, session.settings, peptide_match)?;
        write_fragment_ions(sink, session, &spectrum_match)?;
        sink.element(bstart!("additional"), |sink| {
            if let Some(offset) = offset {
                let (pre, post) = main_protein.flanking_residues(offset, length);
                sink.cv_param(&terms::PRIDE_UPSTREAM_FLANK.with_value(pre))?;
                sink.cv_param(&terms::PRIDE_DOWNSTREAM_FLANK.with_value(post))?;
            }
            sink.params(params.iter())
        })
    })
}

fn write_gel_free_identification<W: Write>(
    sink: &mut XmlSink<W>,
    session: &ExportSession<'_>,
    group: &ProteinGroup,
) -> ExportResult {
    let context = session.context;
    let settings = session.settings;
    let main_protein = context.sequences.protein(&group.main_accession)?;
    let validation = context
        .identifications
        .protein_group_validation(&group.key)?;
    let mut peptides = Vec::with_capacity(group.peptide_keys.len());
    for peptide_key in group.peptide_keys.iter() {
        peptides.push(context.identifications.peptide_match(peptide_key)?);
    }
    let search_engine = if settings.search.search_engines.is_empty() {
        settings.software.name.clone()
    } else {
        settings
            .search
            .search_engines
            .iter()
            .map(|e| e.name().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    sink.element(bstart!("GelFreeIdentification"), |sink| {
        sink.simple("Accession", &main_protein.accession)?;
        sink.simple("Database", &settings.search.database.name)?;
        if let Some(version) = settings.search.database.version.as_ref() {
            sink.simple("DatabaseVersion", version)?;
        }
        for peptide_match in peptides.iter() {
            for spectrum_key in peptide_match.spectrum_keys.iter() {
                write_peptide_item(sink, session, &main_protein, peptide_match, spectrum_key)?;
            }
        }
        sink.element(bstart!("additional"), |sink| {
            if let Some(description) = main_protein.description.as_ref() {
                sink.cv_param(&terms::PRIDE_PROTEIN_DESCRIPTION.with_value(description))?;
            }
            for accession in group.accessions.iter().filter(|a| !group.is_leading(a)) {
                sink.cv_param(&terms::PRIDE_ALTERNATIVE_ACCESSION.with_value(accession))?;
            }
            if main_protein.is_decoy {
                sink.cv_param(&terms::PRIDE_DECOY_HIT)?;
            }
            sink.cv_param(&terms::PROTEIN_GROUP_SCORE.with_value(validation.score))?;
            sink.cv_param(&terms::PROTEIN_GROUP_CONFIDENCE.with_value(validation.confidence))?;
            sink.cv_param(&terms::PROTEIN_CONFIDENCE_TYPE.with_value(validation.level))
        })?;
        sink.simple("Score", &validation.score.to_string())?;
        sink.simple("Threshold", &settings.thresholds.protein_fdr.to_string())?;
        sink.simple("SearchEngine", &search_engine)
    })
}

/// Write one `GelFreeIdentification` per protein group.
///
/// Peptide items refer to spectra by the number they were written under, a
/// spectrum missing from the spectrum list is an error.
pub(crate) fn write_gel_free_identifications<W: Write>(
    sink: &mut XmlSink<W>,
    session: &mut ExportSession<'_>,
) -> ExportResult {
    let identifications = session.context.identifications;
    session.begin_phase(identifications.count_protein_groups());
    for group in identifications.protein_groups() {
        session.checkpoint()?;
        let group = group?;
        write_gel_free_identification(sink, session, &group)?;
        session.summary.protein_groups += 1;
        session.tick();
    }
    Ok(())
}
