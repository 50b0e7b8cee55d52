//! Spectrum identification results: one result per spectrum match with a best
//! assumption, carrying its fragment ion annotation, localization scores and the
//! best score of every search engine.
use std::io::Write;

use indexmap::IndexMap;
use log::debug;

use crate::identification::{
    AnnotationSettings, IonMatch, PeptideAssumption, Peptidoform, PtmScores, SpectrumMatch,
};
use crate::io::xml::{attrib, bstart};
use crate::io::{ExportError, ExportResult, ExportSession, XmlSink};
use crate::params::{Param, ParamCow};
use crate::settings::{ExportSettings, ProbabilisticPtmScore};
use crate::terms;

use super::{VersionProfile, SPECTRUM_IDENTIFICATION_LIST_ID};

const MEASURE_MZ: &str = "Measure_MZ";
const MEASURE_INTENSITY: &str = "Measure_Int";
const MEASURE_ERROR: &str = "Measure_Error";

/// The matched ions of one ion type at one charge, as parallel arrays
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IonTypeGroup {
    pub term: ParamCow<'static>,
    pub loss_terms: Vec<Param>,
    pub charge: i32,
    pub indices: Vec<usize>,
    pub mz: Vec<f64>,
    pub intensity: Vec<f64>,
    pub error: Vec<f64>,
}

impl IonTypeGroup {
    fn new(term: ParamCow<'static>, ion_match: &IonMatch) -> Self {
        Self {
            term,
            loss_terms: ion_match.neutral_losses.iter().map(|l| l.cv_term()).collect(),
            charge: ion_match.charge,
            indices: Vec::new(),
            mz: Vec::new(),
            intensity: Vec::new(),
            error: Vec::new(),
        }
    }

    fn push(&mut self, ion_match: &IonMatch, sequence: &str) {
        self.indices.push(ion_match.ion.index(sequence));
        self.mz.push(ion_match.peak_mz);
        self.intensity.push(ion_match.peak_intensity);
        self.error.push(ion_match.mz_error());
    }
}

fn join_values<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Group ion matches by ion type, losses and charge, in the order the groups are first seen.
///
/// Ions without a PSI-MS ion type are left out. An ion with more neutral losses than
/// `max_neutral_losses` is an error.
pub(crate) fn group_ion_matches<I: Iterator<Item = IonMatch>>(
    matches: I,
    sequence: &str,
    max_neutral_losses: usize,
) -> Result<IndexMap<(String, i32), IonTypeGroup>, ExportError> {
    let mut groups: IndexMap<(String, i32), IonTypeGroup> = IndexMap::new();
    for ion_match in matches {
        let term = match ion_match.ion.cv_term() {
            Some(term) => term,
            None => continue,
        };
        if ion_match.neutral_losses.len() > max_neutral_losses {
            return Err(ExportError::NeutralLossLimitExceeded {
                ion: ion_match.group_label(),
                found: ion_match.neutral_losses.len(),
                allowed: max_neutral_losses,
            });
        }
        groups
            .entry((ion_match.group_label(), ion_match.charge))
            .or_insert_with(|| IonTypeGroup::new(term, &ion_match))
            .push(&ion_match, sequence);
    }
    Ok(groups)
}

fn write_fragmentation_table<W: Write>(sink: &mut XmlSink<W>) -> ExportResult {
    sink.element(bstart!("FragmentationTable"), |sink| {
        for (id, term) in [
            (MEASURE_MZ, terms::PRODUCT_ION_MZ),
            (MEASURE_INTENSITY, terms::PRODUCT_ION_INTENSITY),
            (MEASURE_ERROR, terms::PRODUCT_ION_MZ_ERROR),
        ] {
            let mut elt = bstart!("Measure");
            attrib!("id", id, elt);
            sink.element(elt, |sink| sink.cv_param(&term))?;
        }
        Ok(())
    })
}

fn write_fragmentation<W: Write>(
    sink: &mut XmlSink<W>,
    groups: &IndexMap<(String, i32), IonTypeGroup>,
) -> ExportResult {
    if groups.is_empty() {
        return Ok(());
    }
    sink.element(bstart!("Fragmentation"), |sink| {
        for group in groups.values() {
            let mut elt = bstart!("IonType");
            attrib!("charge", group.charge.to_string(), elt);
            attrib!("index", join_values(&group.indices), elt);
            sink.element(elt, |sink| {
                for (measure, values) in [
                    (MEASURE_MZ, &group.mz),
                    (MEASURE_INTENSITY, &group.intensity),
                    (MEASURE_ERROR, &group.error),
                ] {
                    let mut array = bstart!("FragmentArray");
                    attrib!("measure_ref", measure, array);
                    attrib!("values", join_values(values), array);
                    sink.empty(array)?;
                }
                sink.cv_param(&group.term)?;
                for loss in group.loss_terms.iter() {
                    sink.cv_param(loss)?;
                }
                Ok(())
            })?;
        }
        Ok(())
    })
}

/// Localization scores of every site of every modification on `peptide`
fn ptm_score_params(
    session: &mut ExportSession<'_>,
    profile: &VersionProfile,
    peptide: &Peptidoform,
    scores: Option<&PtmScores>,
) -> Result<Vec<Param>, ExportError> {
    let mut params = Vec::new();
    let scores = match scores {
        Some(scores) => scores,
        None => return Ok(params),
    };
    let settings: &ExportSettings = session.settings;
    let scoring = &settings.ptm_scoring;
    let probabilistic = scoring.reported_probabilistic();
    for name in peptide.modification_names() {
        let sites = match scores.sites(name) {
            Some(sites) => sites,
            None => continue,
        };
        let definition = settings
            .search
            .modification(name)
            .ok_or_else(|| ExportError::UnknownModification(name.to_string()))?;
        let index = if profile.modification_index {
            session.registry.modifications_mut().assign(definition.mass)
        } else {
            0
        };
        for site in 1..=peptide.len() {
            let site_score = match sites.get(&site) {
                Some(score) => score,
                None => continue,
            };
            if site_score.delta > 0.0 {
                let valid = site_score.delta >= scoring.delta_threshold;
                params.push(
                    terms::D_SCORE
                        .with_value(profile.ptm_score_value(index, site_score.delta, site, valid)),
                );
            }
            if let (Some(ProbabilisticPtmScore::PhosphoRs), Some(score)) =
                (probabilistic, site_score.probabilistic)
            {
                let valid = score >= scoring.probabilistic_threshold;
                params.push(
                    terms::PHOSPHORS_SITE_PROBABILITY
                        .with_value(profile.ptm_score_value(index, score, site, valid)),
                );
            }
        }
    }
    Ok(params)
}

/// The best score of each engine, as controlled terms where the engine has them and
/// as user parameters otherwise
fn engine_score_params(spectrum_match: &SpectrumMatch) -> (Vec<Param>, Vec<Param>) {
    let mut controlled = Vec::new();
    let mut user = Vec::new();
    for (engine, score) in spectrum_match.best_engine_scores() {
        match engine.e_value_term() {
            Some(term) => controlled.push(term.with_value(score.e_value)),
            None => user.push(Param::new_key_value(
                format!("{} e-value", engine.name()),
                score.e_value,
            )),
        }
        if let (Some(term), Some(raw)) = (engine.raw_score_term(), score.raw_score) {
            controlled.push(term.with_value(raw));
        }
    }
    (controlled, user)
}

fn write_spectrum_result<W: Write>(
    sink: &mut XmlSink<W>,
    session: &mut ExportSession<'_>,
    profile: &VersionProfile,
    spectrum_match: &SpectrumMatch,
    best: &PeptideAssumption,
) -> ExportResult {
    let context = session.context;
    let settings = session.settings;
    let key = spectrum_match.key.as_str();

    let peptide_key = session.registry.peptide_for_spectrum(key)?.to_string();
    let peptide_id = session.registry.peptide_id(&peptide_key)?.to_string();
    let peptide_match = context.identifications.peptide_match(&peptide_key)?;
    let mut evidence_ids = Vec::new();
    for (accession, offset) in peptide_match.occurrences() {
        evidence_ids.push(
            session
                .registry
                .peptide_evidence(accession, offset, &peptide_key)?
                .to_string(),
        );
    }
    let spectra_data_id = session.registry.spectra_data(&spectrum_match.file)?.to_string();
    let info = context.spectra.spectrum_info(key)?;
    let psm_validation = context.identifications.psm_validation(key)?;
    let peptide_validation = context.identifications.peptide_validation(&peptide_key)?;

    let fragments = if settings.include_fragment_ions {
        let annotation = AnnotationSettings::new(
            settings.search.fragment_tolerance,
            profile.max_neutral_losses,
            best.charge,
        );
        let matches = context
            .annotator
            .annotate(key, &best.peptide, best.charge, &annotation)?;
        group_ion_matches(matches, &best.peptide.sequence, profile.max_neutral_losses)?
    } else {
        IndexMap::new()
    };

    let ptm_scores = context.identifications.ptm_scores(key);
    let ptm_params = ptm_score_params(session, profile, &best.peptide, ptm_scores.as_ref())?;
    let (engine_params, engine_user_params) = engine_score_params(spectrum_match);
    let ids = session.registry.register_spectrum_item(key, &peptide_key);

    let mut result = bstart!("SpectrumIdentificationResult");
    attrib!("spectraData_ref", spectra_data_id, result);
    attrib!("spectrumID", format!("index={}", info.index), result);
    attrib!("id", ids.result, result);
    sink.element(result, |sink| {
        let mut item = bstart!("SpectrumIdentificationItem");
        attrib!("passThreshold", psm_validation.is_validated().to_string(), item);
        attrib!("rank", "1", item);
        attrib!("calculatedMassToCharge", best.theoretical_mz.to_string(), item);
        attrib!("experimentalMassToCharge", info.precursor.mz.to_string(), item);
        attrib!("chargeState", best.charge.to_string(), item);
        attrib!("peptide_ref", peptide_id, item);
        attrib!("id", ids.item, item);
        sink.element(item, |sink| {
            for evidence_id in evidence_ids.iter() {
                let mut elt = bstart!("PeptideEvidenceRef");
                attrib!("peptideEvidence_ref", evidence_id, elt);
                sink.empty(elt)?;
            }
            write_fragmentation(sink, &fragments)?;

            sink.cv_param(&terms::PSM_SCORE.with_value(psm_validation.score))?;
            sink.cv_param(&terms::PSM_CONFIDENCE.with_value(psm_validation.confidence))?;
            sink.cv_param(&terms::PSM_CONFIDENCE_TYPE.with_value(psm_validation.level))?;
            sink.cv_param(&terms::PEPTIDE_SCORE.with_value(peptide_validation.score))?;
            sink.cv_param(&terms::PEPTIDE_CONFIDENCE.with_value(peptide_validation.confidence))?;
            sink.cv_param(&terms::PEPTIDE_CONFIDENCE_TYPE.with_value(peptide_validation.level))?;
            sink.params(engine_params.iter())?;
            sink.params(ptm_params.iter())?;
            sink.params(engine_user_params.iter())
        })?;

        sink.cv_param(&terms::SPECTRUM_TITLE.with_value(&spectrum_match.title))?;
        if let Some(rt) = info.precursor.retention_time {
            sink.cv_param(&terms::RETENTION_TIME.with_value(rt))?;
        }
        Ok(())
    })
}

/// Write a result for every spectrum match with a best assumption.
///
/// Spectrum matches without one are skipped and counted in the summary.
pub(crate) fn write_spectrum_identification_list<W: Write>(
    sink: &mut XmlSink<W>,
    session: &mut ExportSession<'_>,
    profile: &VersionProfile,
) -> ExportResult {
    let identifications = session.context.identifications;
    let settings = session.settings;
    if let Some(method) = settings.ptm_scoring.probabilistic {
        if !method.is_supported() {
            debug!("{method} site scores are not written, only PhosphoRS is supported");
        }
    }
    session.begin_phase(identifications.count_spectrum_matches());

    let mut elt = bstart!("SpectrumIdentificationList");
    attrib!("id", SPECTRUM_IDENTIFICATION_LIST_ID, elt);
    sink.element(elt, |sink| {
        if settings.include_fragment_ions {
            write_fragmentation_table(sink)?;
        }
        for spectrum_match in identifications.spectrum_matches() {
            session.checkpoint()?;
            let spectrum_match = spectrum_match?;
            match spectrum_match.best_assumption.as_ref() {
                Some(best) => {
                    write_spectrum_result(sink, session, profile, &spectrum_match, best)?;
                    session.summary.spectrum_results += 1;
                }
                None => {
                    debug!(
                        "Skipping spectrum match {} without a best peptide assumption",
                        spectrum_match.key
                    );
                    session.summary.skipped_spectra += 1;
                }
            }
            session.tick();
        }
        sink.cv_param(&terms::FINAL_PSM_LIST)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identification::{FragmentSeries, Ion, NeutralLoss};

    fn b(number: usize, mz: f64) -> IonMatch {
        IonMatch::new(Ion::fragment(FragmentSeries::B, number), 1, mz, mz + 0.01, 100.0)
    }

    #[test]
    fn test_grouping_by_type_and_charge() -> Result<(), ExportError> {
        let matches = vec![
            b(2, 227.10),
            IonMatch::new(Ion::fragment(FragmentSeries::Y, 1), 1, 147.11, 147.11, 50.0),
            b(3, 324.15),
            IonMatch::new(Ion::fragment(FragmentSeries::B, 4), 2, 200.0, 200.0, 10.0),
            b(4, 425.2).with_loss(NeutralLoss::water()),
            IonMatch::new(Ion::Glycan { label: "HexNAc".into() }, 1, 204.08, 204.08, 5.0),
        ];
        let groups = group_ion_matches(matches.into_iter(), "PEPTIDE", 1)?;
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                ("b".to_string(), 1),
                ("y".to_string(), 1),
                ("b".to_string(), 2),
                ("b-H2O".to_string(), 1)
            ]
        );
        let b1 = &groups[&("b".to_string(), 1)];
        assert_eq!(b1.indices, vec![2, 3]);
        assert_eq!(join_values(&b1.indices), "2 3");
        assert!(b1.loss_terms.is_empty());
        assert_eq!(groups[&("b-H2O".to_string(), 1)].loss_terms.len(), 1);
        Ok(())
    }

    #[test]
    fn test_neutral_loss_limit() {
        let matches = vec![b(2, 227.1).with_loss(NeutralLoss::water())];
        let result = group_ion_matches(matches.into_iter(), "PEPTIDE", 0);
        assert!(matches!(
            result,
            Err(ExportError::NeutralLossLimitExceeded {
                found: 1,
                allowed: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_unmapped_ion_losses_are_not_capped() -> Result<(), ExportError> {
        let glycan = IonMatch::new(Ion::Glycan { label: "HexNAc".into() }, 1, 186.07, 186.07, 5.0)
            .with_loss(NeutralLoss::water())
            .with_loss(NeutralLoss::ammonia());
        let groups = group_ion_matches(vec![b(2, 227.1), glycan].into_iter(), "PEPTIDE", 0)?;
        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key(&("b".to_string(), 1)));
        Ok(())
    }
}
