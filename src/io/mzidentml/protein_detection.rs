use std::io::Write;

use log::debug;

use crate::identification::{PeptideMatch, ProteinGroup, ValidationParams};
use crate::io::xml::{attrib, bstart};
use crate::io::{ExportError, ExportResult, ExportSession, XmlSink};
use crate::terms;

use super::PROTEIN_DETECTION_LIST_ID;

/// A peptide evidence of a group member and the items identifying its peptide
struct Hypothesis {
    evidence_id: String,
    items: Vec<String>,
}

fn member_hypotheses(
    session: &ExportSession<'_>,
    accession: &str,
    peptides: &[PeptideMatch],
) -> Result<Vec<Hypothesis>, ExportError> {
    let mut hypotheses = Vec::new();
    for peptide_match in peptides {
        for offset in peptide_match.offsets_in(accession) {
            let evidence_id = session
                .registry
                .peptide_evidence(accession, *offset, &peptide_match.key)?
                .to_string();
            let items = session
                .registry
                .spectrum_items_for_peptide(&peptide_match.key)
                .to_vec();
            if items.is_empty() {
                continue;
            }
            hypotheses.push(Hypothesis { evidence_id, items });
        }
    }
    Ok(hypotheses)
}

/// Write the ambiguity group of `group`. Members without a peptide hypothesis
/// are left out, and so is a group none of whose members has one. Returns
/// whether the group was written.
fn write_protein_group<W: Write>(
    sink: &mut XmlSink<W>,
    session: &ExportSession<'_>,
    group_number: usize,
    group: &ProteinGroup,
    validation: &ValidationParams,
) -> Result<bool, ExportError> {
    let context = session.context;
    let mut peptides = Vec::with_capacity(group.peptide_keys.len());
    for peptide_key in group.peptide_keys.iter() {
        peptides.push(context.identifications.peptide_match(peptide_key)?);
    }

    let mut members = Vec::with_capacity(group.accessions.len());
    for accession in group.accessions.iter() {
        let hypotheses = member_hypotheses(session, accession, &peptides)?;
        if hypotheses.is_empty() {
            debug!("Protein {accession} of group {} has no identified spectra", group.key);
        } else {
            members.push((accession, hypotheses));
        }
    }
    if members.is_empty() {
        return Ok(false);
    }

    let mut elt = bstart!("ProteinAmbiguityGroup");
    attrib!("id", format!("PAG_{group_number}"), elt);
    sink.element(elt, |sink| {
        for (member_number, (accession, hypotheses)) in members.iter().enumerate() {
            let mut elt = bstart!("ProteinDetectionHypothesis");
            attrib!("passThreshold", validation.is_validated().to_string(), elt);
            attrib!("dBSequence_ref", accession, elt);
            attrib!("id", format!("PAG_{group_number}_{}", member_number + 1), elt);
            sink.element(elt, |sink| {
                for hypothesis in hypotheses.iter() {
                    let mut elt = bstart!("PeptideHypothesis");
                    attrib!("peptideEvidence_ref", hypothesis.evidence_id, elt);
                    sink.element(elt, |sink| {
                        for item in hypothesis.items.iter() {
                            let mut elt = bstart!("SpectrumIdentificationItemRef");
                            attrib!("spectrumIdentificationItem_ref", item, elt);
                            sink.empty(elt)?;
                        }
                        Ok(())
                    })?;
                }

                if group.is_leading(accession) {
                    let protein = context.sequences.protein(accession)?;
                    let coverage = protein.sequence_coverage(peptides.iter().flat_map(|p| {
                        let length = p.peptide.len();
                        p.offsets_in(accession).iter().map(move |offset| (*offset, length))
                    }));
                    sink.cv_param(&terms::GROUP_REPRESENTATIVE)?;
                    sink.cv_param(&terms::LEADING_PROTEIN)?;
                    sink.cv_param(&terms::SEQUENCE_COVERAGE.with_value(coverage))?;
                } else {
                    sink.cv_param(&terms::NON_LEADING_PROTEIN)?;
                }
                Ok(())
            })?;
        }

        sink.cv_param(&terms::PROTEIN_GROUP_SCORE.with_value(validation.score))?;
        sink.cv_param(&terms::PROTEIN_GROUP_CONFIDENCE.with_value(validation.confidence))?;
        sink.cv_param(&terms::PROTEIN_CONFIDENCE_TYPE.with_value(validation.level))?;
        sink.cv_param(&terms::GROUP_PASSES_THRESHOLD.with_value(validation.is_validated()))
    })?;
    Ok(true)
}

/// Write one ambiguity group per protein group, then the number of validated groups.
///
/// Every peptide evidence a hypothesis cites must have been written in the
/// sequence collection.
pub(crate) fn write_protein_detection_list<W: Write>(
    sink: &mut XmlSink<W>,
    session: &mut ExportSession<'_>,
) -> ExportResult {
    let identifications = session.context.identifications;
    session.begin_phase(identifications.count_protein_groups());

    let mut elt = bstart!("ProteinDetectionList");
    attrib!("id", PROTEIN_DETECTION_LIST_ID, elt);
    sink.element(elt, |sink| {
        let mut validated = 0usize;
        for group in identifications.protein_groups() {
            session.checkpoint()?;
            let group = group?;
            let validation = identifications.protein_group_validation(&group.key)?;
            let group_number = session.summary.protein_groups + 1;
            if write_protein_group(sink, session, group_number, &group, &validation)? {
                if validation.is_validated() {
                    validated += 1;
                }
                session.summary.protein_groups += 1;
            } else {
                debug!("Skipping protein group {} without identified spectra", group.key);
                session.summary.skipped_protein_groups += 1;
            }
            session.tick();
        }
        sink.cv_param(&terms::IDENTIFIED_PROTEIN_COUNT.with_value(validated))
    })
}
