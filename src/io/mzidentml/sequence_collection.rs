use std::io::Write;

use crate::identification::{ModificationOccurrence, Peptidoform};
use crate::io::xml::{attrib, bstart};
use crate::io::{ExportError, ExportResult, ExportSession, XmlSink};
use crate::settings::SearchParameters;
use crate::terms;

use super::SEARCH_DATABASE_ID;

/// Write the proteins, the peptides and every occurrence of a peptide in a protein.
///
/// Registers the identifier of every peptide and peptide evidence, and which
/// peptide each spectrum supports.
pub(crate) fn write_sequence_collection<W: Write>(
    sink: &mut XmlSink<W>,
    session: &mut ExportSession<'_>,
) -> ExportResult {
    sink.element(bstart!("SequenceCollection"), |sink| {
        write_db_sequences(sink, session)?;
        write_peptides(sink, session)?;
        write_peptide_evidences(sink, session)
    })
}

fn write_db_sequences<W: Write>(sink: &mut XmlSink<W>, session: &mut ExportSession<'_>) -> ExportResult {
    let sequences = session.context.sequences;
    let include_sequences = session.settings.include_protein_sequences;
    let accessions = sequences.accessions();
    session.begin_phase(accessions.len());
    for accession in accessions.iter() {
        session.checkpoint()?;
        let protein = sequences.protein(accession)?;
        let mut elt = bstart!("DBSequence");
        attrib!("id", protein.accession, elt);
        attrib!("accession", protein.accession, elt);
        attrib!("searchDatabase_ref", SEARCH_DATABASE_ID, elt);
        attrib!("length", protein.len().to_string(), elt);
        sink.element(elt, |sink| {
            if include_sequences {
                sink.simple("Seq", &protein.sequence)?;
            }
            if let Some(description) = protein.description.as_ref() {
                sink.cv_param(&terms::PROTEIN_DESCRIPTION.with_value(description))?;
            }
            Ok(())
        })?;
        session.summary.proteins += 1;
        session.tick();
    }
    Ok(())
}

fn write_modification<W: Write>(
    sink: &mut XmlSink<W>,
    search: &SearchParameters,
    peptide: &Peptidoform,
    occurrence: &ModificationOccurrence,
) -> ExportResult {
    let definition = search
        .modification(&occurrence.name)
        .ok_or_else(|| ExportError::UnknownModification(occurrence.name.clone()))?;
    let location = definition.location(occurrence.site, peptide.len());
    let mut elt = bstart!("Modification");
    attrib!("monoisotopicMassDelta", definition.mass.to_string(), elt);
    attrib!("location", location.to_string(), elt);
    if (1..=peptide.len()).contains(&location) {
        if let Some(residue) = peptide.sequence.chars().nth(location - 1) {
            attrib!("residues", residue.to_string(), elt);
        }
    }
    sink.element(elt, |sink| sink.cv_param(&definition.cv_term()))
}

fn write_peptides<W: Write>(sink: &mut XmlSink<W>, session: &mut ExportSession<'_>) -> ExportResult {
    let identifications = session.context.identifications;
    let settings = session.settings;
    session.begin_phase(identifications.count_peptide_matches());
    for peptide_match in identifications.peptide_matches() {
        session.checkpoint()?;
        let peptide_match = peptide_match?;
        let peptide_id = session.registry.register_peptide(&peptide_match.key).to_string();
        for spectrum_key in peptide_match.spectrum_keys.iter() {
            session
                .registry
                .map_spectrum_to_peptide(spectrum_key, &peptide_match.key);
        }

        let peptide = &peptide_match.peptide;
        let mut elt = bstart!("Peptide");
        attrib!("id", peptide_id, elt);
        sink.element(elt, |sink| {
            sink.simple("PeptideSequence", &peptide.sequence)?;
            for occurrence in peptide.modifications.iter() {
                write_modification(sink, &settings.search, peptide, occurrence)?;
            }
            Ok(())
        })?;
        session.summary.peptides += 1;
        session.tick();
    }
    Ok(())
}

fn write_peptide_evidences<W: Write>(sink: &mut XmlSink<W>, session: &mut ExportSession<'_>) -> ExportResult {
    let identifications = session.context.identifications;
    let sequences = session.context.sequences;
    session.begin_phase(identifications.count_peptide_matches());
    for peptide_match in identifications.peptide_matches() {
        session.checkpoint()?;
        let peptide_match = peptide_match?;
        let peptide_id = session.registry.peptide_id(&peptide_match.key)?.to_string();
        let length = peptide_match.peptide.len();
        for (accession, offset) in peptide_match.occurrences() {
            let protein = sequences.protein(accession)?;
            let (pre, post) = protein.flanking_residues(offset, length);
            let evidence_id = session
                .registry
                .register_peptide_evidence(accession, offset, &peptide_match.key)
                .to_string();
            let mut elt = bstart!("PeptideEvidence");
            attrib!("isDecoy", protein.is_decoy.to_string(), elt);
            attrib!("pre", pre.to_string(), elt);
            attrib!("post", post.to_string(), elt);
            attrib!("start", (offset + 1).to_string(), elt);
            attrib!("end", (offset + length).to_string(), elt);
            attrib!("peptide_ref", peptide_id, elt);
            attrib!("dBSequence_ref", accession, elt);
            attrib!("id", evidence_id, elt);
            sink.empty(elt)?;
            session.summary.peptide_evidences += 1;
        }
        session.tick();
    }
    Ok(())
}
