use std::cell::Cell;
use std::fs;
use std::io::Read;

use flate2::read::GzDecoder;

use mzidexport::identification::{
    EntityIter, IdentificationSource, MemoryAnnotator, MemoryIdentifications, PeptideAssumption,
    PeptideMatch, Peptidoform, ProteinGroup, ProteinRecord, PtmScores, SearchEngine, SourceResult,
    SpectrumMatch, ValidationParams,
};
use mzidexport::io::mzidentml::create_file;
use mzidexport::settings::{
    ContactInfo, Digestion, Organization, OutputCompression, ProbabilisticPtmScore,
};
use mzidexport::{
    CancellationToken, ExportError, ExportOutcome, IdentificationContext, MzIdentMLVersion,
    MzIdentMLWriter,
};

mod common;

use common::{confident, cv_params, named, parse_document, single_protein, two_groups, Element};

fn values<'a>(elements: &[&'a Element]) -> Vec<&'a str> {
    elements.iter().filter_map(|e| e.attr("value")).collect()
}

#[test_log::test]
fn test_single_protein_document() -> Result<(), ExportError> {
    let fixture = single_protein();
    let (outcome, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let summary = *outcome.summary().unwrap();
    assert_eq!(summary.proteins, 1);
    assert_eq!(summary.peptides, 1);
    assert_eq!(summary.peptide_evidences, 1);
    assert_eq!(summary.spectrum_results, 1);
    assert_eq!(summary.protein_groups, 1);

    let elements = parse_document(&text);
    let root = &elements[0];
    assert_eq!(root.name, "MzIdentML");
    assert_eq!(root.attr("version"), Some("1.2.0"));

    let sequences = named(&elements, "DBSequence");
    assert_eq!(sequences.len(), 1);
    assert_eq!(sequences[0].attr("id"), Some("PROT1"));
    assert_eq!(sequences[0].attr("length"), Some("9"));

    let peptides = named(&elements, "Peptide");
    assert_eq!(peptides.len(), 1);
    let peptide_sequences = named(&elements, "PeptideSequence");
    assert_eq!(peptide_sequences.len(), 1);
    assert_eq!(peptide_sequences[0].text, "PEPTIDE");

    let evidences = named(&elements, "PeptideEvidence");
    assert_eq!(evidences.len(), 1);
    let evidence = evidences[0];
    assert_eq!(evidence.attr("start"), Some("2"));
    assert_eq!(evidence.attr("end"), Some("8"));
    assert_eq!(evidence.attr("pre"), Some("M"));
    assert_eq!(evidence.attr("post"), Some("K"));
    assert_eq!(evidence.attr("peptide_ref"), peptides[0].attr("id"));

    let items = named(&elements, "SpectrumIdentificationItem");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].attr("chargeState"), Some("2"));
    assert_eq!(items[0].attr("passThreshold"), Some("true"));
    let refs = named(&elements, "PeptideEvidenceRef");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].attr("peptideEvidence_ref"), evidence.attr("id"));
    Ok(())
}

#[test_log::test]
fn test_documents_are_balanced() -> Result<(), ExportError> {
    let mut fixture = two_groups();
    let (outcome, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    assert!(outcome.is_complete());
    assert!(text.trim_end().ends_with("</MzIdentML>"));
    parse_document(&text);

    fixture.annotator = MemoryAnnotator::new();
    let (outcome, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_1)?;
    assert!(outcome.is_complete());
    let elements = parse_document(&text);
    assert_eq!(elements[0].attr("version"), Some("1.1.0"));
    assert_eq!(
        elements[0].attr("xmlns"),
        Some("http://psidev.info/psi/pi/mzIdentML/1.1")
    );
    Ok(())
}

#[test]
fn test_shared_peptide_evidences() -> Result<(), ExportError> {
    let fixture = two_groups();
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);
    let evidences = named(&elements, "PeptideEvidence");
    assert_eq!(evidences.len(), 3);

    let prot1 = evidences
        .iter()
        .find(|e| e.attr("dBSequence_ref") == Some("PROT1"))
        .unwrap();
    let prot2 = evidences
        .iter()
        .find(|e| e.attr("dBSequence_ref") == Some("PROT2"))
        .unwrap();
    assert_ne!(prot1.attr("id"), prot2.attr("id"));
    assert_eq!(prot1.attr("peptide_ref"), prot2.attr("peptide_ref"));
    assert_eq!(prot2.attr("start"), Some("5"));
    assert_eq!(prot2.attr("end"), Some("11"));
    assert_eq!(prot2.attr("pre"), Some("A"));
    assert_eq!(prot2.attr("post"), Some("R"));

    let prot3 = evidences
        .iter()
        .find(|e| e.attr("dBSequence_ref") == Some("PROT3"))
        .unwrap();
    assert_eq!(prot3.attr("isDecoy"), Some("true"));
    assert_eq!(prot1.attr("isDecoy"), Some("false"));
    Ok(())
}

#[test]
fn test_references_resolve() -> Result<(), ExportError> {
    let fixture = two_groups();
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);

    let evidence_ids: Vec<_> = named(&elements, "PeptideEvidence")
        .iter()
        .filter_map(|e| e.attr("id"))
        .collect();
    let item_ids: Vec<_> = named(&elements, "SpectrumIdentificationItem")
        .iter()
        .filter_map(|e| e.attr("id"))
        .collect();

    let hypotheses = named(&elements, "PeptideHypothesis");
    assert_eq!(hypotheses.len(), 3);
    for hypothesis in hypotheses {
        assert!(evidence_ids.contains(&hypothesis.attr("peptideEvidence_ref").unwrap()));
    }
    let item_refs = named(&elements, "SpectrumIdentificationItemRef");
    assert_eq!(item_refs.len(), 5);
    for item_ref in item_refs {
        assert!(item_ids.contains(&item_ref.attr("spectrumIdentificationItem_ref").unwrap()));
    }
    for evidence_ref in named(&elements, "PeptideEvidenceRef") {
        assert!(evidence_ids.contains(&evidence_ref.attr("peptideEvidence_ref").unwrap()));
    }
    Ok(())
}

#[test]
fn test_protein_groups() -> Result<(), ExportError> {
    let fixture = two_groups();
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);

    let groups = named(&elements, "ProteinAmbiguityGroup");
    assert_eq!(groups.len(), 2);
    let hypotheses: Vec<_> = named(&elements, "ProteinDetectionHypothesis")
        .iter()
        .map(|e| (e.attr("id").unwrap(), e.attr("dBSequence_ref").unwrap()))
        .collect();
    assert_eq!(
        hypotheses,
        vec![("PAG_1_1", "PROT1"), ("PAG_1_2", "PROT2"), ("PAG_2_1", "PROT3")]
    );
    assert_eq!(cv_params(&elements, "MS:1002401").len(), 2);
    assert_eq!(cv_params(&elements, "MS:1002402").len(), 1);
    assert_eq!(cv_params(&elements, "MS:1001093").len(), 2);
    assert_eq!(values(&cv_params(&elements, "MS:1002415")), vec!["true", "false"]);
    assert_eq!(values(&cv_params(&elements, "MS:1002404")), vec!["1"]);
    Ok(())
}

#[test]
fn test_modification_locations() -> Result<(), ExportError> {
    let fixture = two_groups();
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);

    let modifications = named(&elements, "Modification");
    let locations: Vec<_> = modifications
        .iter()
        .map(|e| (e.attr("location").unwrap(), e.attr("residues")))
        .collect();
    assert_eq!(
        locations,
        vec![
            ("0", None),
            ("1", Some("S")),
            ("3", Some("M")),
            ("8", None),
        ]
    );
    assert_eq!(modifications[2].attr("monoisotopicMassDelta"), Some("15.994915"));
    Ok(())
}

#[test]
fn test_modification_index() -> Result<(), ExportError> {
    let fixture = two_groups();
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);

    let mut indices = Vec::new();
    let mut mass = None;
    for element in elements.iter() {
        if element.name == "SearchModification" {
            mass = element.attr("massDelta");
        } else if element.attr("accession") == Some("MS:1002504") {
            indices.push((mass.unwrap(), element.attr("value").unwrap()));
        }
    }
    assert_eq!(
        indices,
        vec![
            ("15.994915", "0"),
            ("42.010565", "1"),
            ("79.966331", "2"),
            ("79.966331", "2"),
            ("-0.984016", "3"),
        ]
    );
    assert_eq!(values(&cv_params(&elements, "MS:1002536")), vec!["2:100:1:true"]);
    assert!(cv_params(&elements, "MS:1001971").is_empty());
    assert_eq!(cv_params(&elements, "MS:1002491").len(), 1);
    assert_eq!(cv_params(&elements, "MS:1002492").len(), 1);
    Ok(())
}

#[test]
fn test_localization_scores() -> Result<(), ExportError> {
    let mut fixture = two_groups();
    fixture.settings.ptm_scoring.probabilistic = Some(ProbabilisticPtmScore::PhosphoRs);
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);
    assert_eq!(
        values(&cv_params(&elements, "MS:1001971")),
        vec!["2:99:1:true", "2:1:2:false"]
    );

    fixture.settings.ptm_scoring.probabilistic = Some(ProbabilisticPtmScore::AScore);
    fixture.annotator = MemoryAnnotator::new();
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_1)?;
    let elements = parse_document(&text);
    assert!(cv_params(&elements, "MS:1001971").is_empty());
    assert!(cv_params(&elements, "MS:1002504").is_empty());
    assert!(cv_params(&elements, "MS:1002491").is_empty());
    assert_eq!(values(&cv_params(&elements, "MS:1002536")), vec!["100:1:true"]);
    Ok(())
}

#[test]
fn test_fragmentation() -> Result<(), ExportError> {
    let fixture = two_groups();
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);

    assert_eq!(named(&elements, "Measure").len(), 3);
    let ion_types: Vec<_> = named(&elements, "IonType")
        .iter()
        .map(|e| (e.attr("charge").unwrap(), e.attr("index").unwrap()))
        .collect();
    assert_eq!(ion_types, vec![("1", "2 3"), ("1", "1"), ("2", "4"), ("1", "4")]);
    assert_eq!(named(&elements, "FragmentArray").len(), 12);
    assert_eq!(named(&elements, "FragmentArray")[0].attr("values"), Some("227.1 324.15"));
    assert_eq!(cv_params(&elements, "MS:1001224").len(), 3);
    assert_eq!(cv_params(&elements, "MS:1001220").len(), 1);
    assert_eq!(cv_params(&elements, "MS:1001522").len(), 1);
    Ok(())
}

#[test]
fn test_fragment_ions_disabled() -> Result<(), ExportError> {
    let mut fixture = two_groups();
    fixture.settings = fixture.settings.with_fragment_ions(false);
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_1)?;
    let elements = parse_document(&text);
    assert!(named(&elements, "FragmentationTable").is_empty());
    assert!(named(&elements, "IonType").is_empty());
    Ok(())
}

#[test_log::test]
fn test_neutral_loss_cap() {
    let fixture = two_groups();
    let result = fixture.write_mzidentml(MzIdentMLVersion::V1_1);
    match result {
        Err(ExportError::NeutralLossLimitExceeded { ion, found, allowed }) => {
            assert_eq!(ion, "b-H2O");
            assert_eq!(found, 1);
            assert_eq!(allowed, 0);
        }
        other => panic!("Expected the neutral loss cap to be enforced, got {other:?}"),
    }
}

#[test]
fn test_best_engine_scores() -> Result<(), ExportError> {
    let fixture = two_groups();
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);

    assert_eq!(values(&cv_params(&elements, "MS:1001172")), vec!["0.01", "0.004"]);
    assert_eq!(values(&cv_params(&elements, "MS:1001330")), vec!["0.2", "0.02"]);
    assert_eq!(values(&cv_params(&elements, "MS:1001171")), vec!["42"]);
    let sage: Vec<_> = named(&elements, "userParam")
        .into_iter()
        .filter(|e| e.attr("name") == Some("Sage e-value"))
        .collect();
    assert_eq!(sage.len(), 1);
    assert_eq!(sage[0].attr("value"), Some("0.3"));
    Ok(())
}

#[test_log::test]
fn test_spectrum_without_assumption_is_skipped() -> Result<(), ExportError> {
    let fixture = two_groups();
    let (outcome, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let summary = outcome.summary().copied().unwrap();
    assert_eq!(summary.spectrum_results, 3);
    assert_eq!(summary.skipped_spectra, 1);

    let elements = parse_document(&text);
    let results: Vec<_> = named(&elements, "SpectrumIdentificationResult")
        .iter()
        .map(|e| e.attr("spectrumID").unwrap())
        .collect();
    assert_eq!(results, vec!["index=0", "index=1", "index=2"]);
    assert_eq!(values(&cv_params(&elements, "MS:1000796")), vec!["scan 1", "scan 2", "scan 3"]);
    assert_eq!(cv_params(&elements, "MS:1002439").len(), 1);
    Ok(())
}

#[test]
fn test_values_are_escaped() -> Result<(), ExportError> {
    let fixture = two_groups();
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    assert!(text.contains("Kinase &amp; &lt;regulator&gt;"));
    assert!(!text.contains("Kinase & <regulator>"));
    let elements = parse_document(&text);
    assert_eq!(values(&cv_params(&elements, "MS:1001088")), vec!["Kinase & <regulator>"]);
    Ok(())
}

#[test]
fn test_protocol_and_inputs() -> Result<(), ExportError> {
    let fixture = two_groups();
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);

    let software: Vec<_> = named(&elements, "AnalysisSoftware")
        .iter()
        .map(|e| e.attr("id").unwrap())
        .collect();
    assert_eq!(
        software,
        vec!["ID_software", "ID_software_Mascot", "ID_software_XTandem"]
    );
    assert_eq!(named(&elements, "SearchModification").len(), 5);
    assert_eq!(cv_params(&elements, "MS:1001251").len(), 1);
    assert_eq!(values(&cv_params(&elements, "MS:1001412")), vec!["0.02", "10"]);
    assert_eq!(values(&cv_params(&elements, "MS:1001283")), vec!["_REVERSED"]);

    let database = named(&elements, "SearchDatabase");
    assert_eq!(database[0].attr("numDatabaseSequences"), Some("3"));
    let spectra_data = named(&elements, "SpectraData");
    assert_eq!(spectra_data.len(), 1);
    assert_eq!(spectra_data[0].attr("id"), Some("SpectraData_1"));
    assert_eq!(spectra_data[0].attr("location"), Some("/data/run1.mgf"));
    assert_eq!(cv_params(&elements, "MS:1001062").len(), 1);
    assert_eq!(named(&elements, "InputSpectra")[0].attr("spectraData_ref"), Some("SpectraData_1"));
    assert!(named(&elements, "AuditCollection").is_empty());
    Ok(())
}

#[test]
fn test_contact_information() -> Result<(), ExportError> {
    let mut fixture = single_protein();
    fixture.settings.software.vendor = Some("CompOmics".to_string());
    fixture.settings = fixture.settings.with_contact(ContactInfo {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.org".to_string(),
        address: "1 Analytical Way".to_string(),
        organization: Organization {
            name: "Engine Works".to_string(),
            email: "info@example.org".to_string(),
            address: "2 Analytical Way".to_string(),
        },
    });
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);

    assert_eq!(named(&elements, "Provider").len(), 1);
    let people = named(&elements, "Person");
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].attr("lastName"), Some("Lovelace"));
    let organizations: Vec<_> = named(&elements, "Organization")
        .iter()
        .map(|e| e.attr("name").unwrap())
        .collect();
    assert_eq!(organizations, vec!["Engine Works", "CompOmics"]);
    assert_eq!(cv_params(&elements, "MS:1001267").len(), 1);
    Ok(())
}

#[test_log::test]
fn test_cancel_during_protein_groups() -> Result<(), ExportError> {
    let fixture = two_groups();
    let token = CancellationToken::new();
    let (outcome, _) = fixture.write_mzidentml_with_progress(MzIdentMLVersion::V1_2, &token)?;
    assert!(outcome.is_complete());
    let total = token.count();
    let groups = 2;

    let token = CancellationToken::cancel_after(total - groups + 1);
    let (outcome, text) = fixture.write_mzidentml_with_progress(MzIdentMLVersion::V1_2, &token)?;
    match outcome {
        ExportOutcome::Cancelled { depth } => assert_eq!(depth, 4),
        ExportOutcome::Complete(_) => panic!("The export should have been cancelled"),
    }
    assert!(text.contains("PAG_1"));
    assert!(!text.contains("PAG_2"));
    assert!(!text.trim_end().ends_with("</MzIdentML>"));
    Ok(())
}

#[test]
fn test_cancel_before_start() -> Result<(), ExportError> {
    let fixture = single_protein();
    let token = CancellationToken::new();
    token.cancel();
    let (outcome, text) = fixture.write_mzidentml_with_progress(MzIdentMLVersion::V1_2, &token)?;
    assert_eq!(outcome, ExportOutcome::Cancelled { depth: 0 });
    assert!(text.is_empty());
    Ok(())
}

#[test]
fn test_unsupported_version() {
    assert!(matches!(
        "1.3".parse::<MzIdentMLVersion>(),
        Err(ExportError::UnsupportedVersion(_))
    ));
    assert_eq!("1.1".parse::<MzIdentMLVersion>().unwrap(), MzIdentMLVersion::V1_1);
}

#[test]
fn test_invalid_digestion() {
    let mut fixture = single_protein();
    fixture.settings.search.digestion = Digestion::Enzymes {
        enzymes: Vec::new(),
        independent: false,
    };
    assert!(matches!(
        fixture.write_mzidentml(MzIdentMLVersion::V1_2),
        Err(ExportError::InvalidDigestion(_))
    ));
}

#[test]
fn test_spectrum_match_without_peptide() {
    let mut fixture = single_protein();
    fixture.store.add_spectrum_match(
        SpectrumMatch::new(common::RUN, "orphan").with_best_assumption(PeptideAssumption::new(
            Peptidoform::new("PEPTIDE"),
            2,
            400.19,
        )),
        confident(1.0),
    );
    match fixture.write_mzidentml(MzIdentMLVersion::V1_2) {
        Err(ExportError::MissingPeptideForSpectrum(key)) => {
            assert_eq!(key, common::spectrum_key("orphan"))
        }
        other => panic!("Expected a missing peptide error, got {other:?}"),
    }
}

#[test]
fn test_unknown_engine_software() -> Result<(), ExportError> {
    let mut fixture = single_protein();
    fixture
        .settings
        .search
        .search_engines
        .push(SearchEngine::Other("Sage".to_string()));
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);
    assert!(named(&elements, "userParam")
        .iter()
        .any(|e| e.attr("name") == Some("Sage")));
    Ok(())
}

#[test]
fn test_create_files() -> Result<(), ExportError> {
    let fixture = two_groups();
    let dir = tempfile::tempdir()?;

    let plain = dir.path().join("results.mzid");
    let outcome = create_file(&plain, fixture.context(), &fixture.settings, MzIdentMLVersion::V1_2, None)?;
    assert!(outcome.is_complete());
    let text = fs::read_to_string(&plain)?;
    assert!(text.starts_with("<?xml"));
    parse_document(&text);

    let compressed = dir.path().join("results.mzid.gz");
    create_file(&compressed, fixture.context(), &fixture.settings, MzIdentMLVersion::V1_2, None)?;
    let mut decoded = String::new();
    GzDecoder::new(fs::File::open(&compressed)?).read_to_string(&mut decoded)?;
    assert_eq!(parse_document(&decoded).len(), parse_document(&text).len());

    let mut settings = fixture.settings.clone();
    settings.compression = OutputCompression::Gzip;
    let forced = dir.path().join("forced.mzid");
    create_file(&forced, fixture.context(), &settings, MzIdentMLVersion::V1_2, None)?;
    let bytes = fs::read(&forced)?;
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    Ok(())
}

#[test_log::test]
fn test_group_without_identified_spectra_is_left_out() -> Result<(), ExportError> {
    let mut fixture = two_groups();
    let peptide = Peptidoform::new("SAMPLER");
    fixture
        .store
        .add_peptide(
            PeptideMatch::new("SAMPLER_mod", peptide)
                .with_protein("PROT3", vec![2])
                .with_spectrum(common::spectrum_key("scan 3")),
            confident(20.0),
        )
        .add_spectrum_match(SpectrumMatch::new(common::RUN, "scan 3"), confident(1.0));
    fixture.annotator = MemoryAnnotator::new();
    let (outcome, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let summary = outcome.summary().copied().unwrap();
    assert_eq!(summary.protein_groups, 1);
    assert_eq!(summary.skipped_protein_groups, 1);

    let elements = parse_document(&text);
    assert_eq!(named(&elements, "ProteinAmbiguityGroup").len(), 1);
    let hypotheses: Vec<_> = named(&elements, "ProteinDetectionHypothesis")
        .iter()
        .map(|e| e.attr("dBSequence_ref").unwrap())
        .collect();
    assert_eq!(hypotheses, vec!["PROT1", "PROT2"]);
    assert_eq!(values(&cv_params(&elements, "MS:1002404")), vec!["1"]);
    Ok(())
}

#[test]
fn test_member_without_identified_spectra_is_left_out() -> Result<(), ExportError> {
    let mut fixture = single_protein();
    fixture
        .store
        .add_protein(ProteinRecord::new("PROT2", "KPEPTIDER"))
        .add_peptide(
            PeptideMatch::new("PEPTIDER", Peptidoform::new("PEPTIDER"))
                .with_protein("PROT2", vec![1])
                .with_spectrum(common::spectrum_key("scan 2")),
            confident(10.0),
        )
        .add_spectrum_match(SpectrumMatch::new(common::RUN, "scan 2"), confident(1.0))
        .add_protein_group(
            ProteinGroup::new("G1", "PROT1")
                .with_member("PROT2")
                .with_peptide("PEPTIDE")
                .with_peptide("PEPTIDER"),
            confident(60.0),
        );
    let (_, text) = fixture.write_mzidentml(MzIdentMLVersion::V1_2)?;
    let elements = parse_document(&text);

    let hypotheses = named(&elements, "ProteinDetectionHypothesis");
    assert_eq!(hypotheses.len(), 1);
    assert_eq!(hypotheses[0].attr("dBSequence_ref"), Some("PROT1"));
    assert_eq!(named(&elements, "PeptideHypothesis").len(), 1);
    Ok(())
}

/// Serves peptide matches faithfully for the first `faithful` lookups, then
/// moves every occurrence one residue along
struct ShiftingIdentifications {
    inner: MemoryIdentifications,
    faithful: Cell<usize>,
}

impl IdentificationSource for ShiftingIdentifications {
    fn protein_groups(&self) -> EntityIter<'_, ProteinGroup> {
        self.inner.protein_groups()
    }

    fn peptide_matches(&self) -> EntityIter<'_, PeptideMatch> {
        self.inner.peptide_matches()
    }

    fn spectrum_matches(&self) -> EntityIter<'_, SpectrumMatch> {
        self.inner.spectrum_matches()
    }

    fn peptide_match(&self, key: &str) -> SourceResult<PeptideMatch> {
        let mut peptide_match = self.inner.peptide_match(key)?;
        match self.faithful.get() {
            0 => {
                for offsets in peptide_match.protein_mapping.values_mut() {
                    offsets.iter_mut().for_each(|offset| *offset += 1);
                }
            }
            n => self.faithful.set(n - 1),
        }
        Ok(peptide_match)
    }

    fn spectrum_match(&self, key: &str) -> SourceResult<SpectrumMatch> {
        self.inner.spectrum_match(key)
    }

    fn psm_validation(&self, spectrum_key: &str) -> SourceResult<ValidationParams> {
        self.inner.psm_validation(spectrum_key)
    }

    fn peptide_validation(&self, peptide_key: &str) -> SourceResult<ValidationParams> {
        self.inner.peptide_validation(peptide_key)
    }

    fn protein_group_validation(&self, group_key: &str) -> SourceResult<ValidationParams> {
        self.inner.protein_group_validation(group_key)
    }

    fn ptm_scores(&self, spectrum_key: &str) -> Option<PtmScores> {
        self.inner.ptm_scores(spectrum_key)
    }
}

#[test_log::test]
fn test_group_citing_unwritten_evidence() -> Result<(), ExportError> {
    let fixture = single_protein();
    let source = ShiftingIdentifications {
        inner: fixture.store.clone(),
        faithful: Cell::new(1),
    };
    let context = IdentificationContext::new(&source, &fixture.store, &fixture.store, &fixture.annotator);
    let mut writer = MzIdentMLWriter::new(Vec::new(), context, &fixture.settings, MzIdentMLVersion::V1_2);
    match writer.write_document() {
        Err(ExportError::MissingPeptideEvidence { accession, start, peptide }) => {
            assert_eq!(accession, "PROT1");
            assert_eq!(start, 2);
            assert_eq!(peptide, "PEPTIDE");
        }
        other => panic!("Expected a missing peptide evidence error, got {other:?}"),
    }
    let text = String::from_utf8(writer.into_inner()?).unwrap();
    assert!(text.contains("<ProteinDetectionList"));
    assert!(!text.contains("<PeptideHypothesis"));
    assert!(!text.contains("<ProteinAmbiguityGroup"));
    Ok(())
}
