#![allow(dead_code)]
use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use mzidexport::identification::{
    EngineHit, FragmentSeries, Ion, IonMatch, MatchValidationLevel, MemoryAnnotator,
    MemoryIdentifications, NeutralLoss, Peak, PeptideAssumption, PeptideMatch, Peptidoform,
    PrecursorInfo, ProteinGroup, ProteinRecord, PtmScores, SearchEngine, SpectrumFile,
    SpectrumInfo, SpectrumMatch, ValidationParams,
};
use mzidexport::io::{MzIdentMLVersion, MzIdentMLWriter, PrideXMLWriter};
use mzidexport::settings::{
    ModificationDefinition, ModificationPosition, SearchDatabase, SearchParameters,
};
use mzidexport::{ExportError, ExportOutcome, ExportSettings, IdentificationContext, ProgressHandle};

pub const RUN: &str = "run1.mgf";

pub fn confident(score: f64) -> ValidationParams {
    ValidationParams::new(score, 99.5, MatchValidationLevel::Confident)
}

pub fn spectrum_key(title: &str) -> String {
    SpectrumMatch::spectrum_key(RUN, title)
}

pub fn peaks() -> Vec<Peak> {
    vec![
        Peak::new(147.11, 50.0),
        Peak::new(227.10, 100.0),
        Peak::new(324.15, 80.0),
        Peak::new(425.2, 20.0),
    ]
}

fn spectrum_info(title: &str, index: usize, mz: f64) -> SpectrumInfo {
    SpectrumInfo {
        file: RUN.to_string(),
        title: title.to_string(),
        index,
        precursor: PrecursorInfo {
            mz,
            intensity: 1.5e6,
            retention_time: Some(120.5 + index as f64),
            charges: vec![2],
        },
    }
}

/// Identification results, their annotations and the settings to export them with
pub struct Fixture {
    pub store: MemoryIdentifications,
    pub annotator: MemoryAnnotator,
    pub settings: ExportSettings,
}

impl Fixture {
    pub fn context(&self) -> IdentificationContext<'_> {
        IdentificationContext::new(&self.store, &self.store, &self.store, &self.annotator)
    }

    pub fn write_mzidentml(
        &self,
        version: MzIdentMLVersion,
    ) -> Result<(ExportOutcome, String), ExportError> {
        let mut writer = MzIdentMLWriter::new(Vec::new(), self.context(), &self.settings, version);
        let outcome = writer.write_document()?;
        let text = String::from_utf8(writer.into_inner()?).unwrap();
        Ok((outcome, text))
    }

    pub fn write_mzidentml_with_progress(
        &self,
        version: MzIdentMLVersion,
        progress: &dyn ProgressHandle,
    ) -> Result<(ExportOutcome, String), ExportError> {
        let mut writer = MzIdentMLWriter::new(Vec::new(), self.context(), &self.settings, version)
            .with_progress(progress);
        let outcome = writer.write_document()?;
        let text = String::from_utf8(writer.into_inner()?).unwrap();
        Ok((outcome, text))
    }

    pub fn write_pride(&self) -> Result<(ExportOutcome, Vec<u8>), ExportError> {
        let mut writer = PrideXMLWriter::new(Vec::new(), self.context(), &self.settings);
        let outcome = writer.write_document()?;
        Ok((outcome, writer.into_inner()?))
    }

    pub fn write_pride_with_progress(
        &self,
        progress: &dyn ProgressHandle,
    ) -> Result<(ExportOutcome, Vec<u8>), ExportError> {
        let mut writer =
            PrideXMLWriter::new(Vec::new(), self.context(), &self.settings).with_progress(progress);
        let outcome = writer.write_document()?;
        Ok((outcome, writer.into_inner()?))
    }
}

fn base_settings() -> ExportSettings {
    let search = SearchParameters {
        database: SearchDatabase {
            name: "UniProt human".to_string(),
            location: "/data/uniprot_human.fasta".to_string(),
            version: Some("2024_01".to_string()),
            decoy_tag: Some("_REVERSED".to_string()),
        },
        search_engines: vec![SearchEngine::Mascot, SearchEngine::XTandem],
        ..Default::default()
    };
    ExportSettings::default().with_search(search)
}

/// One protein, one peptide at its second residue, one validated spectrum match at charge 2
pub fn single_protein() -> Fixture {
    let mut store = MemoryIdentifications::new();
    let key = spectrum_key("scan 1");
    let peptide = Peptidoform::new("PEPTIDE");
    store
        .add_protein(ProteinRecord::new("PROT1", "MPEPTIDEK"))
        .add_peptide(
            PeptideMatch::new("PEPTIDE", peptide.clone())
                .with_protein("PROT1", vec![1])
                .with_spectrum(key.clone()),
            confident(50.0),
        )
        .add_spectrum_match(
            SpectrumMatch::new(RUN, "scan 1")
                .with_best_assumption(PeptideAssumption::new(peptide.clone(), 2, 400.19))
                .with_hit(SearchEngine::Mascot, EngineHit::new(peptide, 2, 0.01)),
            confident(40.0),
        )
        .add_protein_group(
            ProteinGroup::new("G1", "PROT1").with_peptide("PEPTIDE"),
            confident(60.0),
        )
        .add_spectrum_file(SpectrumFile::new(RUN, "/data/run1.mgf"))
        .add_spectrum(spectrum_info("scan 1", 0, 400.19), peaks());
    Fixture {
        store,
        annotator: MemoryAnnotator::new(),
        settings: base_settings(),
    }
}

/// Three proteins in two groups, a peptide shared by two proteins, a modified
/// peptide with localization scores, annotated fragment ions and a spectrum
/// match without a best assumption.
pub fn two_groups() -> Fixture {
    let mut store = MemoryIdentifications::new();
    let mut annotator = MemoryAnnotator::new();

    let (s1, s2, s3) = (
        spectrum_key("scan 1"),
        spectrum_key("scan 2"),
        spectrum_key("scan 3"),
    );
    let shared = Peptidoform::new("PEPTIDE");
    let modified = Peptidoform::new("SAMPLER")
        .with_modification("Acetyl", 1)
        .with_modification("Phospho", 1)
        .with_modification("Oxidation", 3)
        .with_modification("Amidated", 7);
    let other = Peptidoform::new("PEPTLDE");

    store
        .add_protein(ProteinRecord::new("PROT1", "MPEPTIDEK").with_description("Kinase & <regulator>"))
        .add_protein(ProteinRecord::new("PROT2", "AAAAPEPTIDER"))
        .add_protein(ProteinRecord::new("PROT3", "MKSAMPLERK").as_decoy())
        .add_peptide(
            PeptideMatch::new("PEPTIDE", shared.clone())
                .with_protein("PROT1", vec![1])
                .with_protein("PROT2", vec![4])
                .with_spectrum(s1.clone())
                .with_spectrum(s2.clone()),
            confident(50.0),
        )
        .add_peptide(
            PeptideMatch::new("SAMPLER_mod", modified.clone())
                .with_protein("PROT3", vec![2])
                .with_spectrum(s3.clone()),
            ValidationParams::new(20.0, 80.0, MatchValidationLevel::Doubtful),
        )
        .add_spectrum_match(
            SpectrumMatch::new(RUN, "scan 1")
                .with_best_assumption(PeptideAssumption::new(shared.clone(), 2, 400.19))
                .with_hit(SearchEngine::Mascot, EngineHit::new(shared.clone(), 2, 0.05).with_raw_score(30.0))
                .with_hit(SearchEngine::Mascot, EngineHit::new(shared.clone(), 2, 0.01).with_raw_score(42.0))
                .with_hit(SearchEngine::Mascot, EngineHit::new(other.clone(), 2, 0.001))
                .with_hit(SearchEngine::XTandem, EngineHit::new(shared.clone(), 2, 0.2))
                .with_hit(SearchEngine::Other("Sage".to_string()), EngineHit::new(shared.clone(), 2, 0.3)),
            confident(40.0),
        )
        .add_spectrum_match(
            SpectrumMatch::new(RUN, "scan 2")
                .with_best_assumption(PeptideAssumption::new(shared.clone(), 3, 267.13))
                .with_hit(SearchEngine::XTandem, EngineHit::new(shared.clone(), 3, 0.02)),
            ValidationParams::new(5.0, 60.0, MatchValidationLevel::Doubtful),
        )
        .add_spectrum_match(
            SpectrumMatch::new(RUN, "scan 3")
                .with_best_assumption(PeptideAssumption::new(modified.clone(), 2, 478.2))
                .with_hit(SearchEngine::Mascot, EngineHit::new(modified, 2, 0.004)),
            confident(35.0),
        )
        .add_spectrum_match(
            SpectrumMatch::new(RUN, "scan 4")
                .with_hit(SearchEngine::Mascot, EngineHit::new(other, 2, 2.5)),
            ValidationParams::new(0.0, 0.0, MatchValidationLevel::NotValidated),
        )
        .add_ptm_scores(
            s3.clone(),
            PtmScores::new()
                .with_site("Phospho", 1, 100.0, Some(99.0))
                .with_site("Phospho", 2, 0.0, Some(1.0)),
        )
        .add_protein_group(
            ProteinGroup::new("G1", "PROT1")
                .with_member("PROT2")
                .with_peptide("PEPTIDE"),
            confident(60.0),
        )
        .add_protein_group(
            ProteinGroup::new("G2", "PROT3").with_peptide("SAMPLER_mod"),
            ValidationParams::new(1.0, 10.0, MatchValidationLevel::NotValidated),
        )
        .add_spectrum_file(SpectrumFile::new(RUN, "/data/run1.mgf"))
        .add_spectrum(spectrum_info("scan 1", 0, 400.19), peaks())
        .add_spectrum(spectrum_info("scan 2", 1, 267.13), peaks())
        .add_spectrum(spectrum_info("scan 3", 2, 478.2), peaks())
        .add_spectrum(spectrum_info("scan 4", 3, 512.3), peaks());

    annotator.add_matches(
        s1,
        vec![
            IonMatch::new(Ion::fragment(FragmentSeries::B, 2), 1, 227.1026, 227.10, 100.0),
            IonMatch::new(Ion::fragment(FragmentSeries::Y, 1), 1, 148.0604, 147.11, 50.0),
            IonMatch::new(Ion::fragment(FragmentSeries::B, 3), 1, 324.1554, 324.15, 80.0),
            IonMatch::new(Ion::fragment(FragmentSeries::B, 4), 2, 213.0, 213.01, 10.0),
            IonMatch::new(Ion::fragment(FragmentSeries::B, 4), 1, 407.19, 407.2, 20.0)
                .with_loss(NeutralLoss::water()),
            IonMatch::new(
                Ion::Glycan {
                    label: "HexNAc".to_string(),
                },
                1,
                204.087,
                204.09,
                5.0,
            ),
        ],
    );

    let mut settings = base_settings();
    settings.search.modifications = vec![
        ModificationDefinition::new("Oxidation", 15.994915)
            .on_residues("M")
            .with_unimod(35, "Oxidation"),
        ModificationDefinition::new("Acetyl", 42.010565)
            .at(ModificationPosition::PeptideNTerm)
            .with_unimod(1, "Acetyl"),
        ModificationDefinition::new("Phospho", 79.966331)
            .on_residues("STY")
            .with_unimod(21, "Phospho"),
        ModificationDefinition::new("Phospho (alt)", 79.966331).on_residues("H"),
        ModificationDefinition::new("Amidated", -0.984016)
            .at(ModificationPosition::PeptideCTerm)
            .with_unimod(2, "Amidated"),
    ];

    Fixture {
        store,
        annotator,
        settings,
    }
}

/// An element read back from a written document
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub depth: usize,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|s| s.as_str())
    }

    fn from_start(start: &BytesStart<'_>, depth: usize) -> Self {
        let mut attributes = HashMap::new();
        for attr in start.attributes() {
            let attr = attr.unwrap();
            attributes.insert(
                String::from_utf8(attr.key.as_ref().to_vec()).unwrap(),
                attr.unescape_value().unwrap().to_string(),
            );
        }
        Self {
            name: String::from_utf8(start.name().as_ref().to_vec()).unwrap(),
            attributes,
            text: String::new(),
            depth,
        }
    }
}

/// Parse a whole document, failing on any well-formedness error
pub fn parse_document(text: &str) -> Vec<Element> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);
    let mut elements: Vec<Element> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => {
                elements.push(Element::from_start(&e, open.len()));
                open.push(elements.len() - 1);
            }
            Event::Empty(e) => {
                elements.push(Element::from_start(&e, open.len()));
            }
            Event::Text(t) => {
                if let Some(i) = open.last() {
                    elements[*i].text.push_str(&t.unescape().unwrap());
                }
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    assert!(open.is_empty(), "{} elements were never closed", open.len());
    elements
}

pub fn named<'a>(elements: &'a [Element], name: &str) -> Vec<&'a Element> {
    elements.iter().filter(|e| e.name == name).collect()
}

/// The `cvParam`s with the given accession
pub fn cv_params<'a>(elements: &'a [Element], accession: &str) -> Vec<&'a Element> {
    elements
        .iter()
        .filter(|e| e.name == "cvParam" && e.attr("accession") == Some(accession))
        .collect()
}
