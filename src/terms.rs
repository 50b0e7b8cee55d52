//! Named vocabulary terms written by the exporters.
use crate::params::{ControlledVocabulary, ParamCow, Unit};

macro_rules! ms_term {
    ($id:ident, $name:literal, $acc:literal) => {
        pub const $id: ParamCow<'static> = ControlledVocabulary::MS.const_param_ident($name, $acc);
    };
    ($id:ident, $name:literal, $acc:literal, $unit:expr) => {
        pub const $id: ParamCow<'static> =
            ControlledVocabulary::MS.const_param_ident_unit($name, $acc, $unit);
    };
}

macro_rules! pride_term {
    ($id:ident, $name:literal, $acc:literal) => {
        pub const $id: ParamCow<'static> =
            ControlledVocabulary::PRIDE.const_param_ident($name, $acc);
    };
}

macro_rules! psi_term {
    ($id:ident, $name:literal, $acc:literal) => {
        pub const $id: ParamCow<'static> = ControlledVocabulary::PSI.const_param_ident($name, $acc);
    };
}

// Software and contacts
ms_term!(PEPTIDESHAKER, "PeptideShaker", 1002458);
ms_term!(SOFTWARE_VENDOR, "software vendor", 1001267);
ms_term!(RESEARCHER, "researcher", 1001271);
ms_term!(CONTACT_EMAIL, "contact email", 1000589);
ms_term!(CONTACT_ADDRESS, "contact address", 1000587);

// Sequences
ms_term!(PROTEIN_DESCRIPTION, "protein description", 1001088);
ms_term!(UNKNOWN_MODIFICATION, "unknown modification", 1001460);

// Protocol
ms_term!(MS_MS_SEARCH, "ms-ms search", 1001083);
ms_term!(PARENT_MASS_TYPE_MONO, "parent mass type mono", 1001211);
ms_term!(FRAGMENT_MASS_TYPE_MONO, "fragment mass type mono", 1001256);
ms_term!(CONSENSUS_SCORING, "consensus scoring", 1002492);
ms_term!(MODIFICATION_LOCALIZATION_SCORING, "modification localization scoring", 1002491);
ms_term!(MODIFICATION_INDEX, "modification index", 1002504);
ms_term!(SPECIFICITY_PEPTIDE_N_TERM, "modification specificity peptide N-term", 1001189);
ms_term!(SPECIFICITY_PEPTIDE_C_TERM, "modification specificity peptide C-term", 1001190);
ms_term!(SPECIFICITY_PROTEIN_N_TERM, "modification specificity protein N-term", 1002057);
ms_term!(SPECIFICITY_PROTEIN_C_TERM, "modification specificity protein C-term", 1002058);
ms_term!(UNSPECIFIC_CLEAVAGE, "unspecific cleavage", 1001956);
ms_term!(NO_CLEAVAGE, "no cleavage", 1001955);
ms_term!(TOLERANCE_PLUS, "search tolerance plus value", 1001412);
ms_term!(TOLERANCE_MINUS, "search tolerance minus value", 1001413);
ms_term!(PSM_FDR_THRESHOLD, "PSM-level global FDR", 1002350);
ms_term!(PEPTIDE_FDR_THRESHOLD, "peptide sequence-level global FDR", 1001364);
ms_term!(PROTEIN_GROUP_FDR_THRESHOLD, "protein group-level global FDR", 1002369);

// Inputs
ms_term!(FASTA_FORMAT, "FASTA format", 1001348);
ms_term!(DATABASE_TYPE_AMINO_ACID, "database type amino acid", 1001073);
ms_term!(TARGET_DECOY_COMPOSITION, "DB composition target+decoy", 1001197);
ms_term!(DECOY_ACCESSION_REGEXP, "decoy DB accession regexp", 1001283);
ms_term!(MGF_FORMAT, "Mascot MGF format", 1001062);
ms_term!(MZML_FORMAT, "mzML format", 1000584);
ms_term!(MZXML_FORMAT, "ISB mzXML format", 1000566);
ms_term!(MULTIPLE_PEAK_LIST_NATIVE_ID, "multiple peak list nativeID format", 1000774);

// Spectrum identification
ms_term!(PRODUCT_ION_MZ, "product ion m/z", 1001225, Unit::MZ);
ms_term!(PRODUCT_ION_INTENSITY, "product ion intensity", 1001226, Unit::DetectorCounts);
ms_term!(PRODUCT_ION_MZ_ERROR, "product ion m/z error", 1001227, Unit::MZ);
ms_term!(SPECTRUM_TITLE, "spectrum title", 1000796);
ms_term!(RETENTION_TIME, "retention time", 1000894, Unit::Second);
ms_term!(FINAL_PSM_LIST, "final PSM list", 1002439);
ms_term!(D_SCORE, "D-Score", 1002536);
ms_term!(PHOSPHORS_SITE_PROBABILITY, "phosphoRS site probability", 1001971);

// Fragment ions
ms_term!(FRAG_A_ION, "frag: a ion", 1001229);
ms_term!(FRAG_B_ION, "frag: b ion", 1001224);
ms_term!(FRAG_C_ION, "frag: c ion", 1001231);
ms_term!(FRAG_X_ION, "frag: x ion", 1001228);
ms_term!(FRAG_Y_ION, "frag: y ion", 1001220);
ms_term!(FRAG_Z_ION, "frag: z ion", 1001230);
ms_term!(FRAG_Z_PLUS_1_ION, "frag: z+1 ion", 1001408);
ms_term!(FRAG_Z_PLUS_2_ION, "frag: z+2 ion", 1001409);
ms_term!(FRAG_IMMONIUM_ION, "frag: immonium ion", 1001239);
ms_term!(FRAG_PRECURSOR_ION, "frag: precursor ion", 1001523);
ms_term!(FRAG_REPORTER_ION, "frag: reporter ion", 1002668);
ms_term!(FRAG_RELATED_ION, "frag: related ion", 1003247);
ms_term!(FRAG_WATER_LOSS, "frag: water loss", 1001522);
ms_term!(FRAG_AMMONIA_LOSS, "frag: ammonia loss", 1001521);
ms_term!(FRAG_NEUTRAL_LOSS, "fragment neutral loss", 1001524, Unit::Dalton);

// PeptideShaker scores
ms_term!(PSM_SCORE, "PeptideShaker PSM score", 1002466);
ms_term!(PSM_CONFIDENCE, "PeptideShaker PSM confidence", 1002467);
ms_term!(PEPTIDE_SCORE, "PeptideShaker peptide score", 1002468);
ms_term!(PEPTIDE_CONFIDENCE, "PeptideShaker peptide confidence", 1002469);
ms_term!(PROTEIN_GROUP_SCORE, "PeptideShaker protein group score", 1002470);
ms_term!(PROTEIN_GROUP_CONFIDENCE, "PeptideShaker protein group confidence", 1002471);
ms_term!(PSM_CONFIDENCE_TYPE, "PeptideShaker PSM confidence type", 1002540);
ms_term!(PEPTIDE_CONFIDENCE_TYPE, "PeptideShaker peptide confidence type", 1002541);
ms_term!(PROTEIN_CONFIDENCE_TYPE, "PeptideShaker protein confidence type", 1002542);

// Protein detection
ms_term!(GROUP_REPRESENTATIVE, "group representative", 1002403);
ms_term!(LEADING_PROTEIN, "leading protein", 1002401);
ms_term!(NON_LEADING_PROTEIN, "non-leading protein", 1002402);
ms_term!(SEQUENCE_COVERAGE, "sequence coverage", 1001093, Unit::Percent);
ms_term!(GROUP_PASSES_THRESHOLD, "protein group passes threshold", 1002415);
ms_term!(IDENTIFIED_PROTEIN_COUNT, "count of identified proteins", 1002404);

// Search engine scores
ms_term!(MASCOT_SCORE, "Mascot:score", 1001171);
ms_term!(MASCOT_EXPECTATION, "Mascot:expectation value", 1001172);
ms_term!(OMSSA_EVALUE, "OMSSA:evalue", 1001328);
ms_term!(XTANDEM_EXPECT, "X!Tandem:expect", 1001330);
ms_term!(MSGF_EVALUE, "MS-GF:EValue", 1002053);
ms_term!(COMET_EXPECTATION, "Comet:expectation value", 1002257);
ms_term!(ANDROMEDA_PEP, "Andromeda:PEP", 1002338);
ms_term!(AMANDA_SCORE, "Amanda:AmandaScore", 1002319);

// Search engine software names
ms_term!(MASCOT, "Mascot", 1001207);
ms_term!(OMSSA, "OMSSA", 1001475);
ms_term!(XTANDEM, "X!Tandem", 1001476);
ms_term!(MSGF_PLUS, "MS-GF+", 1002048);
ms_term!(MS_AMANDA, "MS Amanda", 1002336);
ms_term!(COMET, "Comet", 1002251);
ms_term!(TIDE, "Tide", 1002575);
ms_term!(ANDROMEDA, "Andromeda", 1002337);
ms_term!(MYRIMATCH, "MyriMatch", 1001585);
ms_term!(METAMORPHEUS, "MetaMorpheus", 1002826);

// PRIDE XML
psi_term!(PSI_MASS_TO_CHARGE, "MassToChargeRatio", 1000040);
psi_term!(PSI_CHARGE_STATE, "ChargeState", 1000041);
psi_term!(PSI_INTENSITY, "Intensity", 1000042);
psi_term!(PSI_TIME_IN_SECONDS, "TimeInSeconds", 1000039);
pride_term!(PRIDE_UPSTREAM_FLANK, "Upstream flanking sequence", 65);
pride_term!(PRIDE_DOWNSTREAM_FLANK, "Downstream flanking sequence", 66);
pride_term!(PRIDE_PROTEIN_DESCRIPTION, "Protein description line", 63);
pride_term!(PRIDE_DECOY_HIT, "Decoy hit", 303);
pride_term!(PRIDE_ALTERNATIVE_ACCESSION, "Indistinguishable alternative protein accession", 98);
pride_term!(PRIDE_PRODUCT_ION_MZ, "product ion m/z", 188);
pride_term!(PRIDE_PRODUCT_ION_INTENSITY, "product ion intensity", 189);
pride_term!(PRIDE_PRODUCT_ION_MASS_ERROR, "product ion mass error", 190);
pride_term!(PRIDE_PRODUCT_ION_CHARGE, "product ion charge", 204);
pride_term!(PRIDE_A_ION, "a ion", 233);
pride_term!(PRIDE_B_ION, "b ion", 194);
pride_term!(PRIDE_C_ION, "c ion", 236);
pride_term!(PRIDE_X_ION, "x ion", 227);
pride_term!(PRIDE_Y_ION, "y ion", 193);
pride_term!(PRIDE_Z_ION, "z ion", 230);
pride_term!(PRIDE_B_ION_H2O, "b ion -H2O", 196);
pride_term!(PRIDE_B_ION_NH3, "b ion -NH3", 195);
pride_term!(PRIDE_Y_ION_H2O, "y ion -H2O", 197);
pride_term!(PRIDE_Y_ION_NH3, "y ion -NH3", 198);
pride_term!(PRIDE_IMMONIUM_ION, "immonium ion", 239);
pride_term!(PRIDE_PRECURSOR_ION, "precursor ion", 263);
