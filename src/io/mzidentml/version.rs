use std::fmt::Display;
use std::str::FromStr;

use crate::io::ExportError;

/// The mzIdentML schema versions that can be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum MzIdentMLVersion {
    V1_1,
    #[default]
    V1_2,
}

impl MzIdentMLVersion {
    pub fn profile(&self) -> VersionProfile {
        match self {
            Self::V1_1 => VersionProfile {
                version: *self,
                version_string: "1.1.0",
                namespace: "http://psidev.info/psi/pi/mzIdentML/1.1",
                schema_location: "http://psidev.info/psi/pi/mzIdentML/1.1 http://www.psidev.info/files/mzIdentML1.1.0.xsd",
                max_neutral_losses: 0,
                modification_index: false,
                localization_scoring: false,
                consensus_scoring: false,
            },
            Self::V1_2 => VersionProfile {
                version: *self,
                version_string: "1.2.0",
                namespace: "http://psidev.info/psi/pi/mzIdentML/1.2",
                schema_location: "http://psidev.info/psi/pi/mzIdentML/1.2 http://www.psidev.info/files/mzIdentML1.2.0.xsd",
                max_neutral_losses: 1,
                modification_index: true,
                localization_scoring: true,
                consensus_scoring: true,
            },
        }
    }
}

impl Display for MzIdentMLVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.profile().version_string)
    }
}

impl FromStr for MzIdentMLVersion {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.1" | "1.1.0" => Ok(Self::V1_1),
            "1.2" | "1.2.0" => Ok(Self::V1_2),
            other => Err(ExportError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// Everything that differs between schema versions, decided once per export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionProfile {
    pub version: MzIdentMLVersion,
    pub version_string: &'static str,
    pub namespace: &'static str,
    pub schema_location: &'static str,
    /// The most neutral losses a single `IonType` may describe
    pub max_neutral_losses: usize,
    /// Whether searched modifications carry a mass-bucket index that localization
    /// scores refer back to
    pub modification_index: bool,
    /// Whether the protocol declares modification localization scoring
    pub localization_scoring: bool,
    /// Whether the protocol declares consensus scoring when several engines were used
    pub consensus_scoring: bool,
}

impl VersionProfile {
    /// Format a localization score for a modification site
    pub fn ptm_score_value(&self, index: usize, score: f64, site: usize, valid: bool) -> String {
        if self.modification_index {
            format!("{index}:{score}:{site}:{valid}")
        } else {
            format!("{score}:{site}:{valid}")
        }
    }
}
