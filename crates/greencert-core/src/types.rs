//! Closed enumerations declared on a certificate

use serde::{Deserialize, Serialize};
use std::fmt;

/// Norms a certified product complies with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Norm {
    #[serde(rename = "ISO 14001")]
    Iso14001,
    #[serde(rename = "Rainforest Alliance")]
    RainforestAlliance,
    #[serde(rename = "FSC")]
    Fsc,
    #[serde(rename = "LEED")]
    Leed,
    #[serde(rename = "IDB.org")]
    IdbOrg,
    #[serde(rename = "Other")]
    Other,
}

impl Norm {
    /// Wire label, also used in the canonical form
    pub fn label(&self) -> &'static str {
        match self {
            Norm::Iso14001 => "ISO 14001",
            Norm::RainforestAlliance => "Rainforest Alliance",
            Norm::Fsc => "FSC",
            Norm::Leed => "LEED",
            Norm::IdbOrg => "IDB.org",
            Norm::Other => "Other",
        }
    }

    pub const ALL: [Norm; 6] = [
        Norm::Iso14001,
        Norm::RainforestAlliance,
        Norm::Fsc,
        Norm::Leed,
        Norm::IdbOrg,
        Norm::Other,
    ];
}

impl fmt::Display for Norm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sustainability criteria met by a certified product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SustainabilityCriteria {
    #[serde(rename = "Organic")]
    Organic,
    #[serde(rename = "Legal Origin")]
    LegalOrigin,
    #[serde(rename = "Forest Management Plan")]
    ForestManagementPlan,
    #[serde(rename = "Biodiversity Maintenance")]
    BiodiversityMaintenance,
    #[serde(rename = "Complete Traceability")]
    CompleteTraceability,
    #[serde(rename = "Exploitation Limits")]
    ExploitationLimits,
    #[serde(rename = "Working Conditions")]
    WorkingConditions,
    #[serde(rename = "Valid Environmental License")]
    ValidEnvironmentalLicense,
    #[serde(rename = "Other")]
    Other,
}

impl SustainabilityCriteria {
    pub fn label(&self) -> &'static str {
        match self {
            SustainabilityCriteria::Organic => "Organic",
            SustainabilityCriteria::LegalOrigin => "Legal Origin",
            SustainabilityCriteria::ForestManagementPlan => "Forest Management Plan",
            SustainabilityCriteria::BiodiversityMaintenance => "Biodiversity Maintenance",
            SustainabilityCriteria::CompleteTraceability => "Complete Traceability",
            SustainabilityCriteria::ExploitationLimits => "Exploitation Limits",
            SustainabilityCriteria::WorkingConditions => "Working Conditions",
            SustainabilityCriteria::ValidEnvironmentalLicense => "Valid Environmental License",
            SustainabilityCriteria::Other => "Other",
        }
    }

    pub const ALL: [SustainabilityCriteria; 9] = [
        SustainabilityCriteria::Organic,
        SustainabilityCriteria::LegalOrigin,
        SustainabilityCriteria::ForestManagementPlan,
        SustainabilityCriteria::BiodiversityMaintenance,
        SustainabilityCriteria::CompleteTraceability,
        SustainabilityCriteria::ExploitationLimits,
        SustainabilityCriteria::WorkingConditions,
        SustainabilityCriteria::ValidEnvironmentalLicense,
        SustainabilityCriteria::Other,
    ];
}

impl fmt::Display for SustainabilityCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque identifier returned by the ledger once a digest is anchored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerReference(String);

impl LedgerReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
