//! Identifier namespaces and species shared across BioDataFuse

use crate::error::BdfError;
use serde::{Deserialize, Serialize};

/// Input identifier namespace understood by the cross-reference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierType {
    RefSeq,
    WikiGenes,
    Omim,
    UniprotTrembl,
    NcbiGene,
    Ensembl,
    HgncAccessionNumber,
    Pdb,
    Hgnc,
}

impl IdentifierType {
    /// All selectable types, in display order
    pub const ALL: [IdentifierType; 9] = [
        IdentifierType::RefSeq,
        IdentifierType::WikiGenes,
        IdentifierType::Omim,
        IdentifierType::UniprotTrembl,
        IdentifierType::NcbiGene,
        IdentifierType::Ensembl,
        IdentifierType::HgncAccessionNumber,
        IdentifierType::Pdb,
        IdentifierType::Hgnc,
    ];

    /// Human-readable data source name, also used as `identifier.source` / `target.source`
    pub fn display_name(self) -> &'static str {
        match self {
            IdentifierType::RefSeq => "RefSeq",
            IdentifierType::WikiGenes => "WikiGenes",
            IdentifierType::Omim => "OMIM",
            IdentifierType::UniprotTrembl => "Uniprot-TrEMBL",
            IdentifierType::NcbiGene => "NCBI Gene",
            IdentifierType::Ensembl => "Ensembl",
            IdentifierType::HgncAccessionNumber => "HGNC Accession Number",
            IdentifierType::Pdb => "PDB",
            IdentifierType::Hgnc => "HGNC",
        }
    }

    /// BridgeDb system code
    pub fn system_code(self) -> &'static str {
        match self {
            IdentifierType::RefSeq => "Q",
            IdentifierType::WikiGenes => "Wg",
            IdentifierType::Omim => "Om",
            IdentifierType::UniprotTrembl => "S",
            IdentifierType::NcbiGene => "L",
            IdentifierType::Ensembl => "En",
            IdentifierType::HgncAccessionNumber => "Hac",
            IdentifierType::Pdb => "Pd",
            IdentifierType::Hgnc => "H",
        }
    }

    /// Look up a type by its BridgeDb system code (exact match)
    pub fn from_system_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.system_code() == code)
    }
}

impl std::fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for IdentifierType {
    type Err = BdfError;

    /// Accepts the display name or the system code, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|ty| {
                ty.display_name().eq_ignore_ascii_case(wanted)
                    || ty.system_code().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|ty| ty.display_name()).collect();
                BdfError::config(format!(
                    "Unknown identifier type '{}'. Expected one of: {}",
                    wanted,
                    names.join(", ")
                ))
            })
    }
}

/// Species path segment for the cross-reference service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Species(String);

impl Species {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Species {
    fn default() -> Self {
        Self("Human".to_string())
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
