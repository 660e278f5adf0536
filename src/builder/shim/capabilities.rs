//! Backend capability types - immutable facts about each backend.

use serde::{Deserialize, Serialize};

use crate::core::choice::DevType;
use crate::core::errors::BuildError;

/// Unique identifier for a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    /// AMD/Xilinx Vivado
    Vivado,
    /// Xilinx ISE
    Ise,
    /// Intel Quartus Prime
    Quartus,
    /// Microchip Libero SoC
    Libero,
    /// Lattice Diamond
    Diamond,
    /// yosys + nextpnr
    Openflow,
}

impl BackendId {
    /// All backends, in display order.
    pub const ALL: &'static [BackendId] = &[
        BackendId::Vivado,
        BackendId::Ise,
        BackendId::Quartus,
        BackendId::Libero,
        BackendId::Diamond,
        BackendId::Openflow,
    ];

    /// Get the backend name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Vivado => "vivado",
            BackendId::Ise => "ise",
            BackendId::Quartus => "quartus",
            BackendId::Libero => "libero",
            BackendId::Diamond => "diamond",
            BackendId::Openflow => "openflow",
        }
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackendId {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s.to_lowercase())
            .ok_or_else(|| BuildError::invalid_choice("backend", s, BackendId::ALL))
    }
}

/// Structural family of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Creates a persistent vendor project and runs one monolithic flow
    ProjectFile,
    /// No project file; synthesis, place and route are inlined in a script
    FlowComposition,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::ProjectFile => "project-file",
            BackendKind::FlowComposition => "flow-composition",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Programming support of a backend.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TransferCapabilities {
    /// Template rendered for programming
    pub script: &'static str,
    /// Command that runs the programming script
    pub command: &'static str,
    /// Device kinds the backend can program
    pub devtypes: &'static [DevType],
}

/// What a backend is and what it can do.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BackendCapabilities {
    pub id: BackendId,
    pub kind: BackendKind,
    /// One-line description
    pub description: &'static str,
    /// Executable looked up on PATH to report availability
    pub tool: &'static str,
    /// How to get the tool when it is missing
    pub install_hint: &'static str,
    /// Part used when the project does not set one
    pub default_part: &'static str,
    /// Template rendered by `generate`
    pub script: &'static str,
    /// Command that runs the generated script
    pub command: &'static str,
    /// Extension of the bitstream the flow produces
    pub bitstream_ext: &'static str,
    /// `None` when the backend cannot program devices
    pub transfer: Option<TransferCapabilities>,
}

impl BackendCapabilities {
    /// Device kinds accepted by `transfer` (empty when unsupported).
    pub fn devtypes(&self) -> &'static [DevType] {
        self.transfer.map(|t| t.devtypes).unwrap_or(&[])
    }

    /// Check if the backend can program devices at all.
    pub fn supports_transfer(&self) -> bool {
        self.transfer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_id_roundtrip() {
        for id in BackendId::ALL {
            assert_eq!(id.as_str().parse::<BackendId>().unwrap(), *id);
        }
        assert_eq!("Vivado".parse::<BackendId>().unwrap(), BackendId::Vivado);
    }

    #[test]
    fn test_backend_id_rejects_unknown() {
        let err = "icecube".parse::<BackendId>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("`icecube`"));
        assert!(msg.contains("vivado, ise, quartus, libero, diamond, openflow"));
    }
}
