//! Part descriptor inference.
//!
//! A part string such as `hx8k-ct256` or `xc7z010-1-clg400` is opaque to the
//! core; the resolver derives a `(family, device, package)` triple from it
//! using ordered prefix tables and an ordered list of rewrite rules.
//!
//! The part is lower-cased before anything else, so descriptors use tool
//! (yosys/nextpnr) spelling. Backends wanting vendor case re-case it.
//!
//! Matching policy: tables are walked in order and, inside a table, prefixes
//! are walked in order. The first prefix that matches wins. There is no
//! longest-match scan, so more specific prefixes must be listed before the
//! shorter ones they extend (`xc3sa` before `xc3s`).

use serde::Serialize;

use crate::core::errors::BuildError;

/// Delimiter between the components of a part string.
pub const PART_DELIMITER: char = '-';

/// Shape accepted by the generic split.
pub const GENERIC_PART_SHAPE: &str = "DEVICE-PACKAGE or DEVICE-SPEED-PACKAGE";

/// Normalized identity of a target part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartDescriptor {
    /// Family tag, `None` when no table matched
    pub family: Option<String>,
    /// Device component (`first-second` for three-component parts)
    pub device: String,
    /// Package component
    pub package: String,
}

impl PartDescriptor {
    /// Get the family or fail when the part did not match any table.
    pub fn require_family(&self, part: &str) -> Result<&str, BuildError> {
        self.family
            .as_deref()
            .ok_or_else(|| BuildError::UnresolvedFamily {
                part: part.to_string(),
            })
    }
}

/// How a matching table names the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyName {
    /// The matched prefix is the family (yosys Xilinx naming)
    Prefix,
    /// Every prefix of the table maps to one family
    Fixed(&'static str),
}

/// One vendor line's prefixes.
#[derive(Debug, Clone, Copy)]
pub struct FamilyTable {
    pub name: FamilyName,
    pub prefixes: &'static [&'static str],
}

impl FamilyTable {
    /// Match a lowercase part against this table.
    fn matches(&self, part: &str) -> Option<String> {
        let prefix = self.prefixes.iter().find(|p| part.starts_with(**p))?;
        Some(match self.name {
            FamilyName::Prefix => prefix.to_string(),
            FamilyName::Fixed(family) => family.to_string(),
        })
    }
}

/// Xilinx families as named by yosys `synth_xilinx`.
pub const XILINX_FAMILIES: FamilyTable = FamilyTable {
    name: FamilyName::Prefix,
    prefixes: &[
        "xcup", "xcu", "xc7", "xc6s", "xc6v", "xc5v", "xc4v", "xc3sda", "xc3sa", "xc3se", "xc3s",
        "xc2vp", "xc2v", "xcve", "xcv",
    ],
};

/// Lattice iCE40 devices as named by nextpnr.
pub const ICE40_FAMILIES: FamilyTable = FamilyTable {
    name: FamilyName::Fixed("ice40"),
    prefixes: &[
        "lp384", "lp1k", "lp4k", "lp8k", "hx1k", "hx4k", "hx8k", "up3k", "up5k", "u1k", "u2k",
        "u4k",
    ],
};

/// Lattice ECP5 devices as named by nextpnr.
pub const ECP5_FAMILIES: FamilyTable = FamilyTable {
    name: FamilyName::Fixed("ecp5"),
    prefixes: &[
        "um5g-25k", "um5g-45k", "um5g-85k", "um-25k", "um-45k", "um-85k", "12k", "25k", "45k",
        "85k",
    ],
};

/// A normalization step applied to the split components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Replace every occurrence of a digit in the device
    DeviceDigit { from: char, to: char },
    /// Append a marker to the package
    PackageSuffix(&'static str),
    /// Upper-case the package
    UppercasePackage,
}

impl Rewrite {
    fn apply(&self, desc: &mut PartDescriptor) {
        match *self {
            Rewrite::DeviceDigit { from, to } => {
                desc.device = desc.device.replace(from, &to.to_string());
            }
            Rewrite::PackageSuffix(suffix) => desc.package.push_str(suffix),
            Rewrite::UppercasePackage => desc.package = desc.package.to_uppercase(),
        }
    }
}

/// Family-specific post-processing.
#[derive(Debug, Clone, Copy)]
pub struct PartRule {
    /// Family the rule applies to
    pub family: &'static str,
    /// Device prefixes the rule is limited to, empty for all
    pub devices: &'static [&'static str],
    pub rewrites: &'static [Rewrite],
}

impl PartRule {
    fn applies(&self, desc: &PartDescriptor) -> bool {
        if desc.family.as_deref() != Some(self.family) {
            return false;
        }
        self.devices.is_empty() || self.devices.iter().any(|d| desc.device.starts_with(d))
    }
}

/// iCE40 4k parts are 8k dies fused down; nextpnr wants the 8k device and a
/// `:4k` package marker. See <http://www.clifford.at/icestorm>.
pub const ICE40_4K_RULE: PartRule = PartRule {
    family: "ice40",
    devices: &["hx4k", "lp4k"],
    rewrites: &[
        Rewrite::DeviceDigit { from: '4', to: '8' },
        Rewrite::PackageSuffix(":4k"),
    ],
};

/// nextpnr-ecp5 expects upper-case package names.
pub const ECP5_PACKAGE_RULE: PartRule = PartRule {
    family: "ecp5",
    devices: &[],
    rewrites: &[Rewrite::UppercasePackage],
};

/// Resolves part strings with a backend's tables and rules.
#[derive(Debug, Clone, Default)]
pub struct PartResolver {
    tables: Vec<FamilyTable>,
    rules: Vec<PartRule>,
}

impl PartResolver {
    /// Create a resolver with no tables and no rules.
    ///
    /// Every part resolves with an unresolved family.
    pub fn new() -> Self {
        PartResolver::default()
    }

    /// Resolver for the open-source flow: yosys/nextpnr naming.
    pub fn open_flow() -> Self {
        PartResolver::new()
            .with_table(XILINX_FAMILIES)
            .with_table(ICE40_FAMILIES)
            .with_table(ECP5_FAMILIES)
            .with_rule(ICE40_4K_RULE)
            .with_rule(ECP5_PACKAGE_RULE)
    }

    /// Append a family table (lower priority than the existing ones).
    pub fn with_table(mut self, table: FamilyTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Append a post-processing rule.
    pub fn with_rule(mut self, rule: PartRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Find the family of a part (case-insensitive).
    pub fn family(&self, part: &str) -> Option<String> {
        let lower = part.to_lowercase();
        self.tables.iter().find_map(|t| t.matches(&lower))
    }

    /// Resolve a part string into a descriptor.
    ///
    /// The part is lower-cased first; rules run in insertion order and each
    /// one sees the rewrites of the rules before it.
    pub fn resolve(&self, part: &str) -> Result<PartDescriptor, BuildError> {
        let lower = part.to_lowercase();
        let family = self.tables.iter().find_map(|t| t.matches(&lower));

        let (device, package) = split_part(&lower).map_err(|_| BuildError::MalformedPart {
            part: part.to_string(),
            expected: GENERIC_PART_SHAPE.to_string(),
        })?;
        let mut desc = PartDescriptor {
            family,
            device,
            package,
        };

        for rule in &self.rules {
            if rule.applies(&desc) {
                for rewrite in rule.rewrites {
                    rewrite.apply(&mut desc);
                }
            }
        }

        Ok(desc)
    }
}

/// Split a part into `(device, package)` on [`PART_DELIMITER`].
pub fn split_part(part: &str) -> Result<(String, String), BuildError> {
    let parts: Vec<&str> = part.split(PART_DELIMITER).collect();
    match parts.as_slice() {
        [device, package] if !device.is_empty() && !package.is_empty() => {
            Ok((device.to_string(), package.to_string()))
        }
        [family, speed, package]
            if !family.is_empty() && !speed.is_empty() && !package.is_empty() =>
        {
            Ok((
                format!("{}{}{}", family, PART_DELIMITER, speed),
                package.to_string(),
            ))
        }
        _ => Err(BuildError::MalformedPart {
            part: part.to_string(),
            expected: GENERIC_PART_SHAPE.to_string(),
        }),
    }
}
