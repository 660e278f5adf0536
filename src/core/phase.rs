//! Build phases, hook stages and the registry of free-form commands.
//!
//! Options and hooks are opaque commands injected verbatim into the rendered
//! script. Their order matters and duplicates are legitimate, so the registry
//! only ever appends.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::errors::BuildError;

/// A closed set of names that free-form commands can be attached to.
pub trait PhaseKey: Copy + Ord + fmt::Display + FromStr<Err = BuildError> + 'static {
    /// Every member of the set, in pipeline order.
    const ALL: &'static [Self];

    /// Name of the template placeholder that receives this key's commands.
    fn placeholder(&self) -> String;
}

/// Build phase receiving tool options in project-file backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Right after project creation
    Project,
    /// Before the flow starts
    Preflow,
    /// After synthesis
    Postsyn,
    /// After implementation
    Postimp,
    /// After bitstream generation
    Postbit,
}

impl Phase {
    /// Get the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Project => "project",
            Phase::Preflow => "preflow",
            Phase::Postsyn => "postsyn",
            Phase::Postimp => "postimp",
            Phase::Postbit => "postbit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Phase {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.to_lowercase())
            .ok_or_else(|| BuildError::invalid_choice("phase", s, Phase::ALL))
    }
}

impl PhaseKey for Phase {
    const ALL: &'static [Phase] = &[
        Phase::Project,
        Phase::Preflow,
        Phase::Postsyn,
        Phase::Postimp,
        Phase::Postbit,
    ];

    fn placeholder(&self) -> String {
        format!("{}_OPTS", self.as_str().to_uppercase())
    }
}

/// Pipeline step around which hook commands run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookStage {
    Precfg,
    Postcfg,
    Presyn,
    Postsyn,
    Prepar,
    Postpar,
    Prebit,
    Postbit,
}

impl HookStage {
    /// Get the stage name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HookStage::Precfg => "precfg",
            HookStage::Postcfg => "postcfg",
            HookStage::Presyn => "presyn",
            HookStage::Postsyn => "postsyn",
            HookStage::Prepar => "prepar",
            HookStage::Postpar => "postpar",
            HookStage::Prebit => "prebit",
            HookStage::Postbit => "postbit",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HookStage {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookStage::ALL
            .iter()
            .copied()
            .find(|h| h.as_str() == s.to_lowercase())
            .ok_or_else(|| BuildError::invalid_choice("hook stage", s, HookStage::ALL))
    }
}

impl PhaseKey for HookStage {
    const ALL: &'static [HookStage] = &[
        HookStage::Precfg,
        HookStage::Postcfg,
        HookStage::Presyn,
        HookStage::Postsyn,
        HookStage::Prepar,
        HookStage::Postpar,
        HookStage::Prebit,
        HookStage::Postbit,
    ];

    fn placeholder(&self) -> String {
        self.as_str().to_uppercase()
    }
}

/// Ordered lists of free-form commands keyed by a closed phase set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseRegistry<K: PhaseKey> {
    entries: BTreeMap<K, Vec<String>>,
}

impl<K: PhaseKey> PhaseRegistry<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        PhaseRegistry {
            entries: BTreeMap::new(),
        }
    }

    /// Append a command to a phase.
    pub fn add(&mut self, text: impl Into<String>, key: K) {
        self.entries.entry(key).or_default().push(text.into());
    }

    /// Commands of a phase, in insertion order.
    pub fn get(&self, key: K) -> &[String] {
        self.entries.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Commands of a phase joined with newlines (empty if none).
    pub fn joined(&self, key: K) -> String {
        self.get(key).join("\n")
    }

    /// Check if no phase has any command.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    /// Iterate over every phase of the set with its placeholder and joined text.
    pub fn placeholders(&self) -> impl Iterator<Item = (String, String)> + '_ {
        K::ALL.iter().map(|key| (key.placeholder(), self.joined(*key)))
    }
}

impl<K: PhaseKey> Default for PhaseRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}
