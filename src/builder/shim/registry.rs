//! Backend registry - management of the built-in backends.
//!
//! Registry construction never fails. Tool availability is checked lazily
//! when a caller asks for it.

use std::collections::HashMap;

use serde::Serialize;

use crate::builder::shim::capabilities::{BackendCapabilities, BackendId};
use crate::builder::shim::diamond_shim::DiamondShim;
use crate::builder::shim::ise_shim::IseShim;
use crate::builder::shim::libero_shim::LiberoShim;
use crate::builder::shim::openflow_shim::OpenflowShim;
use crate::builder::shim::quartus_shim::QuartusShim;
use crate::builder::shim::trait_def::{BackendAvailability, BackendShim};
use crate::builder::shim::vivado_shim::VivadoShim;

/// Create a fresh shim for a backend.
pub fn create_shim(id: BackendId) -> Box<dyn BackendShim> {
    match id {
        BackendId::Vivado => Box::new(VivadoShim::new()),
        BackendId::Ise => Box::new(IseShim::new()),
        BackendId::Quartus => Box::new(QuartusShim::new()),
        BackendId::Libero => Box::new(LiberoShim::new()),
        BackendId::Diamond => Box::new(DiamondShim::new()),
        BackendId::Openflow => Box::new(OpenflowShim::new()),
    }
}

/// Registry of build backends.
///
/// All built-in backends are registered up front without looking for their
/// tools on PATH.
pub struct BackendRegistry {
    backends: HashMap<BackendId, Box<dyn BackendShim>>,
}

impl BackendRegistry {
    /// Create a new registry with all built-in backends.
    pub fn new() -> Self {
        let mut registry = BackendRegistry {
            backends: HashMap::new(),
        };

        for id in BackendId::ALL {
            registry.register(create_shim(*id));
        }

        registry
    }

    /// Register a backend shim, replacing any shim with the same ID.
    pub fn register(&mut self, shim: Box<dyn BackendShim>) {
        self.backends.insert(shim.id(), shim);
    }

    /// Get a backend by ID.
    pub fn get(&self, id: BackendId) -> Option<&dyn BackendShim> {
        self.backends.get(&id).map(|b| b.as_ref())
    }

    /// Get all registered backend IDs, in display order.
    pub fn ids(&self) -> Vec<BackendId> {
        let mut ids: Vec<_> = self.backends.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Get all registered backends, in display order.
    pub fn all(&self) -> impl Iterator<Item = &dyn BackendShim> + '_ {
        self.ids().into_iter().filter_map(move |id| self.get(id))
    }

    /// Get the number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Check if a backend is registered.
    pub fn contains(&self, id: BackendId) -> bool {
        self.backends.contains_key(&id)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of a backend for display purposes.
#[derive(Debug, Clone, Serialize)]
pub struct BackendSummary {
    /// Whether the vendor tool was found on PATH
    pub available: bool,

    /// Missing tool message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    #[serde(flatten)]
    pub capabilities: BackendCapabilities,
}

impl BackendSummary {
    /// Create a summary from a backend shim.
    ///
    /// This looks the tool up on PATH.
    pub fn from_shim(shim: &dyn BackendShim) -> Self {
        let availability = shim.availability();
        BackendSummary {
            available: availability.is_available(),
            hint: availability.error_message(),
            capabilities: *shim.capabilities(),
        }
    }

    /// Whether the summary reports a usable tool.
    pub fn availability_label(&self) -> &'static str {
        if self.available {
            "available"
        } else {
            "not installed"
        }
    }
}

/// Get all backend summaries.
pub fn get_backend_summaries(registry: &BackendRegistry) -> Vec<BackendSummary> {
    registry.all().map(BackendSummary::from_shim).collect()
}

/// Check availability of all backends.
pub fn check_all(registry: &BackendRegistry) -> Vec<(BackendId, BackendAvailability)> {
    registry
        .all()
        .map(|shim| (shim.id(), shim.availability()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = BackendRegistry::new();
        assert_eq!(registry.len(), BackendId::ALL.len());
        for id in BackendId::ALL {
            assert!(registry.contains(*id));
        }
    }

    #[test]
    fn test_registry_get() {
        let registry = BackendRegistry::new();
        let vivado = registry.get(BackendId::Vivado).unwrap();
        assert_eq!(vivado.id(), BackendId::Vivado);
        assert_eq!(vivado.capabilities().script, "vivado.tcl");
    }

    #[test]
    fn test_registry_ids_ordered() {
        let registry = BackendRegistry::new();
        assert_eq!(registry.ids(), BackendId::ALL.to_vec());
    }

    #[test]
    fn test_default_parts_resolve() {
        let registry = BackendRegistry::new();
        for shim in registry.all() {
            let part = shim.capabilities().default_part;
            assert!(
                shim.normalize_part(part).is_ok(),
                "{} rejects its default part {}",
                shim.id(),
                part
            );
        }
    }

    #[test]
    fn test_re_registration_replaces() {
        let mut registry = BackendRegistry::new();
        let initial_count = registry.len();
        registry.register(Box::new(VivadoShim::new()));
        assert_eq!(registry.len(), initial_count);
    }

    #[test]
    fn test_backend_summary() {
        let registry = BackendRegistry::new();
        let summary = BackendSummary::from_shim(registry.get(BackendId::Libero).unwrap());
        assert_eq!(summary.capabilities.id, BackendId::Libero);
        assert!(summary.capabilities.transfer.is_none());
        assert_eq!(summary.available, summary.hint.is_none());
        assert_eq!(check_all(&registry).len(), BackendId::ALL.len());
    }
}
