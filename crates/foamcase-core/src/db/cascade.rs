//! Cascade handlers for entity removal.
//!
//! Modules that own an entity collection notify the registry before removing
//! an entity; every handler registered for that entity kind runs synchronously
//! and may clean up dependents or abort the removal by returning an error.
//!
//! Handlers are keyed by kind and run in registration order.

use std::collections::BTreeMap;

use crate::document::CaseDocument;
use crate::errors::{CaseError, CaseResult};

crate::case_enum! {
    /// Entity collections other parts of the case refer to by id.
    pub enum EntityKind ("entity kind") {
        Material => "material",
        Specie => "specie",
        BoundaryCondition => "boundaryCondition",
    }
}

/// Reacts to the imminent removal of one entity.
pub trait CascadeHandler: Send + Sync {
    /// Stable identifier, unique per kind.
    fn id(&self) -> &str;

    fn removing(&self, doc: &mut CaseDocument, kind: EntityKind, id: u64) -> CaseResult<()>;
}

#[derive(Default)]
pub struct CascadeRegistry {
    handlers: BTreeMap<EntityKind, Vec<Box<dyn CascadeHandler>>>,
}

impl std::fmt::Debug for CascadeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: BTreeMap<&str, Vec<&str>> = self
            .handlers
            .iter()
            .map(|(k, hs)| (k.as_str(), hs.iter().map(|h| h.id()).collect()))
            .collect();
        f.debug_struct("CascadeRegistry").field("handlers", &ids).finish()
    }
}

impl CascadeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the handlers this crate ships:
    /// monitors follow materials and species, couples follow boundaries.
    pub fn standard() -> Self {
        use crate::db::boundary::CoupleCascade;
        use crate::db::monitor::MonitorCascade;

        let mut handlers: BTreeMap<EntityKind, Vec<Box<dyn CascadeHandler>>> = BTreeMap::new();
        handlers.insert(EntityKind::Material, vec![Box::new(MonitorCascade)]);
        handlers.insert(EntityKind::Specie, vec![Box::new(MonitorCascade)]);
        handlers.insert(EntityKind::BoundaryCondition, vec![Box::new(CoupleCascade)]);
        Self { handlers }
    }

    pub fn register(&mut self, kind: EntityKind, handler: Box<dyn CascadeHandler>) -> CaseResult<()> {
        let list = self.handlers.entry(kind).or_default();
        if list.iter().any(|h| h.id() == handler.id()) {
            return Err(CaseError::invalid_argument(format!(
                "cascade handler already registered for {kind}: {}",
                handler.id()
            )));
        }
        list.push(handler);
        Ok(())
    }

    pub fn handlers(&self, kind: EntityKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Run every handler for `kind`; the first error aborts.
    pub fn notify(&self, doc: &mut CaseDocument, kind: EntityKind, id: u64) -> CaseResult<()> {
        for h in self.handlers.get(&kind).into_iter().flatten() {
            tracing::debug!(handler = h.id(), %kind, id, "cascade");
            h.removing(doc, kind, id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template;

    struct Veto;
    impl CascadeHandler for Veto {
        fn id(&self) -> &str {
            "test.veto"
        }
        fn removing(&self, _doc: &mut CaseDocument, _kind: EntityKind, id: u64) -> CaseResult<()> {
            Err(CaseError::invariant(format!("{id} is pinned")))
        }
    }

    #[test]
    fn duplicate_handler_is_rejected() {
        let mut r = CascadeRegistry::new();
        r.register(EntityKind::Material, Box::new(Veto)).unwrap();
        assert!(r.register(EntityKind::Material, Box::new(Veto)).is_err());
        r.register(EntityKind::Specie, Box::new(Veto)).unwrap();
        assert_eq!(r.handlers(EntityKind::Material), 1);
    }

    #[test]
    fn handler_error_propagates() {
        let mut r = CascadeRegistry::new();
        r.register(EntityKind::Material, Box::new(Veto)).unwrap();
        let mut doc = template::new_case().unwrap();
        let e = r.notify(&mut doc, EntityKind::Material, 1).unwrap_err();
        assert!(e.to_string().contains("pinned"));
        r.notify(&mut doc, EntityKind::BoundaryCondition, 1).unwrap();
    }

    #[test]
    fn standard_registry_covers_kinds() {
        let r = CascadeRegistry::standard();
        assert_eq!(r.handlers(EntityKind::Material), 1);
        assert_eq!(r.handlers(EntityKind::Specie), 1);
        assert_eq!(r.handlers(EntityKind::BoundaryCondition), 1);
        assert!(format!("{r:?}").contains("monitor"));
    }
}
