//! Local records and the association slots they carry

use std::collections::HashMap;
use std::sync::Arc;

use crate::associations::Cardinality;
use crate::entity::RemoteEntity;
use crate::value::FieldValue;

/// Capabilities the engine needs from a record owned by the local store
pub trait LocalRecord: Send {
    /// Model name used as the registry key, e.g. `Author`
    fn model_name() -> &'static str;

    /// Read a named field. `None` means the record has no such field.
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    fn associations(&self) -> &AssociationSlots;

    fn associations_mut(&mut self) -> &mut AssociationSlots;
}

/// Value held in an association slot
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    /// To-one association: a single entity or nothing
    One(Option<Arc<RemoteEntity>>),
    /// To-many association: possibly empty, in remote order
    Many(Vec<Arc<RemoteEntity>>),
}

impl ResolutionResult {
    /// The "no relation" value for a cardinality
    pub fn empty(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::One => Self::One(None),
            Cardinality::Many => Self::Many(Vec::new()),
        }
    }

    /// Shape fetched entities by cardinality; `One` keeps the first
    pub fn from_entities(cardinality: Cardinality, entities: Vec<Arc<RemoteEntity>>) -> Self {
        match cardinality {
            Cardinality::One => Self::One(entities.into_iter().next()),
            Cardinality::Many => Self::Many(entities),
        }
    }

    pub fn as_one(&self) -> Option<&Arc<RemoteEntity>> {
        match self {
            Self::One(entity) => entity.as_ref(),
            Self::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Arc<RemoteEntity>]> {
        match self {
            Self::One(_) => None,
            Self::Many(entities) => Some(entities),
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::One(_) => Cardinality::One,
            Self::Many(_) => Cardinality::Many,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(entity) => usize::from(entity.is_some()),
            Self::Many(entities) => entities.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
struct AssociationSlot {
    value: Option<ResolutionResult>,
    prefetched: bool,
}

/// Per-record association storage keyed by association name.
///
/// The setter is in-memory only. Memoization and the prefetch flag are
/// written by the resolvers.
#[derive(Debug, Clone, Default)]
pub struct AssociationSlots {
    slots: HashMap<String, AssociationSlot>,
}

impl AssociationSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized or assigned value, if any
    pub fn get(&self, name: &str) -> Option<&ResolutionResult> {
        self.slots.get(name).and_then(|slot| slot.value.as_ref())
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_prefetched(&self, name: &str) -> bool {
        self.slots.get(name).map(|slot| slot.prefetched).unwrap_or(false)
    }

    /// Overwrite the slot in memory. Nothing is fetched or persisted.
    pub fn set(&mut self, name: &str, value: ResolutionResult) {
        self.slot_mut(name).value = Some(value);
    }

    /// Forget the value and prefetch flag so the next access fetches again
    pub fn reset(&mut self, name: &str) {
        self.slots.remove(name);
    }

    /// Names with a value in their slot, sorted
    pub fn loaded_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.value.is_some())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn memoize(&mut self, name: &str, value: ResolutionResult) {
        self.slot_mut(name).value = Some(value);
    }

    pub(crate) fn prefetch(&mut self, name: &str, value: ResolutionResult) {
        let slot = self.slot_mut(name);
        slot.value = Some(value);
        slot.prefetched = true;
    }

    fn slot_mut(&mut self, name: &str) -> &mut AssociationSlot {
        self.slots.entry(name.to_string()).or_default()
    }
}
