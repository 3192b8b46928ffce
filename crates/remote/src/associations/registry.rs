//! Association Registry - definitions built once at declaration time, read-only afterwards

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::definition::{AssociationDefinition, AssociationOptions, Cardinality};
use crate::error::{AssociationError, AssociationResult};
use crate::record::LocalRecord;

/// Immutable map of model name -> association name -> definition.
///
/// Build it with [`AssociationRegistry::builder`] and share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AssociationRegistry {
    definitions: HashMap<String, BTreeMap<String, AssociationDefinition>>,
}

impl AssociationRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Get the definition for an association, failing if it was never declared
    pub fn lookup(&self, model_name: &str, name: &str) -> AssociationResult<&AssociationDefinition> {
        self.definitions
            .get(model_name)
            .and_then(|associations| associations.get(name))
            .ok_or_else(|| AssociationError::not_found(model_name, name))
    }

    pub fn contains(&self, model_name: &str, name: &str) -> bool {
        self.lookup(model_name, name).is_ok()
    }

    /// Association names declared for a model, sorted
    pub fn all_for(&self, model_name: &str) -> Vec<&str> {
        self.definitions
            .get(model_name)
            .map(|associations| associations.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Definitions declared for a model, sorted by name
    pub fn definitions_for(&self, model_name: &str) -> Vec<&AssociationDefinition> {
        self.definitions
            .get(model_name)
            .map(|associations| associations.values().collect())
            .unwrap_or_default()
    }

    /// Models with at least one association, sorted
    pub fn models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        models.sort_unstable();
        models
    }

    /// Total number of definitions
    pub fn len(&self) -> usize {
        self.definitions.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single-writer builder for an [`AssociationRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: HashMap<String, BTreeMap<String, AssociationDefinition>>,
}

impl RegistryBuilder {
    /// Declare an association; a second declaration of the same name fails
    pub fn define(
        self,
        model_name: &str,
        name: &str,
        cardinality: Cardinality,
        options: AssociationOptions,
    ) -> AssociationResult<Self> {
        self.insert(model_name, name, cardinality, options, false)
    }

    /// Declare an association, intentionally replacing an earlier declaration
    pub fn redefine(
        self,
        model_name: &str,
        name: &str,
        cardinality: Cardinality,
        options: AssociationOptions,
    ) -> AssociationResult<Self> {
        self.insert(model_name, name, cardinality, options, true)
    }

    /// Declare a to-one association on `R`
    pub fn has_one<R: LocalRecord>(
        self,
        name: &str,
        options: AssociationOptions,
    ) -> AssociationResult<Self> {
        self.define(R::model_name(), name, Cardinality::One, options)
    }

    /// Declare a to-many association on `R`
    pub fn has_many<R: LocalRecord>(
        self,
        name: &str,
        options: AssociationOptions,
    ) -> AssociationResult<Self> {
        self.define(R::model_name(), name, Cardinality::Many, options)
    }

    pub fn build(self) -> AssociationRegistry {
        AssociationRegistry {
            definitions: self.definitions,
        }
    }

    fn insert(
        mut self,
        model_name: &str,
        name: &str,
        cardinality: Cardinality,
        options: AssociationOptions,
        replace: bool,
    ) -> AssociationResult<Self> {
        let definition = AssociationDefinition::from_options(model_name, name, cardinality, options)?;

        let associations = self.definitions.entry(model_name.to_string()).or_default();
        if !replace && associations.contains_key(name) {
            return Err(AssociationError::duplicate(model_name, name));
        }

        debug!(
            "Registering {} association '{}' on {} -> {} ({} = {})",
            definition.cardinality,
            name,
            model_name,
            definition.target_type,
            definition.foreign_key,
            definition.primary_key
        );
        associations.insert(name.to_string(), definition);

        Ok(self)
    }
}
