//! Lazy resolution - fetch one record's association on first access and memoize it

use std::sync::Arc;

use tracing::debug;

use crate::associations::{AssociationDefinition, AssociationRegistry, Cardinality};
use crate::client::{ParamValue, QueryParams, RemoteClient};
use crate::entity::RemoteEntity;
use crate::error::{AssociationError, AssociationResult};
use crate::record::{LocalRecord, ResolutionResult};

/// On-demand, per-record resolver
#[derive(Clone)]
pub struct SingularResolver {
    registry: Arc<AssociationRegistry>,
    client: Arc<dyn RemoteClient>,
}

impl SingularResolver {
    pub fn new(registry: Arc<AssociationRegistry>, client: Arc<dyn RemoteClient>) -> Self {
        Self { registry, client }
    }

    pub fn registry(&self) -> &AssociationRegistry {
        &self.registry
    }

    /// Resolve `name` on `record`, fetching only if it was never resolved.
    ///
    /// A remote not-found is memoized as the empty value. Any other remote
    /// failure propagates and leaves the slot untouched.
    pub async fn resolve<R: LocalRecord>(
        &self,
        record: &mut R,
        name: &str,
    ) -> AssociationResult<ResolutionResult> {
        let definition = self.registry.lookup(R::model_name(), name)?;

        if let Some(value) = memoized(record, definition) {
            debug!("Association '{}' on {} already resolved", name, R::model_name());
            return Ok(value);
        }

        let key = record
            .field_value(&definition.primary_key)
            .ok_or_else(|| AssociationError::missing_key(R::model_name(), &definition.primary_key))?;

        let value = if key.is_null() {
            ResolutionResult::empty(definition.cardinality)
        } else {
            let mut params = QueryParams::new();
            params.insert(definition.foreign_key.clone(), ParamValue::Scalar(key));

            debug!(
                "Fetching {} (scope: {}) for {}.{}",
                definition.target_type,
                definition.scope,
                R::model_name(),
                name
            );

            match self
                .client
                .fetch(&definition.target_type, definition.scope, &params)
                .await
            {
                Ok(entities) => ResolutionResult::from_entities(
                    definition.cardinality,
                    entities.into_iter().map(Arc::new).collect(),
                ),
                Err(err) if err.is_not_found() => {
                    debug!(
                        "{} not found, memoizing empty {}.{}",
                        definition.target_type,
                        R::model_name(),
                        name
                    );
                    ResolutionResult::empty(definition.cardinality)
                }
                Err(err) => return Err(err.into()),
            }
        };

        record.associations_mut().memoize(name, value.clone());
        Ok(value)
    }

    /// Resolve a to-one association
    pub async fn one<R: LocalRecord>(
        &self,
        record: &mut R,
        name: &str,
    ) -> AssociationResult<Option<Arc<RemoteEntity>>> {
        self.expect_cardinality::<R>(name, Cardinality::One)?;
        match self.resolve(record, name).await? {
            ResolutionResult::One(entity) => Ok(entity),
            ResolutionResult::Many(_) => Err(mismatch::<R>(name, Cardinality::One)),
        }
    }

    /// Resolve a to-many association
    pub async fn many<R: LocalRecord>(
        &self,
        record: &mut R,
        name: &str,
    ) -> AssociationResult<Vec<Arc<RemoteEntity>>> {
        self.expect_cardinality::<R>(name, Cardinality::Many)?;
        match self.resolve(record, name).await? {
            ResolutionResult::Many(entities) => Ok(entities),
            ResolutionResult::One(_) => Err(mismatch::<R>(name, Cardinality::Many)),
        }
    }

    /// Discard the memoized value and fetch again
    pub async fn reload<R: LocalRecord>(
        &self,
        record: &mut R,
        name: &str,
    ) -> AssociationResult<ResolutionResult> {
        record.associations_mut().reset(name);
        self.resolve(record, name).await
    }

    fn expect_cardinality<R: LocalRecord>(
        &self,
        name: &str,
        expected: Cardinality,
    ) -> AssociationResult<()> {
        if self.registry.lookup(R::model_name(), name)?.cardinality != expected {
            return Err(mismatch::<R>(name, expected));
        }
        Ok(())
    }
}

/// Slot value if the association was memoized, assigned or prefetched
fn memoized<R: LocalRecord>(record: &R, definition: &AssociationDefinition) -> Option<ResolutionResult> {
    let slots = record.associations();
    match slots.get(&definition.name) {
        Some(value) => Some(value.clone()),
        None if slots.is_prefetched(&definition.name) => {
            Some(ResolutionResult::empty(definition.cardinality))
        }
        None => None,
    }
}

fn mismatch<R: LocalRecord>(name: &str, expected: Cardinality) -> AssociationError {
    AssociationError::CardinalityMismatch {
        model: R::model_name().to_string(),
        name: name.to_string(),
        expected: expected.to_string(),
    }
}
