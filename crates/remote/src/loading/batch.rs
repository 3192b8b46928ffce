//! Batch resolution - one remote request per association for a whole collection

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::associations::{AssociationDefinition, AssociationRegistry, Scope};
use crate::client::{ParamValue, QueryParams, RemoteClient};
use crate::config::BatchConfig;
use crate::entity::RemoteEntity;
use crate::error::{AssociationError, AssociationResult};
use crate::record::{LocalRecord, ResolutionResult};
use crate::value::FieldValue;

/// Eager resolver that replaces per-record fetches with grouped ones
#[derive(Clone)]
pub struct BatchResolver {
    registry: Arc<AssociationRegistry>,
    client: Arc<dyn RemoteClient>,
    config: BatchConfig,
}

impl BatchResolver {
    pub fn new(registry: Arc<AssociationRegistry>, client: Arc<dyn RemoteClient>) -> Self {
        Self {
            registry,
            client,
            config: BatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Resolve every association in `names` for all `records`, in place.
    ///
    /// Each record's slot receives exactly the entities whose foreign key
    /// equals its primary key, and its prefetch flag is set even when that
    /// is nothing. An undeclared name aborts the call; associations applied
    /// before it stay applied.
    pub async fn resolve_all<'a, R: LocalRecord>(
        &self,
        records: &'a mut [R],
        names: &[&str],
    ) -> AssociationResult<&'a mut [R]> {
        if records.is_empty() {
            return Ok(records);
        }

        if self.config.parallel_execution {
            self.resolve_concurrently(records, names).await?;
        } else {
            for name in names {
                let definition = self.registry.lookup(R::model_name(), name)?;
                let keys = distinct_keys(records, definition)?;
                let entities = self.fetch_all(definition, &keys).await?;
                assign(records, definition, entities);
            }
        }

        Ok(records)
    }

    /// All lookups happen before any request; results apply in request order
    async fn resolve_concurrently<R: LocalRecord>(
        &self,
        records: &mut [R],
        names: &[&str],
    ) -> AssociationResult<()> {
        let definitions = names
            .iter()
            .map(|name| self.registry.lookup(R::model_name(), name))
            .collect::<AssociationResult<Vec<_>>>()?;

        let mut keyed = Vec::with_capacity(definitions.len());
        for definition in definitions {
            keyed.push((definition, distinct_keys(records, definition)?));
        }

        let results = join_all(
            keyed
                .iter()
                .map(|(definition, keys)| self.fetch_all(definition, keys)),
        )
        .await;

        for ((definition, _), result) in keyed.iter().zip(results) {
            assign(records, definition, result?);
        }

        Ok(())
    }

    /// One request for the whole key set, or one per chunk when configured
    async fn fetch_all(
        &self,
        definition: &AssociationDefinition,
        keys: &[FieldValue],
    ) -> AssociationResult<Vec<Arc<RemoteEntity>>> {
        if keys.is_empty() {
            debug!(
                "No keys for {}.{}, skipping remote fetch",
                definition.local_model, definition.name
            );
            return Ok(Vec::new());
        }

        let chunk_size = self.config.chunk_size().unwrap_or(keys.len());
        let mut entities = Vec::new();

        for chunk in keys.chunks(chunk_size) {
            let mut params = QueryParams::new();
            params.insert(definition.foreign_key.clone(), ParamValue::Set(chunk.to_vec()));

            debug!(
                "Batch fetching {} for {} keys of {}.{}",
                definition.target_type,
                chunk.len(),
                definition.local_model,
                definition.name
            );

            let fetched = match self
                .client
                .fetch(&definition.target_type, Scope::All, &params)
                .await
            {
                Ok(fetched) => fetched,
                Err(err) if err.is_not_found() => {
                    debug!(
                        "{} not found for {}.{}, treating chunk as empty",
                        definition.target_type, definition.local_model, definition.name
                    );
                    Vec::new()
                }
                Err(err) => return Err(err.into()),
            };
            entities.extend(fetched.into_iter().map(Arc::new));
        }

        Ok(entities)
    }
}

/// Distinct non-null key values in first-seen order
fn distinct_keys<R: LocalRecord>(
    records: &[R],
    definition: &AssociationDefinition,
) -> AssociationResult<Vec<FieldValue>> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    for record in records {
        let key = record
            .field_value(&definition.primary_key)
            .ok_or_else(|| AssociationError::missing_key(R::model_name(), &definition.primary_key))?;
        if !key.is_null() && seen.insert(key.clone()) {
            keys.push(key);
        }
    }

    Ok(keys)
}

/// Partition fetched entities by foreign key and assign them to every record
fn assign<R: LocalRecord>(
    records: &mut [R],
    definition: &AssociationDefinition,
    entities: Vec<Arc<RemoteEntity>>,
) {
    let fetched = entities.len();
    let mut index: HashMap<FieldValue, Vec<Arc<RemoteEntity>>> = HashMap::new();

    for entity in entities {
        match entity.field(&definition.foreign_key) {
            Some(value) => index.entry(value).or_default().push(entity),
            None => warn!(
                "{} entity without '{}' skipped while resolving {}.{}",
                definition.target_type, definition.foreign_key, definition.local_model, definition.name
            ),
        }
    }

    for record in records.iter_mut() {
        let matches = record
            .field_value(&definition.primary_key)
            .filter(|key| !key.is_null())
            .and_then(|key| index.get(&key))
            .cloned()
            .unwrap_or_default();

        let value = ResolutionResult::from_entities(
            definition.cardinality,
            scoped(definition.scope, matches),
        );
        record.associations_mut().prefetch(&definition.name, value);
    }

    debug!(
        "Distributed {} {} entities across {} records for {}.{}",
        fetched,
        definition.target_type,
        records.len(),
        definition.local_model,
        definition.name
    );
}

/// Narrow a record's matches the way the remote scope would
fn scoped(scope: Scope, mut matches: Vec<Arc<RemoteEntity>>) -> Vec<Arc<RemoteEntity>> {
    match scope {
        Scope::All => matches,
        Scope::First => {
            matches.truncate(1);
            matches
        }
        Scope::Last => matches.pop().into_iter().collect(),
    }
}
