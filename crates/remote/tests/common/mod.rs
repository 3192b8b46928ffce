#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use elif_remote::*;
use serde_json::Value as JsonValue;

/// A recorded `RemoteClient::fetch` call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub target_type: String,
    pub scope: Scope,
    pub params: QueryParams,
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NotFound,
    Network,
}

/// In-memory remote API that filters its fixtures like a real one and
/// records every call
#[derive(Default)]
pub struct RecordingClient {
    entities: Mutex<HashMap<String, Vec<RemoteEntity>>>,
    failures: Mutex<HashMap<String, Failure>>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(self, resource: &str, attributes: JsonValue) -> Self {
        let entity = RemoteEntity::from_json(resource, attributes).expect("fixture must be an object");
        self.entities
            .lock()
            .unwrap()
            .entry(resource.to_string())
            .or_default()
            .push(entity);
        self
    }

    pub fn failing(self, resource: &str, failure: Failure) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(resource.to_string(), failure);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, target_type: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.target_type == target_type)
            .count()
    }
}

fn matches(entity: &RemoteEntity, params: &QueryParams) -> bool {
    params.iter().all(|(key, expected)| {
        let actual = entity.field(key);
        match expected {
            ParamValue::Scalar(value) => actual.as_ref() == Some(value),
            ParamValue::Set(values) => actual.map(|a| values.contains(&a)).unwrap_or(false),
        }
    })
}

#[async_trait]
impl RemoteClient for RecordingClient {
    async fn fetch(
        &self,
        target_type: &str,
        scope: Scope,
        params: &QueryParams,
    ) -> RemoteResult<Vec<RemoteEntity>> {
        self.calls.lock().unwrap().push(Call {
            target_type: target_type.to_string(),
            scope,
            params: params.clone(),
        });

        match self.failures.lock().unwrap().get(target_type) {
            Some(Failure::NotFound) => return Err(RemoteError::not_found(target_type)),
            Some(Failure::Network) => return Err(RemoteError::network("connection refused")),
            None => {}
        }

        let found: Vec<RemoteEntity> = self
            .entities
            .lock()
            .unwrap()
            .get(target_type)
            .map(|all| all.iter().filter(|e| matches(e, params)).cloned().collect())
            .unwrap_or_default();

        Ok(apply_scope(scope, found))
    }
}

#[derive(Debug, Clone)]
pub struct Author {
    pub id: Option<i64>,
    pub name: String,
    pub associations: AssociationSlots,
}

impl Author {
    pub fn new(id: i64) -> Self {
        Self {
            id: Some(id),
            name: format!("author-{}", id),
            associations: AssociationSlots::new(),
        }
    }

    pub fn unsaved() -> Self {
        Self {
            id: None,
            name: "draft".to_string(),
            associations: AssociationSlots::new(),
        }
    }
}

impl LocalRecord for Author {
    fn model_name() -> &'static str {
        "Author"
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            _ => None,
        }
    }

    fn associations(&self) -> &AssociationSlots {
        &self.associations
    }

    fn associations_mut(&mut self) -> &mut AssociationSlots {
        &mut self.associations
    }
}

/// `Author` with `profile` (one) and `posts` (many), both defaulted
pub fn author_registry() -> Arc<AssociationRegistry> {
    Arc::new(
        AssociationRegistry::builder()
            .has_one::<Author>("profile", AssociationOptions::default())
            .unwrap()
            .has_many::<Author>("posts", AssociationOptions::default())
            .unwrap()
            .build(),
    )
}

pub fn id_of(entity: &RemoteEntity) -> i64 {
    match entity.field("id") {
        Some(FieldValue::Integer(id)) => id,
        other => panic!("entity without integer id: {:?}", other),
    }
}
