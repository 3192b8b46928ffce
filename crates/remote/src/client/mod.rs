//! Remote client boundary - the only way resolvers reach the resource API

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::associations::Scope;
use crate::entity::RemoteEntity;
use crate::error::RemoteResult;
use crate::value::FieldValue;

pub mod http;

pub use http::HttpRemoteClient;

/// A query parameter: a single value or a set of values to match any of
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(FieldValue),
    Set(Vec<FieldValue>),
}

/// Parameter map sent with a fetch, ordered by name
pub type QueryParams = BTreeMap<String, ParamValue>;

/// Fetches remote entities of a given type.
///
/// A set-valued parameter must return the union of entities matching any of
/// its values. "Nothing here" is reported as `RemoteError::NotFound`.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn fetch(
        &self,
        target_type: &str,
        scope: Scope,
        params: &QueryParams,
    ) -> RemoteResult<Vec<RemoteEntity>>;
}

/// Apply a scope to an already decoded collection
pub fn apply_scope(scope: Scope, mut entities: Vec<RemoteEntity>) -> Vec<RemoteEntity> {
    match scope {
        Scope::All => entities,
        Scope::First => {
            entities.truncate(1);
            entities
        }
        Scope::Last => entities.pop().into_iter().collect(),
    }
}
