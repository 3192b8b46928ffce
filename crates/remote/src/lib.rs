//! # elif-remote: Remote Resource Associations for elif.rs
//!
//! Relates records from the local data store to entities served by a remote
//! resource API, correlated by a foreign-key value on the local record.
//!
//! - [`AssociationRegistry`] holds the declared associations per model.
//! - [`SingularResolver`] fetches one record's association on first access
//!   and memoizes it; a remote not-found becomes an empty value.
//! - [`BatchResolver`] resolves associations for a whole collection with one
//!   request per association instead of one per record.
//!
//! ```no_run
//! use std::sync::Arc;
//! use elif_remote::*;
//!
//! # struct Author { id: i64, associations: AssociationSlots }
//! # impl LocalRecord for Author {
//! #     fn model_name() -> &'static str { "Author" }
//! #     fn field_value(&self, field: &str) -> Option<FieldValue> {
//! #         (field == "id").then(|| self.id.into())
//! #     }
//! #     fn associations(&self) -> &AssociationSlots { &self.associations }
//! #     fn associations_mut(&mut self) -> &mut AssociationSlots { &mut self.associations }
//! # }
//! # async fn run(mut authors: Vec<Author>) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(
//!     AssociationRegistry::builder()
//!         .has_one::<Author>("profile", AssociationOptions::default())?
//!         .has_many::<Author>("posts", AssociationOptions::default())?
//!         .build(),
//! );
//! let client: Arc<dyn RemoteClient> =
//!     Arc::new(HttpRemoteClient::new(RemoteConfig::from_env()?)?);
//!
//! BatchResolver::new(registry.clone(), client.clone())
//!     .resolve_all(&mut authors, &["profile", "posts"])
//!     .await?;
//!
//! // Already prefetched: no further request
//! let profile = SingularResolver::new(registry, client)
//!     .one(&mut authors[0], "profile")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod associations;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod loading;
pub mod record;
pub mod value;

pub use associations::*;
pub use client::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use loading::*;
pub use record::*;
pub use value::*;
