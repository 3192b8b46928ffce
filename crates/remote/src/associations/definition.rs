//! Association definitions - declared relationships between a local model and a remote resource

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::inference;
use crate::error::{AssociationError, AssociationResult};

/// Query-shape token sent with every remote fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// First matching entity only
    First,
    /// Last matching entity only
    Last,
    /// Every matching entity
    All,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown scope '{}', expected first, last or all",
                other
            )),
        }
    }
}

/// Whether an association yields at most one or any number of entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

impl Cardinality {
    pub fn default_scope(self) -> Scope {
        match self {
            Self::One => Scope::First,
            Self::Many => Scope::All,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => f.write_str("one"),
            Self::Many => f.write_str("many"),
        }
    }
}

/// Options accepted when declaring an association; omitted ones are defaulted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssociationOptions {
    pub class_name: Option<String>,
    pub primary_key: Option<String>,
    pub foreign_key: Option<String>,
    pub scope: Option<Scope>,
}

impl AssociationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = Some(primary_key.into());
        self
    }

    pub fn foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// Immutable, fully defaulted description of one association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDefinition {
    /// Association name, unique per local model
    pub name: String,
    /// Local model the association is declared on
    pub local_model: String,
    /// Remote entity type
    pub target_type: String,
    /// Field on the local record supplying the join value
    pub primary_key: String,
    /// Parameter name sent to the remote API, matched on returned entities
    pub foreign_key: String,
    pub scope: Scope,
    pub cardinality: Cardinality,
}

impl AssociationDefinition {
    /// Apply defaults to `options` and validate the result
    pub fn from_options(
        local_model: &str,
        name: &str,
        cardinality: Cardinality,
        options: AssociationOptions,
    ) -> AssociationResult<Self> {
        let definition = Self {
            name: name.to_string(),
            local_model: local_model.to_string(),
            target_type: options
                .class_name
                .unwrap_or_else(|| inference::class_name_for(name, cardinality)),
            primary_key: options
                .primary_key
                .unwrap_or_else(|| inference::DEFAULT_PRIMARY_KEY.to_string()),
            foreign_key: options
                .foreign_key
                .unwrap_or_else(|| inference::foreign_key_for(local_model)),
            scope: options.scope.unwrap_or_else(|| cardinality.default_scope()),
            cardinality,
        };

        definition.validate()?;
        Ok(definition)
    }

    /// Validate the definition for consistency
    pub fn validate(&self) -> AssociationResult<()> {
        let identifiers = [
            ("local model", &self.local_model),
            ("name", &self.name),
            ("class_name", &self.target_type),
            ("primary_key", &self.primary_key),
            ("foreign_key", &self.foreign_key),
        ];

        for (label, value) in identifiers {
            if value.is_empty() {
                return Err(self.invalid(format!("{} cannot be empty", label)));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(self.invalid(format!(
                    "{} '{}' cannot contain whitespace",
                    label, value
                )));
            }
        }

        // first/last on a collection would silently drop results
        if self.cardinality == Cardinality::Many && self.scope != Scope::All {
            return Err(self.invalid(format!(
                "a many association must use scope 'all', got '{}'",
                self.scope
            )));
        }

        Ok(())
    }

    fn invalid(&self, message: String) -> AssociationError {
        AssociationError::invalid(&self.local_model, &self.name, message)
    }
}
