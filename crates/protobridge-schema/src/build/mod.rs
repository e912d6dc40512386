mod r#enum;
mod field;
mod object;
mod session;

#[cfg(test)]
mod tests;

use crate::{
    descriptor::{DescriptorPool, MessageDescriptor},
    node::{Ref, RootSchema},
};
use parking_lot::RwLock;
use serde::Deserialize;
use session::BuildSession;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};
use thiserror::Error as ThisError;

///
/// BuildError
///
/// Fatal to the whole build session; nothing from a failed session is cached.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum BuildError {
    #[error("circular flatten through '{type_name}'")]
    CircularFlatten { type_name: String },

    #[error("duplicate property '{property}' in '{type_name}'")]
    DuplicateProperty { type_name: String, property: String },

    #[error("flatten depth exceeds {max} at '{type_name}'")]
    FlattenTooDeep { type_name: String, max: usize },

    #[error("malformed annotation on '{type_name}.{field}': {message}")]
    MalformedAnnotation {
        type_name: String,
        field: String,
        message: String,
    },

    #[error("map field '{type_name}.{field}' must be keyed by string")]
    MapKeyNotString { type_name: String, field: String },

    #[error("enum '{type_name}' has no zero value ending in UNSPECIFIED")]
    MissingUnspecified { type_name: String },

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("reference '{0}' was never linked")]
    UnresolvedRef(Ref),

    #[error("well-known type '{0}' is not supported")]
    UnsupportedWellKnown(String),
}

///
/// SchemaError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("schema '{0}' not found")]
    NotFound(String),

    #[error("reference '{0}' is not linked")]
    Unlinked(Ref),
}

///
/// SchemaOptions
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct SchemaOptions {
    /// Nesting limit for flatten chains.
    pub max_flatten_depth: usize,
}

impl SchemaOptions {
    pub const DEFAULT_MAX_FLATTEN_DEPTH: usize = 8;
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            max_flatten_depth: Self::DEFAULT_MAX_FLATTEN_DEPTH,
        }
    }
}

///
/// SchemaSet
///
/// Arena of built root schemas keyed by full name. Lookups take a read lock;
/// a build runs without any lock and publishes its whole session under one
/// short write lock. Concurrent builders of the same type converge on the
/// first schema published.
///

#[derive(Debug)]
pub struct SchemaSet {
    pool: Arc<DescriptorPool>,
    options: SchemaOptions,
    arena: RwLock<BTreeMap<String, Arc<RootSchema>>>,
}

impl SchemaSet {
    #[must_use]
    pub fn new(pool: impl Into<Arc<DescriptorPool>>) -> Self {
        Self::with_options(pool, SchemaOptions::default())
    }

    #[must_use]
    pub fn with_options(pool: impl Into<Arc<DescriptorPool>>, options: SchemaOptions) -> Self {
        Self {
            pool: pool.into(),
            options,
            arena: RwLock::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    #[must_use]
    pub const fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Root schema for a message, building and caching it on first use.
    pub fn schema_for(&self, desc: &MessageDescriptor) -> Result<Arc<RootSchema>, SchemaError> {
        self.schema_for_name(&desc.full_name())
    }

    /// Root schema for a message, enum or exposed oneof group by full name.
    pub fn schema_for_name(&self, full_name: &str) -> Result<Arc<RootSchema>, SchemaError> {
        if let Some(schema) = self.cached(full_name) {
            tracing::trace!(schema = full_name, "schema cache hit");
            return Ok(schema);
        }

        let mut session = BuildSession::new(self);
        session.reference(full_name)?;
        session.publish()?;

        self.cached(full_name)
            .ok_or_else(|| SchemaError::NotFound(full_name.to_string()))
    }

    /// Follow a ref to its linked root.
    pub fn resolve(&self, target: &Ref) -> Result<Arc<RootSchema>, SchemaError> {
        self.cached(&target.full_name())
            .ok_or_else(|| SchemaError::Unlinked(target.clone()))
    }

    #[must_use]
    pub fn is_linked(&self, target: &Ref) -> bool {
        self.arena.read().contains_key(&target.full_name())
    }

    /// Refs reachable from any cached root whose target is not cached.
    #[must_use]
    pub fn unlinked_refs(&self) -> Vec<Ref> {
        let arena = self.arena.read();
        let mut missing = BTreeSet::new();

        for schema in arena.values() {
            for r in schema.refs() {
                if !arena.contains_key(&r.full_name()) {
                    missing.insert(r);
                }
            }
        }

        missing.into_iter().collect()
    }

    /// Full names of every cached root.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.arena.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.read().is_empty()
    }

    fn cached(&self, full_name: &str) -> Option<Arc<RootSchema>> {
        self.arena.read().get(full_name).cloned()
    }

    fn contains(&self, full_name: &str) -> bool {
        self.arena.read().contains_key(full_name)
    }

    fn publish(&self, built: BTreeMap<String, RootSchema>) {
        let mut arena = self.arena.write();
        for (name, schema) in built {
            arena.entry(name).or_insert_with(|| Arc::new(schema));
        }
    }
}
