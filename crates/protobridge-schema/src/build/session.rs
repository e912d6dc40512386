use crate::{
    build::{BuildError, SchemaSet},
    descriptor::{MessageDescriptor, well_known::WellKnown},
    naming,
    node::{Ref, RootSchema},
};
use std::{collections::BTreeMap, sync::Arc};

///
/// BuildSession
///
/// One top-level `schema_for` call. Roots are built depth first; a type
/// requested while its own body is still being built gets a ref back
/// immediately, which is what lets self-referential graphs terminate.
///

pub(super) struct BuildSession<'a> {
    pub(super) set: &'a SchemaSet,

    /// `None` marks a root whose body is in progress.
    pending: BTreeMap<String, Option<RootSchema>>,

    /// Messages currently being flattened, innermost last.
    pub(super) flatten_stack: Vec<String>,
}

impl<'a> BuildSession<'a> {
    pub(super) fn new(set: &'a SchemaSet) -> Self {
        Self {
            set,
            pending: BTreeMap::new(),
            flatten_stack: Vec::new(),
        }
    }

    /// Return the ref for `full_name`, building its root in this session if
    /// neither the arena nor the session knows it yet.
    pub(super) fn reference(&mut self, full_name: &str) -> Result<Ref, BuildError> {
        let target = self.ref_for(full_name);
        if self.pending.contains_key(full_name) || self.set.contains(full_name) {
            return Ok(target);
        }

        if self.pending.is_empty() {
            tracing::debug!(schema = full_name, "schema build started");
        } else {
            tracing::trace!(schema = full_name, "ref created");
        }

        // Exposed oneof groups are registered while their parent is built.
        if let Some(parent) = self.exposed_group_parent(full_name) {
            self.reference(&parent)?;
            return if self.is_known(full_name) {
                Ok(target)
            } else {
                Err(BuildError::UnknownType(full_name.to_string()))
            };
        }

        self.pending.insert(full_name.to_string(), None);
        let schema = self.build_root(full_name)?;
        self.pending.insert(full_name.to_string(), Some(schema));

        Ok(target)
    }

    /// Register a root built as a side effect of another (exposed groups).
    pub(super) fn insert_built(&mut self, full_name: String, schema: RootSchema) {
        if !self.set.contains(&full_name) {
            self.pending.entry(full_name).or_insert(Some(schema));
        }
    }

    pub(super) fn is_known(&self, full_name: &str) -> bool {
        self.set.contains(full_name) || self.pending.contains_key(full_name)
    }

    pub(super) fn message(&self, full_name: &str) -> Result<Arc<MessageDescriptor>, BuildError> {
        self.set
            .pool()
            .message(full_name)
            .cloned()
            .ok_or_else(|| BuildError::UnknownType(full_name.to_string()))
    }

    /// Check linkage of everything built here and publish it in one step.
    pub(super) fn publish(mut self) -> Result<(), BuildError> {
        let pending = std::mem::take(&mut self.pending);
        let mut built = BTreeMap::new();
        for (name, schema) in pending {
            match schema {
                Some(schema) => {
                    built.insert(name, schema);
                }
                None => return Err(BuildError::UnresolvedRef(self.ref_for(&name))),
            }
        }

        for schema in built.values() {
            for target in schema.refs() {
                let name = target.full_name();
                if !built.contains_key(&name) && !self.set.contains(&name) {
                    return Err(BuildError::UnresolvedRef(target));
                }
            }
        }

        tracing::debug!(roots = built.len(), "schema build published");
        self.set.publish(built);

        Ok(())
    }

    fn build_root(&mut self, full_name: &str) -> Result<RootSchema, BuildError> {
        if let Some(desc) = self.set.pool().enumeration(full_name).cloned() {
            return Ok(RootSchema::Enum(Self::build_enum(&desc)?));
        }

        let desc = self.message(full_name)?;
        if WellKnown::from_full_name(full_name) == Some(WellKnown::Struct) {
            return Err(BuildError::UnsupportedWellKnown(full_name.to_string()));
        }

        if desc.annotations.polymorph.is_some() {
            return self.build_polymorph(&desc).map(RootSchema::Polymorph);
        }
        if is_oneof_root(&desc) {
            return self.build_oneof(&desc).map(RootSchema::Oneof);
        }

        self.build_object(&desc).map(RootSchema::Object)
    }

    // `pkg.Msg.group` names an exposed group when `pkg.Msg` is a message
    // with a non-synthetic exposed oneof called `group`.
    // Refs keep the declaring package, so `pkg.Outer.Inner` stays in `pkg`.
    fn ref_for(&self, full_name: &str) -> Ref {
        let pool = self.set.pool();
        if let Some(desc) = pool.message(full_name) {
            return Ref::new(desc.package.clone(), desc.name.clone());
        }
        if let Some(desc) = pool.enumeration(full_name) {
            return Ref::new(desc.package.clone(), desc.name.clone());
        }
        if let Some(parent) = self.exposed_group_parent(full_name)
            && let Some(desc) = pool.message(&parent)
        {
            let (_, group) = naming::split_full_name(full_name);
            return Ref::new(desc.package.clone(), format!("{}.{group}", desc.name));
        }

        Ref::from_full_name(full_name)
    }

    fn exposed_group_parent(&self, full_name: &str) -> Option<String> {
        let (parent, group) = naming::split_full_name(full_name);
        let desc = self.set.pool().message(parent)?;

        desc.oneofs
            .iter()
            .any(|o| !o.synthetic && o.annotations.expose && o.name == group)
            .then(|| parent.to_string())
    }
}

/// A message is itself a oneof when its only real group is `type`, holds
/// every field, and every member is a singular message.
pub(super) fn is_oneof_root(desc: &MessageDescriptor) -> bool {
    match desc.annotations.is_oneof {
        Some(forced) => forced,
        None => {
            let mut groups = desc
                .oneofs
                .iter()
                .enumerate()
                .filter(|(_, o)| !o.synthetic);

            let Some((index, group)) = groups.next() else {
                return false;
            };
            if groups.next().is_some() || group.name != "type" || group.annotations.expose {
                return false;
            }

            !desc.fields.is_empty()
                && desc.fields.iter().all(|f| {
                    f.oneof == Some(index) && f.label.is_singular() && f.kind.is_message()
                })
        }
    }
}
