use crate::{
    message::DynamicMessage,
    reflect::{Field, FieldCore, PropertySet, ReflectError},
};
use protobridge_schema::node::{Ref, RootSchema};
use std::{cell::OnceCell, sync::Arc};

///
/// ContainerField
///
/// Object or oneof handle. A physical container lives in its own message; a
/// virtual one (an exposed oneof group) is synthesized from fields of the
/// message at its location, and is set when any of those fields is.
///

#[derive(Debug)]
pub struct ContainerField<'s> {
    core: FieldCore<'s>,
    root: Arc<RootSchema>,
    is_virtual: bool,
    children: OnceCell<PropertySet<'s>>,
}

impl<'s> ContainerField<'s> {
    pub(crate) fn new(
        core: FieldCore<'s>,
        target: &Ref,
        is_virtual: bool,
    ) -> Result<Self, ReflectError> {
        let root = core.resolve(target)?;
        let children = OnceCell::new();

        // Virtual members are answered from the parent message, so build them
        // now; `is_set` cannot fail later.
        if is_virtual {
            let set = PropertySet::new(core.schemas, Arc::clone(&root), core.location.clone())?;
            let _ = children.set(set);
        }

        Ok(Self {
            core,
            root,
            is_virtual,
            children,
        })
    }

    pub(crate) const fn core(&self) -> &FieldCore<'s> {
        &self.core
    }

    #[must_use]
    pub const fn root(&self) -> &Arc<RootSchema> {
        &self.root
    }

    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    #[must_use]
    pub fn is_oneof(&self) -> bool {
        matches!(*self.root, RootSchema::Oneof(_))
    }

    /// Child properties, built on first access and cached on the handle.
    pub fn properties(&self) -> Result<&PropertySet<'s>, ReflectError> {
        if let Some(set) = self.children.get() {
            return Ok(set);
        }
        let set = PropertySet::new(
            self.core.schemas,
            Arc::clone(&self.root),
            self.core.location.clone(),
        )?;

        Ok(self.children.get_or_init(|| set))
    }

    #[must_use]
    pub fn is_set(&self, msg: &DynamicMessage) -> bool {
        if self.is_virtual {
            self.children.get().is_some_and(|set| set.any_set(msg))
        } else {
            self.core.is_present(msg)
        }
    }

    /// Create the backing message (and its ancestors) if missing.
    pub fn ensure(&self, msg: &mut DynamicMessage) -> Result<(), ReflectError> {
        self.core.ensure_message(msg).map(|_| ())
    }

    pub fn clear(&self, msg: &mut DynamicMessage) {
        if self.is_virtual {
            if let Some(set) = self.children.get() {
                for field in set.fields() {
                    field.clear(msg);
                }
            }
        } else {
            self.core.remove(msg);
        }
    }

    /// The member currently set, for oneofs. Objects may have several set
    /// properties, so this returns the first.
    pub fn which(&self, msg: &DynamicMessage) -> Result<Option<&Field<'s>>, ReflectError> {
        if !self.is_set(msg) {
            return Ok(None);
        }

        Ok(self.properties()?.fields().iter().find(|f| f.is_set(msg)))
    }
}
