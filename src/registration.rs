use alloc::{boxed::Box, sync::Arc};
use core::{
    any::Any,
    fmt::{self, Debug, Formatter},
};
use parking_lot::RwLock;

use crate::{
    any::TypeInfo,
    descriptor::ComponentDescriptor,
    lifestyle::{DeclaredLifestyle, Lifestyle},
    strategy::ResolvedGraph,
};

pub type BoxedFactory = Arc<dyn Fn() -> anyhow::Result<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// Where instances of a registration come from
#[derive(Clone)]
pub enum ImplementationSource {
    /// Built by constructor injection, the descriptor lists constructors to choose from
    Constructor(Arc<ComponentDescriptor>),
    /// Built by a user-provided callback, there is no dependency graph to inspect
    Factory(BoxedFactory),
}

impl Debug for ImplementationSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor(descriptor) => f.debug_tuple("Constructor").field(descriptor).finish(),
            Self::Factory(_) => f.write_str("Factory(<function>)"),
        }
    }
}

/// Index of a registration in its container
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(pub(crate) usize);

impl RegistrationId {
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipKind {
    /// Constructor parameter resolved through the registration store
    Parameter,
    /// Constructor parameter of a decorator that receives the decorated service
    Decoratee,
}

/// Directed edge from a consumer registration to a registration it depends on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub consumer: RegistrationId,
    pub dependency: RegistrationId,
    pub parameter: TypeInfo,
    pub kind: RelationshipKind,
}

/// Binding of a service type to its implementation.
///
/// Relationships, the resolved lifestyle and the resolved graph are attached once, when first computed,
/// and never change afterwards.
pub struct Registration {
    pub(crate) id: RegistrationId,
    pub(crate) service: TypeInfo,
    pub(crate) implementation: TypeInfo,
    pub(crate) lifestyle: DeclaredLifestyle,
    pub(crate) source: ImplementationSource,
    pub(crate) decoratee: Option<RegistrationId>,
    pub(crate) relationships: OnceSlot<Arc<[Relationship]>>,
    pub(crate) resolved_lifestyle: OnceSlot<Lifestyle>,
    pub(crate) resolved_graph: OnceSlot<Arc<ResolvedGraph>>,
}

impl Registration {
    #[must_use]
    pub(crate) fn new(
        id: RegistrationId,
        service: TypeInfo,
        lifestyle: DeclaredLifestyle,
        source: ImplementationSource,
        decoratee: Option<RegistrationId>,
    ) -> Self {
        let implementation = match &source {
            ImplementationSource::Constructor(descriptor) => descriptor.type_info,
            ImplementationSource::Factory(_) => service,
        };

        Self {
            id,
            service,
            implementation,
            lifestyle,
            source,
            decoratee,
            relationships: OnceSlot::new(),
            resolved_lifestyle: OnceSlot::new(),
            resolved_graph: OnceSlot::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn service(&self) -> TypeInfo {
        self.service
    }

    #[inline]
    #[must_use]
    pub fn implementation(&self) -> TypeInfo {
        self.implementation
    }

    #[inline]
    #[must_use]
    pub fn declared_lifestyle(&self) -> DeclaredLifestyle {
        self.lifestyle
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &ImplementationSource {
        &self.source
    }

    /// Registration wrapped by this one, if this is a decorator
    #[inline]
    #[must_use]
    pub fn decoratee(&self) -> Option<RegistrationId> {
        self.decoratee
    }

    #[inline]
    #[must_use]
    pub fn is_decorator(&self) -> bool {
        self.decoratee.is_some()
    }

    /// Relationships, if they have already been discovered
    #[inline]
    #[must_use]
    pub fn relationships(&self) -> Option<Arc<[Relationship]>> {
        self.relationships.get()
    }

    /// Concrete lifestyle, if it's declared or has already been resolved
    #[inline]
    #[must_use]
    pub fn lifestyle(&self) -> Option<Lifestyle> {
        self.lifestyle.concrete().or_else(|| self.resolved_lifestyle.get())
    }
}

impl Debug for Registration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("service", &self.service.name)
            .field("implementation", &self.implementation.name)
            .field("lifestyle", &self.lifestyle)
            .field("source", &self.source)
            .field("decoratee", &self.decoratee)
            .field("resolved_lifestyle", &self.resolved_lifestyle.get())
            .finish_non_exhaustive()
    }
}

/// Cell written at most once, the first stored value wins
pub(crate) struct OnceSlot<T> {
    value: RwLock<Option<T>>,
}

impl<T: Clone> OnceSlot<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self { value: RwLock::new(None) }
    }

    #[inline]
    pub(crate) fn get(&self) -> Option<T> {
        self.value.read().clone()
    }

    /// Stores `value` if the slot is empty and returns the stored one
    pub(crate) fn get_or_set(&self, value: T) -> T {
        self.value.write().get_or_insert(value).clone()
    }
}
