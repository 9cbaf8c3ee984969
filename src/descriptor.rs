use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use parking_lot::RwLock;
use tracing::debug;

use crate::any::TypeInfo;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    /// Trait objects and other types that can't be constructed by themselves
    Abstract,
    Array,
}

impl TypeKind {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Concrete => "concrete",
            TypeKind::Abstract => "abstract",
            TypeKind::Array => "array",
        }
    }
}

/// Public constructor of a component: the ordered parameter types it needs injected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstructorDescriptor {
    pub parameters: Vec<TypeInfo>,
}

impl ConstructorDescriptor {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn param<T: ?Sized + 'static>(mut self) -> Self {
        self.parameters.push(TypeInfo::of::<T>());
        self
    }
}

/// Reflection-free shape of an implementation type.
///
/// # Examples
/// ```rust
/// use lifestyle::{ComponentDescriptor, ConstructorDescriptor};
///
/// struct Database;
/// struct UserRepo;
///
/// let descriptor = ComponentDescriptor::of::<UserRepo>().with_constructor(ConstructorDescriptor::new().param::<Database>());
/// assert_eq!(descriptor.constructors.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub type_info: TypeInfo,
    pub kind: TypeKind,
    pub constructors: Vec<ConstructorDescriptor>,
}

impl ComponentDescriptor {
    /// Creates a descriptor of a concrete type without constructors
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            kind: TypeKind::Concrete,
            constructors: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }
}

/// Implementation type that can be built by constructor injection.
pub trait Component: 'static {
    fn descriptor() -> ComponentDescriptor;
}

/// Descriptors built once per implementation type
#[derive(Default)]
pub(crate) struct DescriptorCache {
    descriptors: RwLock<BTreeMap<TypeInfo, Arc<ComponentDescriptor>>>,
}

impl DescriptorCache {
    pub(crate) fn get_or_describe<C: Component>(&self) -> Arc<ComponentDescriptor> {
        let type_info = TypeInfo::of::<C>();

        if let Some(descriptor) = self.descriptors.read().get(&type_info) {
            debug!(component = type_info.name, "Descriptor found in cache");
            return descriptor.clone();
        }

        self.descriptors
            .write()
            .entry(type_info)
            .or_insert_with(|| {
                debug!(component = type_info.name, "Descriptor built");
                Arc::new(C::descriptor())
            })
            .clone()
    }

    pub(crate) fn insert(&self, descriptor: ComponentDescriptor) -> Arc<ComponentDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.descriptors.write().insert(descriptor.type_info, descriptor.clone());
        descriptor
    }
}
