use alloc::{boxed::Box, collections::BTreeMap, sync::Arc, vec::Vec};
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::TypeInfo,
    config::Config,
    constructor::ConstructorResolutionBehavior,
    descriptor::ConstructorDescriptor,
    errors::{RegistryErrorKind, ResolveErrorKind},
    registration::{ImplementationSource, Registration, RegistrationId, Relationship, RelationshipKind},
    registry::RegistryBuilder,
    strategy::StrategyCompiler,
};

/// Registration store of a dependency graph.
///
/// Supplies zero-or-one registration per service type (the outermost decorator, if the service is decorated)
/// and discovers relationships between registrations on first request.
/// Everything computed is cached, so the container can be shared between threads after verification.
pub struct Container {
    pub(crate) registrations: Vec<Registration>,
    pub(crate) services: BTreeMap<TypeInfo, RegistrationId>,
    pub(crate) config: Config,
    pub(crate) constructor_behavior: Box<dyn ConstructorResolutionBehavior + Send + Sync>,
    pub(crate) compiler: Box<dyn StrategyCompiler + Send + Sync>,
    /// Held by a lifestyle resolution pass, so concurrent first-use callers converge on one result
    pub(crate) resolution: Mutex<()>,
}

impl Container {
    /// # Errors
    /// Returns [`RegistryErrorKind`] if the registry can't be built, see [`RegistryBuilder::build`]
    #[inline]
    pub fn new(registry: RegistryBuilder) -> Result<Self, RegistryErrorKind> {
        registry.build()
    }

    #[inline]
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// All registrations, decorated ones and decorators included, in declaration order
    #[inline]
    pub fn registrations(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.iter()
    }

    #[inline]
    #[must_use]
    pub fn registration(&self, service: &TypeInfo) -> Option<&Registration> {
        self.services.get(service).map(|id| self.node(*id))
    }

    #[inline]
    #[must_use]
    pub fn registration_of<S: ?Sized + 'static>(&self) -> Option<&Registration> {
        self.registration(&TypeInfo::of::<S>())
    }

    /// Returns `None` if the id was issued by another container
    #[inline]
    #[must_use]
    pub fn registration_by_id(&self, id: RegistrationId) -> Option<&Registration> {
        self.registrations.get(id.0)
    }

    /// # Errors
    /// Returns [`ResolveErrorKind::UnknownRegistration`] if the id was issued by another container
    pub(crate) fn checked_node(&self, id: RegistrationId) -> Result<&Registration, ResolveErrorKind> {
        self.registration_by_id(id).ok_or_else(|| {
            let err = ResolveErrorKind::UnknownRegistration { index: id.0 };
            error!("{}", err);
            err
        })
    }

    /// Registration by an id taken from this container's registrations or relationships
    #[inline]
    pub(crate) fn node(&self, id: RegistrationId) -> &Registration {
        &self.registrations[id.0]
    }

    /// # Errors
    /// Returns [`ResolveErrorKind::NotRegistered`] if there is no registration for the service
    pub fn registration_or_err(&self, service: &TypeInfo) -> Result<&Registration, ResolveErrorKind> {
        self.registration(service).ok_or_else(|| {
            let err = ResolveErrorKind::NotRegistered { service: *service };
            error!("{}", err);
            err
        })
    }

    /// Selects the constructor used to inject the registration.
    /// Factory registrations have no constructor.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::Activation`] if the constructor resolution behavior can't pick a constructor
    /// - Returns [`ResolveErrorKind::UnknownRegistration`] if the id was issued by another container
    pub fn select_constructor(&self, id: RegistrationId) -> Result<Option<&ConstructorDescriptor>, ResolveErrorKind> {
        let registration = self.checked_node(id)?;
        match &registration.source {
            ImplementationSource::Constructor(descriptor) => {
                match self.constructor_behavior.select_constructor(registration.service, descriptor) {
                    Ok(constructor) => Ok(Some(constructor)),
                    Err(err) => {
                        error!("{}", err);
                        Err(err.into())
                    }
                }
            }
            ImplementationSource::Factory(_) => Ok(None),
        }
    }

    /// Edges to the registrations of the constructor parameters, discovered once and cached.
    ///
    /// The parameter of a decorator that has the decorated service type points to the decorated registration,
    /// every other parameter is looked up in the store.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::Activation`] if no constructor can be selected
    /// - Returns [`ResolveErrorKind::MissingRegistration`] if a parameter type isn't registered
    /// - Returns [`ResolveErrorKind::MissingDecoratee`] or [`ResolveErrorKind::DuplicateDecoratee`]
    ///   if a decorator doesn't take the decorated service exactly once
    /// - Returns [`ResolveErrorKind::UnknownRegistration`] if the id was issued by another container
    pub fn relationships(&self, id: RegistrationId) -> Result<Arc<[Relationship]>, ResolveErrorKind> {
        let registration = self.checked_node(id)?;
        if let Some(relationships) = registration.relationships.get() {
            return Ok(relationships);
        }

        let span = info_span!("relationships", service = registration.service.name);
        let _guard = span.enter();

        let Some(constructor) = self.select_constructor(id)? else {
            debug!("Factory registration has no relationships");
            return Ok(registration.relationships.get_or_set(Arc::<[Relationship]>::from(Vec::new())));
        };

        let mut decoratee = registration.decoratee;
        let mut relationships = Vec::with_capacity(constructor.parameters.len());
        for parameter in &constructor.parameters {
            let relationship = match registration.decoratee {
                Some(_) if *parameter == registration.service => {
                    let Some(dependency) = decoratee.take() else {
                        return Err(decoratee_error(registration, true));
                    };
                    Relationship {
                        consumer: id,
                        dependency,
                        parameter: *parameter,
                        kind: RelationshipKind::Decoratee,
                    }
                }
                _ => {
                    let Some(dependency) = self.services.get(parameter).copied() else {
                        let err = ResolveErrorKind::MissingRegistration {
                            consumer: registration.implementation,
                            parameter: *parameter,
                        };
                        error!("{}", err);
                        return Err(err);
                    };
                    Relationship {
                        consumer: id,
                        dependency,
                        parameter: *parameter,
                        kind: RelationshipKind::Parameter,
                    }
                }
            };
            relationships.push(relationship);
        }
        if decoratee.is_some() {
            return Err(decoratee_error(registration, false));
        }

        debug!(count = relationships.len(), "Relationships discovered");
        Ok(registration.relationships.get_or_set(relationships.into()))
    }
}

fn decoratee_error(decorator: &Registration, duplicate: bool) -> ResolveErrorKind {
    let (decorator, service) = (decorator.implementation, decorator.service);
    let err = if duplicate {
        ResolveErrorKind::DuplicateDecoratee { decorator, service }
    } else {
        ResolveErrorKind::MissingDecoratee { decorator, service }
    };
    error!("{}", err);
    err
}

#[cfg(test)]
mod tests {
    extern crate std;

    use crate::{
        any::TypeInfo,
        descriptor::{Component, ComponentDescriptor, ConstructorDescriptor},
        errors::{ActivationErrorKind, ResolveErrorKind},
        lifestyle::DefaultLifestyle::*,
        registration::RelationshipKind,
        Container,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use tracing_test::traced_test;

    trait Service {}

    struct Leaf;
    struct Implementation;
    struct Decorator;
    struct Unregistered;
    struct NeedsUnregistered;
    struct Ambiguous;
    struct WithoutDecoratee;
    struct DecorateeTwice;

    impl Component for Leaf {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new())
        }
    }

    impl Component for Implementation {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<Leaf>().param::<Leaf>())
        }
    }

    impl Component for Decorator {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<Leaf>().param::<dyn Service>())
        }
    }

    impl Component for NeedsUnregistered {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<Unregistered>())
        }
    }

    impl Component for Ambiguous {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>()
                .with_constructor(ConstructorDescriptor::new())
                .with_constructor(ConstructorDescriptor::new().param::<Leaf>())
        }
    }

    impl Component for WithoutDecoratee {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<Leaf>())
        }
    }

    impl Component for DecorateeTwice {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<dyn Service>().param::<dyn Service>())
        }
    }

    #[test]
    #[traced_test]
    fn test_relationships() {
        let container = Container::new(
            Container::builder()
                .register::<Leaf, Leaf>(Singleton)
                .register::<dyn Service, Implementation>(Scoped)
                .decorate::<dyn Service, Decorator>(),
        )
        .unwrap();

        let decorator = container.registration_of::<dyn Service>().unwrap();
        let relationships = container.relationships(decorator.id()).unwrap();

        assert_eq!(relationships.len(), 2);
        assert_eq!(relationships[0].kind, RelationshipKind::Parameter);
        assert_eq!(relationships[0].dependency, container.registration_of::<Leaf>().unwrap().id());
        assert_eq!(relationships[1].kind, RelationshipKind::Decoratee);
        assert_eq!(Some(relationships[1].dependency), decorator.decoratee());

        let decorated = container.relationships(decorator.decoratee().unwrap()).unwrap();
        assert_eq!(decorated.len(), 2);
        assert!(decorated.iter().all(|relationship| relationship.parameter == TypeInfo::of::<Leaf>()));
    }

    #[test]
    #[traced_test]
    fn test_relationships_cached() {
        let container = Container::new(Container::builder().register::<Leaf, Leaf>(Singleton).register::<Implementation, Implementation>(Automatic)).unwrap();
        let id = container.registration_of::<Implementation>().unwrap().id();

        let first = container.relationships(id).unwrap();
        let second = container.relationships(id).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(container.registration_by_id(id).unwrap().relationships().is_some());
    }

    #[test]
    #[traced_test]
    fn test_missing_registration() {
        let container = Container::new(Container::builder().register::<NeedsUnregistered, NeedsUnregistered>(Automatic)).unwrap();
        let id = container.registration_of::<NeedsUnregistered>().unwrap().id();

        assert!(matches!(
            container.relationships(id),
            Err(ResolveErrorKind::MissingRegistration { consumer, parameter })
                if consumer == TypeInfo::of::<NeedsUnregistered>() && parameter == TypeInfo::of::<Unregistered>()
        ));
        assert!(container.registration_by_id(id).unwrap().relationships().is_none());
    }

    #[test]
    #[traced_test]
    fn test_ambiguous_constructor() {
        let container = Container::new(Container::builder().register::<Ambiguous, Ambiguous>(Transient)).unwrap();
        let id = container.registration_of::<Ambiguous>().unwrap().id();

        assert!(matches!(
            container.relationships(id),
            Err(ResolveErrorKind::Activation(ActivationErrorKind::AmbiguousConstructor { count: 2, .. }))
        ));
    }

    #[test]
    #[traced_test]
    fn test_factory_has_no_relationships() {
        let container = Container::new(Container::builder().register_factory(|| Ok(Leaf), Singleton)).unwrap();
        let id = container.registration_of::<Leaf>().unwrap().id();

        assert!(container.select_constructor(id).unwrap().is_none());
        assert!(container.relationships(id).unwrap().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_not_registered() {
        let container = Container::new(Container::builder()).unwrap();

        assert!(container.is_empty());
        assert!(matches!(
            container.registration_or_err(&TypeInfo::of::<Leaf>()),
            Err(ResolveErrorKind::NotRegistered { .. })
        ));
    }

    #[test]
    #[traced_test]
    fn test_decorator_without_decoratee_parameter() {
        let container = Container::new(
            Container::builder()
                .register::<dyn Service, Leaf>(Transient)
                .register::<Leaf, Leaf>(Singleton)
                .decorate_with::<dyn Service, WithoutDecoratee>(Automatic),
        )
        .unwrap();
        let id = container.registration_of::<dyn Service>().unwrap().id();

        assert!(matches!(
            container.relationships(id),
            Err(ResolveErrorKind::MissingDecoratee { decorator, service })
                if decorator == TypeInfo::of::<WithoutDecoratee>() && service == TypeInfo::of::<dyn Service>()
        ));
        assert!(container.lifestyle_of::<dyn Service>().is_err());
        assert!(container.verify().is_err());
    }

    #[test]
    #[traced_test]
    fn test_decorator_takes_decoratee_twice() {
        let container = Container::new(
            Container::builder()
                .register::<dyn Service, Leaf>(Transient)
                .decorate::<dyn Service, DecorateeTwice>(),
        )
        .unwrap();
        let id = container.registration_of::<dyn Service>().unwrap().id();

        assert!(matches!(
            container.relationships(id),
            Err(ResolveErrorKind::DuplicateDecoratee { decorator, .. }) if decorator == TypeInfo::of::<DecorateeTwice>()
        ));
    }

    #[test]
    #[traced_test]
    fn test_foreign_registration_id() {
        let other = Container::new(
            Container::builder()
                .register::<Leaf, Leaf>(Singleton)
                .register::<Implementation, Implementation>(Automatic),
        )
        .unwrap();
        let foreign = other.registration_of::<Implementation>().unwrap().id();
        let container = Container::new(Container::builder().register::<Leaf, Leaf>(Singleton)).unwrap();

        assert!(container.registration_by_id(foreign).is_none());
        assert!(matches!(
            container.relationships(foreign),
            Err(ResolveErrorKind::UnknownRegistration { index: 1 })
        ));
        assert!(matches!(
            container.resolve_lifestyle(foreign),
            Err(ResolveErrorKind::UnknownRegistration { .. })
        ));
    }
}
