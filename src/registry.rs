use alloc::{boxed::Box, collections::BTreeMap, sync::Arc, vec::Vec};
use core::any::Any;
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{
    any::TypeInfo,
    config::Config,
    constructor::{ConstructorResolutionBehavior, DefaultConstructorResolutionBehavior},
    container::Container,
    descriptor::{Component, ComponentDescriptor, DescriptorCache},
    errors::RegistryErrorKind,
    lifestyle::DeclaredLifestyle,
    registration::{ImplementationSource, Registration, RegistrationId},
    strategy::{LifestyleCompiler, StrategyCompiler},
};

struct RegistrationEntry {
    service: TypeInfo,
    lifestyle: DeclaredLifestyle,
    source: ImplementationSource,
}

struct DecoratorEntry {
    service: TypeInfo,
    lifestyle: DeclaredLifestyle,
    descriptor: Arc<ComponentDescriptor>,
}

/// Collects bindings, decorators and factories before they become a [`Container`].
///
/// Registrations can be declared in any order, decorators are applied after all of them
/// in the order of their declaration, so the last declared decorator is the outermost one.
pub struct RegistryBuilder {
    config: Config,
    descriptors: DescriptorCache,
    registrations: Vec<RegistrationEntry>,
    decorators: Vec<DecoratorEntry>,
    errors: Vec<RegistryErrorKind>,
    constructor_behavior: Box<dyn ConstructorResolutionBehavior + Send + Sync>,
    compiler: Box<dyn StrategyCompiler + Send + Sync>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_config(Config::default())
    }

    #[inline]
    #[must_use]
    pub fn new_with_config(config: Config) -> Self {
        Self {
            config,
            descriptors: DescriptorCache::default(),
            registrations: Vec::new(),
            decorators: Vec::new(),
            errors: Vec::new(),
            constructor_behavior: Box::new(DefaultConstructorResolutionBehavior),
            compiler: Box::new(LifestyleCompiler),
        }
    }

    /// Binds service `S` to implementation `I`, built by constructor injection
    #[inline]
    #[must_use]
    pub fn register<S, I>(mut self, lifestyle: impl Into<DeclaredLifestyle>) -> Self
    where
        S: ?Sized + 'static,
        I: Component,
    {
        let descriptor = self.descriptors.get_or_describe::<I>();
        self.add_registration(TypeInfo::of::<S>(), lifestyle.into(), ImplementationSource::Constructor(descriptor));
        self
    }

    /// Binds service `S` to implementation `I` with the lifestyle from [`Config::default_lifestyle`]
    #[inline]
    #[must_use]
    pub fn register_default<S, I>(self) -> Self
    where
        S: ?Sized + 'static,
        I: Component,
    {
        let lifestyle = self.config.default_lifestyle;
        self.register::<S, I>(lifestyle)
    }

    /// Binds service `S` to an implementation described at runtime
    #[inline]
    #[must_use]
    pub fn register_descriptor<S>(mut self, descriptor: ComponentDescriptor, lifestyle: impl Into<DeclaredLifestyle>) -> Self
    where
        S: ?Sized + 'static,
    {
        let descriptor = self.descriptors.insert(descriptor);
        self.add_registration(TypeInfo::of::<S>(), lifestyle.into(), ImplementationSource::Constructor(descriptor));
        self
    }

    /// Binds service `S` to a user-provided factory.
    ///
    /// # Warning
    /// A factory has no dependency graph to inspect, so [`DeclaredLifestyle::Automatic`] isn't supported here
    /// and building the registry fails with [`RegistryErrorKind::NotSupported`].
    #[must_use]
    pub fn register_factory<S, F>(mut self, factory: F, lifestyle: impl Into<DeclaredLifestyle>) -> Self
    where
        S: Send + Sync + 'static,
        F: Fn() -> anyhow::Result<S> + Send + Sync + 'static,
    {
        let service = TypeInfo::of::<S>();
        let lifestyle = lifestyle.into();
        if lifestyle.is_automatic() {
            let err = RegistryErrorKind::NotSupported { service };
            error!("{}", err);
            self.errors.push(err);
            return self;
        }

        let factory = Arc::new(move || factory().map(|instance| Box::new(instance) as Box<dyn Any + Send + Sync>));
        self.add_registration(service, lifestyle, ImplementationSource::Factory(factory));
        self
    }

    /// Wraps service `S` with decorator `D`, the lifestyle is taken from [`Config::default_lifestyle`].
    ///
    /// The constructor of `D` is expected to take `S` as one of its parameters,
    /// this parameter receives the decorated registration.
    #[inline]
    #[must_use]
    pub fn decorate<S, D>(self) -> Self
    where
        S: ?Sized + 'static,
        D: Component,
    {
        let lifestyle = self.config.default_lifestyle;
        self.decorate_with::<S, D>(lifestyle)
    }

    #[inline]
    #[must_use]
    pub fn decorate_with<S, D>(mut self, lifestyle: impl Into<DeclaredLifestyle>) -> Self
    where
        S: ?Sized + 'static,
        D: Component,
    {
        let descriptor = self.descriptors.get_or_describe::<D>();
        self.decorators.push(DecoratorEntry {
            service: TypeInfo::of::<S>(),
            lifestyle: lifestyle.into(),
            descriptor,
        });
        self
    }

    #[inline]
    #[must_use]
    pub fn with_constructor_resolution_behavior(mut self, behavior: impl ConstructorResolutionBehavior + Send + Sync + 'static) -> Self {
        self.constructor_behavior = Box::new(behavior);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_strategy_compiler(mut self, compiler: impl StrategyCompiler + Send + Sync + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    /// # Errors
    /// - Returns [`RegistryErrorKind::NotSupported`] if a factory was registered with automatic lifestyle
    /// - Returns [`RegistryErrorKind::DuplicateRegistration`] if a service was registered twice and overriding is disabled
    /// - Returns [`RegistryErrorKind::NoDecoratee`] if a decorator wraps a service without registration
    pub fn build(self) -> Result<Container, RegistryErrorKind> {
        let Self {
            config,
            registrations: registration_entries,
            decorators,
            errors,
            constructor_behavior,
            compiler,
            ..
        } = self;

        if let Some(err) = errors.into_iter().next() {
            return Err(err);
        }

        let mut registrations: Vec<Registration> = Vec::with_capacity(registration_entries.len() + decorators.len());
        let mut services = BTreeMap::new();

        for RegistrationEntry { service, lifestyle, source } in registration_entries {
            match services.get(&service).copied() {
                Some(id) if config.allow_overriding_registrations => {
                    let RegistrationId(index) = id;
                    registrations[index] = Registration::new(id, service, lifestyle, source, None);
                    debug!(service = service.name, "Registration overridden");
                }
                Some(_) => {
                    let err = RegistryErrorKind::DuplicateRegistration { service };
                    error!("{}", err);
                    return Err(err);
                }
                None => {
                    let id = RegistrationId(registrations.len());
                    registrations.push(Registration::new(id, service, lifestyle, source, None));
                    services.insert(service, id);
                }
            }
        }

        for DecoratorEntry {
            service,
            lifestyle,
            descriptor,
        } in decorators
        {
            let Some(decoratee) = services.get(&service).copied() else {
                let err = RegistryErrorKind::NoDecoratee {
                    service,
                    decorator: descriptor.type_info,
                };
                error!("{}", err);
                return Err(err);
            };

            let id = RegistrationId(registrations.len());
            registrations.push(Registration::new(
                id,
                service,
                lifestyle,
                ImplementationSource::Constructor(descriptor),
                Some(decoratee),
            ));
            services.insert(service, id);
            debug!(service = service.name, "Decorator applied");
        }

        debug!(registrations = registrations.len(), services = services.len(), "Registry built");

        Ok(Container {
            registrations,
            services,
            config,
            constructor_behavior,
            compiler,
            resolution: Mutex::new(()),
        })
    }
}

impl RegistryBuilder {
    #[inline]
    fn add_registration(&mut self, service: TypeInfo, lifestyle: DeclaredLifestyle, source: ImplementationSource) {
        self.registrations.push(RegistrationEntry { service, lifestyle, source });
    }
}
