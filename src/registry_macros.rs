/// Declares a registry and returns its [`RegistryBuilder`](crate::RegistryBuilder).
///
/// Registrations are grouped by lifestyle, `defaults` groups the ones that take [`Config::default_lifestyle`](crate::Config).
/// Decorators are listed separately and are applied in the order of declaration.
///
/// # Example
/// ```
/// use lifestyle::{registry, Component, ComponentDescriptor, ConstructorDescriptor, Container, Lifestyle, DefaultLifestyle::*};
///
/// trait Users {}
///
/// struct Pool;
/// struct PostgresUsers;
/// struct CachedUsers;
///
/// impl Component for Pool {
///     fn descriptor() -> ComponentDescriptor {
///         ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new())
///     }
/// }
///
/// impl Component for PostgresUsers {
///     fn descriptor() -> ComponentDescriptor {
///         ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<Pool>())
///     }
/// }
///
/// impl Component for CachedUsers {
///     fn descriptor() -> ComponentDescriptor {
///         ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<dyn Users>())
///     }
/// }
///
/// let container = Container::new(registry! {
///     lifestyle(Scoped) [ register(Pool) ],
///     lifestyle(Automatic) [ register(dyn Users => PostgresUsers) ],
///     decorate(dyn Users => CachedUsers),
/// })
/// .unwrap();
///
/// container.verify().unwrap();
/// assert_eq!(container.lifestyle_of::<dyn Users>().unwrap(), Lifestyle::TRANSIENT);
/// ```
#[macro_export]
macro_rules! registry {
    (config($cfg:expr) $(, $($sections:tt)*)?) => {
        $crate::registry_internal! { @sections $crate::RegistryBuilder::new_with_config($cfg), [ $($($sections)*)? ] }
    };
    ($($sections:tt)*) => {
        $crate::registry_internal! { @sections $crate::RegistryBuilder::new(), [ $($sections)* ] }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! registry_internal {
    // === Base case ===
    // Example: registry_internal! { @sections builder, [] }
    (@sections $builder:expr, []) => {
        $builder
    };

    // === Lifestyle group ===
    // Example: registry_internal! { @sections builder, [ lifestyle(Scoped) [ register(A) ], ... ] }
    (@sections $builder:expr, [ lifestyle($lifestyle:expr) [ $($entries:tt)* ] $(, $($rest:tt)*)? ]) => {
        $crate::registry_internal! {
            @sections $crate::registry_internal! { @entries $builder, $lifestyle, [ $($entries)* ] },
            [ $($($rest)*)? ]
        }
    };

    // === Default lifestyle group ===
    // Example: registry_internal! { @sections builder, [ defaults [ register(A) ], ... ] }
    (@sections $builder:expr, [ defaults [ $($entries:tt)* ] $(, $($rest:tt)*)? ]) => {
        $crate::registry_internal! {
            @sections $crate::registry_internal! { @defaults $builder, [ $($entries)* ] },
            [ $($($rest)*)? ]
        }
    };

    // === Decorator with an explicit lifestyle ===
    // Example: registry_internal! { @sections builder, [ decorate(dyn S => D, Transient), ... ] }
    (@sections $builder:expr, [ decorate($svc:ty => $dec:ty, $lifestyle:expr) $(, $($rest:tt)*)? ]) => {
        $crate::registry_internal! { @sections $builder.decorate_with::<$svc, $dec>($lifestyle), [ $($($rest)*)? ] }
    };

    // === Decorator ===
    // Example: registry_internal! { @sections builder, [ decorate(dyn S => D), ... ] }
    (@sections $builder:expr, [ decorate($svc:ty => $dec:ty) $(, $($rest:tt)*)? ]) => {
        $crate::registry_internal! { @sections $builder.decorate::<$svc, $dec>(), [ $($($rest)*)? ] }
    };

    // === Entries of a lifestyle group ===
    // Example: registry_internal! { @entries builder, Scoped, [ register(dyn S => I), register(I), factory(F => || Ok(F)) ] }
    (@entries $builder:expr, $lifestyle:expr, []) => {
        $builder
    };
    (@entries $builder:expr, $lifestyle:expr, [ register($svc:ty => $impl:ty) $(, $($rest:tt)*)? ]) => {
        $crate::registry_internal! { @entries $builder.register::<$svc, $impl>($lifestyle), $lifestyle, [ $($($rest)*)? ] }
    };
    (@entries $builder:expr, $lifestyle:expr, [ register($impl:ty) $(, $($rest:tt)*)? ]) => {
        $crate::registry_internal! { @entries $builder.register::<$impl, $impl>($lifestyle), $lifestyle, [ $($($rest)*)? ] }
    };
    (@entries $builder:expr, $lifestyle:expr, [ factory($svc:ty => $factory:expr) $(, $($rest:tt)*)? ]) => {
        $crate::registry_internal! { @entries $builder.register_factory::<$svc, _>($factory, $lifestyle), $lifestyle, [ $($($rest)*)? ] }
    };

    // === Entries of the default lifestyle group ===
    // Example: registry_internal! { @defaults builder, [ register(dyn S => I), register(I) ] }
    (@defaults $builder:expr, []) => {
        $builder
    };
    (@defaults $builder:expr, [ register($svc:ty => $impl:ty) $(, $($rest:tt)*)? ]) => {
        $crate::registry_internal! { @defaults $builder.register_default::<$svc, $impl>(), [ $($($rest)*)? ] }
    };
    (@defaults $builder:expr, [ register($impl:ty) $(, $($rest:tt)*)? ]) => {
        $crate::registry_internal! { @defaults $builder.register_default::<$impl, $impl>(), [ $($($rest)*)? ] }
    };
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::{
        format,
        string::{String, ToString as _},
    };
    use tracing_test::traced_test;

    use crate::{
        Component, ComponentDescriptor, Config, ConstructorDescriptor, Container, DeclaredLifestyle, DefaultLifestyle::*, Lifestyle,
        RegistryErrorKind,
    };

    trait Service {}

    struct Leaf;
    struct Implementation;
    struct Decorator;
    struct Counter(u8);

    impl Component for Leaf {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new())
        }
    }

    impl Component for Implementation {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<Leaf>())
        }
    }

    impl Component for Decorator {
        fn descriptor() -> ComponentDescriptor {
            ComponentDescriptor::of::<Self>().with_constructor(ConstructorDescriptor::new().param::<dyn Service>().param::<Counter>())
        }
    }

    #[test]
    #[traced_test]
    fn test_empty() {
        let container = Container::new(registry! {}).unwrap();
        assert!(container.is_empty());
    }

    #[test]
    #[traced_test]
    fn test_lifestyle_groups() {
        let container = Container::new(registry! {
            lifestyle(Scoped) [ register(Leaf) ],
            lifestyle(Automatic) [ register(dyn Service => Implementation) ],
        })
        .unwrap();

        assert_eq!(container.len(), 2);
        assert_eq!(container.lifestyle_of::<Leaf>().unwrap(), Lifestyle::SCOPED);
        assert_eq!(container.lifestyle_of::<dyn Service>().unwrap(), Lifestyle::SCOPED);
    }

    #[test]
    #[traced_test]
    fn test_factory_and_decorators() {
        let container = Container::new(registry! {
            lifestyle(Singleton) [
                register(Leaf),
                factory(Counter => || Ok(Counter(1))),
            ],
            lifestyle(Transient) [ register(dyn Service => Implementation) ],
            decorate(dyn Service => Decorator),
            decorate(dyn Service => Decorator, Singleton),
        })
        .unwrap();

        let outermost = container.registration_of::<dyn Service>().unwrap();
        assert_eq!(outermost.declared_lifestyle(), DeclaredLifestyle::Concrete(Lifestyle::SINGLETON));
        assert!(container.registration_by_id(outermost.decoratee().unwrap()).unwrap().is_decorator());
        assert_eq!(container.len(), 5);
    }

    #[test]
    #[traced_test]
    fn test_config_and_defaults() {
        let container = Container::new(registry! {
            config(Config {
                default_lifestyle: DeclaredLifestyle::Automatic,
                ..Config::default()
            }),
            defaults [ register(Leaf), register(dyn Service => Implementation) ],
        })
        .unwrap();

        assert!(container.registration_of::<Leaf>().unwrap().declared_lifestyle().is_automatic());
        assert_eq!(container.lifestyle_of::<dyn Service>().unwrap(), Lifestyle::SINGLETON);
    }

    #[test]
    #[traced_test]
    fn test_automatic_factory() {
        let result = Container::new(registry! {
            lifestyle(Automatic) [ factory(Counter => || Ok(Counter(0))) ],
        });

        assert!(matches!(result, Err(RegistryErrorKind::NotSupported { .. })));
    }
}
